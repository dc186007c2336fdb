use clap::Parser;
use gluetun_webui::api::VpnAction;
use gluetun_webui::cli::{
    handle_completions, handle_config_init, instances, serve, status, vpn, watch, Cli, Commands,
    ConfigCommands, VpnCommands,
};
use gluetun_webui::logging::init_cli_tracing;

fn print_output(
    result: Result<String, Box<dyn std::error::Error>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = result?;
    println!("{}", output);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if matches!(cli.command, Commands::Status(_) | Commands::Watch(_)) {
        if let Err(e) = init_cli_tracing() {
            eprintln!("Warning: logging unavailable: {}", e);
        }
    }

    let result = match cli.command {
        Commands::Serve(args) => serve::run_serve(args).await,
        Commands::Instances(args) => print_output(instances::handle_instances(&args)),
        Commands::Status(args) => print_output(status::handle_status(&args).await),
        Commands::Watch(args) => watch::run_watch(args).await,
        Commands::Vpn(cmd) => {
            let (action, args) = match cmd {
                VpnCommands::Start(args) => (VpnAction::Start, args),
                VpnCommands::Stop(args) => (VpnAction::Stop, args),
            };
            print_output(vpn::handle_vpn(action, &args).await)
        }
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
