//! CLI module for gluetun-webui
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `serve` - Start the web UI server
//! - `instances` - Show the configured instance slots
//! - `status` - Poll a running server once and print every instance
//! - `watch` - Keep polling a running server, with interactive commands
//! - `vpn` - Start or stop an instance's tunnel through a running server
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Start server with default config
//! gluetun-webui serve
//!
//! # Check both instances from another terminal
//! gluetun-webui status --url http://localhost:3000
//!
//! # Stop the tunnel of instance 2
//! gluetun-webui vpn stop --instance 2
//! ```

pub mod completions;
pub mod config;
pub mod instances;
pub mod output;
pub mod serve;
pub mod status;
pub mod vpn;
pub mod watch;

pub use completions::handle_completions;
pub use config::handle_config_init;

use crate::config::InstanceId;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "gluetun-webui.toml";

/// gluetun-webui - Dashboard for Gluetun VPN containers
#[derive(Parser, Debug)]
#[command(
    name = "gluetun-webui",
    version,
    about = "Web dashboard and control proxy for Gluetun VPN containers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web UI server
    Serve(ServeArgs),
    /// Show the configured instance slots
    Instances(InstancesArgs),
    /// Poll a running server once
    Status(StatusArgs),
    /// Continuously poll a running server
    Watch(WatchArgs),
    /// Start or stop a tunnel
    #[command(subcommand)]
    Vpn(VpnCommands),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long, env = "GLUETUN_WEBUI_PORT")]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long, env = "GLUETUN_WEBUI_HOST")]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "GLUETUN_WEBUI_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Args, Debug)]
pub struct InstancesArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

/// Where a running server is reached.
#[derive(Args, Debug, Clone)]
pub struct RemoteArgs {
    /// Base URL of a running gluetun-webui server
    #[arg(short, long, env = "GLUETUN_WEBUI_URL", default_value = "http://localhost:3000")]
    pub url: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "10")]
    pub timeout: u64,
}

impl RemoteArgs {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.max(1))
    }
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,

    /// Auto-refresh interval in milliseconds (0 disables)
    #[arg(short, long, default_value = "10000")]
    pub interval: u64,

    /// Keep the connection history in this file between runs
    #[arg(long)]
    pub history_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum VpnCommands {
    /// Start the tunnel
    Start(VpnArgs),
    /// Stop the tunnel
    Stop(VpnArgs),
}

#[derive(Args, Debug)]
pub struct VpnArgs {
    /// Instance to act on (1 or 2)
    #[arg(short, long)]
    pub instance: InstanceId,

    #[command(flatten)]
    pub remote: RemoteArgs,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
