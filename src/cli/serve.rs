//! Serve command implementation

use crate::api::{create_router, AppState};
use crate::cli::ServeArgs;
use crate::config::WebUiConfig;
use crate::logging::init_tracing;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(
    args: &ServeArgs,
) -> Result<WebUiConfig, Box<dyn std::error::Error>> {
    // Load from file if it exists, otherwise use defaults
    let mut config = if args.config.exists() {
        WebUiConfig::load(Some(&args.config))?
    } else {
        tracing::debug!("Config file not found, using defaults");
        WebUiConfig::default()
    };

    // Apply environment variable overrides
    config = config.with_env_overrides();

    // Apply CLI overrides (highest priority)
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }

    Ok(config)
}

/// Log every slot once at startup.
fn log_instances(state: &AppState) {
    for instance in &state.instances {
        match &instance.url {
            Some(url) => tracing::info!(
                instance = %instance.id,
                name = %instance.name,
                url = %url,
                credentials = ?instance.credentials,
                "Instance configured"
            ),
            None => tracing::info!(
                instance = %instance.id,
                name = %instance.name,
                "Instance not configured"
            ),
        }
    }
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
        _ = cancel_token.cancelled() => {}
    }

    cancel_token.cancel();
}

/// Main serve command handler
pub async fn run_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load and merge configuration
    let config = load_config_with_overrides(&args)?;
    config.validate()?;

    // 2. Initialize tracing
    init_tracing(&config.logging)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting gluetun-webui");
    tracing::debug!(?config, "Loaded configuration");

    // 3. Build state and router
    let state = Arc::new(AppState::new(Arc::new(config))?);
    log_instances(&state);
    let app = create_router(Arc::clone(&state));

    // 4. Bind and serve
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "gluetun-webui listening");

    let cancel_token = CancellationToken::new();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(cancel_token))
    .await?;

    tracing::info!("gluetun-webui stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn args(config: PathBuf) -> ServeArgs {
        ServeArgs {
            config,
            port: None,
            host: None,
            log_level: None,
        }
    }

    #[test]
    fn test_serve_config_loading() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[server]\nhost = \"127.0.0.1\"").unwrap();

        let config = load_config_with_overrides(&args(temp.path().to_path_buf())).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_serve_cli_overrides_config() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[server]\nport = 8080").unwrap();

        let mut args = args(temp.path().to_path_buf());
        args.port = Some(9000);
        args.log_level = Some("debug".to_string());

        let config = load_config_with_overrides(&args).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_serve_works_without_config_file() {
        let config = load_config_with_overrides(&args(PathBuf::from("nonexistent.toml"))).unwrap();
        assert_eq!(config.upstream.timeout_seconds, 5);
    }

    #[test]
    fn test_serve_rejects_broken_config_file() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[server\nport = ").unwrap();
        assert!(load_config_with_overrides(&args(temp.path().to_path_buf())).is_err());
    }

    #[tokio::test]
    async fn test_shutdown_signal_returns_on_cancel() {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(shutdown_signal(cancel.clone()));

        cancel.cancel();
        let result = tokio::time::timeout(Duration::from_secs(1), handle).await;
        assert!(result.is_ok());
    }
}
