//! Structured logging setup and request correlation.

pub mod middleware;

pub use middleware::{generate_request_id, make_request_span, request_id, REQUEST_ID_HEADER};

use crate::config::{LogFormat, LoggingConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build filter directives string from LoggingConfig
///
/// Constructs a tracing filter string that includes the base log level
/// and any component-specific log levels configured in the LoggingConfig.
///
/// # Examples
///
/// ```
/// use gluetun_webui::config::LoggingConfig;
/// use gluetun_webui::logging::build_filter_directives;
/// use std::collections::BTreeMap;
///
/// let mut component_levels = BTreeMap::new();
/// component_levels.insert("upstream".to_string(), "debug".to_string());
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     component_levels: Some(component_levels),
///     ..Default::default()
/// };
///
/// assert_eq!(build_filter_directives(&config), "info,gluetun_webui::upstream=debug");
/// ```
pub fn build_filter_directives(config: &LoggingConfig) -> String {
    let mut filter_str = config.level.clone();

    if let Some(component_levels) = &config.component_levels {
        for (component, level) in component_levels {
            filter_str.push_str(&format!(",gluetun_webui::{}={}", component, level));
        }
    }

    filter_str
}

/// Install the global subscriber. `RUST_LOG` wins over the config.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter_str = build_filter_directives(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    match config.format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        }
    }

    Ok(())
}

/// Default filter of the client commands.
pub const CLI_LOG_LEVEL: &str = "warn";

/// Install a quiet stderr subscriber for commands that talk to a running
/// server. Stdout stays reserved for command output.
pub fn init_cli_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(CLI_LOG_LEVEL));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init()?;

    Ok(())
}
