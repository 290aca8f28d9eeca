use crate::error::ConfigError;
use tracing_subscriber::EnvFilter;

/// Installs the global `fmt` subscriber with the given filter directive,
/// e.g. `"info"` or `"engine_core=debug,connectors=info"`.
pub fn init_tracing(filter: &str) -> Result<(), ConfigError> {
    let filter = EnvFilter::try_new(filter).map_err(|e| ConfigError::Invalid {
        name: "log_filter".to_string(),
        reason: e.to_string(),
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))
}
