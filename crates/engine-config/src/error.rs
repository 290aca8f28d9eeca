use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid env file: {0}")]
    Env(String),

    #[error("Invalid setting {name}: {reason}")]
    Invalid { name: String, reason: String },

    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}
