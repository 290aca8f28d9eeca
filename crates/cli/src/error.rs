use connectors::error::DataProviderError;
use engine_config::error::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read the rows file: {0}")]
    RowsFileRead(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Data provider error: {0}")]
    Provider(#[from] DataProviderError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid rows file: {0}")]
    InvalidRows(String),
}
