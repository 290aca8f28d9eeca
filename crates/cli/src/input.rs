use crate::{commands::SourceArgs, error::CliError};
use connectors::memory::{array::ArrayDataProvider, options::ArrayProviderOptions};
use engine_config::{env::EnvManager, settings::FetchSettings};
use model::records::row::RowData;
use std::path::Path;
use tracing::info;

/// Settings from the optional file, the environment and the optional
/// `.env` file.
pub fn load_settings(args: &SourceArgs) -> Result<FetchSettings, CliError> {
    let mut env = EnvManager::from_process();
    if let Some(path) = &args.env_file {
        env.load_from_file(path)?;
    }
    Ok(FetchSettings::load(
        args.config.as_deref().map(Path::new),
        &env,
    )?)
}

pub async fn load_rows(path: &str) -> Result<Vec<RowData>, CliError> {
    let content = tokio::fs::read_to_string(path).await?;
    parse_rows(&content)
}

pub fn parse_rows(content: &str) -> Result<Vec<RowData>, CliError> {
    match serde_json::from_str::<serde_json::Value>(content)? {
        serde_json::Value::Array(rows) => rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| match row {
                serde_json::Value::Object(_) => Ok(RowData::from(row)),
                _ => Err(CliError::InvalidRows(format!("entry {i} is not an object"))),
            })
            .collect(),
        _ => Err(CliError::InvalidRows(
            "expected a JSON array of objects".to_string(),
        )),
    }
}

pub async fn open_provider(
    args: &SourceArgs,
    settings: &FetchSettings,
) -> Result<ArrayDataProvider, CliError> {
    let rows = load_rows(&args.rows).await?;
    info!(rows = rows.len(), path = %args.rows, "Loaded rows");

    let options = match &args.key_field {
        Some(field) => ArrayProviderOptions::keyed_by(field),
        None => ArrayProviderOptions::default(),
    }
    .with_page_size(settings.page_size);

    Ok(ArrayDataProvider::new(rows, options))
}
