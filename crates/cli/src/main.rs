use crate::{
    commands::{Commands, QueryArgs},
    error::CliError,
    query::{Query, parse_attributes, parse_renames, parse_value},
};
use clap::Parser;
use connectors::provider::DataProvider;
use engine_config::{logging::init_tracing, settings::FetchSettings};
use engine_core::{
    fallback::{FetchByKeysIteration, FetchByOffsetIteration, LayeredDataProvider},
    view::{ListDataProviderView, ViewOptions},
};
use futures::StreamExt;
use model::{
    core::key::KeySet,
    fetch::{
        keys::FetchByKeysParameters, list::FetchListParameters, offset::FetchByOffsetParameters,
    },
};
use std::sync::Arc;
use tracing::info;

mod commands;
mod error;
mod input;
mod output;
mod query;

#[derive(Parser)]
#[command(
    name = "dpview",
    version = "0.1.0",
    about = "Page, look up and window JSON rows through a list data provider view"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Page {
            source,
            query,
            size,
            offset,
            from,
            renames,
            attributes,
        } => {
            let settings = init(&source)?;
            let provider = input::open_provider(&source, &settings).await?;
            let query = Query::from_args(&query)?;

            let mut options = ViewOptions::new().with_offset(offset);
            options.from = from.as_deref().map(parse_value);
            options.sort_criteria = query.sort;
            options.filter_criterion = query.filter;
            options.attributes = parse_attributes(&attributes);
            if let Some(mapping) = parse_renames(&renames)? {
                options = options.with_data_mapping(mapping);
            }

            let view = ListDataProviderView::new(Arc::new(provider), options)
                .await
                .with_fetch_settings(&settings);

            let params = FetchListParameters {
                size: Some(size.unwrap_or(settings.page_size)),
                ..Default::default()
            };
            let mut pages = view.fetch_first(params);
            let mut index = 0;
            while let Some(step) = pages.next().await {
                output::print_page(index, &step?)?;
                index += 1;
            }
            info!(pages = index, "Iteration finished");
        }
        Commands::Keys { source, keys, scan } => {
            let settings = init(&source)?;
            let provider = input::open_provider(&source, &settings).await?;
            let provider = layered(provider, &settings, scan);

            let keys: KeySet = keys.iter().map(|k| parse_value(k)).collect();
            let found = provider
                .fetch_by_keys(FetchByKeysParameters::new(keys))
                .await?;
            output::print_keys(&found)?;
        }
        Commands::Offset {
            source,
            query,
            offset,
            size,
            scan,
        } => {
            let settings = init(&source)?;
            let provider = input::open_provider(&source, &settings).await?;
            let provider = layered(provider, &settings, scan);

            let window = provider
                .fetch_by_offset(offset_parameters(offset, size, &query)?)
                .await?;
            output::print_window(&window)?;
        }
    }

    Ok(())
}

fn init(source: &commands::SourceArgs) -> Result<FetchSettings, CliError> {
    let settings = input::load_settings(source)?;
    init_tracing(&settings.log_filter)?;
    Ok(settings)
}

/// Wraps the provider; with `scan` keyed and offset access go through the
/// iteration fallbacks instead of the native implementations.
fn layered(
    provider: impl DataProvider + 'static,
    settings: &FetchSettings,
    scan: bool,
) -> LayeredDataProvider {
    let layered = LayeredDataProvider::new(Arc::new(provider));
    if !scan {
        return layered;
    }
    layered
        .with_fetch_by_keys(FetchByKeysIteration::from_settings(settings))
        .with_fetch_by_offset(FetchByOffsetIteration::from_settings(settings))
}

fn offset_parameters(
    offset: usize,
    size: usize,
    query: &QueryArgs,
) -> Result<FetchByOffsetParameters, CliError> {
    let query = Query::from_args(query)?;
    Ok(FetchByOffsetParameters {
        sort_criteria: query.sort,
        filter_criterion: query.filter,
        ..FetchByOffsetParameters::new(offset, size)
    })
}
