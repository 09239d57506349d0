use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use pds_stac_catalog::CatalogFacade;
use pds_stac_cli::{error_report, Command, Config, OutputFormat};
use pds_stac_client::OpenSearchClient;
use pds_stac_core::{load_settings, IndexBackend, SearchRequest, Settings};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenv().ok();

    // Parse command line arguments
    let config = Config::parse();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", error_report(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    // Setup logging (stderr to keep stdout clean for JSON output)
    let level = if config.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install the log subscriber")?;

    let settings = settings(&config)?;
    let format = config.format;

    // Initialize services
    let client = OpenSearchClient::new(&settings.opensearch).context("Invalid OpenSearch settings")?;
    let backend: Arc<dyn IndexBackend> = Arc::new(client);
    let catalog_config = Arc::new(settings.catalog);

    info!("Connecting to {}...", settings.opensearch.url);
    let catalog = CatalogFacade::initialize(backend, catalog_config.clone())
        .await
        .context("Failed to build the collection extent cache")?;

    // Execute command
    match config.command {
        Command::Collections => {
            let collections = catalog.list_collections().await?;
            info!("Found {} collections", collections.len());
            print_many(&collections, format)?;
        }
        Command::Collection { id } => {
            let collection = catalog.get_collection(&id).await?;
            print_one(&collection, format)?;
        }
        Command::Item { collection, item } => {
            let item = catalog.get_item(&collection, &item).await?;
            print_one(&item, format)?;
        }
        Command::Search {
            collections,
            limit,
            token,
            sortby,
        } => {
            let request = SearchRequest {
                collection_ids: (!collections.is_empty()).then_some(collections),
                limit: limit.unwrap_or(catalog_config.default_limit),
                token,
                sort: (!sortby.is_empty()).then_some(sortby),
            };
            let page = catalog.search_items(&request).await?;
            match format {
                OutputFormat::Json => print_one(&page, format)?,
                OutputFormat::Jsonl => {
                    print_many(&page.items, format)?;
                    match &page.next_token {
                        Some(token) => info!("Next page: --token {}", token),
                        None => info!("No more results"),
                    }
                }
            }
        }
        Command::Extents => {
            let extents: Vec<_> = catalog
                .known_collection_ids()
                .into_iter()
                .filter_map(|id| catalog.extent(id))
                .collect();
            print_many(&extents, format)?;
        }
    }

    Ok(())
}

/// Settings file, then flags and environment on top.
fn settings(config: &Config) -> anyhow::Result<Settings> {
    let mut settings =
        load_settings(config.config.as_deref()).context("Failed to load settings")?;

    if let Some(url) = &config.opensearch_url {
        settings.opensearch.url = url.clone();
    }
    if let Some(user) = &config.opensearch_username {
        settings.opensearch.username = Some(user.clone());
    }
    if let Some(password) = &config.opensearch_password {
        settings.opensearch.password = Some(password.clone());
    }
    Ok(settings)
}

fn print_one<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let json = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Jsonl => serde_json::to_string(value)?,
    };
    println!("{}", json);
    Ok(())
}

/// JSON array, or one line per element in JSON Lines mode
fn print_many<T: Serialize>(values: &[T], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_one(&values, format),
        OutputFormat::Jsonl => {
            for value in values {
                print_one(value, format)?;
            }
            Ok(())
        }
    }
}
