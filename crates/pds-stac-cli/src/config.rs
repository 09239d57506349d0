use clap::{Parser, Subcommand, ValueEnum};
use pds_stac_core::SortField;
use std::path::PathBuf;

/// CLI configuration parsed from command line arguments and environment variables
#[derive(Parser, Debug)]
#[command(name = "pds-stac")]
#[command(
    author,
    version,
    about = "Read-only STAC catalog over the PDS registry index"
)]
#[command(after_help = "Examples:
  pds-stac collections
  pds-stac collection urn:nasa:pds:mars2020_supercam:data_derived_spectra::1.0
  pds-stac search --collection urn:nasa:pds:mars2020_supercam:data_derived_spectra::1.0 --limit 5
  pds-stac extents")]
pub struct Config {
    /// Path to the TOML settings file (default: ~/.config/pds-stac/config.toml)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// OpenSearch cluster URL, overrides the settings file
    #[arg(long, env = "OPENSEARCH_URL", global = true)]
    pub opensearch_url: Option<String>,

    /// OpenSearch basic auth user
    #[arg(long, env = "OPENSEARCH_USERNAME", global = true)]
    pub opensearch_username: Option<String>,

    /// OpenSearch basic auth password
    #[arg(long, env = "OPENSEARCH_PASSWORD", hide_env_values = true, global = true)]
    pub opensearch_password: Option<String>,

    /// Log query bodies and cache details
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format for results
    #[arg(short, long, default_value = "json", global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every collection with a cached spatial extent
    Collections,
    /// Show one collection
    Collection {
        /// Collection identifier (lidvid)
        id: String,
    },
    /// Show one item of a collection
    Item {
        /// Collection the item belongs to
        collection: String,
        /// Item identifier (lidvid)
        item: String,
    },
    /// Search observational products
    #[command(after_help = "Examples:
  pds-stac search --limit 20
  pds-stac search --collection urn:nasa:pds:a:data::1.0 --sortby -ops:Harvest_Info/ops:harvest_date_time
  pds-stac search --token <next_token from the previous page>")]
    Search {
        /// Restrict to items of this collection (repeatable)
        #[arg(short, long = "collection", value_name = "ID")]
        collections: Vec<String>,
        /// Maximum number of items per page (default from settings)
        #[arg(short, long)]
        limit: Option<usize>,
        /// Continuation token returned by the previous page
        #[arg(short, long)]
        token: Option<String>,
        /// Sort field, prefix with '-' for descending (repeatable)
        #[arg(long = "sortby", value_name = "FIELD", allow_hyphen_values = true)]
        sortby: Vec<SortField>,
    },
    /// Show the cached spatial extent of every known collection
    Extents,
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON document
    Json,
    /// JSON Lines, one object per collection or item
    Jsonl,
}
