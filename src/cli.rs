use crate::entity::EntityType;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// A tool to filter CRM record exports with saved or ad-hoc criteria
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the saved-filter store file
    #[arg(
        long,
        global = true,
        env = "CRM_FILTER_STORE",
        default_value = "filters.json"
    )]
    pub store: PathBuf,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write the output to a file in addition to stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Control colored output
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Increase verbosity (repeatable)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply filter criteria to a records file
    Apply {
        /// Records file (JSON export, top-level array or response envelope)
        #[arg(short, long)]
        records: PathBuf,

        /// Entity type of the records (enables field normalization and schema warnings)
        #[arg(short, long)]
        entity: Option<EntityType>,

        /// Inline criteria expression, e.g. 'status:equals:active value:between:1000:50000'
        #[arg(short, long)]
        criteria: Option<String>,

        /// Saved filter to apply, by id or name (combined with --criteria via AND)
        #[arg(short, long)]
        saved: Option<String>,

        /// Sort matching records by this field before output
        #[arg(long)]
        sort_by: Option<String>,

        /// Show at most this many records
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Inspect a records file: field coverage and value kinds
    Info {
        /// Records file to inspect
        #[arg(short, long)]
        records: PathBuf,

        /// Entity type, for schema-declared field kinds
        #[arg(short, long)]
        entity: Option<EntityType>,
    },
    /// List the operator vocabulary understood by criteria expressions
    Operators,
    /// Manage saved filters
    Filters {
        #[command(subcommand)]
        command: FilterCommands,
    },
}

#[derive(Subcommand)]
pub enum FilterCommands {
    /// List saved filters
    List {
        /// Only filters scoped to this entity type
        #[arg(short, long)]
        entity: Option<EntityType>,
    },
    /// Show one saved filter in full
    Show {
        /// Filter id or name
        id_or_name: String,
    },
    /// Create a saved filter from a criteria expression
    Save {
        /// Filter name
        #[arg(short, long)]
        name: String,

        /// Entity type the filter is scoped to
        #[arg(short, long)]
        entity: EntityType,

        /// Criteria expression, e.g. 'stage:equals:negotiation value:greater_than:10000'
        #[arg(short, long)]
        criteria: String,

        /// Optional description
        #[arg(short, long)]
        description: Option<String>,

        /// Comma-separated tags
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,
    },
    /// Delete a saved filter
    Delete {
        /// Filter id or name
        id_or_name: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    Text,
    /// Machine-readable JSON
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Let the terminal decide
    Auto,
    /// Force colors on
    Always,
    /// Disable colors
    Never,
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
