//! Command line argument parsing for the Tessera CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::query::DEFAULT_QUERY_LIMIT;

/// Tessera - substring search over named document collections
#[derive(Parser, Debug, Clone)]
#[command(name = "tessera")]
#[command(about = "Bigram-indexed substring search over named document collections")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct TesseraArgs {
    /// Increase verbosity (-v for info logs, -vv for debug logs)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Store configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE", env = "TESSERA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl TesseraArgs {
    /// Effective verbosity: 0 when quiet, 1 by default, one more per `-v`.
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.saturating_add(1)
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Replace a collection's index with the documents of a file
    Index(IndexArgs),

    /// Find documents containing any of the given words
    Query(QueryArgs),

    /// Remove every document of a collection
    Clear(ClearArgs),

    /// Show collection statistics
    Stats(StatsArgs),

    /// List the collections of a data directory
    List(ListArgs),
}

/// Arguments for indexing documents
#[derive(Parser, Debug, Clone)]
pub struct IndexArgs {
    /// Path to the data directory
    #[arg(value_name = "DATA_DIR")]
    pub data_dir: PathBuf,

    /// Collection name
    #[arg(value_name = "COLLECTION")]
    pub collection: String,

    /// Document file (JSON array or JSONL of {"id", "text"}); `-` reads stdin
    #[arg(value_name = "DOCUMENTS")]
    pub documents: PathBuf,
}

/// Arguments for querying
#[derive(Parser, Debug, Clone)]
pub struct QueryArgs {
    /// Path to the data directory
    #[arg(value_name = "DATA_DIR")]
    pub data_dir: PathBuf,

    /// Collection name
    #[arg(value_name = "COLLECTION")]
    pub collection: String,

    /// Words to look for; a document matches if it contains any of them
    #[arg(value_name = "WORD", required = true)]
    pub words: Vec<String>,

    /// Maximum number of document ids to return
    #[arg(short, long, default_value_t = DEFAULT_QUERY_LIMIT)]
    pub limit: usize,
}

/// Arguments for clearing a collection
#[derive(Parser, Debug, Clone)]
pub struct ClearArgs {
    /// Path to the data directory
    #[arg(value_name = "DATA_DIR")]
    pub data_dir: PathBuf,

    /// Collection name
    #[arg(value_name = "COLLECTION")]
    pub collection: String,
}

/// Arguments for collection statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Path to the data directory
    #[arg(value_name = "DATA_DIR")]
    pub data_dir: PathBuf,

    /// Collection name (default: every collection)
    #[arg(value_name = "COLLECTION")]
    pub collection: Option<String>,
}

/// Arguments for listing collections
#[derive(Parser, Debug, Clone)]
pub struct ListArgs {
    /// Path to the data directory
    #[arg(value_name = "DATA_DIR")]
    pub data_dir: PathBuf,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
