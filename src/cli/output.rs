//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, TesseraArgs};
use crate::collection::CollectionStats;
use crate::error::Result;

/// Result structure for indexing a document file.
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexResult {
    pub collection: String,
    pub documents_read: usize,
    pub documents_indexed: usize,
    pub terms: usize,
    pub generation: u64,
    pub duration_ms: u64,
}

/// Result structure for queries.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResults {
    pub collection: String,
    pub doc_ids: Vec<String>,
    pub total_hits: usize,
    pub duration_ms: u64,
}

/// Result structure for clearing a collection.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClearResult {
    pub collection: String,
}

/// Result structure for statistics.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResult {
    pub collections: Vec<CollectionStats>,
}

/// Result structure for listing collections.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResult {
    pub collections: Vec<String>,
}

/// Human-readable rendering of a command result.
pub trait HumanOutput {
    /// Lines to print, without the leading status message.
    fn human_lines(&self) -> Vec<String>;
}

impl HumanOutput for IndexResult {
    fn human_lines(&self) -> Vec<String> {
        vec![
            format!("Collection: {}", self.collection),
            format!("Documents read: {}", self.documents_read),
            format!("Documents indexed: {}", self.documents_indexed),
            format!("Distinct terms: {}", self.terms),
            format!("Generation: {}", self.generation),
            format!("Indexing time: {}ms", self.duration_ms),
        ]
    }
}

impl HumanOutput for QueryResults {
    fn human_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.doc_ids.clone();
        if self.total_hits > self.doc_ids.len() {
            lines.push(format!(
                "({} of {} matching documents shown)",
                self.doc_ids.len(),
                self.total_hits
            ));
        }
        lines
    }
}

impl HumanOutput for ClearResult {
    fn human_lines(&self) -> Vec<String> {
        vec![format!("Collection: {}", self.collection)]
    }
}

impl HumanOutput for StatsResult {
    fn human_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for stats in &self.collections {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.push(format!("Collection: {}", stats.name));
            lines.push(format!("  Documents: {}", stats.doc_count));
            lines.push(format!("  Distinct terms: {}", stats.term_count));
            lines.push(format!("  Generation: {}", stats.generation));
            match stats.committed_at {
                Some(at) => lines.push(format!("  Committed at: {}", at.to_rfc3339())),
                None => lines.push("  Committed at: never".to_string()),
            }
        }
        lines
    }
}

impl HumanOutput for ListResult {
    fn human_lines(&self) -> Vec<String> {
        self.collections.clone()
    }
}

/// Output a result in the specified format.
pub fn output_result<T>(message: &str, result: &T, args: &TesseraArgs) -> Result<()>
where
    T: Serialize + HumanOutput,
{
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: HumanOutput>(message: &str, result: &T, args: &TesseraArgs) -> Result<()> {
    if args.verbosity() > 1 {
        println!("{message}");
        println!();
    }
    for line in result.human_lines() {
        println!("{line}");
    }
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &TesseraArgs) -> Result<()> {
    println!("{}", format_json(result, args.pretty)?);
    Ok(())
}

/// Serialize a result as JSON.
pub fn format_json<T: Serialize>(result: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(json)
}
