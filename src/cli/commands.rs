//! Command implementations for the Tessera CLI.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::time::Instant;

use log::{debug, info};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::StoreConfig;
use crate::error::Result;
use crate::ingest::read_documents;
use crate::storage::StorageConfig;
use crate::storage::file::FileStorageConfig;
use crate::store::CollectionStore;

/// Execute a CLI command.
pub fn execute_command(args: TesseraArgs) -> Result<()> {
    match &args.command {
        Command::Index(index_args) => index_documents(index_args, &args),
        Command::Query(query_args) => query_collection(query_args, &args),
        Command::Clear(clear_args) => clear_collection(clear_args, &args),
        Command::Stats(stats_args) => show_stats(stats_args, &args),
        Command::List(list_args) => list_collections(list_args, &args),
    }
}

/// Open the store rooted at `data_dir`, applying `--config` if given.
fn open_store(data_dir: &Path, cli_args: &TesseraArgs) -> Result<CollectionStore> {
    let mut config = match &cli_args.config {
        Some(path) => {
            debug!("loading configuration from {}", path.display());
            StoreConfig::from_file(path)?
        }
        None => StoreConfig::default(),
    };

    // The data directory argument always wins over a configured location.
    let mut file_config = match config.storage.take() {
        Some(StorageConfig::File(file_config)) => file_config,
        _ => FileStorageConfig::new(data_dir),
    };
    file_config.path = data_dir.to_path_buf();
    config.storage = Some(StorageConfig::File(file_config));

    CollectionStore::open(config)
}

/// Stage every record of a document file and commit it.
fn index_documents(args: &IndexArgs, cli_args: &TesseraArgs) -> Result<()> {
    let store = open_store(&args.data_dir, cli_args)?;
    let start_time = Instant::now();

    let documents = if args.documents.as_os_str() == "-" {
        read_documents(io::stdin().lock())?
    } else {
        read_documents(BufReader::new(File::open(&args.documents)?))?
    };
    info!(
        "read {} documents from {}",
        documents.len(),
        args.documents.display()
    );

    let documents_read = documents.len();
    for document in documents {
        store.source(&args.collection, &document.id, &document.text)?;
    }
    let summary = store.index(&args.collection)?;

    output_result(
        "Collection indexed successfully",
        &IndexResult {
            collection: args.collection.clone(),
            documents_read,
            documents_indexed: summary.doc_count,
            terms: summary.term_count,
            generation: summary.generation,
            duration_ms: start_time.elapsed().as_millis() as u64,
        },
        cli_args,
    )
}

/// Run a query against one collection.
fn query_collection(args: &QueryArgs, cli_args: &TesseraArgs) -> Result<()> {
    let store = open_store(&args.data_dir, cli_args)?;
    let start_time = Instant::now();

    let hits = store.search(&args.collection, &args.words, args.limit)?;

    output_result(
        "Query results",
        &QueryResults {
            collection: args.collection.clone(),
            doc_ids: hits.doc_ids,
            total_hits: hits.total_hits,
            duration_ms: start_time.elapsed().as_millis() as u64,
        },
        cli_args,
    )
}

/// Clear one collection.
fn clear_collection(args: &ClearArgs, cli_args: &TesseraArgs) -> Result<()> {
    let store = open_store(&args.data_dir, cli_args)?;
    store.clear(&args.collection)?;

    output_result(
        "Collection cleared",
        &ClearResult {
            collection: args.collection.clone(),
        },
        cli_args,
    )
}

/// Show statistics of one or every collection.
fn show_stats(args: &StatsArgs, cli_args: &TesseraArgs) -> Result<()> {
    let store = open_store(&args.data_dir, cli_args)?;

    let collections: Vec<_> = match &args.collection {
        Some(name) => store.stats(name)?.into_iter().collect(),
        None => store
            .collections()
            .iter()
            .map(|name| store.stats(name))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .flatten()
            .collect(),
    };

    output_result("Collection statistics", &StatsResult { collections }, cli_args)
}

/// List collections.
fn list_collections(args: &ListArgs, cli_args: &TesseraArgs) -> Result<()> {
    let store = open_store(&args.data_dir, cli_args)?;

    output_result(
        "Collections",
        &ListResult {
            collections: store.collections(),
        },
        cli_args,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::snapshot::IndexSnapshot;
    use crate::persist::{encode_snapshot, snapshot_file_name};
    use clap::Parser;
    use std::io::Write;
    use tempfile::TempDir;

    fn parse(argv: &[&str]) -> TesseraArgs {
        TesseraArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_index_then_query_through_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("data");
        let docs_path = temp_dir.path().join("docs.jsonl");
        let mut docs = File::create(&docs_path).unwrap();
        writeln!(docs, r#"{{"id": "id 0", "text": "全文检索引擎"}}"#).unwrap();
        writeln!(docs, r#"{{"id": "id 1", "text": "开源工具包"}}"#).unwrap();
        drop(docs);

        let data = data_dir.to_str().unwrap();
        let args = parse(&["tessera", "-q", "index", data, "books", docs_path.to_str().unwrap()]);
        execute_command(args).unwrap();

        let store = open_store(&data_dir, &parse(&["tessera", "list", data])).unwrap();
        assert_eq!(store.collections(), vec!["books"]);
        assert_eq!(store.query("books", ["开源"], 10).unwrap().len(), 1);

        let args = parse(&["tessera", "-q", "clear", data, "books"]);
        execute_command(args).unwrap();
        let store = open_store(&data_dir, &parse(&["tessera", "list", data])).unwrap();
        assert!(store.query("books", ["开源"], 10).unwrap().is_empty());
    }

    #[test]
    fn test_missing_document_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let data = temp_dir.path().to_str().unwrap();
        let args = parse(&["tessera", "index", data, "books", "/nonexistent/docs.jsonl"]);
        assert!(execute_command(args).is_err());
    }

    #[test]
    fn test_empty_collection_name_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let data = temp_dir.path().to_str().unwrap();
        let args = parse(&["tessera", "query", data, "", "x"]);
        assert!(execute_command(args).is_err());
    }

    #[test]
    fn test_stats_of_every_collection() {
        let temp_dir = TempDir::new().unwrap();
        let data = temp_dir.path().to_str().unwrap();
        let store = open_store(temp_dir.path(), &parse(&["tessera", "list", data])).unwrap();
        store.source("a", "1", "全文").unwrap();
        store.index("a").unwrap();
        store.source("b", "1", "开源").unwrap();
        store.index("b").unwrap();
        drop(store);

        execute_command(parse(&["tessera", "-q", "stats", data])).unwrap();

        // A persisted collection whose stats cannot be read fails the listing
        // instead of disappearing from it.
        let unnamed = encode_snapshot("", &IndexSnapshot::empty(1)).unwrap();
        std::fs::write(temp_dir.path().join(snapshot_file_name("")), unnamed).unwrap();
        assert!(execute_command(parse(&["tessera", "-q", "stats", data])).is_err());
    }
}
