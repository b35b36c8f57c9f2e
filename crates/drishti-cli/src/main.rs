//! Drishti command-line interface.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use drishti_common::{Document, EngineConfig};
use drishti_core::MultimodalEngine;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "drishti")]
#[command(about = "Drishti multimodal search engine CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding the persisted collections
    #[arg(long, default_value = "./drishti_db", global = true)]
    data_dir: PathBuf,

    /// Collection name
    #[arg(long, default_value = "articles", global = true)]
    collection: String,

    /// Text embedding model identifier (e.g. "hashing:384", "ollama:mxbai-embed-large")
    #[arg(long, default_value = "hashing:384", global = true)]
    text_model: String,

    /// Cross-modal model identifier, or "none" to disable image indexing
    #[arg(long, default_value = "hashing:512", global = true)]
    cross_modal_model: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest documents from a JSON file (an array of documents)
    Ingest {
        /// Path to the JSON file
        input: PathBuf,
    },
    /// Search the collection
    Search {
        /// Search query
        query: String,
        /// Number of results
        #[arg(short = 'k', long, default_value = "5")]
        top_k: usize,
        /// Skip the image partition
        #[arg(long)]
        no_images: bool,
    },
    /// Show collection statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config = EngineConfig {
        persist_directory: cli.data_dir.clone(),
        collection_name: cli.collection.clone(),
        text_embedding_model: cli.text_model.clone(),
        cross_modal_model: if cli.cross_modal_model == "none" {
            None
        } else {
            Some(cli.cross_modal_model.clone())
        },
    };

    let engine = MultimodalEngine::open(&config)?;

    match cli.command {
        Commands::Ingest { input } => {
            let raw = std::fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let documents: Vec<Document> = serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse {}", input.display()))?;

            let report = engine.ingest(&documents).await?;
            println!(
                "Indexed {} documents ({} skipped), {} images ({} skipped)",
                report.documents_indexed,
                report.documents_skipped,
                report.images_indexed,
                report.images_skipped
            );
        }
        Commands::Search {
            query,
            top_k,
            no_images,
        } => {
            let results = engine.search(&query, top_k, !no_images).await?;
            if results.is_empty() {
                println!("No results.");
            }
            for (rank, result) in results.iter().enumerate() {
                let title = result
                    .metadata
                    .get("title")
                    .and_then(|v| v.as_str())
                    .unwrap_or("<untitled>");
                println!(
                    "{}. [{:?}] {:.4}  {}",
                    rank + 1,
                    result.modality,
                    result.similarity,
                    title
                );
                if !result.image_refs.is_empty() {
                    println!("   images: {}", result.image_refs.join(", "));
                }
            }
        }
        Commands::Stats => {
            let stats = engine.stats()?;
            println!("Collection '{}':", cli.collection);
            println!("  text documents:  {}", stats.text_documents);
            println!("  image documents: {}", stats.image_documents);
            println!("  total:           {}", stats.total_documents);
            println!(
                "  cross-modal:     {}",
                if engine.cross_modal_available() {
                    "available"
                } else {
                    "unavailable (text-only mode)"
                }
            );
        }
    }

    Ok(())
}
