// arbor/client/src/main.rs

use anyhow::{bail, Context, Result};
use arbor_storage::{NodeStore, RocksDB};
use arbor_sync::{
    verify_complete, SyncConfig, SyncOrchestrator, SyncOutcome, TreeId,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod http_source;

use config::ClientConfig;
use http_source::HttpNodeSource;

#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "Verified Merkle tree sync client")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Tree server base URL (overrides config)
    #[arg(long, value_name = "URL")]
    server: Option<String>,

    /// Local database directory (overrides config)
    #[arg(long, value_name = "DIR")]
    db_path: Option<PathBuf>,

    /// Maximum accepted tree height (overrides config)
    #[arg(long, value_name = "N")]
    max_height: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download and verify a tree from the server
    Sync {
        /// Tree id (hex, 32 bytes)
        tree_id: String,
    },

    /// Show the latest committed root for a tree
    Root {
        /// Tree id (hex, 32 bytes)
        tree_id: String,
    },

    /// Walk a committed tree in storage and verify it is complete.
    /// Holds every visited hash in memory; meant for small trees.
    Audit {
        /// Tree id (hex, 32 bytes)
        tree_id: String,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").map(|f| f == "json").unwrap_or(false) {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    if let Some(server) = &cli.server {
        config.server_url = server.clone();
    }
    if let Some(db_path) = &cli.db_path {
        config.db_path = db_path.clone();
    }
    if let Some(max_height) = cli.max_height {
        config.max_tree_height = max_height;
    }
    config.validate()?;
    Ok(config)
}

fn open_store(config: &ClientConfig) -> Result<Arc<NodeStore>> {
    let db = RocksDB::open(&config.db_path)
        .with_context(|| format!("failed to open database at {}", config.db_path.display()))?;
    Ok(Arc::new(NodeStore::new(Arc::new(db))))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Sync { tree_id } => {
            let tree_id = TreeId::from_hex(tree_id).context("invalid tree id")?;
            let store = open_store(&config)?;
            let source = Arc::new(HttpNodeSource::new(
                config.server_url.clone(),
                Duration::from_secs(config.request_timeout_secs),
            )?);
            info!(server = %config.server_url, tree = %tree_id, "syncing");

            let orchestrator = SyncOrchestrator::with_config(
                source,
                store,
                SyncConfig {
                    max_tree_height: config.max_tree_height,
                },
            );
            match orchestrator.sync(tree_id).await? {
                SyncOutcome::Completed(stats) => {
                    println!(
                        "Synced tree {} generation {}: {} terminal nodes, {} internal nodes in {:.2?}",
                        tree_id,
                        stats.generation,
                        stats.terminal_nodes,
                        stats.internal_nodes,
                        stats.elapsed
                    );
                }
                SyncOutcome::RootChanged => {
                    println!("Remote tree changed during download; nothing committed. Retry later.");
                }
            }
        }

        Commands::Root { tree_id } => {
            let tree_id = TreeId::from_hex(tree_id).context("invalid tree id")?;
            let store = open_store(&config)?;
            match store.get_root(&tree_id)? {
                Some(record) => {
                    let root = record
                        .node_hash
                        .map(|h| h.to_hex())
                        .unwrap_or_else(|| "(empty tree)".to_string());
                    println!(
                        "Tree {}: generation {} status {:?} root {}",
                        tree_id, record.generation, record.status, root
                    );
                }
                None => println!("No committed root for tree {}", tree_id),
            }
        }

        Commands::Audit { tree_id } => {
            let tree_id = TreeId::from_hex(tree_id).context("invalid tree id")?;
            let store = open_store(&config)?;
            let Some(record) = store.get_root(&tree_id)? else {
                bail!("no committed root for tree {}", tree_id);
            };
            match record.node_hash {
                Some(root) => {
                    let report = verify_complete(store.as_ref(), &root).await?;
                    println!(
                        "Tree {} generation {} is complete: {} terminal nodes, {} internal nodes",
                        tree_id, record.generation, report.terminal_nodes, report.internal_nodes
                    );
                }
                None => println!("Tree {} generation {} is empty", tree_id, record.generation),
            }
        }
    }

    Ok(())
}
