// SPDX-License-Identifier: MIT OR Apache-2.0
//! `nodeflow` - command line access to flow files.
//!
//! ```bash
//! nodeflow inspect flow.json
//! nodeflow convert legacy.json drawflow-export.json
//! nodeflow init-config nodeflow.ron
//! ```
//!
//! Log output is controlled with `RUST_LOG`.

use clap::{Parser, Subcommand};
use nodeflow_editor::config::CONFIG_FILE_NAME;
use nodeflow_editor::{ConfigError, EditorConfig, FlowError, GraphStore};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "nodeflow_editor=info";

#[derive(Parser)]
#[command(name = "nodeflow")]
#[command(about = "Inspect and convert node-graph flow files", long_about = None)]
struct Cli {
    /// Editor config file (RON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the modules of a flow file with node and connection counts
    Inspect {
        /// Flow file (envelope or legacy shape)
        file: PathBuf,
    },

    /// Import a flow file and write it back in the current envelope format
    Convert {
        /// Flow file to read
        input: PathBuf,
        /// File to write
        output: PathBuf,
    },

    /// Write the effective editor config
    InitConfig {
        /// Destination file
        #[arg(default_value = CONFIG_FILE_NAME)]
        path: PathBuf,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    match cli.command {
        Commands::Inspect { file } => runtime.block_on(inspect(&config, &file)),
        Commands::Convert { input, output } => runtime.block_on(convert(&config, &input, &output)),
        Commands::InitConfig { path } => {
            config.save(&path)?;
            Ok(())
        }
    }
}

async fn inspect(config: &EditorConfig, file: &Path) -> Result<(), CliError> {
    let mut store = GraphStore::<serde_json::Value>::with_config(config);
    let summary = store.import_flow_from_file(file, true).await?;

    println!("{}", file.display());
    for module in store.module_summaries() {
        println!(
            "  {}: {} nodes, {} connections",
            module.name, module.nodes, module.connections
        );
    }
    if summary.dropped_connections > 0 {
        println!("  ({} connections could not be resolved)", summary.dropped_connections);
    }
    Ok(())
}

async fn convert(config: &EditorConfig, input: &Path, output: &Path) -> Result<(), CliError> {
    let mut store = GraphStore::<serde_json::Value>::with_config(config);
    store.import_flow_from_file(input, true).await?;
    store.export_flow_to_file(Some(output)).await?;
    Ok(())
}
