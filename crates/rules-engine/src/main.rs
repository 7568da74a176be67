//! `rules-engine` command line: serve the webhooks, import intents, check sources.

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use log::{debug, error, info};
use rules_engine::config::{LayeredConfigOptions, RulesEngineConfig};
use rules_engine::source::{SqliteIntentSource, import_csv};
use rules_engine::{build_state, init_logging, open_sources};
use std::path::{Path, PathBuf};

/// Command-line options for the rules engine.
#[derive(Parser)]
#[command(name = "rules-engine", version, about)]
struct Cli {
    /// Extra rules-engine.json5 applied over the discovered layers
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP webhook server
    Serve {
        /// Listen address, overriding `server.bind`
        #[arg(long)]
        bind: Option<String>,
    },
    /// Upsert intent rows from a CSV file into the SQLite intent store
    Import {
        /// CSV file with an intent_id,intent_name,... header
        csv: PathBuf,
        /// SQLite file, overriding `intents.path`
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Open the configured sources and read from each once
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let sources = open_sources(&config).context("failed to open sources")?;
            let state = build_state(&config, sources);
            rules_engine::server::serve(&bind, state)
                .await
                .context("server stopped")?;
        }
        Command::Import { csv, db } => {
            let db = db.unwrap_or_else(|| config.intents.path.clone());
            info!("import target (db={})", db.display());
            let target = SqliteIntentSource::open(&db)
                .with_context(|| format!("failed to open {}", db.display()))?;
            let report = import_csv(&csv, &target)
                .await
                .with_context(|| format!("failed to import {}", csv.display()))?;
            println!(
                "read {} rows, imported {}, skipped {}",
                report.read, report.imported, report.skipped
            );
        }
        Command::Check => check(&config).await?,
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<RulesEngineConfig> {
    let cwd = std::env::current_dir().context("failed to resolve current working directory")?;
    let mut options = LayeredConfigOptions::new(&cwd);
    if let Some(path) = path {
        options = options.with_runtime_path(path);
    }
    let layered = RulesEngineConfig::load_layered_with_options(options)
        .context("failed to load layered config")?;
    debug!("layered config loaded (layers={})", layered.layers.len());
    Ok(layered.config)
}

async fn check(config: &RulesEngineConfig) -> anyhow::Result<()> {
    let sources = open_sources(config).context("failed to open sources")?;
    let mut failed = false;

    match sources.documents.ping().await {
        Ok(()) => println!("documents ({:?}): ok", config.documents.provider),
        Err(err) => {
            error!("document source check failed (error={})", err);
            println!("documents ({:?}): FAILED: {err}", config.documents.provider);
            failed = true;
        }
    }
    match sources.intents.list_all().await {
        Ok(intents) => println!(
            "intents ({:?}): ok, {} rows",
            config.intents.provider,
            intents.len()
        ),
        Err(err) => {
            error!("intent source check failed (error={})", err);
            println!("intents ({:?}): FAILED: {err}", config.intents.provider);
            failed = true;
        }
    }

    if failed {
        bail!("source check failed");
    }
    Ok(())
}
