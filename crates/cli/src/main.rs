//! kbseed CLI - knowledge-base collection provisioner
//!
//! This binary provisions the vector collection backing the knowledge base
//! and seeds it with sample records.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use kbseed::storage_init::load_config;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "kbseed")]
#[command(about = "Provision and seed the knowledge-base vector collection")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Drop and recreate the collection, then seed sample records (destroys existing data)
    Provision {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Leave the new collection empty
        #[arg(long)]
        no_seed: bool,
    },
    /// Create the collection if it is missing, keeping existing data
    Ensure,
    /// Drop the collection and all of its data (requires confirmation)
    Drop {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show whether the collection exists, its layout and row count
    Status,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Provision { yes, no_seed } => provision(config_path, yes, !no_seed).await,
        Commands::Ensure => ensure(config_path).await,
        Commands::Drop { yes } => drop_collection(config_path, yes).await,
        Commands::Status => status(config_path).await,
    };

    exit_code(result)
}

/// Log a failed run once and map it to the process exit status
fn exit_code(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging system
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "kbseed={level},kbseed_core={level},kbseed_storage={level},kbseed_embeddings={level}"
        ))
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}

fn confirm(prompt: String) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| anyhow!("Failed to read confirmation: {e}"))
}

async fn provision(config_path: Option<&Path>, yes: bool, seed: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let name = &config.collection.name;

    if !yes
        && !confirm(format!(
            "This drops collection '{name}' and ALL of its data before recreating it. Continue?"
        ))?
    {
        println!("Operation cancelled. Use 'kbseed ensure' to keep existing data.");
        return Ok(());
    }

    let summary = kbseed::provision(&config, seed).await?;

    println!("Collection '{}' is loaded", summary.collection);
    if let Some(report) = summary.seed {
        println!(
            "  Seeded {} records ({}-dimensional vectors from '{}')",
            report.inserted, report.dimension, report.model
        );
    }
    println!("  Row count: {}", summary.row_count);
    Ok(())
}

async fn ensure(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let handle = kbseed::ensure(&config).await?;
    let rows = handle.count().await?;

    println!("Collection '{}' is loaded ({rows} rows)", handle.name());
    Ok(())
}

async fn drop_collection(config_path: Option<&Path>, yes: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let name = &config.collection.name;

    if !yes && !confirm(format!("Drop collection '{name}' and ALL of its data?"))? {
        println!("Operation cancelled.");
        return Ok(());
    }

    info!(collection = %name, "User confirmed drop operation, proceeding...");
    if kbseed::drop_collection(&config).await? {
        println!("Dropped collection '{name}'");
    } else {
        println!("Collection '{name}' does not exist");
    }
    Ok(())
}

async fn status(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;

    let Some(status) = kbseed::status(&config).await? else {
        println!("Collection '{}' does not exist", config.collection.name);
        return Ok(());
    };

    let spec = &status.description.spec;
    println!("Collection '{}'", spec.name);
    println!("  Shards: {}", spec.shard_count);
    for field in &spec.fields {
        println!("  {:<10} {:?}", field.name, field.data_type);
    }
    match &status.description.index {
        Some(index) => println!(
            "  Index: {} / {} on '{}' {:?}",
            index.index_type, index.metric, index.field, index.params
        ),
        None => println!("  Index: none"),
    }
    println!("  Loaded: {}", status.description.loaded);
    println!("  Rows: {}", status.row_count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_provision_flags() {
        let cli = Cli::try_parse_from(["kbseed", "provision", "--yes", "--no-seed"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Provision {
                yes: true,
                no_seed: true
            }
        ));
    }

    #[test]
    fn test_global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["kbseed", "status", "--config", "kb.toml", "-v"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("kb.toml")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_failed_run_exits_non_zero() {
        let failed = exit_code(Err(anyhow!("Vector store is not reachable")));
        assert_eq!(format!("{failed:?}"), format!("{:?}", ExitCode::FAILURE));

        let succeeded = exit_code(Ok(()));
        assert_eq!(format!("{succeeded:?}"), format!("{:?}", ExitCode::SUCCESS));
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["kbseed"]).is_err());
    }
}
