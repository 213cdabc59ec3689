//! ESG value engine CLI
//!
//! Mints an asset from an invoice JSON file and prints the asset with its
//! monetization estimates.

use anyhow::Context;
use clap::Parser;
use esg_core::{EsgAsset, InvoiceRecord};
use serde::Serialize;
use std::path::PathBuf;
use value_engine::{Config, MonetizationOptions, ValueEngine};

#[derive(Parser, Debug)]
#[command(name = "esg-engine")]
#[command(about = "Score an invoice and mint its ESG asset")]
struct Cli {
    /// Invoice JSON file
    invoice: PathBuf,

    /// Path to configuration file (environment variables when absent)
    #[arg(short, long, env = "ESG_ENGINE_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Pretty-print the result
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
struct MintReport {
    asset: EsgAsset,
    monetization: MonetizationOptions,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout carries the report
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::from_env().context("loading config from environment")?,
    };
    tracing::info!(service = %config.service_name, "Starting ESG value engine");

    let raw = std::fs::read_to_string(&cli.invoice)
        .with_context(|| format!("reading invoice {}", cli.invoice.display()))?;
    let invoice: InvoiceRecord = serde_json::from_str(&raw).context("parsing invoice JSON")?;

    let engine = ValueEngine::new(config)?;
    let asset = engine.mint_from_invoice(&invoice)?;
    let monetization = engine.monetization_options(asset.asset_id)?;

    let report = MintReport {
        asset,
        monetization,
    };
    let output = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", output);

    Ok(())
}
