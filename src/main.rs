//! `bd-spdx-export` — export a Black Duck project version's BOM as an SPDX 2.2 document.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]) and initialise logging.
//! 2. Load the config file and resolve settings ([`config`]).
//! 3. Authenticate and fetch the project version and its BOM ([`blackduck`]).
//! 4. Optionally expand sub-projects into their own BOMs (`--recursive`).
//! 5. Build the document ([`export::assemble`]).
//! 6. Write it as JSON ([`document::write_document`]) and print a summary ([`report`]).

mod blackduck;
mod cli;
mod config;
mod document;
mod error;
mod export;
mod license;
mod models;
mod report;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use blackduck::records::to_project_version;
use blackduck::BlackDuckClient;
use cli::Cli;
use config::{load_config, Settings};
use export::{assemble, AssembleOptions};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let working_dir = std::env::current_dir()?;
    let config = load_config(&working_dir, cli.config.as_deref())?;
    let settings = match Settings::resolve(&cli, config) {
        Ok(settings) => settings,
        Err(missing) => {
            eprintln!("{} {}", "error:".red().bold(), missing);
            std::process::exit(2);
        }
    };

    if !cli.quiet {
        eprintln!(
            "\n {} v{}",
            "bd-spdx-export".bold(),
            env!("CARGO_PKG_VERSION")
        );
        eprintln!(
            " Working on project '{}' version '{}'\n",
            cli.project, cli.project_version
        );
    }

    let progress = spinner(cli.quiet)?;
    let client = BlackDuckClient::connect(&settings.connection, progress.clone()).await?;

    let (project, version) = client.find_project_version(&cli.project, &cli.project_version).await?;
    let mut bom = client.fetch_bom(&version, settings.flat).await?;
    if settings.recursive {
        client.expand_subprojects(&mut bom, settings.flat).await?;
    }
    progress.finish_and_clear();

    let project_version = to_project_version(&project, version);
    info!(
        project = %project_version.project_name,
        version = %project_version.version_name,
        created_at = ?project_version.created_at,
        "fetched BOM"
    );
    let options = AssembleOptions {
        internal: settings.internal,
        normalize_licenses: settings.normalize_licenses,
        ..AssembleOptions::default()
    };
    let doc = assemble(&project_version, &bom, &options)?;

    document::write_document(&doc, &settings.output)?;
    report::terminal::render(&doc, &settings.output, cli.verbose, cli.quiet)?;

    Ok(())
}

fn spinner(quiet: bool) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}
