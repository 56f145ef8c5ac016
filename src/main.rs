//! Pressline - an asset pipeline for static sites.

mod asset;
mod bundle;
mod cache;
mod cli;
mod config;
mod document;
mod logger;
mod pipeline;
mod stage;
mod utils;

use anyhow::{Result, bail};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::PresslineConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = PresslineConfig::load(&cli)?;

    match &cli.command {
        Commands::Build { .. } => {
            let report = cli::build::build(&config, false)?;
            if report.has_failures() {
                bail!(
                    "{} failed",
                    utils::plural_count(report.failed.len(), "document")
                );
            }
            Ok(())
        }
    }
}
