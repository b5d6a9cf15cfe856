// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod history;
pub mod settings;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::SdkConfig;

/// Confidential payments CLI
#[derive(Parser, Debug)]
#[command(name = "cpay-cli")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Inspect confidential payment history and SDK configuration", long_about = None)]
pub struct Cli {
    /// TOML configuration file (defaults to Sepolia plus CPAY_* environment overrides)
    #[arg(long, global = true, env = "CPAY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rebuild an account's payment history from gateway events
    History(history::HistoryArgs),

    /// Print the effective configuration
    Config(settings::ConfigArgs),
}

pub fn load_config(path: Option<&PathBuf>) -> Result<SdkConfig> {
    match path {
        Some(path) => SdkConfig::from_toml_file(path),
        None => SdkConfig::from_env(),
    }
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_ref())?;
    match cli.command {
        Commands::History(args) => history::show_history(args, &config).await,
        Commands::Config(args) => settings::show_config(args, &config),
    }
}
