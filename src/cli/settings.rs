// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Args;

use crate::config::SdkConfig;
use crate::version;

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Print as JSON instead of TOML
    #[arg(long)]
    pub json: bool,
}

pub fn show_config(args: ConfigArgs, config: &SdkConfig) -> Result<()> {
    println!("{}", render_config(config, args.json)?);
    Ok(())
}

/// Effective configuration, with the SDK version alongside it
pub fn render_config(config: &SdkConfig, json: bool) -> Result<String> {
    if json {
        let rendered = serde_json::json!({
            "sdk": version::get_version_info(),
            "config": config,
        });
        Ok(serde_json::to_string_pretty(&rendered)?)
    } else {
        Ok(format!(
            "# {}\n{}",
            version::get_version_string(),
            toml::to_string_pretty(config)?
        ))
    }
}
