// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use lattice_core::domain::gateway_config::{GatewayConfig, CONFIG_PATH_ENV};
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
    config: &GatewayConfig,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, config, paths),
    }
}

fn show(config_override: Option<PathBuf>, config: &GatewayConfig, show_paths: bool) -> Result<()> {
    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. {}: {}",
            CONFIG_PATH_ENV,
            std::env::var(CONFIG_PATH_ENV)
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./lattice-config.yaml");
        println!("  4. ~/.lattice/config.yaml");
        println!("  5. /etc/lattice/config.yaml");
        if let Some(found) = GatewayConfig::discover_config() {
            println!("  {} {}", "Discovered:".green(), found.display());
        }
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!();
    print!("{}", config.to_yaml_string()?);

    Ok(())
}
