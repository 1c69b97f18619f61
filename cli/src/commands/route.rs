// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Resolve the backend view for a host and URL

use anyhow::{Context, Result};
use colored::Colorize;
use lattice_core::application::route_service::RouteService;
use lattice_core::domain::gateway_config::GatewayConfig;

pub async fn run(config: &GatewayConfig, host: &str, url: &str) -> Result<()> {
    let service = RouteService::new(super::domain_store(config), &config.route_cache);

    let target = service
        .reroute(host, url)
        .await
        .with_context(|| format!("Failed to resolve route for {}{}", host, url))?;

    match target {
        Some(target) => {
            println!("{}", target.upstream);
            println!("  {} {}", "Host:".dimmed(), target.host);
        }
        None => {
            println!("{}", format!("No route for {}{}", host, url).yellow());
        }
    }

    Ok(())
}
