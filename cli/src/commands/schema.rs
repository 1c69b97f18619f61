// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Print the compiled schema of one aggregate version

use anyhow::{Context, Result};
use lattice_core::application::api_service::ApiService;
use lattice_core::domain::gateway_config::GatewayConfig;
use lattice_core::domain::model::AggregateSelector;
use lattice_core::infrastructure::http_transport::HttpResolverTransport;
use std::sync::Arc;

pub async fn run(
    config: &GatewayConfig,
    domain: &str,
    context: &str,
    aggregate: &str,
    version: &str,
) -> Result<()> {
    let type_defs = compile_schema(config, domain, context, aggregate, version).await?;
    print!("{}", type_defs);
    Ok(())
}

async fn compile_schema(
    config: &GatewayConfig,
    domain: &str,
    context: &str,
    aggregate: &str,
    version: &str,
) -> Result<String> {
    let service = ApiService::new(
        super::domain_store(config),
        Arc::new(HttpResolverTransport::new()),
    );
    let selector = AggregateSelector::new(context, aggregate, version);

    let api = service
        .get_interface(domain, &selector)
        .await
        .with_context(|| format!("Failed to compile {} in domain '{}'", selector, domain))?;

    Ok(api.type_defs().to_string())
}
