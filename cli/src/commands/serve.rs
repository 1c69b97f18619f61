// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP server

use anyhow::{Context, Result};
use lattice_core::application::api_service::{api_version, ApiService};
use lattice_core::application::route_service::RouteService;
use lattice_core::domain::gateway_config::GatewayConfig;
use lattice_core::infrastructure::http_transport::HttpResolverTransport;
use lattice_core::presentation::api::{app, HttpOptions};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

pub async fn run(config: GatewayConfig) -> Result<()> {
    let store = super::domain_store(&config);
    let transport = Arc::new(HttpResolverTransport::new());
    let api_service = Arc::new(ApiService::new(store.clone(), transport));
    let route_service = Arc::new(RouteService::new(store, &config.route_cache));

    let router = app(
        api_service,
        route_service,
        HttpOptions {
            dev: config.dev,
            trust_proxy: config.server.trust_proxy,
        },
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(
        addr = %addr,
        api = %api_version(),
        store = %config.store.root.display(),
        dev = config.dev,
        trust_proxy = config.server.trust_proxy,
        log_level = %config.log_level,
        "Started {}#v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("HTTP server failed")?;

    info!("Server shutting down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
