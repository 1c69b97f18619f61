// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the Lattice CLI

pub mod config;
pub mod route;
pub mod schema;
pub mod serve;

pub use self::config::ConfigCommand;

use lattice_core::domain::gateway_config::GatewayConfig;
use lattice_core::infrastructure::stores::FileDomainStore;
use std::sync::Arc;

/// Domain Store rooted at the configured directory.
pub(crate) fn domain_store(config: &GatewayConfig) -> Arc<FileDomainStore> {
    Arc::new(FileDomainStore::new(config.store.root.clone()))
}
