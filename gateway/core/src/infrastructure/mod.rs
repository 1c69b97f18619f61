// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Infrastructure Layer
//!
//! Concrete adapters for the domain's I/O contracts.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** HTTP resolver transport, Domain Store backends, backend view proxy

pub mod http_transport;
pub mod stores;
pub mod view_proxy;
