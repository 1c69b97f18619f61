// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # `lattice-core`: Aggregate API Compiler
//!
//! Compiles a declarative, versioned domain model into a typed API: schema
//! text plus a resolver graph whose fields either call remote resolvers or
//! stage commands on immutable transactions.
//!
//! ## Crate Layout
//!
//! | Module | Layer | Contents |
//! |--------|-------|----------|
//! | [`domain`] | Domain | model, merge, context filter, transactions, store and transport contracts |
//! | [`application`] | Application | compiler, resolver graph, dispatcher, `ApiService`, `RouteService` |
//! | [`infrastructure`] | Infrastructure | reqwest transport, in-memory and file stores, view proxy |
//! | [`presentation`] | Presentation | axum router (`/health`, schema, resolve) behind host rerouting |

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
