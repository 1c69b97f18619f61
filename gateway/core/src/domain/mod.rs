// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Layer
//!
//! Pure types and contracts. The only I/O boundaries are the
//! [`store::DomainStore`] and [`resolver::ResolverTransport`] traits.
//!
//! | Module | Key Types |
//! |--------|-----------|
//! | [`model`] | `DomainModel`, `AggregateDefinition`, `FieldSpec`, `AggregateSelector` |
//! | [`field_map`] | `FieldMap` |
//! | [`merge`] | `DefaultsMerge` |
//! | [`context`] | `ContextSnapshot` |
//! | [`transaction`] | `Transaction`, `StagedTask`, `CommitResult` |
//! | [`resolver`] | `ResolverTransport`, `ResolverError` |
//! | [`store`] | `DomainStore`, `DocumentKey` |
//! | [`routing`] | `RouteTable`, `RouteTarget` |
//! | [`gateway_config`] | `GatewayConfig` |

pub mod context;
pub mod field_map;
pub mod gateway_config;
pub mod merge;
pub mod model;
pub mod resolver;
pub mod routing;
pub mod store;
pub mod transaction;
