// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Application Layer
//!
//! Use cases built on the domain layer.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Compile aggregates into APIs, resolve fields, route hosts

pub mod api_service;
pub mod compiler;
pub mod dispatcher;
pub mod resolvers;
pub mod route_service;
