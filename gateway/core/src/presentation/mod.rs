// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Presentation Layer
//!
//! HTTP surface for compiled aggregate APIs.
//!
//! # Architecture
//!
//! - **Layer:** Presentation
//! - **Purpose:** axum router over `ApiService`, host reroute layer over `RouteService`

pub mod api;
