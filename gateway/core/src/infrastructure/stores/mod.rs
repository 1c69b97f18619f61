// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain Store implementations
//!
//! - [`InMemoryDomainStore`] for development and tests
//! - [`FileDomainStore`] for a directory of YAML/JSON documents

pub mod file;
pub mod memory;

pub use file::FileDomainStore;
pub use memory::InMemoryDomainStore;
