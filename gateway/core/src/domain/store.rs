// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Store Interface
//!
//! Key/value persistence contract for domain documents, read by `(type, id)`.
//! The store makes no caching guarantee; callers read on every request.
//!
//! | Document type | Contents | Reader |
//! |---------------|----------|--------|
//! | `domain` | [`DomainModel`](crate::domain::model::DomainModel) | `ApiService` |
//! | `domains` | [`RouteTable`](crate::domain::routing::RouteTable) keyed by host | `RouteService` |
//!
//! Implementations live in `crate::infrastructure::stores`.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

pub const DOMAIN_DOCUMENT: &str = "domain";
pub const ROUTES_DOCUMENT: &str = "domains";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    pub doc_type: String,
    pub id: String,
}

impl DocumentKey {
    pub fn new(doc_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            doc_type: doc_type.into(),
            id: id.into(),
        }
    }

    pub fn domain(id: impl Into<String>) -> Self {
        Self::new(DOMAIN_DOCUMENT, id)
    }

    pub fn routes(host: impl Into<String>) -> Self {
        Self::new(ROUTES_DOCUMENT, host)
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.doc_type, self.id)
    }
}

#[async_trait]
pub trait DomainStore: Send + Sync {
    /// Read a document. `Ok(None)` when nothing is stored under `key`.
    async fn read(&self, key: &DocumentKey) -> Result<Option<Value>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for StoreError {
    fn from(err: serde_yaml::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
