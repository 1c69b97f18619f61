// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// In-Memory Domain Store
//
// Development and test implementation of DomainStore. Documents are kept as
// JSON values keyed by (type, id).

use crate::domain::store::{DocumentKey, DomainStore, StoreError};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Default)]
pub struct InMemoryDomainStore {
    documents: RwLock<HashMap<DocumentKey, Value>>,
}

impl InMemoryDomainStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `document` under `key`, replacing any previous document.
    pub fn insert(&self, key: DocumentKey, document: Value) {
        self.documents.write().insert(key, document);
    }

    pub fn remove(&self, key: &DocumentKey) -> Option<Value> {
        self.documents.write().remove(key)
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

#[async_trait]
impl DomainStore for InMemoryDomainStore {
    async fn read(&self, key: &DocumentKey) -> Result<Option<Value>, StoreError> {
        Ok(self.documents.read().get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_read_by_type_and_id() {
        let store = InMemoryDomainStore::new();
        store.insert(DocumentKey::domain("acme"), json!({"repositories": {}}));

        let found = store.read(&DocumentKey::domain("acme")).await.unwrap();
        assert_eq!(found, Some(json!({"repositories": {}})));

        let other_type = store.read(&DocumentKey::routes("acme")).await.unwrap();
        assert!(other_type.is_none());
    }
}
