// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// File-backed Domain Store
//
// Reads documents from `<root>/<type>/<id>.{yaml,yml,json}`. The first
// existing file wins in that extension order. A missing file is "not found";
// a malformed file is a serialization error.

use crate::domain::store::{DocumentKey, DomainStore, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::trace;

const EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

pub struct FileDomainStore {
    root: PathBuf,
}

impl FileDomainStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Key segments are used as path components; anything that could escape
    /// the store root is rejected as not found.
    fn is_safe_segment(segment: &str) -> bool {
        !segment.is_empty()
            && segment != "."
            && segment != ".."
            && !segment.contains(['/', '\\', '\0'])
    }

    fn candidates(&self, key: &DocumentKey) -> Vec<PathBuf> {
        let dir = self.root.join(&key.doc_type);
        EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{}.{}", key.id, ext)))
            .collect()
    }
}

#[async_trait]
impl DomainStore for FileDomainStore {
    async fn read(&self, key: &DocumentKey) -> Result<Option<Value>, StoreError> {
        if !Self::is_safe_segment(&key.doc_type) || !Self::is_safe_segment(&key.id) {
            trace!(%key, "Rejected unsafe document key");
            return Ok(None);
        }

        for path in self.candidates(key) {
            let content = match tokio::fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            trace!(path = %path.display(), "Read document");

            let document = if path.extension().is_some_and(|ext| ext == "json") {
                serde_json::from_str(&content)?
            } else {
                serde_yaml::from_str(&content)?
            };
            return Ok(Some(document));
        }

        Ok(None)
    }
}
