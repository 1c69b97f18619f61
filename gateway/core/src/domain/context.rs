// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Request Context Filter
//!
//! Every request context that leaves the process (sent to a resolver endpoint)
//! or is captured in a [`Transaction`](crate::domain::transaction::Transaction)
//! is first projected onto a fixed allow-list. Everything else, including
//! headers and credentials, is dropped.
//!
//! Decoding a snapshot applies the same projection, so a snapshot read back
//! from a client-supplied value never carries more than the allow-list.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Keys retained by [`ContextSnapshot::filter`].
pub const CONTEXT_KEYS: [&str; 12] = [
    "baseUrl",
    "cookies",
    "hostname",
    "ip",
    "method",
    "originalUrl",
    "params",
    "path",
    "protocol",
    "query",
    "route",
    "user",
];

/// Immutable, allow-listed view of a request context.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ContextSnapshot(BTreeMap<String, Value>);

impl<'de> Deserialize<'de> for ContextSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(Self::filter(&raw))
    }
}

impl ContextSnapshot {
    /// Project `raw` onto [`CONTEXT_KEYS`]. A non-object context yields an
    /// empty snapshot.
    pub fn filter(raw: &Value) -> Self {
        let Some(fields) = raw.as_object() else {
            return Self::default();
        };

        Self(
            CONTEXT_KEYS
                .iter()
                .filter_map(|key| fields.get(*key).map(|v| (key.to_string(), v.clone())))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone().into_iter().collect())
    }
}
