// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Remote Resolver Contract
//!
//! Fields backed by a `resolver.uri` are resolved by a remote service. The
//! wire contract is fixed:
//!
//! ```text
//! POST <uri>   {"obj": <receiver>, "args": <field args>, "ctxt": <filtered context>}
//! 2xx          {"data": <value>}  |  {"error": <value>}
//! ```
//!
//! The transport that carries the envelope is pluggable through
//! [`ResolverTransport`]; the HTTP implementation lives in
//! `crate::infrastructure::http_transport`.

use crate::domain::context::ContextSnapshot;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request envelope sent to a resolver endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverRequest {
    pub obj: Value,
    pub args: Value,
    pub ctxt: ContextSnapshot,
}

/// Response envelope returned by a resolver endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolverResponse {
    #[serde(default)]
    pub data: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl ResolverResponse {
    /// `Err` carrying the application error verbatim, otherwise the data.
    /// An explicit `"error": null` counts as no error.
    pub fn into_result(self) -> Result<Value, Value> {
        match self.error {
            Some(error) if !error.is_null() => Err(error),
            _ => Ok(self.data),
        }
    }
}

/// Carries one resolver envelope to `uri` and back. One call is one attempt.
#[async_trait]
pub trait ResolverTransport: Send + Sync {
    async fn execute(
        &self,
        uri: &str,
        payload: &ResolverRequest,
    ) -> Result<ResolverResponse, TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Resolver endpoint returned HTTP {0}")]
    Status(u16),

    #[error("Failed to decode resolver response: {0}")]
    Decode(String),
}

/// Field-scoped resolution failures.
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    /// The field is declared but has no resolver.
    #[error("Resolver not found for {type_name}.{field}")]
    NotFound { type_name: String, field: String },

    /// The resolver endpoint could not be reached or answered unusably. The
    /// message never includes the response payload.
    #[error("Unexpected error while resolving {type_name}.{field}")]
    Transport {
        type_name: String,
        field: String,
        #[source]
        source: TransportError,
    },

    /// The resolver answered with an `error` value, passed through unchanged.
    #[error("{0}")]
    Application(Value),

    #[error("Field {type_name}.{field} is not part of the schema")]
    UnknownField { type_name: String, field: String },

    #[error("Field {type_name}.{field} expects a {expected} receiver")]
    InvalidReceiver {
        type_name: String,
        field: String,
        expected: &'static str,
    },
}

impl ResolverError {
    /// Wire representation: the verbatim payload for application errors, the
    /// display message for everything else.
    pub fn to_wire(&self) -> Value {
        match self {
            ResolverError::Application(value) => value.clone(),
            other => Value::String(other.to_string()),
        }
    }
}
