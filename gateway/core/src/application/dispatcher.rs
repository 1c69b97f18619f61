// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Resolver Dispatcher
//!
//! Resolves a field backed by a remote resolver: one attempt, no caching, no
//! retry. The request context is filtered before it is put on the wire.

use crate::domain::context::ContextSnapshot;
use crate::domain::model::FieldSpec;
use crate::domain::resolver::{ResolverError, ResolverRequest, ResolverTransport};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Clone)]
pub struct ResolverDispatcher {
    transport: Arc<dyn ResolverTransport>,
}

impl ResolverDispatcher {
    pub fn new(transport: Arc<dyn ResolverTransport>) -> Self {
        Self { transport }
    }

    /// Resolve `type_name.field` through the resolver declared on `spec`.
    pub async fn dispatch(
        &self,
        type_name: &str,
        field: &str,
        spec: &FieldSpec,
        obj: Value,
        args: Value,
        raw_ctxt: &Value,
    ) -> Result<Value, ResolverError> {
        let Some(resolver) = &spec.resolver else {
            return Err(ResolverError::NotFound {
                type_name: type_name.to_string(),
                field: field.to_string(),
            });
        };

        let request = ResolverRequest {
            obj,
            args,
            ctxt: ContextSnapshot::filter(raw_ctxt),
        };

        debug!(uri = %resolver.uri, "{}.{} dispatching to resolver", type_name, field);

        let response = self
            .transport
            .execute(&resolver.uri, &request)
            .await
            .map_err(|source| {
                error!(uri = %resolver.uri, error = %source, "Unable to resolve {}.{}", type_name, field);
                ResolverError::Transport {
                    type_name: type_name.to_string(),
                    field: field.to_string(),
                    source,
                }
            })?;

        response.into_result().map_err(ResolverError::Application)
    }
}

impl std::fmt::Debug for ResolverDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverDispatcher").finish_non_exhaustive()
    }
}
