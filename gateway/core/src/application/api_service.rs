// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # API Service
//!
//! Entry point used by transport adapters: reads a domain model from the
//! Domain Store, compiles the selected aggregate and hands back a
//! [`CompiledApi`] that resolves individual fields.
//!
//! The domain model is read on every call. Callers that want to memoize may
//! do so per `(domain id, selector)`; compilation has no side effects.

use crate::application::compiler::{compile, CompileError, CompiledSchema};
use crate::application::dispatcher::ResolverDispatcher;
use crate::application::resolvers::{build_resolvers, ResolvedValue, ResolverGraph};
use crate::domain::model::{AggregateSelector, DomainModel};
use crate::domain::resolver::{ResolverError, ResolverTransport};
use crate::domain::store::{DocumentKey, DomainStore, StoreError};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, trace};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// `v<MAJOR>.<MINOR>` of this package, used to version the HTTP surface.
pub fn api_version() -> String {
    format!(
        "v{}.{}",
        env!("CARGO_PKG_VERSION_MAJOR"),
        env!("CARGO_PKG_VERSION_MINOR")
    )
}

pub struct ApiService {
    store: Arc<dyn DomainStore>,
    dispatcher: ResolverDispatcher,
}

impl ApiService {
    pub fn new(store: Arc<dyn DomainStore>, transport: Arc<dyn ResolverTransport>) -> Self {
        Self {
            store,
            dispatcher: ResolverDispatcher::new(transport),
        }
    }

    /// Read domain `domain_id` and compile the aggregate addressed by
    /// `selector`. A missing domain is reported as a missing aggregate.
    pub async fn get_interface(
        &self,
        domain_id: &str,
        selector: &AggregateSelector,
    ) -> Result<CompiledApi, ApiError> {
        let model = self.read_domain(domain_id, selector).await?.unwrap_or_default();
        let schema = compile(&model, selector)?;
        let resolvers = build_resolvers(&schema.definition, &schema.repository);

        debug!(domain = domain_id, %selector, fields = resolvers.keys().len(), "Interface ready");

        Ok(CompiledApi {
            schema,
            resolvers,
            dispatcher: self.dispatcher.clone(),
        })
    }

    /// Only the part of the domain document addressed by `selector` is
    /// decoded.
    async fn read_domain(
        &self,
        domain_id: &str,
        selector: &AggregateSelector,
    ) -> Result<Option<DomainModel>, StoreError> {
        trace!("reading domain info for {}", domain_id);

        let key = DocumentKey::domain(domain_id);
        let Some(document) = self.store.read(&key).await? else {
            debug!(domain = domain_id, "Domain not found in store");
            return Ok(None);
        };

        let model = DomainModel::from_document(&document, selector)?;
        Ok(Some(model))
    }
}

/// Schema text plus resolver graph for one aggregate version.
#[derive(Debug, Clone)]
pub struct CompiledApi {
    schema: CompiledSchema,
    resolvers: ResolverGraph,
    dispatcher: ResolverDispatcher,
}

impl CompiledApi {
    pub fn type_defs(&self) -> &str {
        &self.schema.type_defs
    }

    pub fn schema(&self) -> &CompiledSchema {
        &self.schema
    }

    pub fn resolvers(&self) -> &ResolverGraph {
        &self.resolvers
    }

    /// Resolve `type_name.field` on `receiver`. Errors are scoped to this one
    /// field.
    pub async fn resolve(
        &self,
        type_name: &str,
        field: &str,
        receiver: &ResolvedValue,
        args: Value,
        raw_ctxt: &Value,
    ) -> Result<ResolvedValue, ResolverError> {
        self.resolvers
            .resolve(&self.dispatcher, type_name, field, receiver, args, raw_ctxt)
            .await
    }
}
