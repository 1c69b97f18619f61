// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Host Route Service
//!
//! Resolves an inbound `(host, url)` to the backend view that should serve it.
//! Route tables are read from the Domain Store under `{type: "domains", id:
//! <host>}` and cached per host in a bounded LRU with a maximum entry age.
//!
//! Hosts without a route document cache an empty table, so unknown hosts do
//! not hit the store on every request. Store failures are never cached.

use crate::domain::gateway_config::RouteCacheConfig;
use crate::domain::routing::{RouteTable, RouteTarget};
use crate::domain::store::{DocumentKey, DomainStore, StoreError};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, trace};

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("Unable to check if request has a view: {0}")]
    Lookup(#[from] StoreError),
}

struct CachedRoutes {
    table: Arc<RouteTable>,
    loaded_at: Instant,
}

pub struct RouteService {
    store: Arc<dyn DomainStore>,
    cache: Mutex<LruCache<String, CachedRoutes>>,
    max_age: Duration,
}

impl RouteService {
    pub fn new(store: Arc<dyn DomainStore>, config: &RouteCacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            store,
            cache: Mutex::new(LruCache::new(capacity)),
            max_age: config.max_age(),
        }
    }

    /// Backend target for `url` on `host`, or `None` when no route matches.
    pub async fn reroute(&self, host: &str, url: &str) -> Result<Option<RouteTarget>, RouteError> {
        let table = self.route_table(host).await?;
        let target = table.resolve(host, url);
        debug!(host, url, upstream = ?target.as_ref().map(|t| &t.upstream), "reroute");
        Ok(target)
    }

    /// Number of hosts currently cached.
    pub fn cached_hosts(&self) -> usize {
        self.cache.lock().len()
    }

    async fn route_table(&self, host: &str) -> Result<Arc<RouteTable>, RouteError> {
        if let Some(table) = self.cached(host) {
            return Ok(table);
        }

        trace!("reading domain routes for {}", host);
        let table = match self.store.read(&DocumentKey::routes(host)).await {
            Ok(Some(document)) => serde_json::from_value(document).map_err(StoreError::from)?,
            Ok(None) => RouteTable::default(),
            Err(e) => {
                error!(host, error = %e, "Unable to read domain routes");
                return Err(e.into());
            }
        };

        debug!(host, routes = table.routes.len(), "route config");

        let table = Arc::new(table);
        self.cache.lock().put(
            host.to_string(),
            CachedRoutes {
                table: table.clone(),
                loaded_at: Instant::now(),
            },
        );
        Ok(table)
    }

    fn cached(&self, host: &str) -> Option<Arc<RouteTable>> {
        let mut cache = self.cache.lock();
        let fresh = cache.get(host).map(|entry| {
            (entry.loaded_at.elapsed() < self.max_age).then(|| entry.table.clone())
        })?;

        if fresh.is_none() {
            cache.pop(host);
        }
        fresh
    }
}
