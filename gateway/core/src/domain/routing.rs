// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Host Routing Rules
//!
//! Each inbound host may publish a route table under `{type: "domains", id:
//! <host>}`. A route mounts a backend view at a path prefix:
//!
//! ```yaml
//! routes:
//!   - path: /api
//!     view: http://backend:9000
//!     passthru: true     # forward the URL remainder after the mount path
//!   - path: /
//!     view: http://static:8080/index.html
//! ```
//!
//! Routes are tried in order; the first mounted prefix matching the URL wins.
//! Routes without a `view` are ignored.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteTable {
    #[serde(default)]
    pub routes: Vec<RouteRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRule {
    #[serde(default = "default_mount_path")]
    pub path: String,

    #[serde(default)]
    pub view: Option<String>,

    #[serde(default)]
    pub passthru: bool,
}

fn default_mount_path() -> String {
    "/".to_string()
}

/// Where an inbound request should be forwarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTarget {
    pub upstream: String,
    /// Original `Host` header, forwarded unchanged.
    pub host: String,
}

impl RouteRule {
    /// URL remainder after the mount path, or `None` if the rule does not
    /// match. Matching is per path segment, so `/api` matches `/api` and
    /// `/api/x` but not `/apix`.
    fn strip_mount<'a>(&self, url: &'a str) -> Option<&'a str> {
        let mount = self.path.trim_end_matches('/');
        if mount.is_empty() {
            return Some(url);
        }

        let rest = url.strip_prefix(mount)?;
        if rest.is_empty() || rest.starts_with('/') || rest.starts_with('?') {
            Some(rest)
        } else {
            None
        }
    }

    fn upstream_for(&self, url: &str) -> Option<String> {
        let view = self.view.as_deref().filter(|v| !v.is_empty())?;
        let rest = self.strip_mount(url)?;

        if !self.passthru {
            return Some(view.to_string());
        }

        let rest = match rest {
            "" => "/".to_string(),
            r if r.starts_with('?') => format!("/{}", r),
            r => r.to_string(),
        };
        Some(format!("{}{}", view, rest))
    }
}

impl RouteTable {
    pub fn resolve(&self, host: &str, url: &str) -> Option<RouteTarget> {
        self.routes.iter().find_map(|rule| {
            rule.upstream_for(url).map(|upstream| RouteTarget {
                upstream,
                host: host.to_string(),
            })
        })
    }
}
