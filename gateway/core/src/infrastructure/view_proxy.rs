// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Backend View Proxy
//
// Forwards an inbound request to the upstream a host route resolved to.
// Method, headers and body pass through unchanged except for `Host`, which is
// set to the original host, and hop-by-hop headers, which are dropped in both
// directions. The upstream response is buffered and returned as is.

use crate::domain::routing::RouteTarget;
use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, Response};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("Invalid Host header for upstream: {0}")]
    InvalidHost(String),

    #[error("Upstream request failed: {0}")]
    Upstream(String),
}

const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "content-length",
    "host",
];

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

fn end_to_end(headers: &HeaderMap) -> HeaderMap {
    headers
        .iter()
        .filter(|(name, _)| !is_hop_by_hop(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

pub struct ViewProxy {
    client: reqwest::Client,
}

impl ViewProxy {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn forward(
        &self,
        target: &RouteTarget,
        method: Method,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<Response<Body>, ProxyError> {
        let mut outbound = end_to_end(headers);
        let host = HeaderValue::from_str(&target.host)
            .map_err(|_| ProxyError::InvalidHost(target.host.clone()))?;
        outbound.insert(header::HOST, host);

        debug!(upstream = %target.upstream, %method, "Forwarding request");

        let upstream = self
            .client
            .request(method, &target.upstream)
            .headers(outbound)
            .body(body)
            .send()
            .await
            .map_err(|e| ProxyError::Upstream(e.to_string()))?;

        let status = upstream.status();
        let headers = end_to_end(upstream.headers());
        let body = upstream
            .bytes()
            .await
            .map_err(|e| ProxyError::Upstream(e.to_string()))?;

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

impl Default for ViewProxy {
    fn default() -> Self {
        Self::new()
    }
}
