// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// HTTP Resolver Transport
//
// Anti-Corruption Layer between the resolver wire contract and reqwest.
// POSTs the JSON envelope to the resolver uri; any connection failure,
// non-2xx status or unparsable body is a transport error. No retries, no
// timeout beyond the client's defaults.

use crate::domain::resolver::{ResolverRequest, ResolverResponse, ResolverTransport, TransportError};
use async_trait::async_trait;

pub struct HttpResolverTransport {
    client: reqwest::Client,
}

impl HttpResolverTransport {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpResolverTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResolverTransport for HttpResolverTransport {
    async fn execute(
        &self,
        uri: &str,
        payload: &ResolverRequest,
    ) -> Result<ResolverResponse, TransportError> {
        let response = self
            .client
            .post(uri)
            .json(payload)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        response
            .json::<ResolverResponse>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}
