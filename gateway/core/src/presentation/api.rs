// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// HTTP API
//
// Mounted under `/<apiVersion>`:
//
//   GET  /health
//   GET  /<v>/schema/{domain}/{bctxt}/{aggregate}/{version}   -> schema text
//   POST /<v>/resolve/{domain}/{bctxt}/{aggregate}/{version}  -> {data} | {error}
//
// The resolve endpoint evaluates one field per request. Field errors are
// returned as `{error}` with status 200; compile failures are 404.
//
// Every request first passes the host reroute layer. When the `Host` has a
// route table and a route matches the URL, the request is forwarded to that
// backend view and never reaches the routes above.

use crate::application::api_service::{api_version, ApiError, ApiService};
use crate::application::compiler::CompileError;
use crate::application::resolvers::ResolvedValue;
use crate::application::route_service::RouteService;
use crate::domain::model::AggregateSelector;
use crate::infrastructure::view_proxy::ViewProxy;
use axum::{
    body::to_bytes,
    extract::{ConnectInfo, FromRequestParts, Path, Query, Request, State},
    http::{header, request::Parts, uri::Authority, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

/// Largest request body forwarded to a backend view.
const MAX_FORWARD_BODY: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, Default)]
pub struct HttpOptions {
    /// Report store failures verbatim instead of a generic message.
    pub dev: bool,
    /// Read client ip, hostname and protocol from `X-Forwarded-*`.
    pub trust_proxy: bool,
}

pub struct AppState {
    pub api_service: Arc<ApiService>,
    pub route_service: Arc<RouteService>,
    pub proxy: ViewProxy,
    pub options: HttpOptions,
    pub start_time: Instant,
}

pub fn app(
    api_service: Arc<ApiService>,
    route_service: Arc<RouteService>,
    options: HttpOptions,
) -> Router {
    let state = Arc::new(AppState {
        api_service,
        route_service,
        proxy: ViewProxy::new(),
        options,
        start_time: Instant::now(),
    });
    let version = api_version();

    Router::new()
        .route("/health", get(health_handler))
        .route(
            &format!("/{}/schema/{{domain}}/{{bctxt}}/{{aggregate}}/{{version}}", version),
            get(schema_handler),
        )
        .route(
            &format!("/{}/resolve/{{domain}}/{{bctxt}}/{{aggregate}}/{{version}}", version),
            post(resolve_handler),
        )
        .fallback(not_found_handler)
        .layer(middleware::from_fn_with_state(state.clone(), reroute))
        .with_state(state)
}

type AggregatePath = (String, String, String, String);

#[derive(Debug, Deserialize)]
pub struct ResolveFieldRequest {
    #[serde(rename = "type")]
    pub type_name: String,
    pub field: String,
    /// Parent value; absent for root `Query` fields.
    #[serde(default)]
    pub receiver: Option<Value>,
    #[serde(default)]
    pub args: Value,
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": api_version(),
        "uptime_seconds": state.start_time.elapsed().as_secs(),
    }))
}

async fn schema_handler(
    State(state): State<Arc<AppState>>,
    Path((domain, bctxt, aggregate, version)): Path<AggregatePath>,
) -> Response {
    let selector = AggregateSelector::new(bctxt, aggregate, version);

    match state.api_service.get_interface(&domain, &selector).await {
        Ok(api) => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            api.type_defs().to_string(),
        )
            .into_response(),
        Err(e) => api_error_response(e, state.options.dev),
    }
}

async fn resolve_handler(
    State(state): State<Arc<AppState>>,
    Path((domain, bctxt, aggregate, version)): Path<AggregatePath>,
    RequestContext(mut raw_ctxt): RequestContext,
    Json(request): Json<ResolveFieldRequest>,
) -> Response {
    let selector = AggregateSelector::new(bctxt.clone(), aggregate.clone(), version.clone());
    let api = match state.api_service.get_interface(&domain, &selector).await {
        Ok(api) => api,
        Err(e) => return api_error_response(e, state.options.dev),
    };

    raw_ctxt.insert(
        "params".to_string(),
        json!({
            "domain": domain,
            "bctxt": bctxt,
            "aggregate": aggregate,
            "version": version,
        }),
    );
    let raw_ctxt = Value::Object(raw_ctxt);

    let receiver = request
        .receiver
        .map(ResolvedValue::from)
        .unwrap_or_else(ResolvedValue::root);

    debug!(
        type_name = %request.type_name,
        field = %request.field,
        "Resolving field"
    );

    match api
        .resolve(&request.type_name, &request.field, &receiver, request.args, &raw_ctxt)
        .await
    {
        Ok(value) => Json(json!({ "data": value.to_json() })).into_response(),
        Err(e) => {
            warn!(type_name = %request.type_name, field = %request.field, "Field resolution failed: {}", e);
            Json(json!({ "error": e.to_wire() })).into_response()
        }
    }
}

async fn not_found_handler() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}

/// Forward the request to a backend view when the host's route table has a
/// match; otherwise hand it to the API routes.
async fn reroute(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let Some(host) = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
    else {
        return next.run(request).await;
    };
    let url = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let target = match state.route_service.reroute(&host, &url).await {
        Ok(Some(target)) => target,
        Ok(None) => return next.run(request).await,
        Err(e) => {
            error!(host = %host, error = %e, "Route lookup failed");
            let message = if state.options.dev {
                e.to_string()
            } else {
                "Internal server error".to_string()
            };
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": message })))
                .into_response();
        }
    };

    let (parts, body) = request.into_parts();
    let body = match to_bytes(body, MAX_FORWARD_BODY).await {
        Ok(body) => body,
        Err(e) => {
            warn!(host = %host, "Unable to read request body for forwarding: {}", e);
            return (StatusCode::PAYLOAD_TOO_LARGE, Json(json!({ "error": e.to_string() })))
                .into_response();
        }
    };

    match state
        .proxy
        .forward(&target, parts.method, &parts.headers, body)
        .await
    {
        Ok(response) => response,
        Err(e) => {
            warn!(upstream = %target.upstream, "Forwarding failed: {}", e);
            (StatusCode::BAD_GATEWAY, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

fn api_error_response(err: ApiError, dev: bool) -> Response {
    let (status, message) = match &err {
        ApiError::Compile(CompileError::AggregateNotFound(_))
        | ApiError::Compile(CompileError::RepositoryNotFound(_)) => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        ApiError::Store(e) => {
            error!(error = %e, "Domain store read failed");
            let message = if dev {
                err.to_string()
            } else {
                "Internal server error".to_string()
            };
            (StatusCode::INTERNAL_SERVER_ERROR, message)
        }
    };
    (status, Json(json!({ "error": message }))).into_response()
}

/// Unfiltered request context, headers included. The Context Filter projects
/// it onto the allow-list before anything leaves the process.
pub struct RequestContext(pub Map<String, Value>);

impl FromRequestParts<Arc<AppState>> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(RequestContext(raw_context(parts, state.options.trust_proxy)))
    }
}

fn header_str<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

/// First entry of a comma-separated forwarding header.
fn forwarded<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    header_str(parts, name)
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Host part of an authority, port removed. IPv6 literals keep their brackets.
fn host_of(authority: &str) -> String {
    authority
        .parse::<Authority>()
        .map(|a| a.host().to_string())
        .unwrap_or_else(|_| authority.to_string())
}

fn raw_context(parts: &Parts, trust_proxy: bool) -> Map<String, Value> {
    let proxied = |name: &str| if trust_proxy { forwarded(parts, name) } else { None };

    let hostname = proxied("x-forwarded-host")
        .or_else(|| header_str(parts, header::HOST.as_str()))
        .map(host_of)
        .unwrap_or_default();

    let protocol = proxied("x-forwarded-proto").unwrap_or("http");

    let ip = proxied("x-forwarded-for")
        .map(str::to_string)
        .or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_default();

    let query: BTreeMap<String, String> = Query::try_from_uri(&parts.uri)
        .map(|Query(query)| query)
        .unwrap_or_default();

    let original_url = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    let headers: Map<String, Value> = parts
        .headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), Value::String(v.to_string())))
        })
        .collect();

    let mut ctxt = Map::new();
    ctxt.insert("baseUrl".into(), Value::String(String::new()));
    ctxt.insert("cookies".into(), Value::Object(parse_cookies(parts)));
    ctxt.insert("headers".into(), Value::Object(headers));
    ctxt.insert("hostname".into(), Value::String(hostname));
    ctxt.insert("ip".into(), Value::String(ip));
    ctxt.insert("method".into(), Value::String(parts.method.to_string()));
    ctxt.insert("originalUrl".into(), Value::String(original_url));
    ctxt.insert("path".into(), Value::String(parts.uri.path().to_string()));
    ctxt.insert("protocol".into(), Value::String(protocol.to_string()));
    ctxt.insert("query".into(), json!(query));
    ctxt
}

fn parse_cookies(parts: &Parts) -> Map<String, Value> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|line| line.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), Value::String(value.trim().to_string())))
        })
        .collect()
}
