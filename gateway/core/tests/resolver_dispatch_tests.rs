// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Integration tests for remote field resolution over HTTP.
//!
//! A mockito server stands in for resolver endpoints; the dispatcher talks to
//! it through the reqwest-backed transport.

use lattice_core::application::dispatcher::ResolverDispatcher;
use lattice_core::domain::model::{FieldSpec, ResolverRef};
use lattice_core::domain::resolver::{ResolverError, TransportError};
use lattice_core::infrastructure::http_transport::HttpResolverTransport;
use mockito::Matcher;
use serde_json::json;
use std::error::Error;
use std::sync::Arc;

fn dispatcher() -> ResolverDispatcher {
    ResolverDispatcher::new(Arc::new(HttpResolverTransport::new()))
}

fn remote(uri: String) -> FieldSpec {
    FieldSpec {
        resolver: Some(ResolverRef { uri }),
        ..FieldSpec::returning("Int")
    }
}

#[tokio::test]
async fn test_dispatch_posts_envelope_and_returns_data() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/orders/list")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "obj": {},
            "args": { "x": 1 },
            "ctxt": { "hostname": "shop.acme.com", "method": "POST" }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data": [{"id": "o-1"}, {"id": "o-2"}]}"#)
        .create_async()
        .await;

    let raw_ctxt = json!({
        "hostname": "shop.acme.com",
        "method": "POST",
        "secret": "s3cr3t",
        "headers": { "authorization": "Bearer abc" }
    });

    let data = dispatcher()
        .dispatch(
            "Query",
            "list",
            &remote(format!("{}/orders/list", server.url())),
            json!({}),
            json!({ "x": 1 }),
            &raw_ctxt,
        )
        .await
        .unwrap();

    assert_eq!(data, json!([{"id": "o-1"}, {"id": "o-2"}]));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_application_error_is_passed_through_verbatim() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/fail")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "x"}"#)
        .create_async()
        .await;

    let err = dispatcher()
        .dispatch(
            "Aggregate",
            "total",
            &remote(format!("{}/fail", server.url())),
            json!({"id": "o-1"}),
            json!({}),
            &json!({}),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ResolverError::Application(ref v) if v == &json!("x")));
    assert_eq!(err.to_wire(), json!("x"));
}

#[tokio::test]
async fn test_structured_application_error_keeps_shape() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/denied")
        .with_status(200)
        .with_body(r#"{"data": null, "error": {"code": "DENIED", "fields": ["qty"]}}"#)
        .create_async()
        .await;

    let err = dispatcher()
        .dispatch(
            "Query",
            "list",
            &remote(format!("{}/denied", server.url())),
            json!({}),
            json!({}),
            &json!({}),
        )
        .await
        .unwrap_err();

    assert_eq!(err.to_wire(), json!({"code": "DENIED", "fields": ["qty"]}));
}

#[tokio::test]
async fn test_non_success_status_is_transport_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/boom")
        .with_status(502)
        .with_body(r#"{"error": "upstream detail that must not leak"}"#)
        .create_async()
        .await;

    let err = dispatcher()
        .dispatch(
            "Query",
            "list",
            &remote(format!("{}/boom", server.url())),
            json!({}),
            json!({}),
            &json!({}),
        )
        .await
        .unwrap_err();

    match &err {
        ResolverError::Transport { source, .. } => {
            assert!(matches!(source, TransportError::Status(502)))
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.to_string(), "Unexpected error while resolving Query.list");
    assert!(!err.to_wire().to_string().contains("must not leak"));
    assert!(err.source().is_some());
}

#[tokio::test]
async fn test_unparsable_body_is_transport_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/garbage")
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let err = dispatcher()
        .dispatch(
            "Query",
            "list",
            &remote(format!("{}/garbage", server.url())),
            json!({}),
            json!({}),
            &json!({}),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ResolverError::Transport {
            source: TransportError::Decode(_),
            ..
        }
    ));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let err = dispatcher()
        .dispatch(
            "Aggregate",
            "total",
            &remote("http://127.0.0.1:1/unreachable".to_string()),
            json!({}),
            json!({}),
            &json!({}),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ResolverError::Transport {
            source: TransportError::Request(_),
            ..
        }
    ));
    assert_eq!(err.to_string(), "Unexpected error while resolving Aggregate.total");
}

#[tokio::test]
async fn test_each_call_hits_the_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/count")
        .with_status(200)
        .with_body(r#"{"data": 7}"#)
        .expect(2)
        .create_async()
        .await;

    let dispatcher = dispatcher();
    let spec = remote(format!("{}/count", server.url()));
    for _ in 0..2 {
        let data = dispatcher
            .dispatch("Aggregate", "total", &spec, json!({}), json!({}), &json!({}))
            .await
            .unwrap();
        assert_eq!(data, json!(7));
    }

    mock.assert_async().await;
}

#[tokio::test]
async fn test_field_without_resolver_fails_without_request() {
    let err = dispatcher()
        .dispatch(
            "Aggregate",
            "total",
            &FieldSpec::returning("Int"),
            json!({}),
            json!({}),
            &json!({}),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ResolverError::NotFound { .. }));
    assert_eq!(err.to_string(), "Resolver not found for Aggregate.total");
}
