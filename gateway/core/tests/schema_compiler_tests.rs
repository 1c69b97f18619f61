// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Integration tests for the schema compiler.
//!
//! Domain models are written as JSON documents, the same shape the Domain
//! Store hands back, and compiled into schema text and a resolver graph.

use lattice_core::application::compiler::{compile, CompileError};
use lattice_core::application::resolvers::{build_resolvers, FieldResolver, ResultAttribute};
use lattice_core::domain::model::{AggregateSelector, DomainModel};
use serde_json::{json, Value};

fn model_with(aggregate: Value) -> DomainModel {
    serde_json::from_value(json!({
        "boundedContexts": {
            "sales": {
                "aggregates": {
                    "order": {
                        "versions": { "1": aggregate }
                    }
                }
            }
        },
        "repositories": {
            "orders": { "table": "orders" }
        }
    }))
    .unwrap()
}

fn selector() -> AggregateSelector {
    AggregateSelector::new("sales", "order", "1")
}

#[test]
fn test_minimal_aggregate_compiles_to_full_schema() {
    let model = model_with(json!({
        "queries": { "list": { "params": { "x": "Int" } } },
        "actions": { "doThing": { "resolver": { "uri": "http://svc" } } },
        "repository": "orders"
    }));

    let compiled = compile(&model, &selector()).unwrap();

    let expected = concat!(
        "type Query {\n",
        "  list(x:Int): [Aggregate]\n",
        "  transact(options:TransactOptions): Transaction\n",
        "}\n\n",
        "type Aggregate {\n",
        "  id: ID\n",
        "  version: Int\n",
        "}\n\n",
        "type Transaction {\n",
        "  doThing: Transaction\n",
        "  id: ID\n",
        "  commit(options:CommitOptions): Result\n",
        "}\n\n",
        "type Result {\n",
        "  id: ID!\n",
        "  success: Boolean\n",
        "}\n\n",
        "input TransactOptions {\n",
        "  subscribe: Boolean\n",
        "}\n\n",
        "input CommitOptions {\n",
        "  wait: Boolean\n",
        "  timeout: Int\n",
        "}\n\n",
    );
    assert_eq!(compiled.type_defs, expected);
    assert_eq!(compiled.repository.0, json!({ "table": "orders" }));
}

#[test]
fn test_methods_without_return_type_are_dropped() {
    let model = model_with(json!({
        "methods": {
            "total": { "returnType": { "name": "Int" } },
            "recalculate": { "resolver": { "uri": "http://svc/recalc" } }
        },
        "repository": "orders"
    }));

    let compiled = compile(&model, &selector()).unwrap();
    assert!(compiled.type_defs.contains("  total: Int\n"));
    assert!(!compiled.type_defs.contains("recalculate"));

    let graph = build_resolvers(&compiled.definition, &compiled.repository);
    assert!(graph.get("Aggregate", "total").is_some());
    assert!(graph.get("Aggregate", "recalculate").is_none());
    assert!(!graph.keys().iter().any(|k| k.contains("recalculate")));
}

#[test]
fn test_actions_always_return_transaction() {
    let model = model_with(json!({
        "actions": {
            "cancel": {
                "params": { "reason": "String" },
                "returnType": { "name": "Boolean", "isCollection": true }
            }
        },
        "repository": "orders"
    }));

    let compiled = compile(&model, &selector()).unwrap();
    assert!(compiled
        .type_defs
        .contains("  cancel(reason:String): Transaction\n"));
    assert!(!compiled.type_defs.contains("Boolean]"));

    let graph = build_resolvers(&compiled.definition, &compiled.repository);
    assert_eq!(
        graph.get("Transaction", "cancel"),
        Some(&FieldResolver::Stage {
            action: "cancel".to_string()
        })
    );
}

#[test]
fn test_queries_always_return_aggregate_collection() {
    let model = model_with(json!({
        "queries": {
            "byCustomer": {
                "params": { "customer": "ID" },
                "returnType": { "name": "Customer" }
            }
        },
        "repository": "orders"
    }));

    let compiled = compile(&model, &selector()).unwrap();
    assert!(compiled
        .type_defs
        .contains("  byCustomer(customer:ID): [Aggregate]\n"));
}

#[test]
fn test_missing_version_is_aggregate_not_found() {
    let model = model_with(json!({ "repository": "orders" }));

    let err = compile(&model, &AggregateSelector::new("sales", "order", "2")).unwrap_err();
    assert!(matches!(err, CompileError::AggregateNotFound(ref s) if s.version == "2"));

    let err = compile(&model, &AggregateSelector::new("billing", "order", "1")).unwrap_err();
    assert!(matches!(err, CompileError::AggregateNotFound(_)));
}

#[test]
fn test_missing_repository_is_repository_not_found() {
    let model = model_with(json!({ "repository": "invoices" }));

    let err = compile(&model, &selector()).unwrap_err();
    match err {
        CompileError::RepositoryNotFound(name) => assert_eq!(name, "invoices"),
        other => panic!("unexpected error: {other}"),
    }

    let model = model_with(json!({}));
    assert!(matches!(
        compile(&model, &selector()),
        Err(CompileError::RepositoryNotFound(_))
    ));
}

#[test]
fn test_user_result_entity_cannot_override_system_fields() {
    let model = model_with(json!({
        "entities": {
            "Result": {
                "methods": {
                    "id": {
                        "params": { "format": "String" },
                        "returnType": { "name": "String" },
                        "resolver": { "uri": "http://evil/id" }
                    },
                    "receipt": {
                        "returnType": { "name": "String" },
                        "resolver": { "uri": "http://svc/receipt" }
                    }
                }
            }
        },
        "repository": "orders"
    }));

    let compiled = compile(&model, &selector()).unwrap();
    assert!(compiled.type_defs.contains(concat!(
        "type Result {\n",
        "  id: ID!\n",
        "  success: Boolean\n",
        "  receipt: String\n",
        "}\n"
    )));

    let graph = build_resolvers(&compiled.definition, &compiled.repository);
    assert_eq!(
        graph.get("Result", "id"),
        Some(&FieldResolver::ResultAttribute(ResultAttribute::Id))
    );
    assert_eq!(
        graph.get("Result", "success"),
        Some(&FieldResolver::ResultAttribute(ResultAttribute::Success))
    );
    assert!(matches!(
        graph.get("Result", "receipt"),
        Some(FieldResolver::Dispatch(_))
    ));
}

#[test]
fn test_user_entities_and_inputs_render_after_system_types() {
    let model = model_with(json!({
        "entities": {
            "LineItem": {
                "methods": {
                    "sku": { "returnType": { "name": "String" } },
                    "qty": { "returnType": { "name": "Int" } }
                }
            }
        },
        "inputEntities": {
            "LineItemInput": {
                "methods": {
                    "sku": { "returnType": { "name": "String" } }
                }
            }
        },
        "repository": "orders"
    }));

    let type_defs = compile(&model, &selector()).unwrap().type_defs;

    let result_at = type_defs.find("type Result").unwrap();
    let line_item_at = type_defs.find("type LineItem").unwrap();
    let commit_options_at = type_defs.find("input CommitOptions").unwrap();
    let line_item_input_at = type_defs.find("input LineItemInput").unwrap();

    assert!(result_at < line_item_at);
    assert!(line_item_at < commit_options_at);
    assert!(commit_options_at < line_item_input_at);
    assert!(type_defs.contains("type LineItem {\n  sku: String\n  qty: Int\n}\n"));
}

#[test]
fn test_numeric_version_labels_from_yaml() {
    let yaml = r#"
boundedContexts:
  sales:
    aggregates:
      order:
        versions:
          3:
            repository: orders
repositories:
  orders: {}
"#;
    let selector = AggregateSelector::new("sales", "order", "3");
    let document: Value = serde_yaml::from_str(yaml).unwrap();
    let model = DomainModel::from_document(&document, &selector).unwrap();
    assert!(compile(&model, &selector).is_ok());
}
