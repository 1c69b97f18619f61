// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Model
//!
//! The declarative, versioned description of an API surface as it is read from
//! the Domain Store:
//!
//! ```text
//! DomainModel
//! ├── boundedContexts[<name>].aggregates[<name>].versions[<version>] → AggregateDefinition
//! └── repositories[<name>] → RepositoryRef
//! ```
//!
//! The model is immutable once read. Lookups resolve exact paths and return
//! `None` on any missing segment instead of failing.
//!
//! [`DomainModel::from_document`] decodes only the aggregate a caller asked
//! for and the repository it names, so a malformed sibling aggregate cannot
//! break an unrelated compile.

use crate::domain::field_map::FieldMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Root document stored under `{type: "domain", id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainModel {
    #[serde(default)]
    pub bounded_contexts: BTreeMap<String, BoundedContext>,

    #[serde(default)]
    pub repositories: BTreeMap<String, RepositoryRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoundedContext {
    #[serde(default)]
    pub aggregates: BTreeMap<String, VersionedAggregate>,
}

/// All published versions of one aggregate, keyed by version label.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionedAggregate {
    #[serde(default)]
    pub versions: BTreeMap<String, AggregateDefinition>,
}

/// One version of an aggregate's declared API surface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateDefinition {
    /// Read operations returning a collection of aggregates.
    #[serde(default)]
    pub queries: FieldMap<FieldSpec>,

    /// Read operations on a single aggregate.
    #[serde(default)]
    pub methods: FieldMap<FieldSpec>,

    /// Write operations staged on a transaction.
    #[serde(default)]
    pub actions: FieldMap<FieldSpec>,

    #[serde(default)]
    pub entities: FieldMap<TypeDefinition>,

    #[serde(default)]
    pub input_entities: FieldMap<TypeDefinition>,

    /// Name of the entry in `DomainModel::repositories` backing this aggregate.
    #[serde(default)]
    pub repository: Option<String>,
}

/// A named type rendered as `type <Name> { ... }` or `input <Name> { ... }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    #[serde(default)]
    pub methods: FieldMap<FieldSpec>,
}

impl TypeDefinition {
    pub fn new(methods: FieldMap<FieldSpec>) -> Self {
        Self { methods }
    }
}

/// Declaration of a single field: its parameters, return type and the remote
/// resolver backing it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    /// Parameter name → type name. Params without a string type are omitted.
    #[serde(default, deserialize_with = "declared_params")]
    pub params: FieldMap<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<ReturnType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolver: Option<ResolverRef>,
}

impl FieldSpec {
    /// A field with a fixed return type and no params or resolver.
    pub fn returning(name: &str) -> Self {
        Self {
            return_type: Some(ReturnType::named(name)),
            ..Self::default()
        }
    }

    pub fn with_param(mut self, name: &str, type_name: &str) -> Self {
        self.params.insert(name, type_name.to_string());
        self
    }

    /// Copy of this spec with the return type replaced.
    pub fn with_return_type(&self, return_type: ReturnType) -> Self {
        Self {
            return_type: Some(return_type),
            ..self.clone()
        }
    }

    /// Rendered return type, or `None` when the field declares no usable type.
    pub fn rendered_return_type(&self) -> Option<String> {
        self.return_type.as_ref().and_then(ReturnType::render)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnType {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "truthy")]
    pub is_collection: bool,
}

fn declared_params<'de, D: Deserializer<'de>>(deserializer: D) -> Result<FieldMap<String>, D::Error> {
    let raw = FieldMap::<Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(name, type_name)| match type_name {
            Value::String(type_name) => Some((name, type_name)),
            _ => None,
        })
        .collect())
}

/// `null`, `false`, `0` and `""` are false; any other value is true.
fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

impl ReturnType {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            is_collection: false,
        }
    }

    pub fn collection_of(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            is_collection: true,
        }
    }

    /// `Name` or `[Name]`; `None` if the name is missing or empty.
    pub fn render(&self) -> Option<String> {
        let name = self.name.as_deref().filter(|n| !n.is_empty())?;
        Some(if self.is_collection {
            format!("[{}]", name)
        } else {
            name.to_string()
        })
    }
}

/// Remote endpoint that resolves a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverRef {
    pub uri: String,
}

/// Opaque backing-store handle. Never interpreted, only carried into
/// transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryRef(pub serde_json::Value);

/// Addresses one aggregate version inside a domain model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSelector {
    pub bounded_context: String,
    pub aggregate: String,
    pub version: String,
}

impl AggregateSelector {
    pub fn new(
        bounded_context: impl Into<String>,
        aggregate: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            bounded_context: bounded_context.into(),
            aggregate: aggregate.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for AggregateSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "boundedContexts[{}].aggregates[{}].versions[{}]",
            self.bounded_context, self.aggregate, self.version
        )
    }
}

impl DomainModel {
    /// Decode the part of a raw domain document that `selector` needs: the
    /// addressed aggregate version and the repository it names. Everything
    /// else in the document is left undecoded. A missing or `null` aggregate
    /// yields a model without it.
    pub fn from_document(
        document: &Value,
        selector: &AggregateSelector,
    ) -> Result<Self, serde_json::Error> {
        let mut model = Self::default();

        let Some(raw) = document
            .get("boundedContexts")
            .and_then(|v| v.get(selector.bounded_context.as_str()))
            .and_then(|v| v.get("aggregates"))
            .and_then(|v| v.get(selector.aggregate.as_str()))
            .and_then(|v| v.get("versions"))
            .and_then(|v| v.get(selector.version.as_str()))
            .filter(|v| !v.is_null())
        else {
            return Ok(model);
        };

        let aggregate = AggregateDefinition::deserialize(raw)?;

        if let Some(name) = aggregate.repository.as_deref() {
            if let Some(repository) = document.get("repositories").and_then(|r| r.get(name)) {
                model
                    .repositories
                    .insert(name.to_string(), RepositoryRef(repository.clone()));
            }
        }

        let mut versioned = VersionedAggregate::default();
        versioned.versions.insert(selector.version.clone(), aggregate);
        let mut context = BoundedContext::default();
        context.aggregates.insert(selector.aggregate.clone(), versioned);
        model
            .bounded_contexts
            .insert(selector.bounded_context.clone(), context);

        Ok(model)
    }

    /// Resolve `boundedContexts[bc].aggregates[name].versions[v]`.
    pub fn aggregate(&self, selector: &AggregateSelector) -> Option<&AggregateDefinition> {
        self.bounded_contexts
            .get(&selector.bounded_context)?
            .aggregates
            .get(&selector.aggregate)?
            .versions
            .get(&selector.version)
    }

    /// Resolve `repositories[name]`. A `null` entry counts as missing.
    pub fn repository(&self, name: &str) -> Option<&RepositoryRef> {
        self.repositories.get(name).filter(|r| !r.0.is_null())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model() -> DomainModel {
        serde_json::from_value(json!({
            "boundedContexts": {
                "sales": {
                    "aggregates": {
                        "order": {
                            "versions": {
                                "1": { "repository": "orders" }
                            }
                        }
                    }
                }
            },
            "repositories": { "orders": { "table": "orders" }, "empty": null }
        }))
        .unwrap()
    }

    #[test]
    fn test_aggregate_lookup_resolves_exact_path() {
        let model = model();
        let found = model.aggregate(&AggregateSelector::new("sales", "order", "1"));
        assert_eq!(found.and_then(|a| a.repository.as_deref()), Some("orders"));
    }

    #[test]
    fn test_aggregate_lookup_missing_segments_return_none() {
        let model = model();
        assert!(model.aggregate(&AggregateSelector::new("billing", "order", "1")).is_none());
        assert!(model.aggregate(&AggregateSelector::new("sales", "invoice", "1")).is_none());
        assert!(model.aggregate(&AggregateSelector::new("sales", "order", "2")).is_none());
    }

    #[test]
    fn test_repository_lookup() {
        let model = model();
        assert_eq!(model.repository("orders"), Some(&RepositoryRef(json!({"table": "orders"}))));
        assert!(model.repository("empty").is_none());
        assert!(model.repository("missing").is_none());
    }

    #[test]
    fn test_from_document_ignores_malformed_siblings() {
        let document = json!({
            "boundedContexts": {
                "sales": {
                    "aggregates": {
                        "order": { "versions": { "1": { "repository": "orders" } } },
                        "invoice": {
                            "versions": {
                                "1": { "methods": { "total": { "params": { "x": null }, "returnType": 7 } } }
                            }
                        }
                    }
                },
                "billing": "not an object"
            },
            "repositories": { "orders": { "table": "orders" }, "broken": [1, 2] }
        });

        let selector = AggregateSelector::new("sales", "order", "1");
        let model = DomainModel::from_document(&document, &selector).unwrap();

        assert!(model.aggregate(&selector).is_some());
        assert_eq!(model.repository("orders"), Some(&RepositoryRef(json!({"table": "orders"}))));
        assert!(model.aggregate(&AggregateSelector::new("sales", "invoice", "1")).is_none());
        assert!(model.repository("broken").is_none());
    }

    #[test]
    fn test_from_document_missing_or_null_aggregate() {
        let document = json!({
            "boundedContexts": { "sales": { "aggregates": { "order": { "versions": { "1": null } } } } }
        });

        for selector in [
            AggregateSelector::new("sales", "order", "1"),
            AggregateSelector::new("sales", "order", "2"),
            AggregateSelector::new("billing", "order", "1"),
        ] {
            let model = DomainModel::from_document(&document, &selector).unwrap();
            assert!(model.aggregate(&selector).is_none());
        }
        assert!(DomainModel::from_document(&json!(null), &AggregateSelector::new("a", "b", "c")).is_ok());
    }

    #[test]
    fn test_from_document_rejects_malformed_selected_aggregate() {
        let document = json!({
            "boundedContexts": { "sales": { "aggregates": { "order": { "versions": { "1": { "methods": 5 } } } } } }
        });
        assert!(DomainModel::from_document(&document, &AggregateSelector::new("sales", "order", "1")).is_err());
    }

    #[test]
    fn test_untyped_params_and_loose_collection_flags() {
        let spec: FieldSpec = serde_json::from_value(json!({
            "params": { "a": "Int", "b": null, "c": false, "d": "String" },
            "returnType": { "name": "Order", "isCollection": null }
        }))
        .unwrap();

        assert_eq!(spec.params.keys().collect::<Vec<_>>(), vec!["a", "d"]);
        assert_eq!(spec.rendered_return_type().as_deref(), Some("Order"));

        let collection: ReturnType =
            serde_json::from_value(json!({ "name": "Order", "isCollection": 1 })).unwrap();
        assert!(collection.is_collection);
    }

    #[test]
    fn test_return_type_rendering() {
        assert_eq!(ReturnType::named("Int").render().as_deref(), Some("Int"));
        assert_eq!(ReturnType::collection_of("Order").render().as_deref(), Some("[Order]"));
        assert_eq!(ReturnType::default().render(), None);
        assert_eq!(ReturnType::named("").render(), None);
    }
}
