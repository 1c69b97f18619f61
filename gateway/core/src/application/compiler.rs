// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Schema Compiler
//!
//! Turns one aggregate version of a [`DomainModel`] into schema text plus the
//! merged field definitions the resolver graph is built from.
//!
//! The system types are fixed and always take precedence over user entities
//! of the same name:
//!
//! ```text
//! type Query       { <queries>: [Aggregate], transact(options:TransactOptions): Transaction }
//! type Aggregate   { <methods with a returnType>, id: ID, version: Int }
//! type Transaction { <actions>: Transaction, id: ID, commit(options:CommitOptions): Result }
//! type Result      { id: ID!, success: Boolean }
//! input TransactOptions { subscribe: Boolean }
//! input CommitOptions   { wait: Boolean, timeout: Int }
//! ```
//!
//! Compilation is pure and deterministic; the same model and selector always
//! yield byte-identical text.

use crate::domain::field_map::FieldMap;
use crate::domain::merge::merge_with_defaults;
use crate::domain::model::{
    AggregateDefinition, AggregateSelector, DomainModel, FieldSpec, RepositoryRef, ReturnType,
    TypeDefinition,
};
use tracing::{debug, error};

pub const QUERY_TYPE: &str = "Query";
pub const AGGREGATE_TYPE: &str = "Aggregate";
pub const TRANSACTION_TYPE: &str = "Transaction";
pub const RESULT_TYPE: &str = "Result";
pub const TRANSACT_OPTIONS_INPUT: &str = "TransactOptions";
pub const COMMIT_OPTIONS_INPUT: &str = "CommitOptions";

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Aggregate was not found: {0}")]
    AggregateNotFound(AggregateSelector),

    #[error("Repository was not found: {0}")]
    RepositoryNotFound(String),
}

/// Field groups of the compiled API after system defaults were merged in.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedDefinition {
    /// `type` blocks, system types first.
    pub types: FieldMap<TypeDefinition>,
    /// `input` blocks, system inputs first.
    pub inputs: FieldMap<TypeDefinition>,
    /// Declared actions (each staged on `Transaction`).
    pub actions: FieldMap<FieldSpec>,
}

#[derive(Debug, Clone)]
pub struct CompiledSchema {
    pub type_defs: String,
    pub definition: MergedDefinition,
    pub repository: RepositoryRef,
}

/// Compile the aggregate addressed by `selector`.
///
/// Fails before anything is rendered when the aggregate or its repository
/// cannot be resolved.
pub fn compile(
    model: &DomainModel,
    selector: &AggregateSelector,
) -> Result<CompiledSchema, CompileError> {
    let Some(aggregate) = model.aggregate(selector) else {
        error!(%selector, "Aggregate was not found");
        return Err(CompileError::AggregateNotFound(selector.clone()));
    };

    let repository_name = aggregate.repository.clone().unwrap_or_default();
    let Some(repository) = model.repository(&repository_name) else {
        error!(%selector, repository = %repository_name, "Repository was not found");
        return Err(CompileError::RepositoryNotFound(repository_name));
    };

    let definition = merge_definition(aggregate);
    let type_defs = render(&definition);

    debug!(%selector, types = definition.types.len(), inputs = definition.inputs.len(), "Compiled schema");

    Ok(CompiledSchema {
        type_defs,
        definition,
        repository: repository.clone(),
    })
}

/// Every query returns a collection of `Aggregate`.
fn queries(aggregate: &AggregateDefinition) -> FieldMap<FieldSpec> {
    aggregate
        .queries
        .map_values(|_, query| query.with_return_type(ReturnType::collection_of(AGGREGATE_TYPE)))
}

/// Methods without a declared return type are dropped.
fn methods(aggregate: &AggregateDefinition) -> FieldMap<FieldSpec> {
    let mut methods = aggregate.methods.clone();
    methods.retain(|_, method| method.return_type.is_some());
    methods
}

/// Every action returns the `Transaction` it was staged on.
fn actions(aggregate: &AggregateDefinition) -> FieldMap<FieldSpec> {
    aggregate
        .actions
        .map_values(|_, action| action.with_return_type(ReturnType::named(TRANSACTION_TYPE)))
}

/// `group` followed by `defaults`, where a default overwrites a same-named
/// group entry in place.
fn with_fixed_fields(
    group: FieldMap<FieldSpec>,
    defaults: Vec<(&str, FieldSpec)>,
) -> TypeDefinition {
    let mut methods = group;
    for (name, spec) in defaults {
        methods.insert(name, spec);
    }
    TypeDefinition::new(methods)
}

fn system_types(
    queries: FieldMap<FieldSpec>,
    methods: FieldMap<FieldSpec>,
    actions: FieldMap<FieldSpec>,
) -> FieldMap<TypeDefinition> {
    let query = with_fixed_fields(
        queries,
        vec![(
            "transact",
            FieldSpec::returning(TRANSACTION_TYPE).with_param("options", TRANSACT_OPTIONS_INPUT),
        )],
    );

    let aggregate = with_fixed_fields(
        methods,
        vec![
            ("id", FieldSpec::returning("ID")),
            ("version", FieldSpec::returning("Int")),
        ],
    );

    let transaction = with_fixed_fields(
        actions,
        vec![
            ("id", FieldSpec::returning("ID")),
            (
                "commit",
                FieldSpec::returning(RESULT_TYPE).with_param("options", COMMIT_OPTIONS_INPUT),
            ),
        ],
    );

    let result = TypeDefinition::new(
        [
            ("id", FieldSpec::returning("ID!")),
            ("success", FieldSpec::returning("Boolean")),
        ]
        .into_iter()
        .collect(),
    );

    [
        (QUERY_TYPE, query),
        (AGGREGATE_TYPE, aggregate),
        (TRANSACTION_TYPE, transaction),
        (RESULT_TYPE, result),
    ]
    .into_iter()
    .collect()
}

fn system_inputs() -> FieldMap<TypeDefinition> {
    [
        (
            TRANSACT_OPTIONS_INPUT,
            TypeDefinition::new([("subscribe", FieldSpec::returning("Boolean"))].into_iter().collect()),
        ),
        (
            COMMIT_OPTIONS_INPUT,
            TypeDefinition::new(
                [
                    ("wait", FieldSpec::returning("Boolean")),
                    ("timeout", FieldSpec::returning("Int")),
                ]
                .into_iter()
                .collect(),
            ),
        ),
    ]
    .into_iter()
    .collect()
}

pub fn merge_definition(aggregate: &AggregateDefinition) -> MergedDefinition {
    let actions = actions(aggregate);
    let defaults = system_types(queries(aggregate), methods(aggregate), actions.clone());

    MergedDefinition {
        types: merge_with_defaults(&defaults, &aggregate.entities),
        inputs: merge_with_defaults(&system_inputs(), &aggregate.input_entities),
        actions,
    }
}

/// Render the merged definition as schema text.
pub fn render(definition: &MergedDefinition) -> String {
    let mut out = String::new();
    for (name, entity) in definition.types.iter() {
        out.push_str(&render_block("type", name, entity));
    }
    for (name, input) in definition.inputs.iter() {
        out.push_str(&render_block("input", name, input));
    }
    out
}

fn render_block(keyword: &str, name: &str, entity: &TypeDefinition) -> String {
    let mut block = format!("{} {} {{\n", keyword, name);
    for (field, spec) in entity.methods.iter() {
        if let Some(line) = render_field(field, spec) {
            block.push_str("  ");
            block.push_str(&line);
            block.push('\n');
        }
    }
    block.push_str("}\n\n");
    block
}

/// `name(params): ReturnType`, or `None` when the field has no usable
/// return type.
pub fn render_field(name: &str, spec: &FieldSpec) -> Option<String> {
    let return_type = spec.rendered_return_type()?;
    Some(format!("{}{}: {}", name, render_params(&spec.params), return_type))
}

fn render_params(params: &FieldMap<String>) -> String {
    let rendered: Vec<String> = params
        .iter()
        .filter(|(_, type_name)| !type_name.is_empty())
        .map(|(name, type_name)| format!("{}:{}", name, type_name))
        .collect();

    if rendered.is_empty() {
        String::new()
    } else {
        format!("({})", rendered.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ResolverRef;

    #[test]
    fn test_render_field_forms() {
        assert_eq!(render_field("id", &FieldSpec::returning("ID")).as_deref(), Some("id: ID"));

        let spec = FieldSpec::returning("Order").with_param("a", "Int").with_param("b", "String");
        assert_eq!(render_field("find", &spec).as_deref(), Some("find(a:Int, b:String): Order"));

        let collection = FieldSpec {
            return_type: Some(ReturnType::collection_of("Order")),
            ..FieldSpec::default()
        };
        assert_eq!(render_field("all", &collection).as_deref(), Some("all: [Order]"));

        assert_eq!(render_field("nothing", &FieldSpec::default()), None);
    }

    #[test]
    fn test_empty_param_types_are_skipped() {
        let spec = FieldSpec::returning("Int").with_param("a", "").with_param("b", "Int");
        assert_eq!(render_field("f", &spec).as_deref(), Some("f(b:Int): Int"));

        let only_empty = FieldSpec::returning("Int").with_param("a", "");
        assert_eq!(render_field("g", &only_empty).as_deref(), Some("g: Int"));
    }

    #[test]
    fn test_query_named_transact_is_replaced_in_place() {
        let aggregate = AggregateDefinition {
            queries: [
                ("transact", FieldSpec {
                    resolver: Some(ResolverRef { uri: "http://svc".into() }),
                    ..FieldSpec::default()
                }),
                ("list", FieldSpec::default()),
            ]
            .into_iter()
            .collect(),
            ..AggregateDefinition::default()
        };

        let merged = merge_definition(&aggregate);
        let query = merged.types.get(QUERY_TYPE).unwrap();
        let fields: Vec<&str> = query.methods.keys().collect();
        assert_eq!(fields, vec!["transact", "list"]);
        assert_eq!(
            query.methods.get("transact").unwrap().rendered_return_type().as_deref(),
            Some("Transaction")
        );
        assert!(query.methods.get("transact").unwrap().resolver.is_none());
    }
}
