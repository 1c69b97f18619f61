// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Resolver Graph
//!
//! One [`FieldResolver`] per field of the compiled schema, keyed by type name
//! then field name. The graph is built once per compilation; resolution looks
//! fields up by name and never consults the domain model again.
//!
//! | Field | Resolver |
//! |-------|----------|
//! | `Query.<query>`, `Aggregate.<method>`, user entity fields | [`FieldResolver::Dispatch`] |
//! | `Query.transact` | [`FieldResolver::Transact`] |
//! | `Aggregate.id` / `Aggregate.version` | [`FieldResolver::AggregateAttribute`] |
//! | `Transaction.<action>` | [`FieldResolver::Stage`] |
//! | `Transaction.id` / `Transaction.commit` | [`FieldResolver::TransactionId`] / [`FieldResolver::Commit`] |
//! | `Result.id` / `Result.success` | [`FieldResolver::ResultAttribute`] |
//!
//! System resolvers are merged over user resolvers with the same
//! default-wins merge the compiler uses for the schema text.
//!
//! A `Transaction` receiver may arrive as client JSON. It is always rebound
//! to the compiled repository before it is staged, committed or dispatched.

use crate::application::compiler::{
    MergedDefinition, AGGREGATE_TYPE, QUERY_TYPE, RESULT_TYPE, TRANSACTION_TYPE,
};
use crate::application::dispatcher::ResolverDispatcher;
use crate::domain::field_map::FieldMap;
use crate::domain::merge::{merge_with_defaults, DefaultsMerge};
use crate::domain::model::{FieldSpec, RepositoryRef};
use crate::domain::resolver::ResolverError;
use crate::domain::transaction::{CommitResult, Transaction};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateAttribute {
    Id,
    Version,
}

impl AggregateAttribute {
    fn key(self) -> &'static str {
        match self {
            AggregateAttribute::Id => "id",
            AggregateAttribute::Version => "version",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultAttribute {
    Id,
    Success,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldResolver {
    /// Remote call through the field's declared resolver; fails with
    /// `ResolverError::NotFound` when none is declared.
    Dispatch(FieldSpec),
    Transact { repository: RepositoryRef },
    AggregateAttribute(AggregateAttribute),
    Stage { action: String },
    TransactionId,
    Commit,
    ResultAttribute(ResultAttribute),
}

impl DefaultsMerge for FieldResolver {
    fn merge_defaults(&self, _user: &Self) -> Self {
        self.clone()
    }
}

/// A value produced (or consumed as receiver) during field resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    Json(Value),
    Transaction(Transaction),
    Result(CommitResult),
}

impl ResolvedValue {
    /// Receiver of root `Query` fields.
    pub fn root() -> Self {
        ResolvedValue::Json(json!({}))
    }

    pub fn to_json(&self) -> Value {
        match self {
            ResolvedValue::Json(value) => value.clone(),
            ResolvedValue::Transaction(tx) => serde_json::to_value(tx).unwrap_or(Value::Null),
            ResolvedValue::Result(result) => serde_json::to_value(result).unwrap_or(Value::Null),
        }
    }

    /// The receiver as a transaction on `repository`; JSON receivers are
    /// decoded, whatever repository they name is replaced.
    fn as_transaction(&self, repository: &RepositoryRef) -> Option<Transaction> {
        let tx = match self {
            ResolvedValue::Transaction(tx) => tx.clone(),
            ResolvedValue::Json(value) => serde_json::from_value(value.clone()).ok()?,
            ResolvedValue::Result(_) => return None,
        };
        Some(tx.with_repository(repository.clone()))
    }

    fn as_commit_result(&self) -> Option<CommitResult> {
        match self {
            ResolvedValue::Result(result) => Some(*result),
            ResolvedValue::Json(value) => serde_json::from_value(value.clone()).ok(),
            ResolvedValue::Transaction(_) => None,
        }
    }
}

impl From<Value> for ResolvedValue {
    fn from(value: Value) -> Self {
        ResolvedValue::Json(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolverGraph {
    types: FieldMap<FieldMap<FieldResolver>>,
    repository: RepositoryRef,
}

/// Build the resolver graph for a merged definition.
pub fn build_resolvers(definition: &MergedDefinition, repository: &RepositoryRef) -> ResolverGraph {
    // Every rendered field of every output type starts out as a remote dispatch.
    let declared: FieldMap<FieldMap<FieldResolver>> = definition.types.map_values(|_, entity| {
        let mut fields = entity
            .methods
            .map_values(|_, spec| FieldResolver::Dispatch(spec.clone()));
        fields.retain(|name, _| {
            entity
                .methods
                .get(name)
                .and_then(FieldSpec::rendered_return_type)
                .is_some()
        });
        fields
    });

    let mut transaction: FieldMap<FieldResolver> = definition
        .actions
        .map_values(|name, _| FieldResolver::Stage { action: name.to_string() });
    transaction.insert("id", FieldResolver::TransactionId);
    transaction.insert("commit", FieldResolver::Commit);

    let system: FieldMap<FieldMap<FieldResolver>> = [
        (
            QUERY_TYPE,
            [(
                "transact",
                FieldResolver::Transact {
                    repository: repository.clone(),
                },
            )]
            .into_iter()
            .collect(),
        ),
        (
            AGGREGATE_TYPE,
            [
                ("id", FieldResolver::AggregateAttribute(AggregateAttribute::Id)),
                ("version", FieldResolver::AggregateAttribute(AggregateAttribute::Version)),
            ]
            .into_iter()
            .collect(),
        ),
        (TRANSACTION_TYPE, transaction),
        (
            RESULT_TYPE,
            [
                ("id", FieldResolver::ResultAttribute(ResultAttribute::Id)),
                ("success", FieldResolver::ResultAttribute(ResultAttribute::Success)),
            ]
            .into_iter()
            .collect(),
        ),
    ]
    .into_iter()
    .collect();

    ResolverGraph {
        types: merge_with_defaults(&system, &declared),
        repository: repository.clone(),
    }
}

impl ResolverGraph {
    pub fn get(&self, type_name: &str, field: &str) -> Option<&FieldResolver> {
        self.types.get(type_name)?.get(field)
    }

    /// Every resolver key as `TypeName.fieldName`, in merge order (system
    /// fields of a type first).
    pub fn keys(&self) -> Vec<String> {
        self.types
            .iter()
            .flat_map(|(type_name, fields)| {
                fields.keys().map(move |field| format!("{}.{}", type_name, field))
            })
            .collect()
    }

    fn transaction(&self, receiver: &ResolvedValue) -> Option<Transaction> {
        receiver.as_transaction(&self.repository)
    }

    /// Resolve one field. `raw_ctxt` is the unfiltered request context.
    pub async fn resolve(
        &self,
        dispatcher: &ResolverDispatcher,
        type_name: &str,
        field: &str,
        receiver: &ResolvedValue,
        args: Value,
        raw_ctxt: &Value,
    ) -> Result<ResolvedValue, ResolverError> {
        let resolver = self.get(type_name, field).ok_or_else(|| ResolverError::UnknownField {
            type_name: type_name.to_string(),
            field: field.to_string(),
        })?;

        let invalid_receiver = |expected: &'static str| ResolverError::InvalidReceiver {
            type_name: type_name.to_string(),
            field: field.to_string(),
            expected,
        };

        match resolver {
            FieldResolver::Dispatch(spec) => {
                let obj = if type_name == TRANSACTION_TYPE {
                    let tx = self
                        .transaction(receiver)
                        .ok_or_else(|| invalid_receiver("Transaction"))?;
                    ResolvedValue::Transaction(tx).to_json()
                } else {
                    receiver.to_json()
                };
                dispatcher
                    .dispatch(type_name, field, spec, obj, args, raw_ctxt)
                    .await
                    .map(ResolvedValue::Json)
            }

            FieldResolver::Transact { repository } => Ok(ResolvedValue::Transaction(
                Transaction::start(repository.clone(), raw_ctxt),
            )),

            FieldResolver::AggregateAttribute(attribute) => {
                let value = receiver
                    .to_json()
                    .get(attribute.key())
                    .filter(|v| !v.is_null())
                    .cloned()
                    .unwrap_or_else(|| json!(0));
                Ok(ResolvedValue::Json(value))
            }

            FieldResolver::Stage { action } => {
                let tx = self
                    .transaction(receiver)
                    .ok_or_else(|| invalid_receiver("Transaction"))?;
                Ok(ResolvedValue::Transaction(tx.stage(action.clone(), args)))
            }

            FieldResolver::TransactionId => {
                let tx = self
                    .transaction(receiver)
                    .ok_or_else(|| invalid_receiver("Transaction"))?;
                Ok(ResolvedValue::Json(json!(tx.id().to_string())))
            }

            FieldResolver::Commit => {
                let tx = self
                    .transaction(receiver)
                    .ok_or_else(|| invalid_receiver("Transaction"))?;
                Ok(ResolvedValue::Result(tx.commit()))
            }

            FieldResolver::ResultAttribute(attribute) => {
                let result = receiver
                    .as_commit_result()
                    .ok_or_else(|| invalid_receiver("Result"))?;
                Ok(ResolvedValue::Json(match attribute {
                    ResultAttribute::Id => json!(result.id.to_string()),
                    ResultAttribute::Success => json!(result.success),
                }))
            }
        }
    }
}
