// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Transaction Staging
//!
//! A [`Transaction`] accumulates the actions a client wants to apply to an
//! aggregate before a single commit. It is a value, not an entity: every
//! transition returns a new `Transaction` and leaves the receiver untouched.
//!
//! ```text
//! start ──▶ Transaction{tasks: []} ──stage──▶ Transaction{tasks: [a]} ──stage──▶ ... ──commit──▶ CommitResult
//! ```
//!
//! There is no registry keyed by transaction id. Callers pass the latest value
//! forward themselves.
//!
//! ⚠️ `commit` does not execute or persist staged tasks; it reports success
//! for the transaction id. A committed value can still be staged on or
//! committed again since it carries no lifecycle status.

use crate::domain::context::ContextSnapshot;
use crate::domain::model::RepositoryRef;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub Uuid);

impl TransactionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One staged action with a snapshot of its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedTask {
    pub name: String,
    pub args: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    repository: RepositoryRef,
    ctxt: ContextSnapshot,
    tasks: Vec<StagedTask>,
}

impl Transaction {
    /// Open a new transaction against `repository`, capturing the filtered
    /// request context.
    pub fn start(repository: RepositoryRef, raw_ctxt: &Value) -> Self {
        Self {
            id: TransactionId::new(),
            repository,
            ctxt: ContextSnapshot::filter(raw_ctxt),
            tasks: Vec::new(),
        }
    }

    /// Return a new transaction with `action` appended to the task list.
    pub fn stage(&self, action: impl Into<String>, args: Value) -> Self {
        let mut tasks = Vec::with_capacity(self.tasks.len() + 1);
        tasks.extend_from_slice(&self.tasks);
        tasks.push(StagedTask {
            name: action.into(),
            args,
        });

        Self {
            id: self.id,
            repository: self.repository.clone(),
            ctxt: self.ctxt.clone(),
            tasks,
        }
    }

    /// Same transaction bound to `repository`. Used when a transaction comes
    /// back from a client and must not choose its own backing store.
    pub fn with_repository(&self, repository: RepositoryRef) -> Self {
        Self {
            repository,
            ..self.clone()
        }
    }

    pub fn commit(&self) -> CommitResult {
        CommitResult {
            id: self.id,
            success: true,
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn repository(&self) -> &RepositoryRef {
        &self.repository
    }

    pub fn ctxt(&self) -> &ContextSnapshot {
        &self.ctxt
    }

    pub fn tasks(&self) -> &[StagedTask] {
        &self.tasks
    }
}

/// Terminal value returned by [`Transaction::commit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResult {
    pub id: TransactionId,
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn repository() -> RepositoryRef {
        RepositoryRef(json!({"table": "orders"}))
    }

    #[test]
    fn test_start_generates_distinct_ids() {
        let ctxt = json!({"hostname": "h"});
        let a = Transaction::start(repository(), &ctxt);
        let b = Transaction::start(repository(), &ctxt);
        assert_ne!(a.id(), b.id());
        assert!(a.tasks().is_empty());
    }

    #[test]
    fn test_start_filters_context() {
        let tx = Transaction::start(repository(), &json!({"hostname": "h", "password": "p"}));
        assert!(tx.ctxt().contains_key("hostname"));
        assert!(!tx.ctxt().contains_key("password"));
        assert_eq!(tx.repository(), &repository());
    }

    #[test]
    fn test_stage_leaves_previous_value_untouched() {
        let t0 = Transaction::start(repository(), &json!({}));
        let t1 = t0.stage("a", json!({"k": 1}));
        let t2 = t1.stage("b", json!({"k": 2}));

        assert_eq!(t0.tasks().len(), 0);
        assert_eq!(t1.tasks().len(), 1);
        assert_eq!(t2.tasks().len(), 2);
        assert_eq!(t1.tasks()[0], StagedTask { name: "a".into(), args: json!({"k": 1}) });
        assert_eq!(t2.tasks()[1].name, "b");
        assert_eq!(t0.id(), t2.id());
    }

    #[test]
    fn test_branching_from_same_value() {
        let t0 = Transaction::start(repository(), &json!({}));
        let left = t0.stage("left", json!(null));
        let right = t0.stage("right", json!(null));

        assert_eq!(left.tasks()[0].name, "left");
        assert_eq!(right.tasks()[0].name, "right");
        assert_eq!(right.tasks().len(), 1);
    }

    #[test]
    fn test_commit_empty_transaction_succeeds() {
        let tx = Transaction::start(repository(), &json!({}));
        let result = tx.commit();
        assert_eq!(result, CommitResult { id: tx.id(), success: true });
    }

    #[test]
    fn test_decoded_transaction_keeps_only_allowed_context() {
        let forged = json!({
            "id": TransactionId::new().to_string(),
            "repository": {"table": "someone-else"},
            "ctxt": {"secret": "s", "authorization": "Bearer x", "method": "POST"},
            "tasks": []
        });

        let tx: Transaction = serde_json::from_value(forged).unwrap();
        let staged = tx.with_repository(repository()).stage("a", json!(null));

        assert_eq!(staged.ctxt().keys().collect::<Vec<_>>(), vec!["method"]);
        assert_eq!(staged.repository(), &repository());
        assert_eq!(staged.id(), tx.id());
    }

    #[test]
    fn test_wire_shape() {
        let tx = Transaction::start(repository(), &json!({"method": "POST"})).stage("a", json!([1]));
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["id"], json!(tx.id().to_string()));
        assert_eq!(value["ctxt"], json!({"method": "POST"}));
        assert_eq!(value["tasks"], json!([{"name": "a", "args": [1]}]));

        let back: Transaction = serde_json::from_value(value).unwrap();
        assert_eq!(back, tx);
    }
}
