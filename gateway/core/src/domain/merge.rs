// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Default-Wins Merge
//!
//! System definitions are merged over user declarations so that the system
//! side can never be shadowed. For every key present on the defaults side the
//! default value wins, recursively merged when both sides are maps; keys only
//! the user declares are appended after the default keys.
//!
//! The schema compiler and the resolver graph builder both go through this one
//! implementation, so schema text and resolvers never diverge.
//!
//! A single field declaration ([`FieldSpec`]) is a leaf: a system field
//! replaces a same-named user field as a whole and no part of the user's shape
//! leaks into it.

use crate::domain::field_map::FieldMap;
use crate::domain::model::{FieldSpec, TypeDefinition};

pub trait DefaultsMerge: Clone {
    /// Merge `user` under `self`, with `self` taking precedence.
    fn merge_defaults(&self, user: &Self) -> Self;
}

/// Free-function form of [`DefaultsMerge::merge_defaults`].
pub fn merge_with_defaults<T: DefaultsMerge>(defaults: &T, user: &T) -> T {
    defaults.merge_defaults(user)
}

impl<V: DefaultsMerge> DefaultsMerge for FieldMap<V> {
    fn merge_defaults(&self, user: &Self) -> Self {
        let mut merged = FieldMap::new();

        for (key, default) in self.iter() {
            let value = match user.get(key) {
                Some(declared) => default.merge_defaults(declared),
                None => default.clone(),
            };
            merged.insert(key, value);
        }

        for (key, declared) in user.iter() {
            if !merged.contains_key(key) {
                merged.insert(key, declared.clone());
            }
        }

        merged
    }
}

impl DefaultsMerge for TypeDefinition {
    fn merge_defaults(&self, user: &Self) -> Self {
        TypeDefinition {
            methods: self.methods.merge_defaults(&user.methods),
        }
    }
}

impl DefaultsMerge for FieldSpec {
    fn merge_defaults(&self, _user: &Self) -> Self {
        self.clone()
    }
}
