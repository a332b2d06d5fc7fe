// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::event::Event;
use crate::expression::ExprRef;
use crate::value::Value;
use crate::*;

use anyhow::{bail, Result};

pub type Key = Rc<str>;

/// Separator of composite keys produced by flattening nested lists.
pub const KEY_SEPARATOR: &str = "::";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedValue {
    pub key: Key,
    pub value: Value,
}

impl KeyedValue {
    pub fn new(key: impl Into<Key>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

pub fn zip(keys: Vec<Key>, values: Vec<Value>) -> Result<Vec<KeyedValue>> {
    if keys.len() != values.len() {
        bail!(
            "{} keys cannot be paired with {} values",
            keys.len(),
            values.len()
        );
    }
    Ok(keys
        .into_iter()
        .zip(values)
        .map(|(key, value)| KeyedValue { key, value })
        .collect())
}

pub fn unzip(items: Vec<KeyedValue>) -> (Vec<Key>, Vec<Value>) {
    items.into_iter().map(|kv| (kv.key, kv.value)).unzip()
}

/// Keys `"1".."n"`, used for sources that have no keys of their own.
pub fn positional_keys(n: usize) -> Vec<Key> {
    (1..=n).map(|i| Key::from(i.to_string())).collect()
}

pub fn with_positional_keys(values: Vec<Value>) -> Vec<KeyedValue> {
    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| KeyedValue {
            key: (i + 1).to_string().into(),
            value,
        })
        .collect()
}

pub fn join_keys(parent: &str, child: &str) -> Key {
    format!("{parent}{KEY_SEPARATOR}{child}").into()
}

/// One node of a nested keyed structure. An entry may hold a value, children,
/// or both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedEntry {
    pub key: Key,
    pub value: Option<Value>,
    pub children: Vec<KeyedEntry>,
}

/// Associative access over an expression's values.
///
/// `keys_of` and `keyed_evaluate` always agree with `evaluate` of the same
/// node: one key per value, in the same order. Implementations derive all of
/// them from a single read.
pub trait KeyedView {
    fn keyed_evaluate(&self, event: &Event) -> Result<Vec<KeyedValue>>;

    fn keys_of(&self, event: &Event) -> Result<Vec<Key>> {
        Ok(unzip(self.keyed_evaluate(event)?).0)
    }

    /// Whether `loop-<marker>` of a loop over this node is the associative
    /// key rather than the 1-based position.
    fn is_index_loop(&self, marker: &str) -> bool {
        marker.eq_ignore_ascii_case("index") || marker.eq_ignore_ascii_case("key")
    }

    /// Whether the source can hold nested entries below its top-level keys.
    fn returns_nested(&self) -> bool {
        false
    }

    /// Nested view of the values. Flat sources report their entries as
    /// leaves.
    fn keyed_tree(&self, event: &Event) -> Result<Vec<KeyedEntry>> {
        Ok(self
            .keyed_evaluate(event)?
            .into_iter()
            .map(|kv| KeyedEntry {
                key: kv.key,
                value: Some(kv.value),
                children: vec![],
            })
            .collect())
    }
}

/// What `loop-<marker>` is bound to in one iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopIndex {
    Key(Key),
    /// 1-based.
    Position(usize),
}

impl From<LoopIndex> for Value {
    fn from(index: LoopIndex) -> Value {
        match index {
            LoopIndex::Key(k) => Value::String(k),
            LoopIndex::Position(p) => Value::from(p),
        }
    }
}

/// Iteration bindings of a loop over `expr`.
///
/// Keyed sources that claim the marker bind their keys; everything else binds
/// positions. Keys and values come from one read so they always line up.
pub fn loop_bindings(expr: &ExprRef, event: &Event, marker: &str) -> Result<Vec<(LoopIndex, Value)>> {
    if let Some(view) = expr.keyed() {
        if view.is_index_loop(marker) {
            return Ok(view
                .keyed_evaluate(event)?
                .into_iter()
                .map(|kv| (LoopIndex::Key(kv.key), kv.value))
                .collect());
        }
    }
    Ok(expr
        .evaluate(event)?
        .into_iter()
        .enumerate()
        .map(|(i, v)| (LoopIndex::Position(i + 1), v))
        .collect())
}
