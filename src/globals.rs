// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Process-scoped state shared by scripts.
//!
//! Every piece of state here is a shared handle with an explicit writer and
//! reader. Tests create fresh handles per case.

use crate::keyed::{Key, KeyedEntry, KeyedValue, KEY_SEPARATOR};
use crate::value::Value;
use crate::world::EntityId;
use crate::*;

use core::cell::{Cell, RefCell};

use indexmap::IndexMap;

/// The most recently spawned entity. Written by spawn statements, read by
/// `last spawned entity`.
#[derive(Debug, Clone, Default)]
pub struct LastSpawned {
    inner: Rc<Cell<Option<EntityId>>>,
}

impl LastSpawned {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<EntityId> {
        self.inner.get()
    }

    pub fn set(&self, id: EntityId) {
        self.inner.set(Some(id));
    }

    pub fn clear(&self) {
        self.inner.set(None);
    }
}

#[derive(Debug, Clone, Default)]
struct VarEntry {
    value: Option<Value>,
    children: IndexMap<Key, VarEntry>,
}

impl VarEntry {
    fn is_empty(&self) -> bool {
        self.value.is_none() && self.children.is_empty()
    }

    fn to_keyed(&self, key: &Key) -> KeyedEntry {
        KeyedEntry {
            key: key.clone(),
            value: self.value.clone(),
            children: self
                .children
                .iter()
                .map(|(k, e)| e.to_keyed(k))
                .collect(),
        }
    }
}

/// Store of list variables `{name::*}`.
///
/// Entries keep insertion order. A key may hold a value and nested entries
/// at the same time; `a::b` paths address nested entries.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    lists: Rc<RefCell<IndexMap<Rc<str>, IndexMap<Key, VarEntry>>>>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level entries that hold a value.
    pub fn entries(&self, list: &str) -> Vec<KeyedValue> {
        let lists = self.lists.borrow();
        let Some(entries) = lists.get(list) else {
            return vec![];
        };
        entries
            .iter()
            .filter_map(|(k, e)| {
                e.value.as_ref().map(|v| KeyedValue {
                    key: k.clone(),
                    value: v.clone(),
                })
            })
            .collect()
    }

    pub fn tree(&self, list: &str) -> Vec<KeyedEntry> {
        let lists = self.lists.borrow();
        match lists.get(list) {
            Some(entries) => entries.iter().map(|(k, e)| e.to_keyed(k)).collect(),
            None => vec![],
        }
    }

    pub fn get(&self, list: &str, path: &str) -> Option<Value> {
        let lists = self.lists.borrow();
        let mut parts = path.split(KEY_SEPARATOR);
        let first = parts.next()?;
        let mut entry = lists.get(list)?.get(first)?;
        for part in parts {
            entry = entry.children.get(part)?;
        }
        entry.value.clone()
    }

    /// Writes a value at `path`, creating intermediate entries.
    pub fn set(&self, list: &str, path: &str, value: Value) {
        let mut lists = self.lists.borrow_mut();
        let mut entries = lists.entry(list.into()).or_default();
        let mut parts = path.split(KEY_SEPARATOR).peekable();
        while let Some(part) = parts.next() {
            let entry = entries.entry(part.into()).or_default();
            if parts.peek().is_none() {
                entry.value = Some(value);
                return;
            }
            entries = &mut entry.children;
        }
    }

    /// Appends under the first free positional key starting at `1`.
    pub fn push(&self, list: &str, value: Value) {
        let mut lists = self.lists.borrow_mut();
        let entries = lists.entry(list.into()).or_default();
        let mut i = 1usize;
        while entries.get(i.to_string().as_str()).is_some_and(|e| !e.is_empty()) {
            i += 1;
        }
        entries.entry(i.to_string().into()).or_default().value = Some(value);
    }

    /// Removes the first top-level entry equal to `value`, or all of them.
    /// Returns the number of entries removed.
    pub fn remove_value(&self, list: &str, value: &Value, all: bool) -> usize {
        let mut lists = self.lists.borrow_mut();
        let Some(entries) = lists.get_mut(list) else {
            return 0;
        };
        let mut removed = 0;
        entries.retain(|_, e| {
            if (removed == 0 || all) && e.value.as_ref() == Some(value) {
                removed += 1;
                e.value = None;
            }
            !e.is_empty()
        });
        removed
    }

    pub fn clear(&self, list: &str) {
        self.lists.borrow_mut().shift_remove(list);
    }

    /// Replaces the whole list with positionally keyed values.
    pub fn replace(&self, list: &str, values: &[Value]) {
        let mut lists = self.lists.borrow_mut();
        let entries = lists.entry(list.into()).or_default();
        entries.clear();
        for (i, v) in values.iter().enumerate() {
            entries.insert(
                (i + 1).to_string().into(),
                VarEntry {
                    value: Some(v.clone()),
                    children: IndexMap::new(),
                },
            );
        }
    }
}

/// Everything process-scoped that expressions may reach.
#[derive(Debug, Clone, Default)]
pub struct Globals {
    pub variables: Variables,
    pub last_spawned: LastSpawned,
}

impl Globals {
    pub fn new() -> Self {
        Self::default()
    }
}
