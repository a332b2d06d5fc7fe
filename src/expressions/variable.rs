// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::changer::{unsupported, ChangeMode, Changer, DeltaSpec};
use crate::diagnostics::Diagnostics;
use crate::event::Event;
use crate::expression::Expression;
use crate::globals::Variables;
use crate::keyed::{KeyedEntry, KeyedValue, KeyedView};
use crate::typing::Type;
use crate::value::Value;
use crate::*;

use anyhow::Result;

/// `{name::*}`, a list variable in the shared variable store.
///
/// Keyed by the variable's own indices. `Add` appends under the first free
/// numeric index. `Set` from a keyed source keeps the source's keys.
/// `Reset` is not supported.
#[derive(Debug)]
pub struct ListVariable {
    name: Rc<str>,
    store: Variables,
}

impl ListVariable {
    pub fn new(name: &str, store: Variables) -> Self {
        Self {
            name: name.into(),
            store,
        }
    }
}

impl Expression for ListVariable {
    fn evaluate(&self, event: &Event) -> Result<Vec<Value>> {
        Ok(self
            .keyed_evaluate(event)?
            .into_iter()
            .map(|kv| kv.value)
            .collect())
    }

    fn return_type(&self) -> Type {
        Type::Any
    }

    fn is_single(&self) -> bool {
        false
    }

    fn is_loop_of(&self, marker: &str) -> bool {
        matches!(marker, "value" | "var" | "variable")
    }

    fn describe(&self, _event: Option<&Event>, _verbose: bool) -> String {
        format!("{{{}::*}}", self.name)
    }

    fn changer(&self) -> Option<&dyn Changer> {
        Some(self)
    }

    fn keyed(&self) -> Option<&dyn KeyedView> {
        Some(self)
    }
}

impl KeyedView for ListVariable {
    fn keyed_evaluate(&self, _event: &Event) -> Result<Vec<KeyedValue>> {
        Ok(self.store.entries(&self.name))
    }

    fn keyed_tree(&self, _event: &Event) -> Result<Vec<KeyedEntry>> {
        Ok(self.store.tree(&self.name))
    }
}

impl Changer for ListVariable {
    fn accept_change(&self, mode: ChangeMode) -> Option<DeltaSpec> {
        match mode {
            ChangeMode::Set | ChangeMode::Add | ChangeMode::Remove | ChangeMode::RemoveAll => {
                Some(DeltaSpec::plural(&[Type::Any]))
            }
            ChangeMode::Delete => Some(DeltaSpec::none()),
            ChangeMode::Reset => None,
        }
    }

    fn change(
        &self,
        _event: &Event,
        delta: Option<&[Value]>,
        mode: ChangeMode,
        _diagnostics: &Diagnostics,
    ) -> Result<()> {
        let delta = delta.unwrap_or_default();
        match mode {
            ChangeMode::Set => self.store.replace(&self.name, delta),
            ChangeMode::Add => {
                for v in delta {
                    self.store.push(&self.name, v.clone());
                }
            }
            ChangeMode::Remove | ChangeMode::RemoveAll => {
                for v in delta {
                    self.store
                        .remove_value(&self.name, v, mode == ChangeMode::RemoveAll);
                }
            }
            ChangeMode::Delete => self.store.clear(&self.name),
            ChangeMode::Reset => return Err(unsupported(&self.describe(None, false), mode)),
        }
        Ok(())
    }

    fn receives_keys(&self) -> bool {
        true
    }

    fn change_keyed(
        &self,
        event: &Event,
        delta: Vec<KeyedValue>,
        mode: ChangeMode,
        diagnostics: &Diagnostics,
    ) -> Result<()> {
        if mode != ChangeMode::Set {
            let values: Vec<Value> = delta.into_iter().map(|kv| kv.value).collect();
            return self.change(event, Some(&values), mode, diagnostics);
        }
        self.store.clear(&self.name);
        for kv in delta {
            self.store.set(&self.name, &kv.key, kv.value);
        }
        Ok(())
    }
}
