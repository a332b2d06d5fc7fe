// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::changer::{ChangeMode, Changer, DeltaSpec};
use crate::diagnostics::Diagnostics;
use crate::event::Event;
use crate::expression::{expr, ExprRef, Expression};
use crate::typing::Type;
use crate::value::Value;

use anyhow::Result;

/// `a, b and c` or `a, b or c`.
///
/// An and-list yields the values of every item. An or-list yields the values
/// of its first item that has any. Changing a list changes every item, so it
/// accepts only what all items accept.
#[derive(Debug)]
pub struct ExpressionList {
    items: Vec<ExprRef>,
    and: bool,
}

impl ExpressionList {
    pub fn new(items: Vec<ExprRef>, and: bool) -> Self {
        Self { items, and }
    }

    pub fn items(&self) -> &[ExprRef] {
        &self.items
    }
}

impl Expression for ExpressionList {
    fn evaluate(&self, event: &Event) -> Result<Vec<Value>> {
        let mut values = vec![];
        for item in &self.items {
            let v = item.evaluate(event)?;
            if !self.and && !v.is_empty() {
                return Ok(v);
            }
            values.extend(v);
        }
        Ok(values)
    }

    fn return_type(&self) -> Type {
        self.items
            .iter()
            .map(|i| i.return_type())
            .reduce(|a, b| a.common(&b))
            .unwrap_or(Type::Any)
    }

    fn is_single(&self) -> bool {
        match self.items.as_slice() {
            [single] => single.is_single(),
            items if self.and => items.is_empty(),
            items => items.iter().all(|i| i.is_single()),
        }
    }

    fn is_and(&self) -> bool {
        self.and
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn is_loop_of(&self, marker: &str) -> bool {
        self.items.iter().any(|i| i.is_loop_of(marker))
    }

    fn check(&self, event: &Event, predicate: &dyn Fn(&Value) -> bool, negated: bool) -> Result<bool> {
        // Each item is checked as a whole, so `a or b` passes if either item
        // passes even when the other has values.
        for item in &self.items {
            let passed = item.check(event, predicate, false)?;
            if self.and && !passed {
                return Ok(negated);
            }
            if !self.and && passed {
                return Ok(!negated);
            }
        }
        Ok(negated ^ self.and)
    }

    fn describe(&self, event: Option<&Event>, verbose: bool) -> String {
        let parts: Vec<String> = self
            .items
            .iter()
            .map(|i| i.describe(event, verbose))
            .collect();
        match parts.as_slice() {
            [] => String::new(),
            [single] => single.clone(),
            [init @ .., last] => {
                let conjunction = if self.and { "and" } else { "or" };
                format!("{} {conjunction} {last}", init.join(", "))
            }
        }
    }

    fn children(&self) -> Vec<ExprRef> {
        self.items.clone()
    }

    fn with_children(&self, children: Vec<ExprRef>) -> Option<ExprRef> {
        if children.len() != self.items.len() {
            return None;
        }
        Some(expr(Self::new(children, self.and)))
    }

    fn changer(&self) -> Option<&dyn Changer> {
        if self.and && !self.items.is_empty() && self.items.iter().all(|i| i.changer().is_some()) {
            Some(self)
        } else {
            None
        }
    }
}

impl Changer for ExpressionList {
    fn accept_change(&self, mode: ChangeMode) -> Option<DeltaSpec> {
        let mut specs = vec![];
        for item in &self.items {
            specs.push(item.changer()?.accept_change(mode)?);
        }
        let (first, rest) = specs.split_first()?;
        if rest.iter().any(|s| s.requires_delta() != first.requires_delta()) {
            return None;
        }
        let types: Vec<Type> = first
            .types
            .iter()
            .filter(|t| rest.iter().all(|s| s.accepts(t)))
            .copied()
            .collect();
        if first.requires_delta() && types.is_empty() {
            return None;
        }
        Some(DeltaSpec {
            types,
            plural: specs.iter().all(|s| s.plural),
        })
    }

    fn change(
        &self,
        event: &Event,
        delta: Option<&[Value]>,
        mode: ChangeMode,
        diagnostics: &Diagnostics,
    ) -> Result<()> {
        for item in &self.items {
            if let Some(changer) = item.changer() {
                changer.change(event, delta, mode, diagnostics)?;
            }
        }
        Ok(())
    }
}
