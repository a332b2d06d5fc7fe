// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! List transforms. Each one is keyed exactly when its source is keyed.

use crate::event::Event;
use crate::expression::{expr, ExprRef, Expression};
use crate::keyed::{join_keys, Key, KeyedEntry, KeyedValue, KeyedView, KEY_SEPARATOR};
use crate::typing::Type;
use crate::value::Value;
use crate::*;

use core::cmp::Ordering;
use core::fmt;

use anyhow::Result;

/// Ordering used by sorting transforms. Text compares case-insensitively.
/// `None` for values that have no order between them.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => Some(x.cmp(y)),
        (Value::String(x), Value::String(y)) => Some(
            x.to_lowercase()
                .cmp(&y.to_lowercase())
                .then_with(|| x.cmp(y)),
        ),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Sorts `items` by the value `value_of` picks. Returns false, leaving the
/// items unsorted, if some pair of values cannot be compared.
fn sort_by_value<T>(items: &mut [T], value_of: impl Fn(&T) -> &Value, descending: bool) -> bool {
    if let Some((first, rest)) = items.split_first() {
        let first = value_of(first);
        if rest
            .iter()
            .any(|i| compare_values(first, value_of(i)).is_none())
        {
            return false;
        }
    }
    items.sort_by(|a, b| {
        let o = compare_values(value_of(a), value_of(b)).unwrap_or(Ordering::Equal);
        if descending {
            o.reverse()
        } else {
            o
        }
    });
    true
}

/// `sorted <values>` in ascending or descending order.
///
/// Values that cannot be ordered against each other yield nothing.
#[derive(Debug)]
pub struct Sorted {
    source: ExprRef,
    descending: bool,
}

impl Sorted {
    pub fn new(source: ExprRef, descending: bool) -> Self {
        Self { source, descending }
    }
}

impl Expression for Sorted {
    fn evaluate(&self, event: &Event) -> Result<Vec<Value>> {
        let mut values = self.source.evaluate(event)?;
        if !sort_by_value(&mut values, |v| v, self.descending) {
            return Ok(vec![]);
        }
        Ok(values)
    }

    fn return_type(&self) -> Type {
        self.source.return_type()
    }

    fn is_single(&self) -> bool {
        false
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn is_loop_of(&self, marker: &str) -> bool {
        self.source.is_loop_of(marker)
    }

    fn describe(&self, event: Option<&Event>, verbose: bool) -> String {
        let order = if self.descending { " in descending order" } else { "" };
        format!("sorted {}{order}", self.source.describe(event, verbose))
    }

    fn children(&self) -> Vec<ExprRef> {
        vec![self.source.clone()]
    }

    fn with_children(&self, mut children: Vec<ExprRef>) -> Option<ExprRef> {
        Some(expr(Self::new(children.pop()?, self.descending)))
    }

    fn keyed(&self) -> Option<&dyn KeyedView> {
        self.source.keyed().map(|_| self as &dyn KeyedView)
    }
}

impl KeyedView for Sorted {
    fn keyed_evaluate(&self, event: &Event) -> Result<Vec<KeyedValue>> {
        let Some(source) = self.source.keyed() else {
            return Ok(vec![]);
        };
        let mut items = source.keyed_evaluate(event)?;
        if !sort_by_value(&mut items, |kv| &kv.value, self.descending) {
            return Ok(vec![]);
        }
        Ok(items)
    }

    fn is_index_loop(&self, marker: &str) -> bool {
        self.source.keyed().is_some_and(|k| k.is_index_loop(marker))
    }

    fn returns_nested(&self) -> bool {
        self.source.keyed().is_some_and(|k| k.returns_nested())
    }
}

/// `reversed <values>`
#[derive(Debug)]
pub struct Reversed {
    source: ExprRef,
}

impl Reversed {
    pub fn new(source: ExprRef) -> Self {
        Self { source }
    }
}

impl Expression for Reversed {
    fn evaluate(&self, event: &Event) -> Result<Vec<Value>> {
        let mut values = self.source.evaluate(event)?;
        values.reverse();
        Ok(values)
    }

    fn return_type(&self) -> Type {
        self.source.return_type()
    }

    fn is_single(&self) -> bool {
        self.source.is_single()
    }

    fn is_and(&self) -> bool {
        self.source.is_and()
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn is_loop_of(&self, marker: &str) -> bool {
        self.source.is_loop_of(marker)
    }

    fn describe(&self, event: Option<&Event>, verbose: bool) -> String {
        format!("reversed {}", self.source.describe(event, verbose))
    }

    fn children(&self) -> Vec<ExprRef> {
        vec![self.source.clone()]
    }

    fn with_children(&self, mut children: Vec<ExprRef>) -> Option<ExprRef> {
        Some(expr(Self::new(children.pop()?)))
    }

    fn keyed(&self) -> Option<&dyn KeyedView> {
        self.source.keyed().map(|_| self as &dyn KeyedView)
    }
}

impl KeyedView for Reversed {
    fn keyed_evaluate(&self, event: &Event) -> Result<Vec<KeyedValue>> {
        let Some(source) = self.source.keyed() else {
            return Ok(vec![]);
        };
        let mut items = source.keyed_evaluate(event)?;
        items.reverse();
        Ok(items)
    }

    fn is_index_loop(&self, marker: &str) -> bool {
        self.source.keyed().is_some_and(|k| k.is_index_loop(marker))
    }

    fn returns_nested(&self) -> bool {
        self.source.keyed().is_some_and(|k| k.returns_nested())
    }
}

/// Predicate of a filter. Gets the value and, for keyed sources, its key.
pub type FilterFn = Rc<dyn Fn(&Value, Option<&str>) -> bool>;

/// `<values> where [<condition>]`
///
/// Surviving values keep their keys.
pub struct Filtered {
    source: ExprRef,
    predicate: FilterFn,
    condition: Rc<str>,
}

impl fmt::Debug for Filtered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filtered")
            .field("source", &self.source)
            .field("condition", &self.condition)
            .finish()
    }
}

impl Filtered {
    /// `condition` is the source text of the predicate, used for describing.
    pub fn new(source: ExprRef, predicate: FilterFn, condition: &str) -> Self {
        Self {
            source,
            predicate,
            condition: condition.into(),
        }
    }
}

impl Expression for Filtered {
    fn evaluate(&self, event: &Event) -> Result<Vec<Value>> {
        if self.source.keyed().is_some() {
            return Ok(self
                .keyed_evaluate(event)?
                .into_iter()
                .map(|kv| kv.value)
                .collect());
        }
        Ok(self
            .source
            .evaluate(event)?
            .into_iter()
            .filter(|v| (self.predicate)(v, None))
            .collect())
    }

    fn return_type(&self) -> Type {
        self.source.return_type()
    }

    fn is_single(&self) -> bool {
        false
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn is_loop_of(&self, marker: &str) -> bool {
        self.source.is_loop_of(marker)
    }

    fn describe(&self, event: Option<&Event>, verbose: bool) -> String {
        format!(
            "{} where [{}]",
            self.source.describe(event, verbose),
            self.condition
        )
    }

    fn children(&self) -> Vec<ExprRef> {
        vec![self.source.clone()]
    }

    fn with_children(&self, mut children: Vec<ExprRef>) -> Option<ExprRef> {
        Some(expr(Self {
            source: children.pop()?,
            predicate: self.predicate.clone(),
            condition: self.condition.clone(),
        }))
    }

    fn keyed(&self) -> Option<&dyn KeyedView> {
        self.source.keyed().map(|_| self as &dyn KeyedView)
    }
}

impl KeyedView for Filtered {
    fn keyed_evaluate(&self, event: &Event) -> Result<Vec<KeyedValue>> {
        let Some(source) = self.source.keyed() else {
            return Ok(vec![]);
        };
        Ok(source
            .keyed_evaluate(event)?
            .into_iter()
            .filter(|kv| (self.predicate)(&kv.value, Some(&*kv.key)))
            .collect())
    }

    fn is_index_loop(&self, marker: &str) -> bool {
        self.source.keyed().is_some_and(|k| k.is_index_loop(marker))
    }

    fn returns_nested(&self) -> bool {
        self.source.keyed().is_some_and(|k| k.returns_nested())
    }
}

/// `recursive <list>`
///
/// Every value of a nested list, depth first. Keys are the paths of the
/// original keys joined with `::`, so they never collide.
#[derive(Debug)]
pub struct Recursive {
    source: ExprRef,
}

impl Recursive {
    pub fn new(source: ExprRef) -> Self {
        Self { source }
    }

    fn flatten(prefix: Option<&Key>, entries: Vec<KeyedEntry>, out: &mut Vec<KeyedValue>) {
        for entry in entries {
            let key = match prefix {
                Some(p) => join_keys(p, &entry.key),
                None => entry.key,
            };
            if let Some(value) = entry.value {
                out.push(KeyedValue {
                    key: key.clone(),
                    value,
                });
            }
            Self::flatten(Some(&key), entry.children, out);
        }
    }
}

impl Expression for Recursive {
    fn evaluate(&self, event: &Event) -> Result<Vec<Value>> {
        if self.source.keyed().is_none() {
            return self.source.evaluate(event);
        }
        Ok(self
            .keyed_evaluate(event)?
            .into_iter()
            .map(|kv| kv.value)
            .collect())
    }

    fn return_type(&self) -> Type {
        self.source.return_type()
    }

    fn is_single(&self) -> bool {
        false
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn is_loop_of(&self, marker: &str) -> bool {
        self.source.is_loop_of(marker)
    }

    fn describe(&self, event: Option<&Event>, verbose: bool) -> String {
        format!("recursive {}", self.source.describe(event, verbose))
    }

    fn children(&self) -> Vec<ExprRef> {
        vec![self.source.clone()]
    }

    fn with_children(&self, mut children: Vec<ExprRef>) -> Option<ExprRef> {
        Some(expr(Self::new(children.pop()?)))
    }

    fn keyed(&self) -> Option<&dyn KeyedView> {
        self.source.keyed().map(|_| self as &dyn KeyedView)
    }
}

impl KeyedView for Recursive {
    fn keyed_evaluate(&self, event: &Event) -> Result<Vec<KeyedValue>> {
        let Some(source) = self.source.keyed() else {
            return Ok(vec![]);
        };
        let mut out = vec![];
        Self::flatten(None, source.keyed_tree(event)?, &mut out);
        Ok(out)
    }

    fn returns_nested(&self) -> bool {
        true
    }
}

/// `indices of <keyed list>`, optionally sorted by value.
///
/// Unsorted, it lists the top-level keys of the source once each, including
/// keys that only hold nested entries. Over a source that already flattens
/// nested entries, the composite keys are listed as they are.
#[derive(Debug)]
pub struct Indices {
    source: ExprRef,
    order: Option<bool>,
}

impl Indices {
    /// `sort` is `None` for source order, `Some(descending)` otherwise.
    pub fn new(source: ExprRef, sort: Option<bool>) -> Self {
        Self {
            source,
            order: sort,
        }
    }
}

impl Expression for Indices {
    fn evaluate(&self, event: &Event) -> Result<Vec<Value>> {
        let Some(source) = self.source.keyed() else {
            return Ok(vec![]);
        };
        let keys: Vec<Key> = match self.order {
            Some(descending) => {
                let mut items = source.keyed_evaluate(event)?;
                if !sort_by_value(&mut items, |kv| &kv.value, descending) {
                    return Ok(vec![]);
                }
                items.into_iter().map(|kv| kv.key).collect()
            }
            None if source.returns_nested() => source.keys_of(event)?,
            None => {
                let mut keys: Vec<Key> = vec![];
                for entry in source.keyed_tree(event)? {
                    let top: Key = match entry.key.split_once(KEY_SEPARATOR) {
                        Some((top, _)) => top.into(),
                        None => entry.key.clone(),
                    };
                    if !keys.contains(&top) {
                        keys.push(top);
                    }
                }
                keys
            }
        };
        Ok(keys.into_iter().map(Value::String).collect())
    }

    fn return_type(&self) -> Type {
        Type::String
    }

    fn is_single(&self) -> bool {
        false
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn describe(&self, event: Option<&Event>, verbose: bool) -> String {
        let indices = format!("indices of {}", self.source.describe(event, verbose));
        match self.order {
            None => indices,
            Some(true) => format!("sorted {indices} in descending order"),
            Some(false) => format!("sorted {indices} in ascending order"),
        }
    }

    fn children(&self) -> Vec<ExprRef> {
        vec![self.source.clone()]
    }

    fn with_children(&self, mut children: Vec<ExprRef>) -> Option<ExprRef> {
        Some(expr(Self::new(children.pop()?, self.order)))
    }
}
