// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::changer::Changer;
use crate::event::Event;
use crate::fold::Constant;
use crate::keyed::KeyedView;
use crate::time::TimeSensitive;
use crate::typing::Type;
use crate::value::Value;
use crate::*;

use core::{cmp, fmt, ops::Deref};

use anyhow::Result;

/// Shared handle to an immutable node. Equality and ordering are by identity.
pub struct NodeRef<T: ?Sized> {
    r: Rc<T>,
}

impl<T: ?Sized> Clone for NodeRef<T> {
    fn clone(&self) -> Self {
        Self { r: self.r.clone() }
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for NodeRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.r.as_ref().fmt(f)
    }
}

impl<T: ?Sized> cmp::PartialEq for NodeRef<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.r, &other.r)
    }
}

impl<T: ?Sized> cmp::Eq for NodeRef<T> {}

impl<T: ?Sized> Deref for NodeRef<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.r
    }
}

impl<T: ?Sized> AsRef<T> for NodeRef<T> {
    fn as_ref(&self) -> &T {
        self.deref()
    }
}

impl<T: ?Sized> From<Rc<T>> for NodeRef<T> {
    fn from(r: Rc<T>) -> Self {
        Self { r }
    }
}

pub type Ref<T> = NodeRef<T>;
pub type ExprRef = Ref<dyn Expression>;

/// Wraps a concrete node into a shareable expression handle.
pub fn expr<E: Expression + 'static>(e: E) -> ExprRef {
    NodeRef { r: Rc::new(e) }
}

/// The contract every concrete expression implements.
///
/// Nodes are immutable once built. All per-execution state lives in the
/// [`Event`] and in the world it points at, so one tree can serve any number
/// of triggers.
///
/// Optional capabilities (changing, keyed access, time states) are queried
/// through [`Expression::changer`], [`Expression::keyed`] and
/// [`Expression::timed`] instead of being part of this trait.
pub trait Expression: fmt::Debug {
    /// Produces the current values.
    ///
    /// "Nothing here" is an empty vector, never an error. Errors are reserved
    /// for fatal conditions such as an invalidated event. A single expression
    /// yields at most one value.
    fn evaluate(&self, event: &Event) -> Result<Vec<Value>>;

    fn return_type(&self) -> Type;

    fn is_single(&self) -> bool;

    /// Human readable rendering, optionally resolved against a live event.
    fn describe(&self, event: Option<&Event>, verbose: bool) -> String;

    /// The one value of a single expression. For plural expressions this is
    /// the first value, which is what a plural expression means when it is
    /// used where a single value is expected.
    fn evaluate_one(&self, event: &Event) -> Result<Option<Value>> {
        Ok(self.evaluate(event)?.into_iter().next())
    }

    /// `true` for "a, b and c" lists, `false` for "a, b or c" lists.
    fn is_and(&self) -> bool {
        true
    }

    /// Whether this is the canonical source of its type in the current event
    /// scope. Used by the binder to pick among several candidates.
    fn is_default(&self) -> bool {
        false
    }

    /// Whether a loop over this expression binds `loop-<marker>`.
    fn is_loop_of(&self, _marker: &str) -> bool {
        false
    }

    /// Side-effect free and independent of the live event. Only pure nodes
    /// over constant children are folded.
    fn is_pure(&self) -> bool {
        false
    }

    fn children(&self) -> Vec<ExprRef> {
        vec![]
    }

    /// Rebuilds this node over new children, in the order returned by
    /// [`Expression::children`]. `None` means the node cannot be rebuilt.
    fn with_children(&self, _children: Vec<ExprRef>) -> Option<ExprRef> {
        None
    }

    fn changer(&self) -> Option<&dyn Changer> {
        None
    }

    fn keyed(&self) -> Option<&dyn KeyedView> {
        None
    }

    fn timed(&self) -> Option<&dyn TimeSensitive> {
        None
    }

    fn as_constant(&self) -> Option<&Constant> {
        None
    }

    /// Tests the values against `predicate`, honoring and/or lists.
    fn check(&self, event: &Event, predicate: &dyn Fn(&Value) -> bool, negated: bool) -> Result<bool> {
        Ok(check_values(
            &self.evaluate(event)?,
            predicate,
            negated,
            self.is_and(),
        ))
    }
}

/// And-lists pass if every value passes, or-lists if any value passes. An
/// empty sequence never passes, so it yields `negated`.
pub fn check_values(
    values: &[Value],
    predicate: &dyn Fn(&Value) -> bool,
    negated: bool,
    and: bool,
) -> bool {
    if values.is_empty() {
        return negated;
    }
    for v in values {
        let passed = predicate(v);
        if and && !passed {
            return negated;
        }
        if !and && passed {
            return !negated;
        }
    }
    negated ^ and
}

/// Renders values the way scripts list them: `a, b and c`.
pub fn join_values(values: &[Value], and: bool) -> String {
    let conjunction = if and { "and" } else { "or" };
    match values {
        [] => "<none>".to_string(),
        [single] => single.to_string(),
        [init @ .., last] => {
            let init: Vec<String> = init.iter().map(|v| v.to_string()).collect();
            format!("{} {conjunction} {last}", init.join(", "))
        }
    }
}
