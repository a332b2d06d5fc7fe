// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::binder::BindScope;
use crate::changer::Changer;
use crate::event::Event;
use crate::expression::{ExprRef, Expression};
use crate::typing::Type;
use crate::value::Value;

use core::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Which snapshot of an event-bound value an expression reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeState {
    Past,
    #[default]
    Present,
    Future,
}

impl fmt::Display for TimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TimeState::Past => "past",
            TimeState::Present => "present",
            TimeState::Future => "future",
        })
    }
}

/// Capability of expressions whose value differs before and after an event.
pub trait TimeSensitive {
    /// Negotiated once while binding. Returning false fails the binding.
    fn supports_time(&self, time: TimeState, scope: &BindScope) -> bool;

    fn evaluate_at(&self, event: &Event, time: TimeState) -> Result<Vec<Value>>;
}

/// An expression pinned to a time state.
///
/// Built only by the binder after the wrapped expression accepted the time.
/// Past and future snapshots are read-only.
#[derive(Debug)]
pub struct Timed {
    inner: ExprRef,
    time: TimeState,
}

impl Timed {
    pub(crate) fn new(inner: ExprRef, time: TimeState) -> Self {
        Self { inner, time }
    }

    pub fn time(&self) -> TimeState {
        self.time
    }

    pub fn inner(&self) -> &ExprRef {
        &self.inner
    }
}

impl Expression for Timed {
    fn evaluate(&self, event: &Event) -> Result<Vec<Value>> {
        match self.inner.timed() {
            Some(t) => t.evaluate_at(event, self.time),
            None => self.inner.evaluate(event),
        }
    }

    fn return_type(&self) -> Type {
        self.inner.return_type()
    }

    fn is_single(&self) -> bool {
        self.inner.is_single()
    }

    fn is_default(&self) -> bool {
        self.inner.is_default()
    }

    fn is_loop_of(&self, marker: &str) -> bool {
        self.inner.is_loop_of(marker)
    }

    fn describe(&self, event: Option<&Event>, verbose: bool) -> String {
        match self.time {
            TimeState::Present => self.inner.describe(event, verbose),
            time => format!("{time} {}", self.inner.describe(event, verbose)),
        }
    }

    fn changer(&self) -> Option<&dyn Changer> {
        match self.time {
            TimeState::Present => self.inner.changer(),
            _ => None,
        }
    }
}
