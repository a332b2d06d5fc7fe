// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::time::TimeState;
use crate::value::Value;
use crate::world::World;
use crate::*;

use core::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal evaluation errors. These stop the current trigger and are handed to
/// the host; they never abort other triggers.
#[derive(Debug, Clone, Error)]
pub enum EvalError {
    /// The host invalidated the event, e.g. its world was unloaded.
    #[error("event `{0}` is no longer valid")]
    InvalidEvent(String),

    /// A change reached a node that does not accept it. The binder rules this
    /// out, so this indicates a tree that bypassed binding.
    #[error("`{target}` cannot be changed with mode {mode}")]
    UnsupportedChange { target: String, mode: String },
}

/// Before/now/after values of a single event value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub past: Option<Value>,
    #[serde(default)]
    pub present: Option<Value>,
    #[serde(default)]
    pub future: Option<Value>,
}

impl Snapshot {
    pub fn present(value: Value) -> Self {
        Self {
            present: Some(value),
            ..Self::default()
        }
    }

    pub fn at(&self, time: TimeState) -> Option<&Value> {
        match time {
            TimeState::Past => self.past.as_ref(),
            TimeState::Present => self.present.as_ref(),
            TimeState::Future => self.future.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventState {
    Live,
    Stale,
    Invalid,
}

/// Per-invocation context handed to every `evaluate` and `change` call.
///
/// Expressions treat it as opaque: they ask for event values and the world,
/// never for anything else.
#[derive(Debug)]
pub struct Event {
    name: Rc<str>,
    world: World,
    values: BTreeMap<Rc<str>, Snapshot>,
    data: RefCell<BTreeMap<Rc<str>, Value>>,
    state: Cell<EventState>,
}

impl Event {
    pub fn new(name: &str, world: World) -> Self {
        Self {
            name: name.into(),
            world,
            values: BTreeMap::new(),
            data: RefCell::new(BTreeMap::new()),
            state: Cell::new(EventState::Live),
        }
    }

    /// Context used to evaluate constant subtrees. It has no event values and
    /// an empty world.
    pub fn constant() -> Self {
        Self::new("", World::new())
    }

    pub fn with_value(mut self, name: &str, snapshot: Snapshot) -> Self {
        self.values.insert(name.into(), snapshot);
        self
    }

    pub fn with_data(self, name: &str, value: Value) -> Self {
        self.data.borrow_mut().insert(name.into(), value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn value(&self, name: &str, time: TimeState) -> Option<Value> {
        self.values.get(name).and_then(|s| s.at(time)).cloned()
    }

    /// Mutable event data such as the experience an event will drop.
    pub fn data(&self, name: &str) -> Option<Value> {
        self.data.borrow().get(name).cloned()
    }

    /// Returns false if the event does not carry `name`.
    pub fn set_data(&self, name: &str, value: Value) -> bool {
        match self.data.borrow_mut().get_mut(name) {
            Some(v) => {
                *v = value;
                true
            }
            None => false,
        }
    }

    /// Called by the host when a trigger resumes after a wait. Event-bound
    /// reads return nothing and changes become no-ops from then on.
    pub fn mark_stale(&self) {
        if self.state.get() == EventState::Live {
            self.state.set(EventState::Stale);
        }
    }

    pub fn is_stale(&self) -> bool {
        self.state.get() != EventState::Live
    }

    pub fn invalidate(&self) {
        self.state.set(EventState::Invalid);
    }

    pub fn ensure_valid(&self) -> Result<()> {
        match self.state.get() {
            EventState::Invalid => Err(EvalError::InvalidEvent(self.name.to_string()).into()),
            _ => Ok(()),
        }
    }
}
