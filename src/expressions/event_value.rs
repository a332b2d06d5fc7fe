// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::binder::BindScope;
use crate::event::Event;
use crate::expression::Expression;
use crate::registry::EventValueInfo;
use crate::time::{TimeSensitive, TimeState};
use crate::typing::Type;
use crate::value::Value;
use crate::*;

use anyhow::Result;

/// A value carried by the event itself, such as the victim of a damage
/// event. Bound against every event kind of the trigger that provides it.
#[derive(Debug)]
pub struct EventValue {
    name: Rc<str>,
    sources: Vec<(Rc<str>, &'static EventValueInfo)>,
    ty: Type,
}

impl EventValue {
    pub fn new(name: &str, sources: Vec<(Rc<str>, &'static EventValueInfo)>) -> Self {
        let ty = sources
            .iter()
            .map(|(_, info)| info.ty)
            .reduce(|a, b| a.common(&b))
            .unwrap_or(Type::Any);
        Self {
            name: name.into(),
            sources,
            ty,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Expression for EventValue {
    fn evaluate(&self, event: &Event) -> Result<Vec<Value>> {
        self.evaluate_at(event, TimeState::Present)
    }

    fn return_type(&self) -> Type {
        self.ty
    }

    fn is_single(&self) -> bool {
        true
    }

    fn is_default(&self) -> bool {
        self.sources.iter().any(|(_, info)| info.default)
    }

    fn is_loop_of(&self, marker: &str) -> bool {
        marker == self.name.as_ref()
    }

    fn describe(&self, event: Option<&Event>, verbose: bool) -> String {
        match event.and_then(|e| e.value(&self.name, TimeState::Present)) {
            Some(v) if verbose => format!("the {} ({v})", self.name),
            _ => format!("the {}", self.name),
        }
    }

    fn timed(&self) -> Option<&dyn TimeSensitive> {
        Some(self)
    }
}

impl TimeSensitive for EventValue {
    fn supports_time(&self, time: TimeState, scope: &BindScope) -> bool {
        self.sources
            .iter()
            .filter(|(event, _)| scope.events.contains(event))
            .all(|(_, info)| info.times.contains(&time))
    }

    fn evaluate_at(&self, event: &Event, time: TimeState) -> Result<Vec<Value>> {
        if event.is_stale() || !self.sources.iter().any(|(e, _)| e.as_ref() == event.name()) {
            return Ok(vec![]);
        }
        Ok(event.value(&self.name, time).into_iter().collect())
    }
}
