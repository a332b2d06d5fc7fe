// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::changer::{change_quantity, quantity_modes, Bounds, ChangeMode, Changer, DeltaSpec, Quantity};
use crate::diagnostics::Diagnostics;
use crate::event::Event;
use crate::expression::Expression;
use crate::number::Number;
use crate::registry::events;
use crate::typing::Type;
use crate::value::Value;

use anyhow::Result;

/// Where an event keeps the experience it will hand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceSource {
    /// An experience orb being spawned.
    Spawned,
    /// Experience dropped by a broken block.
    BlockDrop,
    /// Experience a player is about to receive.
    Pickup,
    /// Experience dropped by breeding.
    Breeding,
    /// Experience dropped by fishing.
    Fishing,
}

impl ExperienceSource {
    pub fn of_event(name: &str) -> Option<Self> {
        match name {
            events::EXPERIENCE_SPAWN => Some(Self::Spawned),
            events::BLOCK_BREAK => Some(Self::BlockDrop),
            events::EXPERIENCE_CHANGE => Some(Self::Pickup),
            events::BREED => Some(Self::Breeding),
            events::FISH => Some(Self::Fishing),
            _ => None,
        }
    }

    /// Event data slot holding the amount.
    pub fn data_key(&self) -> &'static str {
        match self {
            Self::Spawned => "spawned experience",
            Self::BlockDrop | Self::Fishing => "experience to drop",
            Self::Pickup => "amount",
            Self::Breeding => "experience",
        }
    }
}

/// `the experience` of an experience dropping event.
///
/// Never below 0. `Delete` and `Reset` set 0. Several deltas of `add` and
/// `remove` are summed.
#[derive(Debug, Default)]
pub struct Experience;

impl Experience {
    pub fn new() -> Self {
        Self
    }

    fn source(event: &Event) -> Option<ExperienceSource> {
        if event.is_stale() {
            return None;
        }
        ExperienceSource::of_event(event.name())
    }
}

impl Expression for Experience {
    fn evaluate(&self, event: &Event) -> Result<Vec<Value>> {
        Ok(Self::source(event)
            .and_then(|s| event.data(s.data_key()))
            .into_iter()
            .collect())
    }

    fn return_type(&self) -> Type {
        Type::Integer
    }

    fn is_single(&self) -> bool {
        true
    }

    fn describe(&self, _event: Option<&Event>, _verbose: bool) -> String {
        "the experience".to_string()
    }

    fn changer(&self) -> Option<&dyn Changer> {
        Some(self)
    }
}

impl Quantity for Experience {
    type Target = ExperienceSource;

    fn targets(&self, event: &Event) -> Result<Vec<ExperienceSource>> {
        Ok(Self::source(event).into_iter().collect())
    }

    fn get(&self, event: &Event, target: &ExperienceSource) -> Option<Number> {
        match event.data(target.data_key()) {
            Some(Value::Number(n)) => Some(n),
            _ => None,
        }
    }

    fn set(&self, event: &Event, target: &ExperienceSource, value: Number) -> bool {
        event.set_data(target.data_key(), Value::from(value.to_i64_lossy()))
    }

    fn bounds(&self, _event: &Event, _target: &ExperienceSource) -> Bounds {
        Bounds::at_least(Number::Int(0))
    }

    fn reset_value(&self, _event: &Event, _target: &ExperienceSource) -> Number {
        Number::Int(0)
    }

    fn integral(&self) -> bool {
        true
    }

    fn describe_quantity(&self) -> String {
        self.describe(None, false)
    }
}

impl Changer for Experience {
    fn accept_change(&self, mode: ChangeMode) -> Option<DeltaSpec> {
        quantity_modes(mode, &[Type::Number])
    }

    fn change(
        &self,
        event: &Event,
        delta: Option<&[Value]>,
        mode: ChangeMode,
        diagnostics: &Diagnostics,
    ) -> Result<()> {
        change_quantity(self, event, delta, mode, diagnostics)
    }
}
