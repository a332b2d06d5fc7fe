// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{describe_property, entity_ids};
use crate::binder::BindScope;
use crate::changer::{change_quantity, quantity_modes, Bounds, ChangeMode, Changer, DeltaSpec, Quantity};
use crate::diagnostics::Diagnostics;
use crate::event::Event;
use crate::expression::{expr, ExprRef, Expression};
use crate::number::Number;
use crate::registry::events;
use crate::time::{TimeSensitive, TimeState};
use crate::typing::Type;
use crate::value::Value;
use crate::world::{EntityId, EntityKind};

use anyhow::Result;

/// `the level of <players>`
///
/// Never below 0. `Delete` and `Reset` set 0. Inside a level change event the
/// level of the event's player has a past state (the old level) and a future
/// state (the new level); both are read-only.
#[derive(Debug)]
pub struct Level {
    players: ExprRef,
}

impl Level {
    pub fn new(players: ExprRef) -> Self {
        Self { players }
    }

    fn players(&self, event: &Event) -> Result<Vec<EntityId>> {
        let world = event.world();
        Ok(entity_ids(&self.players, event)?
            .into_iter()
            .filter(|id| world.entity(*id, |e| e.kind == EntityKind::Player).unwrap_or(false))
            .collect())
    }
}

impl Expression for Level {
    fn evaluate(&self, event: &Event) -> Result<Vec<Value>> {
        self.evaluate_at(event, TimeState::Present)
    }

    fn return_type(&self) -> Type {
        Type::Integer
    }

    fn is_single(&self) -> bool {
        self.players.is_single()
    }

    fn describe(&self, event: Option<&Event>, verbose: bool) -> String {
        describe_property("level", &self.players, event, verbose)
    }

    fn children(&self) -> Vec<ExprRef> {
        vec![self.players.clone()]
    }

    fn with_children(&self, mut children: Vec<ExprRef>) -> Option<ExprRef> {
        Some(expr(Self::new(children.pop()?)))
    }

    fn changer(&self) -> Option<&dyn Changer> {
        Some(self)
    }

    fn timed(&self) -> Option<&dyn TimeSensitive> {
        Some(self)
    }
}

impl TimeSensitive for Level {
    fn supports_time(&self, _time: TimeState, scope: &BindScope) -> bool {
        scope
            .events
            .iter()
            .any(|e| e.as_ref() == events::LEVEL_CHANGE)
    }

    fn evaluate_at(&self, event: &Event, time: TimeState) -> Result<Vec<Value>> {
        let world = event.world();
        // The event's player only, and only while the event is current.
        let event_player = if event.name() == events::LEVEL_CHANGE && !event.is_stale() {
            event.value("player", TimeState::Present)
        } else {
            None
        };
        let mut values = vec![];
        for id in self.players(event)? {
            let from_event = match (&event_player, time) {
                (Some(Value::Entity(p)), TimeState::Past) if *p == id => {
                    event.value("level", TimeState::Past)
                }
                (Some(Value::Entity(p)), _) if *p == id => event.value("level", TimeState::Future),
                _ => None,
            };
            match from_event {
                Some(v) => values.push(v),
                None => {
                    if let Some(level) = world.entity(id, |e| e.level) {
                        values.push(Value::from(level));
                    }
                }
            }
        }
        Ok(values)
    }
}

impl Quantity for Level {
    type Target = EntityId;

    fn targets(&self, event: &Event) -> Result<Vec<EntityId>> {
        self.players(event)
    }

    fn get(&self, event: &Event, target: &EntityId) -> Option<Number> {
        event.world().entity(*target, |e| Number::Int(e.level))
    }

    fn set(&self, event: &Event, target: &EntityId, value: Number) -> bool {
        event
            .world()
            .entity_mut(*target, |e| e.level = value.to_i64_lossy())
            .is_some()
    }

    fn bounds(&self, _event: &Event, _target: &EntityId) -> Bounds {
        Bounds::at_least(Number::Int(0))
    }

    fn reset_value(&self, _event: &Event, _target: &EntityId) -> Number {
        Number::Int(0)
    }

    fn integral(&self) -> bool {
        true
    }

    fn describe_quantity(&self) -> String {
        self.describe(None, false)
    }
}

impl Changer for Level {
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
