// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{describe_property, entity_ids};
use crate::changer::{change_quantity, quantity_modes, Bounds, ChangeMode, Changer, DeltaSpec, Quantity};
use crate::diagnostics::Diagnostics;
use crate::event::Event;
use crate::expression::{expr, ExprRef, Expression};
use crate::number::Number;
use crate::typing::Type;
use crate::value::Value;
use crate::world::EntityId;

use anyhow::Result;

/// `the health of <living entities>`
///
/// Clamped to `[0, max health]`. `Delete` sets 0, `Reset` restores the max
/// health. Entities that are not alive are skipped.
#[derive(Debug)]
pub struct Health {
    entities: ExprRef,
}

impl Health {
    pub fn new(entities: ExprRef) -> Self {
        Self { entities }
    }
}

impl Expression for Health {
    fn evaluate(&self, event: &Event) -> Result<Vec<Value>> {
        let world = event.world();
        Ok(entity_ids(&self.entities, event)?
            .into_iter()
            .filter_map(|id| world.entity(id, |e| e.is_living().then_some(e.health)).flatten())
            .map(Value::from)
            .collect())
    }

    fn return_type(&self) -> Type {
        Type::Number
    }

    fn is_single(&self) -> bool {
        self.entities.is_single()
    }

    fn describe(&self, event: Option<&Event>, verbose: bool) -> String {
        describe_property("health", &self.entities, event, verbose)
    }

    fn children(&self) -> Vec<ExprRef> {
        vec![self.entities.clone()]
    }

    fn with_children(&self, mut children: Vec<ExprRef>) -> Option<ExprRef> {
        Some(expr(Self::new(children.pop()?)))
    }

    fn changer(&self) -> Option<&dyn Changer> {
        Some(self)
    }
}

impl Quantity for Health {
    type Target = EntityId;

    fn targets(&self, event: &Event) -> Result<Vec<EntityId>> {
        let world = event.world();
        Ok(entity_ids(&self.entities, event)?
            .into_iter()
            .filter(|id| world.entity(*id, |e| e.is_living()).unwrap_or(false))
            .collect())
    }

    fn get(&self, event: &Event, target: &EntityId) -> Option<Number> {
        event.world().entity(*target, |e| Number::from(e.health))
    }

    fn set(&self, event: &Event, target: &EntityId, value: Number) -> bool {
        event
            .world()
            .entity_mut(*target, |e| e.health = value.as_f64())
            .is_some()
    }

    fn bounds(&self, event: &Event, target: &EntityId) -> Bounds {
        let max = event
            .world()
            .entity(*target, |e| e.max_health)
            .unwrap_or_default();
        Bounds::between(Number::Int(0), Number::from(max))
    }

    fn reset_value(&self, event: &Event, target: &EntityId) -> Number {
        event
            .world()
            .entity(*target, |e| Number::from(e.max_health))
            .unwrap_or(Number::Int(0))
    }

    fn describe_quantity(&self) -> String {
        self.describe(None, false)
    }
}

impl Changer for Health {
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
