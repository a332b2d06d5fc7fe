// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::describe_property;
use crate::changer::{change_quantity, Bounds, ChangeMode, Changer, DeltaSpec, Quantity};
use crate::diagnostics::Diagnostics;
use crate::event::Event;
use crate::expression::{expr, ExprRef, Expression};
use crate::number::Number;
use crate::typing::Type;
use crate::value::Value;
use crate::world::{EntityId, ItemStack, SlotRef, World};

use anyhow::Result;

/// The representations an item amount is stored in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountTarget {
    Slot(SlotRef),
    /// Dropped item entity.
    Dropped(EntityId),
    /// A stack value with no backing storage. Read-only.
    Detached(ItemStack),
}

impl AmountTarget {
    fn of(value: Value) -> Option<Self> {
        match value {
            Value::Slot(slot) => Some(Self::Slot(slot)),
            Value::Entity(id) => Some(Self::Dropped(id)),
            Value::Item(stack) => Some(Self::Detached(stack)),
            _ => None,
        }
    }

    fn stack(&self, world: &World) -> Option<ItemStack> {
        match self {
            Self::Slot(slot) => world.slot(*slot),
            Self::Dropped(id) => world.entity(*id, |e| e.stack.clone()).flatten(),
            Self::Detached(stack) => Some(stack.clone()),
        }
    }
}

/// `the item amount of <items/slots/dropped items>`
///
/// Clamped to `[0, max stack size]`; an amount of 0 empties a slot. `Delete`
/// sets 0, `Reset` sets 1. Detached item stacks cannot be changed and are
/// skipped with a warning.
#[derive(Debug)]
pub struct ItemAmount {
    items: ExprRef,
}

impl ItemAmount {
    pub fn new(items: ExprRef) -> Self {
        Self { items }
    }

    fn all_targets(&self, event: &Event) -> Result<Vec<AmountTarget>> {
        Ok(self
            .items
            .evaluate(event)?
            .into_iter()
            .filter_map(AmountTarget::of)
            .collect())
    }
}

impl Expression for ItemAmount {
    fn evaluate(&self, event: &Event) -> Result<Vec<Value>> {
        let world = event.world();
        Ok(self
            .all_targets(event)?
            .iter()
            .filter_map(|t| t.stack(world))
            .map(|s| Value::from(s.amount))
            .collect())
    }

    fn return_type(&self) -> Type {
        Type::Integer
    }

    fn is_single(&self) -> bool {
        self.items.is_single()
    }

    fn describe(&self, event: Option<&Event>, verbose: bool) -> String {
        describe_property("item amount", &self.items, event, verbose)
    }

    fn children(&self) -> Vec<ExprRef> {
        vec![self.items.clone()]
    }

    fn with_children(&self, mut children: Vec<ExprRef>) -> Option<ExprRef> {
        Some(expr(Self::new(children.pop()?)))
    }

    fn changer(&self) -> Option<&dyn Changer> {
        Some(self)
    }
}

impl Quantity for ItemAmount {
    type Target = AmountTarget;

    fn targets(&self, event: &Event) -> Result<Vec<AmountTarget>> {
        Ok(self
            .all_targets(event)?
            .into_iter()
            .filter(|t| !matches!(t, AmountTarget::Detached(_)))
            .collect())
    }

    fn get(&self, event: &Event, target: &AmountTarget) -> Option<Number> {
        target.stack(event.world()).map(|s| Number::Int(s.amount))
    }

    fn set(&self, event: &Event, target: &AmountTarget, value: Number) -> bool {
        let world = event.world();
        let amount = value.to_i64_lossy();
        match target {
            AmountTarget::Slot(slot) => match world.slot(*slot) {
                Some(stack) => world.set_slot(*slot, Some(ItemStack { amount, ..stack })),
                None => false,
            },
            AmountTarget::Dropped(id) => world
                .entity_mut(*id, |e| match e.stack.as_mut() {
                    Some(stack) => {
                        stack.amount = amount;
                        true
                    }
                    None => false,
                })
                .unwrap_or(false),
            AmountTarget::Detached(_) => false,
        }
    }

    fn bounds(&self, event: &Event, target: &AmountTarget) -> Bounds {
        let max = target
            .stack(event.world())
            .map(|s| s.max_stack)
            .unwrap_or(0);
        Bounds::between(Number::Int(0), Number::Int(max))
    }

    fn reset_value(&self, _event: &Event, _target: &AmountTarget) -> Number {
        Number::Int(1)
    }

    fn integral(&self) -> bool {
        true
    }

    fn describe_quantity(&self) -> String {
        self.describe(None, false)
    }
}

impl Changer for ItemAmount {
    fn accept_change(&self, mode: ChangeMode) -> Option<DeltaSpec> {
        match mode {
            ChangeMode::Set | ChangeMode::Add | ChangeMode::Remove => {
                Some(DeltaSpec::single(&[Type::Number]))
            }
            ChangeMode::Delete | ChangeMode::Reset => Some(DeltaSpec::none()),
            ChangeMode::RemoveAll => None,
        }
    }

    fn change(
        &self,
        event: &Event,
        delta: Option<&[Value]>,
        mode: ChangeMode,
        diagnostics: &Diagnostics,
    ) -> Result<()> {
        for target in self.all_targets(event)? {
            if let AmountTarget::Detached(stack) = target {
                diagnostics.warn(
                    &self.describe_quantity(),
                    &format!("the amount of a detached item stack ({}) cannot be changed", Value::Item(stack)),
                );
            }
        }
        change_quantity(self, event, delta, mode, diagnostics)
    }
}
