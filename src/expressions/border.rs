// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::changer::{change_quantity, Bounds, ChangeMode, Changer, DeltaSpec, Quantity};
use crate::diagnostics::Diagnostics;
use crate::event::Event;
use crate::expression::Expression;
use crate::number::Number;
use crate::typing::Type;
use crate::value::Value;

use anyhow::Result;

/// `the world border size`
///
/// Bounded by the world's minimum and maximum border size. Setting a size
/// outside them is rejected with a warning, while `add` and `remove` clamp.
/// `Reset` restores the world's default size. Deleting is not supported.
#[derive(Debug, Default)]
pub struct BorderSize;

impl BorderSize {
    pub fn new() -> Self {
        Self
    }
}

impl Expression for BorderSize {
    fn evaluate(&self, event: &Event) -> Result<Vec<Value>> {
        Ok(vec![Value::from(event.world().border().size)])
    }

    fn return_type(&self) -> Type {
        Type::Number
    }

    fn is_single(&self) -> bool {
        true
    }

    fn describe(&self, _event: Option<&Event>, _verbose: bool) -> String {
        "the world border size".to_string()
    }

    fn changer(&self) -> Option<&dyn Changer> {
        Some(self)
    }
}

impl Quantity for BorderSize {
    type Target = ();

    fn targets(&self, _event: &Event) -> Result<Vec<()>> {
        Ok(vec![()])
    }

    fn get(&self, event: &Event, _target: &()) -> Option<Number> {
        Some(Number::from(event.world().border().size))
    }

    fn set(&self, event: &Event, _target: &(), value: Number) -> bool {
        event.world().set_border_size(value.as_f64());
        true
    }

    fn bounds(&self, event: &Event, _target: &()) -> Bounds {
        let border = event.world().border();
        Bounds::between(Number::from(border.min_size), Number::from(border.max_size))
    }

    fn reset_value(&self, event: &Event, _target: &()) -> Number {
        Number::from(event.world().border().default_size)
    }

    fn reject_out_of_bounds(&self) -> bool {
        true
    }

    fn describe_quantity(&self) -> String {
        self.describe(None, false)
    }
}

impl Changer for BorderSize {
    fn accept_change(&self, mode: ChangeMode) -> Option<DeltaSpec> {
        match mode {
            ChangeMode::Set => Some(DeltaSpec::single(&[Type::Number])),
            ChangeMode::Add | ChangeMode::Remove => Some(DeltaSpec::plural(&[Type::Number])),
            ChangeMode::Reset => Some(DeltaSpec::none()),
            ChangeMode::Delete | ChangeMode::RemoveAll => None,
        }
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
