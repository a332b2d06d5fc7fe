// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::event::Event;
use crate::expression::{expr, ExprRef, Expression};
use crate::typing::Type;
use crate::value::Value;
use crate::world::World;
use crate::*;

use core::fmt;

use anyhow::Result;

/// Conversion oracle consulted by the binder when a value of one type is
/// offered where another is expected.
pub trait Converter: fmt::Debug {
    fn can_convert(&self, from: Type, to: Type) -> bool;

    /// `None` if this particular value cannot be converted.
    fn convert(&self, value: &Value, to: Type, world: &World) -> Option<Value>;
}

/// Conversions every host gets unless it installs its own table.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConverters;

impl Converter for DefaultConverters {
    fn can_convert(&self, from: Type, to: Type) -> bool {
        if from.is_subtype_of(&to) {
            return true;
        }
        matches!(
            (from, to),
            (Type::Number | Type::Integer | Type::Bool, Type::String)
                | (Type::Entity | Type::LivingEntity | Type::Player, Type::String)
                | (Type::Slot, Type::Item)
                | (Type::Number, Type::Integer)
                | (Type::Entity, Type::LivingEntity | Type::Player)
                | (Type::LivingEntity, Type::Player)
                | (Type::Any, _)
        )
    }

    fn convert(&self, value: &Value, to: Type, world: &World) -> Option<Value> {
        let from = Type::of(value, world);
        if from.is_subtype_of(&to) {
            return Some(value.clone());
        }
        match (value, to) {
            (Value::Number(n), Type::String) => Some(Value::from(n.format_decimal().as_str())),
            (Value::Bool(b), Type::String) => Some(Value::from(if *b { "true" } else { "false" })),
            (Value::Entity(id), Type::String) => {
                world.entity(*id, |e| Value::String(e.name.clone()))
            }
            (Value::Slot(slot), Type::Item) => world.slot(*slot).map(Value::Item),
            (Value::Number(n), Type::Integer) if n.is_valid() => {
                Some(Value::from(n.to_i64_lossy()))
            }
            // Narrowing entity conversions succeed only when the runtime type
            // already fits, which was checked above.
            _ => None,
        }
    }
}

/// Expression whose values are converted to `to`. Values that fail to convert
/// are dropped.
#[derive(Debug)]
pub struct Converted {
    inner: ExprRef,
    to: Type,
    converter: Rc<dyn Converter>,
}

impl Converted {
    pub fn new(inner: ExprRef, to: Type, converter: Rc<dyn Converter>) -> Self {
        Self {
            inner,
            to,
            converter,
        }
    }
}

impl Expression for Converted {
    fn evaluate(&self, event: &Event) -> Result<Vec<Value>> {
        let world = event.world();
        Ok(self
            .inner
            .evaluate(event)?
            .iter()
            .filter_map(|v| self.converter.convert(v, self.to, world))
            .collect())
    }

    fn return_type(&self) -> Type {
        self.to
    }

    fn is_single(&self) -> bool {
        self.inner.is_single()
    }

    fn is_and(&self) -> bool {
        self.inner.is_and()
    }

    // Entity and slot conversions read the world.
    fn is_pure(&self) -> bool {
        !matches!(
            self.inner.return_type(),
            Type::Any | Type::Entity | Type::LivingEntity | Type::Player | Type::Slot
        )
    }

    fn describe(&self, event: Option<&Event>, verbose: bool) -> String {
        if verbose {
            format!("{} (as {})", self.inner.describe(event, verbose), self.to)
        } else {
            self.inner.describe(event, verbose)
        }
    }

    fn children(&self) -> Vec<ExprRef> {
        vec![self.inner.clone()]
    }

    fn with_children(&self, mut children: Vec<ExprRef>) -> Option<ExprRef> {
        let inner = children.pop()?;
        Some(expr(Self {
            inner,
            to: self.to,
            converter: self.converter.clone(),
        }))
    }
}
