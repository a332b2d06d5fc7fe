// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::value::Value;
use crate::world::{EntityKind, World};

use core::fmt;

use serde::{Deserialize, Serialize};

/// Static type tag of the values an expression produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Type {
    Any,

    Bool,
    Number,
    Integer,
    String,

    Entity,
    LivingEntity,
    Player,

    Item,
    Slot,
}

impl Type {
    /// Immediate supertype, `None` for `Any`.
    pub fn parent(&self) -> Option<Type> {
        match self {
            Type::Any => None,
            Type::Integer => Some(Type::Number),
            Type::Player => Some(Type::LivingEntity),
            Type::LivingEntity => Some(Type::Entity),
            _ => Some(Type::Any),
        }
    }

    pub fn is_subtype_of(&self, other: &Type) -> bool {
        let mut t = Some(*self);
        while let Some(current) = t {
            if current == *other {
                return true;
            }
            t = current.parent();
        }
        false
    }

    /// Most specific type two expressions have in common.
    pub fn common(&self, other: &Type) -> Type {
        let mut t = Some(*self);
        while let Some(current) = t {
            if other.is_subtype_of(&current) {
                return current;
            }
            t = current.parent();
        }
        Type::Any
    }

    /// Runtime type of a value. Entities need the world to tell a player from
    /// a mob; handles to entities that no longer exist fall back to `Entity`.
    pub fn of(value: &Value, world: &World) -> Type {
        match value {
            Value::Bool(_) => Type::Bool,
            Value::Number(n) if n.is_integer() => Type::Integer,
            Value::Number(_) => Type::Number,
            Value::String(_) => Type::String,
            Value::Entity(id) => world
                .entity(*id, |e| match e.kind {
                    EntityKind::Player => Type::Player,
                    EntityKind::Mob => Type::LivingEntity,
                    EntityKind::DroppedItem => Type::Entity,
                })
                .unwrap_or(Type::Entity),
            Value::Item(_) => Type::Item,
            Value::Slot(_) => Type::Slot,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Type::Any => "object",
            Type::Bool => "boolean",
            Type::Number => "number",
            Type::Integer => "integer",
            Type::String => "text",
            Type::Entity => "entity",
            Type::LivingEntity => "living entity",
            Type::Player => "player",
            Type::Item => "item",
            Type::Slot => "slot",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
