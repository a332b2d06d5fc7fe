// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::number::Number;
use crate::world::{EntityId, ItemStack, SlotRef};
use crate::*;

use core::fmt;

use anyhow::{anyhow, Result};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// A value produced or consumed by an expression.
///
/// Domain objects are held as opaque handles (`Entity`, `Slot`); reading or
/// writing what they point at goes through the `World` carried by the event.
/// `Item` is a detached stack, a plain value with no backing storage.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Value {
    Bool(bool),
    Number(Number),
    String(Rc<str>),

    Entity(EntityId),
    Item(ItemStack),
    Slot(SlotRef),
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s.as_ref()),

            // Domain handles are written as single-key objects.
            Value::Entity(id) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("entity", id)?;
                map.end()
            }
            Value::Item(stack) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("item", stack)?;
                map.end()
            }
            Value::Slot(slot) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("slot", slot)?;
                map.end()
            }
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Value::from(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Value::Number(match i64::try_from(v) {
            Ok(i) => Number::Int(i),
            Err(_) => Number::Float(v as f64),
        }))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Value::from(v))
    }

    fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Value::String(s.into()))
    }

    fn visit_string<E>(self, s: String) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Value::String(s.into()))
    }

    fn visit_map<V>(self, mut visitor: V) -> Result<Self::Value, V::Error>
    where
        V: MapAccess<'de>,
    {
        let value = match visitor.next_key::<String>()?.as_deref() {
            Some("entity") => Value::Entity(visitor.next_value()?),
            Some("item") => Value::Item(visitor.next_value()?),
            Some("slot") => Value::Slot(visitor.next_value()?),
            Some(k) => return Err(de::Error::custom(format!("unknown value kind `{k}`"))),
            None => return Err(de::Error::custom("empty object is not a value")),
        };
        if visitor.next_key::<String>()?.is_some() {
            return Err(de::Error::custom("value objects must have exactly one key"));
        }
        Ok(value)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::Entity(id) => write!(f, "entity {id}"),
            Value::Item(stack) => write!(f, "{} {}", stack.amount, stack.material),
            Value::Slot(slot) => write!(f, "slot {} of entity {}", slot.index, slot.holder),
        }
    }
}

impl Value {
    pub fn from_json_str(json: &str) -> Result<Value> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_str(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            _ => Err(anyhow!("not a bool")),
        }
    }

    pub fn as_number(&self) -> Result<&Number> {
        match self {
            Value::Number(n) => Ok(n),
            _ => Err(anyhow!("not a number")),
        }
    }

    pub fn as_string(&self) -> Result<&Rc<str>> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(anyhow!("not a string")),
        }
    }

    pub fn as_entity(&self) -> Result<EntityId> {
        match self {
            Value::Entity(id) => Ok(*id),
            _ => Err(anyhow!("not an entity")),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<Rc<str>> for Value {
    fn from(s: Rc<str>) -> Self {
        Value::String(s)
    }
}

impl From<ItemStack> for Value {
    fn from(stack: ItemStack) -> Self {
        Value::Item(stack)
    }
}

impl From<SlotRef> for Value {
    fn from(slot: SlotRef) -> Self {
        Value::Slot(slot)
    }
}
