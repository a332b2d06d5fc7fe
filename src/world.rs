// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-memory stand-in for the simulated world.
//!
//! The real world model belongs to the host. Expressions only need typed
//! accessors and mutators per concept, which is all this module offers. Bounds
//! are reported here but clamping is left to the expressions.

use crate::*;

use core::cell::RefCell;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type EntityId = u64;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStack {
    pub material: Rc<str>,
    pub amount: i64,
    #[serde(default = "default_max_stack")]
    pub max_stack: i64,
}

fn default_max_stack() -> i64 {
    64
}

impl ItemStack {
    pub fn new(material: &str, amount: i64) -> Self {
        Self {
            material: material.into(),
            amount,
            max_stack: default_max_stack(),
        }
    }
}

/// Inventory slot of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotRef {
    pub holder: EntityId,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Player,
    Mob,
    DroppedItem,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityData {
    pub kind: EntityKind,
    #[serde(default = "default_name")]
    pub name: Rc<str>,
    #[serde(default = "default_health")]
    pub health: f64,
    #[serde(default = "default_health")]
    pub max_health: f64,
    #[serde(default)]
    pub level: i64,
    #[serde(default)]
    pub tags: Vec<Rc<str>>,
    #[serde(default)]
    pub inventory: Vec<Option<ItemStack>>,
    /// Stack carried by a dropped item entity.
    #[serde(default)]
    pub stack: Option<ItemStack>,
    #[serde(default = "default_valid")]
    pub valid: bool,
}

fn default_name() -> Rc<str> {
    "".into()
}

fn default_health() -> f64 {
    20.0
}

fn default_valid() -> bool {
    true
}

impl EntityData {
    pub fn new(kind: EntityKind, name: &str) -> Self {
        Self {
            kind,
            name: name.into(),
            health: default_health(),
            max_health: default_health(),
            level: 0,
            tags: vec![],
            inventory: vec![],
            stack: None,
            valid: true,
        }
    }

    pub fn is_living(&self) -> bool {
        !matches!(self.kind, EntityKind::DroppedItem)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldBorder {
    pub size: f64,
    pub default_size: f64,
    pub min_size: f64,
    pub max_size: f64,
}

impl Default for WorldBorder {
    fn default() -> Self {
        Self {
            size: 60_000_000.0,
            default_size: 60_000_000.0,
            min_size: 1.0,
            max_size: 60_000_000.0,
        }
    }
}

#[derive(Debug, Default)]
struct WorldData {
    entities: BTreeMap<EntityId, EntityData>,
    border: WorldBorder,
    next_id: EntityId,
}

/// Shared handle to the world. Cloning the handle does not clone the world.
#[derive(Debug, Clone, Default)]
pub struct World {
    inner: Rc<RefCell<WorldData>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&self, data: EntityData) -> EntityId {
        let mut world = self.inner.borrow_mut();
        world.next_id += 1;
        let id = world.next_id;
        world.entities.insert(id, data);
        id
    }

    /// Places an entity under a caller-chosen id, replacing any previous one.
    pub fn insert(&self, id: EntityId, data: EntityData) {
        let mut world = self.inner.borrow_mut();
        world.next_id = world.next_id.max(id);
        world.entities.insert(id, data);
    }

    /// Marks an entity as no longer valid. Handles to it keep existing but
    /// every accessor treats it as absent.
    pub fn invalidate(&self, id: EntityId) {
        if let Some(e) = self.inner.borrow_mut().entities.get_mut(&id) {
            e.valid = false;
        }
    }

    pub fn entity<R>(&self, id: EntityId, f: impl FnOnce(&EntityData) -> R) -> Option<R> {
        let world = self.inner.borrow();
        match world.entities.get(&id) {
            Some(e) if e.valid => Some(f(e)),
            _ => None,
        }
    }

    pub fn entity_mut<R>(&self, id: EntityId, f: impl FnOnce(&mut EntityData) -> R) -> Option<R> {
        let mut world = self.inner.borrow_mut();
        match world.entities.get_mut(&id) {
            Some(e) if e.valid => Some(f(e)),
            _ => None,
        }
    }

    pub fn slot(&self, slot: SlotRef) -> Option<ItemStack> {
        self.entity(slot.holder, |e| e.inventory.get(slot.index).cloned().flatten())
            .flatten()
    }

    /// Writes a slot. An amount of zero empties the slot.
    pub fn set_slot(&self, slot: SlotRef, stack: Option<ItemStack>) -> bool {
        self.entity_mut(slot.holder, |e| match e.inventory.get_mut(slot.index) {
            Some(s) => {
                *s = stack.filter(|st| st.amount > 0);
                true
            }
            None => false,
        })
        .unwrap_or(false)
    }

    pub fn border(&self) -> WorldBorder {
        self.inner.borrow().border.clone()
    }

    pub fn set_border(&self, border: WorldBorder) {
        self.inner.borrow_mut().border = border;
    }

    pub fn set_border_size(&self, size: f64) {
        self.inner.borrow_mut().border.size = size;
    }
}
