// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Use README.md as crate documentation.
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

mod binder;
mod changer;
mod converters;
mod diagnostics;
mod effects;
mod engine;
mod event;
mod expression;
pub mod expressions;
mod fold;
mod globals;
mod keyed;
mod number;
pub mod registry;
mod time;
mod typing;
mod value;
mod world;

pub(crate) use std::rc::Rc;

pub use binder::{BindError, BindErrorKind, BindScope, Binder, DelayState, Location};
pub use changer::{
    change_in_place, change_list, change_quantity, collection_modes, quantity_modes, Bounds,
    ChangeMode, Changer, DeltaSpec, Quantity,
};
pub use converters::{Converted, Converter, DefaultConverters};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use effects::{ChangeEffect, Effect, SpawnEffect, Trigger};
pub use engine::{Engine, EngineOptions};
pub use event::{EvalError, Event, Snapshot};
pub use expression::{expr, ExprRef, Expression, NodeRef, Ref};
pub use fold::{fold, Constant, ConstantFolder};
pub use globals::{Globals, LastSpawned, Variables};
pub use keyed::{
    loop_bindings, unzip, with_positional_keys, zip, Key, KeyedEntry, KeyedValue, KeyedView,
    LoopIndex, KEY_SEPARATOR,
};
pub use number::Number;
pub use time::{TimeSensitive, TimeState, Timed};
pub use typing::Type;
pub use value::Value;
pub use world::{EntityData, EntityId, EntityKind, ItemStack, SlotRef, World, WorldBorder};
