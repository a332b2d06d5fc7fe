// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Concrete expressions.

mod arithmetic;
mod border;
mod event_value;
mod experience;
mod health;
mod item_amount;
mod last_spawned;
mod level;
mod list;
mod tags;
mod transforms;
mod variable;

pub use arithmetic::{ArithOp, Arithmetic};
pub use border::BorderSize;
pub use event_value::EventValue;
pub use experience::{Experience, ExperienceSource};
pub use health::Health;
pub use item_amount::ItemAmount;
pub use last_spawned::LastSpawnedEntity;
pub use level::Level;
pub use list::ExpressionList;
pub use tags::ScoreboardTags;
pub use transforms::{compare_values, FilterFn, Filtered, Indices, Recursive, Reversed, Sorted};
pub use variable::ListVariable;

use crate::event::Event;
use crate::expression::ExprRef;
use crate::value::Value;
use crate::world::EntityId;

use anyhow::Result;

/// Entity handles among the values of `owner`. Other values are ignored.
pub(crate) fn entity_ids(owner: &ExprRef, event: &Event) -> Result<Vec<EntityId>> {
    Ok(owner
        .evaluate(event)?
        .into_iter()
        .filter_map(|v| match v {
            Value::Entity(id) => Some(id),
            _ => None,
        })
        .collect())
}

/// `the <property> of <owner>`
pub(crate) fn describe_property(
    property: &str,
    owner: &ExprRef,
    event: Option<&Event>,
    verbose: bool,
) -> String {
    format!("the {property} of {}", owner.describe(event, verbose))
}
