// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Shared fixtures and the expression tree encoding used by YAML cases.

use crate::expressions::*;
use crate::*;

use anyhow::Result;
use serde::Deserialize;

/// Expression tree as written in test cases, e.g.
///
/// ```yaml
/// level:
///   default: player
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum ExprSpec {
    Literal(Value),
    List {
        values: Vec<Value>,
        #[serde(default = "default_and")]
        and: bool,
    },
    Items {
        items: Vec<ExprSpec>,
        #[serde(default = "default_and")]
        and: bool,
    },
    EventValue(String),
    Default(Type),
    Past(Box<ExprSpec>),
    Future(Box<ExprSpec>),
    Level(Box<ExprSpec>),
    Health(Box<ExprSpec>),
    Tags(Box<ExprSpec>),
    ItemAmount(Box<ExprSpec>),
    Experience,
    BorderSize,
    LastSpawned,
    Variable(String),
    Sorted {
        source: Box<ExprSpec>,
        #[serde(default)]
        descending: bool,
    },
    Reversed(Box<ExprSpec>),
    Recursive(Box<ExprSpec>),
    Indices {
        source: Box<ExprSpec>,
        #[serde(default)]
        sort: Option<bool>,
    },
    Arith {
        op: ArithOp,
        lhs: Box<ExprSpec>,
        rhs: Box<ExprSpec>,
    },
    Convert {
        source: Box<ExprSpec>,
        to: Type,
    },
}

fn default_and() -> bool {
    true
}

pub fn build(binder: &Binder, spec: &ExprSpec) -> Result<ExprRef, BindError> {
    let sub = |s: &ExprSpec| build(binder, s);
    Ok(match spec {
        ExprSpec::Literal(v) => Constant::literal(v.clone()),
        ExprSpec::List { values, and } => Constant::list(values.clone(), *and),
        ExprSpec::Items { items, and } => {
            let items = items.iter().map(sub).collect::<Result<Vec<_>, _>>()?;
            expr(ExpressionList::new(items, *and))
        }
        ExprSpec::EventValue(name) => binder.event_value(name)?,
        ExprSpec::Default(ty) => binder.default_expression(*ty)?,
        ExprSpec::Past(inner) => binder.with_time(&sub(inner)?, TimeState::Past)?,
        ExprSpec::Future(inner) => binder.with_time(&sub(inner)?, TimeState::Future)?,
        ExprSpec::Level(owner) => expr(Level::new(sub(owner)?)),
        ExprSpec::Health(owner) => expr(Health::new(sub(owner)?)),
        ExprSpec::Tags(owner) => expr(ScoreboardTags::new(sub(owner)?)),
        ExprSpec::ItemAmount(items) => expr(ItemAmount::new(sub(items)?)),
        ExprSpec::Experience => binder.experience()?,
        ExprSpec::BorderSize => expr(BorderSize::new()),
        ExprSpec::LastSpawned => binder.last_spawned(),
        ExprSpec::Variable(name) => binder.list_variable(name),
        ExprSpec::Sorted { source, descending } => expr(Sorted::new(sub(source)?, *descending)),
        ExprSpec::Reversed(source) => expr(Reversed::new(sub(source)?)),
        ExprSpec::Recursive(source) => expr(Recursive::new(sub(source)?)),
        ExprSpec::Indices { source, sort } => binder.indices(&sub(source)?, *sort)?,
        ExprSpec::Arith { op, lhs, rhs } => {
            binder.finish(&expr(Arithmetic::new(*op, sub(lhs)?, sub(rhs)?)))
        }
        ExprSpec::Convert { source, to } => binder.convert(&sub(source)?, *to)?,
    })
}

/// A world with one player. Returns the world and the player's id.
pub fn world_with_player(name: &str, level: i64) -> (World, EntityId) {
    let world = World::new();
    let mut data = EntityData::new(EntityKind::Player, name);
    data.level = level;
    let id = world.spawn(data);
    (world, id)
}

pub fn join_event(world: &World, player: EntityId) -> Event {
    Event::new("join", world.clone()).with_value("player", Snapshot::present(Value::Entity(player)))
}

/// Evaluates `e` and returns its numbers.
pub fn numbers(e: &ExprRef, event: &Event) -> Result<Vec<Number>> {
    e.evaluate(event)?
        .iter()
        .map(|v| v.as_number().copied())
        .collect()
}

pub fn strings(values: &[Value]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
