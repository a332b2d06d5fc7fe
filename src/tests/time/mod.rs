// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use super::common::*;
use crate::expressions::*;
use crate::*;

use anyhow::Result;

fn level_change_event(world: &World, player: EntityId, from: i64, to: i64) -> Event {
    Event::new("level change", world.clone())
        .with_value("player", Snapshot::present(Value::Entity(player)))
        .with_value(
            "level",
            Snapshot {
                past: Some(Value::from(from)),
                present: Some(Value::from(to)),
                future: Some(Value::from(to)),
            },
        )
}

#[test]
fn future_victim_is_rejected() -> Result<()> {
    let engine = Engine::new();
    let binder = engine.binder(BindScope::new(&["damage"]));
    let victim = binder.event_value("victim")?;

    let err = binder.with_time(&victim, TimeState::Future).unwrap_err();
    assert!(matches!(
        err.kind,
        BindErrorKind::UnsupportedTime {
            time: TimeState::Future,
            ..
        }
    ));
    Ok(())
}

#[test]
fn past_damage() -> Result<()> {
    let engine = Engine::new();
    let binder = engine.binder(BindScope::new(&["damage"]));
    let damage = binder.with_time(&binder.event_value("damage")?, TimeState::Past)?;
    assert_eq!(damage.describe(None, false), "past the damage");

    let event = Event::new("damage", World::new()).with_value(
        "damage",
        Snapshot {
            past: Some(Value::from(6)),
            present: Some(Value::from(4)),
            future: None,
        },
    );
    assert_eq!(damage.evaluate(&event)?, vec![Value::from(6)]);
    assert_eq!(binder.event_value("damage")?.evaluate(&event)?, vec![Value::from(4)]);
    Ok(())
}

#[test]
fn level_states_in_level_change_event() -> Result<()> {
    let engine = Engine::new();
    let binder = engine.binder(BindScope::new(&["level change"]));
    let level = expr(Level::new(binder.default_expression(Type::Player)?));
    let past = binder.with_time(&level, TimeState::Past)?;
    let future = binder.with_time(&level, TimeState::Future)?;

    // The world still holds the old level while the event is being handled.
    let (world, player) = world_with_player("alex", 3);
    let event = level_change_event(&world, player, 3, 5);

    assert_eq!(numbers(&past, &event)?, vec![Number::Int(3)]);
    assert_eq!(numbers(&level, &event)?, vec![Number::Int(5)]);
    assert_eq!(numbers(&future, &event)?, vec![Number::Int(5)]);
    Ok(())
}

#[test]
fn level_states_outside_level_change_event() -> Result<()> {
    let engine = Engine::new();
    let binder = engine.binder(BindScope::new(&["join"]));
    let level = expr(Level::new(binder.default_expression(Type::Player)?));
    for time in [TimeState::Past, TimeState::Future] {
        let err = binder.with_time(&level, time).unwrap_err();
        assert!(matches!(err.kind, BindErrorKind::UnsupportedTime { .. }));
    }
    Ok(())
}

#[test]
fn other_players_read_the_world() -> Result<()> {
    let engine = Engine::new();
    let binder = engine.binder(BindScope::new(&["level change"]));
    let (world, player) = world_with_player("alex", 3);
    let mut other = EntityData::new(EntityKind::Player, "sam");
    other.level = 42;
    let other = world.spawn(other);

    let both = expr(ExpressionList::new(
        vec![
            binder.default_expression(Type::Player)?,
            Constant::literal(Value::Entity(other)),
        ],
        true,
    ));
    let past = binder.with_time(&expr(Level::new(both)), TimeState::Past)?;
    let event = level_change_event(&world, player, 3, 5);

    assert_eq!(numbers(&past, &event)?, vec![Number::Int(3), Number::Int(42)]);
    Ok(())
}

#[test]
fn projections_are_read_only() -> Result<()> {
    let engine = Engine::new();
    let binder = engine.binder(BindScope::new(&["level change"]));
    let level = expr(Level::new(binder.default_expression(Type::Player)?));
    let past = binder.with_time(&level, TimeState::Past)?;

    assert!(past.changer().is_none());
    let err = binder
        .bind_change(&past, ChangeMode::Set, Some(Constant::literal(1)))
        .unwrap_err();
    assert!(matches!(err.kind, BindErrorKind::NotChangeable { .. }));
    Ok(())
}

#[test]
fn stale_event_values_are_empty() -> Result<()> {
    let engine = Engine::new();
    let binder = engine.binder(BindScope::new(&["level change"]));
    let player = binder.default_expression(Type::Player)?;
    let level = expr(Level::new(player.clone()));

    let (world, id) = world_with_player("alex", 3);
    let event = level_change_event(&world, id, 3, 5);
    assert_eq!(player.evaluate(&event)?, vec![Value::Entity(id)]);

    event.mark_stale();
    assert!(player.evaluate(&event)?.is_empty());
    assert!(level.evaluate(&event)?.is_empty());
    // Staleness is not an error.
    event.ensure_valid()?;
    Ok(())
}
