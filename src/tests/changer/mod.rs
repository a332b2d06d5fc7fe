// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use super::common::*;
use crate::expressions::*;
use crate::*;

use anyhow::Result;

fn level_of_player(engine: &Engine) -> Result<ExprRef> {
    let binder = engine.binder(BindScope::new(&["join"]));
    Ok(expr(Level::new(binder.default_expression(Type::Player)?)))
}

#[test]
fn add_to_level() -> Result<()> {
    let engine = Engine::new();
    let (world, player) = world_with_player("alex", 7);
    let level = level_of_player(&engine)?;
    let event = join_event(&world, player);

    level
        .changer()
        .unwrap()
        .change(&event, Some(&[Value::from(3)]), ChangeMode::Add, &Diagnostics::new())?;

    assert_eq!(numbers(&level, &event)?, vec![Number::Int(10)]);
    Ok(())
}

#[test]
fn remove_clamps_at_lower_bound() -> Result<()> {
    let engine = Engine::new();
    let (world, player) = world_with_player("alex", 5);
    let level = level_of_player(&engine)?;
    let event = join_event(&world, player);

    level
        .changer()
        .unwrap()
        .change(&event, Some(&[Value::from(20)]), ChangeMode::Remove, &Diagnostics::new())?;

    assert_eq!(world.entity(player, |e| e.level), Some(0));
    Ok(())
}

#[test]
fn add_sums_plural_delta() -> Result<()> {
    let engine = Engine::new();
    let (world, player) = world_with_player("alex", 1);
    let level = level_of_player(&engine)?;
    let event = join_event(&world, player);

    let delta = [Value::from(2), Value::from(3), Value::from(4)];
    level
        .changer()
        .unwrap()
        .change(&event, Some(&delta), ChangeMode::Add, &Diagnostics::new())?;

    assert_eq!(world.entity(player, |e| e.level), Some(10));
    Ok(())
}

#[test]
fn fractional_delta_is_truncated_for_integral_quantities() -> Result<()> {
    let engine = Engine::new();
    let (world, player) = world_with_player("alex", 1);
    let level = level_of_player(&engine)?;
    let event = join_event(&world, player);

    level
        .changer()
        .unwrap()
        .change(&event, Some(&[Value::from(2.9)]), ChangeMode::Add, &Diagnostics::new())?;

    assert_eq!(world.entity(player, |e| e.level), Some(3));
    Ok(())
}

#[test]
fn invalid_delta_elements_are_skipped_with_a_warning() -> Result<()> {
    let engine = Engine::new();
    let (world, player) = world_with_player("alex", 1);
    let level = level_of_player(&engine)?;
    let event = join_event(&world, player);
    let diagnostics = Diagnostics::new();

    let delta = [Value::from(f64::NAN), Value::from("x"), Value::from(4)];
    level
        .changer()
        .unwrap()
        .change(&event, Some(&delta), ChangeMode::Add, &diagnostics)?;

    assert_eq!(world.entity(player, |e| e.level), Some(5));
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics.items().iter().all(|d| d.severity == Severity::Warning));
    Ok(())
}

#[test]
fn all_invalid_delta_changes_nothing() -> Result<()> {
    let engine = Engine::new();
    let (world, player) = world_with_player("alex", 4);
    let level = level_of_player(&engine)?;
    let event = join_event(&world, player);
    let diagnostics = Diagnostics::new();

    level.changer().unwrap().change(
        &event,
        Some(&[Value::from(f64::INFINITY)]),
        ChangeMode::Set,
        &diagnostics,
    )?;

    assert_eq!(world.entity(player, |e| e.level), Some(4));
    assert_eq!(diagnostics.len(), 1);
    Ok(())
}

#[test]
fn reset_and_delete_need_no_delta() -> Result<()> {
    let world = World::new();
    let mut data = EntityData::new(EntityKind::Mob, "zombie");
    data.health = 3.0;
    data.max_health = 40.0;
    let zombie = world.spawn(data);

    let event = Event::new("damage", world.clone())
        .with_value("victim", Snapshot::present(Value::Entity(zombie)));
    let engine = Engine::new();
    let binder = engine.binder(BindScope::new(&["damage"]));
    let health = expr(Health::new(binder.event_value("victim")?));
    let changer = health.changer().unwrap();

    assert_eq!(changer.accept_change(ChangeMode::Reset), Some(DeltaSpec::none()));
    changer.change(&event, None, ChangeMode::Reset, &Diagnostics::new())?;
    assert_eq!(numbers(&health, &event)?, vec![Number::Int(40)]);

    changer.change(&event, None, ChangeMode::Delete, &Diagnostics::new())?;
    assert_eq!(numbers(&health, &event)?, vec![Number::Int(0)]);
    Ok(())
}

#[test]
fn set_clamps_to_upper_bound() -> Result<()> {
    let world = World::new();
    let zombie = world.spawn(EntityData::new(EntityKind::Mob, "zombie"));
    let event = Event::new("spawn", world.clone())
        .with_value("entity", Snapshot::present(Value::Entity(zombie)));
    let engine = Engine::new();
    let binder = engine.binder(BindScope::new(&["spawn"]));
    let health = expr(Health::new(binder.event_value("entity")?));

    health
        .changer()
        .unwrap()
        .change(&event, Some(&[Value::from(500)]), ChangeMode::Set, &Diagnostics::new())?;

    assert_eq!(world.entity(zombie, |e| e.health), Some(20.0));
    Ok(())
}

#[test]
fn quantity_modes_table() {
    let types = [Type::Number];
    assert_eq!(
        quantity_modes(ChangeMode::Set, &types),
        Some(DeltaSpec::single(&types))
    );
    assert_eq!(
        quantity_modes(ChangeMode::Add, &types),
        Some(DeltaSpec::plural(&types))
    );
    assert_eq!(quantity_modes(ChangeMode::Delete, &types), Some(DeltaSpec::none()));
    assert_eq!(quantity_modes(ChangeMode::RemoveAll, &types), None);
    assert!(!DeltaSpec::none().requires_delta());
    assert!(DeltaSpec::single(&types).accepts(&Type::Integer));
    assert!(!DeltaSpec::single(&types).accepts(&Type::String));
}

#[test]
fn remove_drops_one_occurrence_and_remove_all_every_occurrence() {
    let mut items = vec!["a", "b", "a", "c", "a"];
    change_list(&mut items, &["a"], ChangeMode::Remove, Vec::new);
    assert_eq!(items, vec!["b", "a", "c", "a"]);

    change_list(&mut items, &["a"], ChangeMode::RemoveAll, Vec::new);
    assert_eq!(items, vec!["b", "c"]);

    change_list(&mut items, &["d"], ChangeMode::Add, Vec::new);
    assert_eq!(items, vec!["b", "c", "d"]);

    change_list(&mut items, &[], ChangeMode::Reset, || vec!["z"]);
    assert_eq!(items, vec!["z"]);

    change_list(&mut items, &[], ChangeMode::Delete, Vec::new);
    assert!(items.is_empty());
}

#[test]
fn bounds() {
    let b = Bounds::between(Number::Int(0), Number::Int(10));
    assert!(b.contains(&Number::Int(10)));
    assert!(!b.contains(&Number::Int(11)));
    assert_eq!(b.clamp(Number::Int(-3)), Number::Int(0));
    assert_eq!(b.clamp(Number::from(12.5)), Number::Int(10));
    assert_eq!(Bounds::unbounded().clamp(Number::Int(-3)), Number::Int(-3));
    assert_eq!(
        Bounds::at_least(Number::Int(1)).clamp(Number::Int(0)),
        Number::Int(1)
    );
}

#[test]
fn change_in_place_applies_function_to_current_values() -> Result<()> {
    let engine = Engine::new();
    let (world, player) = world_with_player("alex", 6);
    let level = level_of_player(&engine)?;
    let event = join_event(&world, player);

    change_in_place(
        &level,
        &event,
        &|v| v.as_number().ok().map(|n| Value::from(n.mul(&Number::Int(2)))),
        &Diagnostics::new(),
    )?;

    assert_eq!(world.entity(player, |e| e.level), Some(12));
    Ok(())
}

#[test]
fn change_on_node_without_changer_is_fatal() -> Result<()> {
    let literal = Constant::literal(1);
    let err = change_in_place(
        &literal,
        &Event::constant(),
        &|v| Some(v.clone()),
        &Diagnostics::new(),
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EvalError>(),
        Some(EvalError::UnsupportedChange { .. })
    ));
    Ok(())
}
