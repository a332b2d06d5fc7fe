// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use super::common::*;
use crate::expressions::*;
use crate::*;

use anyhow::Result;

fn add(lhs: ExprRef, rhs: ExprRef) -> ExprRef {
    expr(Arithmetic::new(ArithOp::Add, lhs, rhs))
}

#[test]
fn constant_arithmetic_is_folded_once() -> Result<()> {
    let sum = add(Constant::literal(2), Constant::literal(3));
    let mut folder = ConstantFolder::new(true);
    let folded = folder.fold(&sum);

    assert_eq!(folder.folded(), 1);
    let constant = folded.as_constant().unwrap();
    assert_eq!(constant.values(), &[Value::from(5)]);
    assert_eq!(folded.return_type(), Type::Integer);
    assert!(folded.is_single());
    assert_eq!(folded.describe(None, false), "2 + 3");

    // The same node serves every event without re-evaluating the subtree.
    for i in 0..10 {
        let (world, player) = world_with_player(&format!("p{i}"), i);
        let event = join_event(&world, player);
        assert_eq!(folded.evaluate(&event)?, vec![Value::from(5)]);
    }
    Ok(())
}

#[test]
fn nested_constants_fold_bottom_up() {
    // (1 + 2) * (3 + 4)
    let product = expr(Arithmetic::new(
        ArithOp::Mul,
        add(Constant::literal(1), Constant::literal(2)),
        add(Constant::literal(3), Constant::literal(4)),
    ));
    let mut folder = ConstantFolder::new(true);
    let folded = folder.fold(&product);

    assert_eq!(folder.folded(), 3);
    assert_eq!(folded.as_constant().unwrap().values(), &[Value::from(21)]);
}

#[test]
fn event_dependent_subtrees_are_kept() -> Result<()> {
    let engine = Engine::new();
    let binder = engine.binder(BindScope::new(&["join"]));
    let level = expr(Level::new(binder.default_expression(Type::Player)?));

    // level + (2 + 3)
    let tree = add(level, add(Constant::literal(2), Constant::literal(3)));
    let mut folder = ConstantFolder::new(true);
    let folded = folder.fold(&tree);

    assert_eq!(folder.folded(), 1);
    assert!(folded.as_constant().is_none());
    let children = folded.children();
    assert!(children[0].as_constant().is_none());
    assert_eq!(children[1].as_constant().unwrap().values(), &[Value::from(5)]);

    let (world, player) = world_with_player("alex", 10);
    assert_eq!(numbers(&folded, &join_event(&world, player))?, vec![Number::Int(15)]);
    Ok(())
}

#[test]
fn unchanged_tree_keeps_identity() -> Result<()> {
    let engine = Engine::new();
    let binder = engine.binder(BindScope::new(&["join"]));
    let level = expr(Level::new(binder.default_expression(Type::Player)?));

    let folded = fold(&level);
    assert!(folded == level);
    Ok(())
}

#[test]
fn disabled_folder_returns_input() {
    let sum = add(Constant::literal(2), Constant::literal(3));
    let mut folder = ConstantFolder::new(false);
    let folded = folder.fold(&sum);
    assert!(folded == sum);
    assert_eq!(folder.folded(), 0);
}

#[test]
fn engine_option_controls_folding() -> Result<()> {
    let engine = Engine::with_options(EngineOptions {
        fold_constants: false,
        ..EngineOptions::default()
    });
    let binder = engine.binder(BindScope::new(&["join"]));
    let sum = add(Constant::literal(2), Constant::literal(3));
    assert!(binder.finish(&sum).as_constant().is_none());

    let binder = Engine::new().binder(BindScope::new(&["join"]));
    assert!(binder.finish(&sum).as_constant().is_some());
    Ok(())
}

#[test]
fn division_by_zero_folds_to_nothing() {
    let quotient = expr(Arithmetic::new(
        ArithOp::Div,
        Constant::literal(1),
        Constant::literal(0),
    ));
    let folded = fold(&quotient);
    assert!(folded.as_constant().unwrap().values().is_empty());
}

#[test]
fn folded_keyed_constants_keep_keys() -> Result<()> {
    let list = Constant::list(vec![Value::from(3), Value::from(1), Value::from(2)], true);
    let sorted = fold(&expr(Sorted::new(list, true)));
    let constant = sorted.as_constant().unwrap();
    assert_eq!(
        constant.values(),
        &[Value::from(3), Value::from(2), Value::from(1)]
    );

    let keyed = sorted.keyed().unwrap().keyed_evaluate(&Event::constant())?;
    let keys: Vec<&str> = keyed.iter().map(|kv| kv.key.as_ref()).collect();
    assert_eq!(keys, vec!["1", "3", "2"]);
    Ok(())
}

#[test]
fn folded_trees_evaluate_like_the_originals() -> Result<()> {
    let engine = Engine::new();
    let binder = engine.binder(BindScope::new(&["join"]));
    let level = expr(Level::new(binder.default_expression(Type::Player)?));
    let numbers = Constant::list(vec![Value::from(3), Value::from(1), Value::from(2)], true);
    let trees = [
        expr(Arithmetic::new(
            ArithOp::Mul,
            add(Constant::literal(1), Constant::literal(2)),
            add(Constant::literal(3), Constant::literal(4)),
        )),
        expr(Sorted::new(numbers.clone(), true)),
        expr(Reversed::new(numbers.clone())),
        expr(Recursive::new(numbers)),
        expr(ExpressionList::new(
            vec![Constant::literal(1), Constant::literal(2)],
            false,
        )),
        expr(Arithmetic::new(ArithOp::Div, Constant::literal(1), Constant::literal(0))),
        binder.convert(&Constant::literal(42), Type::String)?,
        add(level, add(Constant::literal(2), Constant::literal(3))),
    ];
    for tree in trees {
        let folded = fold(&tree);
        assert_eq!(folded.is_single(), tree.is_single());
        for i in 0..10 {
            let (world, player) = world_with_player(&format!("p{i}"), i);
            let event = join_event(&world, player);
            assert_eq!(
                folded.evaluate(&event)?,
                tree.evaluate(&event)?,
                "{}",
                tree.describe(None, false)
            );
        }
    }
    Ok(())
}

#[test]
fn folded_constants_keep_plurality() {
    let one = Constant::list(vec![Value::from(4)], true);
    let folded = fold(&expr(Reversed::new(one)));
    assert_eq!(folded.as_constant().unwrap().values(), &[Value::from(4)]);
    assert!(!folded.is_single());

    let negated = fold(&expr(Arithmetic::new(
        ArithOp::Sub,
        Constant::literal(0),
        Constant::literal(4),
    )));
    assert!(negated.is_single());
    assert!(Constant::literal(4).is_single());
    assert!(!Constant::list(vec![], true).is_single());
}
