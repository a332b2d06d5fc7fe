// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)] // test harness asserts and unwraps to validate engine behavior

use super::common::{build, ExprSpec};
use crate::*;

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use serde::Deserialize;
use test_generator::test_resources;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
enum Statement {
    Change {
        mode: ChangeMode,
        target: ExprSpec,
        #[serde(default)]
        delta: Option<ExprSpec>,
    },
    Spawn(EntityData),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntityExpect {
    level: Option<i64>,
    health: Option<f64>,
    tags: Option<Vec<String>>,
    /// Amount per inventory slot, 0 for an empty slot.
    inventory: Option<Vec<i64>>,
    /// Amount of the stack carried by a dropped item.
    stack: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WantResult {
    expr: ExprSpec,
    values: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TestCase {
    note: String,
    #[serde(default)]
    options: Option<EngineOptions>,
    event: String,
    #[serde(default)]
    delay: DelayState,
    #[serde(default)]
    entities: BTreeMap<EntityId, EntityData>,
    #[serde(default)]
    border: Option<WorldBorder>,
    #[serde(default)]
    values: BTreeMap<String, Snapshot>,
    #[serde(default)]
    data: BTreeMap<String, Value>,
    #[serde(default)]
    variables: BTreeMap<String, Vec<(String, Value)>>,
    statements: Vec<Statement>,
    /// Number of times the trigger runs, each time for a fresh event.
    #[serde(default = "default_runs")]
    runs: usize,
    #[serde(default)]
    stale: bool,

    want_error: Option<String>,
    #[serde(default)]
    want_entities: BTreeMap<EntityId, EntityExpect>,
    #[serde(default)]
    want_variables: BTreeMap<String, Vec<(String, Value)>>,
    want_border: Option<f64>,
    #[serde(default)]
    want_data: BTreeMap<String, Value>,
    want_result: Option<WantResult>,
    want_warnings: Option<usize>,
    skip: Option<bool>,
}

fn default_runs() -> usize {
    1
}

#[derive(Debug, Deserialize)]
struct YamlTest {
    cases: Vec<TestCase>,
}

fn bind(engine: &Engine, case: &TestCase) -> Result<Trigger, BindError> {
    let scope = BindScope::new(&[case.event.as_str()]).with_delay(case.delay);
    let mut binder = engine.binder(scope);
    let mut trigger = Trigger::new(&case.note);
    for (i, statement) in case.statements.iter().enumerate() {
        binder.set_location(Location::new("case.sk", i as u32 + 1, 1));
        match statement {
            Statement::Change {
                mode,
                target,
                delta,
            } => {
                let target = build(&binder, target)?;
                let delta = delta.as_ref().map(|d| build(&binder, d)).transpose()?;
                trigger.push(binder.bind_change(&target, *mode, delta)?);
            }
            Statement::Spawn(data) => trigger.push(binder.spawn(data.clone())),
        }
    }
    Ok(trigger)
}

fn new_event(case: &TestCase, world: &World) -> Event {
    let mut event = Event::new(&case.event, world.clone());
    for (name, snapshot) in &case.values {
        event = event.with_value(name, snapshot.clone());
    }
    for (name, value) in &case.data {
        event = event.with_data(name, value.clone());
    }
    event
}

fn check_entities(case: &TestCase, world: &World) -> Result<()> {
    for (id, want) in &case.want_entities {
        let Some(got) = world.entity(*id, |e| e.clone()) else {
            bail!("entity {id} does not exist");
        };
        if let Some(level) = want.level {
            if got.level != level {
                bail!("entity {id}: level {} != {level}", got.level);
            }
        }
        if let Some(health) = want.health {
            if got.health != health {
                bail!("entity {id}: health {} != {health}", got.health);
            }
        }
        if let Some(tags) = &want.tags {
            let got_tags: Vec<&str> = got.tags.iter().map(|t| t.as_ref()).collect();
            if &got_tags != tags {
                bail!("entity {id}: tags {got_tags:?} != {tags:?}");
            }
        }
        if let Some(inventory) = &want.inventory {
            let got_amounts: Vec<i64> = got
                .inventory
                .iter()
                .map(|s| s.as_ref().map_or(0, |s| s.amount))
                .collect();
            if &got_amounts != inventory {
                bail!("entity {id}: inventory {got_amounts:?} != {inventory:?}");
            }
        }
        if let Some(stack) = want.stack {
            let amount = got.stack.as_ref().map_or(0, |s| s.amount);
            if amount != stack {
                bail!("entity {id}: stack {amount} != {stack}");
            }
        }
    }
    Ok(())
}

fn check_variables(case: &TestCase, engine: &Engine) -> Result<()> {
    for (list, want) in &case.want_variables {
        let got: Vec<(String, Value)> = engine
            .globals()
            .variables
            .entries(list)
            .into_iter()
            .map(|kv| (kv.key.to_string(), kv.value))
            .collect();
        if &got != want {
            bail!("{{{list}::*}}: {got:?} != {want:?}");
        }
    }
    Ok(())
}

fn run_case(case: &TestCase) -> Result<()> {
    let engine = Engine::with_options(case.options.clone().unwrap_or_default());
    let world = World::new();
    for (id, data) in &case.entities {
        world.insert(*id, data.clone());
    }
    if let Some(border) = &case.border {
        world.set_border(border.clone());
    }
    for (list, entries) in &case.variables {
        for (key, value) in entries {
            engine.globals().variables.set(list, key, value.clone());
        }
    }

    let trigger = match (bind(&engine, case), &case.want_error) {
        (Ok(_), Some(want)) => bail!("expected bind error containing `{want}`"),
        (Err(e), Some(want)) => {
            let message = e.to_string();
            if !message.contains(want.as_str()) {
                bail!("bind error `{message}` does not contain `{want}`");
            }
            return Ok(());
        }
        (Err(e), None) => bail!("unexpected bind error: {e}"),
        (Ok(trigger), None) => trigger,
    };

    let mut last_event = None;
    for _ in 0..case.runs {
        let event = new_event(case, &world);
        if case.stale {
            event.mark_stale();
        }
        engine.execute(&trigger, &event)?;
        last_event = Some(event);
    }

    check_entities(case, &world)?;
    check_variables(case, &engine)?;

    if let Some(size) = case.want_border {
        if world.border().size != size {
            bail!("border size {} != {size}", world.border().size);
        }
    }
    if let Some(event) = &last_event {
        for (name, want) in &case.want_data {
            let got = event.data(name);
            if got.as_ref() != Some(want) {
                bail!("event data `{name}`: {got:?} != {want:?}");
            }
        }
    }
    if let Some(want) = &case.want_result {
        let binder = engine.binder(BindScope::new(&[case.event.as_str()]));
        let e = build(&binder, &want.expr)?;
        let event = new_event(case, &world);
        let got = e.evaluate(&event)?;
        if got != want.values {
            bail!("{}: {got:?} != {:?}", e.describe(None, false), want.values);
        }
    }
    if let Some(n) = case.want_warnings {
        let got = engine.diagnostics();
        if got.len() != n {
            bail!("expected {n} warnings, got {got:?}");
        }
    }
    Ok(())
}

/// Cases write enum variants as single-key maps (`- change: {...}`) rather
/// than YAML tags.
fn parse_cases(yaml_str: &str) -> Result<YamlTest> {
    let deserializer = serde_yaml::Deserializer::from_str(yaml_str);
    Ok(serde_yaml::with::singleton_map_recursive::deserialize(
        deserializer,
    )?)
}

fn yaml_test_impl(file: &str) -> Result<()> {
    let yaml_str = std::fs::read_to_string(file)?;
    let test = parse_cases(&yaml_str)?;

    println!("running {file}");
    for case in &test.cases {
        print!("case {} ", case.note);
        if case.skip == Some(true) {
            println!("skipped");
            continue;
        }
        if let Err(e) = run_case(case) {
            bail!("case `{}` failed: {e}", case.note);
        }
        println!("passed");
    }
    Ok(())
}

fn yaml_test(file: &str) -> Result<()> {
    match yaml_test_impl(file) {
        Ok(_) => Ok(()),
        Err(e) => {
            // If Err is returned, it doesn't always get printed by cargo test.
            // Therefore, panic with the error.
            panic!("{e}");
        }
    }
}

#[test]
fn cases_parse_from_single_key_maps() -> Result<()> {
    let test = parse_cases(
        r#"
cases:
  - note: add to level
    event: join
    entities:
      1: { kind: player, level: 7 }
    values:
      player: { present: { entity: 1 } }
    statements:
      - change:
          mode: add
          target: { level: { default: player } }
          delta: { literal: 3 }
      - spawn: { kind: mob, name: cow }
    want_entities:
      1: { level: 10 }
"#,
    )?;
    let case = &test.cases[0];
    assert!(matches!(
        &case.statements[0],
        Statement::Change {
            mode: ChangeMode::Add,
            target: ExprSpec::Level(owner),
            delta: Some(ExprSpec::Literal(_)),
        } if matches!(**owner, ExprSpec::Default(Type::Player))
    ));
    assert!(matches!(&case.statements[1], Statement::Spawn(data) if data.kind == EntityKind::Mob));
    run_case(case)
}

#[test]
fn yaml_test_quantities() -> Result<()> {
    yaml_test("tests/scenarios/cases/quantities.yaml")
}

#[test_resources("tests/scenarios/cases/**/*.yaml")]
fn run(path: &str) {
    yaml_test(path).unwrap()
}
