// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Statements and triggers.

use crate::changer::{unsupported, ChangeMode};
use crate::diagnostics::Diagnostics;
use crate::event::Event;
use crate::expression::ExprRef;
use crate::globals::LastSpawned;
use crate::world::EntityData;
use crate::*;

use core::fmt;

use anyhow::Result;
use tracing::debug;

/// A statement of a trigger.
pub trait Effect: fmt::Debug {
    /// Runs the statement. Errors are fatal for the trigger.
    fn execute(&self, event: &Event, diagnostics: &Diagnostics) -> Result<()>;

    fn describe(&self, event: Option<&Event>, verbose: bool) -> String;
}

/// A bound assignment such as `add 3 to the level of the player`.
///
/// Only built by the binder, which already checked the mode and the delta
/// against the target.
#[derive(Debug)]
pub struct ChangeEffect {
    target: ExprRef,
    delta: Option<ExprRef>,
    mode: ChangeMode,
}

impl ChangeEffect {
    pub(crate) fn new(target: ExprRef, delta: Option<ExprRef>, mode: ChangeMode) -> Self {
        Self {
            target,
            delta,
            mode,
        }
    }

    pub fn target(&self) -> &ExprRef {
        &self.target
    }

    pub fn delta(&self) -> Option<&ExprRef> {
        self.delta.as_ref()
    }

    pub fn mode(&self) -> ChangeMode {
        self.mode
    }
}

impl Effect for ChangeEffect {
    fn execute(&self, event: &Event, diagnostics: &Diagnostics) -> Result<()> {
        let Some(changer) = self.target.changer() else {
            return Err(unsupported(&self.target.describe(None, false), self.mode));
        };

        let Some(delta) = &self.delta else {
            return changer.change(event, None, self.mode, diagnostics);
        };

        // Keyed sources hand their keys to receivers that keep them.
        if self.mode == ChangeMode::Set && changer.receives_keys() {
            if let Some(source) = delta.keyed() {
                let values = source.keyed_evaluate(event)?;
                if !values.is_empty() {
                    return changer.change_keyed(event, values, self.mode, diagnostics);
                }
            }
        }

        let values = delta.evaluate(event)?;
        if values.is_empty() {
            // Setting to nothing deletes, where deleting is possible.
            if self.mode == ChangeMode::Set && changer.accept_change(ChangeMode::Delete).is_some() {
                return changer.change(event, None, ChangeMode::Delete, diagnostics);
            }
            debug!(target: "hearth::effects", statement = %self.describe(Some(event), false), "no delta, skipped");
            return Ok(());
        }
        changer.change(event, Some(&values), self.mode, diagnostics)
    }

    fn describe(&self, event: Option<&Event>, verbose: bool) -> String {
        let target = self.target.describe(event, verbose);
        let delta = self.delta.as_ref().map(|d| d.describe(event, verbose));
        match (self.mode, delta) {
            (ChangeMode::Set, Some(d)) => format!("set {target} to {d}"),
            (ChangeMode::Add, Some(d)) => format!("add {d} to {target}"),
            (ChangeMode::Remove, Some(d)) => format!("remove {d} from {target}"),
            (ChangeMode::RemoveAll, Some(d)) => format!("remove all {d} from {target}"),
            (mode, _) => format!("{mode} {target}"),
        }
    }
}

/// `spawn <entity>`. Records the new entity as the last spawned one.
#[derive(Debug)]
pub struct SpawnEffect {
    data: EntityData,
    last_spawned: LastSpawned,
}

impl SpawnEffect {
    pub fn new(data: EntityData, last_spawned: LastSpawned) -> Self {
        Self { data, last_spawned }
    }
}

impl Effect for SpawnEffect {
    fn execute(&self, event: &Event, _diagnostics: &Diagnostics) -> Result<()> {
        let id = event.world().spawn(self.data.clone());
        self.last_spawned.set(id);
        Ok(())
    }

    fn describe(&self, _event: Option<&Event>, _verbose: bool) -> String {
        format!("spawn {}", self.data.name)
    }
}

/// Statements run for one event, strictly in order.
#[derive(Debug)]
pub struct Trigger {
    name: Rc<str>,
    statements: Vec<Box<dyn Effect>>,
}

impl Trigger {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            statements: vec![],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn push(&mut self, statement: impl Effect + 'static) {
        self.statements.push(Box::new(statement));
    }

    pub fn with(mut self, statement: impl Effect + 'static) -> Self {
        self.push(statement);
        self
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Runs every statement. Stops at the first fatal error, including an
    /// event that became invalid in between.
    pub fn execute(&self, event: &Event, diagnostics: &Diagnostics) -> Result<()> {
        for statement in &self.statements {
            event.ensure_valid()?;
            statement.execute(event, diagnostics)?;
        }
        Ok(())
    }
}
