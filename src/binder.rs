// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Interface between the script parser and the expression core.
//!
//! The parser hands typed child expressions to a [`Binder`], which performs
//! every static check of the protocol: change mode and delta type
//! negotiation, time state negotiation, keyed access and default event value
//! resolution. Errors carry the source location of the syntax being bound.

mod error;

pub use error::{BindError, BindErrorKind, Location};

use crate::changer::ChangeMode;
use crate::converters::{Converted, Converter};
use crate::effects::{ChangeEffect, SpawnEffect};
use crate::expression::{expr, ExprRef};
use crate::expressions::{
    EventValue, Experience, ExperienceSource, Indices, LastSpawnedEntity, ListVariable,
};
use crate::fold::ConstantFolder;
use crate::globals::Globals;
use crate::registry;
use crate::time::{TimeState, Timed};
use crate::typing::Type;
use crate::world::EntityData;
use crate::*;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Whether the statement being bound can run after its event has passed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DelayState {
    #[default]
    NotDelayed,
    /// Behind a conditional wait.
    MaybeDelayed,
    Delayed,
}

/// What the binder knows about the surroundings of the syntax being bound.
#[derive(Debug, Clone, Default)]
pub struct BindScope {
    /// Event kinds the enclosing trigger listens to.
    pub events: Vec<Rc<str>>,
    pub delay: DelayState,
    pub location: Location,
}

impl BindScope {
    pub fn new(events: &[&str]) -> Self {
        Self {
            events: events.iter().map(|e| Rc::from(*e)).collect(),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: DelayState) -> Self {
        self.delay = delay;
        self
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    fn describe_events(&self) -> String {
        match self.events.as_slice() {
            [] => "this context".to_string(),
            events => {
                let names: Vec<&str> = events.iter().map(|e| e.as_ref()).collect();
                format!("{} events", names.join("/"))
            }
        }
    }
}

/// Binds expressions for one trigger.
#[derive(Debug)]
pub struct Binder {
    scope: BindScope,
    converter: Rc<dyn Converter>,
    globals: Globals,
    fold_constants: bool,
}

impl Binder {
    pub fn new(
        scope: BindScope,
        converter: Rc<dyn Converter>,
        globals: Globals,
        fold_constants: bool,
    ) -> Self {
        Self {
            scope,
            converter,
            globals,
            fold_constants,
        }
    }

    pub fn scope(&self) -> &BindScope {
        &self.scope
    }

    /// Moves to the next statement.
    pub fn set_location(&mut self, location: Location) {
        self.scope.location = location;
    }

    /// Called by the parser when it passes a wait.
    pub fn set_delay(&mut self, delay: DelayState) {
        self.scope.delay = delay;
    }

    fn error(&self, kind: BindErrorKind) -> BindError {
        BindError {
            location: self.scope.location.clone(),
            kind,
        }
    }

    /// Binds `change <target> [to/by <delta>]`.
    ///
    /// Asks the target for the delta it accepts under `mode`, then checks the
    /// static type and plurality of `delta` against it. A delta whose type is
    /// not accepted but convertible is wrapped in a [`Converted`] node.
    pub fn bind_change(
        &self,
        target: &ExprRef,
        mode: ChangeMode,
        delta: Option<ExprRef>,
    ) -> Result<ChangeEffect, BindError> {
        let describe = || target.describe(None, false);
        let Some(changer) = target.changer() else {
            return Err(self.error(BindErrorKind::NotChangeable { target: describe() }));
        };
        let Some(spec) = changer.accept_change(mode) else {
            return Err(self.error(BindErrorKind::UnsupportedChange {
                target: describe(),
                mode,
            }));
        };

        if !spec.requires_delta() {
            if delta.is_some() {
                return Err(self.error(BindErrorKind::DeltaNotExpected {
                    target: describe(),
                    mode,
                }));
            }
            return Ok(ChangeEffect::new(target.clone(), None, mode));
        }

        let Some(delta) = delta else {
            return Err(self.error(BindErrorKind::DeltaMissing {
                target: describe(),
                mode,
            }));
        };
        if !spec.plural && !delta.is_single() {
            return Err(self.error(BindErrorKind::NotSingleDelta {
                target: describe(),
                mode,
                delta: delta.describe(None, false),
            }));
        }

        let found = delta.return_type();
        let delta = if spec.accepts(&found) {
            delta
        } else {
            match spec
                .types
                .iter()
                .find(|t| self.converter.can_convert(found, **t))
            {
                Some(to) => expr(Converted::new(delta, *to, self.converter.clone())),
                None => {
                    let expected: Vec<&str> = spec.types.iter().map(|t| t.name()).collect();
                    return Err(self.error(BindErrorKind::DeltaTypeMismatch {
                        target: describe(),
                        mode,
                        delta: delta.describe(None, false),
                        found,
                        expected: expected.join(" or "),
                    }));
                }
            }
        };

        Ok(ChangeEffect::new(
            target.clone(),
            Some(self.finish(&delta)),
            mode,
        ))
    }

    /// Pins `target` to a time state. The present state needs no wrapper.
    pub fn with_time(&self, target: &ExprRef, time: TimeState) -> Result<ExprRef, BindError> {
        if time == TimeState::Present {
            return Ok(target.clone());
        }
        if self.scope.delay == DelayState::Delayed {
            return Err(self.error(BindErrorKind::TimeAfterDelay {
                target: target.describe(None, false),
                time,
            }));
        }
        let supported = target
            .timed()
            .is_some_and(|t| t.supports_time(time, &self.scope));
        if !supported {
            return Err(self.error(BindErrorKind::UnsupportedTime {
                target: target.describe(None, false),
                time,
            }));
        }
        debug!(target: "hearth::binder", time = %time, node = %target.describe(None, false), "time state resolved");
        Ok(expr(Timed::new(target.clone(), time)))
    }

    /// Checks that `target` can be used where keys are required.
    pub fn require_keyed(&self, target: &ExprRef) -> Result<ExprRef, BindError> {
        match target.keyed() {
            Some(_) => Ok(target.clone()),
            None => Err(self.error(BindErrorKind::NotKeyed {
                target: target.describe(None, false),
            })),
        }
    }

    /// Binds an event value by name, e.g. `attacker`.
    pub fn event_value(&self, name: &str) -> Result<ExprRef, BindError> {
        let mut infos = vec![];
        for event in &self.scope.events {
            if let Some(info) = registry::lookup(event, name) {
                infos.push((event.clone(), info));
            }
        }
        if infos.is_empty() {
            return Err(self.error(BindErrorKind::NoEventValue {
                name: name.to_string(),
                events: self.scope.describe_events(),
            }));
        }
        Ok(expr(EventValue::new(name, infos)))
    }

    /// Binds a bare type reference such as `the player`.
    ///
    /// Every event value of that type is a candidate. A single candidate is
    /// used as is; among several, exactly one must be the default view.
    pub fn default_expression(&self, ty: Type) -> Result<ExprRef, BindError> {
        let mut names: Vec<&'static str> = vec![];
        for event in &self.scope.events {
            for info in registry::event_values(event) {
                if info.ty.is_subtype_of(&ty) && !names.contains(&info.name) {
                    names.push(info.name);
                }
            }
        }

        let candidates = names
            .iter()
            .map(|name| self.event_value(name))
            .collect::<Result<Vec<_>, _>>()?;
        let describe = |c: &[ExprRef]| {
            c.iter()
                .map(|e| e.describe(None, false))
                .collect::<Vec<_>>()
                .join(", ")
        };

        match candidates.as_slice() {
            [] => Err(self.error(BindErrorKind::NoCandidate {
                ty,
                events: self.scope.describe_events(),
            })),
            [single] => Ok(single.clone()),
            all => {
                let defaults: Vec<ExprRef> = all.iter().filter(|c| c.is_default()).cloned().collect();
                match defaults.as_slice() {
                    [single] => Ok(single.clone()),
                    [] => Err(self.error(BindErrorKind::NoDefault {
                        ty,
                        candidates: describe(all),
                    })),
                    many => Err(self.error(BindErrorKind::AmbiguousDefault {
                        ty,
                        candidates: describe(many),
                    })),
                }
            }
        }
    }

    /// Makes `source` produce values of type `to`.
    pub fn convert(&self, source: &ExprRef, to: Type) -> Result<ExprRef, BindError> {
        let from = source.return_type();
        if from.is_subtype_of(&to) {
            return Ok(source.clone());
        }
        if !self.converter.can_convert(from, to) {
            return Err(self.error(BindErrorKind::ConversionImpossible {
                expr: source.describe(None, false),
                from,
                to,
            }));
        }
        Ok(expr(Converted::new(
            source.clone(),
            to,
            self.converter.clone(),
        )))
    }

    /// `the experience`. Only events that drop experience have one.
    pub fn experience(&self) -> Result<ExprRef, BindError> {
        if !self
            .scope
            .events
            .iter()
            .any(|e| ExperienceSource::of_event(e).is_some())
        {
            return Err(self.error(BindErrorKind::NoEventValue {
                name: "experience".to_string(),
                events: self.scope.describe_events(),
            }));
        }
        Ok(expr(Experience::new()))
    }

    /// `[sorted] indices of <source>`. The source must be keyed.
    pub fn indices(&self, source: &ExprRef, sort: Option<bool>) -> Result<ExprRef, BindError> {
        let source = self.require_keyed(source)?;
        Ok(expr(Indices::new(source, sort)))
    }

    /// `{name::*}`
    pub fn list_variable(&self, name: &str) -> ExprRef {
        expr(ListVariable::new(name, self.globals.variables.clone()))
    }

    /// `last spawned entity`
    pub fn last_spawned(&self) -> ExprRef {
        expr(LastSpawnedEntity::new(self.globals.last_spawned.clone()))
    }

    /// `spawn <entity>`
    pub fn spawn(&self, data: EntityData) -> SpawnEffect {
        SpawnEffect::new(data, self.globals.last_spawned.clone())
    }

    /// Last step of binding an expression. Runs the constant folder.
    pub fn finish(&self, root: &ExprRef) -> ExprRef {
        let mut folder = ConstantFolder::new(self.fold_constants);
        let folded = folder.fold(root);
        if folder.folded() > 0 {
            debug!(target: "hearth::binder", count = folder.folded(), "folded constant subtrees");
        }
        folded
    }
}
