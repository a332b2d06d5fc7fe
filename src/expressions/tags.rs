// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{describe_property, entity_ids};
use crate::changer::{change_list, collection_modes, ChangeMode, Changer, DeltaSpec};
use crate::diagnostics::Diagnostics;
use crate::event::Event;
use crate::expression::{expr, ExprRef, Expression};
use crate::typing::Type;
use crate::value::Value;
use crate::*;

use anyhow::Result;

/// `the scoreboard tags of <entities>`
///
/// A tag list may hold the same tag more than once. `Remove` takes away one
/// occurrence per given tag, `Remove all` every occurrence. `Delete` and
/// `Reset` leave no tags.
#[derive(Debug)]
pub struct ScoreboardTags {
    entities: ExprRef,
}

impl ScoreboardTags {
    pub fn new(entities: ExprRef) -> Self {
        Self { entities }
    }
}

impl Expression for ScoreboardTags {
    fn evaluate(&self, event: &Event) -> Result<Vec<Value>> {
        let world = event.world();
        let mut tags = vec![];
        for id in entity_ids(&self.entities, event)? {
            world.entity(id, |e| {
                tags.extend(e.tags.iter().map(|t| Value::String(t.clone())))
            });
        }
        Ok(tags)
    }

    fn return_type(&self) -> Type {
        Type::String
    }

    fn is_single(&self) -> bool {
        false
    }

    fn describe(&self, event: Option<&Event>, verbose: bool) -> String {
        describe_property("scoreboard tags", &self.entities, event, verbose)
    }

    fn children(&self) -> Vec<ExprRef> {
        vec![self.entities.clone()]
    }

    fn with_children(&self, mut children: Vec<ExprRef>) -> Option<ExprRef> {
        Some(expr(Self::new(children.pop()?)))
    }

    fn changer(&self) -> Option<&dyn Changer> {
        Some(self)
    }
}

impl Changer for ScoreboardTags {
    fn accept_change(&self, mode: ChangeMode) -> Option<DeltaSpec> {
        collection_modes(mode, &[Type::String])
    }

    fn change(
        &self,
        event: &Event,
        delta: Option<&[Value]>,
        mode: ChangeMode,
        diagnostics: &Diagnostics,
    ) -> Result<()> {
        let mut tags: Vec<Rc<str>> = vec![];
        for v in delta.unwrap_or_default() {
            match v {
                Value::String(s) if !s.is_empty() => tags.push(s.clone()),
                _ => diagnostics.warn(
                    &self.describe(None, false),
                    &format!("`{v}` is not a valid scoreboard tag"),
                ),
            }
        }
        if tags.is_empty() && delta.is_some_and(|d| !d.is_empty()) {
            return Ok(());
        }
        let world = event.world();
        for id in entity_ids(&self.entities, event)? {
            world.entity_mut(id, |e| change_list(&mut e.tags, &tags, mode, Vec::new));
        }
        Ok(())
    }
}
