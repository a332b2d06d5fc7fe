// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::event::Event;
use crate::expression::Expression;
use crate::globals::LastSpawned;
use crate::typing::Type;
use crate::value::Value;

use anyhow::Result;

/// `the last spawned entity`, read from the shared handle spawn statements
/// write to. Empty if nothing was spawned or the entity is gone.
#[derive(Debug)]
pub struct LastSpawnedEntity {
    handle: LastSpawned,
}

impl LastSpawnedEntity {
    pub fn new(handle: LastSpawned) -> Self {
        Self { handle }
    }
}

impl Expression for LastSpawnedEntity {
    fn evaluate(&self, event: &Event) -> Result<Vec<Value>> {
        let world = event.world();
        Ok(self
            .handle
            .get()
            .filter(|id| world.entity(*id, |_| ()).is_some())
            .map(Value::Entity)
            .into_iter()
            .collect())
    }

    fn return_type(&self) -> Type {
        Type::Entity
    }

    fn is_single(&self) -> bool {
        true
    }

    fn describe(&self, event: Option<&Event>, verbose: bool) -> String {
        match (event, verbose) {
            (Some(e), true) => match self.evaluate(e).ok().and_then(|v| v.into_iter().next()) {
                Some(v) => format!("the last spawned entity ({v})"),
                None => "the last spawned entity (none)".to_string(),
            },
            _ => "the last spawned entity".to_string(),
        }
    }
}
