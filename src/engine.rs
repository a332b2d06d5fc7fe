// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::binder::{BindScope, Binder};
use crate::converters::{Converter, DefaultConverters};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::effects::Trigger;
use crate::event::{EvalError, Event};
use crate::globals::Globals;
use crate::*;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineOptions {
    /// Replace constant subtrees while binding.
    pub fold_constants: bool,
    /// Diagnostics kept per engine before further ones are only counted.
    pub max_diagnostics: usize,
    /// Keep run-time diagnostics. When off they are still logged.
    pub collect_diagnostics: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            fold_constants: true,
            max_diagnostics: 256,
            collect_diagnostics: true,
        }
    }
}

impl EngineOptions {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// Entry point for hosts: binds triggers and runs them against events.
#[derive(Debug, Clone)]
pub struct Engine {
    options: EngineOptions,
    globals: Globals,
    converter: Rc<dyn Converter>,
    diagnostics: Diagnostics,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    pub fn with_options(options: EngineOptions) -> Self {
        let diagnostics = Diagnostics::with_limit(options.max_diagnostics);
        Self {
            options,
            globals: Globals::new(),
            converter: Rc::new(DefaultConverters),
            diagnostics,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    /// Replaces the conversion table consulted while binding.
    pub fn set_converter(&mut self, converter: Rc<dyn Converter>) {
        self.converter = converter;
    }

    pub fn binder(&self, scope: BindScope) -> Binder {
        Binder::new(
            scope,
            self.converter.clone(),
            self.globals.clone(),
            self.options.fold_constants,
        )
    }

    /// Runs `trigger` for `event`.
    ///
    /// Recoverable problems end up in the diagnostics. A fatal error stops the
    /// trigger and is returned; the engine itself stays usable.
    pub fn execute(&self, trigger: &Trigger, event: &Event) -> Result<()> {
        let diagnostics = if self.options.collect_diagnostics {
            self.diagnostics.clone()
        } else {
            Diagnostics::with_limit(0)
        };
        match trigger.execute(event, &diagnostics) {
            Ok(()) => Ok(()),
            Err(e) => {
                let invalid = matches!(e.downcast_ref::<EvalError>(), Some(EvalError::InvalidEvent(_)));
                info!(
                    target: "hearth::engine",
                    trigger = trigger.name(),
                    event = event.name(),
                    invalid_event = invalid,
                    error = %e,
                    "trigger failed"
                );
                Err(e)
            }
        }
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.items()
    }

    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }
}
