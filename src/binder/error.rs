// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::changer::ChangeMode;
use crate::time::TimeState;
use crate::typing::Type;

use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Source position of the syntax being bound.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub col: u32,
}

impl Location {
    pub fn new(file: &str, line: u32, col: u32) -> Self {
        Self {
            file: file.to_string(),
            line,
            col,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindErrorKind {
    #[error("{target} cannot be changed")]
    NotChangeable { target: String },

    #[error("{target} cannot be changed with `{mode}`")]
    UnsupportedChange { target: String, mode: ChangeMode },

    #[error("`{mode}` of {target} needs a value")]
    DeltaMissing { target: String, mode: ChangeMode },

    #[error("`{mode}` of {target} does not take a value")]
    DeltaNotExpected { target: String, mode: ChangeMode },

    #[error("{target} can only be changed with `{mode}` by a single value, but {delta} is plural")]
    NotSingleDelta {
        target: String,
        mode: ChangeMode,
        delta: String,
    },

    #[error("{delta} ({found}) is not a valid value for `{mode}` of {target}, expected {expected}")]
    DeltaTypeMismatch {
        target: String,
        mode: ChangeMode,
        delta: String,
        found: Type,
        expected: String,
    },

    #[error("{target} has no {time} state")]
    UnsupportedTime { target: String, time: TimeState },

    #[error("can't use the {time} state of {target} after the event has already passed")]
    TimeAfterDelay { target: String, time: TimeState },

    #[error("{target} has no keys")]
    NotKeyed { target: String },

    #[error("there is no {name} in {events}")]
    NoEventValue { name: String, events: String },

    #[error("there are several {ty}s here and none of them is the default: {candidates}")]
    NoDefault { ty: Type, candidates: String },

    #[error("{ty} is ambiguous here: {candidates}")]
    AmbiguousDefault { ty: Type, candidates: String },

    #[error("there is no {ty} in {events}")]
    NoCandidate { ty: Type, events: String },

    #[error("{expr} ({from}) cannot be converted to {to}")]
    ConversionImpossible { expr: String, from: Type, to: Type },
}

/// A static error. Any of these prevents the script from running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{location}: {kind}")]
pub struct BindError {
    pub location: Location,
    pub kind: BindErrorKind,
}
