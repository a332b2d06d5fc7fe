// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::*;

use core::cell::RefCell;
use core::fmt;

use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Warning,
    Error,
}

/// A user-facing message produced while running a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Description of the expression that produced the message.
    pub source: Rc<str>,
    pub message: Rc<str>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{level}: {} ({})", self.message, self.source)
    }
}

#[derive(Debug, Default)]
struct Collected {
    items: Vec<Diagnostic>,
    limit: usize,
    dropped: usize,
}

/// Shared collector for run-time diagnostics.
///
/// Messages past the configured limit are counted but not kept, so a script
/// that warns on every tick cannot grow the collector without bound.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    inner: Rc<RefCell<Collected>>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::with_limit(256)
    }
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Collected {
                limit,
                ..Collected::default()
            })),
        }
    }

    pub fn warn(&self, source: &str, message: &str) {
        warn!(target: "hearth::diagnostics", source = %source, "{}", message);
        self.push(Severity::Warning, source, message);
    }

    pub fn error(&self, source: &str, message: &str) {
        warn!(target: "hearth::diagnostics", source = %source, "script error: {}", message);
        self.push(Severity::Error, source, message);
    }

    fn push(&self, severity: Severity, source: &str, message: &str) {
        let mut c = self.inner.borrow_mut();
        if c.items.len() >= c.limit {
            c.dropped += 1;
            return;
        }
        c.items.push(Diagnostic {
            severity,
            source: source.into(),
            message: message.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of messages discarded because the limit was reached.
    pub fn dropped(&self) -> usize {
        self.inner.borrow().dropped
    }

    pub fn items(&self) -> Vec<Diagnostic> {
        self.inner.borrow().items.clone()
    }

    pub fn take(&self) -> Vec<Diagnostic> {
        let mut c = self.inner.borrow_mut();
        c.dropped = 0;
        core::mem::take(&mut c.items)
    }
}
