// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::diagnostics::Diagnostics;
use crate::event::{EvalError, Event};
use crate::expression::ExprRef;
use crate::keyed::{unzip, KeyedValue};
use crate::number::Number;
use crate::typing::Type;
use crate::value::Value;

use core::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// How an assignment statement changes its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeMode {
    Set,
    Add,
    Remove,
    RemoveAll,
    Delete,
    Reset,
}

impl ChangeMode {
    pub const ALL: [ChangeMode; 6] = [
        ChangeMode::Set,
        ChangeMode::Add,
        ChangeMode::Remove,
        ChangeMode::RemoveAll,
        ChangeMode::Delete,
        ChangeMode::Reset,
    ];
}

impl fmt::Display for ChangeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeMode::Set => "set",
            ChangeMode::Add => "add",
            ChangeMode::Remove => "remove",
            ChangeMode::RemoveAll => "remove all",
            ChangeMode::Delete => "delete",
            ChangeMode::Reset => "reset",
        })
    }
}

/// Delta types a node accepts for one change mode.
///
/// An empty `types` list means the mode takes no delta at all. `plural` means
/// several delta values may be given at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaSpec {
    pub types: Vec<Type>,
    pub plural: bool,
}

impl DeltaSpec {
    pub fn none() -> Self {
        Self {
            types: vec![],
            plural: false,
        }
    }

    pub fn single(types: &[Type]) -> Self {
        Self {
            types: types.to_vec(),
            plural: false,
        }
    }

    pub fn plural(types: &[Type]) -> Self {
        Self {
            types: types.to_vec(),
            plural: true,
        }
    }

    pub fn requires_delta(&self) -> bool {
        !self.types.is_empty()
    }

    pub fn accepts(&self, ty: &Type) -> bool {
        self.types.iter().any(|t| ty.is_subtype_of(t))
    }
}

/// Mutation capability of an expression.
pub trait Changer {
    /// `None` if the mode is not supported at all.
    fn accept_change(&self, mode: ChangeMode) -> Option<DeltaSpec>;

    /// Applies a change that was accepted by [`Changer::accept_change`].
    ///
    /// Delta elements that turn out invalid at run time are skipped with a
    /// diagnostic. Only fatal conditions are returned as errors.
    fn change(
        &self,
        event: &Event,
        delta: Option<&[Value]>,
        mode: ChangeMode,
        diagnostics: &Diagnostics,
    ) -> Result<()>;

    /// Whether a keyed delta should be applied with its keys. Only `Set` is
    /// ever applied this way.
    fn receives_keys(&self) -> bool {
        false
    }

    fn change_keyed(
        &self,
        event: &Event,
        delta: Vec<KeyedValue>,
        mode: ChangeMode,
        diagnostics: &Diagnostics,
    ) -> Result<()> {
        let (_, values) = unzip(delta);
        self.change(event, Some(&values), mode, diagnostics)
    }
}

pub(crate) fn unsupported(target: &str, mode: ChangeMode) -> anyhow::Error {
    EvalError::UnsupportedChange {
        target: target.to_string(),
        mode: mode.to_string(),
    }
    .into()
}

/// Sets `expr` to `f` applied to each of its current values. Results that
/// `Set` would not accept are dropped.
pub fn change_in_place(
    expr: &ExprRef,
    event: &Event,
    f: &dyn Fn(&Value) -> Option<Value>,
    diagnostics: &Diagnostics,
) -> Result<()> {
    let Some(changer) = expr.changer() else {
        return Err(unsupported(&expr.describe(None, false), ChangeMode::Set));
    };
    let Some(spec) = changer.accept_change(ChangeMode::Set) else {
        return Err(unsupported(&expr.describe(None, false), ChangeMode::Set));
    };
    let values = expr.evaluate(event)?;
    if values.is_empty() {
        return Ok(());
    }
    let world = event.world();
    let new_values: Vec<Value> = values
        .iter()
        .filter_map(f)
        .filter(|v| spec.accepts(&Type::of(v, world)))
        .collect();
    changer.change(event, Some(&new_values), ChangeMode::Set, diagnostics)
}

/// Domain-defined bounds of a quantity. Missing ends are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub min: Option<Number>,
    pub max: Option<Number>,
}

impl Bounds {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn at_least(min: Number) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn between(min: Number, max: Number) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn contains(&self, n: &Number) -> bool {
        self.min.map_or(true, |min| *n >= min) && self.max.map_or(true, |max| *n <= max)
    }

    pub fn clamp(&self, n: Number) -> Number {
        let n = match self.min {
            Some(min) if n < min => min,
            _ => n,
        };
        match self.max {
            Some(max) if n > max => max,
            _ => n,
        }
    }
}

/// A numeric concept that can be read and written per target.
///
/// Implementing this yields every change mode through [`change_quantity`]:
/// `Set` replaces, `Add`/`Remove` combine with the current value, `Delete`
/// and `Reset` write the documented defaults. Results are clamped to
/// [`Quantity::bounds`]. `RemoveAll` is not meaningful for a quantity.
pub trait Quantity {
    /// The closed set of representations this concept is stored in.
    type Target;

    fn targets(&self, event: &Event) -> Result<Vec<Self::Target>>;

    fn get(&self, event: &Event, target: &Self::Target) -> Option<Number>;

    /// Returns false if the target vanished in between.
    fn set(&self, event: &Event, target: &Self::Target, value: Number) -> bool;

    fn bounds(&self, _event: &Event, _target: &Self::Target) -> Bounds {
        Bounds::unbounded()
    }

    fn delete_value(&self, _event: &Event, _target: &Self::Target) -> Number {
        Number::Int(0)
    }

    fn reset_value(&self, event: &Event, target: &Self::Target) -> Number;

    /// Integral concepts truncate fractional deltas.
    fn integral(&self) -> bool {
        false
    }

    /// When true, a `Set` outside the bounds is rejected with a diagnostic
    /// instead of being clamped.
    fn reject_out_of_bounds(&self) -> bool {
        false
    }

    /// Reads one delta element. `None` marks it invalid.
    fn delta_number(&self, value: &Value) -> Option<Number> {
        match value {
            Value::Number(n) if n.is_valid() => Some(*n),
            _ => None,
        }
    }

    fn describe_quantity(&self) -> String;
}

/// Mode acceptance shared by plain numeric quantities.
pub fn quantity_modes(mode: ChangeMode, types: &[Type]) -> Option<DeltaSpec> {
    match mode {
        ChangeMode::Set => Some(DeltaSpec::single(types)),
        ChangeMode::Add | ChangeMode::Remove => Some(DeltaSpec::plural(types)),
        ChangeMode::Delete | ChangeMode::Reset => Some(DeltaSpec::none()),
        ChangeMode::RemoveAll => None,
    }
}

pub fn change_quantity<Q: Quantity + ?Sized>(
    q: &Q,
    event: &Event,
    delta: Option<&[Value]>,
    mode: ChangeMode,
    diagnostics: &Diagnostics,
) -> Result<()> {
    if mode == ChangeMode::RemoveAll {
        return Err(unsupported(&q.describe_quantity(), mode));
    }

    let amount = match mode {
        ChangeMode::Set | ChangeMode::Add | ChangeMode::Remove => {
            match valid_delta(q, delta.unwrap_or_default(), mode, diagnostics) {
                Some(n) => Some(n),
                // Every element was invalid. Nothing left to apply.
                None => return Ok(()),
            }
        }
        _ => None,
    };

    for target in q.targets(event)? {
        let bounds = q.bounds(event, &target);
        let new_value = match (mode, amount) {
            (ChangeMode::Set, Some(n)) => {
                if q.reject_out_of_bounds() && !bounds.contains(&n) {
                    diagnostics.warn(
                        &q.describe_quantity(),
                        &format!("{n} is out of range{}", describe_bounds(&bounds)),
                    );
                    continue;
                }
                n
            }
            (ChangeMode::Add, Some(n)) | (ChangeMode::Remove, Some(n)) => {
                let Some(current) = q.get(event, &target) else {
                    continue;
                };
                if mode == ChangeMode::Add {
                    current.add(&n)
                } else {
                    current.sub(&n)
                }
            }
            (ChangeMode::Delete, _) => q.delete_value(event, &target),
            (ChangeMode::Reset, _) => q.reset_value(event, &target),
            _ => continue,
        };
        q.set(event, &target, bounds.clamp(new_value));
    }
    Ok(())
}

/// Folds the delta of a quantity change into one number. `Set` uses the
/// first valid element; `Add` and `Remove` sum all valid elements.
fn valid_delta<Q: Quantity + ?Sized>(
    q: &Q,
    delta: &[Value],
    mode: ChangeMode,
    diagnostics: &Diagnostics,
) -> Option<Number> {
    let mut total: Option<Number> = None;
    for v in delta {
        let Some(mut n) = q.delta_number(v) else {
            diagnostics.warn(
                &q.describe_quantity(),
                &format!("ignoring invalid value `{v}` in {mode}"),
            );
            continue;
        };
        if q.integral() {
            n = Number::Int(n.to_i64_lossy());
        }
        total = Some(match (mode, total) {
            (ChangeMode::Set, Some(first)) => return Some(first),
            (_, Some(t)) => t.add(&n),
            (_, None) => n,
        });
    }
    total
}

fn describe_bounds(bounds: &Bounds) -> String {
    match (bounds.min, bounds.max) {
        (Some(min), Some(max)) => format!(" (expected {min} to {max})"),
        (Some(min), None) => format!(" (expected at least {min})"),
        (None, Some(max)) => format!(" (expected at most {max})"),
        (None, None) => String::new(),
    }
}

/// Mode acceptance shared by collection-valued concepts.
pub fn collection_modes(mode: ChangeMode, types: &[Type]) -> Option<DeltaSpec> {
    match mode {
        ChangeMode::Delete | ChangeMode::Reset => Some(DeltaSpec::none()),
        _ => Some(DeltaSpec::plural(types)),
    }
}

/// Applies a change to a collection in place.
///
/// `Remove` drops at most one occurrence per delta element, `RemoveAll`
/// drops every occurrence. `Reset` installs whatever `reset` returns.
pub fn change_list<T: PartialEq + Clone>(
    items: &mut Vec<T>,
    delta: &[T],
    mode: ChangeMode,
    reset: impl FnOnce() -> Vec<T>,
) {
    match mode {
        ChangeMode::Set => *items = delta.to_vec(),
        ChangeMode::Add => items.extend_from_slice(delta),
        ChangeMode::Remove => {
            for d in delta {
                if let Some(pos) = items.iter().position(|i| i == d) {
                    items.remove(pos);
                }
            }
        }
        ChangeMode::RemoveAll => items.retain(|i| !delta.contains(i)),
        ChangeMode::Delete => items.clear(),
        ChangeMode::Reset => *items = reset(),
    }
}
