// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::event::Event;
use crate::expression::{expr, join_values, ExprRef, Expression};
use crate::keyed::{with_positional_keys, zip, Key, KeyedValue, KeyedView};
use crate::typing::Type;
use crate::value::Value;
use crate::world::World;
use crate::*;

use anyhow::Result;
use tracing::debug;

/// A precomputed value sequence.
///
/// Produced by literals and by the folder. When it replaces a subtree it keeps
/// that subtree's description and, if the subtree was keyed, its keys.
#[derive(Debug, Clone)]
pub struct Constant {
    values: Rc<[Value]>,
    keys: Option<Rc<[Key]>>,
    ty: Type,
    single: bool,
    and: bool,
    source: Option<Rc<str>>,
}

impl Constant {
    pub(crate) fn new(values: Vec<Value>, ty: Type, single: bool) -> Self {
        debug_assert!(!single || values.len() <= 1);
        Self {
            values: values.into(),
            keys: None,
            ty,
            single,
            and: true,
            source: None,
        }
    }

    /// A single literal. Its type is the most specific tag of the value.
    pub fn literal(value: impl Into<Value>) -> ExprRef {
        let value = value.into();
        let ty = Type::of(&value, &World::new());
        expr(Self::new(vec![value], ty, true))
    }

    /// A literal list `a, b and c` (or `a, b or c`).
    pub fn list(values: Vec<Value>, and: bool) -> ExprRef {
        let world = World::new();
        let ty = values
            .iter()
            .map(|v| Type::of(v, &world))
            .reduce(|a, b| a.common(&b))
            .unwrap_or(Type::Any);
        expr(Self {
            and,
            ..Self::new(values, ty, false)
        })
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl Expression for Constant {
    fn evaluate(&self, _event: &Event) -> Result<Vec<Value>> {
        Ok(self.values.to_vec())
    }

    fn return_type(&self) -> Type {
        self.ty
    }

    fn is_single(&self) -> bool {
        self.single
    }

    fn is_and(&self) -> bool {
        self.and
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn describe(&self, _event: Option<&Event>, _verbose: bool) -> String {
        match &self.source {
            Some(s) => s.to_string(),
            None => join_values(&self.values, self.and),
        }
    }

    fn keyed(&self) -> Option<&dyn KeyedView> {
        Some(self)
    }

    fn as_constant(&self) -> Option<&Constant> {
        Some(self)
    }
}

impl KeyedView for Constant {
    fn keyed_evaluate(&self, _event: &Event) -> Result<Vec<KeyedValue>> {
        match &self.keys {
            Some(keys) => zip(keys.to_vec(), self.values.to_vec()),
            None => Ok(with_positional_keys(self.values.to_vec())),
        }
    }
}

/// Bind-time pass replacing constant subtrees with [`Constant`] nodes.
///
/// Post-order: children are folded first, then a node is folded if it is pure
/// and every child ended up constant. The result of folding is the node
/// evaluated once against [`Event::constant`].
#[derive(Debug)]
pub struct ConstantFolder {
    enabled: bool,
    folded: usize,
}

impl Default for ConstantFolder {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConstantFolder {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, folded: 0 }
    }

    /// Number of nodes replaced so far.
    pub fn folded(&self) -> usize {
        self.folded
    }

    pub fn fold(&mut self, node: &ExprRef) -> ExprRef {
        if !self.enabled || node.as_constant().is_some() {
            return node.clone();
        }

        let children = node.children();
        let node = if children.is_empty() {
            node.clone()
        } else {
            let folded: Vec<ExprRef> = children.iter().map(|c| self.fold(c)).collect();
            let changed = folded.iter().zip(&children).any(|(f, c)| f != c);
            if !changed {
                node.clone()
            } else {
                match node.with_children(folded) {
                    Some(rebuilt) => rebuilt,
                    None => node.clone(),
                }
            }
        };

        if !node.is_pure() || !node.children().iter().all(|c| c.as_constant().is_some()) {
            return node;
        }

        match self.evaluate_constant(&node) {
            Ok(constant) => {
                self.folded += 1;
                debug!(target: "hearth::fold", node = %constant.describe(None, false), "folded constant");
                expr(constant)
            }
            Err(e) => {
                debug!(
                    target: "hearth::fold",
                    node = %node.describe(None, false),
                    error = %e,
                    "left unfolded"
                );
                node
            }
        }
    }

    fn evaluate_constant(&self, node: &ExprRef) -> Result<Constant> {
        let event = Event::constant();
        let (values, keys) = match node.keyed() {
            Some(view) => {
                let (keys, values): (Vec<Key>, Vec<Value>) = view
                    .keyed_evaluate(&event)?
                    .into_iter()
                    .map(|kv| (kv.key, kv.value))
                    .unzip();
                (values, Some(keys.into()))
            }
            None => (node.evaluate(&event)?, None),
        };
        debug_assert!(!node.is_single() || values.len() <= 1);
        Ok(Constant {
            values: values.into(),
            keys,
            ty: node.return_type(),
            single: node.is_single(),
            and: node.is_and(),
            source: Some(node.describe(None, false).into()),
        })
    }
}

/// Folds `node` with a default folder.
pub fn fold(node: &ExprRef) -> ExprRef {
    ConstantFolder::default().fold(node)
}
