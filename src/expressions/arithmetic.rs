// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::event::Event;
use crate::expression::{expr, ExprRef, Expression};
use crate::number::Number;
use crate::typing::Type;
use crate::value::Value;

use core::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Mod => "%",
        })
    }
}

/// `<lhs> <op> <rhs>` over single numbers.
///
/// Yields nothing when an operand yields nothing or is not a number, and
/// when dividing by zero.
#[derive(Debug)]
pub struct Arithmetic {
    op: ArithOp,
    lhs: ExprRef,
    rhs: ExprRef,
}

impl Arithmetic {
    pub fn new(op: ArithOp, lhs: ExprRef, rhs: ExprRef) -> Self {
        Self { op, lhs, rhs }
    }

    fn operand(e: &ExprRef, event: &Event) -> Result<Option<Number>> {
        Ok(match e.evaluate_one(event)? {
            Some(Value::Number(n)) => Some(n),
            _ => None,
        })
    }
}

impl Expression for Arithmetic {
    fn evaluate(&self, event: &Event) -> Result<Vec<Value>> {
        let (Some(lhs), Some(rhs)) = (
            Self::operand(&self.lhs, event)?,
            Self::operand(&self.rhs, event)?,
        ) else {
            return Ok(vec![]);
        };
        let result = match self.op {
            ArithOp::Add => Some(lhs.add(&rhs)),
            ArithOp::Sub => Some(lhs.sub(&rhs)),
            ArithOp::Mul => Some(lhs.mul(&rhs)),
            ArithOp::Div => lhs.divide(&rhs).ok(),
            ArithOp::Mod => lhs.modulo(&rhs).ok(),
        };
        Ok(result.map(Value::Number).into_iter().collect())
    }

    fn return_type(&self) -> Type {
        let integral = self.lhs.return_type().is_subtype_of(&Type::Integer)
            && self.rhs.return_type().is_subtype_of(&Type::Integer);
        match self.op {
            ArithOp::Div => Type::Number,
            _ if integral => Type::Integer,
            _ => Type::Number,
        }
    }

    fn is_single(&self) -> bool {
        true
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn describe(&self, event: Option<&Event>, verbose: bool) -> String {
        format!(
            "{} {} {}",
            self.lhs.describe(event, verbose),
            self.op,
            self.rhs.describe(event, verbose)
        )
    }

    fn children(&self) -> Vec<ExprRef> {
        vec![self.lhs.clone(), self.rhs.clone()]
    }

    fn with_children(&self, children: Vec<ExprRef>) -> Option<ExprRef> {
        let [lhs, rhs]: [ExprRef; 2] = children.try_into().ok()?;
        Some(expr(Self::new(self.op, lhs, rhs)))
    }
}
