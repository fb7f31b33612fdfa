// Jira JQL Rust Library
// Copyright 2025 The jira-jql Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Partial evaluation of expressions.
//!
//! Every maximal sub-expression that does not read the record is evaluated and
//! replaced by an [`Expr::Constant`]. Sub-expressions that read the record are
//! rebuilt around their folded children and never evaluated.

use crate::jql::error::{Error, Result};
use crate::jql::expr::{BinaryOp, Call, Expr};
use crate::jql::value::Value;
use std::cmp::Ordering;

/// Folds all closed sub-expressions of `expr` into constants.
pub fn partial_eval(expr: &Expr) -> Result<Expr> {
    if !expr.depends_on_record() {
        return evaluate(expr).map(Expr::Constant);
    }

    Ok(match expr {
        Expr::Field(name) => Expr::Field(name.clone()),
        Expr::Indexer(arg) => Expr::Indexer(Box::new(partial_eval(arg)?)),
        Expr::Convert(inner) => Expr::Convert(Box::new(partial_eval(inner)?)),
        Expr::Not(inner) => Expr::Not(Box::new(partial_eval(inner)?)),
        Expr::Binary { op, left, right } => Expr::Binary {
            op: *op,
            left: Box::new(partial_eval(left)?),
            right: Box::new(partial_eval(right)?),
        },
        Expr::Call(call) => Expr::Call(Call {
            name: call.name.clone(),
            args: call
                .args
                .iter()
                .map(partial_eval)
                .collect::<Result<Vec<_>>>()?,
            func: call.func.clone(),
        }),
        Expr::Constant(_) | Expr::Captured(_) => expr.clone(),
    })
}

/// Evaluates an expression that does not read the record.
pub fn evaluate(expr: &Expr) -> Result<Value> {
    match expr {
        Expr::Constant(v) => Ok(v.clone()),
        Expr::Captured(c) => (c.func)().map_err(|e| {
            Error::Evaluation(format!("captured value '{}' failed: {e}", c.name))
        }),
        Expr::Call(call) => {
            let args = call.args.iter().map(evaluate).collect::<Result<Vec<_>>>()?;
            (call.func)(&args)
                .map_err(|e| Error::Evaluation(format!("call '{}' failed: {e}", call.name)))
        }
        Expr::Convert(inner) => evaluate(inner),
        Expr::Not(inner) => match evaluate(inner)? {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            other => Err(Error::Evaluation(format!(
                "cannot negate a {} value",
                other.type_name()
            ))),
        },
        Expr::Binary { op, left, right } => {
            let l = evaluate(left)?;
            let r = evaluate(right)?;
            eval_binary(*op, l, r)
        }
        Expr::Field(_) | Expr::Indexer(_) => Err(Error::Evaluation(format!(
            "{} reads the record and cannot be evaluated",
            expr.kind()
        ))),
    }
}

fn eval_binary(op: BinaryOp, l: Value, r: Value) -> Result<Value> {
    use BinaryOp::*;

    match op {
        AndAlso | OrElse => match (&l, &r) {
            (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(if op == AndAlso {
                *a && *b
            } else {
                *a || *b
            })),
            _ => Err(type_mismatch(op, &l, &r)),
        },
        Equal => Ok(Value::Bool(l == r)),
        NotEqual => Ok(Value::Bool(l != r)),
        GreaterThan | GreaterThanOrEqual | LessThan | LessThanOrEqual => {
            let ord = compare(&l, &r).ok_or_else(|| type_mismatch(op, &l, &r))?;
            Ok(Value::Bool(match op {
                GreaterThan => ord == Ordering::Greater,
                GreaterThanOrEqual => ord != Ordering::Less,
                LessThan => ord == Ordering::Less,
                _ => ord != Ordering::Greater,
            }))
        }
        Add | Subtract | Multiply | Divide | Modulo => arithmetic(op, l, r),
    }
}

fn arithmetic(op: BinaryOp, l: Value, r: Value) -> Result<Value> {
    match (l, r) {
        (Value::Int(a), Value::Int(b)) => {
            let result = match op {
                BinaryOp::Add => a.checked_add(b),
                BinaryOp::Subtract => a.checked_sub(b),
                BinaryOp::Multiply => a.checked_mul(b),
                BinaryOp::Divide => a.checked_div(b),
                _ => a.checked_rem(b),
            };
            result
                .map(Value::Int)
                .ok_or_else(|| Error::Evaluation(format!("integer {op} of {a} and {b} failed")))
        }
        (Value::String(a), Value::String(b)) if op == BinaryOp::Add => Ok(Value::String(a + &b)),
        (l, r) => match (as_float(&l), as_float(&r)) {
            (Some(a), Some(b)) => Ok(Value::Float(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Subtract => a - b,
                BinaryOp::Multiply => a * b,
                BinaryOp::Divide => a / b,
                _ => a % b,
            })),
            _ => Err(type_mismatch(op, &l, &r)),
        },
    }
}

fn as_float(v: &Value) -> Option<f64> {
    match v {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

fn compare(l: &Value, r: &Value) -> Option<Ordering> {
    match (l, r) {
        (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => match (l.as_str(), r.as_str()) {
            (Some(a), Some(b)) => Some(a.cmp(b)),
            _ => as_float(l)?.partial_cmp(&as_float(r)?),
        },
    }
}

fn type_mismatch(op: BinaryOp, l: &Value, r: &Value) -> Error {
    Error::Evaluation(format!(
        "operator '{op}' is not defined for {} and {}",
        l.type_name(),
        r.type_name()
    ))
}
