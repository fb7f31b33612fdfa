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

//! Expression trees for filter predicates and ordering keys.
//!
//! An [`Expr`] is the body of a per-record lambda: [`Expr::Field`] and
//! [`Expr::Indexer`] refer to the record, every other node is either a constant
//! or something that can be reduced to one (captured closures, nested calls,
//! arithmetic on constants).
//!
//! # Example
//!
//! ```
//! use jira_jql::jql::expr::field;
//!
//! // Project = "TST" and Status = "Open"
//! let predicate = field("Project").eq("TST").and(field("Status").eq("Open"));
//! ```

use crate::jql::value::{ComparableString, LiteralDateTime, LiteralMatch, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use std::fmt;
use std::ops::Not;
use std::sync::Arc;

/// Closure producing a value when the expression is folded.
pub type CapturedFn = Arc<dyn Fn() -> Result<Value, String> + Send + Sync>;

/// Function applied to folded arguments of a nested call.
pub type CallFn = Arc<dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync>;

/// Binary operators that can appear in an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    AndAlso,
    OrElse,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOp {
    /// Node kind name used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Equal => "Equal",
            BinaryOp::NotEqual => "NotEqual",
            BinaryOp::GreaterThan => "GreaterThan",
            BinaryOp::GreaterThanOrEqual => "GreaterThanOrEqual",
            BinaryOp::LessThan => "LessThan",
            BinaryOp::LessThanOrEqual => "LessThanOrEqual",
            BinaryOp::AndAlso => "AndAlso",
            BinaryOp::OrElse => "OrElse",
            BinaryOp::Add => "Add",
            BinaryOp::Subtract => "Subtract",
            BinaryOp::Multiply => "Multiply",
            BinaryOp::Divide => "Divide",
            BinaryOp::Modulo => "Modulo",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value captured from the enclosing scope (closure, local variable).
#[derive(Clone)]
pub struct Captured {
    pub name: String,
    pub func: CapturedFn,
}

/// A nested call whose result is folded once its arguments are constant.
#[derive(Clone)]
pub struct Call {
    pub name: String,
    pub args: Vec<Expr>,
    pub func: CallFn,
}

/// Expression node.
#[derive(Clone)]
pub enum Expr {
    /// Member access on the record, e.g. `issue.Summary`
    Field(String),
    /// Field looked up by name on the record, e.g. `issue["Epic Link"]`
    Indexer(Box<Expr>),
    Constant(Value),
    Captured(Captured),
    Call(Call),
    /// Implicit conversion; transparent for field resolution
    Convert(Box<Expr>),
    Not(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

/// Starts an expression on a record member.
pub fn field(name: impl Into<String>) -> Expr {
    Expr::Field(name.into())
}

/// Starts an expression on a dynamically named record field.
pub fn custom_field(name: impl Into<String>) -> Expr {
    Expr::Indexer(Box::new(Expr::Constant(Value::String(name.into()))))
}

impl Expr {
    pub fn constant(value: impl Into<Value>) -> Expr {
        Expr::Constant(value.into())
    }

    /// Captures a value that is read when the query is translated.
    pub fn captured<F>(name: impl Into<String>, func: F) -> Expr
    where
        F: Fn() -> Result<Value, String> + Send + Sync + 'static,
    {
        Expr::Captured(Captured {
            name: name.into(),
            func: Arc::new(func),
        })
    }

    pub fn call<F>(name: impl Into<String>, args: Vec<Expr>, func: F) -> Expr
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        Expr::Call(Call {
            name: name.into(),
            args,
            func: Arc::new(func),
        })
    }

    /// Record field looked up by a name computed from an expression.
    pub fn indexer(name: impl Into<Expr>) -> Expr {
        Expr::Indexer(Box::new(name.into()))
    }

    pub fn convert(self) -> Expr {
        Expr::Convert(Box::new(self))
    }

    pub fn binary(self, op: BinaryOp, right: impl Into<Expr>) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(self),
            right: Box::new(right.into()),
        }
    }

    pub fn eq(self, right: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Equal, right)
    }

    pub fn ne(self, right: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::NotEqual, right)
    }

    pub fn gt(self, right: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::GreaterThan, right)
    }

    pub fn ge(self, right: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::GreaterThanOrEqual, right)
    }

    pub fn lt(self, right: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::LessThan, right)
    }

    pub fn le(self, right: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::LessThanOrEqual, right)
    }

    pub fn and(self, right: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::AndAlso, right)
    }

    pub fn or(self, right: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::OrElse, right)
    }

    pub fn add(self, right: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Add, right)
    }

    pub fn sub(self, right: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Subtract, right)
    }

    pub fn mul(self, right: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Multiply, right)
    }

    pub fn div(self, right: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Divide, right)
    }

    pub fn rem(self, right: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Modulo, right)
    }

    /// Node kind name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Field(_) => "MemberAccess",
            Expr::Indexer(_) => "Index",
            Expr::Constant(_) => "Constant",
            Expr::Captured(_) => "Captured",
            Expr::Call(_) => "Call",
            Expr::Convert(_) => "Convert",
            Expr::Not(_) => "Not",
            Expr::Binary { op, .. } => op.as_str(),
        }
    }

    /// True when the expression reads the record, directly or in a child.
    pub fn depends_on_record(&self) -> bool {
        match self {
            Expr::Field(_) | Expr::Indexer(_) => true,
            Expr::Constant(_) | Expr::Captured(_) => false,
            Expr::Call(call) => call.args.iter().any(Expr::depends_on_record),
            Expr::Convert(inner) | Expr::Not(inner) => inner.depends_on_record(),
            Expr::Binary { left, right, .. } => {
                left.depends_on_record() || right.depends_on_record()
            }
        }
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Field(name) => write!(f, "x.{name}"),
            Expr::Indexer(arg) => write!(f, "x[{arg:?}]"),
            Expr::Constant(v) => write!(f, "{v}"),
            Expr::Captured(c) => write!(f, "<{}>", c.name),
            Expr::Call(c) => {
                write!(f, "{}(", c.name)?;
                for (i, arg) in c.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg:?}")?;
                }
                f.write_str(")")
            }
            Expr::Convert(inner) => write!(f, "Convert({inner:?})"),
            Expr::Not(inner) => write!(f, "!({inner:?})"),
            Expr::Binary { op, left, right } => write!(f, "({left:?} {op} {right:?})"),
        }
    }
}

macro_rules! impl_expr_from_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Expr {
                fn from(v: $t) -> Self {
                    Expr::Constant(Value::from(v))
                }
            }
        )*
    };
}

impl_expr_from_value!(
    &str,
    String,
    bool,
    i32,
    i64,
    u32,
    f64,
    ComparableString,
    LiteralMatch,
    LiteralDateTime,
    NaiveDate,
    NaiveDateTime,
);

impl From<Value> for Expr {
    fn from(v: Value) -> Self {
        Expr::Constant(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Expr {
    fn from(v: Option<T>) -> Self {
        Expr::Constant(Value::from(v))
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Expr {
    fn from(v: DateTime<Tz>) -> Self {
        Expr::Constant(Value::from(v))
    }
}
