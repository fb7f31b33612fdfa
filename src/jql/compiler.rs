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

//! Translator from query pipelines to JQL.
//!
//! The pipeline is walked from the outermost (newest) stage inward:
//!
//! - `Where` stages are emitted innermost first, so their text follows
//!   declaration order, and are joined with ` and `.
//! - Ordering stages are met newest first; each one is inserted in front of
//!   the clauses collected so far, so the `order by` list ends up in
//!   declaration order.
//! - `Take`/`Skip` keep the first value met, i.e. the one declared last.
//!
//! Stages that only run locally are skipped. They must come after every
//! pushed-down stage: the fetched page stands in for everything the server
//! evaluated, so a local stage below a pushed one could not be honored.
//!
//! # Supported comparisons
//!
//! | Expression                    | JQL                               |
//! |-------------------------------|-----------------------------------|
//! | `field > c`, `>=`, `<`, `<=`  | `field > c`                       |
//! | `field == null`               | `field is null`                   |
//! | `field != ""`                 | `field is not empty`              |
//! | `field == c` (contains field) | `field ~ c`                       |
//! | `field == LiteralMatch(c)`    | `field = c`                       |
//! | `x["name"] == "text"`         | `"name" ~ "text"`                 |
//! | `x["name"] == 5`              | `"name" = 5`                      |
//! | `a && b`, `a \|\| b`          | `(a and b)`, `(a or b)`           |

use crate::jql::error::{Error, Result};
use crate::jql::expr::{BinaryOp, Expr};
use crate::jql::field::{ComparisonPolicy, FieldRegistry, FieldResolver, ResolvedField};
use crate::jql::fold::partial_eval;
use crate::jql::pipeline::{Direction, PipelineNode};
use crate::jql::predicate::{Operand, Operator, Predicate};
use crate::jql::value::Value;
use std::fmt;

const ORDER_BY_PREFIX: &str = " order by ";

/// One `order by` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderClause {
    pub field: String,
    pub direction: Direction,
}

impl fmt::Display for OrderClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.direction)
    }
}

/// Result of translating a pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDirective {
    /// Predicate text, empty when the pipeline has no `Where` stage
    pub filter_text: String,
    /// Ordering keys in declaration order
    pub order_clauses: Vec<OrderClause>,
    pub max_results: Option<u32>,
    pub start_at: Option<u32>,
    /// Names of dynamically named fields used by the predicates
    pub custom_fields: Vec<String>,
}

impl QueryDirective {
    /// The ` order by ...` suffix, or an empty string.
    pub fn order_text(&self) -> String {
        if self.order_clauses.is_empty() {
            return String::new();
        }
        let clauses: Vec<String> = self.order_clauses.iter().map(ToString::to_string).collect();
        format!("{ORDER_BY_PREFIX}{}", clauses.join(", "))
    }

    /// Full JQL text sent to the server.
    pub fn jql(&self) -> String {
        format!("{}{}", self.filter_text, self.order_text())
    }
}

/// Translates pipelines using a field registration table.
#[derive(Debug, Clone, Copy)]
pub struct QueryCompiler<'a> {
    resolver: FieldResolver<'a>,
}

impl<'a> QueryCompiler<'a> {
    pub fn new(registry: &'a FieldRegistry) -> Self {
        Self {
            resolver: FieldResolver::new(registry),
        }
    }

    /// Translates the whole pipeline ending at `node`.
    ///
    /// Nothing is returned on error; a pipeline is either fully translated or
    /// rejected.
    pub fn compile<R>(&self, node: &PipelineNode<R>) -> Result<QueryDirective> {
        let mut state = CompileState::default();
        self.visit(node, &mut state)?;
        Ok(QueryDirective {
            filter_text: state.filters.join(" and "),
            order_clauses: state.order_clauses,
            max_results: state.max_results,
            start_at: state.start_at,
            custom_fields: state.custom_fields,
        })
    }

    fn visit<R>(&self, node: &PipelineNode<R>, state: &mut CompileState) -> Result<()> {
        if node.is_pushed_down() {
            state.pushed_above = Some(node.method_name());
        }
        match node {
            PipelineNode::Source => Ok(()),
            PipelineNode::Filter { predicate, prev } => {
                self.visit(prev, state)?;
                let predicate = self.translate_predicate(predicate, state)?;
                state.filters.push(predicate.to_jql());
                Ok(())
            }
            PipelineNode::OrderBy {
                key,
                direction,
                prev,
                ..
            } => {
                let clause = OrderClause {
                    field: self.order_key(key, node.method_name(), state)?,
                    direction: *direction,
                };
                // declared before everything collected so far
                state.order_clauses.insert(0, clause);
                self.visit(prev, state)
            }
            PipelineNode::Take { count, prev } => {
                match state.max_results {
                    None => state.max_results = Some(*count),
                    Some(kept) => log::warn!(
                        "Multiple Take stages in one query; keeping the last declared value {kept}, ignoring {count}"
                    ),
                }
                self.visit(prev, state)
            }
            PipelineNode::Skip { count, prev } => {
                match state.start_at {
                    None => state.start_at = Some(*count),
                    Some(kept) => log::warn!(
                        "Multiple Skip stages in one query; keeping the last declared value {kept}, ignoring {count}"
                    ),
                }
                self.visit(prev, state)
            }
            PipelineNode::LocalFilter { prev, .. } => match state.pushed_above {
                Some(method) => Err(Error::not_supported(format!(
                    "LocalWhere followed by {method}"
                ))),
                None => self.visit(prev, state),
            },
        }
    }

    fn order_key(&self, key: &Expr, method: &str, state: &mut CompileState) -> Result<String> {
        match key {
            Expr::Convert(inner) => self.order_key(inner, method, state),
            // ordering uses the member's own name
            Expr::Field(name) => Ok(name.clone()),
            Expr::Indexer(_) => {
                let field = self.resolver.resolve(&partial_eval(key)?, method)?;
                state.record_custom_field(&field);
                Ok(field.query_field_name().to_string())
            }
            _ => Err(Error::UnsupportedField {
                operator: method.to_string(),
            }),
        }
    }

    /// Folds and translates the body of one `Where` stage.
    fn translate_predicate(&self, expr: &Expr, state: &mut CompileState) -> Result<Predicate> {
        let folded = partial_eval(expr)?;
        self.translate(&folded, state)
    }

    fn translate(&self, expr: &Expr, state: &mut CompileState) -> Result<Predicate> {
        let Expr::Binary { op, left, right } = expr else {
            return Err(Error::not_supported(expr.kind()));
        };

        match op {
            BinaryOp::AndAlso => {
                let l = self.translate(left, state)?;
                let r = self.translate(right, state)?;
                Ok(l.and(r))
            }
            BinaryOp::OrElse => {
                let l = self.translate(left, state)?;
                let r = self.translate(right, state)?;
                Ok(l.or(r))
            }
            BinaryOp::GreaterThan => self.ordering(*op, Operator::GreaterThan, left, right, state),
            BinaryOp::GreaterThanOrEqual => {
                self.ordering(*op, Operator::GreaterThanOrEquals, left, right, state)
            }
            BinaryOp::LessThan => self.ordering(*op, Operator::LessThan, left, right, state),
            BinaryOp::LessThanOrEqual => {
                self.ordering(*op, Operator::LessThanOrEquals, left, right, state)
            }
            BinaryOp::Equal => self.equality(*op, true, left, right, state),
            BinaryOp::NotEqual => self.equality(*op, false, left, right, state),
            BinaryOp::Add
            | BinaryOp::Subtract
            | BinaryOp::Multiply
            | BinaryOp::Divide
            | BinaryOp::Modulo => Err(Error::not_supported(op.as_str())),
        }
    }

    fn ordering(
        &self,
        op: BinaryOp,
        operator: Operator,
        left: &Expr,
        right: &Expr,
        state: &mut CompileState,
    ) -> Result<Predicate> {
        let field = self.resolve(left, op, state)?;
        let value = constant_operand(right, op)?;
        if value.is_null() {
            return Err(Error::NullComparison {
                field: field.query_field_name().to_string(),
                operator: op.as_str().to_string(),
            });
        }
        Ok(Predicate::comparison(
            field.query_field_name(),
            operator,
            Operand::Literal(value),
        ))
    }

    fn equality(
        &self,
        op: BinaryOp,
        equal: bool,
        left: &Expr,
        right: &Expr,
        state: &mut CompileState,
    ) -> Result<Predicate> {
        let field = self.resolve(left, op, state)?;
        let value = constant_operand(right, op)?;

        let (operator, operand) = match &field {
            ResolvedField::Member(mapping) => {
                if value.is_null() || value.is_empty_string() {
                    let keyword = if value.is_null() {
                        Operand::Null
                    } else {
                        Operand::Empty
                    };
                    let operator = if equal { Operator::Is } else { Operator::IsNot };
                    (operator, keyword)
                } else {
                    let policy = match value {
                        Value::Match(_) => ComparisonPolicy::Equals,
                        _ => mapping.comparison_policy,
                    };
                    (equality_operator(policy, equal), Operand::Literal(value))
                }
            }
            ResolvedField::Indexer { .. } => {
                let policy = match value {
                    Value::String(_) => ComparisonPolicy::Contains,
                    _ => ComparisonPolicy::Equals,
                };
                (equality_operator(policy, equal), Operand::Literal(value))
            }
        };

        Ok(Predicate::comparison(
            field.query_field_name(),
            operator,
            operand,
        ))
    }

    fn resolve(
        &self,
        left: &Expr,
        op: BinaryOp,
        state: &mut CompileState,
    ) -> Result<ResolvedField> {
        let field = self.resolver.resolve(left, op.as_str())?;
        state.record_custom_field(&field);
        Ok(field)
    }
}

fn equality_operator(policy: ComparisonPolicy, equal: bool) -> Operator {
    match (policy, equal) {
        (ComparisonPolicy::Equals, true) => Operator::Equals,
        (ComparisonPolicy::Equals, false) => Operator::NotEquals,
        (ComparisonPolicy::Contains, true) => Operator::Contains,
        (ComparisonPolicy::Contains, false) => Operator::NotContains,
    }
}

fn constant_operand(right: &Expr, op: BinaryOp) -> Result<Value> {
    match right {
        Expr::Constant(v) => Ok(v.clone()),
        Expr::Convert(inner) => constant_operand(inner, op),
        _ => Err(Error::NonConstantOperand {
            operator: op.as_str().to_string(),
        }),
    }
}

/// Accumulated output while walking a pipeline.
#[derive(Debug, Default)]
struct CompileState {
    filters: Vec<String>,
    order_clauses: Vec<OrderClause>,
    max_results: Option<u32>,
    start_at: Option<u32>,
    custom_fields: Vec<String>,
    /// Nearest pushed-down stage above the node being visited
    pushed_above: Option<&'static str>,
}

impl CompileState {
    fn record_custom_field(&mut self, field: &ResolvedField) {
        if let ResolvedField::Indexer { name, .. } = field {
            if !self.custom_fields.contains(name) {
                self.custom_fields.push(name.clone());
            }
        }
    }
}
