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

//! Translated JQL predicates.
//!
//! Grammar produced by [`Predicate::to_jql`]:
//!
//! ```text
//! <field> <op> <literal>
//! <field> is [not] null
//! <field> is [not] empty
//! (<predicate> and <predicate>)
//! (<predicate> or <predicate>)
//! ```

use crate::jql::value::Value;
use std::fmt;

/// JQL comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    Is,
    IsNot,
    GreaterThan,
    GreaterThanOrEquals,
    LessThan,
    LessThanOrEquals,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Equals => "=",
            Operator::NotEquals => "!=",
            Operator::Contains => "~",
            Operator::NotContains => "!~",
            Operator::Is => "is",
            Operator::IsNot => "is not",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEquals => ">=",
            Operator::LessThan => "<",
            Operator::LessThanOrEquals => "<=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Value),
    /// `null` keyword, used with `is`/`is not`
    Null,
    /// `empty` keyword, used with `is`/`is not`
    Empty,
}

impl Operand {
    pub fn to_jql(&self) -> String {
        match self {
            Operand::Literal(v) => v.to_jql(),
            Operand::Null => String::from("null"),
            Operand::Empty => String::from("empty"),
        }
    }
}

/// Boolean combination of field comparisons.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Comparison {
        field: String,
        op: Operator,
        operand: Operand,
    },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    pub fn comparison(field: impl Into<String>, op: Operator, operand: Operand) -> Self {
        Predicate::Comparison {
            field: field.into(),
            op,
            operand,
        }
    }

    pub fn and(self, other: Predicate) -> Predicate {
        Predicate::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Predicate) -> Predicate {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    /// Renders the predicate; every `and`/`or` is wrapped in parentheses.
    pub fn to_jql(&self) -> String {
        let mut out = String::new();
        self.write_jql(&mut out);
        out
    }

    fn write_jql(&self, out: &mut String) {
        match self {
            Predicate::Comparison { field, op, operand } => {
                out.push_str(field);
                out.push(' ');
                out.push_str(op.as_str());
                out.push(' ');
                out.push_str(&operand.to_jql());
            }
            Predicate::And(left, right) => Self::write_group(out, left, "and", right),
            Predicate::Or(left, right) => Self::write_group(out, left, "or", right),
        }
    }

    fn write_group(out: &mut String, left: &Predicate, keyword: &str, right: &Predicate) {
        out.push('(');
        left.write_jql(out);
        out.push(' ');
        out.push_str(keyword);
        out.push(' ');
        right.write_jql(out);
        out.push(')');
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_jql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{Arbitrary, Gen, quickcheck};

    fn eq(field: &str, value: &str) -> Predicate {
        Predicate::comparison(field, Operator::Equals, Operand::Literal(value.into()))
    }

    #[test]
    fn test_comparison_rendering() {
        assert_eq!(eq("Project", "TST").to_jql(), "Project = \"TST\"");
        assert_eq!(
            Predicate::comparison("DueDate", Operator::IsNot, Operand::Null).to_jql(),
            "DueDate is not null"
        );
        assert_eq!(
            Predicate::comparison("Assignee", Operator::Is, Operand::Empty).to_jql(),
            "Assignee is empty"
        );
    }

    #[test]
    fn test_groups_are_parenthesized() {
        let p = eq("Project", "TST")
            .and(eq("Status", "Open"))
            .or(eq("Priority", "Major"));
        assert_eq!(
            p.to_jql(),
            "((Project = \"TST\" and Status = \"Open\") or Priority = \"Major\")"
        );
    }

    #[derive(Clone, Debug)]
    struct Tree(Predicate);

    impl Arbitrary for Tree {
        fn arbitrary(g: &mut Gen) -> Self {
            fn build(g: &mut Gen, depth: u8) -> Predicate {
                if depth == 0 || bool::arbitrary(g) {
                    let n = u8::arbitrary(g) % 4;
                    return eq(&format!("F{n}"), "v");
                }
                let left = build(g, depth - 1);
                let right = build(g, depth - 1);
                if bool::arbitrary(g) {
                    left.and(right)
                } else {
                    left.or(right)
                }
            }
            Tree(build(g, 4))
        }
    }

    fn groups(p: &Predicate) -> usize {
        match p {
            Predicate::Comparison { .. } => 0,
            Predicate::And(l, r) | Predicate::Or(l, r) => 1 + groups(l) + groups(r),
        }
    }

    quickcheck! {
        fn prop_every_group_is_parenthesized(tree: Tree) -> bool {
            let text = tree.0.to_jql();
            let opens = text.matches('(').count();
            let closes = text.matches(')').count();
            let expected = groups(&tree.0);
            let wrapped = expected == 0 || (text.starts_with('(') && text.ends_with(')'));
            opens == expected && closes == expected && wrapped
        }
    }
}
