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

//! Field registration table and field resolution.
//!
//! A [`FieldRegistry`] maps the logical name of a record member to the name
//! used in JQL and to the operator family used for equality. Members that are
//! not registered keep their own name and compare with `=`/`!=`.

use crate::jql::error::{Error, Result};
use crate::jql::expr::Expr;
use crate::jql::value::Value;
use lazy_static::lazy_static;
use std::collections::HashMap;

/// Operator family used for `==`/`!=` on a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComparisonPolicy {
    /// `=` / `!=`
    #[default]
    Equals,
    /// `~` / `!~`
    Contains,
}

/// Resolved mapping of a record member to its JQL field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub logical_name: String,
    pub query_field_name: String,
    pub comparison_policy: ComparisonPolicy,
}

impl FieldMapping {
    /// Mapping for a member without any registration: own name, exact equality.
    pub fn verbatim(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            query_field_name: name.clone(),
            logical_name: name,
            comparison_policy: ComparisonPolicy::Equals,
        }
    }
}

/// Registration table of field overrides, built once and then only read.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: HashMap<String, FieldMapping>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a member with an explicit JQL name and policy.
    pub fn with_field(
        mut self,
        logical_name: impl Into<String>,
        query_field_name: impl Into<String>,
        comparison_policy: ComparisonPolicy,
    ) -> Self {
        let logical_name = logical_name.into();
        self.fields.insert(
            logical_name.clone(),
            FieldMapping {
                logical_name,
                query_field_name: query_field_name.into(),
                comparison_policy,
            },
        );
        self
    }

    /// Registers a member that keeps its name but compares with `~`/`!~`.
    pub fn with_contains_equality(self, logical_name: impl Into<String>) -> Self {
        let logical_name = logical_name.into();
        let query_name = logical_name.clone();
        self.with_field(logical_name, query_name, ComparisonPolicy::Contains)
    }

    /// Registers a member whose JQL name differs from its own.
    pub fn with_renamed(
        self,
        logical_name: impl Into<String>,
        query_field_name: impl Into<String>,
    ) -> Self {
        self.with_field(logical_name, query_field_name, ComparisonPolicy::Equals)
    }

    /// Returns the mapping for a member, falling back to [`FieldMapping::verbatim`].
    pub fn mapping(&self, logical_name: &str) -> FieldMapping {
        self.fields
            .get(logical_name)
            .cloned()
            .unwrap_or_else(|| FieldMapping::verbatim(logical_name))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

lazy_static! {
    /// Field table for Jira issues.
    pub static ref ISSUE_FIELDS: FieldRegistry = FieldRegistry::new()
        .with_contains_equality("Summary")
        .with_contains_equality("Description")
        .with_contains_equality("Environment")
        .with_renamed("Components", "component")
        .with_renamed("AffectsVersions", "AffectedVersion")
        .with_renamed("FixVersions", "FixVersion");
}

/// Field referenced by the left operand of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedField {
    /// Direct member access
    Member(FieldMapping),
    /// Dynamically named field; the policy depends on the compared literal
    Indexer {
        /// Field name as written by the caller
        name: String,
        /// Quoted name used in JQL
        query_field_name: String,
    },
}

impl ResolvedField {
    pub fn query_field_name(&self) -> &str {
        match self {
            ResolvedField::Member(m) => &m.query_field_name,
            ResolvedField::Indexer {
                query_field_name, ..
            } => query_field_name,
        }
    }
}

/// Resolves field-access expressions against a [`FieldRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct FieldResolver<'a> {
    registry: &'a FieldRegistry,
}

impl<'a> FieldResolver<'a> {
    pub fn new(registry: &'a FieldRegistry) -> Self {
        Self { registry }
    }

    /// Resolves `expr` to a field; `operator` is only used for diagnostics.
    ///
    /// The indexer argument must already be folded to a constant.
    pub fn resolve(&self, expr: &Expr, operator: &str) -> Result<ResolvedField> {
        match expr {
            Expr::Convert(inner) => self.resolve(inner, operator),
            Expr::Field(name) => Ok(ResolvedField::Member(self.registry.mapping(name))),
            Expr::Indexer(arg) => match arg.as_ref() {
                Expr::Constant(value) => {
                    let name = indexer_name(value);
                    Ok(ResolvedField::Indexer {
                        query_field_name: resolve_indexer_field(&name),
                        name,
                    })
                }
                _ => Err(Error::UnsupportedField {
                    operator: operator.to_string(),
                }),
            },
            _ => Err(Error::UnsupportedField {
                operator: operator.to_string(),
            }),
        }
    }
}

fn indexer_name(value: &Value) -> String {
    value
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| value.to_jql())
}

/// JQL name for a dynamically named field: the name in double quotes.
pub fn resolve_indexer_field(name: &str) -> String {
    format!("\"{name}\"")
}
