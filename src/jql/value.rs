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

//! Literal values embedded in query expressions and their JQL formatting.
//!
//! Formatting is locale-invariant: dates always render as `yyyy/MM/dd` and
//! numbers always use `.` as the decimal point.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use std::fmt;

/// Date pattern used for every date literal sent to Jira.
pub const JQL_DATE_FORMAT: &str = "%Y/%m/%d";

/// String wrapper that can be ordered against other strings, e.g. `Key > "TST-1"`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComparableString(pub String);

impl ComparableString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComparableString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Forces an exact-match (`=`/`!=`) comparison regardless of the field's policy.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LiteralMatch(pub String);

impl LiteralMatch {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for LiteralMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw date/time text used verbatim as the query value (e.g. `-1d`, `2024/01/01 10:00`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LiteralDateTime(pub String);

impl LiteralDateTime {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for LiteralDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A constant value appearing in an expression, either written directly or
/// produced by folding a closed sub-expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Comparable(ComparableString),
    Match(LiteralMatch),
    LiteralDate(LiteralDateTime),
    DateTime(NaiveDateTime),
}

impl Value {
    /// Name of the value's type, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Comparable(_) => "comparable string",
            Value::Match(_) => "literal match",
            Value::LiteralDate(_) => "literal date",
            Value::DateTime(_) => "datetime",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Empty plain or comparable string; drives the `is empty` rule.
    pub fn is_empty_string(&self) -> bool {
        match self {
            Value::String(s) => s.is_empty(),
            Value::Comparable(s) => s.0.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::Comparable(s) => Some(&s.0),
            Value::Match(s) => Some(&s.0),
            Value::LiteralDate(s) => Some(&s.0),
            _ => None,
        }
    }

    /// Renders the value as a JQL literal.
    ///
    /// String-like values are quoted, dates are formatted with [`JQL_DATE_FORMAT`]
    /// and quoted, anything else uses its plain textual form.
    pub fn to_jql(&self) -> String {
        match self {
            Value::String(s) => quote(s),
            Value::Comparable(s) => quote(&s.0),
            Value::Match(s) => quote(&s.0),
            Value::LiteralDate(s) => quote(&s.0),
            Value::DateTime(dt) => quote(&dt.format(JQL_DATE_FORMAT).to_string()),
            Value::Null => String::from("null"),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(v) => v.to_string(),
        }
    }
}

fn quote(s: &str) -> String {
    format!("\"{s}\"")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_jql())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<ComparableString> for Value {
    fn from(v: ComparableString) -> Self {
        Value::Comparable(v)
    }
}

impl From<LiteralMatch> for Value {
    fn from(v: LiteralMatch) -> Self {
        Value::Match(v)
    }
}

impl From<LiteralDateTime> for Value {
    fn from(v: LiteralDateTime) -> Self {
        Value::LiteralDate(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::DateTime(v.and_time(chrono::NaiveTime::MIN))
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    fn from(v: DateTime<Tz>) -> Self {
        Value::DateTime(v.naive_local())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
