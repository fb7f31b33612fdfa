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

//! Error definitions for query translation and execution

use thiserror::Error;

/// Boxed error raised by an external collaborator (transport, field metadata source).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while translating a pipeline to JQL or executing it.
///
/// Translation errors (`NotSupported`, `UnsupportedField`, `NonConstantOperand`,
/// `NullComparison`, `Evaluation`, `FieldNotFound`) are always reported before a
/// remote call is attempted.
#[derive(Debug, Error)]
pub enum Error {
    /// Expression node kind or operator that has no JQL counterpart
    #[error("expression type '{kind}' is not supported")]
    NotSupported { kind: String },

    /// Left operand of a comparison is neither a field nor a field indexer
    #[error("operator '{operator}' can only be applied on properties and property indexers")]
    UnsupportedField { operator: String },

    /// Right operand of a comparison did not reduce to a constant
    #[error("operator '{operator}' can only be used with constant values")]
    NonConstantOperand { operator: String },

    /// Null literal used with an ordering comparison
    #[error("operator '{operator}' cannot compare field '{field}' against null")]
    NullComparison { field: String, operator: String },

    /// A closed sub-expression failed while being folded to a constant
    #[error("failed to evaluate constant sub-expression: {0}")]
    Evaluation(String),

    /// Dynamic field name unknown to the field metadata source
    #[error("custom field '{name}' was not found")]
    FieldNotFound { name: String },

    /// Failure surfaced by the page fetcher, passed through unchanged
    #[error("fetch failed: {0}")]
    Fetch(#[source] BoxError),

    /// Cancellation signal fired before the fetch completed
    #[error("request was cancelled")]
    Cancelled,

    /// Paged result metadata could not be read
    #[error("invalid paged result: {0}")]
    Json(#[from] serde_json::Error),

    /// `first`/`single` on an empty sequence
    #[error("sequence contains no elements")]
    EmptySequence,

    /// `single` on a sequence with more than one element
    #[error("sequence contains more than one element")]
    MoreThanOneElement,
}

impl Error {
    /// Returns true for errors raised during translation, before any I/O.
    pub fn is_translation_error(&self) -> bool {
        matches!(
            self,
            Error::NotSupported { .. }
                | Error::UnsupportedField { .. }
                | Error::NonConstantOperand { .. }
                | Error::NullComparison { .. }
                | Error::Evaluation(_)
                | Error::FieldNotFound { .. }
        )
    }

    pub(crate) fn not_supported(kind: impl Into<String>) -> Self {
        Error::NotSupported { kind: kind.into() }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            Error::not_supported("Modulo").to_string(),
            "expression type 'Modulo' is not supported"
        );
        assert_eq!(
            Error::UnsupportedField {
                operator: "GreaterThan".into()
            }
            .to_string(),
            "operator 'GreaterThan' can only be applied on properties and property indexers"
        );
        assert_eq!(
            Error::FieldNotFound {
                name: "Epic Link".into()
            }
            .to_string(),
            "custom field 'Epic Link' was not found"
        );
    }

    #[test]
    fn test_translation_classification() {
        assert!(Error::not_supported("Not").is_translation_error());
        assert!(Error::Evaluation("boom".into()).is_translation_error());
        assert!(!Error::Cancelled.is_translation_error());
        assert!(!Error::Fetch("down".into()).is_translation_error());
    }
}
