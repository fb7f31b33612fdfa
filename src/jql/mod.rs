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

//! JQL translation and execution of deferred issue queries

pub mod compiler;
pub mod custom_fields;
pub mod error;
pub mod expr;
pub mod fetch;
pub mod field;
pub mod fold;
pub mod page;
pub mod pipeline;
pub mod predicate;
pub mod provider;
pub mod queryable;
pub mod search;
pub mod substitute;
pub mod value;

pub use compiler::{OrderClause, QueryCompiler, QueryDirective};
pub use custom_fields::{CustomField, CustomFieldRegistry, CustomFieldSource};
pub use error::{Error, Result};
pub use expr::{Expr, custom_field, field};
pub use fetch::{CancellationSignal, PageFetcher};
pub use field::{ComparisonPolicy, FieldRegistry, ISSUE_FIELDS};
pub use page::Page;
pub use pipeline::{Direction, PipelineNode};
pub use provider::QueryProvider;
pub use queryable::Queryable;
pub use search::{ProviderSettings, SearchRequest};
pub use value::{ComparableString, LiteralDateTime, LiteralMatch, Value};
