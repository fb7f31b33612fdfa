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

//! Provider settings and the search request body built from them.

use crate::jql::compiler::QueryDirective;
use serde::Serialize;
use typed_builder::TypedBuilder;

/// Page size used when a query has no `take`.
pub const DEFAULT_MAX_RESULTS_PER_REQUEST: u32 = 20;

/// Settings of a [`QueryProvider`](crate::jql::provider::QueryProvider).
#[derive(Clone, Debug, TypedBuilder)]
pub struct ProviderSettings {
    /// Page size for queries without `take`
    #[builder(default = DEFAULT_MAX_RESULTS_PER_REQUEST)]
    pub max_results_per_request: u32,
    /// Ask the server to validate the JQL
    #[builder(default = true)]
    pub validate_query: bool,
    /// Log every compiled query at `info` instead of `debug`
    #[builder(default)]
    pub enable_request_trace: bool,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Body of a JQL search request, as POSTed to `rest/api/2/search`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub jql: String,
    pub start_at: u32,
    pub max_results: u32,
    pub validate_query: bool,
}

impl SearchRequest {
    /// Builds the request for the arguments a [`PageFetcher`](crate::jql::fetch::PageFetcher)
    /// receives; a missing page size falls back to the settings.
    pub fn new(
        jql: impl Into<String>,
        max_results: Option<u32>,
        start_at: u32,
        settings: &ProviderSettings,
    ) -> Self {
        Self {
            jql: jql.into(),
            start_at,
            max_results: max_results.unwrap_or(settings.max_results_per_request),
            validate_query: settings.validate_query,
        }
    }

    pub fn from_directive(directive: &QueryDirective, settings: &ProviderSettings) -> Self {
        Self::new(
            directive.jql(),
            directive.max_results,
            directive.start_at.unwrap_or(0),
            settings,
        )
    }
}
