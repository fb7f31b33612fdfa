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

//! Executes compiled pipelines against a [`PageFetcher`].
//!
//! Every execution compiles the pipeline and issues a fresh fetch; nothing is
//! cached between enumerations.

use crate::jql::compiler::{QueryCompiler, QueryDirective};
use crate::jql::custom_fields::CustomFieldRegistry;
use crate::jql::error::{Error, Result};
use crate::jql::fetch::{CancellationSignal, PageFetcher};
use crate::jql::field::{FieldRegistry, ISSUE_FIELDS};
use crate::jql::page::Page;
use crate::jql::pipeline::PipelineNode;
use crate::jql::search::{ProviderSettings, SearchRequest};
use crate::jql::substitute::substitute;
use futures_util::future::{Either, select};
use std::fmt;
use std::sync::Arc;

/// Connects pipelines to the remote collection.
pub struct QueryProvider<R> {
    fetcher: Arc<dyn PageFetcher<R>>,
    fields: Arc<FieldRegistry>,
    custom_fields: Option<Arc<CustomFieldRegistry>>,
    settings: ProviderSettings,
}

impl<R> Clone for QueryProvider<R> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            fields: Arc::clone(&self.fields),
            custom_fields: self.custom_fields.clone(),
            settings: self.settings.clone(),
        }
    }
}

impl<R> fmt::Debug for QueryProvider<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryProvider")
            .field("fields", &self.fields.len())
            .field("custom_fields", &self.custom_fields.is_some())
            .field("settings", &self.settings)
            .finish()
    }
}

impl<R> QueryProvider<R> {
    /// Creates a provider using the default issue field table.
    pub fn new(fetcher: Arc<dyn PageFetcher<R>>) -> Self {
        Self {
            fetcher,
            fields: Arc::new(ISSUE_FIELDS.clone()),
            custom_fields: None,
            settings: ProviderSettings::default(),
        }
    }

    pub fn with_fields(mut self, fields: FieldRegistry) -> Self {
        self.fields = Arc::new(fields);
        self
    }

    /// Validates indexer field names through `registry` before each fetch.
    pub fn with_custom_fields(mut self, registry: Arc<CustomFieldRegistry>) -> Self {
        self.custom_fields = Some(registry);
        self
    }

    pub fn with_settings(mut self, settings: ProviderSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    pub fn fields(&self) -> &FieldRegistry {
        &self.fields
    }

    /// Compiles `node` without performing any I/O.
    pub fn translate(&self, node: &PipelineNode<R>) -> Result<QueryDirective> {
        QueryCompiler::new(&self.fields).compile(node)
    }

    /// Request body a JSON transport would send for `node`.
    pub fn search_request(&self, node: &PipelineNode<R>) -> Result<SearchRequest> {
        Ok(SearchRequest::from_directive(&self.translate(node)?, &self.settings))
    }

    /// Compiles `node` and fetches the matching page.
    ///
    /// Translation and custom field errors are returned before the fetcher is
    /// called. Fetch errors are passed through unchanged.
    pub async fn fetch(
        &self,
        node: &PipelineNode<R>,
        cancel: &CancellationSignal,
    ) -> Result<Page<R>> {
        let directive = self.translate(node)?;
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        if let Some(registry) = &self.custom_fields {
            if !directive.custom_fields.is_empty() {
                let lookups = Box::pin(async {
                    for name in &directive.custom_fields {
                        registry.resolve(name).await?;
                    }
                    Ok::<(), Error>(())
                });
                match select(lookups, Box::pin(cancel.cancelled())).await {
                    Either::Left((resolved, _)) => resolved?,
                    Either::Right(((), _)) => {
                        log::debug!("Custom field lookup cancelled");
                        return Err(Error::Cancelled);
                    }
                }
            }
        }

        let jql = directive.jql();
        let start_at = directive.start_at.unwrap_or(0);
        if self.settings.enable_request_trace {
            log::info!(
                "JQL request: '{jql}' (max_results: {:?}, start_at: {start_at})",
                directive.max_results
            );
        } else {
            log::debug!(
                "JQL request: '{jql}' (max_results: {:?}, start_at: {start_at})",
                directive.max_results
            );
        }

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let request = self
            .fetcher
            .fetch_page(&jql, directive.max_results, start_at, cancel);
        let cancelled = Box::pin(cancel.cancelled());
        match select(request, cancelled).await {
            Either::Left((page, _)) => page,
            Either::Right(((), _)) => {
                log::debug!("JQL request cancelled: '{jql}'");
                Err(Error::Cancelled)
            }
        }
    }

    /// Direct enumeration: the fetched page is the result.
    pub async fn execute_enumerable(
        &self,
        node: &PipelineNode<R>,
        cancel: &CancellationSignal,
    ) -> Result<Page<R>> {
        self.fetch(node, cancel).await
    }

    /// Fetches, then runs the stages with no JQL counterpart over the page.
    pub async fn execute_local(
        &self,
        node: &PipelineNode<R>,
        cancel: &CancellationSignal,
    ) -> Result<Vec<R>> {
        let page = self.fetch(node, cancel).await?;
        if !node.has_local_stages() {
            return Ok(page.items);
        }
        let plan = substitute(node, page.items);
        log::trace!("Running {} stage(s) locally: {plan:?}", plan.local_stages());
        Ok(plan.execute())
    }
}
