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

//! Deferred query over a remote issue collection.
//!
//! Builder methods only record a new pipeline stage and never perform I/O.
//! Terminal methods compile the pipeline, fetch one page and, when needed,
//! finish the work locally. Each terminal call is a separate remote round
//! trip.

use crate::jql::compiler::QueryDirective;
use crate::jql::error::{Error, Result};
use crate::jql::expr::Expr;
use crate::jql::fetch::CancellationSignal;
use crate::jql::page::Page;
use crate::jql::pipeline::{Direction, PipelineNode};
use crate::jql::provider::QueryProvider;
use std::fmt;
use std::sync::Arc;

/// Immutable query description bound to a provider.
///
/// # Example
///
/// ```ignore
/// let issues = Queryable::new(provider)
///     .filter(field("Project").eq("TST").and(field("Status").ne("Closed")))
///     .order_by(field("Created"))
///     .take(10);
///
/// assert_eq!(
///     issues.directive()?.jql(),
///     "(Project = \"TST\" and Status != \"Closed\") order by Created asc"
/// );
/// let first_ten = issues.to_vec().await?;
/// ```
pub struct Queryable<R> {
    provider: Arc<QueryProvider<R>>,
    pipeline: Arc<PipelineNode<R>>,
    cancel: CancellationSignal,
}

impl<R> Clone for Queryable<R> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            pipeline: Arc::clone(&self.pipeline),
            cancel: self.cancel.clone(),
        }
    }
}

impl<R> fmt::Debug for Queryable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queryable")
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

impl<R> Queryable<R> {
    /// Starts a query over the whole remote collection.
    pub fn new(provider: QueryProvider<R>) -> Self {
        Self::with_provider(Arc::new(provider))
    }

    pub fn with_provider(provider: Arc<QueryProvider<R>>) -> Self {
        Self {
            provider,
            pipeline: PipelineNode::source(),
            cancel: CancellationSignal::new(),
        }
    }

    /// Aborts the remote calls of this query and every query derived from it
    /// when `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationSignal) -> Self {
        self.cancel = cancel;
        self
    }

    fn push(&self, node: PipelineNode<R>) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            pipeline: Arc::new(node),
            cancel: self.cancel.clone(),
        }
    }

    fn prev(&self) -> Arc<PipelineNode<R>> {
        Arc::clone(&self.pipeline)
    }

    pub fn filter(&self, predicate: impl Into<Expr>) -> Self {
        self.push(PipelineNode::Filter {
            predicate: predicate.into(),
            prev: self.prev(),
        })
    }

    fn ordered(&self, key: impl Into<Expr>, direction: Direction, then: bool) -> Self {
        self.push(PipelineNode::OrderBy {
            key: key.into(),
            direction,
            then,
            prev: self.prev(),
        })
    }

    pub fn order_by(&self, key: impl Into<Expr>) -> Self {
        self.ordered(key, Direction::Ascending, false)
    }

    pub fn order_by_descending(&self, key: impl Into<Expr>) -> Self {
        self.ordered(key, Direction::Descending, false)
    }

    pub fn then_by(&self, key: impl Into<Expr>) -> Self {
        self.ordered(key, Direction::Ascending, true)
    }

    pub fn then_by_descending(&self, key: impl Into<Expr>) -> Self {
        self.ordered(key, Direction::Descending, true)
    }

    /// Limits the page size sent to the server.
    pub fn take(&self, count: u32) -> Self {
        self.push(PipelineNode::Take {
            count,
            prev: self.prev(),
        })
    }

    /// Sets the start index sent to the server.
    pub fn skip(&self, count: u32) -> Self {
        self.push(PipelineNode::Skip {
            count,
            prev: self.prev(),
        })
    }

    /// Adds a predicate that is evaluated on the fetched records only.
    ///
    /// Local stages must be the last stages of a query. Adding `filter`,
    /// ordering, `take` or `skip` after this one makes the query fail to
    /// translate.
    pub fn filter_local<F>(&self, predicate: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        self.push(PipelineNode::LocalFilter {
            predicate: Arc::new(predicate),
            prev: self.prev(),
        })
    }

    pub fn pipeline(&self) -> &PipelineNode<R> {
        &self.pipeline
    }

    pub fn provider(&self) -> &QueryProvider<R> {
        &self.provider
    }

    /// Compiles the pipeline without fetching.
    pub fn directive(&self) -> Result<QueryDirective> {
        self.provider.translate(&self.pipeline)
    }

    /// Fetches the page for the pushed-down stages; local stages are not applied.
    pub async fn page(&self) -> Result<Page<R>> {
        self.provider
            .execute_enumerable(&self.pipeline, &self.cancel)
            .await
    }

    /// Enumerates the query.
    ///
    /// Without local stages the fetched page is returned as is.
    pub async fn to_vec(&self) -> Result<Vec<R>> {
        if self.pipeline.has_local_stages() {
            self.provider.execute_local(&self.pipeline, &self.cancel).await
        } else {
            Ok(self.page().await?.items)
        }
    }

    pub async fn count(&self) -> Result<usize> {
        Ok(self.to_vec().await?.len())
    }

    pub async fn any(&self) -> Result<bool> {
        Ok(!self.to_vec().await?.is_empty())
    }

    pub async fn first(&self) -> Result<R> {
        self.first_or_none().await?.ok_or(Error::EmptySequence)
    }

    pub async fn first_or_none(&self) -> Result<Option<R>> {
        Ok(self.to_vec().await?.into_iter().next())
    }

    /// Returns the only record; fails when there are none or several.
    pub async fn single(&self) -> Result<R> {
        let mut items = self.to_vec().await?.into_iter();
        let first = items.next().ok_or(Error::EmptySequence)?;
        match items.next() {
            Some(_) => Err(Error::MoreThanOneElement),
            None => Ok(first),
        }
    }

    /// Projects every record.
    pub async fn select<U, F>(&self, projection: F) -> Result<Vec<U>>
    where
        F: Fn(&R) -> U,
    {
        Ok(self.to_vec().await?.iter().map(projection).collect())
    }

    pub async fn fold<A, F>(&self, init: A, f: F) -> Result<A>
    where
        F: FnMut(A, &R) -> A,
    {
        Ok(self.to_vec().await?.iter().fold(init, f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jql::expr::field;
    use crate::jql::fetch::PageFetcher;
    use async_trait::async_trait;

    struct Unreachable;

    #[async_trait]
    impl PageFetcher<u32> for Unreachable {
        async fn fetch_page(
            &self,
            _jql: &str,
            _max_results: Option<u32>,
            _start_at: u32,
            _cancel: &CancellationSignal,
        ) -> Result<Page<u32>> {
            panic!("builders must not fetch");
        }
    }

    fn query() -> Queryable<u32> {
        Queryable::new(QueryProvider::new(
            Arc::new(Unreachable) as Arc<dyn PageFetcher<u32>>
        ))
    }

    #[test]
    fn test_builders_do_not_mutate_the_receiver() {
        let base = query().filter(field("Project").eq("TST"));
        let narrowed = base.filter(field("Status").eq("Open")).take(5);

        assert_eq!(base.directive().unwrap().jql(), "Project = \"TST\"");
        let directive = narrowed.directive().unwrap();
        assert_eq!(directive.jql(), "Project = \"TST\" and Status = \"Open\"");
        assert_eq!(directive.max_results, Some(5));
    }

    #[test]
    fn test_method_names_follow_stage_kind() {
        let q = query()
            .order_by(field("Created"))
            .then_by_descending(field("Key"))
            .skip(2);
        let names: Vec<_> = q.pipeline().stages().map(|s| s.method_name()).collect();
        assert_eq!(names, vec!["Skip", "ThenByDescending", "OrderBy", "Source"]);
    }

    #[test]
    fn test_local_filter_is_not_compiled() {
        let q = query()
            .filter(field("Project").eq("TST"))
            .filter_local(|n| *n > 3);
        assert_eq!(q.directive().unwrap().jql(), "Project = \"TST\"");
        assert!(q.pipeline().has_local_stages());
    }
}
