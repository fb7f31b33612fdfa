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

//! Rewrites a pipeline so that only its local tail remains.
//!
//! The source and every stage already satisfied by the server are replaced by
//! the fetched records. Stages with no JQL counterpart stay in place and run
//! over those records.

use crate::jql::pipeline::{LocalPredicate, PipelineNode};
use std::fmt;

/// Pipeline rebuilt over fetched records.
pub enum LocalPlan<R> {
    /// Records fetched from the server
    Materialized(Vec<R>),
    Filter {
        predicate: LocalPredicate<R>,
        input: Box<LocalPlan<R>>,
    },
}

/// Replaces the source and pushed-down stages of `node` with `items`.
///
/// `node` must have compiled: the compiler rejects local stages below a
/// pushed-down stage, so everything under the first non-local stage is
/// already reflected in `items`.
pub fn substitute<R>(node: &PipelineNode<R>, items: Vec<R>) -> LocalPlan<R> {
    match node {
        PipelineNode::LocalFilter { predicate, prev } => LocalPlan::Filter {
            predicate: predicate.clone(),
            input: Box::new(substitute(prev, items)),
        },
        // Skip is replaced along with Where, OrderBy and Take: the page
        // already starts at `startAt`, so skipping again would drop records.
        _ => LocalPlan::Materialized(items),
    }
}

impl<R> LocalPlan<R> {
    /// Runs the local stages and returns the resulting records.
    pub fn execute(self) -> Vec<R> {
        match self {
            LocalPlan::Materialized(items) => items,
            LocalPlan::Filter { predicate, input } => {
                let items = input.execute();
                log::trace!("Applying local filter to {} fetched records", items.len());
                items.into_iter().filter(|item| predicate(item)).collect()
            }
        }
    }

    /// Number of stages that run locally.
    pub fn local_stages(&self) -> usize {
        match self {
            LocalPlan::Materialized(_) => 0,
            LocalPlan::Filter { input, .. } => 1 + input.local_stages(),
        }
    }
}

impl<R> fmt::Debug for LocalPlan<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalPlan::Materialized(items) => write!(f, "Materialized({} items)", items.len()),
            LocalPlan::Filter { input, .. } => write!(f, "{input:?}.LocalWhere(<fn>)"),
        }
    }
}
