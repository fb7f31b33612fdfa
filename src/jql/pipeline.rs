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

//! Immutable query pipelines.
//!
//! Each stage wraps the previous one, so the newest stage is the outermost
//! node and [`PipelineNode::Source`] is always the innermost. Nodes are shared
//! through [`Arc`] and never mutated; adding a stage allocates one new node.

use crate::jql::expr::Expr;
use std::fmt;
use std::sync::Arc;

/// Local predicate evaluated against fetched records.
pub type LocalPredicate<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;

/// Sort direction of an ordering stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stage of a query pipeline.
pub enum PipelineNode<R> {
    /// The remote collection
    Source,
    Filter {
        predicate: Expr,
        prev: Arc<PipelineNode<R>>,
    },
    OrderBy {
        key: Expr,
        direction: Direction,
        /// `then_by` rather than `order_by`
        then: bool,
        prev: Arc<PipelineNode<R>>,
    },
    Take {
        count: u32,
        prev: Arc<PipelineNode<R>>,
    },
    Skip {
        count: u32,
        prev: Arc<PipelineNode<R>>,
    },
    /// Predicate with no JQL counterpart, always evaluated on fetched records
    LocalFilter {
        predicate: LocalPredicate<R>,
        prev: Arc<PipelineNode<R>>,
    },
}

impl<R> PipelineNode<R> {
    pub fn source() -> Arc<Self> {
        Arc::new(PipelineNode::Source)
    }

    /// Stage name, as the equivalent method call would be named.
    pub fn method_name(&self) -> &'static str {
        match self {
            PipelineNode::Source => "Source",
            PipelineNode::Filter { .. } => "Where",
            PipelineNode::OrderBy {
                direction, then, ..
            } => match (then, direction) {
                (false, Direction::Ascending) => "OrderBy",
                (false, Direction::Descending) => "OrderByDescending",
                (true, Direction::Ascending) => "ThenBy",
                (true, Direction::Descending) => "ThenByDescending",
            },
            PipelineNode::Take { .. } => "Take",
            PipelineNode::Skip { .. } => "Skip",
            PipelineNode::LocalFilter { .. } => "LocalWhere",
        }
    }

    /// Stage that is sent to the server as part of the JQL request.
    pub fn is_pushed_down(&self) -> bool {
        !matches!(
            self,
            PipelineNode::Source | PipelineNode::LocalFilter { .. }
        )
    }

    pub fn prev(&self) -> Option<&Arc<PipelineNode<R>>> {
        match self {
            PipelineNode::Source => None,
            PipelineNode::Filter { prev, .. }
            | PipelineNode::OrderBy { prev, .. }
            | PipelineNode::Take { prev, .. }
            | PipelineNode::Skip { prev, .. }
            | PipelineNode::LocalFilter { prev, .. } => Some(prev),
        }
    }

    /// Iterates from the outermost (newest) stage down to the source.
    pub fn stages(&self) -> Stages<'_, R> {
        Stages { next: Some(self) }
    }

    /// True when any stage must run locally.
    pub fn has_local_stages(&self) -> bool {
        self.stages()
            .any(|node| matches!(node, PipelineNode::LocalFilter { .. }))
    }
}

/// Iterator over pipeline stages, outermost first.
pub struct Stages<'a, R> {
    next: Option<&'a PipelineNode<R>>,
}

impl<'a, R> Iterator for Stages<'a, R> {
    type Item = &'a PipelineNode<R>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.prev().map(Arc::as_ref);
        Some(current)
    }
}

impl<R> fmt::Debug for PipelineNode<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineNode::Source => f.write_str("Source"),
            PipelineNode::Filter { predicate, prev } => {
                write!(f, "{prev:?}.Where({predicate:?})")
            }
            PipelineNode::OrderBy { key, prev, .. } => {
                write!(f, "{prev:?}.{}({key:?})", self.method_name())
            }
            PipelineNode::Take { count, prev } => write!(f, "{prev:?}.Take({count})"),
            PipelineNode::Skip { count, prev } => write!(f, "{prev:?}.Skip({count})"),
            PipelineNode::LocalFilter { prev, .. } => write!(f, "{prev:?}.LocalWhere(<fn>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jql::expr::field;

    #[test]
    fn test_stages_walk_outermost_first() {
        let source = PipelineNode::<()>::source();
        let filtered = Arc::new(PipelineNode::Filter {
            predicate: field("Project").eq("TST"),
            prev: source.clone(),
        });
        let taken = Arc::new(PipelineNode::Take {
            count: 10,
            prev: filtered.clone(),
        });

        let names: Vec<_> = taken.stages().map(PipelineNode::method_name).collect();
        assert_eq!(names, vec!["Take", "Where", "Source"]);

        // the wrapped node is shared, not copied
        assert!(Arc::ptr_eq(taken.prev().unwrap(), &filtered));
        assert_eq!(format!("{taken:?}"), "Source.Where((x.Project Equal \"TST\")).Take(10)");
    }

    #[test]
    fn test_local_stage_detection() {
        let source = PipelineNode::<u32>::source();
        assert!(!source.has_local_stages());
        let local = Arc::new(PipelineNode::LocalFilter {
            predicate: Arc::new(|n: &u32| *n > 1),
            prev: source,
        });
        assert!(local.has_local_stages());
        assert!(!local.is_pushed_down());
    }
}
