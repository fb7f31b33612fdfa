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

//! # Jira JQL (`jira-jql`)
//!
//! Deferred, strongly-typed queries over a paginated Jira issue collection.
//!
//! A [`jql::Queryable`] records filters, ordering and paging as an immutable
//! pipeline. Enumerating it compiles the pipeline to JQL, fetches one page
//! through a user supplied [`jql::PageFetcher`] and evaluates any stage that
//! has no JQL counterpart on the fetched records.
//!
//! ## Basic Usage
//!
//! ```ignore
//! use jira_jql::jql::{Queryable, QueryProvider, field, Value};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> jira_jql::jql::Result<()> {
//!     let provider = QueryProvider::new(Arc::new(MyHttpFetcher::new()));
//!
//!     let open_bugs = Queryable::new(provider)
//!         .filter(field("Project").eq("TST"))
//!         .filter(field("Type").eq("Bug").and(field("Resolution").eq(Value::Null)))
//!         .order_by_descending(field("Created"))
//!         .take(50);
//!
//!     for issue in open_bugs.to_vec().await? {
//!         println!("{issue:?}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Design
//! - Builder calls never perform I/O; every terminal call is a fresh remote round trip
//! - Translation errors are reported before the fetcher is called
//! - Transport is left to the caller through the async [`jql::PageFetcher`] trait

#![allow(clippy::should_implement_trait)]
pub mod jql;
