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

use async_trait::async_trait;
use jira_jql::jql::error::BoxError;
use jira_jql::jql::{
    CancellationSignal, CustomField, CustomFieldSource, Error, Page, PageFetcher, QueryProvider,
    Queryable, Result,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub key: String,
    pub votes: u32,
}

#[allow(dead_code)]
impl Issue {
    pub fn new(key: &str, votes: u32) -> Self {
        Self {
            key: key.to_string(),
            votes,
        }
    }
}

pub fn sample_issues() -> Vec<Issue> {
    vec![
        Issue::new("TST-1", 0),
        Issue::new("TST-2", 3),
        Issue::new("TST-3", 7),
        Issue::new("TST-4", 12),
    ]
}

/// Arguments of one `fetch_page` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCall {
    pub jql: String,
    pub max_results: Option<u32>,
    pub start_at: u32,
}

impl FetchCall {
    #[allow(dead_code)]
    pub fn new(jql: &str, max_results: Option<u32>, start_at: u32) -> Self {
        Self {
            jql: jql.to_string(),
            max_results,
            start_at,
        }
    }
}

enum Response {
    Items(Vec<Issue>),
    Fail(String),
    Hang,
}

/// In-memory fetcher that records every call.
pub struct RecordingFetcher {
    calls: Mutex<Vec<FetchCall>>,
    response: Response,
}

#[allow(dead_code)]
impl RecordingFetcher {
    pub fn returning(items: Vec<Issue>) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            response: Response::Items(items),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            response: Response::Fail(message.to_string()),
        })
    }

    /// Never answers; only cancellation ends the request.
    pub fn hanging() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            response: Response::Hang,
        })
    }

    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PageFetcher<Issue> for RecordingFetcher {
    async fn fetch_page(
        &self,
        jql: &str,
        max_results: Option<u32>,
        start_at: u32,
        _cancel: &CancellationSignal,
    ) -> Result<Page<Issue>> {
        self.calls.lock().unwrap().push(FetchCall {
            jql: jql.to_string(),
            max_results,
            start_at,
        });
        match &self.response {
            Response::Items(items) => {
                let total = items.len() as u32;
                Ok(Page::new(
                    items.clone(),
                    start_at,
                    max_results.unwrap_or(20),
                    total,
                ))
            }
            Response::Fail(message) => {
                let err: BoxError = Box::new(std::io::Error::other(message.clone()));
                Err(Error::Fetch(err))
            }
            Response::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Page::new(Vec::new(), start_at, 0, 0))
            }
        }
    }
}

#[allow(dead_code)]
pub fn queryable(fetcher: &Arc<RecordingFetcher>) -> Queryable<Issue> {
    Queryable::new(QueryProvider::new(
        Arc::clone(fetcher) as Arc<dyn PageFetcher<Issue>>
    ))
}

/// Custom field source backed by a fixed list, counting lookups.
#[allow(dead_code)]
pub struct StaticFieldSource {
    fields: Vec<CustomField>,
    lookups: AtomicUsize,
}

#[allow(dead_code)]
impl StaticFieldSource {
    pub fn new(names: &[&str]) -> Arc<Self> {
        let fields = names
            .iter()
            .enumerate()
            .map(|(i, name)| CustomField {
                id: format!("customfield_{}", 10000 + i),
                name: name.to_string(),
                custom_type: None,
            })
            .collect();
        Arc::new(Self {
            fields,
            lookups: AtomicUsize::new(0),
        })
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CustomFieldSource for StaticFieldSource {
    async fn fetch_custom_field(&self, name: &str) -> Result<Option<CustomField>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.fields.iter().find(|f| f.name == name).cloned())
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
