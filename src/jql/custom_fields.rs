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

//! Read-through cache of custom field metadata shared across queries.
//!
//! Each field name owns a [`OnceCell`]; the first caller populates it from the
//! [`CustomFieldSource`], concurrent callers for the same name wait on that
//! population instead of issuing their own request. A failed population leaves
//! the cell empty so a later lookup retries.

use crate::jql::error::{Error, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Metadata of a custom field as known by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomField {
    pub id: String,
    pub name: String,
    pub custom_type: Option<String>,
}

/// Remote source of custom field metadata.
#[async_trait]
pub trait CustomFieldSource: Send + Sync {
    /// Looks up a custom field by name; `Ok(None)` when the server does not know it.
    async fn fetch_custom_field(&self, name: &str) -> Result<Option<CustomField>>;
}

/// Process-wide custom field cache.
pub struct CustomFieldRegistry {
    source: Arc<dyn CustomFieldSource>,
    fields: DashMap<String, Arc<OnceCell<CustomField>>>,
}

impl CustomFieldRegistry {
    pub fn new(source: Arc<dyn CustomFieldSource>) -> Self {
        Self {
            source,
            fields: DashMap::new(),
        }
    }

    /// Returns the field called `name`, fetching it on first access.
    pub async fn resolve(&self, name: &str) -> Result<CustomField> {
        // clone the cell out so the shard lock is not held across the await
        let cell = self
            .fields
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        cell.get_or_try_init(|| async {
            log::debug!("Populating custom field metadata for '{name}'");
            self.source
                .fetch_custom_field(name)
                .await?
                .ok_or_else(|| Error::FieldNotFound {
                    name: name.to_string(),
                })
        })
        .await
        .cloned()
    }

    /// Returns the cached field without fetching.
    pub fn cached(&self, name: &str) -> Option<CustomField> {
        self.fields
            .get(name)
            .and_then(|cell| cell.get().cloned())
    }

    /// Seeds the cache with known fields; existing entries are kept.
    pub fn insert_all(&self, fields: impl IntoIterator<Item = CustomField>) -> bool {
        let mut added = false;
        for field in fields {
            let cell = self
                .fields
                .entry(field.name.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone();
            added = cell.set(field).is_ok() || added;
        }
        added
    }
}

impl std::fmt::Debug for CustomFieldRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomFieldRegistry")
            .field("cached", &self.fields.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::future::join_all;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingSource {
        calls: AtomicUsize,
        fail_first: bool,
    }

    #[async_trait]
    impl CustomFieldSource for CountingSource {
        async fn fetch_custom_field(&self, name: &str) -> Result<Option<CustomField>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            if self.fail_first && call == 0 {
                return Err(Error::Fetch("metadata endpoint unavailable".into()));
            }
            if name == "Missing" {
                return Ok(None);
            }
            Ok(Some(CustomField {
                id: format!("customfield_{}", name.len()),
                name: name.to_string(),
                custom_type: None,
            }))
        }
    }

    fn registry(fail_first: bool) -> (Arc<CountingSource>, CustomFieldRegistry) {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            fail_first,
        });
        (source.clone(), CustomFieldRegistry::new(source))
    }

    #[tokio::test]
    async fn test_concurrent_first_access_populates_once() {
        let (source, registry) = registry(false);
        let registry = Arc::new(registry);

        let lookups = (0..8).map(|_| {
            let registry = registry.clone();
            tokio::spawn(async move { registry.resolve("Epic Link").await })
        });
        let results = join_all(lookups).await;

        for result in results {
            let field = result.unwrap().unwrap();
            assert_eq!(field.id, "customfield_9");
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(registry.cached("Epic Link").is_some());
    }

    #[tokio::test]
    async fn test_unknown_field_is_reported_by_name() {
        let (_, registry) = registry(false);
        let err = registry.resolve("Missing").await.unwrap_err();
        assert!(matches!(err, Error::FieldNotFound { ref name } if name == "Missing"));
        assert!(registry.cached("Missing").is_none());
    }

    #[tokio::test]
    async fn test_failed_population_is_retried() {
        let (source, registry) = registry(true);
        assert!(registry.resolve("Team").await.is_err());
        assert!(registry.resolve("Team").await.is_ok());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_seeded_fields_skip_the_source() {
        let (source, registry) = registry(false);
        assert!(registry.insert_all([CustomField {
            id: "customfield_10000".into(),
            name: "Sprint".into(),
            custom_type: Some("com.pyxis.greenhopper.jira:gh-sprint".into()),
        }]));
        let field = registry.resolve("Sprint").await.unwrap();
        assert_eq!(field.id, "customfield_10000");
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }
}
