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

mod common;

use async_trait::async_trait;
use common::{Issue, RecordingFetcher, StaticFieldSource, init_logger, sample_issues};
use futures_util::future::join_all;
use jira_jql::jql::{
    CancellationSignal, CustomField, CustomFieldRegistry, CustomFieldSource, Error, PageFetcher,
    QueryProvider, Queryable, Result, custom_field, field,
};
use std::sync::Arc;
use std::time::Duration;

fn provider(
    fetcher: &Arc<RecordingFetcher>,
    source: &Arc<StaticFieldSource>,
) -> Arc<QueryProvider<Issue>> {
    let registry = CustomFieldRegistry::new(Arc::clone(source) as Arc<dyn CustomFieldSource>);
    Arc::new(
        QueryProvider::new(Arc::clone(fetcher) as Arc<dyn PageFetcher<Issue>>)
            .with_custom_fields(Arc::new(registry)),
    )
}

#[tokio::test]
async fn unknown_custom_field_fails_before_fetch() {
    init_logger();
    let fetcher = RecordingFetcher::returning(sample_issues());
    let source = StaticFieldSource::new(&["Epic Link"]);
    let issues = Queryable::with_provider(provider(&fetcher, &source))
        .filter(custom_field("Sprint").eq("Sprint 7"));

    let err = issues.to_vec().await.unwrap_err();
    assert!(matches!(err, Error::FieldNotFound { ref name } if name == "Sprint"));
    assert!(err.is_translation_error());
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn known_custom_field_is_fetched_once() {
    let fetcher = RecordingFetcher::returning(sample_issues());
    let source = StaticFieldSource::new(&["Epic Link", "Story Points"]);
    let issues = Queryable::with_provider(provider(&fetcher, &source))
        .filter(field("Project").eq("TST"))
        .filter(
            custom_field("Epic Link")
                .eq("TST-9")
                .and(custom_field("Story Points").ge(3)),
        );

    issues.to_vec().await.unwrap();
    issues.to_vec().await.unwrap();

    assert_eq!(fetcher.call_count(), 2);
    assert_eq!(
        fetcher.calls()[0].jql,
        "Project = \"TST\" and (\"Epic Link\" ~ \"TST-9\" and \"Story Points\" >= 3)"
    );
    assert_eq!(source.lookups(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_queries_share_one_lookup() {
    let fetcher = RecordingFetcher::returning(sample_issues());
    let source = StaticFieldSource::new(&["Epic Link"]);
    let provider = provider(&fetcher, &source);

    let mut handles = Vec::new();
    for i in 0..8 {
        let query = Queryable::with_provider(Arc::clone(&provider))
            .filter(custom_field("Epic Link").eq(format!("TST-{i}")));
        handles.push(tokio::spawn(async move { query.count().await }));
    }

    for count in join_all(handles).await {
        assert_eq!(count.unwrap().unwrap(), 4);
    }
    assert_eq!(fetcher.call_count(), 8);
    assert_eq!(source.lookups(), 1);
}

/// Field source that never answers.
struct StalledFieldSource;

#[async_trait]
impl CustomFieldSource for StalledFieldSource {
    async fn fetch_custom_field(&self, _name: &str) -> Result<Option<CustomField>> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(None)
    }
}

#[tokio::test]
async fn cancellation_aborts_custom_field_lookup() {
    let fetcher = RecordingFetcher::returning(sample_issues());
    let registry = CustomFieldRegistry::new(Arc::new(StalledFieldSource));
    let provider = QueryProvider::new(Arc::clone(&fetcher) as Arc<dyn PageFetcher<Issue>>)
        .with_custom_fields(Arc::new(registry));
    let cancel = CancellationSignal::new();
    let issues = Queryable::new(provider)
        .filter(custom_field("Epic Link").eq("TST-9"))
        .with_cancellation(cancel.clone());

    let (result, _) = tokio::join!(issues.to_vec(), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
    });

    assert!(matches!(result, Err(Error::Cancelled)));
    assert_eq!(fetcher.call_count(), 0);

    // a signal that already fired never reaches the lookup
    assert!(matches!(issues.count().await, Err(Error::Cancelled)));
}
