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

//! Paginated fetch contract and request cancellation.

use crate::jql::error::Result;
use crate::jql::page::Page;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

/// Executes JQL against the remote collection and returns one page.
///
/// Implementations own transport, authentication and deserialization. The
/// returned page is handed to the caller exactly as produced.
#[async_trait]
pub trait PageFetcher<R>: Send + Sync {
    /// Fetches the page of records matching `jql`.
    ///
    /// # Parameters
    ///
    /// * `jql` - Filter and `order by` text
    /// * `max_results` - Page size requested by the query, `None` for the server default
    /// * `start_at` - Index of the first record
    /// * `cancel` - Signal that aborts the request when fired
    async fn fetch_page(
        &self,
        jql: &str,
        max_results: Option<u32>,
        start_at: u32,
        cancel: &CancellationSignal,
    ) -> Result<Page<R>>;
}

#[derive(Debug, Default)]
struct SignalState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cloneable cancellation flag; all clones observe the same signal.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    state: Arc<SignalState>,
}

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the signal and wakes every waiter.
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
        self.state.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// Completes once the signal has fired.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.state.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancel_wakes_waiters() {
        let signal = CancellationSignal::new();
        let waiter = signal.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });

        tokio::time::sleep(Duration::from_millis(5)).await;
        signal.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("waiter was not woken")
            .unwrap();
        assert!(signal.is_cancelled());
    }

    #[tokio::test]
    async fn test_already_cancelled_returns_immediately() {
        let signal = CancellationSignal::new();
        signal.cancel();
        tokio::time::timeout(Duration::from_millis(100), signal.cancelled())
            .await
            .expect("cancelled() should complete");
    }
}
