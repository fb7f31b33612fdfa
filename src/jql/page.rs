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

//! One page of a paginated remote collection.

use crate::jql::error::Result;
use serde_json::Value as JsonValue;

/// Page of records as returned by the fetch collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<R> {
    pub items: Vec<R>,
    /// Index of the first item of this page within the full result
    pub start_at: u32,
    /// Maximum number of items per page
    pub items_per_page: u32,
    /// Number of items available on the server
    pub total_items: u32,
}

impl<R> Page<R> {
    pub fn new(items: Vec<R>, start_at: u32, items_per_page: u32, total_items: u32) -> Self {
        Self {
            items,
            start_at,
            items_per_page,
            total_items,
        }
    }

    /// Builds a page from the paging metadata of a Jira search response.
    ///
    /// Reads `startAt`, `maxResults` and `total`; missing or null keys are 0.
    pub fn from_json(paged: &JsonValue, items: Vec<R>) -> Result<Self> {
        Ok(Self {
            items,
            start_at: read_u32(paged, "startAt")?,
            items_per_page: read_u32(paged, "maxResults")?,
            total_items: read_u32(paged, "total")?,
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.items.iter()
    }
}

fn read_u32(json: &JsonValue, key: &str) -> Result<u32> {
    match json.get(key) {
        None | Some(JsonValue::Null) => Ok(0),
        Some(v) => Ok(serde_json::from_value(v.clone())?),
    }
}

impl<R> IntoIterator for Page<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, R> IntoIterator for &'a Page<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
