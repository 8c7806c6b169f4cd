//! `limit` / `offset` list parameters and the paged response envelope.

use app::app::Page;
use bifrost_base::limits::MAX_OFFSET;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<i32>,
    pub offset: Option<i64>,
    /// parent filter of the workflow child resources
    pub workflowlevel1: Option<i64>,
    /// internationalization filter
    pub language: Option<String>,
}

impl ListParams {
    /// clamp to `[1, max_limit]`
    pub fn limit(&self, max_limit: i32) -> Option<i32> {
        self.limit.map(|l| l.clamp(1, max_limit))
    }

    pub fn offset(&self) -> Option<i64> {
        self.offset.map(|o| o.clamp(0, MAX_OFFSET))
    }

    pub fn is_paged(&self) -> bool {
        self.limit.is_some()
    }
}

/// plain array without `limit`, `{count, results}` with it
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Paged { count: i64, results: Vec<T> },
    All(Vec<T>),
}

impl<T> From<Page<T>> for ListResponse<T> {
    fn from(page: Page<T>) -> Self {
        ListResponse::Paged {
            count: page.count,
            results: page.results,
        }
    }
}
