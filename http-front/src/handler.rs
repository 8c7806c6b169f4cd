//! REST handlers. Every resource module exposes its `routes()`:
//! `/{prefix}/` for list and create, `/{prefix}/{lookup}/` for retrieve,
//! update, partial update and destroy.

pub mod core_group;
pub mod core_user;
pub mod hook;
pub mod internationalization;
pub mod oauth;
pub mod organization;
pub mod workflow;

use crate::error::AppError;
use crate::server::pagination::{ListParams, ListResponse};
use app::app::Page;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query};
use axum::http::StatusCode;
use std::future::Future;
use uuid::Uuid;

pub type ApiResult<T> = Result<T, AppError>;
pub type Body = Result<Json<serde_json::Value>, JsonRejection>;
pub type Params = Result<Query<ListParams>, QueryRejection>;

/// integer lookup (an unparsable id is simply not found)
pub fn lookup_id(id: &str) -> ApiResult<i64> {
    id.parse::<i64>().map_err(|_| AppError::not_found())
}

pub fn lookup_uuid(id: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| AppError::not_found())
}

/// `count` runs only for paged requests
pub async fn into_list<T, C>(params: &ListParams, results: Vec<T>, count: C) -> ApiResult<ListResponse<T>>
where
    C: Future<Output = anyhow::Result<i64>>,
{
    if params.is_paged() {
        Ok(Page {
            count: count.await?,
            results,
        }
        .into())
    } else {
        Ok(ListResponse::All(results))
    }
}

pub fn deleted(found: bool) -> ApiResult<StatusCode> {
    if found {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup_id("12").unwrap(), 12);
        assert!(lookup_id("abc").is_err());
        assert!(lookup_uuid("not-a-uuid").is_err());
        let uuid = Uuid::new_v4();
        assert_eq!(lookup_uuid(&uuid.to_string()).unwrap(), uuid);
    }

    #[tokio::test]
    async fn test_into_list_counts_only_when_paged() {
        let all = into_list(&ListParams::default(), vec![1, 2], async {
            Err(anyhow::anyhow!("not called"))
        })
        .await
        .unwrap();
        assert_eq!(all, ListResponse::All(vec![1, 2]));
        let params = ListParams {
            limit: Some(2),
            ..Default::default()
        };
        let paged = into_list(&params, vec![1, 2], async { Ok(7) }).await.unwrap();
        assert_eq!(
            paged,
            ListResponse::Paged {
                count: 7,
                results: vec![1, 2]
            }
        );
        assert!(deleted(false).is_err());
    }
}
