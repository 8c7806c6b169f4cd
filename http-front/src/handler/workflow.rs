//! Workflow level resources. `workflowlevel2`, `workflowlevel2sort` and
//! `workflowteam` lists accept the `workflowlevel1` filter.

pub mod level1;
pub mod level2;
pub mod level2_sort;
pub mod level_status;
pub mod level_type;
pub mod team;

use crate::server::AppState;
use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(level1::routes())
        .merge(level2::routes())
        .merge(level2_sort::routes())
        .merge(level_type::routes())
        .merge(level_status::routes())
        .merge(team::routes())
}
