//! HTTP server components.

pub mod auth;
pub mod http;
pub mod pagination;

pub use auth::{extract_bearer_token, Auth};
pub use http::{boot_http_server, build_router, AppState};
