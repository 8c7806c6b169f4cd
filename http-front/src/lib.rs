//! REST and GraphQL front of bifrost.
//!
//! # Modules
//!
//! - `config`: server configuration (`HTTP_*`)
//! - `error`: mapping of application errors to responses
//! - `serializer`: wire representations and inputs of each resource
//! - `handler`: REST resources
//! - `graphql`: read-only GraphQL schema
//! - `server`: router, bearer authentication and pagination

pub mod config;
pub mod error;
pub mod graphql;
pub mod handler;
pub mod serializer;
pub mod server;

pub use config::HttpServerConfig;
pub use error::AppError;
pub use server::{boot_http_server, build_router, AppState};
