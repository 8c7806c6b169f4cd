//! axum server: routes of every resource, GraphQL, CORS and request tracing.

use crate::config::HttpServerConfig;
use crate::graphql::{build_schema, graphiql, graphql_handler, BifrostSchema};
use crate::handler;
use app::module::AppModule;
use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use command_utils::util::shutdown::ShutdownLock;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state for axum handlers.
pub struct AppState {
    pub app_module: Arc<AppModule>,
    pub config: HttpServerConfig,
    pub schema: BifrostSchema,
}

impl AppState {
    pub fn new(app_module: Arc<AppModule>, config: HttpServerConfig) -> Self {
        let schema = build_schema(app_module.clone());
        Self {
            app_module,
            config,
            schema,
        }
    }
}

fn cors_layer(config: &HttpServerConfig) -> CorsLayer {
    let origin = match config.allowed_origins() {
        Some(origins) => AllowOrigin::list(
            origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok())
                .collect::<Vec<_>>(),
        ),
        None => AllowOrigin::from(Any),
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config);
    Router::new()
        .merge(handler::organization::routes())
        .merge(handler::core_group::routes())
        .merge(handler::core_user::routes())
        .merge(handler::workflow::routes())
        .merge(handler::hook::routes())
        .merge(handler::oauth::routes())
        .merge(handler::internationalization::routes())
        .route("/graphql/", get(graphiql).post(graphql_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Boot the HTTP server. Without `shutdown_signal` it stops on ctrl-c.
pub async fn boot_http_server(
    app_module: Arc<AppModule>,
    config: HttpServerConfig,
    lock: ShutdownLock,
    shutdown_signal: Option<Pin<Box<dyn Future<Output = ()> + Send>>>,
) -> anyhow::Result<()> {
    let addr = config.addr.clone();
    let app = build_router(Arc::new(AppState::new(app_module, config)));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("HTTP Server started on {}", addr);

    let shutdown_future: Pin<Box<dyn Future<Output = ()> + Send>> = match shutdown_signal {
        Some(signal) => signal,
        None => {
            let (tx, rx) = tokio::sync::oneshot::channel::<()>();
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        tracing::info!("Shutting down HTTP server...");
                        let _ = tx.send(());
                    }
                    Err(e) => tracing::error!("Failed to listen for ctrl_c: {:?}", e),
                }
            });
            Box::pin(async move {
                rx.await.ok();
            })
        }
    };

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_future)
        .await;

    lock.unlock();

    result.map_err(Into::into)
}
