//! # HTTP Server Module / HTTP 服务模块
//!
//! Wires the handlers into an axum router with CORS, request tracing and the
//! statically served ICS directory, and runs it until cancelled.
//!
//! 将处理函数组装为带 CORS、请求追踪和静态 ICS 目录的 axum 路由，
//! 并持续运行直到被取消。

use axum::Router;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::core::state::AppState;
use crate::web::api::{self, WebError};

/// CORS for the configured origins; an empty list allows none.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any)
}

pub fn router(state: Arc<AppState>) -> Router {
    let static_dir = ServeDir::new(state.config.calendar.output_dir());
    let cors = cors_layer(&state.config.server.allowed_origins);

    Router::new()
        .route("/", get(api::index_page))
        .route("/log.html", get(api::log_page))
        .route("/api/players", get(api::list_players))
        .route("/api/calendar/{player_id}", get(api::player_calendar))
        .route("/api/info/lastupdated", get(api::last_updated))
        .route("/api/config", get(api::frontend_config))
        .nest_service("/static", static_dir)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves until `cancel` fires.
pub async fn serve(state: Arc<AppState>, cancel: CancellationToken) -> Result<(), WebError> {
    let addr = SocketAddr::new(state.config.server.address, state.config.server.port);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| WebError::Bind {
            addr: addr.to_string(),
            source,
        })?;
    serve_on(listener, state, cancel).await
}

/// Serves on an already bound listener.
pub async fn serve_on(
    listener: TcpListener,
    state: Arc<AppState>,
    cancel: CancellationToken,
) -> Result<(), WebError> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "HTTP server listening");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(WebError::Serve)?;
    info!("HTTP server stopped");
    Ok(())
}
