//! HTTP handlers: the two pages and the JSON / ICS endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::core::calendar::generate_player_calendar;
use crate::core::config::FrontendConfig;
use crate::core::error::ServiceError;
use crate::core::models::{InfoLastUpdated, RankedPlayer};
use crate::core::state::AppState;
use crate::infra::db::DbError;
use crate::infra::fs;
use crate::web::bootstrap::{App, Entry};
use crate::web::i18n::{I18n, pick_locale};
use crate::web::views::PageData;

pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Errors surfaced as `{"detail": ...}`. / 以 `{"detail": ...}` 形式返回的错误。
#[derive(Debug, Error)]
pub enum WebError {
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => {
                error!(error = %self, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlayersQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

pub async fn index_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> Result<Html<String>, WebError> {
    let data = PageData {
        players: state.db.rankings().ranked_players(1, 0, None).await?,
        info: state.db.updates().all_info().await?,
    };
    Ok(render_page(&state, Entry::Main, &query, &headers, &data))
}

pub async fn log_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> Result<Html<String>, WebError> {
    let data = PageData {
        players: Vec::new(),
        info: state.db.updates().all_info().await?,
    };
    Ok(render_page(&state, Entry::UpdateLog, &query, &headers, &data))
}

fn render_page(
    state: &AppState,
    entry: Entry,
    query: &PageQuery,
    headers: &HeaderMap,
    data: &PageData,
) -> Html<String> {
    let accept = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok());
    let locale = pick_locale(query.lang.as_deref(), accept, &state.frontend.default_language);
    let app = App::bootstrap(entry, &state.frontend, I18n::new(locale));
    Html(app.mount(data).into_string())
}

pub async fn list_players(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PlayersQuery>,
) -> Result<Json<Vec<RankedPlayer>>, WebError> {
    let players = state
        .db
        .rankings()
        .ranked_players(
            query.page.unwrap_or(1),
            query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            query.search.as_deref(),
        )
        .await?;
    Ok(Json(players))
}

pub async fn last_updated(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<InfoLastUpdated>>, WebError> {
    Ok(Json(state.db.updates().all_info().await?))
}

pub async fn frontend_config(State(state): State<Arc<AppState>>) -> Json<FrontendConfig> {
    Json(state.frontend.clone())
}

/// Serves `<output_dir>/<id>.ics`, generating and caching it first when missing.
///
/// 提供 `<output_dir>/<id>.ics`，文件缺失时先生成并缓存。
pub async fn player_calendar(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<i64>,
) -> Result<Response, WebError> {
    let path = fs::calendar_path(&state.config.calendar.output_dir(), player_id);

    let bytes = if path.exists() {
        tokio::fs::read(&path).await.map_err(|source| WebError::Io {
            path: path.display().to_string(),
            source,
        })?
    } else {
        let season = state.season.current(&state.client).await;
        let Some(bytes) = generate_player_calendar(&state, player_id, season).await? else {
            return Err(WebError::NotFound("No matches found".to_string()));
        };
        fs::write_atomic(&path, &bytes).map_err(|source| ServiceError::Io {
            path: path.clone(),
            source,
        })?;
        state
            .db
            .updates()
            .record_ics(player_id, chrono::Utc::now())
            .await?;
        info!(player_id, bytes = bytes.len(), "Generated calendar on demand");
        bytes
    };

    let disposition = format!("attachment; filename=\"player_{player_id}.ics\"");
    let mut response = bytes.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/calendar; charset=utf-8"),
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    Ok(response)
}
