//! HTTP service end to end: pages, JSON endpoints, calendar downloads and CORS.
//!
//! HTTP 服务端到端测试：页面、JSON 接口、日历下载和 CORS。

mod common;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT_LANGUAGE, CONTENT_DISPOSITION, CONTENT_TYPE, ORIGIN};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tempfile::{TempDir, tempdir};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use common::{SEASON, sample_data, spawn_stub, test_config, test_state};
use snooker_calendar::core::AppState;
use snooker_calendar::core::ingest::fetch_and_store_players;
use snooker_calendar::infra::fs::calendar_path;
use snooker_calendar::models::InfoKind;
use snooker_calendar::web::server::serve_on;

struct Running {
    base: String,
    state: Arc<AppState>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
    dir: TempDir,
}

impl Running {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn output(&self) -> &Path {
        self.dir.path()
    }

    async fn stop(self) {
        self.cancel.cancel();
        self.handle.await.unwrap();
    }
}

async fn start(origins: &[&str]) -> Running {
    let dir = tempdir().unwrap();
    let api = spawn_stub(Arc::new(sample_data())).await;
    let mut config = test_config(&api, dir.path());
    config.server.allowed_origins = origins.iter().map(|o| o.to_string()).collect();
    let state = test_state(config).await;
    fetch_and_store_players(&state).await.unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();
    let handle = {
        let state = state.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            serve_on(listener, state, cancel).await.unwrap();
        })
    };

    Running {
        base: format!("http://{addr}"),
        state,
        cancel,
        handle,
        dir,
    }
}

#[tokio::test]
async fn test_players_endpoint() {
    let server = start(&[]).await;
    let http = reqwest::Client::new();

    let all: Vec<Value> = http.get(server.url("/api/players")).send().await.unwrap().json().await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0]["player_id"], 1);
    assert_eq!(all[0]["firstname"], "Judd");
    assert_eq!(all[0]["position"], 1);

    let page: Vec<Value> = http
        .get(server.url("/api/players?page=2&limit=1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0]["player_id"], 2);

    let found: Vec<Value> = http
        .get(server.url("/api/players?search=selby"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["lastname"], "Selby");

    let far = http
        .get(server.url("/api/players?page=9223372036854775807&limit=50"))
        .send()
        .await
        .unwrap();
    assert_eq!(far.status(), StatusCode::OK);
    assert!(far.json::<Vec<Value>>().await.unwrap().is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_last_updated_and_config() {
    let server = start(&[]).await;
    server
        .state
        .db
        .updates()
        .record_info(InfoKind::Players, chrono::Utc::now())
        .await
        .unwrap();
    let http = reqwest::Client::new();

    let info: Vec<Value> = http
        .get(server.url("/api/info/lastupdated"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(info.len(), 1);
    assert_eq!(info[0]["info"], "players");
    assert!(info[0]["lastupdated"].is_string());

    let config: Value = http.get(server.url("/api/config")).send().await.unwrap().json().await.unwrap();
    for field in [
        "backend",
        "backend_url",
        "backend_webcal_url",
        "default_language",
        "timezone",
        "contact_mail",
    ] {
        assert!(config[field].is_string(), "missing {field}");
    }

    server.stop().await;
}

#[tokio::test]
async fn test_calendar_download_is_generated_then_cached() {
    let server = start(&[]).await;
    let http = reqwest::Client::new();
    let file = calendar_path(server.output(), 1);
    assert!(!file.exists());

    let response = http.get(server.url("/api/calendar/1")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[CONTENT_TYPE].to_str().unwrap(),
        "text/calendar; charset=utf-8"
    );
    assert_eq!(
        response.headers()[CONTENT_DISPOSITION].to_str().unwrap(),
        "attachment; filename=\"player_1.ics\""
    );
    let body = response.text().await.unwrap();
    assert!(body.starts_with("BEGIN:VCALENDAR\r\n"));
    assert!(file.exists());
    assert!(server.state.db.updates().ics_last_updated(1).await.unwrap().is_some());

    // A cached file is served as is.
    std::fs::write(&file, "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n").unwrap();
    let cached = http.get(server.url("/api/calendar/1")).send().await.unwrap().text().await.unwrap();
    assert_eq!(cached, "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n");

    let subscribed = http.get(server.url("/static/1.ics")).send().await.unwrap();
    assert_eq!(subscribed.status(), StatusCode::OK);

    server.stop().await;
}

#[tokio::test]
async fn test_calendar_without_matches_is_not_found() {
    let server = start(&[]).await;
    let response = reqwest::get(server.url("/api/calendar/2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert!(body["detail"].is_string());
    assert!(!calendar_path(server.output(), 2).exists());

    let missing = reqwest::get(server.url("/static/2.ics")).await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    server.stop().await;
}

#[tokio::test]
async fn test_pages_are_localized() {
    let server = start(&[]).await;
    let http = reqwest::Client::new();

    let en = http.get(server.url("/")).send().await.unwrap().text().await.unwrap();
    assert!(en.contains("<title>Snooker Calendar</title>"));
    assert!(en.contains("Judd Trump"));

    let zh = http.get(server.url("/?lang=zh")).send().await.unwrap().text().await.unwrap();
    assert!(zh.contains("<title>斯诺克日历</title>"));

    let header = http
        .get(server.url("/"))
        .header(ACCEPT_LANGUAGE, "zh-CN,zh;q=0.9,en;q=0.8")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(header.contains("lang=\"zh\""));

    let log = http.get(server.url("/log.html")).send().await.unwrap().text().await.unwrap();
    assert!(log.contains("Update Log - Snooker Calendar"));
    assert!(log.contains("1.1.0"));

    server.stop().await;
}

#[tokio::test]
async fn test_cors_allows_configured_origins_only() {
    let server = start(&["https://snooker.example"]).await;
    let http = reqwest::Client::new();

    let allowed = http
        .get(server.url("/api/players"))
        .header(ORIGIN, "https://snooker.example")
        .send()
        .await
        .unwrap();
    assert_eq!(
        allowed.headers()["access-control-allow-origin"].to_str().unwrap(),
        "https://snooker.example"
    );

    let denied = http
        .get(server.url("/api/players"))
        .header(ORIGIN, "https://elsewhere.example")
        .send()
        .await
        .unwrap();
    assert!(denied.headers().get("access-control-allow-origin").is_none());

    server.stop().await;
}

#[tokio::test]
async fn test_server_stops_on_cancel() {
    let server = start(&[]).await;
    let season = server.state.season_or_current(None).await;
    assert_eq!(season, SEASON);
    server.stop().await;
}
