// Shared test helpers: an in-process snooker.org stand-in and state builders.
#![allow(dead_code)]

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;

use snooker_calendar::config::AppConfig;
use snooker_calendar::core::state::AppState;
use snooker_calendar::infra::db::Database;
use snooker_calendar::infra::snooker_api::{RetryPolicy, SnookerClient};

pub const SEASON: i64 = 2024;

/// Canned snooker.org answers, keyed the way the API is queried.
#[derive(Default)]
pub struct StubData {
    pub current_season: Option<i64>,
    pub rankings: Vec<Value>,
    pub players: HashMap<i64, Value>,
    pub events: Vec<Value>,
    pub rounds: HashMap<i64, Vec<Value>>,
    pub matches: HashMap<i64, Vec<Value>>,
    /// Requests answered with 503 before the stub starts answering.
    pub failures_remaining: AtomicU32,
    pub hits: AtomicU32,
}

impl StubData {
    pub fn hits(&self) -> u32 {
        self.hits.load(Ordering::SeqCst)
    }
}

pub fn player_json(id: i64, first: &str, last: &str) -> Value {
    json!({
        "ID": id,
        "FirstName": first,
        "LastName": last,
        "Nationality": "England",
        "Born": "1989-08-20",
        "NumRankingTitles": 28,
        "SurnameFirst": false
    })
}

pub fn ranking_json(position: i64, player_id: i64, sum: f64) -> Value {
    json!({
        "Position": position,
        "PlayerID": player_id,
        "Season": SEASON,
        "Sum": sum,
        "Type": "MoneyRankings"
    })
}

pub fn event_json(id: i64, name: &str) -> Value {
    json!({
        "ID": id,
        "Name": name,
        "StartDate": "2025-01-05",
        "EndDate": "2025-01-12",
        "Season": SEASON,
        "Venue": "Alexandra Palace",
        "City": "London",
        "Country": "England"
    })
}

pub fn round_json(event_id: i64, round: i64, name: &str, distance: i64) -> Value {
    json!({
        "Round": round,
        "RoundName": name,
        "EventID": event_id,
        "Distance": distance
    })
}

pub fn match_json(id: i64, event_id: i64, round: i64, p1: i64, p2: i64, scheduled: &str) -> Value {
    json!({
        "ID": id,
        "EventID": event_id,
        "Round": round,
        "Number": 1,
        "Player1ID": p1,
        "Score1": 0,
        "Player2ID": p2,
        "Score2": 0,
        "WinnerID": 0,
        "ScheduledDate": scheduled
    })
}

/// Two ranked players with one match between them, plus a ranked id the API
/// does not know.
pub fn sample_data() -> StubData {
    let mut data = StubData {
        current_season: Some(SEASON),
        ..StubData::default()
    };
    data.rankings = vec![
        ranking_json(1, 1, 1_000_000.0),
        ranking_json(2, 2, 800_000.0),
        ranking_json(3, 3, 500_000.0),
    ];
    data.players.insert(1, player_json(1, "Judd", "Trump"));
    data.players.insert(2, player_json(2, "Mark", "Selby"));
    data.events = vec![event_json(10, "Masters")];
    data.rounds
        .insert(10, vec![round_json(10, 7, "Quarter-finals", 11)]);
    data.matches.insert(
        1,
        vec![match_json(100, 10, 7, 1, 2, "2025-01-08T13:00:00Z")],
    );
    data
}

fn param(query: &HashMap<String, String>, name: &str) -> Option<i64> {
    query.get(name).and_then(|v| v.parse().ok())
}

async fn answer(
    State(data): State<Arc<StubData>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    data.hits.fetch_add(1, Ordering::SeqCst);
    let failing = data
        .failures_remaining
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if failing {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    let body = match (query.get("t").map(String::as_str), query.contains_key("rt")) {
        (Some("20"), _) => match data.current_season {
            Some(season) => json!([{ "CurrentSeason": season }]),
            None => Value::Null,
        },
        (Some("5"), _) => Value::Array(data.events.clone()),
        (Some("12"), _) => param(&query, "e")
            .and_then(|e| data.rounds.get(&e).cloned())
            .map(Value::Array)
            .unwrap_or(Value::Null),
        (Some("8"), _) => param(&query, "p")
            .and_then(|p| data.matches.get(&p).cloned())
            .map(Value::Array)
            .unwrap_or(Value::Null),
        (None, true) => Value::Array(data.rankings.clone()),
        (None, false) => param(&query, "p")
            .and_then(|p| data.players.get(&p).cloned())
            .map(|p| Value::Array(vec![p]))
            .unwrap_or(Value::Null),
        _ => return StatusCode::BAD_REQUEST.into_response(),
    };

    if body.is_null() {
        // snooker.org answers an empty body when nothing matches.
        return String::new().into_response();
    }
    axum::Json(body).into_response()
}

/// Serves `data` on an ephemeral port. Returns the base URL.
pub async fn spawn_stub(data: Arc<StubData>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub address");
    let app = Router::new().route("/", get(answer)).with_state(data);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server");
    });
    format!("http://{addr}/")
}

/// Configuration pointing at `base_url`, with an in-memory database and no
/// request delay.
pub fn test_config(base_url: &str, output_dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.api.base_url = base_url.to_string();
    config.api.x_requested_by = Some("snooker-calendar-tests".to_string());
    config.api.request_delay_seconds = 0;
    config.api.timeout_secs = 5;
    config.database.path = ":memory:".to_string();
    config.calendar.output_dir = output_dir.display().to_string();
    config.calendar.per_player_timeout_secs = 10;
    config
}

/// Client with a millisecond backoff.
pub fn fast_client(config: &AppConfig) -> SnookerClient {
    SnookerClient::new(&config.api)
        .expect("client")
        .with_retry_policy(RetryPolicy::new(3, Duration::from_millis(5)))
}

pub async fn test_state(config: AppConfig) -> Arc<AppState> {
    let db = Database::new(":memory:").await.expect("in-memory database");
    let client = fast_client(&config);
    Arc::new(AppState::new(config, db, client))
}
