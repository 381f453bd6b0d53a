//! Ingestion, calendar generation and batch runs end to end against a stub
//! snooker.org.
//!
//! 针对模拟 snooker.org 的数据采集、日历生成和批量运行端到端测试。

mod common;

use std::sync::Arc;
use tempfile::tempdir;

use common::{SEASON, sample_data, spawn_stub, test_config, test_state};
use snooker_calendar::core::batch::{BatchOutcome, generate_all_players_calendars, generate_and_save};
use snooker_calendar::core::calendar::{count_events, generate_player_calendar};
use snooker_calendar::core::ingest::{fetch_and_store_events, fetch_and_store_players};
use snooker_calendar::core::{AppState, Scheduler};
use snooker_calendar::infra::fs::calendar_path;
use snooker_calendar::models::InfoKind;

fn unfold(document: &str) -> String {
    document.replace("\r\n ", "")
}

async fn ingested(output: &std::path::Path) -> Arc<AppState> {
    let url = spawn_stub(Arc::new(sample_data())).await;
    let state = test_state(test_config(&url, output)).await;
    fetch_and_store_players(&state).await.unwrap();
    fetch_and_store_events(&state, Some(SEASON)).await.unwrap();
    state
}

#[tokio::test]
async fn test_fetch_players_counts_unknown_ids_as_failed() {
    let dir = tempdir().unwrap();
    let url = spawn_stub(Arc::new(sample_data())).await;
    let state = test_state(test_config(&url, dir.path())).await;

    let summary = fetch_and_store_players(&state).await.unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.stored, 2);
    assert_eq!(summary.failed, 1);

    assert!(state.db.players().find(1).await.unwrap().is_some());
    assert!(state.db.players().find(3).await.unwrap().is_none());
    assert_eq!(state.db.rankings().ranked_players(1, 0, None).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_fetch_events_stores_rounds() {
    let dir = tempdir().unwrap();
    let url = spawn_stub(Arc::new(sample_data())).await;
    let state = test_state(test_config(&url, dir.path())).await;

    let summary = fetch_and_store_events(&state, None).await.unwrap();
    assert_eq!(summary.stored, 1);
    assert_eq!(summary.failed, 0);

    let event = state.db.events().find(10).await.unwrap().unwrap();
    assert_eq!(event.name.as_deref(), Some("Masters"));
    let round = state.db.rounds().find(10, 7).await.unwrap().unwrap();
    assert_eq!(round.round_name.as_deref(), Some("Quarter-finals"));
}

#[tokio::test]
async fn test_player_calendar() {
    let dir = tempdir().unwrap();
    let state = ingested(dir.path()).await;

    let ics = generate_player_calendar(&state, 1, SEASON).await.unwrap().unwrap();
    assert_eq!(count_events(&ics), 1);

    let text = unfold(&String::from_utf8(ics).unwrap());
    assert!(text.contains("X-WR-CALNAME:Snooker Matches - Judd Trump (2024)"));
    assert!(text.contains("SUMMARY:Judd Trump vs Mark Selby | 0 - 0 | Masters | Quarter-finals"));
    assert!(text.contains("DTSTART:20250108T130000Z"));
    // 11 frames at 30 minutes.
    assert!(text.contains("DTEND:20250108T183000Z"));
    assert!(text.contains("World Ranking: 1"));
    assert!(text.contains("World Ranking: 2"));
    assert!(text.contains("Location: London\\, England"));
}

#[tokio::test]
async fn test_player_without_matches_has_no_calendar() {
    let dir = tempdir().unwrap();
    let state = ingested(dir.path()).await;
    assert!(generate_player_calendar(&state, 2, SEASON).await.unwrap().is_none());

    let outcome = generate_and_save(&state, 2, SEASON, dir.path()).await;
    assert!(matches!(outcome, BatchOutcome::Skipped(_)));
    assert!(!calendar_path(dir.path(), 2).exists());
}

#[tokio::test]
async fn test_batch_run() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("ics");
    let state = ingested(&output).await;

    let report = generate_all_players_calendars(&state, Some(SEASON)).await.unwrap();
    assert_eq!(report.season, SEASON);
    assert_eq!(report.total(), 3);
    assert_eq!(report.saved(), 1);
    assert_eq!(report.skipped(), 2);
    assert_eq!(report.failed(), 0);

    // Ranking order is kept.
    let ids: Vec<i64> = report.outcomes.iter().map(|o| o.player_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(matches!(report.outcomes[0].outcome, BatchOutcome::Saved { bytes } if bytes > 0));
    assert_eq!(report.outcomes[0].name.as_deref(), Some("Judd Trump"));
    // Player 3 is ranked but unknown, so it is skipped without a name.
    assert_eq!(report.outcomes[2].name, None);

    let file = calendar_path(&output, 1);
    let written = std::fs::read(&file).unwrap();
    assert_eq!(count_events(&written), 1);
    assert!(state.db.updates().ics_last_updated(1).await.unwrap().is_some());
    assert!(state.db.updates().ics_last_updated(2).await.unwrap().is_none());
}

#[tokio::test]
async fn test_batch_with_concurrency_keeps_order() {
    let dir = tempdir().unwrap();
    let url = spawn_stub(Arc::new(sample_data())).await;
    let mut config = test_config(&url, dir.path());
    config.calendar.concurrency = 3;
    let state = test_state(config).await;
    fetch_and_store_players(&state).await.unwrap();

    let report = generate_all_players_calendars(&state, None).await.unwrap();
    let ids: Vec<i64> = report.outcomes.iter().map(|o| o.player_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(report.saved(), 1);
}

#[tokio::test]
async fn test_batch_without_rankings_is_empty() {
    let dir = tempdir().unwrap();
    let url = spawn_stub(Arc::new(sample_data())).await;
    let state = test_state(test_config(&url, dir.path())).await;

    let report = generate_all_players_calendars(&state, Some(SEASON)).await.unwrap();
    assert_eq!(report.total(), 0);
}

#[tokio::test]
async fn test_scheduled_update_records_info() {
    let dir = tempdir().unwrap();
    let url = spawn_stub(Arc::new(sample_data())).await;
    let state = test_state(test_config(&url, dir.path())).await;
    let scheduler = Scheduler::new(state.clone());

    scheduler.update_job(InfoKind::Players).await;
    assert!(state.db.updates().info_last_updated(InfoKind::Players).await.unwrap().is_some());
    assert!(state.db.updates().info_last_updated(InfoKind::Events).await.unwrap().is_none());

    scheduler.update_job(InfoKind::Events).await;
    assert_eq!(state.db.updates().all_info().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_failed_update_records_nothing() {
    let dir = tempdir().unwrap();
    let data = Arc::new(sample_data());
    data.failures_remaining.store(100, std::sync::atomic::Ordering::SeqCst);
    let url = spawn_stub(data).await;
    let state = test_state(test_config(&url, dir.path())).await;

    Scheduler::new(state.clone()).update_job(InfoKind::Events).await;
    assert!(state.db.updates().info_last_updated(InfoKind::Events).await.unwrap().is_none());
}

fn utc(hour: u32) -> chrono::DateTime<chrono::Utc> {
    use chrono::TimeZone;
    chrono::Utc.with_ymd_and_hms(2025, 3, 1, hour, 30, 0).unwrap()
}

#[tokio::test]
async fn test_due_updates_run_inside_window() {
    let dir = tempdir().unwrap();
    let url = spawn_stub(Arc::new(sample_data())).await;
    let state = test_state(test_config(&url, dir.path())).await;
    let scheduler = Scheduler::new(state.clone());

    // Default window is [2, 5).
    let ran = scheduler.run_due_updates(utc(3)).await;
    assert_eq!(ran, vec![InfoKind::Events, InfoKind::Players]);
    assert_eq!(state.db.updates().all_info().await.unwrap().len(), 2);
    assert!(state.db.players().find(1).await.unwrap().is_some());
}

#[tokio::test]
async fn test_due_updates_skip_what_ran_today() {
    let dir = tempdir().unwrap();
    let data = Arc::new(sample_data());
    let url = spawn_stub(data.clone()).await;
    let state = test_state(test_config(&url, dir.path())).await;
    let scheduler = Scheduler::new(state.clone());
    let now = utc(4);

    let updates = state.db.updates();
    updates.record_info(InfoKind::Events, utc(2)).await.unwrap();
    updates.record_info(InfoKind::Players, utc(2)).await.unwrap();
    assert!(scheduler.run_due_updates(now).await.is_empty());
    assert_eq!(data.hits(), 0);

    // Only the players update is stale.
    updates.record_info(InfoKind::Players, now - chrono::Duration::days(1)).await.unwrap();
    assert_eq!(scheduler.run_due_updates(now).await, vec![InfoKind::Players]);
}

#[tokio::test]
async fn test_due_updates_wait_outside_window() {
    let dir = tempdir().unwrap();
    let data = Arc::new(sample_data());
    let url = spawn_stub(data.clone()).await;
    let state = test_state(test_config(&url, dir.path())).await;
    let scheduler = Scheduler::new(state.clone());

    assert!(scheduler.run_due_updates(utc(5)).await.is_empty());
    assert!(scheduler.run_due_updates(utc(12)).await.is_empty());
    assert!(scheduler.run_due_updates(utc(1)).await.is_empty());
    assert_eq!(data.hits(), 0);
    assert!(state.db.updates().all_info().await.unwrap().is_empty());
}
