//! # Ingestion Module / 数据采集模块
//!
//! Copies snooker.org data into the local database: the events of a season
//! with their rounds, the ranking list with every ranked player, or a single
//! player on demand.
//!
//! 将 snooker.org 的数据复制到本地数据库：某赛季的赛事及其轮次、
//! 排名列表及所有上榜球员，或按需获取的单个球员。

use std::time::Duration;
use tracing::{info, warn};

use crate::core::error::ServiceError;
use crate::core::models::{Event, Player};
use crate::core::state::AppState;
use crate::infra::db::Database;
use crate::infra::snooker_api::{RetryPolicy, SnookerClient, with_retry};

/// Attempts per event before it is skipped.
pub const EVENT_ATTEMPTS: u32 = 2;

/// Counts for one ingestion run. / 一次采集运行的计数。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub total: usize,
    pub stored: usize,
    pub failed: usize,
}

/// Fetches one player and stores it. Returns `None` when snooker.org does not
/// know the player.
///
/// 获取单个球员并存储。snooker.org 没有该球员时返回 `None`。
pub async fn fetch_single_player(
    client: &SnookerClient,
    db: &Database,
    player_id: i64,
) -> Result<Option<Player>, ServiceError> {
    let Some(player) = client.player(player_id).await? else {
        warn!(player_id, "snooker.org returned no data for player");
        return Ok(None);
    };
    db.players().upsert(&player).await?;
    info!(player_id, name = %player.display_name(), "Stored player");
    Ok(Some(player))
}

/// Stores every event of `season` (the current season when `None`) together
/// with its rounds.
///
/// A failed round fetch only logs a warning; a failed event is retried once
/// and then skipped.
pub async fn fetch_and_store_events(
    state: &AppState,
    season: Option<i64>,
) -> Result<IngestSummary, ServiceError> {
    let season = state.season_or_current(season).await;
    let events = state.client.season_events(season).await?;
    info!(season, count = events.len(), "Fetched season events");

    let policy = RetryPolicy::new(EVENT_ATTEMPTS, state.client.retry_policy().backoff_base);
    let delay = state.config.api.request_delay();
    let mut summary = IngestSummary {
        total: events.len(),
        ..IngestSummary::default()
    };

    for (i, event) in events.iter().enumerate() {
        let what = format!("event {}", event.id);
        match with_retry(policy, &what, |_: &ServiceError| true, || store_event(state, event)).await {
            Ok(()) => summary.stored += 1,
            Err(e) => {
                warn!(event_id = event.id, error = %e, "Skipping event");
                summary.failed += 1;
            }
        }
        pause_between(i, events.len(), delay).await;
    }

    info!(
        season,
        stored = summary.stored,
        failed = summary.failed,
        "Finished fetching events and rounds"
    );
    Ok(summary)
}

async fn store_event(state: &AppState, event: &Event) -> Result<(), ServiceError> {
    state.db.events().upsert(event).await?;
    info!(event_id = event.id, name = event.name.as_deref().unwrap_or_default(), "Stored event");

    match state.client.rounds(event.id).await {
        Ok(rounds) => {
            for round in &rounds {
                state.db.rounds().upsert(round).await?;
            }
            info!(event_id = event.id, count = rounds.len(), "Stored rounds");
        }
        Err(e) => warn!(event_id = event.id, error = %e, "Failed to fetch rounds"),
    }
    Ok(())
}

/// Replaces the ranking list, then stores every ranked player.
///
/// 先替换排名列表，再存储所有上榜球员。
pub async fn fetch_and_store_players(state: &AppState) -> Result<IngestSummary, ServiceError> {
    let season = state.season_or_current(None).await;
    let rankings = state
        .client
        .rankings(&state.config.api.ranking_type, season)
        .await?;
    info!(season, count = rankings.len(), "Fetched rankings");

    state.db.rankings().replace_all(&rankings).await?;

    let delay = state.config.api.request_delay();
    let mut summary = IngestSummary {
        total: rankings.len(),
        ..IngestSummary::default()
    };
    for (i, ranking) in rankings.iter().enumerate() {
        match fetch_single_player(&state.client, &state.db, ranking.player_id).await {
            Ok(Some(_)) => summary.stored += 1,
            Ok(None) => summary.failed += 1,
            Err(e) => {
                warn!(player_id = ranking.player_id, error = %e, "Failed to store player");
                summary.failed += 1;
            }
        }
        pause_between(i, rankings.len(), delay).await;
    }

    info!(stored = summary.stored, failed = summary.failed, "Finished fetching players");
    Ok(summary)
}

/// Sleeps `delay` unless `index` is the last item.
pub(crate) async fn pause_between(index: usize, total: usize, delay: Duration) {
    if index + 1 < total && !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
