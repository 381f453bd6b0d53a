//! # Batch Generation Module / 批量生成模块
//!
//! Writes one ICS file per ranked player. Each player is generated under a
//! timeout, written atomically and then stamped in the database; players are
//! spaced by the configured request delay so snooker.org is not flooded.
//!
//! 为每位上榜球员写入一个 ICS 文件。每位球员的生成都受超时限制，
//! 原子写入后在数据库中记录时间；球员之间按配置的请求间隔等待，
//! 以免对 snooker.org 造成压力。

use chrono::Local;
use colored::*;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::core::calendar::generate_player_calendar;
use crate::core::error::ServiceError;
use crate::core::ingest::pause_between;
use crate::core::models::RankedPlayer;
use crate::core::state::AppState;
use crate::infra::{fs, t};

/// What happened to one player. / 单个球员的处理结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Saved { bytes: usize },
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct PlayerOutcome {
    pub player_id: i64,
    pub name: Option<String>,
    pub outcome: BatchOutcome,
}

/// Result of one batch run. / 一次批量运行的结果。
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub season: i64,
    pub outcomes: Vec<PlayerOutcome>,
    pub duration: Duration,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn saved(&self) -> usize {
        self.count(|o| matches!(o, BatchOutcome::Saved { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, BatchOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, BatchOutcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&BatchOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|p| pred(&p.outcome)).count()
    }
}

/// Generates and saves the calendars of all ranked players for `season`
/// (the current season when `None`).
///
/// 为所有上榜球员生成并保存 `season` 赛季的日历（为 `None` 时使用当前赛季）。
pub async fn generate_all_players_calendars(
    state: &AppState,
    season: Option<i64>,
) -> Result<BatchReport, ServiceError> {
    let start = Instant::now();
    let season = state.season_or_current(season).await;
    let dir = state.config.calendar.output_dir();
    fs::ensure_dir(&dir).map_err(|source| ServiceError::Io {
        path: dir.clone(),
        source,
    })?;

    let players = state.db.rankings().ranked_players(1, 0, None).await?;
    if players.is_empty() {
        println!("{}", t!("batch.no_players").yellow());
        return Ok(BatchReport {
            season,
            outcomes: Vec::new(),
            duration: start.elapsed(),
        });
    }

    let total = players.len();
    let concurrency = state.config.calendar.concurrency.max(1);
    let delay = state.config.api.request_delay();
    info!(season, total, concurrency, "Starting batch generation");

    let outcomes: Vec<PlayerOutcome> = stream::iter(players.iter().enumerate())
        .map(|(i, player)| {
            let dir = dir.as_path();
            async move {
                let outcome = process_player(state, player, season, dir, i + 1, total).await;
                // Players without a name never reached snooker.org.
                if outcome.name.is_some() {
                    pause_between(i, total, delay).await;
                }
                outcome
            }
        })
        .buffered(concurrency)
        .collect()
        .await;

    let report = BatchReport {
        season,
        outcomes,
        duration: start.elapsed(),
    };
    info!(
        saved = report.saved(),
        skipped = report.skipped(),
        failed = report.failed(),
        "Batch generation complete"
    );
    Ok(report)
}

async fn process_player(
    state: &AppState,
    player: &RankedPlayer,
    season: i64,
    dir: &Path,
    index: usize,
    total: usize,
) -> PlayerOutcome {
    let player_id = player.player_id;
    let Some(name) = player.display_name() else {
        println!(
            "{}",
            t!("batch.skip_missing_name", index = index, total = total, id = player_id).yellow()
        );
        return PlayerOutcome {
            player_id,
            name: None,
            outcome: BatchOutcome::Skipped(t!("batch.reason_missing_name").to_string()),
        };
    };

    println!(
        "{}",
        t!(
            "batch.processing",
            index = index,
            total = total,
            time = Local::now().format("%H:%M:%S").to_string(),
            name = &name,
            id = player_id
        )
        .blue()
    );

    let outcome = generate_and_save(state, player_id, season, dir).await;
    match &outcome {
        BatchOutcome::Saved { bytes } => println!("{}", t!("batch.saved", bytes = bytes).green()),
        BatchOutcome::Skipped(reason) => {
            println!("{}", t!("batch.skipped", reason = reason).yellow())
        }
        BatchOutcome::Failed(reason) => println!("{}", t!("batch.failed", reason = reason).red()),
    }

    PlayerOutcome {
        player_id,
        name: Some(name),
        outcome,
    }
}

/// Generates, writes and stamps one calendar.
pub async fn generate_and_save(
    state: &AppState,
    player_id: i64,
    season: i64,
    dir: &Path,
) -> BatchOutcome {
    let limit = state.config.calendar.per_player_timeout();
    let generated =
        match tokio::time::timeout(limit, generate_player_calendar(state, player_id, season)).await
        {
            Err(_) => {
                warn!(player_id, timeout_secs = limit.as_secs(), "Calendar generation timed out");
                return BatchOutcome::Failed(
                    t!("batch.reason_timeout", timeout = limit.as_secs()).to_string(),
                );
            }
            Ok(Err(e)) => {
                warn!(player_id, error = %e, "Calendar generation failed");
                return BatchOutcome::Failed(e.to_string());
            }
            Ok(Ok(None)) => {
                return BatchOutcome::Skipped(t!("batch.reason_no_matches").to_string());
            }
            Ok(Ok(Some(bytes))) => bytes,
        };

    let path = fs::calendar_path(dir, player_id);
    if let Err(e) = fs::write_atomic(&path, &generated) {
        warn!(player_id, path = %path.display(), error = %e, "Failed to save calendar");
        return BatchOutcome::Failed(e.to_string());
    }
    if let Err(e) = state.db.updates().record_ics(player_id, chrono::Utc::now()).await {
        warn!(player_id, error = %e, "Failed to record calendar update time");
    }
    BatchOutcome::Saved {
        bytes: generated.len(),
    }
}
