//! # Scheduler Module / 调度模块
//!
//! Three recurring jobs, all in UTC:
//!
//! - calendar generation every `generate_interval_minutes`, first run at start;
//! - a daily event-info update (05:10 by default);
//! - a daily rankings update (05:40 by default).
//!
//! After each generation run inside the `[window_start_hour, window_end_hour)`
//! window, the daily updates run early if they have not run today. A single
//! lock serializes every job. Failures are logged and the loop continues.
//!
//! 三个周期任务，均使用 UTC 时间：按间隔生成日历（启动时立即执行一次）、
//! 每日赛事信息更新、每日排名更新。每次生成后若处于时间窗口内，且当天尚未
//! 更新，则提前执行每日更新。所有任务由同一把锁串行化；失败只记录日志。

use chrono::{DateTime, Days, NaiveTime, Timelike, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::core::batch::generate_all_players_calendars;
use crate::core::config::ConfigError;
use crate::core::error::ServiceError;
use crate::core::ingest::{fetch_and_store_events, fetch_and_store_players};
use crate::core::models::InfoKind;
use crate::core::state::AppState;

/// Next UTC instant at `at` strictly after `now`.
///
/// 严格晚于 `now` 的下一个 UTC `at` 时刻。
pub fn next_daily_run(now: DateTime<Utc>, at: NaiveTime) -> DateTime<Utc> {
    let today = now.date_naive().and_time(at).and_utc();
    if today > now {
        return today;
    }
    now.date_naive()
        .checked_add_days(Days::new(1))
        .map(|d| d.and_time(at).and_utc())
        .unwrap_or(today)
}

pub struct Scheduler {
    state: Arc<AppState>,
    lock: Mutex<()>,
}

impl Scheduler {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            lock: Mutex::new(()),
        }
    }

    /// Runs every job until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), ConfigError> {
        let scheduler = &self.state.config.scheduler;
        let events_at = scheduler.events_fallback_time()?;
        let rankings_at = scheduler.rankings_fallback_time()?;
        let interval = scheduler.generate_interval();

        let now = Utc::now();
        info!(every_secs = interval.as_secs(), "Job continuous_ics_generation next run now");
        info!(next = %next_daily_run(now, events_at), "Job daily_event_info_fallback scheduled");
        info!(next = %next_daily_run(now, rankings_at), "Job daily_rankings_fallback scheduled");

        tokio::join!(
            self.interval_loop(interval, cancel.clone()),
            self.daily_loop(events_at, InfoKind::Events, cancel.clone()),
            self.daily_loop(rankings_at, InfoKind::Players, cancel.clone()),
        );
        info!("Scheduler stopped");
        Ok(())
    }

    async fn interval_loop(&self, every: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = ticker.tick() => self.generate_ics_job().await,
            }
        }
    }

    async fn daily_loop(&self, at: NaiveTime, kind: InfoKind, cancel: CancellationToken) {
        loop {
            let now = Utc::now();
            let wait = (next_daily_run(now, at) - now)
                .to_std()
                .unwrap_or(Duration::ZERO);
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(wait) => self.update_job(kind).await,
            }
        }
    }

    /// Regenerates every calendar, then runs pending daily updates when inside
    /// the preferred window.
    pub async fn generate_ics_job(&self) {
        let _guard = self.lock.lock().await;
        info!("Starting ICS generation");
        match generate_all_players_calendars(&self.state, None).await {
            Ok(report) => info!(
                saved = report.saved(),
                skipped = report.skipped(),
                failed = report.failed(),
                "ICS generation completed"
            ),
            Err(e) => error!(error = %e, "ICS generation failed"),
        }
        self.due_updates_locked(Utc::now()).await;
    }

    /// Runs the daily updates that are still due on `now`'s date, provided
    /// `now` falls inside the preferred window. Returns the updates that ran.
    ///
    /// 若 `now` 处于首选时间窗口内，则执行当天仍未完成的每日更新，
    /// 返回实际执行的更新。
    pub async fn run_due_updates(&self, now: DateTime<Utc>) -> Vec<InfoKind> {
        let _guard = self.lock.lock().await;
        self.due_updates_locked(now).await
    }

    async fn due_updates_locked(&self, now: DateTime<Utc>) -> Vec<InfoKind> {
        let mut ran = Vec::new();
        if !self.state.config.scheduler.in_window(now.hour()) {
            return ran;
        }
        for kind in [InfoKind::Events, InfoKind::Players] {
            match self.state.db.updates().needs_update_today(kind, now).await {
                Ok(true) => {
                    info!(info = %kind, "Within preferred window, running update");
                    self.update_locked(kind).await;
                    ran.push(kind);
                }
                Ok(false) => {}
                Err(e) => error!(info = %kind, error = %e, "Failed to check last update"),
            }
        }
        ran
    }

    /// Runs the daily update for `kind`.
    pub async fn update_job(&self, kind: InfoKind) {
        let _guard = self.lock.lock().await;
        self.update_locked(kind).await;
    }

    async fn update_locked(&self, kind: InfoKind) {
        info!(info = %kind, "Starting update");
        let result: Result<(), ServiceError> = async {
            match kind {
                InfoKind::Events => {
                    fetch_and_store_events(&self.state, None).await?;
                }
                InfoKind::Players => {
                    fetch_and_store_players(&self.state).await?;
                }
            }
            self.state.db.updates().record_info(kind, Utc::now()).await?;
            Ok(())
        }
        .await;
        match result {
            Ok(()) => info!(info = %kind, "Update completed"),
            Err(e) => error!(info = %kind, error = %e, "Update failed"),
        }
    }
}
