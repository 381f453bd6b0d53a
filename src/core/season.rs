//! # Season Module / 赛季模块
//!
//! The current snooker.org season, cached for a day. When the API cannot
//! answer, the current UTC year is used and nothing is cached, so the next
//! call asks again.
//!
//! 当前 snooker.org 赛季，缓存一天。API 无法响应时使用当前 UTC 年份，
//! 且不写入缓存，下次调用会重新请求。

use chrono::{Datelike, Utc};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::infra::snooker_api::{ApiError, SnookerClient};

pub const SEASON_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug)]
pub struct SeasonCache {
    ttl: Duration,
    cached: Mutex<Option<(i64, Instant)>>,
}

impl Default for SeasonCache {
    fn default() -> Self {
        Self::new(SEASON_TTL)
    }
}

impl SeasonCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            cached: Mutex::new(None),
        }
    }

    /// Current season from the cache or from snooker.org.
    pub async fn current(&self, client: &SnookerClient) -> i64 {
        self.current_with(|| client.current_season()).await
    }

    /// Same as [`current`](Self::current) with a caller-supplied fetch.
    /// The lock is held across the fetch so concurrent callers share one request.
    pub async fn current_with<F, Fut>(&self, fetch: F) -> i64
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<i64>, ApiError>>,
    {
        let mut cached = self.cached.lock().await;
        if let Some((season, at)) = *cached {
            if at.elapsed() < self.ttl {
                return season;
            }
        }

        match fetch().await {
            Ok(Some(season)) => {
                info!(season, "Current season refreshed");
                *cached = Some((season, Instant::now()));
                season
            }
            Ok(None) => {
                let year = fallback_season();
                warn!(year, "snooker.org reported no current season, using current year");
                year
            }
            Err(e) => {
                let year = fallback_season();
                warn!(year, error = %e, "Failed to fetch current season, using current year");
                year
            }
        }
    }

    /// Drops the cached value.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}

fn fallback_season() -> i64 {
    i64::from(Utc::now().year())
}
