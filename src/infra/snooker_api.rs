//! # snooker.org Client Module / snooker.org 客户端模块
//!
//! A thin async client over the public snooker.org JSON API. Every request
//! carries the `X-Requested-By` header the API requires and is bounded by the
//! configured timeout. Failed requests are retried with exponential backoff
//! when the failure is transient (transport errors, HTTP 429 and 5xx,
//! undecodable bodies).
//!
//! 基于 snooker.org 公共 JSON API 的轻量异步客户端。每个请求都带有 API
//! 要求的 `X-Requested-By` 请求头，并受配置的超时限制。对于临时性失败
//! （传输错误、HTTP 429 和 5xx、无法解码的响应体），按指数退避进行重试。

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::config::ApiConfig;
use crate::core::models::{Event, Match, Player, Ranking, Round};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("invalid X-Requested-By header value: {0}")]
    InvalidHeader(String),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("snooker.org returned HTTP {status} for {url}")]
    Status { url: String, status: StatusCode },
    #[error("invalid response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Whether another attempt may succeed.
    /// 再次尝试是否可能成功。
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport { .. } | ApiError::Decode { .. } => true,
            ApiError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            ApiError::Client(_) | ApiError::InvalidHeader(_) => false,
        }
    }
}

/// Exponential backoff: attempt `n` (1-based) that failed waits `base * 2^n`.
/// With a one second base the waits are 2s, 4s, 8s.
///
/// 指数退避：第 `n` 次（从 1 开始）失败后等待 `base * 2^n`。
/// 基数为一秒时，等待时间依次为 2s、4s、8s。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_base: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base,
        }
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_base * 2u32.saturating_pow(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or runs out
/// of attempts. The last error is returned.
///
/// 重复执行 `op`，直到成功、遇到不可重试的错误或用完尝试次数。返回最后一个错误。
pub async fn with_retry<T, E, F, Fut, R>(
    policy: RetryPolicy,
    what: &str,
    should_retry: R,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.max_attempts && should_retry(&e) => {
                let wait = policy.delay_for(attempt);
                warn!(
                    what,
                    attempt,
                    max_attempts = policy.max_attempts,
                    wait_ms = wait.as_millis() as u64,
                    error = %e,
                    "Attempt failed, retrying"
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Client for `https://api.snooker.org/`.
#[derive(Debug, Clone)]
pub struct SnookerClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl SnookerClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(requested_by) = config.x_requested_by.as_deref() {
            let value = HeaderValue::from_str(requested_by)
                .map_err(|_| ApiError::InvalidHeader(requested_by.to_string()))?;
            headers.insert("X-Requested-By", value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            retry: RetryPolicy::new(config.max_retries, Duration::from_secs(1)),
        })
    }

    /// Replaces the retry policy, mostly to shorten backoff in tests.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    async fn get_once<T: DeserializeOwned + Default>(
        &self,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = describe(&self.base_url, query);
        debug!(url = %url, "GET snooker.org");

        let response = self
            .http
            .get(&self.base_url)
            .query(query)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { url, status });
        }

        let body = response.text().await.map_err(|source| ApiError::Transport {
            url: url.clone(),
            source,
        })?;
        // The API answers "" or "null" when nothing matches.
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(T::default());
        }
        serde_json::from_str(trimmed).map_err(|source| ApiError::Decode { url, source })
    }

    async fn get<T: DeserializeOwned + Default>(
        &self,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let what = describe(&self.base_url, query);
        with_retry(self.retry, &what, ApiError::is_retryable, || {
            self.get_once(query)
        })
        .await
    }

    /// `?t=20`, answered as `[{"CurrentSeason": 2025}]` or a bare object.
    pub async fn current_season(&self) -> Result<Option<i64>, ApiError> {
        let value: Value = self.get(&[("t", "20".to_string())]).await?;
        let entry = match &value {
            Value::Array(items) => items.first(),
            Value::Object(_) => Some(&value),
            _ => None,
        };
        Ok(entry
            .and_then(|e| e.get("CurrentSeason"))
            .and_then(Value::as_i64))
    }

    pub async fn rankings(&self, ranking_type: &str, season: i64) -> Result<Vec<Ranking>, ApiError> {
        self.get(&[("rt", ranking_type.to_string()), ("s", season.to_string())])
            .await
    }

    pub async fn player(&self, player_id: i64) -> Result<Option<Player>, ApiError> {
        let players: Vec<Player> = self.get(&[("p", player_id.to_string())]).await?;
        Ok(players.into_iter().next())
    }

    pub async fn season_events(&self, season: i64) -> Result<Vec<Event>, ApiError> {
        self.get(&[("t", "5".to_string()), ("s", season.to_string())])
            .await
    }

    pub async fn rounds(&self, event_id: i64) -> Result<Vec<Round>, ApiError> {
        self.get(&[("t", "12".to_string()), ("e", event_id.to_string())])
            .await
    }

    pub async fn player_matches(&self, player_id: i64, season: i64) -> Result<Vec<Match>, ApiError> {
        self.get(&[
            ("t", "8".to_string()),
            ("p", player_id.to_string()),
            ("s", season.to_string()),
        ])
        .await
    }
}

fn describe(base_url: &str, query: &[(&str, String)]) -> String {
    let params: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("{}?{}", base_url, params.join("&"))
}
