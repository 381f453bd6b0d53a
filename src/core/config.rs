//! # Configuration Module / 配置模块
//!
//! Two layers of configuration live here:
//!
//! - [`AppConfig`], the service configuration loaded from a TOML file
//!   (`snooker.toml` by default). Every field has a default, so a missing file
//!   is a valid, fully defaulted configuration.
//! - [`FrontendConfig`], the record handed to the web front: backend URLs,
//!   default language, analytics identifiers and display timezone. Each field
//!   falls back to a literal default and can be overridden from the environment.
//!
//! 这里有两层配置：
//!
//! - [`AppConfig`]：从 TOML 文件（默认 `snooker.toml`）加载的服务配置。
//!   每个字段都有默认值，因此缺失的文件也是一个完整的默认配置。
//! - [`FrontendConfig`]：交给网页前端的记录，包括后端地址、默认语言、
//!   统计脚本标识和显示时区。每个字段都有字面量默认值，并可被环境变量覆盖。

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_BACKEND: &str = "snookerapis.arkady14.fun";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_TIMEZONE: &str = "Asia/Shanghai";
pub const DEFAULT_CONFIG_FILE: &str = "snooker.toml";
/// One week.
pub const MAX_GENERATE_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

pub const ENV_BACKEND: &str = "SNOOKER_BACKEND";
pub const ENV_BACKEND_URL: &str = "SNOOKER_BACKEND_URL";
pub const ENV_BACKEND_WEBCAL_URL: &str = "SNOOKER_BACKEND_WEBCAL_URL";
pub const ENV_DEFAULT_LANGUAGE: &str = "SNOOKER_DEFAULT_LANGUAGE";
pub const ENV_UMAMI_SCRIPT_SRC: &str = "SNOOKER_UMAMI_SCRIPT_SRC";
pub const ENV_UMAMI_SCRIPT_DATA: &str = "SNOOKER_UMAMI_SCRIPT_DATA";
pub const ENV_TIMEZONE: &str = "SNOOKER_TIMEZONE";
pub const ENV_CONTACT_MAIL: &str = "SNOOKER_CONTACT_MAIL";
pub const ENV_X_REQUESTED_BY: &str = "SNOOKER_X_REQUESTED_BY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid time '{value}' for {field}, expected HH:MM")]
    InvalidTime { field: &'static str, value: String },
    #[error("invalid scheduler window {start}..{end}, hours must satisfy start < end <= 24")]
    InvalidWindow { start: u32, end: u32 },
    #[error("invalid generate_interval_minutes {0}, expected 1..=10080 (one week)")]
    InvalidInterval(u64),
}

/// Picks an override when it is set and non-empty, else the default.
///
/// 当覆盖值存在且非空时使用覆盖值，否则使用默认值。
pub fn resolve(override_value: Option<String>, default: impl Into<String>) -> String {
    match override_value {
        Some(value) if !value.is_empty() => value,
        _ => default.into(),
    }
}

/// Values for the web front, resolved once at startup and read-only afterwards.
/// 网页前端使用的值，在启动时解析一次，之后只读。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrontendConfig {
    /// Host name of the calendar backend / 日历后端的主机名
    pub backend: String,
    /// Base URL for API calls and ICS downloads / API 调用和 ICS 下载的基础地址
    pub backend_url: String,
    /// Base URL for calendar subscriptions / 日历订阅的基础地址
    pub backend_webcal_url: String,
    /// Language used when the client expresses no usable preference
    /// 客户端没有可用偏好时使用的语言
    pub default_language: String,
    /// Analytics script source; no script tag is emitted when empty
    /// 统计脚本地址；为空时不输出 script 标签
    pub umami_script_src: String,
    /// Analytics website identifier / 统计网站标识
    pub umami_script_data: String,
    /// IANA timezone used to display timestamps / 用于显示时间的 IANA 时区
    pub timezone: String,
    /// Feedback address shown in the about block, hidden when empty
    /// 关于区域中显示的反馈邮箱，为空时不显示
    pub contact_mail: String,
}

/// Optional `[frontend]` table of the config file. Each value, when present
/// and non-empty, replaces the literal default; the environment still wins.
///
/// 配置文件中可选的 `[frontend]` 表。存在且非空的值会替换字面量默认值；
/// 环境变量的优先级仍然更高。
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FrontendOverrides {
    pub backend: Option<String>,
    pub backend_url: Option<String>,
    pub backend_webcal_url: Option<String>,
    pub default_language: Option<String>,
    pub umami_script_src: Option<String>,
    pub umami_script_data: Option<String>,
    pub timezone: Option<String>,
    pub contact_mail: Option<String>,
}

impl FrontendConfig {
    /// Resolves every field against the process environment.
    pub fn from_env(file: &FrontendOverrides) -> Self {
        Self::resolve_with(file, |name| env::var(name).ok())
    }

    /// Resolves every field with an arbitrary variable lookup.
    ///
    /// The backend URLs default to `https://<backend>` and `webcal://<backend>`
    /// where `<backend>` is the already resolved backend host.
    pub fn resolve_with<F>(file: &FrontendOverrides, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |var: &str, file_value: &Option<String>, literal: String| {
            resolve(lookup(var), resolve(file_value.clone(), literal))
        };

        let backend = pick(ENV_BACKEND, &file.backend, DEFAULT_BACKEND.to_string());
        let backend_url = pick(ENV_BACKEND_URL, &file.backend_url, format!("https://{backend}"));
        let backend_webcal_url = pick(
            ENV_BACKEND_WEBCAL_URL,
            &file.backend_webcal_url,
            format!("webcal://{backend}"),
        );

        Self {
            default_language: pick(
                ENV_DEFAULT_LANGUAGE,
                &file.default_language,
                DEFAULT_LANGUAGE.to_string(),
            ),
            umami_script_src: pick(ENV_UMAMI_SCRIPT_SRC, &file.umami_script_src, String::new()),
            umami_script_data: pick(ENV_UMAMI_SCRIPT_DATA, &file.umami_script_data, String::new()),
            timezone: pick(ENV_TIMEZONE, &file.timezone, DEFAULT_TIMEZONE.to_string()),
            contact_mail: pick(ENV_CONTACT_MAIL, &file.contact_mail, String::new()),
            backend,
            backend_url,
            backend_webcal_url,
        }
    }

    /// The display timezone, UTC when `timezone` is not a known IANA name.
    pub fn display_timezone(&self) -> Tz {
        self.timezone.parse().unwrap_or_else(|_| {
            warn!(timezone = %self.timezone, "Unknown timezone, displaying UTC");
            Tz::UTC
        })
    }

    /// Whether the analytics script tag should be injected.
    pub fn analytics_enabled(&self) -> bool {
        !self.umami_script_src.is_empty()
    }

    /// Download URL of a player's calendar.
    pub fn calendar_download_url(&self, player_id: i64) -> String {
        format!("{}/api/calendar/{}", self.backend_url.trim_end_matches('/'), player_id)
    }

    /// Subscription URL of a player's calendar.
    pub fn calendar_subscribe_url(&self, player_id: i64) -> String {
        format!(
            "{}/static/{}.ics",
            self.backend_webcal_url.trim_end_matches('/'),
            player_id
        )
    }
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self::resolve_with(&FrontendOverrides::default(), |_| None)
    }
}

/// HTTP service settings. / HTTP 服务设置。
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    /// Origins allowed by CORS; empty allows none.
    /// CORS 允许的来源；为空时不允许任何来源。
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,
            allowed_origins: Vec::new(),
        }
    }
}

/// SQLite settings. / SQLite 设置。
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file, `~` is expanded; `:memory:` keeps everything in memory.
    /// 数据库文件，支持 `~` 展开；`:memory:` 表示全部保存在内存中。
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "snooker.db".to_string(),
        }
    }
}

impl DatabaseConfig {
    pub fn resolved_path(&self) -> String {
        shellexpand::tilde(&self.path).into_owned()
    }
}

/// snooker.org API settings. / snooker.org API 设置。
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Sent as the `X-Requested-By` header, required by snooker.org.
    /// 作为 `X-Requested-By` 请求头发送，snooker.org 要求提供。
    pub x_requested_by: Option<String>,
    pub ranking_type: String,
    pub request_delay_seconds: u64,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.snooker.org/".to_string(),
            x_requested_by: None,
            ranking_type: "MoneyRankings".to_string(),
            request_delay_seconds: 1,
            timeout_secs: 15,
            max_retries: 3,
        }
    }
}

impl ApiConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_secs(self.request_delay_seconds)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// ICS output settings. / ICS 输出设置。
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub output_dir: String,
    pub per_player_timeout_secs: u64,
    /// Players generated concurrently during a batch run.
    /// 批量生成时并发处理的球员数。
    pub concurrency: usize,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            output_dir: "ics_calendars".to_string(),
            per_player_timeout_secs: 90,
            concurrency: 1,
        }
    }
}

impl CalendarConfig {
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.output_dir).into_owned())
    }

    pub fn per_player_timeout(&self) -> Duration {
        Duration::from_secs(self.per_player_timeout_secs)
    }
}

/// Job timing, all in UTC. / 任务时间设置，均为 UTC。
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub generate_interval_minutes: u64,
    /// Opportunistic ingestion window, `[start, end)` in hours.
    /// 顺带执行数据更新的时间窗口，按小时计的 `[start, end)`。
    pub window_start_hour: u32,
    pub window_end_hour: u32,
    pub events_fallback: String,
    pub rankings_fallback: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            generate_interval_minutes: 15,
            window_start_hour: 2,
            window_end_hour: 5,
            events_fallback: "05:10".to_string(),
            rankings_fallback: "05:40".to_string(),
        }
    }
}

impl SchedulerConfig {
    pub fn generate_interval(&self) -> Duration {
        let minutes = self
            .generate_interval_minutes
            .clamp(1, MAX_GENERATE_INTERVAL_MINUTES);
        Duration::from_secs(minutes * 60)
    }

    pub fn events_fallback_time(&self) -> Result<NaiveTime, ConfigError> {
        parse_hhmm("scheduler.events_fallback", &self.events_fallback)
    }

    pub fn rankings_fallback_time(&self) -> Result<NaiveTime, ConfigError> {
        parse_hhmm("scheduler.rankings_fallback", &self.rankings_fallback)
    }

    pub fn in_window(&self, hour: u32) -> bool {
        (self.window_start_hour..self.window_end_hour).contains(&hour)
    }
}

fn parse_hhmm(field: &'static str, value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| ConfigError::InvalidTime {
        field,
        value: value.to_string(),
    })
}

/// The whole service configuration, loaded from a TOML file.
/// 从 TOML 文件加载的完整服务配置。
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// The language for CLI output (e.g., "en", "zh-CN").
    /// Falls back to the system locale when not specified.
    ///
    /// 命令行输出的语言（例如 "en", "zh-CN"）。
    /// 如果未指定，则使用系统语言。
    pub language: Option<String>,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub calendar: CalendarConfig,
    pub scheduler: SchedulerConfig,
    pub frontend: FrontendOverrides,
}

impl AppConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut config: AppConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.apply_env(|name| env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Applies environment overrides that are not part of the frontend record.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_X_REQUESTED_BY).filter(|v| !v.is_empty()) {
            self.api.x_requested_by = Some(value);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scheduler.events_fallback_time()?;
        self.scheduler.rankings_fallback_time()?;
        let (start, end) = (self.scheduler.window_start_hour, self.scheduler.window_end_hour);
        if start >= end || end > 24 {
            return Err(ConfigError::InvalidWindow { start, end });
        }
        let minutes = self.scheduler.generate_interval_minutes;
        if !(1..=MAX_GENERATE_INTERVAL_MINUTES).contains(&minutes) {
            return Err(ConfigError::InvalidInterval(minutes));
        }
        Ok(())
    }

    /// Resolves the frontend record against the environment.
    pub fn frontend(&self) -> FrontendConfig {
        FrontendConfig::from_env(&self.frontend)
    }
}

/// Loads the configuration file. A missing file yields the defaults.
///
/// 加载配置文件。文件不存在时返回默认配置。
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        let mut config = AppConfig::default();
        config.apply_env(|name| env::var(name).ok());
        return Ok(config);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    AppConfig::from_toml_str(&content, path)
}
