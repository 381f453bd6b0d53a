//! # Snooker Calendar Library / 斯诺克日历库
//!
//! This library provides the core functionality of Snooker Calendar: it pulls
//! players, events and matches from snooker.org, stores them in SQLite, turns
//! each ranked player's season into an ICS calendar and serves those calendars
//! together with a small localized web front.
//!
//! 此库提供斯诺克日历的核心功能：从 snooker.org 拉取球员、赛事和比赛数据，
//! 存入 SQLite，将每位排名球员的赛季比赛生成 ICS 日历，
//! 并通过一个本地化的网页前端提供这些日历。
//!
//! ## Modules / 模块
//!
//! - `core` - Configuration, domain models, calendar generation, batch and scheduler
//! - `infra` - Infrastructure: snooker.org client, database, ICS codec, file system
//! - `web` - Locale dictionaries, hash router, page bootstrap and the HTTP service
//! - `reporting` - Console summaries
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 配置、领域模型、日历生成、批处理和调度器
//! - `infra` - 基础设施：snooker.org 客户端、数据库、ICS 编解码、文件系统
//! - `web` - 语言字典、哈希路由、页面引导和 HTTP 服务
//! - `reporting` - 控制台摘要
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;
pub mod web;

// Re-export commonly used items
pub use core::config;
pub use core::models;

/// Initializes the CLI's internationalization based on the system locale.
///
/// It attempts to match the full locale (e.g., "zh-CN"), then just the
/// language code (e.g., "zh"), and finally falls back to "en".
pub fn init() {
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    let available_locales = rust_i18n::available_locales!();

    let lang = if available_locales.contains(&locale.as_str()) {
        &locale
    } else {
        locale
            .split('-')
            .next()
            .filter(|lang_code| available_locales.contains(lang_code))
            .unwrap_or("en")
    };

    rust_i18n::set_locale(lang);
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
