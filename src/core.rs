//! # Core Module / 核心模块
//!
//! This module contains the core functionality of Snooker Calendar:
//! configuration, data models, season resolution, ingestion, calendar
//! generation, batch generation and the job scheduler.
//!
//! 此模块包含斯诺克日历的核心功能：
//! 配置、数据模型、赛季解析、数据采集、日历生成、批量生成和任务调度。

pub mod batch;
pub mod calendar;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod scheduler;
pub mod season;
pub mod state;

// Re-exports
pub use batch::{BatchOutcome, BatchReport, generate_all_players_calendars};
pub use calendar::generate_player_calendar;
pub use config::{AppConfig, FrontendConfig};
pub use error::ServiceError;
pub use scheduler::Scheduler;
pub use season::SeasonCache;
pub use state::AppState;
