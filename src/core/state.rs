//! # Shared State Module / 共享状态模块
//!
//! Everything a service needs at runtime: the loaded configuration, the
//! resolved frontend record, the database, the snooker.org client and the
//! season cache. Built once and shared behind an `Arc`.
//!
//! 服务运行时需要的一切：已加载的配置、解析后的前端配置、数据库、
//! snooker.org 客户端以及赛季缓存。只构建一次，并通过 `Arc` 共享。

use std::sync::Arc;

use crate::core::config::{AppConfig, FrontendConfig};
use crate::core::error::ServiceError;
use crate::core::season::SeasonCache;
use crate::infra::db::Database;
use crate::infra::snooker_api::SnookerClient;

#[derive(Debug)]
pub struct AppState {
    pub config: AppConfig,
    pub frontend: FrontendConfig,
    pub db: Database,
    pub client: SnookerClient,
    pub season: SeasonCache,
}

impl AppState {
    pub fn new(config: AppConfig, db: Database, client: SnookerClient) -> Self {
        let frontend = config.frontend();
        Self {
            config,
            frontend,
            db,
            client,
            season: SeasonCache::default(),
        }
    }

    /// Opens the configured database and builds the API client.
    pub async fn connect(config: AppConfig) -> Result<Arc<Self>, ServiceError> {
        let db = Database::new(&config.database.resolved_path()).await?;
        let client = SnookerClient::new(&config.api)?;
        Ok(Arc::new(Self::new(config, db, client)))
    }

    /// Season to work on: the explicit one, or the current season.
    pub async fn season_or_current(&self, season: Option<i64>) -> i64 {
        match season {
            Some(season) => season,
            None => self.season.current(&self.client).await,
        }
    }
}
