//! # Database Module / 数据库模块
//!
//! Async SQLite access using SQLx for players, events, rounds, rankings and
//! the "last updated" bookkeeping. Migrations are embedded and applied when
//! the database is opened.
//!
//! 使用 SQLx 异步访问 SQLite，存储球员、赛事、轮次、排名以及"最后更新时间"记录。
//! 迁移脚本被嵌入程序，并在打开数据库时执行。

mod events;
mod players;
mod rankings;
mod updates;

pub use events::{EventRepository, RoundRepository};
pub use players::PlayerRepository;
pub use rankings::RankingRepository;
pub use updates::UpdateRepository;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

static MEMDB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Database handle with connection pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
    const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Opens (or creates) the database and applies migrations.
    /// `:memory:` opens a private in-memory database.
    pub async fn new(path: &str) -> Result<Self, DbError> {
        let pool = if path == ":memory:" {
            // Uniquely named shared-cache database per call, so parallel tests never collide.
            let id = MEMDB_COUNTER.fetch_add(1, Ordering::Relaxed);
            let memdb_uri = format!(
                "file:snooker-calendar-memdb-{}-{}?mode=memory&cache=shared",
                std::process::id(),
                id
            );
            let options = SqliteConnectOptions::new()
                .filename(&memdb_uri)
                .shared_cache(true)
                .create_if_missing(true);

            Self::memory_pool_options().connect_with(options).await?
        } else {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    if let Err(e) = std::fs::create_dir_all(parent) {
                        tracing::warn!(path = %parent.display(), error = %e, "Failed to create database directory");
                    }
                }
            }
            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true);

            SqlitePoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .idle_timeout(Some(Self::IDLE_TIMEOUT))
                .connect_with(options)
                .await?
        };

        info!(path = %path, "Database connected");

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations checked/applied");

        if path != ":memory:" {
            sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;
        }

        Ok(Self { pool })
    }

    /// The in-memory database lives as long as one connection to it is open,
    /// so its single connection is never reaped or recycled.
    fn memory_pool_options() -> SqlitePoolOptions {
        SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .acquire_timeout(Self::ACQUIRE_TIMEOUT)
            .idle_timeout(None)
            .max_lifetime(None)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn players(&self) -> PlayerRepository<'_> {
        PlayerRepository::new(&self.pool)
    }

    pub fn events(&self) -> EventRepository<'_> {
        EventRepository::new(&self.pool)
    }

    pub fn rounds(&self) -> RoundRepository<'_> {
        RoundRepository::new(&self.pool)
    }

    pub fn rankings(&self) -> RankingRepository<'_> {
        RankingRepository::new(&self.pool)
    }

    pub fn updates(&self) -> UpdateRepository<'_> {
        UpdateRepository::new(&self.pool)
    }
}
