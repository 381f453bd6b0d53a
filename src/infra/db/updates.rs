//! "Last updated" bookkeeping for calendars and ingested datasets.

use crate::core::models::{InfoKind, InfoLastUpdated};
use crate::infra::db::DbError;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Repository for update timestamps.
pub struct UpdateRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UpdateRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Records when a player's calendar file was last written.
    pub async fn record_ics(&self, player_id: i64, at: DateTime<Utc>) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO ics_last_updated (player_id, last_updated) VALUES (?, ?)
            ON CONFLICT(player_id) DO UPDATE SET last_updated = excluded.last_updated
            "#,
        )
        .bind(player_id)
        .bind(at.timestamp())
        .execute(self.pool)
        .await?;
        Ok(())
    }

    pub async fn ics_last_updated(&self, player_id: i64) -> Result<Option<DateTime<Utc>>, DbError> {
        let ts: Option<i64> =
            sqlx::query_scalar("SELECT last_updated FROM ics_last_updated WHERE player_id = ?")
                .bind(player_id)
                .fetch_optional(self.pool)
                .await?;
        Ok(ts.and_then(|ts| DateTime::from_timestamp(ts, 0)))
    }

    /// Records a successful ingestion of `kind`.
    pub async fn record_info(&self, kind: InfoKind, at: DateTime<Utc>) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO info_last_updated (info, last_updated) VALUES (?, ?)
            ON CONFLICT(info) DO UPDATE SET last_updated = excluded.last_updated
            "#,
        )
        .bind(kind.as_str())
        .bind(at.timestamp())
        .execute(self.pool)
        .await?;
        Ok(())
    }

    pub async fn info_last_updated(&self, kind: InfoKind) -> Result<Option<DateTime<Utc>>, DbError> {
        let ts: Option<i64> =
            sqlx::query_scalar("SELECT last_updated FROM info_last_updated WHERE info = ?")
                .bind(kind.as_str())
                .fetch_optional(self.pool)
                .await?;
        Ok(ts.and_then(|ts| DateTime::from_timestamp(ts, 0)))
    }

    pub async fn all_info(&self) -> Result<Vec<InfoLastUpdated>, DbError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT info, last_updated FROM info_last_updated ORDER BY info",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(info, ts)| InfoLastUpdated {
                info,
                lastupdated: DateTime::from_timestamp(ts, 0),
            })
            .collect())
    }

    /// `true` unless `kind` was already updated on `now`'s UTC date.
    pub async fn needs_update_today(&self, kind: InfoKind, now: DateTime<Utc>) -> Result<bool, DbError> {
        Ok(match self.info_last_updated(kind).await? {
            Some(last) => last.date_naive() != now.date_naive(),
            None => true,
        })
    }
}
