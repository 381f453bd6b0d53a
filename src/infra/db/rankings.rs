//! Ranking repository and the ranked-player listing.

use crate::core::models::{RankedPlayer, Ranking};
use crate::infra::db::DbError;
use chrono::DateTime;
use sqlx::{Row, SqlitePool};

/// Repository for ranking operations.
pub struct RankingRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RankingRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Replaces the stored ranking list in one transaction.
    pub async fn replace_all(&self, rankings: &[Ranking]) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM rankings").execute(&mut *tx).await?;
        for ranking in rankings {
            sqlx::query(
                "INSERT OR REPLACE INTO rankings (position, player_id, sum_value) VALUES (?, ?, ?)",
            )
            .bind(ranking.position)
            .bind(ranking.player_id)
            .bind(ranking.sum)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn find_by_player(&self, player_id: i64) -> Result<Option<Ranking>, DbError> {
        let row = sqlx::query_as::<_, (i64, i64, f64)>(
            "SELECT position, player_id, sum_value FROM rankings WHERE player_id = ? ORDER BY position LIMIT 1",
        )
        .bind(player_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(position, player_id, sum)| Ranking {
            position,
            player_id,
            sum,
            ..Ranking::default()
        }))
    }

    /// Lists ranked players ordered by position.
    ///
    /// `page` is 1-based (values below 1 are treated as 1); `limit <= 0`
    /// returns every row. `search` matches first or last name as a
    /// case-insensitive substring.
    pub async fn ranked_players(
        &self,
        page: i64,
        limit: i64,
        search: Option<&str>,
    ) -> Result<Vec<RankedPlayer>, DbError> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", escape_like(s)));
        let (limit, offset) = if limit > 0 {
            // Saturates for absurd pages; SQLite returns no rows past the end.
            (limit, (page.max(1) - 1).saturating_mul(limit))
        } else {
            (-1, 0)
        };

        let rows = sqlx::query(
            r#"
            SELECT r.position, r.player_id, r.sum_value,
                   p.type, p.first_name, p.last_name, p.surname_first, p.nationality, p.born,
                   p.num_ranking_titles, i.last_updated
            FROM rankings r
            LEFT JOIN players p ON p.id = r.player_id
            LEFT JOIN ics_last_updated i ON i.player_id = r.player_id
            WHERE ?1 IS NULL
               OR p.first_name LIKE ?1 ESCAPE '\'
               OR p.last_name LIKE ?1 ESCAPE '\'
            ORDER BY r.position
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let last_updated: Option<i64> = row.try_get("last_updated")?;
                Ok(RankedPlayer {
                    kind: row.try_get("type")?,
                    firstname: row.try_get("first_name")?,
                    lastname: row.try_get("last_name")?,
                    surname_first: row.try_get("surname_first")?,
                    nationality: row.try_get("nationality")?,
                    born: row.try_get("born")?,
                    num_ranking_titles: row.try_get("num_ranking_titles")?,
                    position: row.try_get("position")?,
                    player_id: row.try_get("player_id")?,
                    sum_value: row.try_get("sum_value")?,
                    last_updated: last_updated.and_then(|ts| DateTime::from_timestamp(ts, 0)),
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(DbError::from)
    }
}

fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
