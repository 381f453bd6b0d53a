//! Player repository.

use crate::core::models::Player;
use crate::infra::db::DbError;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Repository for player operations.
pub struct PlayerRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PlayerRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a player or replaces the stored one.
    pub async fn upsert(&self, player: &Player) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO players (
                id, type, first_name, middle_name, last_name, short_name, nationality, sex,
                born, surname_first, num_ranking_titles, num_maximums, first_season_as_pro,
                last_season_as_pro, died
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(player.id)
        .bind(player.kind)
        .bind(&player.first_name)
        .bind(&player.middle_name)
        .bind(&player.last_name)
        .bind(&player.short_name)
        .bind(&player.nationality)
        .bind(&player.sex)
        .bind(&player.born)
        .bind(player.surname_first)
        .bind(player.num_ranking_titles)
        .bind(player.num_maximums)
        .bind(player.first_season_as_pro)
        .bind(player.last_season_as_pro)
        .bind(&player.died)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    pub async fn find(&self, player_id: i64) -> Result<Option<Player>, DbError> {
        let row = sqlx::query(
            r#"
            SELECT id, type, first_name, middle_name, last_name, short_name, nationality, sex,
                   born, surname_first, num_ranking_titles, num_maximums, first_season_as_pro,
                   last_season_as_pro, died
            FROM players
            WHERE id = ?
            "#,
        )
        .bind(player_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| player_from_row(&r)).transpose()?)
    }
}

fn player_from_row(row: &SqliteRow) -> Result<Player, sqlx::Error> {
    Ok(Player {
        id: row.try_get("id")?,
        kind: row.try_get("type")?,
        first_name: row.try_get("first_name")?,
        middle_name: row.try_get("middle_name")?,
        last_name: row.try_get("last_name")?,
        short_name: row.try_get("short_name")?,
        nationality: row.try_get("nationality")?,
        sex: row.try_get("sex")?,
        born: row.try_get("born")?,
        surname_first: row.try_get("surname_first")?,
        num_ranking_titles: row.try_get("num_ranking_titles")?,
        num_maximums: row.try_get("num_maximums")?,
        first_season_as_pro: row.try_get("first_season_as_pro")?,
        last_season_as_pro: row.try_get("last_season_as_pro")?,
        died: row.try_get("died")?,
    })
}
