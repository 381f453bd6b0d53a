//! Event and round repositories.

use crate::core::models::{Event, Round};
use crate::infra::db::DbError;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Repository for event operations.
pub struct EventRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> EventRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, event: &Event) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO events (
                id, name, start_date, end_date, sponsor, season, type, venue, city, country,
                sex, age_group, url, stage, ranking_type, defending_champion, tour
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.id)
        .bind(&event.name)
        .bind(&event.start_date)
        .bind(&event.end_date)
        .bind(&event.sponsor)
        .bind(event.season)
        .bind(&event.kind)
        .bind(&event.venue)
        .bind(&event.city)
        .bind(&event.country)
        .bind(&event.sex)
        .bind(&event.age_group)
        .bind(&event.url)
        .bind(&event.stage)
        .bind(&event.ranking_type)
        .bind(event.defending_champion)
        .bind(&event.tour)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    pub async fn find(&self, event_id: i64) -> Result<Option<Event>, DbError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, start_date, end_date, sponsor, season, type, venue, city, country,
                   sex, age_group, url, stage, ranking_type, defending_champion, tour
            FROM events
            WHERE id = ?
            "#,
        )
        .bind(event_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| event_from_row(&r)).transpose()?)
    }
}

fn event_from_row(row: &SqliteRow) -> Result<Event, sqlx::Error> {
    Ok(Event {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        sponsor: row.try_get("sponsor")?,
        season: row.try_get("season")?,
        kind: row.try_get("type")?,
        venue: row.try_get("venue")?,
        city: row.try_get("city")?,
        country: row.try_get("country")?,
        sex: row.try_get("sex")?,
        age_group: row.try_get("age_group")?,
        url: row.try_get("url")?,
        stage: row.try_get("stage")?,
        ranking_type: row.try_get("ranking_type")?,
        defending_champion: row.try_get("defending_champion")?,
        tour: row.try_get("tour")?,
    })
}

/// Repository for round operations.
pub struct RoundRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RoundRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Stores a round, keyed by `(event_id, round)`.
    pub async fn upsert(&self, round: &Round) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO rounds (
                event_id, round, round_name, main_event, distance, num_left, num_matches, note,
                value_type, rank, money, seed_gets_half, actual_money, currency, conversion_rate,
                points, seed_points
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(round.event_id)
        .bind(round.round)
        .bind(&round.round_name)
        .bind(round.main_event)
        .bind(round.distance)
        .bind(round.num_left)
        .bind(round.num_matches)
        .bind(&round.note)
        .bind(&round.value_type)
        .bind(round.rank)
        .bind(round.money)
        .bind(round.seed_gets_half)
        .bind(round.actual_money)
        .bind(&round.currency)
        .bind(round.conversion_rate)
        .bind(round.points)
        .bind(round.seed_points)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    pub async fn find(&self, event_id: i64, round: i64) -> Result<Option<Round>, DbError> {
        let row = sqlx::query(
            r#"
            SELECT event_id, round, round_name, main_event, distance, num_left, num_matches, note,
                   value_type, rank, money, seed_gets_half, actual_money, currency,
                   conversion_rate, points, seed_points
            FROM rounds
            WHERE event_id = ? AND round = ?
            "#,
        )
        .bind(event_id)
        .bind(round)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| round_from_row(&r)).transpose()?)
    }
}

fn round_from_row(row: &SqliteRow) -> Result<Round, sqlx::Error> {
    Ok(Round {
        event_id: row.try_get("event_id")?,
        round: row.try_get("round")?,
        round_name: row.try_get("round_name")?,
        main_event: row.try_get("main_event")?,
        distance: row.try_get("distance")?,
        num_left: row.try_get("num_left")?,
        num_matches: row.try_get("num_matches")?,
        note: row.try_get("note")?,
        value_type: row.try_get("value_type")?,
        rank: row.try_get("rank")?,
        money: row.try_get("money")?,
        seed_gets_half: row.try_get("seed_gets_half")?,
        actual_money: row.try_get("actual_money")?,
        currency: row.try_get("currency")?,
        conversion_rate: row.try_get("conversion_rate")?,
        points: row.try_get("points")?,
        seed_points: row.try_get("seed_points")?,
    })
}
