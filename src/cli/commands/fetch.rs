//! # Fetch Command / 采集命令
//!
//! Copies events, rankings or a single player from snooker.org into the
//! database. A completed events or players run stamps its info record the
//! same way the scheduled updates do.
//!
//! 将赛事、排名或单个球员从 snooker.org 复制到数据库。
//! 完成的赛事或球员采集会像定时更新一样记录更新时间。

use anyhow::{Context, Result, bail};
use chrono::Utc;
use colored::*;

use crate::core::config::AppConfig;
use crate::core::ingest::{fetch_and_store_events, fetch_and_store_players, fetch_single_player};
use crate::core::models::InfoKind;
use crate::infra::t;
use crate::reporting::print_ingest_summary;

pub async fn events(config: AppConfig, season: Option<i64>, locale: &str) -> Result<()> {
    let state = super::connect(config, locale).await?;
    let summary = fetch_and_store_events(&state, season)
        .await
        .with_context(|| t!("fetch.events_failed", locale = locale).to_string())?;
    state
        .db
        .updates()
        .record_info(InfoKind::Events, Utc::now())
        .await?;

    print_ingest_summary(&t!("fetch.events_label", locale = locale), &summary, locale);
    Ok(())
}

pub async fn players(config: AppConfig, locale: &str) -> Result<()> {
    let state = super::connect(config, locale).await?;
    let summary = fetch_and_store_players(&state)
        .await
        .with_context(|| t!("fetch.players_failed", locale = locale).to_string())?;
    state
        .db
        .updates()
        .record_info(InfoKind::Players, Utc::now())
        .await?;

    print_ingest_summary(&t!("fetch.players_label", locale = locale), &summary, locale);
    Ok(())
}

pub async fn player(config: AppConfig, player_id: i64, locale: &str) -> Result<()> {
    let state = super::connect(config, locale).await?;
    let stored = fetch_single_player(&state.client, &state.db, player_id)
        .await
        .with_context(|| t!("fetch.player_failed", locale = locale, id = player_id).to_string())?;

    match stored {
        Some(player) => {
            println!(
                "{}",
                t!(
                    "fetch.player_stored",
                    locale = locale,
                    id = player_id,
                    name = player.display_name()
                )
                .green()
            );
            Ok(())
        }
        None => bail!("{}", t!("fetch.player_not_found", locale = locale, id = player_id)),
    }
}
