//! # Generate Command / 生成命令
//!
//! Generates one player's calendar and writes it to a file.
//!
//! 生成单个球员的日历并写入文件。

use anyhow::{Context, Result, bail};
use colored::*;
use std::path::PathBuf;

use crate::core::calendar::{count_events, generate_player_calendar};
use crate::core::config::AppConfig;
use crate::infra::{fs, t};

/// Default file name, `player_<id>_<season>.ics` in the working directory.
pub fn default_output(player_id: i64, season: i64) -> PathBuf {
    PathBuf::from(format!("player_{player_id}_{season}.ics"))
}

pub async fn execute(
    config: AppConfig,
    player_id: i64,
    season: Option<i64>,
    output: Option<PathBuf>,
    locale: &str,
) -> Result<()> {
    let state = super::connect(config, locale).await?;
    let season = state.season_or_current(season).await;

    println!(
        "{}",
        t!("generate.fetching", locale = locale, id = player_id, season = season).blue()
    );
    let ics = generate_player_calendar(&state, player_id, season)
        .await
        .with_context(|| t!("generate.failed", locale = locale, id = player_id).to_string())?;
    let Some(ics) = ics else {
        bail!(
            "{}",
            t!("generate.no_matches", locale = locale, id = player_id, season = season)
        );
    };

    let path = output.unwrap_or_else(|| default_output(player_id, season));
    fs::write_atomic(&path, &ics).with_context(|| {
        t!("generate.write_failed", locale = locale, path = path.display().to_string()).to_string()
    })?;

    println!(
        "{}",
        t!("generate.success", locale = locale, path = path.display().to_string()).green()
    );
    println!(
        "{}",
        t!("generate.event_count", locale = locale, count = count_events(&ics))
    );
    Ok(())
}
