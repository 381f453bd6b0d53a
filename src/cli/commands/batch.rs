//! # Batch Command / 批量命令
//!
//! Generates the calendars of every ranked player once and prints a summary.
//!
//! 为所有上榜球员生成一次日历并打印摘要。

use anyhow::{Context, Result};
use colored::*;

use crate::core::batch::generate_all_players_calendars;
use crate::core::config::AppConfig;
use crate::infra::t;
use crate::reporting::print_batch_summary;

pub async fn execute(config: AppConfig, season: Option<i64>, locale: &str) -> Result<()> {
    let state = super::connect(config, locale).await?;
    let season = state.season_or_current(season).await;

    println!("{}", t!("batch.starting", locale = locale, season = season).bold());
    let report = generate_all_players_calendars(&state, Some(season))
        .await
        .with_context(|| t!("batch.run_failed", locale = locale).to_string())?;

    print_batch_summary(&report, locale);
    Ok(())
}
