//! # Schedule Command / 调度命令
//!
//! Runs the recurring generation and update jobs until Ctrl-C.

use anyhow::{Context, Result};
use colored::*;

use crate::core::Scheduler;
use crate::core::config::AppConfig;
use crate::infra::t;

pub async fn execute(config: AppConfig, locale: &str) -> Result<()> {
    let state = super::connect(config, locale).await?;

    println!("{}", t!("schedule.starting", locale = locale).green());
    Scheduler::new(state)
        .run(super::shutdown_token())
        .await
        .with_context(|| t!("schedule.invalid_config", locale = locale).to_string())?;
    println!("{}", t!("schedule.stopped", locale = locale).dimmed());
    Ok(())
}
