//! # Serve Command / 服务命令
//!
//! Runs the HTTP service until Ctrl-C.

use anyhow::{Context, Result};
use colored::*;

use crate::core::config::AppConfig;
use crate::infra::t;
use crate::web;

pub async fn execute(config: AppConfig, locale: &str) -> Result<()> {
    let addr = format!("{}:{}", config.server.address, config.server.port);
    let state = super::connect(config, locale).await?;

    println!("{}", t!("serve.starting", locale = locale, addr = &addr).green());
    web::serve(state, super::shutdown_token())
        .await
        .with_context(|| t!("serve.failed", locale = locale, addr = &addr).to_string())?;
    println!("{}", t!("serve.stopped", locale = locale).dimmed());
    Ok(())
}
