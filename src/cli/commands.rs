//! # Commands Module / 命令模块
//!
//! One module per subcommand. Each command loads what it needs from the
//! shared [`AppState`] and prints localized progress to the console.
//!
//! 每个子命令对应一个模块。各命令从共享的 [`AppState`] 获取所需内容，
//! 并在控制台输出本地化的进度信息。

pub mod batch;
pub mod fetch;
pub mod generate;
pub mod init;
pub mod schedule;
pub mod serve;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::core::config::AppConfig;
use crate::core::state::AppState;
use crate::infra::t;

/// Opens the database and builds the API client for a command.
pub(crate) async fn connect(config: AppConfig, locale: &str) -> Result<Arc<AppState>> {
    let path = config.database.resolved_path();
    AppState::connect(config)
        .await
        .with_context(|| t!("state.connect_failed", locale = locale, path = path).to_string())
}

/// A token cancelled on Ctrl-C.
///
/// 在收到 Ctrl-C 时被取消的令牌。
pub(crate) fn shutdown_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            trigger.cancel();
        }
    });
    cancel
}
