//! # Configuration Initialization Module / 配置初始化模块
//!
//! Creates a `snooker.toml` through an interactive wizard, or writes the
//! commented default template when run with `--non-interactive`.
//!
//! 通过交互式向导创建 `snooker.toml`，或在使用 `--non-interactive` 时
//! 写入带注释的默认模板。
//!
//! ## Features / 功能特性
//!
//! - **Interactive Wizard**: asks for the snooker.org requester id, port,
//!   output directory and CLI language
//! - **Overwrite Protection**: confirms before replacing an existing file
//!
//! - **交互式向导**: 询问 snooker.org 请求者标识、端口、输出目录和命令行语言
//! - **覆盖保护**: 替换已有文件前进行确认

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use std::fs;
use std::path::Path;

use crate::core::config::AppConfig;
use crate::infra::t;

/// Languages offered by the wizard.
const LANGUAGES: &[&str] = &["en", "zh"];

/// The template written by `init --non-interactive`.
/// 由 `init --non-interactive` 写入的模板。
pub const DEFAULT_CONFIG: &str = r#"# Snooker Calendar configuration / 斯诺克日历配置

# Language for CLI output / 命令行输出的语言
# language = "en"

[server]
address = "0.0.0.0"
port = 8000
# Origins allowed by CORS / CORS 允许的来源
allowed_origins = []

[database]
# `~` is expanded, `:memory:` keeps everything in memory
path = "snooker.db"

[api]
base_url = "https://api.snooker.org/"
# Required by snooker.org, also read from SNOOKER_X_REQUESTED_BY
# x_requested_by = "YourRequesterId"
ranking_type = "MoneyRankings"
request_delay_seconds = 1
timeout_secs = 15
max_retries = 3

[calendar]
output_dir = "ics_calendars"
per_player_timeout_secs = 90
concurrency = 1

[scheduler]
# All times are UTC / 所有时间均为 UTC
generate_interval_minutes = 15
window_start_hour = 2
window_end_hour = 5
events_fallback = "05:10"
rankings_fallback = "05:40"

[frontend]
# backend = "snookerapis.arkady14.fun"
# default_language = "en"
# timezone = "Asia/Shanghai"
# contact_mail = "feedback@example.org"
"#;

/// Runs the wizard and writes the configuration to `path`.
///
/// 运行向导并将配置写入 `path`。
///
/// # Process Flow / 处理流程
/// 1. Display welcome message / 显示欢迎消息
/// 2. Confirm overwrite of an existing file / 确认覆盖已有文件
/// 3. Prompt for the settings, or take the template / 提示输入设置，或使用模板
/// 4. Write the file and print the next step / 写入文件并打印后续步骤
pub fn run_init_wizard(path: &Path, language: &str, non_interactive: bool) -> Result<()> {
    if non_interactive {
        if path.exists() {
            println!(
                "{}",
                t!(
                    "init.file_exists",
                    locale = language,
                    path = path.display().to_string()
                )
                .yellow()
            );
            return Ok(());
        }
        return write_config(path, DEFAULT_CONFIG, language);
    }

    let theme = ColorfulTheme::default();
    println!(
        "\n{}",
        t!("init.wizard_welcome", locale = language).bold().cyan()
    );
    println!("{}\n", t!("init.wizard_description", locale = language));

    if !confirm_overwrite(&theme, path, language)? {
        println!("{}", t!("init.aborted", locale = language).yellow());
        return Ok(());
    }

    let config = prompt_for_config(&theme, language)?;
    let toml_string = toml::to_string_pretty(&config)
        .context(t!("init.serialize_failed", locale = language).to_string())?;
    write_config(path, &toml_string, language)
}

fn confirm_overwrite(theme: &ColorfulTheme, path: &Path, language: &str) -> Result<bool> {
    if path.exists() {
        Confirm::with_theme(theme)
            .with_prompt(
                t!(
                    "init.overwrite_prompt",
                    locale = language,
                    path = path.display().to_string()
                )
                .to_string(),
            )
            .default(false)
            .interact()
            .context(t!("init.user_confirmation_failed", locale = language).to_string())
    } else {
        Ok(true)
    }
}

fn prompt_for_config(theme: &ColorfulTheme, language: &str) -> Result<AppConfig> {
    let mut config = AppConfig::default();
    let input_failed = || t!("init.input_failed", locale = language).to_string();

    let requester: String = Input::with_theme(theme)
        .with_prompt(t!("init.x_requested_by_prompt", locale = language).to_string())
        .allow_empty(true)
        .interact_text()
        .with_context(input_failed)?;
    config.api.x_requested_by = Some(requester.trim().to_string()).filter(|r| !r.is_empty());

    config.server.port = Input::with_theme(theme)
        .with_prompt(t!("init.port_prompt", locale = language).to_string())
        .default(config.server.port)
        .interact_text()
        .with_context(input_failed)?;

    config.calendar.output_dir = Input::with_theme(theme)
        .with_prompt(t!("init.output_dir_prompt", locale = language).to_string())
        .default(config.calendar.output_dir.clone())
        .interact_text()
        .with_context(input_failed)?;

    let current = LANGUAGES
        .iter()
        .position(|l| language.starts_with(l))
        .unwrap_or(0);
    let selected = Select::with_theme(theme)
        .with_prompt(t!("init.language_prompt", locale = language).to_string())
        .items(LANGUAGES)
        .default(current)
        .interact()
        .with_context(input_failed)?;
    config.language = LANGUAGES.get(selected).map(|l| l.to_string());

    Ok(config)
}

fn write_config(path: &Path, content: &str, language: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| {
            t!(
                "init.write_failed",
                locale = language,
                path = parent.display().to_string()
            )
            .to_string()
        })?;
    }
    fs::write(path, content).with_context(|| {
        t!(
            "init.write_failed",
            locale = language,
            path = path.display().to_string()
        )
        .to_string()
    })?;

    println!(
        "\n{} {}",
        "✔".green(),
        t!(
            "init.success_created",
            locale = language,
            path = path.display().to_string()
        )
        .bold()
    );
    println!("{}", t!("init.usage_hint", locale = language));
    Ok(())
}
