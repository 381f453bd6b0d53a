//! # Command-Line Interface / 命令行接口
//!
//! Builds the `snooker-calendar` command tree and dispatches to the commands.
//! The language is pre-parsed so that help texts are already localized.
//!
//! 构建 `snooker-calendar` 命令树并分发到各命令。
//! 语言参数会被预先解析，以便帮助文本已经本地化。

pub mod commands;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{env, path::PathBuf};

use crate::core::config::{AppConfig, DEFAULT_CONFIG_FILE, load_config};
use crate::infra::t;

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// It looks for a `--lang <VALUE>` argument.
fn pre_parse_language() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|arg| arg == "--lang")
        .and_then(|pos| args.get(pos + 1))
        .cloned()
}

fn season_arg(locale: &str) -> Arg {
    Arg::new("season")
        .short('s')
        .long("season")
        .help(t!("arg.season", locale = locale).to_string())
        .value_name("SEASON")
        .value_parser(clap::value_parser!(i64))
        .action(ArgAction::Set)
}

pub fn build_cli(locale: &str) -> Command {
    Command::new("snooker-calendar")
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli.about", locale = locale).to_string())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli.lang", locale = locale).to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help(t!("cli.config", locale = locale).to_string())
                .value_name("CONFIG")
                .default_value(DEFAULT_CONFIG_FILE)
                .value_parser(clap::value_parser!(PathBuf))
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(Command::new("serve").about(t!("cmd.serve_about", locale = locale).to_string()))
        .subcommand(
            Command::new("schedule").about(t!("cmd.schedule_about", locale = locale).to_string()),
        )
        .subcommand(
            Command::new("generate")
                .about(t!("cmd.generate_about", locale = locale).to_string())
                .arg(
                    Arg::new("player")
                        .help(t!("arg.player", locale = locale).to_string())
                        .value_name("PLAYER_ID")
                        .required(true)
                        .value_parser(clap::value_parser!(i64)),
                )
                .arg(season_arg(locale))
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help(t!("arg.output", locale = locale).to_string())
                        .value_name("FILE")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("batch")
                .about(t!("cmd.batch_about", locale = locale).to_string())
                .arg(season_arg(locale)),
        )
        .subcommand(
            Command::new("fetch")
                .about(t!("cmd.fetch_about", locale = locale).to_string())
                .subcommand_required(true)
                .subcommand(
                    Command::new("events")
                        .about(t!("cmd.fetch_events_about", locale = locale).to_string())
                        .arg(season_arg(locale)),
                )
                .subcommand(
                    Command::new("players")
                        .about(t!("cmd.fetch_players_about", locale = locale).to_string()),
                )
                .subcommand(
                    Command::new("player")
                        .about(t!("cmd.fetch_player_about", locale = locale).to_string())
                        .arg(
                            Arg::new("player")
                                .help(t!("arg.player", locale = locale).to_string())
                                .value_name("PLAYER_ID")
                                .required(true)
                                .value_parser(clap::value_parser!(i64)),
                        ),
                ),
        )
        .subcommand(
            Command::new("init")
                .about(t!("cmd.init_about", locale = locale).to_string())
                .arg(
                    Arg::new("non-interactive")
                        .long("non-interactive")
                        .help(t!("arg.non_interactive", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn load(path: &PathBuf, locale: &str) -> Result<AppConfig> {
    load_config(path).with_context(|| {
        t!("config.load_failed", locale = locale, path = path.display().to_string()).to_string()
    })
}

pub async fn run() -> Result<()> {
    // Pre-parse language and initialize i18n first.
    let explicit_lang = pre_parse_language();
    match &explicit_lang {
        Some(lang) => rust_i18n::set_locale(lang),
        None => crate::init(),
    }
    let mut language = rust_i18n::locale().to_string();

    let matches = build_cli(&language).get_matches();
    let config_path = matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    if let Some(("init", init_matches)) = matches.subcommand() {
        let non_interactive = init_matches.get_flag("non-interactive");

        // Show language detection message if it was auto-detected
        if explicit_lang.is_none() {
            println!(
                "🌐 {}",
                t!("system_language_detected", locale = &language, lang = &language)
            );
        }
        return commands::init::run_init_wizard(&config_path, &language, non_interactive);
    }

    let config = load(&config_path, &language)?;
    if explicit_lang.is_none() {
        if let Some(lang) = config.language.as_deref() {
            rust_i18n::set_locale(lang);
            language = lang.to_string();
        }
    }

    dispatch(&matches, config, &language).await
}

async fn dispatch(matches: &ArgMatches, config: AppConfig, language: &str) -> Result<()> {
    match matches.subcommand() {
        Some(("serve", _)) => commands::serve::execute(config, language).await,
        Some(("schedule", _)) => commands::schedule::execute(config, language).await,
        Some(("generate", m)) => {
            let player = m.get_one::<i64>("player").copied().unwrap_or_default();
            let season = m.get_one::<i64>("season").copied();
            let output = m.get_one::<PathBuf>("output").cloned();
            commands::generate::execute(config, player, season, output, language).await
        }
        Some(("batch", m)) => {
            let season = m.get_one::<i64>("season").copied();
            commands::batch::execute(config, season, language).await
        }
        Some(("fetch", m)) => match m.subcommand() {
            Some(("events", em)) => {
                let season = em.get_one::<i64>("season").copied();
                commands::fetch::events(config, season, language).await
            }
            Some(("players", _)) => commands::fetch::players(config, language).await,
            Some(("player", pm)) => {
                let player = pm.get_one::<i64>("player").copied().unwrap_or_default();
                commands::fetch::player(config, player, language).await
            }
            _ => Ok(()),
        },
        _ => {
            // Clap has already printed help for a missing subcommand.
            Ok(())
        }
    }
}
