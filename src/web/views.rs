//! # Views Module / 视图模块
//!
//! Server-rendered root views of the web front: the ranked player list with
//! calendar links, and the update log.
//!
//! 网页前端的服务端渲染根视图：带日历链接的排名球员列表，以及更新日志。

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use maud::{Markup, html};

use crate::core::config::FrontendConfig;
use crate::core::models::{InfoKind, InfoLastUpdated, RankedPlayer};
use crate::web::changelog::changelog;
use crate::web::i18n::{AVAILABLE_LOCALES, I18n, MessageKey};
use crate::web::router::{Router, View};

/// Data a page shows. / 页面显示的数据。
#[derive(Debug, Clone, Default)]
pub struct PageData {
    pub players: Vec<RankedPlayer>,
    pub info: Vec<InfoLastUpdated>,
}

impl PageData {
    pub fn last_updated(&self, kind: InfoKind) -> Option<DateTime<Utc>> {
        self.info
            .iter()
            .find(|i| i.info == kind.as_str())
            .and_then(|i| i.lastupdated)
    }
}

pub struct ViewContext<'a> {
    pub i18n: I18n,
    pub config: &'a FrontendConfig,
    /// Zone timestamps are displayed in.
    pub timezone: Tz,
    pub router: &'a Router,
    pub data: &'a PageData,
}

/// Renders a root view. / 渲染根视图。
pub fn render(view: View, ctx: &ViewContext<'_>) -> Markup {
    html! {
        (header(ctx))
        main {
            @match view {
                View::Home => (home(ctx)),
                View::UpdateLog => (update_log(ctx)),
            }
        }
    }
}

fn header(ctx: &ViewContext<'_>) -> Markup {
    let t = |key| ctx.i18n.t(key);
    let home = ctx.router.href("Home").unwrap_or_default();
    let log = ctx.router.href("UpdateLog").unwrap_or_default();
    html! {
        header {
            h1 { (t(MessageKey::HeaderTitle)) }
            nav {
                a href={ "/?lang=" (ctx.i18n.locale()) (home) } { (t(MessageKey::HeaderTitle)) }
                a href={ "/log.html?lang=" (ctx.i18n.locale()) (log) } { (t(MessageKey::HeaderUpdateLog)) }
                @for locale in AVAILABLE_LOCALES {
                    a.lang href={ "?lang=" (locale) } { (language_name(ctx.i18n, locale)) }
                }
            }
            (about(ctx.i18n, &ctx.config.contact_mail))
            div.info {
                span { (t(MessageKey::HeaderLatestEventInfoDate)) ": " (format_timestamp(ctx.data.last_updated(InfoKind::Events), ctx.timezone, ctx.i18n)) }
                " · "
                span { (t(MessageKey::HeaderLatestPlayerInfoDate)) ": " (format_timestamp(ctx.data.last_updated(InfoKind::Players), ctx.timezone, ctx.i18n)) }
            }
        }
    }
}

/// Developer and repository from the package metadata plus the configured
/// feedback address; missing values show the "none yet" placeholder.
fn about(i18n: I18n, contact: &str) -> Markup {
    let placeholder = i18n.t(MessageKey::HeaderTemporary);
    let authors = env!("CARGO_PKG_AUTHORS");
    let repository = env!("CARGO_PKG_REPOSITORY");
    html! {
        details.about {
            summary { (i18n.t(MessageKey::HeaderAbout)) }
            dl {
                dt { (i18n.t(MessageKey::HeaderAuthor)) }
                dd { @if authors.is_empty() { (placeholder) } @else { (authors) } }
                dt { (i18n.t(MessageKey::HeaderGithub)) }
                dd {
                    @if repository.is_empty() { (placeholder) }
                    @else { a href=(repository) target="_blank" rel="noopener" { (repository) } }
                }
                dt { (i18n.t(MessageKey::HeaderContactMail)) }
                dd {
                    @if contact.is_empty() { (placeholder) }
                    @else { button.copy type="button" data-link=(contact) { (contact) } }
                }
            }
        }
    }
}

fn language_name(i18n: I18n, locale: &str) -> &'static str {
    match locale {
        "zh" => i18n.t(MessageKey::AppCn),
        _ => i18n.t(MessageKey::AppEn),
    }
}

fn home(ctx: &ViewContext<'_>) -> Markup {
    let t = |key| ctx.i18n.t(key);
    html! {
        @if ctx.data.players.is_empty() {
            p.empty { (t(MessageKey::AppNoData)) }
        } @else {
            table {
                thead {
                    tr {
                        th { (t(MessageKey::AppPosition)) }
                        th { (t(MessageKey::AppName)) }
                        th { (t(MessageKey::AppSumValue)) }
                        th { (t(MessageKey::AppRankingTitles)) }
                        th { (t(MessageKey::AppLastUpdated)) }
                        th { (t(MessageKey::AppDownloadIcs)) }
                    }
                }
                tbody {
                    @for player in &ctx.data.players {
                        (player_row(ctx, player))
                    }
                }
            }
        }
    }
}

fn player_row(ctx: &ViewContext<'_>, player: &RankedPlayer) -> Markup {
    let t = |key| ctx.i18n.t(key);
    let download = ctx.config.calendar_download_url(player.player_id);
    let subscribe = ctx.config.calendar_subscribe_url(player.player_id);
    let name = player
        .display_name()
        .unwrap_or_else(|| format!("Player {}", player.player_id));
    html! {
        tr {
            td.num { (player.position) }
            td { (name) }
            td.num { (format_money(player.sum_value)) }
            td.num { (player.num_ranking_titles.unwrap_or_default()) }
            td { (format_timestamp(player.last_updated, ctx.timezone, ctx.i18n)) }
            td.actions {
                a href=(download) { (t(MessageKey::AppDownload)) }
                a href=(subscribe) { (t(MessageKey::AppSubscribe)) }
                a href=(google_calendar_url(&subscribe)) target="_blank" rel="noopener" { (t(MessageKey::AppGoogleCalendar)) }
                button.copy type="button" data-link=(subscribe) title=(t(MessageKey::AppCopyIcsLink)) {
                    (t(MessageKey::AppCopy))
                }
            }
        }
    }
}

fn update_log(ctx: &ViewContext<'_>) -> Markup {
    let log = changelog(ctx.i18n.locale());
    html! {
        h2 { (ctx.i18n.t(MessageKey::UpdateLogTitle)) }
        @for entry in log.entries.iter().rev() {
            div.log-entry {
                h2 { (entry.version) }
                div.date { (entry.date) }
                ul {
                    @for line in &entry.details {
                        li { (line) }
                    }
                }
            }
        }
    }
}

/// Google Calendar "add by URL" link for a webcal subscription.
pub fn google_calendar_url(subscribe_url: &str) -> String {
    reqwest::Url::parse_with_params(
        "https://calendar.google.com/calendar/render",
        &[("cid", subscribe_url)],
    )
    .map(String::from)
    .unwrap_or_default()
}

/// `YYYY-MM-DD HH:MM <zone>` in `tz`, or the localized "no data".
pub fn format_timestamp(ts: Option<DateTime<Utc>>, tz: Tz, i18n: I18n) -> String {
    match ts {
        Some(ts) => format!("{} {}", ts.with_timezone(&tz).format("%Y-%m-%d %H:%M"), tz.name()),
        None => i18n.t(MessageKey::AppNoData).to_string(),
    }
}

fn format_money(value: f64) -> String {
    let whole = value.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if whole < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
