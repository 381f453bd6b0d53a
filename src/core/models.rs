//! # Data Models Module / 数据模型模块
//!
//! This module defines the records exchanged with snooker.org and stored in the
//! database: players, events, rounds, rankings and matches, plus the joined
//! views served by the HTTP API.
//!
//! 此模块定义了与 snooker.org 交换并存储在数据库中的记录：
//! 球员、赛事、轮次、排名和比赛，以及 HTTP API 提供的联合视图。

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A player as returned by `?p=<id>`.
/// 通过 `?p=<id>` 返回的球员信息。
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Player {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "Type")]
    pub kind: i64,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub short_name: Option<String>,
    pub nationality: Option<String>,
    pub sex: Option<String>,
    pub born: Option<String>,
    pub surname_first: bool,
    pub num_ranking_titles: i64,
    pub num_maximums: i64,
    pub first_season_as_pro: i64,
    pub last_season_as_pro: i64,
    pub died: Option<String>,
}

impl Player {
    /// Display name honoring `surname_first`, e.g. "Ding, Junhui" or "Mark Selby".
    /// 按 `surname_first` 规则格式化的显示名。
    pub fn display_name(&self) -> String {
        join_name(
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default(),
            self.surname_first,
        )
    }
}

/// `"Last, First"` for surname-first players, `"First Last"` otherwise. A
/// missing part leaves just the other one.
pub fn join_name(first: &str, last: &str, surname_first: bool) -> String {
    match (first.is_empty(), last.is_empty()) {
        (false, false) if surname_first => format!("{last}, {first}"),
        (false, false) => format!("{first} {last}"),
        (true, _) => last.to_string(),
        (false, true) => first.to_string(),
    }
}

/// Formats a player's name, or `Player <id>` when the player is unknown.
pub fn format_player_name(player: Option<&Player>, player_id: i64) -> String {
    match player {
        Some(p) => p.display_name(),
        None => format!("Player {player_id}"),
    }
}

/// An event as returned by `?t=5&s=<season>`.
/// 通过 `?t=5&s=<season>` 返回的赛事信息。
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Event {
    #[serde(rename = "ID")]
    pub id: i64,
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sponsor: Option<String>,
    pub season: i64,
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    pub venue: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub sex: Option<String>,
    pub age_group: Option<String>,
    pub url: Option<String>,
    pub stage: Option<String>,
    pub ranking_type: Option<String>,
    pub defending_champion: i64,
    pub tour: Option<String>,
}

impl Event {
    /// Location line for descriptions: "City, Country", "City: ..", "Country: ..".
    pub fn location_line(&self) -> Option<String> {
        let city = self.city.as_deref().filter(|s| !s.is_empty());
        let country = self.country.as_deref().filter(|s| !s.is_empty());
        match (city, country) {
            (Some(city), Some(country)) => Some(format!("Location: {city}, {country}")),
            (Some(city), None) => Some(format!("City: {city}")),
            (None, Some(country)) => Some(format!("Country: {country}")),
            (None, None) => None,
        }
    }
}

/// A round of an event as returned by `?t=12&e=<event>`.
/// 通过 `?t=12&e=<event>` 返回的赛事轮次信息。
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Round {
    pub round: i64,
    pub round_name: Option<String>,
    #[serde(rename = "EventID")]
    pub event_id: i64,
    pub main_event: i64,
    /// Best-of distance in frames, 0 when unknown.
    /// 赛制局数，未知时为 0。
    pub distance: i64,
    pub num_left: i64,
    pub num_matches: i64,
    pub note: Option<String>,
    pub value_type: Option<String>,
    pub rank: i64,
    pub money: f64,
    pub seed_gets_half: i64,
    pub actual_money: f64,
    pub currency: Option<String>,
    pub conversion_rate: f64,
    pub points: i64,
    pub seed_points: i64,
}

/// A ranking row as returned by `?rt=<type>&s=<season>`.
/// 通过 `?rt=<type>&s=<season>` 返回的排名行。
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Ranking {
    pub position: i64,
    #[serde(rename = "PlayerID")]
    pub player_id: i64,
    pub season: i64,
    pub sum: f64,
    #[serde(rename = "Type")]
    pub kind: Option<String>,
}

/// A match as returned by `?t=8&p=<player>&s=<season>`.
/// 通过 `?t=8&p=<player>&s=<season>` 返回的比赛信息。
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Match {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "EventID")]
    pub event_id: i64,
    pub round: i64,
    pub number: i64,
    #[serde(rename = "Player1ID")]
    pub player1_id: i64,
    pub score1: i64,
    pub walkover1: bool,
    #[serde(rename = "Player2ID")]
    pub player2_id: i64,
    pub score2: i64,
    pub walkover2: bool,
    #[serde(rename = "WinnerID")]
    pub winner_id: i64,
    pub unfinished: bool,
    pub table_no: i64,
    pub estimated: bool,
    pub live_url: Option<String>,
    pub details_url: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub scheduled_date: Option<String>,
    pub note: Option<String>,
    pub extended_note: Option<String>,
}

impl Match {
    /// A match without a winner has not been played yet.
    /// 尚无胜者的比赛视为未来的比赛。
    pub fn is_future(&self) -> bool {
        self.winner_id == 0
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start_date.as_deref().and_then(parse_api_datetime)
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end_date.as_deref().and_then(parse_api_datetime)
    }

    pub fn scheduled(&self) -> Option<DateTime<Utc>> {
        self.scheduled_date.as_deref().and_then(parse_api_datetime)
    }
}

/// Parses snooker.org timestamps. Values with an offset (`Z`, `+01:00`) are
/// converted to UTC, naive values are taken as UTC, empty values yield `None`.
///
/// 解析 snooker.org 的时间戳。带偏移量的值转换为 UTC，
/// 不带时区的值按 UTC 处理，空值返回 `None`。
pub fn parse_api_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// A ranking joined with its player and the time its calendar was last written.
/// Field names follow the JSON served by `/api/players`.
///
/// 排名与球员信息及其日历最后写入时间的联合视图。
/// 字段名与 `/api/players` 返回的 JSON 保持一致。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedPlayer {
    #[serde(rename = "type")]
    pub kind: Option<i64>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub surname_first: Option<bool>,
    pub nationality: Option<String>,
    pub born: Option<String>,
    pub num_ranking_titles: Option<i64>,
    pub position: i64,
    pub player_id: i64,
    pub sum_value: f64,
    pub last_updated: Option<DateTime<Utc>>,
}

impl RankedPlayer {
    /// Name shown on the home page and in batch output, formatted like
    /// [`Player::display_name`]. `None` when both parts are missing.
    ///
    /// 主页和批处理输出中使用的名字，格式与 [`Player::display_name`] 一致。
    /// 两部分都缺失时返回 `None`。
    pub fn display_name(&self) -> Option<String> {
        let first = self.firstname.as_deref().unwrap_or_default().trim();
        let last = self.lastname.as_deref().unwrap_or_default().trim();
        if first.is_empty() && last.is_empty() {
            return None;
        }
        Some(join_name(first, last, self.surname_first.unwrap_or(false)))
    }
}

/// Which dataset an `info_last_updated` row tracks.
/// `info_last_updated` 行所跟踪的数据集。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfoKind {
    Events,
    Players,
}

impl InfoKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InfoKind::Events => "events",
            InfoKind::Players => "players",
        }
    }
}

impl fmt::Display for InfoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last successful update of a dataset, served by `/api/info/lastupdated`.
/// 数据集最后一次成功更新的时间，由 `/api/info/lastupdated` 提供。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoLastUpdated {
    pub info: String,
    pub lastupdated: Option<DateTime<Utc>>,
}
