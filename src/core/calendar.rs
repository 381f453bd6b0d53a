//! # Calendar Generation Module / 日历生成模块
//!
//! Turns a player's season matches into an iCalendar document. Player, event
//! and round details come from the local database; players that are not
//! stored yet are fetched from snooker.org on demand.
//!
//! 将球员某赛季的比赛转换为 iCalendar 文档。球员、赛事和轮次信息来自本地
//! 数据库；尚未存储的球员会按需从 snooker.org 获取。

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::core::error::ServiceError;
use crate::core::ingest::fetch_single_player;
use crate::core::models::{Event, Match, Player, Round, format_player_name};
use crate::core::state::AppState;
use crate::infra::ics::{self, IcsCalendar, IcsEvent};

pub const PRODID: &str = "-//Snooker Calendar Generator//snooker-calendar//";
pub const DATA_SOURCE: &str = "Data source: snooker.org";
/// Used when the round distance is unknown.
pub const DEFAULT_MATCH_HOURS: i64 = 3;
/// Estimated minutes per frame.
pub const MINUTES_PER_FRAME: i64 = 30;

/// Context looked up for one match. / 为一场比赛查询到的上下文。
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchDetails<'a> {
    pub player1: Option<&'a Player>,
    pub player2: Option<&'a Player>,
    pub event: Option<&'a Event>,
    pub round: Option<&'a Round>,
    /// World ranking positions, only looked up for future matches.
    pub ranking1: Option<i64>,
    pub ranking2: Option<i64>,
}

/// Builds the `VEVENT` of one match. Returns `None` when the match has no
/// usable date.
///
/// 构建一场比赛的 `VEVENT`。比赛没有可用日期时返回 `None`。
pub fn create_match_event(
    m: &Match,
    details: &MatchDetails<'_>,
    stamp: DateTime<Utc>,
) -> Option<IcsEvent> {
    let player1_name = format_player_name(details.player1, m.player1_id);
    let player2_name = format_player_name(details.player2, m.player2_id);
    let event_name = details
        .event
        .and_then(|e| e.name.clone())
        .unwrap_or_else(|| format!("Event {}", m.event_id));
    let round_name = details
        .round
        .and_then(|r| r.round_name.clone())
        .unwrap_or_else(|| format!("Round {}", m.round));

    let summary = format!(
        "{player1_name} vs {player2_name} | {} - {} | {event_name} | {round_name}",
        m.score1, m.score2
    );

    let future = m.is_future();
    let mut lines: Vec<String> = Vec::new();

    if let Some(p) = details.player1 {
        push_player_block(&mut lines, 1, &player1_name, p, future, details.ranking1);
    }
    lines.push(String::new());
    if let Some(p) = details.player2 {
        push_player_block(&mut lines, 2, &player2_name, p, future, details.ranking2);
    }
    lines.push(String::new());

    if let Some(event) = details.event {
        lines.push(format!("Event: {event_name}"));
        if event.season != 0 {
            lines.push(format!("Season: {}", event.season));
        }
        if let Some(venue) = non_empty(&event.venue) {
            lines.push(format!("Venue: {venue}"));
        }
        if let Some(location) = event.location_line() {
            lines.push(location);
        }
    }
    lines.push(String::new());

    let mut duration = Duration::hours(DEFAULT_MATCH_HOURS);
    if let Some(round) = details.round {
        lines.push(format!("Round: {round_name}"));
        if let Some(note) = non_empty(&round.note) {
            lines.push(format!("Round Note: {note}"));
        }
        if let Some(currency) = non_empty(&round.currency) {
            if round.actual_money != 0.0 {
                lines.push(format!("Prize Money: {} {currency}", round.actual_money));
            }
        }
        if round.distance > 0 {
            lines.push(format!("Match Distance: {} frames", round.distance));
            duration = Duration::minutes(round.distance * MINUTES_PER_FRAME);
        }
    }

    if m.estimated {
        lines.push("TIME IS ESTIMATED".to_string());
    }
    if let Some(url) = non_empty(&m.details_url) {
        lines.push(format!("Details: {url}"));
    }
    if let Some(note) = non_empty(&m.note) {
        lines.push(format!("Note: {note}"));
    }
    if let Some(note) = non_empty(&m.extended_note) {
        lines.push(format!("Extended Note: {note}"));
    }

    let mut status = Vec::new();
    if m.winner_id > 0 {
        let winner = if m.winner_id == m.player1_id {
            &player1_name
        } else {
            &player2_name
        };
        status.push(format!("Winner: {winner}"));
    } else if m.unfinished {
        status.push("Match Unfinished".to_string());
    }
    if m.walkover1 || m.walkover2 {
        let walkover = if m.walkover1 { &player1_name } else { &player2_name };
        status.push(format!("Walkover: {walkover}"));
    }
    if !status.is_empty() {
        lines.push(format!("Status: {}", status.join(", ")));
    }

    if let Some(url) = non_empty(&m.live_url) {
        lines.push(format!("Live: {url}"));
    }
    lines.push(DATA_SOURCE.to_string());

    let (start, end) = match (m.start(), m.end()) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            let scheduled = m.scheduled()?;
            (scheduled, scheduled + duration)
        }
    };

    let mut event = IcsEvent::new()
        .text("SUMMARY", &summary)
        .text("DESCRIPTION", &lines.join("\n"))
        .text("UID", &format!("snooker-match-{}@snooker-calendar", m.id));
    if m.table_no > 0 {
        event = event.text("LOCATION", &format!("Table {}", m.table_no));
    }
    Some(
        event
            .datetime("DTSTART", &start)
            .datetime("DTEND", &end)
            .datetime("DTSTAMP", &stamp),
    )
}

fn push_player_block(
    lines: &mut Vec<String>,
    slot: u8,
    name: &str,
    player: &Player,
    future: bool,
    ranking: Option<i64>,
) {
    lines.push(format!("Player {slot}: {name}"));
    if let Some(nationality) = non_empty(&player.nationality) {
        lines.push(format!("Nationality: {nationality}"));
    }
    if let Some(born) = non_empty(&player.born) {
        lines.push(format!("Born: {born}"));
    }
    if future {
        if player.num_ranking_titles > 0 {
            lines.push(format!("Ranking Titles: {}", player.num_ranking_titles));
        }
        if let Some(position) = ranking {
            lines.push(format!("World Ranking: {position}"));
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// The `VCALENDAR` header. Name and description are only set when the player
/// is known.
///
/// `VCALENDAR` 头部。仅当球员已知时才设置名称和描述。
pub fn calendar_header(player: Option<&Player>, season: i64, now: DateTime<Utc>) -> IcsCalendar {
    let mut cal = IcsCalendar::new()
        .raw("PRODID", PRODID)
        .raw("VERSION", "2.0")
        .raw("CALSCALE", "GREGORIAN")
        .raw("METHOD", "PUBLISH");
    if let Some(player) = player {
        let name = player.display_name();
        let title = format!("Snooker Matches - {name} ({season})");
        cal = cal
            .text("NAME", &title)
            .text("X-WR-CALNAME", &title)
            .text(
                "DESCRIPTION",
                &format!(
                    "Snooker matches for {name}, {DATA_SOURCE}, last updated {}",
                    now.format("%Y-%m-%d %H:%M:%S UTC")
                ),
            );
    }
    cal
}

/// Generates the calendar of `player_id` for `season`.
///
/// Returns `Ok(None)` when snooker.org lists no matches. Matches that cannot
/// be converted are skipped with a warning.
///
/// 生成 `player_id` 在 `season` 赛季的日历。snooker.org 没有比赛时返回
/// `Ok(None)`。无法转换的比赛会被跳过并记录警告。
pub async fn generate_player_calendar(
    state: &AppState,
    player_id: i64,
    season: i64,
) -> Result<Option<Vec<u8>>, ServiceError> {
    let matches = state.client.player_matches(player_id, season).await?;
    if matches.is_empty() {
        info!(player_id, season, "No matches found");
        return Ok(None);
    }
    info!(player_id, season, count = matches.len(), "Found matches");

    let now = Utc::now();
    let mut players = PlayerLookup::default();
    let owner = players.get(state, player_id).await;
    let mut cal = calendar_header(owner.as_ref(), season, now);

    for m in &matches {
        match build_event(state, &mut players, m, now).await {
            Ok(Some(event)) => cal.add_event(event),
            Ok(None) => warn!(match_id = m.id, "Match has no usable date, skipping"),
            Err(e) => warn!(match_id = m.id, error = %e, "Error processing match, skipping"),
        }
    }

    Ok(Some(cal.to_ics().into_bytes()))
}

async fn build_event(
    state: &AppState,
    players: &mut PlayerLookup,
    m: &Match,
    now: DateTime<Utc>,
) -> Result<Option<IcsEvent>, ServiceError> {
    let player1 = players.get(state, m.player1_id).await;
    let player2 = players.get(state, m.player2_id).await;
    let event = state.db.events().find(m.event_id).await?;
    let round = state.db.rounds().find(m.event_id, m.round).await?;

    let (ranking1, ranking2) = if m.is_future() {
        let rankings = state.db.rankings();
        (
            rankings.find_by_player(m.player1_id).await?.map(|r| r.position),
            rankings.find_by_player(m.player2_id).await?.map(|r| r.position),
        )
    } else {
        (None, None)
    };

    let details = MatchDetails {
        player1: player1.as_ref(),
        player2: player2.as_ref(),
        event: event.as_ref(),
        round: round.as_ref(),
        ranking1,
        ranking2,
    };
    Ok(create_match_event(m, &details, now))
}

/// Players resolved during one generation run, misses included.
#[derive(Default)]
struct PlayerLookup {
    seen: HashMap<i64, Option<Player>>,
}

impl PlayerLookup {
    async fn get(&mut self, state: &AppState, player_id: i64) -> Option<Player> {
        if player_id <= 0 {
            return None;
        }
        if let Some(known) = self.seen.get(&player_id) {
            return known.clone();
        }
        let player = match state.db.players().find(player_id).await {
            Ok(Some(player)) => Some(player),
            Ok(None) => fetch_single_player(&state.client, &state.db, player_id)
                .await
                .unwrap_or_else(|e| {
                    warn!(player_id, error = %e, "Failed to get player info");
                    None
                }),
            Err(e) => {
                warn!(player_id, error = %e, "Failed to get player info");
                None
            }
        };
        self.seen.insert(player_id, player.clone());
        player
    }
}

/// Number of `VEVENT` components in an ICS document, `0` when it does not
/// parse.
pub fn count_events(document: &[u8]) -> usize {
    match ics::parse(document) {
        Ok(calendars) => calendars.iter().map(|cal| cal.events.len()).sum(),
        Err(e) => {
            warn!(error = %e, "Could not count calendar events");
            0
        }
    }
}
