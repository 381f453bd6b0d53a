//! SQLite repositories against a private in-memory database.
//!
//! 基于私有内存数据库的 SQLite 仓储测试。

use chrono::{Duration, TimeZone, Utc};
use snooker_calendar::infra::db::Database;
use snooker_calendar::models::{Event, InfoKind, Player, Ranking, Round};

async fn db() -> Database {
    Database::new(":memory:").await.expect("in-memory database")
}

fn player(id: i64, first: &str, last: &str) -> Player {
    Player {
        id,
        first_name: Some(first.to_string()),
        last_name: Some(last.to_string()),
        nationality: Some("England".to_string()),
        num_ranking_titles: id,
        ..Player::default()
    }
}

fn ranking(position: i64, player_id: i64, sum: f64) -> Ranking {
    Ranking {
        position,
        player_id,
        sum,
        ..Ranking::default()
    }
}

async fn seeded() -> Database {
    let db = db().await;
    for p in [
        player(1, "Judd", "Trump"),
        player(2, "Mark", "Selby"),
        player(3, "Kyren", "Wilson"),
    ] {
        db.players().upsert(&p).await.unwrap();
    }
    db.rankings()
        .replace_all(&[
            ranking(1, 1, 1_000_000.0),
            ranking(2, 2, 800_000.0),
            ranking(3, 3, 700_000.0),
            ranking(4, 99, 10_000.0),
        ])
        .await
        .unwrap();
    db
}

#[tokio::test]
async fn test_memory_databases_are_private() {
    let first = seeded().await;
    let second = db().await;
    assert_eq!(first.rankings().ranked_players(1, 0, None).await.unwrap().len(), 4);
    assert!(second.rankings().ranked_players(1, 0, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_player_upsert_replaces() {
    let db = db().await;
    assert!(db.players().find(1).await.unwrap().is_none());

    db.players().upsert(&player(1, "Judd", "Trump")).await.unwrap();
    let mut updated = player(1, "Judd", "Trump");
    updated.num_ranking_titles = 30;
    updated.surname_first = true;
    db.players().upsert(&updated).await.unwrap();

    let stored = db.players().find(1).await.unwrap().unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn test_events_and_rounds() {
    let db = db().await;
    let event = Event {
        id: 10,
        name: Some("Masters".to_string()),
        season: 2024,
        city: Some("London".to_string()),
        ..Event::default()
    };
    let round = Round {
        round: 15,
        round_name: Some("Final".to_string()),
        event_id: 10,
        distance: 19,
        ..Round::default()
    };
    db.events().upsert(&event).await.unwrap();
    db.rounds().upsert(&round).await.unwrap();

    assert_eq!(db.events().find(10).await.unwrap(), Some(event));
    assert_eq!(db.rounds().find(10, 15).await.unwrap(), Some(round));
    assert!(db.rounds().find(10, 1).await.unwrap().is_none());
}

#[tokio::test]
async fn test_ranked_players_paging() {
    let db = seeded().await;
    let rankings = db.rankings();

    let page1 = rankings.ranked_players(1, 2, None).await.unwrap();
    assert_eq!(page1.iter().map(|p| p.position).collect::<Vec<_>>(), vec![1, 2]);
    let page2 = rankings.ranked_players(2, 2, None).await.unwrap();
    assert_eq!(page2.iter().map(|p| p.position).collect::<Vec<_>>(), vec![3, 4]);
    assert!(rankings.ranked_players(3, 2, None).await.unwrap().is_empty());

    // Page numbers below one read as the first page.
    assert_eq!(rankings.ranked_players(0, 2, None).await.unwrap(), page1);

    let first = &page1[0];
    assert_eq!(first.firstname.as_deref(), Some("Judd"));
    assert_eq!(first.sum_value, 1_000_000.0);
    assert_eq!(first.display_name().as_deref(), Some("Judd Trump"));
}

#[tokio::test]
async fn test_ranked_players_paging_extremes() {
    let db = seeded().await;
    let rankings = db.rankings();

    assert!(rankings.ranked_players(i64::MAX, 2, None).await.unwrap().is_empty());
    assert!(rankings.ranked_players(i64::MAX, i64::MAX, None).await.unwrap().is_empty());
    assert_eq!(
        rankings.ranked_players(i64::MIN, 2, None).await.unwrap(),
        rankings.ranked_players(1, 2, None).await.unwrap()
    );
    assert_eq!(rankings.ranked_players(1, i64::MAX, None).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_ranked_player_without_player_row() {
    let db = seeded().await;
    let all = db.rankings().ranked_players(1, 0, None).await.unwrap();
    let unknown = all.iter().find(|p| p.player_id == 99).unwrap();
    assert_eq!(unknown.firstname, None);
    assert_eq!(unknown.display_name(), None);
}

#[tokio::test]
async fn test_ranked_players_search() {
    let db = seeded().await;
    let rankings = db.rankings();

    let found = rankings.ranked_players(1, 0, Some("SEL")).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].player_id, 2);

    let by_first = rankings.ranked_players(1, 0, Some("kyren")).await.unwrap();
    assert_eq!(by_first.len(), 1);

    // Wildcards are matched literally.
    assert!(rankings.ranked_players(1, 0, Some("%")).await.unwrap().is_empty());
    assert!(rankings.ranked_players(1, 0, Some("_")).await.unwrap().is_empty());
    // Blank searches list everyone.
    assert_eq!(rankings.ranked_players(1, 0, Some("  ")).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_replace_all_drops_old_rows() {
    let db = seeded().await;
    db.rankings().replace_all(&[ranking(1, 2, 5.0)]).await.unwrap();

    let all = db.rankings().ranked_players(1, 0, None).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].player_id, 2);
    assert!(db.rankings().find_by_player(1).await.unwrap().is_none());
    assert_eq!(db.rankings().find_by_player(2).await.unwrap().map(|r| r.position), Some(1));
}

#[tokio::test]
async fn test_ics_timestamps_join_into_listing() {
    let db = seeded().await;
    let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    db.updates().record_ics(1, at).await.unwrap();

    assert_eq!(db.updates().ics_last_updated(1).await.unwrap(), Some(at));
    assert_eq!(db.updates().ics_last_updated(2).await.unwrap(), None);

    let all = db.rankings().ranked_players(1, 0, None).await.unwrap();
    assert_eq!(all[0].last_updated, Some(at));
    assert_eq!(all[1].last_updated, None);
}

#[tokio::test]
async fn test_info_updates_once_per_day() {
    let db = db().await;
    let updates = db.updates();
    let morning = Utc.with_ymd_and_hms(2025, 3, 1, 3, 0, 0).unwrap();

    assert!(updates.all_info().await.unwrap().is_empty());
    assert!(updates.needs_update_today(InfoKind::Events, morning).await.unwrap());

    updates.record_info(InfoKind::Events, morning).await.unwrap();
    assert!(!updates.needs_update_today(InfoKind::Events, morning + Duration::hours(2)).await.unwrap());
    assert!(updates.needs_update_today(InfoKind::Events, morning + Duration::days(1)).await.unwrap());
    assert!(updates.needs_update_today(InfoKind::Players, morning).await.unwrap());

    let info = updates.all_info().await.unwrap();
    assert_eq!(info.len(), 1);
    assert_eq!(info[0].info, "events");
    assert_eq!(info[0].lastupdated, Some(morning));
}
