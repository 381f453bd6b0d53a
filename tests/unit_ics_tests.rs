//! Shape of serialized calendars.
//!
//! 序列化日历的格式测试。

use chrono::{TimeZone, Utc};
use snooker_calendar::infra::ics::{IcsCalendar, IcsEvent, parse};

fn sample_event() -> IcsEvent {
    let start = Utc.with_ymd_and_hms(2025, 1, 8, 13, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2025, 1, 8, 18, 30, 0).unwrap();
    IcsEvent::new()
        .text("SUMMARY", "Judd Trump vs Mark Selby | 0 - 0 | Masters; London")
        .text("DESCRIPTION", &"Line one\nLine two ".repeat(10))
        .datetime("DTSTART", &start)
        .datetime("DTEND", &end)
}

fn sample() -> IcsCalendar {
    let mut cal = IcsCalendar::new()
        .raw("PRODID", "-//Test//EN")
        .raw("VERSION", "2.0")
        .text("X-WR-CALNAME", "Snooker Matches - Trump, Judd (2024)");
    cal.add_event(sample_event());
    cal
}

fn unfold(document: &str) -> String {
    document.replace("\r\n ", "").replace("\r\n\t", "")
}

#[test]
fn test_document_structure() {
    let cal = sample();
    let ics = cal.to_ics();

    assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
    assert!(ics.ends_with("END:VCALENDAR\r\n"));
    assert!(ics.contains("\r\nBEGIN:VEVENT\r\n"));
    assert!(ics.contains("\r\nEND:VEVENT\r\n"));
    assert!(ics.contains("DTSTART:20250108T130000Z\r\n"));
    assert!(ics.contains("DTEND:20250108T183000Z\r\n"));
    assert_eq!(cal.event_count(), 1);
}

#[test]
fn test_every_line_is_crlf_terminated_and_short() {
    let ics = sample().to_ics();
    let body = ics.strip_suffix("\r\n").unwrap();
    for line in body.split("\r\n") {
        assert!(!line.contains('\n'), "bare LF in {line:?}");
        assert!(line.len() <= 75, "{} octets: {line:?}", line.len());
    }
}

#[test]
fn test_long_multibyte_lines_fold_and_unfold() {
    let summary = "斯诺克日历".repeat(30);
    let mut cal = IcsCalendar::new().raw("VERSION", "2.0");
    cal.add_event(IcsEvent::new().text("SUMMARY", &summary));
    let ics = cal.to_ics();

    assert!(ics.contains("\r\n "), "long line was not folded");
    for line in ics.split("\r\n") {
        assert!(line.chars().count() <= 75);
    }
    assert!(unfold(&ics).contains(&format!("SUMMARY:{summary}\r\n")));
}

#[test]
fn test_text_values_are_escaped() {
    let cal = sample();
    assert_eq!(
        cal.get("X-WR-CALNAME"),
        Some("Snooker Matches - Trump\\, Judd (2024)")
    );
    assert_eq!(
        sample_event().get("summary"),
        Some("Judd Trump vs Mark Selby | 0 - 0 | Masters\\; London")
    );
    assert!(unfold(&cal.to_ics()).contains("DESCRIPTION:Line one\\nLine two Line one"));
}

#[test]
fn test_properties_keep_insertion_order() {
    let ics = sample().to_ics();
    let prodid = ics.find("PRODID").unwrap();
    let version = ics.find("VERSION").unwrap();
    let summary = ics.find("SUMMARY").unwrap();
    let dtstart = ics.find("DTSTART").unwrap();
    assert!(prodid < version && version < summary && summary < dtstart);
}

#[test]
fn test_generated_document_parses() {
    let calendars = parse(sample().to_ics().as_bytes()).unwrap();
    assert_eq!(calendars.len(), 1);
    let events = &calendars[0].events;
    assert_eq!(events.len(), 1);
    let names: Vec<&str> = events[0].properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["SUMMARY", "DESCRIPTION", "DTSTART", "DTEND"]);
}

#[test]
fn test_garbage_is_rejected() {
    assert!(parse(b"BEGIN:VCALENDAR\r\nnot a content line\r\n").is_err());
}
