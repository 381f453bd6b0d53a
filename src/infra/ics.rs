//! # ICS Codec Module / ICS 编码模块
//!
//! Thin typed layer over the `ical` crate: calendars and events are built as
//! `ical` components and serialized with its generator, which writes CRLF
//! line ends and folds long content lines. TEXT values are escaped here
//! before they are handed to the generator.
//!
//! 基于 `ical` crate 的轻量类型层：日历和事件以 `ical` 组件构建，并由其
//! 生成器序列化（CRLF 行尾、长内容行折叠）。TEXT 值在交给生成器之前
//! 在此处转义。

use chrono::{DateTime, Utc};
use ical::generator::Emitter;
use ical::parser::ical::component::{IcalCalendar, IcalEvent};
use ical::property::Property;
use std::io::BufReader;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IcsError {
    #[error("Malformed iCalendar document: {0}")]
    Parse(String),
}

/// Escapes a TEXT value (RFC 5545 §3.3.11).
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Formats a UTC date-time as `YYYYMMDDTHHMMSSZ`.
pub fn format_utc(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

fn property(name: &str, value: String) -> Property {
    Property {
        name: name.to_ascii_uppercase(),
        params: None,
        value: Some(value),
    }
}

fn find<'a>(properties: &'a [Property], name: &str) -> Option<&'a str> {
    properties
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .and_then(|p| p.value.as_deref())
}

/// A `VEVENT` component.
#[derive(Debug, Clone)]
pub struct IcsEvent {
    inner: IcalEvent,
}

impl Default for IcsEvent {
    fn default() -> Self {
        Self {
            inner: IcalEvent::new(),
        }
    }
}

impl IcsEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a TEXT property, escaping the value.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.inner.properties.push(property(name, escape_text(value)));
        self
    }

    /// Adds a UTC DATE-TIME property.
    pub fn datetime(mut self, name: &str, value: &DateTime<Utc>) -> Self {
        self.inner.properties.push(property(name, format_utc(value)));
        self
    }

    /// Encoded value of a property.
    pub fn get(&self, name: &str) -> Option<&str> {
        find(&self.inner.properties, name)
    }
}

/// A `VCALENDAR` object.
#[derive(Debug, Clone)]
pub struct IcsCalendar {
    inner: IcalCalendar,
}

impl Default for IcsCalendar {
    fn default() -> Self {
        Self {
            inner: IcalCalendar::new(),
        }
    }
}

impl IcsCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a property whose value needs no escaping (PRODID, VERSION, ...).
    pub fn raw(mut self, name: &str, value: &str) -> Self {
        self.inner.properties.push(property(name, value.to_string()));
        self
    }

    /// Adds a TEXT property, escaping the value.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.inner.properties.push(property(name, escape_text(value)));
        self
    }

    pub fn add_event(&mut self, event: IcsEvent) {
        self.inner.events.push(event.inner);
    }

    pub fn event_count(&self) -> usize {
        self.inner.events.len()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        find(&self.inner.properties, name)
    }

    /// Serializes the calendar through the `ical` generator.
    pub fn to_ics(&self) -> String {
        self.inner.generate()
    }
}

/// Parses every `VCALENDAR` in `document`.
///
/// 解析 `document` 中的所有 `VCALENDAR`。
pub fn parse(document: &[u8]) -> Result<Vec<IcalCalendar>, IcsError> {
    ical::IcalParser::new(BufReader::new(document))
        .map(|cal| cal.map_err(|e| IcsError::Parse(e.to_string())))
        .collect()
}
