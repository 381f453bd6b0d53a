//! Update-log content, embedded per locale from `assets/changelog/`.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;

use crate::web::i18n::BASE_LOCALE;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Changelog {
    #[serde(default)]
    pub entries: Vec<ChangelogEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangelogEntry {
    pub version: String,
    pub date: String,
    #[serde(default)]
    pub details: Vec<String>,
}

const SOURCES: &[(&str, &str)] = &[
    ("en", include_str!("../../assets/changelog/en.toml")),
    ("zh", include_str!("../../assets/changelog/zh.toml")),
];

static CHANGELOGS: Lazy<HashMap<&'static str, Changelog>> = Lazy::new(|| {
    SOURCES
        .iter()
        .filter_map(|(locale, source)| match parse(source) {
            Ok(changelog) => Some((*locale, changelog)),
            Err(e) => {
                tracing::error!(locale, error = %e, "Invalid changelog");
                None
            }
        })
        .collect()
});

pub fn parse(source: &str) -> Result<Changelog, toml::de::Error> {
    toml::from_str(source)
}

/// Changelog for `locale`, the English one when the locale has none.
pub fn changelog(locale: &str) -> &'static Changelog {
    static EMPTY: Lazy<Changelog> = Lazy::new(Changelog::default);
    CHANGELOGS
        .get(locale)
        .or_else(|| CHANGELOGS.get(BASE_LOCALE))
        .unwrap_or(&EMPTY)
}
