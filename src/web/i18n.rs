//! # Locale Dictionary Module / 语言字典模块
//!
//! The page dictionaries are compiled from `locales/*.toml` by the build
//! script into a typed [`MessageKey`] enum and one lookup table per locale.
//! Lookups fall back from the active locale to English and finally to the
//! dotted key itself, so a missing translation never breaks a page.
//!
//! 页面字典由构建脚本从 `locales/*.toml` 编译为类型化的 [`MessageKey`]
//! 枚举和每种语言一张查找表。查找时依次回退到英文，最后回退到点分键本身，
//! 因此缺失的翻译不会导致页面出错。

include!(concat!(env!("OUT_DIR"), "/catalog.rs"));

/// Locale every other dictionary falls back to.
pub const BASE_LOCALE: &str = "en";

/// Resolves `key` for `locale` with the fallback chain.
pub fn translate(locale: &str, key: MessageKey) -> &'static str {
    lookup(locale, key)
        .or_else(|| lookup(BASE_LOCALE, key))
        .unwrap_or_else(|| key.as_str())
}

/// Picks a compiled locale for a requested language tag.
///
/// Exact match first (case-insensitive, `_` read as `-`), then the primary
/// subtag, then `default_language`, then [`BASE_LOCALE`].
///
/// 为请求的语言标签选择已编译的语言：先精确匹配（不区分大小写，`_` 视为 `-`），
/// 再匹配主子标签，然后是 `default_language`，最后是 [`BASE_LOCALE`]。
pub fn negotiate(requested: Option<&str>, default_language: &str) -> &'static str {
    requested
        .and_then(match_locale)
        .or_else(|| match_locale(default_language))
        .unwrap_or(BASE_LOCALE)
}

fn match_locale(tag: &str) -> Option<&'static str> {
    let tag = tag.trim().replace('_', "-");
    if tag.is_empty() {
        return None;
    }
    if let Some(exact) = AVAILABLE_LOCALES
        .iter()
        .find(|l| l.eq_ignore_ascii_case(&tag))
    {
        return Some(*exact);
    }
    let primary = tag.split('-').next()?;
    AVAILABLE_LOCALES
        .iter()
        .find(|l| l.eq_ignore_ascii_case(primary))
        .copied()
}

/// First language of an `Accept-Language` header, quality ignored.
pub fn first_accept_language(header: &str) -> Option<&str> {
    header
        .split(',')
        .next()
        .and_then(|entry| entry.split(';').next())
        .map(str::trim)
        .filter(|tag| !tag.is_empty() && *tag != "*")
}

/// Chooses the page locale: `?lang=`, then `Accept-Language`, then the
/// configured default.
pub fn pick_locale(
    query_lang: Option<&str>,
    accept_language: Option<&str>,
    default_language: &str,
) -> &'static str {
    let requested = query_lang
        .filter(|l| match_locale(l).is_some())
        .or_else(|| accept_language.and_then(first_accept_language));
    negotiate(requested, default_language)
}

/// Translation provider bound to one locale.
/// 绑定到某一语言的翻译提供者。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I18n {
    locale: &'static str,
}

impl I18n {
    /// Provider for the negotiated form of `locale`.
    pub fn new(locale: &str) -> Self {
        Self {
            locale: negotiate(Some(locale), BASE_LOCALE),
        }
    }

    pub fn locale(&self) -> &'static str {
        self.locale
    }

    pub fn t(&self, key: MessageKey) -> &'static str {
        translate(self.locale, key)
    }

    /// Lookup by dotted key; unknown keys are returned unchanged.
    pub fn t_dotted<'a>(&self, key: &'a str) -> &'a str {
        match MessageKey::from_dotted(key) {
            Some(key) => self.t(key),
            None => key,
        }
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new(BASE_LOCALE)
    }
}
