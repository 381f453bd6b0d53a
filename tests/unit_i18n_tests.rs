//! Locale negotiation and dictionary lookups for the web front.
//!
//! 网页前端的语言协商与字典查找测试。

use snooker_calendar::web::changelog::{changelog, parse};
use snooker_calendar::web::i18n::{
    AVAILABLE_LOCALES, BASE_LOCALE, I18n, MessageKey, lookup, negotiate, pick_locale, translate,
};

#[test]
fn test_compiled_locales() {
    assert!(AVAILABLE_LOCALES.contains(&"en"));
    assert!(AVAILABLE_LOCALES.contains(&"zh"));
}

#[test]
fn test_every_key_has_a_base_translation() {
    for key in MessageKey::ALL {
        let text = lookup(BASE_LOCALE, *key);
        assert!(text.is_some(), "missing base translation for {}", key.as_str());
    }
}

#[test]
fn test_dotted_keys_round_trip() {
    assert_eq!(MessageKey::AppDownloadIcs.as_str(), "app.download_ics");
    assert_eq!(
        MessageKey::from_dotted("update_log.page_title"),
        Some(MessageKey::UpdateLogPageTitle)
    );
    assert_eq!(MessageKey::from_dotted("app.nope"), None);
}

#[test]
fn test_translate_chinese() {
    assert_eq!(translate("zh", MessageKey::HeaderTitle), "斯诺克日历");
    assert_eq!(translate("en", MessageKey::HeaderTitle), "Snooker Calendar");
    assert_eq!(translate("zh", MessageKey::AppSubscribe), "订阅");
}

#[test]
fn test_unknown_locale_falls_back_to_english() {
    assert_eq!(translate("fr", MessageKey::AppCopy), "Copy");
}

#[test]
fn test_negotiate() {
    assert_eq!(negotiate(Some("zh"), "en"), "zh");
    assert_eq!(negotiate(Some("zh-CN"), "en"), "zh");
    assert_eq!(negotiate(Some("ZH_cn"), "en"), "zh");
    assert_eq!(negotiate(Some("de-DE"), "zh"), "zh");
    assert_eq!(negotiate(None, "en"), "en");
    assert_eq!(negotiate(Some(""), "xx"), BASE_LOCALE);
}

#[test]
fn test_pick_locale_order() {
    // Query wins over the header.
    assert_eq!(pick_locale(Some("en"), Some("zh-CN,zh;q=0.9"), "en"), "en");
    // An unusable query falls through to the header.
    assert_eq!(pick_locale(Some("xx"), Some("zh-CN,zh;q=0.9"), "en"), "zh");
    // A wildcard header is ignored.
    assert_eq!(pick_locale(None, Some("*"), "zh"), "zh");
    assert_eq!(pick_locale(None, None, "en"), "en");
}

#[test]
fn test_provider() {
    let i18n = I18n::new("zh-TW");
    assert_eq!(i18n.locale(), "zh");
    assert_eq!(i18n.t(MessageKey::AppName), "姓名");
    assert_eq!(i18n.t_dotted("app.position"), "排名");
    assert_eq!(i18n.t_dotted("not.a.key"), "not.a.key");
    assert_eq!(I18n::default().locale(), "en");
}

#[test]
fn test_changelogs() {
    let en = changelog("en");
    assert_eq!(en.entries.len(), 2);
    assert_eq!(en.entries[0].version, "1.0.0");
    assert_eq!(en.entries[1].version, "1.1.0");

    let zh = changelog("zh");
    assert_eq!(zh.entries.len(), 1);
    assert_eq!(zh.entries[0].details, vec!["1.基础功能实现"]);

    // Locales without a changelog get the English one.
    assert_eq!(changelog("fr"), en);
}

#[test]
fn test_changelog_parse_rejects_missing_fields() {
    assert!(parse("[[entries]]\nversion = \"2.0.0\"\n").is_err());
    assert!(parse("").unwrap().entries.is_empty());
}
