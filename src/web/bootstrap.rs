//! # Page Bootstrap Module / 页面引导模块
//!
//! The two entry points of the web front. Each one builds the analytics tag
//! (only when an analytics script is configured), a translation provider for
//! the negotiated locale and the hash router, then mounts its root view into
//! `<div id="app">`.
//!
//! 网页前端的两个入口。每个入口都会构建统计脚本标签（仅在配置了统计脚本时）、
//! 协商语言的翻译提供者以及哈希路由，然后把根视图挂载到 `<div id="app">` 中。

use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::core::config::FrontendConfig;
use crate::web::i18n::{I18n, MessageKey};
use crate::web::router::{Router, View};
use crate::web::views::{self, PageData, ViewContext};

const STYLE: &str = include_str!("assets/style.css");
const SCRIPT: &str = include_str!("assets/app.js");

/// Which page is being served. / 正在提供的页面。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    Main,
    UpdateLog,
}

impl Entry {
    pub fn root_view(self) -> View {
        match self {
            Entry::Main => View::Home,
            Entry::UpdateLog => View::UpdateLog,
        }
    }

    fn title_key(self) -> MessageKey {
        match self {
            Entry::Main => MessageKey::HeaderTitle,
            Entry::UpdateLog => MessageKey::UpdateLogPageTitle,
        }
    }
}

/// `<script async src=.. data-website-id=..>`, `None` without a script source.
pub fn analytics_tag(config: &FrontendConfig) -> Option<Markup> {
    if !config.analytics_enabled() {
        return None;
    }
    Some(html! {
        script async src=(config.umami_script_src) data-website-id=(config.umami_script_data) {}
    })
}

/// A bootstrapped page, ready to mount.
pub struct App<'a> {
    entry: Entry,
    config: &'a FrontendConfig,
    i18n: I18n,
    router: Router,
    analytics: Option<Markup>,
}

impl<'a> App<'a> {
    pub fn bootstrap(entry: Entry, config: &'a FrontendConfig, i18n: I18n) -> Self {
        Self {
            entry,
            config,
            i18n,
            router: Router::new(),
            analytics: analytics_tag(config),
        }
    }

    pub fn i18n(&self) -> I18n {
        self.i18n
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Renders the full document with the root view inside `#app`.
    pub fn mount(&self, data: &PageData) -> Markup {
        let ctx = ViewContext {
            i18n: self.i18n,
            config: self.config,
            timezone: self.config.display_timezone(),
            router: &self.router,
            data,
        };
        html! {
            (DOCTYPE)
            html lang=(self.i18n.locale()) {
                head {
                    meta charset="utf-8";
                    meta name="viewport" content="width=device-width, initial-scale=1";
                    title { (self.i18n.t(self.entry.title_key())) }
                    style { (PreEscaped(STYLE)) }
                    @if let Some(tag) = &self.analytics {
                        (tag)
                    }
                }
                body
                    data-copy-success=(self.i18n.t(MessageKey::HeaderCopySuccess))
                    data-copy-fail=(self.i18n.t(MessageKey::HeaderCopyFail))
                    data-language-switched=(self.i18n.t(MessageKey::HeaderSelectLanguageSuccess))
                {
                    div #app {
                        (views::render(self.entry.root_view(), &ctx))
                    }
                    div #toast {}
                    script { (PreEscaped(SCRIPT)) }
                }
            }
        }
    }
}
