//! # Web Module / 网页模块
//!
//! The localized web front and the HTTP service behind it: locale
//! dictionaries, the hash router, the two page entry points, the views and
//! the axum server.
//!
//! 本地化的网页前端及其背后的 HTTP 服务：语言字典、哈希路由、
//! 两个页面入口、视图以及 axum 服务器。

pub mod api;
pub mod bootstrap;
pub mod changelog;
pub mod i18n;
pub mod router;
pub mod server;
pub mod views;

pub use api::WebError;
pub use bootstrap::{App, Entry};
pub use i18n::{I18n, MessageKey};
pub use router::{Router, View};
pub use server::{router as http_router, serve};
