//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for Snooker Calendar,
//! including the snooker.org client, the SQLite store, the ICS codec,
//! file system helpers and i18n support.
//!
//! 此模块为斯诺克日历提供基础设施服务，
//! 包括 snooker.org 客户端、SQLite 存储、ICS 编解码、文件系统工具和国际化支持。

pub mod db;
pub mod fs;
pub mod ics;
pub mod snooker_api;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
