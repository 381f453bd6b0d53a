//! # Reporting Module / 报告模块
//!
//! Console summaries for batch generation and ingestion runs, colored and
//! localized.
//!
//! 批量生成和数据采集运行的控制台摘要，带颜色并支持国际化。

pub mod console;

// Re-export common reporting functions
pub use console::{print_batch_summary, print_ingest_summary};
