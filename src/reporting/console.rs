//! # Console Reporting Module / 控制台报告模块
//!
//! Colored, localized summaries of batch and ingestion runs.
//!
//! 批量生成和数据采集运行的彩色本地化摘要。

use colored::*;

use crate::core::batch::{BatchOutcome, BatchReport};
use crate::core::ingest::IngestSummary;
use crate::infra::t;

/// Prints the per-player table and totals of a batch run.
///
/// 打印批量运行的逐个球员表格和总计。
///
/// # Arguments / 参数
/// * `report` - The finished batch run / 已完成的批量运行
/// * `locale` - The language locale to use for messages / 用于消息的语言区域设置
///
/// # Output Format / 输出格式
/// ```text
/// --- Batch Summary ---
///   - Saved    | Judd Trump                     | 12034 bytes
///   - Skipped  | Player 17                      | No matches found
///   - Failed   | Mark Selby                     | Timed out after 90s
/// ```
pub fn print_batch_summary(report: &BatchReport, locale: &str) {
    println!("\n{}", t!("report.batch_banner", locale = locale).bold());

    for player in &report.outcomes {
        let name = player
            .name
            .clone()
            .unwrap_or_else(|| format!("Player {}", player.player_id));
        let (status, detail) = match &player.outcome {
            BatchOutcome::Saved { bytes } => (
                t!("report.status_saved", locale = locale).green(),
                t!("report.bytes", locale = locale, bytes = bytes).to_string(),
            ),
            BatchOutcome::Skipped(reason) => (
                t!("report.status_skipped", locale = locale).yellow(),
                reason.clone(),
            ),
            BatchOutcome::Failed(reason) => {
                (t!("report.status_failed", locale = locale).red(), reason.clone())
            }
        };
        println!("  - {:<10} | {:<30} | {}", status, name, detail);
    }

    println!("{}", "=".repeat(60));
    println!(
        "{}",
        t!(
            "report.batch_totals",
            locale = locale,
            saved = report.saved(),
            skipped = report.skipped(),
            failed = report.failed(),
            total = report.total(),
            season = report.season,
            duration = format!("{:.1}", report.duration.as_secs_f64())
        )
        .bold()
    );
    println!("{}", "=".repeat(60));
}

/// Prints the totals of an ingestion run.
pub fn print_ingest_summary(what: &str, summary: &IngestSummary, locale: &str) {
    let line = t!(
        "report.ingest_totals",
        locale = locale,
        what = what,
        stored = summary.stored,
        failed = summary.failed,
        total = summary.total
    );
    if summary.failed == 0 {
        println!("{}", line.green());
    } else {
        println!("{}", line.yellow());
    }
}
