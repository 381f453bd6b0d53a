//! # File System Operations Module / 文件系统操作模块
//!
//! Helpers for the ICS output directory: where a player's calendar lives and
//! how it is replaced without readers ever seeing a half-written file.
//!
//! ICS 输出目录的辅助功能：球员日历文件的位置，
//! 以及如何在读者看不到半写入文件的情况下替换它。

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Path of the calendar file for `player_id` inside `dir`.
pub fn calendar_path(dir: &Path, player_id: i64) -> PathBuf {
    dir.join(format!("{player_id}.ics"))
}

/// Creates `dir` and its parents if needed.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    if is_directory(dir) {
        return Ok(());
    }
    fs::create_dir_all(dir)
}

/// Writes `bytes` to `path` through a temporary file in the same directory,
/// then renames it into place.
///
/// # Arguments
/// * `path` - Final location of the file
/// * `bytes` - Complete file content
///
/// 先写入同一目录下的临时文件，再重命名到目标位置。
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    ensure_dir(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Checks if a path exists and is a directory.
pub fn is_directory(path: &Path) -> bool {
    path.exists() && path.is_dir()
}
