/// Per-file records produced by the top-file ranker and cleanup scanner.
use crate::model::event::TIME_DETAIL_FORMAT;
use crate::model::size::format_size;
use chrono::{DateTime, Local};
use compact_str::CompactString;
use serde::Serialize;
use std::path::PathBuf;
use std::time::SystemTime;

/// A single file with its size, ready for display.
#[derive(Clone, Debug, Serialize)]
pub struct FileStat {
    /// File name only (NOT the full path).
    pub name: CompactString,
    /// Absolute path as visited by the walk.
    pub path: PathBuf,
    /// Human-readable rendering of `bytes`.
    pub size: String,
    /// Logical file size in bytes.
    pub bytes: u64,
    /// Last-modified timestamp, when the platform reports one.
    pub modified: Option<DateTime<Local>>,
    /// `HH:MM:SS.mmm` of `modified`, or an empty string.
    pub time_detail: String,
}

impl FileStat {
    pub fn new(
        name: CompactString,
        path: PathBuf,
        bytes: u64,
        modified: Option<SystemTime>,
    ) -> Self {
        let modified = modified.map(DateTime::<Local>::from);
        Self {
            name,
            path,
            size: format_size(bytes),
            bytes,
            time_detail: modified
                .map(|m| m.format(TIME_DETAIL_FORMAT).to_string())
                .unwrap_or_default(),
            modified,
        }
    }
}
