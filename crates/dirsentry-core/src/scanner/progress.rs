/// Scan progress reporting — lightweight liveness messages emitted while an
/// insight scan runs.
use serde::Serialize;

/// Number of visited entries (files, directories and unreadable entries
/// combined) between two progress updates.
pub const PROGRESS_INTERVAL: u64 = 100;

/// Periodic update with the running entry count.
///
/// Informational only: counts are not a checkpoint and consumers must not
/// rely on them for correctness.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScanProgress {
    /// Entries visited so far.
    pub scanned: u64,
    /// Base name of the most recently visited entry.
    pub current: String,
}
