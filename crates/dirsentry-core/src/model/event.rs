/// Filesystem event records — what the watch loop produces and what the
/// audit log retains.
use crate::scanner::progress::ScanProgress;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Fixed notification name carrying every enriched [`FsEvent`].
pub const FILE_EVENT: &str = "file-event";

/// Fixed notification name carrying insight-scan [`ScanProgress`] updates.
pub const SCAN_PROGRESS: &str = "scan-progress";

/// Display format for millisecond-precision timestamps.
pub const TIME_DETAIL_FORMAT: &str = "%H:%M:%S%.3f";

/// The kind of change reported for a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FsOp {
    Create,
    Write,
    Remove,
    Rename,
    Chmod,
}

impl FsOp {
    /// Upper-case label, e.g. `"REMOVE"`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Write => "WRITE",
            Self::Remove => "REMOVE",
            Self::Rename => "RENAME",
            Self::Chmod => "CHMOD",
        }
    }
}

impl fmt::Display for FsOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// A single filesystem change, enriched with whatever metadata could be
/// resolved when the watch loop processed it.
#[derive(Clone, Debug, Serialize)]
pub struct FsEvent {
    /// Full path the change was reported for.
    pub path: PathBuf,
    pub op: FsOp,
    /// `false` when the path could not be stat'ed (e.g. already deleted).
    pub is_dir: bool,
    /// `true` when the extension is execution-related.
    pub is_sensitive: bool,
    /// Last-modified time of the path, if the stat succeeded.
    pub modified: Option<DateTime<Local>>,
    /// Wall-clock time the event was processed.
    pub observed_at: DateTime<Local>,
}

impl FsEvent {
    /// `HH:MM:SS.mmm` of the modification time, falling back to the time the
    /// event was observed when the path no longer exists.
    pub fn time_detail(&self) -> String {
        self.modified
            .unwrap_or(self.observed_at)
            .format(TIME_DETAIL_FORMAT)
            .to_string()
    }
}

/// Why an event was retained in the audit log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditReason {
    /// Execution-related extension. Takes precedence over `Removal`.
    Sensitive,
    Removal,
}

/// An [`FsEvent`] retained in the bounded audit log.
#[derive(Clone, Debug, Serialize)]
pub struct AuditEntry {
    #[serde(flatten)]
    pub event: FsEvent,
    pub reason: AuditReason,
}

impl AuditEntry {
    /// Build an audit entry if the event qualifies for retention.
    pub fn for_event(event: &FsEvent) -> Option<Self> {
        let reason = if event.is_sensitive {
            AuditReason::Sensitive
        } else if event.op == FsOp::Remove {
            AuditReason::Removal
        } else {
            return None;
        };
        Some(Self {
            event: event.clone(),
            reason,
        })
    }
}

/// Message delivered to the presentation layer over the notification channel.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "name", content = "payload")]
pub enum Notification {
    #[serde(rename = "file-event")]
    FileEvent(FsEvent),
    #[serde(rename = "scan-progress")]
    ScanProgress(ScanProgress),
}

impl Notification {
    /// The fixed channel name this notification is published under.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FileEvent(_) => FILE_EVENT,
            Self::ScanProgress(_) => SCAN_PROGRESS,
        }
    }
}
