/// Data model for DirSentry.
///
/// Plain data crossing into the presentation layer: events, audit entries,
/// scan aggregates and per-file records.
pub mod event;
pub mod file_stat;
pub mod insight;
pub mod size;

pub use event::{AuditEntry, AuditReason, FsEvent, FsOp, Notification};
pub use file_stat::FileStat;
pub use insight::DirInsight;
