/// Scanner module — one-shot filesystem walks.
///
/// - [`walk`] — the error-tolerant, skip-aware walker every scan builds on.
/// - [`insight`] — aggregate sizes, counts and extension breakdown.
/// - [`progress`] — liveness updates emitted during long scans.
///
/// Scans are stateless and synchronous: each call walks the tree from
/// scratch on the calling thread (directory reads may fan out to a rayon
/// pool) and returns when the walk is exhausted. There is no cancellation.
pub mod insight;
pub mod progress;
pub mod walk;

pub use insight::scan_insight;
pub use progress::{ScanProgress, PROGRESS_INTERVAL};
pub use walk::{FileEntry, WalkItem, Walker};
