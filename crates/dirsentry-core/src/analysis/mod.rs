/// Analysis modules — classification heuristics and the per-file scans
/// built on them.

pub mod classify;
pub mod cleanup;
pub mod top_files;

pub use classify::{
    classify_extension, is_cleanup_candidate, is_sensitive_extension, should_skip_directory,
    SkipSet, OTHER_EXTENSION,
};
pub use cleanup::{candidate_paths, execute_cleanup, scan_cleanup, CleanupReport};
pub use top_files::{top_files, DEFAULT_TOP_FILES};
