/// Cleanup candidates (files that look like temp, log, backup or cache
/// data) and the best-effort removal of a confirmed list.
///
/// Scanning never deletes anything. Removal is a separate call that takes
/// an explicit path list; confirming that list is the caller's job.
use crate::analysis::classify::{classify_extension, is_cleanup_candidate};
use crate::error::Result;
use crate::model::size::format_size;
use crate::model::FileStat;
use crate::scanner::walk::{WalkItem, Walker};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Collect every regular file under `root` that matches the cleanup
/// heuristics. The whole tree is walked (no skip-set pruning) and the
/// result is not capped.
///
/// # Errors
///
/// Only when the root cannot be accessed.
pub fn scan_cleanup(root: &Path, threads: usize) -> Result<Vec<FileStat>> {
    let walk = Walker::new(root).threads(threads).walk()?;

    let mut candidates = Vec::new();
    for item in walk {
        match item {
            WalkItem::File(file) => {
                let ext = classify_extension(&file.path);
                if is_cleanup_candidate(&file.path, &ext) {
                    candidates.push(FileStat::new(file.name, file.path, file.size, file.modified));
                }
            }
            WalkItem::Dir { .. } => {}
            WalkItem::Unreadable { path, message } => {
                debug!("Cleanup: skipping {:?}: {}", path, message);
            }
        }
    }

    let total: u64 = candidates.iter().map(|c| c.bytes).sum();
    info!(
        "Cleanup scan of {}: {} candidates ({})",
        root.display(),
        candidates.len(),
        format_size(total)
    );
    Ok(candidates)
}

/// Outcome of [`execute_cleanup`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub removed: u64,
    pub failed: u64,
    /// Sum of the sizes of removed files, as stat'ed just before removal.
    pub freed_bytes: u64,
}

/// Remove every path in `paths`, continuing past failures.
///
/// Files and symlinks are unlinked; directories are removed only if empty.
/// There is no trash and no rollback. Failures are logged and counted but
/// never returned as an error.
pub fn execute_cleanup<P: AsRef<Path>>(paths: &[P]) -> CleanupReport {
    let mut report = CleanupReport::default();

    for path in paths {
        let path = path.as_ref();
        match remove_path(path) {
            Ok(bytes) => {
                report.removed += 1;
                report.freed_bytes += bytes;
            }
            Err(err) => {
                report.failed += 1;
                warn!("Cleanup: failed to remove {}: {}", path.display(), err);
            }
        }
    }

    info!(
        "Cleanup removed {} of {} paths, freed {}",
        report.removed,
        paths.len(),
        format_size(report.freed_bytes)
    );
    report
}

fn remove_path(path: &Path) -> std::io::Result<u64> {
    let meta = fs::symlink_metadata(path)?;
    if meta.is_dir() {
        fs::remove_dir(path)?;
        Ok(0)
    } else {
        fs::remove_file(path)?;
        Ok(meta.len())
    }
}

/// Convenience for callers holding a candidate list.
pub fn candidate_paths(candidates: &[FileStat]) -> Vec<PathBuf> {
    candidates.iter().map(|c| c.path.clone()).collect()
}
