/// Directory insight — one-shot recursive aggregate of sizes, counts and
/// extensions.
use crate::analysis::classify::{classify_extension, SkipSet};
use crate::error::Result;
use crate::model::DirInsight;
use crate::scanner::progress::{ScanProgress, PROGRESS_INTERVAL};
use crate::scanner::walk::{WalkItem, Walker};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Walk `root` and aggregate everything below it.
///
/// Directories in `skip` are pruned with their whole subtree and are not
/// counted. The root itself is not counted as a directory. `on_progress`
/// is called every [`PROGRESS_INTERVAL`] visited entries.
///
/// # Errors
///
/// Only when the root cannot be accessed. Per-entry failures are skipped.
pub fn scan_insight<F>(
    root: &Path,
    skip: SkipSet,
    threads: usize,
    mut on_progress: F,
) -> Result<DirInsight>
where
    F: FnMut(ScanProgress),
{
    let start = Instant::now();
    let walk = Walker::new(root).prune(skip).threads(threads).walk()?;

    let mut insight = DirInsight::default();
    let mut scanned: u64 = 0;
    let mut error_count: u64 = 0;

    for item in walk {
        scanned += 1;

        match &item {
            WalkItem::Dir { depth, .. } => {
                if *depth > 0 {
                    insight.dir_count += 1;
                }
            }
            WalkItem::File(file) => {
                insight.add_file(classify_extension(&file.path), file.size);
            }
            WalkItem::Unreadable { path, message } => {
                error_count += 1;
                debug!("Insight: skipping {:?}: {}", path, message);
            }
        }

        if scanned.is_multiple_of(PROGRESS_INTERVAL) {
            on_progress(ScanProgress {
                scanned,
                current: item.base_name(),
            });
        }
    }

    insight.finish();
    info!(
        "Insight scan of {} complete: {} files, {} dirs, {} in {:?} ({} unreadable)",
        root.display(),
        insight.file_count,
        insight.dir_count,
        insight.total_size,
        start.elapsed(),
        error_count
    );
    Ok(insight)
}
