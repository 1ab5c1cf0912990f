/// Top-N largest files analysis.
///
/// Walks the chosen subtree in full (no skip-set pruning) and keeps the
/// `n` largest regular files with a bounded min-heap: O(total · log n) time
/// and O(n) memory regardless of tree size.
use crate::error::Result;
use crate::model::FileStat;
use crate::scanner::walk::{FileEntry, WalkItem, Walker};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::path::Path;
use tracing::debug;

/// Default number of entries returned by [`top_files`].
pub const DEFAULT_TOP_FILES: usize = 20;

/// Heap slot. Ordered by size, then by encounter order with earlier
/// entries ranking higher, so equal sizes keep walk order.
struct Ranked {
    size: u64,
    seq: u64,
    file: FileEntry,
}

impl Ranked {
    fn key(&self) -> (u64, Reverse<u64>) {
        (self.size, Reverse(self.seq))
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Return the `n` largest files under `root`, sorted by size descending.
///
/// Ties on size keep encounter order (the walk is sorted by name within a
/// directory, so the result is deterministic).
///
/// # Errors
///
/// Only when the root cannot be accessed.
pub fn top_files(root: &Path, n: usize, threads: usize) -> Result<Vec<FileStat>> {
    let walk = Walker::new(root).threads(threads).walk()?;

    // Guard: nothing to keep, but the root check above still applies.
    if n == 0 {
        return Ok(Vec::new());
    }

    // Min-heap of the current top `n`: the root is the smallest kept entry.
    let mut heap: BinaryHeap<Reverse<Ranked>> = BinaryHeap::with_capacity(n + 1);
    let mut seq: u64 = 0;

    for item in walk {
        let file = match item {
            WalkItem::File(f) => f,
            WalkItem::Dir { .. } => continue,
            WalkItem::Unreadable { path, message } => {
                debug!("TopFiles: skipping {:?}: {}", path, message);
                continue;
            }
        };
        seq += 1;
        let candidate = Ranked {
            size: file.size,
            seq,
            file,
        };

        if heap.len() < n {
            heap.push(Reverse(candidate));
        } else if let Some(Reverse(smallest)) = heap.peek() {
            if candidate > *smallest {
                heap.pop();
                heap.push(Reverse(candidate));
            }
        }
    }

    // `into_sorted_vec` is ascending over `Reverse`, i.e. largest first.
    Ok(heap
        .into_sorted_vec()
        .into_iter()
        .map(|Reverse(r)| FileStat::new(r.file.name, r.file.path, r.file.size, r.file.modified))
        .collect())
}
