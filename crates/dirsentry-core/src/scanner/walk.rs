/// Error-tolerant directory walker shared by every scan and by watch
/// registration.
///
/// Built on `jwalk`. The walker never aborts on a per-entry failure: an
/// unreadable directory or a file that vanished between listing and stat
/// is yielded as [`WalkItem::Unreadable`] and traversal continues. Only a
/// root that cannot be stat'ed at all fails the walk, at construction.
///
/// Skip-set pruning is structural: matching directories are removed from
/// their parent's child list inside `process_read_dir`, so neither the
/// directory nor anything below it is ever read or yielded.
///
/// Callers abort a walk simply by dropping the iterator.
use crate::analysis::classify::SkipSet;
use crate::error::{Error, Result};
use compact_str::CompactString;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

type RawEntry = std::result::Result<jwalk::DirEntry<((), ())>, jwalk::Error>;

/// A regular file (or symlink, which is never followed) with its metadata.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: CompactString,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

/// One visited filesystem entry.
#[derive(Debug, Clone)]
pub enum WalkItem {
    /// A directory. `depth` is 0 for the walk root.
    Dir { path: PathBuf, depth: usize },
    File(FileEntry),
    /// An entry that could not be read or stat'ed.
    Unreadable {
        path: Option<PathBuf>,
        message: String,
    },
}

impl WalkItem {
    /// Path of the entry, if known.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Dir { path, .. } => Some(path),
            Self::File(f) => Some(&f.path),
            Self::Unreadable { path, .. } => path.as_deref(),
        }
    }

    /// Final path component, or an empty string.
    pub fn base_name(&self) -> String {
        self.path()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Walk configuration. Consumed by [`Walker::walk`].
#[derive(Debug, Clone)]
pub struct Walker {
    root: PathBuf,
    skip: Option<SkipSet>,
    threads: usize,
}

impl Walker {
    /// Walk everything under `root`, serially, without pruning.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            skip: None,
            threads: 1,
        }
    }

    /// Prune directories whose base name is in `skip`, at every depth.
    pub fn prune(mut self, skip: SkipSet) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Read directories on a rayon pool of `threads` workers. `1` (or `0`)
    /// walks on the calling thread. Yield order is the same either way.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Start the walk.
    ///
    /// # Errors
    ///
    /// [`Error::RootInaccessible`] if the root itself cannot be stat'ed.
    pub fn walk(self) -> Result<Walk> {
        std::fs::symlink_metadata(&self.root).map_err(|source| Error::RootInaccessible {
            path: self.root.clone(),
            source,
        })?;

        if let Some(skip) = self.skip {
            let root_name = self
                .root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if skip.should_skip(&root_name) {
                return Ok(Walk {
                    inner: Box::new(std::iter::empty()),
                    pending: None,
                });
            }
        }

        let parallelism = if self.threads > 1 {
            jwalk::Parallelism::RayonNewPool(self.threads)
        } else {
            jwalk::Parallelism::Serial
        };

        let mut walker = jwalk::WalkDir::new(&self.root)
            .skip_hidden(false)
            .follow_links(false)
            .sort(true)
            .parallelism(parallelism);

        if let Some(skip) = self.skip {
            walker = walker.process_read_dir(move |_depth, _path, _state, children| {
                children.retain(|child| match child {
                    Ok(entry) => {
                        !(entry.file_type().is_dir()
                            && skip.should_skip(&entry.file_name().to_string_lossy()))
                    }
                    Err(_) => true,
                });
            });
        }

        Ok(Walk {
            inner: Box::new(walker.into_iter()),
            pending: None,
        })
    }
}

/// Iterator over the entries of a walk, in depth-first order.
///
/// A directory whose listing fails is yielded twice: once as
/// [`WalkItem::Dir`], then as [`WalkItem::Unreadable`] carrying the error.
pub struct Walk {
    inner: Box<dyn Iterator<Item = RawEntry>>,
    pending: Option<WalkItem>,
}

impl Iterator for Walk {
    type Item = WalkItem;

    fn next(&mut self) -> Option<WalkItem> {
        if let Some(item) = self.pending.take() {
            return Some(item);
        }
        let raw = self.inner.next()?;
        Some(match raw {
            Ok(mut entry) => {
                if let Some(err) = entry.read_children_error.take() {
                    self.pending = Some(WalkItem::Unreadable {
                        path: Some(entry.path()),
                        message: err.to_string(),
                    });
                }
                to_item(entry)
            }
            Err(err) => WalkItem::Unreadable {
                path: err.path().map(Path::to_path_buf),
                message: err.to_string(),
            },
        })
    }
}

fn to_item(entry: jwalk::DirEntry<((), ())>) -> WalkItem {
    let path = entry.path();
    if entry.file_type().is_dir() {
        return WalkItem::Dir {
            path,
            depth: entry.depth,
        };
    }

    // Stat without following symlinks so a link is measured as itself.
    match std::fs::symlink_metadata(&path) {
        Ok(meta) => WalkItem::File(FileEntry {
            name: CompactString::new(entry.file_name().to_string_lossy()),
            size: meta.len(),
            modified: meta.modified().ok(),
            path,
        }),
        Err(err) => WalkItem::Unreadable {
            message: err.to_string(),
            path: Some(path),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("a/deep")).unwrap();
        fs::create_dir_all(tmp.path().join("Recovery/inner")).unwrap();
        fs::write(tmp.path().join("a/one.txt"), b"1").unwrap();
        fs::write(tmp.path().join("a/deep/two.txt"), b"22").unwrap();
        fs::write(tmp.path().join("Recovery/inner/hidden.txt"), b"333").unwrap();
        tmp
    }

    fn names(walk: Walk) -> Vec<String> {
        walk.map(|i| i.base_name()).collect()
    }

    #[test]
    fn root_is_yielded_first_at_depth_zero() {
        let tmp = tree();
        let first = Walker::new(tmp.path()).walk().unwrap().next().unwrap();
        match first {
            WalkItem::Dir { path, depth } => {
                assert_eq!(depth, 0);
                assert_eq!(path, tmp.path());
            }
            other => panic!("expected root dir, got {other:?}"),
        }
    }

    #[test]
    fn unpruned_walk_sees_everything() {
        let tmp = tree();
        let seen = names(Walker::new(tmp.path()).walk().unwrap());
        assert!(seen.contains(&"hidden.txt".to_string()));
        assert!(seen.contains(&"two.txt".to_string()));
    }

    /// A pruned directory is neither yielded nor descended into.
    #[test]
    fn pruned_walk_drops_whole_subtree() {
        let tmp = tree();
        let seen = names(Walker::new(tmp.path()).prune(SkipSet::Reserved).walk().unwrap());
        assert!(!seen.contains(&"Recovery".to_string()));
        assert!(!seen.contains(&"inner".to_string()));
        assert!(!seen.contains(&"hidden.txt".to_string()));
        assert!(seen.contains(&"two.txt".to_string()));
    }

    #[test]
    fn pruning_applies_at_nested_depth() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("x/y/$RECYCLE.BIN")).unwrap();
        fs::write(tmp.path().join("x/y/$RECYCLE.BIN/junk.bin"), b"0").unwrap();
        let seen = names(Walker::new(tmp.path()).prune(SkipSet::Reserved).walk().unwrap());
        assert!(!seen.contains(&"junk.bin".to_string()));
        assert!(seen.contains(&"y".to_string()));
    }

    #[test]
    fn skip_named_root_yields_nothing() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("Recovery");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("f.txt"), b"0").unwrap();
        let walk = Walker::new(&root).prune(SkipSet::Reserved).walk().unwrap();
        assert_eq!(walk.count(), 0);
    }

    #[test]
    fn missing_root_fails_to_start() {
        let tmp = TempDir::new().unwrap();
        let err = Walker::new(tmp.path().join("nope")).walk().err().unwrap();
        assert!(matches!(err, Error::RootInaccessible { .. }));
    }

    /// Runs only where permission bits are enforced (not as root).
    #[cfg(unix)]
    #[test]
    fn unreadable_directory_is_reported_and_walk_continues() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tree();
        let locked = tmp.path().join("a/deep");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let items: Vec<WalkItem> = Walker::new(tmp.path()).walk().unwrap().collect();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let pos = items
            .iter()
            .position(|i| matches!(i, WalkItem::Dir { path, .. } if *path == locked))
            .unwrap();
        match &items[pos + 1] {
            WalkItem::Unreadable { path, .. } => assert_eq!(path.as_deref(), Some(&*locked)),
            other => panic!("expected unreadable entry, got {other:?}"),
        }
        let names: Vec<String> = items.iter().map(WalkItem::base_name).collect();
        assert!(!names.contains(&"two.txt".to_string()));
        assert!(names.contains(&"one.txt".to_string()));
        assert!(names.contains(&"hidden.txt".to_string()));
    }

    #[test]
    fn files_carry_their_size() {
        let tmp = tree();
        let sizes: Vec<u64> = Walker::new(tmp.path().join("a"))
            .threads(4)
            .walk()
            .unwrap()
            .filter_map(|i| match i {
                WalkItem::File(f) => Some(f.size),
                _ => None,
            })
            .collect();
        assert_eq!(sizes.iter().sum::<u64>(), 3);
    }
}
