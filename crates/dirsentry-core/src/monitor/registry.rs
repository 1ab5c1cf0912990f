/// Recursive watch registration — best-effort coverage of a directory tree.
///
/// Every traversable directory is registered individually (non-recursive),
/// so a single directory that refuses registration (permission denied,
/// inotify limit, vanished mid-walk) costs only that directory's events.
/// Such failures are logged and skipped; only an inaccessible root fails
/// the call.
use crate::analysis::classify::SkipSet;
use crate::error::{Error, Result};
use crate::scanner::walk::{WalkItem, Walker};
use notify::{RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The OS watch primitive, reduced to the one operation registration needs.
pub trait WatchBackend: Send {
    /// Start delivering events for the direct children of `dir`.
    fn watch(&mut self, dir: &Path) -> notify::Result<()>;
}

impl WatchBackend for notify::RecommendedWatcher {
    fn watch(&mut self, dir: &Path) -> notify::Result<()> {
        Watcher::watch(self, dir, RecursiveMode::NonRecursive)
    }
}

struct Inner {
    /// `None` once the registry has been closed.
    backend: Option<Box<dyn WatchBackend>>,
    watched: HashSet<PathBuf>,
}

/// Owns the watch primitive and the set of registered directories.
///
/// Mutated only by [`WatchRegistry::add_recursive`], called by the owning
/// service or by the watch loop when a directory appears.
pub struct WatchRegistry {
    inner: Mutex<Inner>,
    skip: SkipSet,
}

impl WatchRegistry {
    pub fn new(backend: Box<dyn WatchBackend>, skip: SkipSet) -> Self {
        Self {
            inner: Mutex::new(Inner {
                backend: Some(backend),
                watched: HashSet::new(),
            }),
            skip,
        }
    }

    /// Register `root` and every directory below it, pruning the skip set.
    ///
    /// Directories already in the set are registered again, which is a
    /// no-op for the primitive and covers a directory recreated under the
    /// same name. Returns the number of successful registrations.
    ///
    /// # Errors
    ///
    /// [`Error::RootInaccessible`] if `root` cannot be stat'ed, or
    /// [`Error::WatcherClosed`] after [`WatchRegistry::close`].
    pub fn add_recursive(&self, root: &Path) -> Result<usize> {
        if self.inner.lock().backend.is_none() {
            return Err(Error::WatcherClosed);
        }

        // Locked per registration, never across the walk.
        let walk = Walker::new(root).prune(self.skip).walk()?;
        let mut registered = 0usize;
        let mut failed = 0usize;

        for item in walk {
            match item {
                WalkItem::Dir { path, .. } => {
                    let mut inner = self.inner.lock();
                    let Inner { backend, watched } = &mut *inner;
                    let backend = backend.as_mut().ok_or(Error::WatcherClosed)?;
                    match backend.watch(&path) {
                        Ok(()) => {
                            registered += 1;
                            watched.insert(path);
                        }
                        Err(err) => {
                            failed += 1;
                            debug!("Watch: cannot register {}: {}", path.display(), err);
                        }
                    }
                }
                WalkItem::File(_) => {}
                WalkItem::Unreadable { path, message } => {
                    debug!("Watch: skipping {:?}: {}", path, message);
                }
            }
        }

        debug!(
            "Watch: registered {} directories under {} ({} failed)",
            registered,
            root.display(),
            failed
        );
        Ok(registered)
    }

    /// Drop `path` and everything below it from the registered set.
    ///
    /// Bookkeeping only: the primitive releases watches on deleted
    /// directories by itself. Paths that were never registered, such as
    /// plain files, cost a single lookup.
    pub fn forget(&self, path: &Path) {
        let mut inner = self.inner.lock();
        if inner.watched.remove(path) {
            inner.watched.retain(|p| !p.starts_with(path));
        }
    }

    pub fn is_watched(&self, path: &Path) -> bool {
        self.inner.lock().watched.contains(path)
    }

    pub fn watched_count(&self) -> usize {
        self.inner.lock().watched.len()
    }

    /// Take the primitive out of the registry. Dropping the returned value
    /// shuts the primitive down and closes its streams.
    pub fn close(&self) -> Option<Box<dyn WatchBackend>> {
        let mut inner = self.inner.lock();
        inner.watched.clear();
        inner.backend.take()
    }
}
