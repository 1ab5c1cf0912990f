/// Live directory monitor — recursive watch coverage, the event loop, and
/// the bounded audit trail, owned by one service object.
///
/// # Usage
///
/// ```ignore
/// let sentry = Sentry::start(Config::default())?;
/// sentry.add_recursive(Path::new("/srv/data"))?;
/// for n in sentry.notifications().iter() { /* render */ }
/// ```
///
/// # Lifecycle
///
/// [`Sentry::start`] creates the OS watch primitive and spawns the
/// `dirsentry-watch` thread. The thread runs until the primitive's streams
/// close, which happens when [`Sentry::shutdown`] (or `Drop`) releases the
/// primitive. There is no other cancellation.
pub mod audit;
pub mod event_loop;
pub mod registry;

pub use audit::{AuditLog, AUDIT_CAPACITY};
pub use event_loop::classify_kind;
pub use registry::{WatchBackend, WatchRegistry};

use crate::analysis::cleanup::{self, CleanupReport};
use crate::analysis::top_files;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{AuditEntry, DirInsight, FileStat, Notification};
use crate::scanner::insight;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use event_loop::{publish, run_event_loop, LoopContext};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use tracing::{debug, info};

/// Process-scoped service: the watcher, its registered-directory set, the
/// audit log and the notification channel.
///
/// The one-shot scans are also exposed here so the presentation layer has
/// a single handle; they share nothing with the watch loop except the
/// notification channel used for progress.
pub struct Sentry {
    config: Config,
    registry: Arc<WatchRegistry>,
    audit: Arc<AuditLog>,
    notify_tx: Sender<Notification>,
    notify_rx: Receiver<Notification>,
    worker: Option<thread::JoinHandle<()>>,
}

impl Sentry {
    /// Create the OS watcher and start the watch loop.
    ///
    /// # Errors
    ///
    /// [`Error::WatcherInit`] if the platform watcher cannot be created;
    /// the service is unusable without it.
    pub fn start(config: Config) -> Result<Self> {
        let (event_tx, event_rx) = unbounded::<notify::Event>();
        let (error_tx, error_rx) = unbounded::<notify::Error>();

        let watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            // Receivers outlive the watcher; a failed send means shutdown.
            match res {
                Ok(event) => {
                    let _ = event_tx.send(event);
                }
                Err(err) => {
                    let _ = error_tx.send(err);
                }
            }
        })
        .map_err(Error::WatcherInit)?;

        Self::with_backend(config, Box::new(watcher), event_rx, error_rx)
    }

    /// Start the watch loop over an arbitrary primitive and its streams.
    ///
    /// The loop exits once every sender for `events` and `errors` has been
    /// dropped.
    pub fn with_backend(
        config: Config,
        backend: Box<dyn WatchBackend>,
        events: Receiver<notify::Event>,
        errors: Receiver<notify::Error>,
    ) -> Result<Self> {
        let registry = Arc::new(WatchRegistry::new(backend, config.skip_policy));
        let audit = Arc::new(AuditLog::new());
        let (notify_tx, notify_rx) = bounded::<Notification>(config.notification_capacity.max(1));

        let worker = {
            let registry = Arc::clone(&registry);
            let audit = Arc::clone(&audit);
            let tx = notify_tx.clone();
            thread::Builder::new()
                .name("dirsentry-watch".to_owned())
                .spawn(move || {
                    run_event_loop(
                        events,
                        errors,
                        LoopContext {
                            registry: &registry,
                            audit: &audit,
                            notifications: &tx,
                        },
                    );
                })
                .map_err(Error::Spawn)?
        };

        info!("Watch service started");
        Ok(Self {
            config,
            registry,
            audit,
            notify_tx,
            notify_rx,
            worker: Some(worker),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Begin or extend watch coverage at `path` and everything below it.
    /// Returns the number of directories registered.
    pub fn add_recursive(&self, path: &Path) -> Result<usize> {
        let count = self.registry.add_recursive(path)?;
        info!("Watching {} ({} directories)", path.display(), count);
        Ok(count)
    }

    pub fn is_watched(&self, path: &Path) -> bool {
        self.registry.is_watched(path)
    }

    pub fn watched_count(&self) -> usize {
        self.registry.watched_count()
    }

    /// Receiver for `file-event` and `scan-progress` notifications.
    ///
    /// All clones share one queue: each notification is delivered once.
    pub fn notifications(&self) -> Receiver<Notification> {
        self.notify_rx.clone()
    }

    /// Point-in-time copy of the audit log, oldest first.
    pub fn audit_log(&self) -> Vec<AuditEntry> {
        self.audit.snapshot()
    }

    /// Insight scan of `path`; progress goes out as `scan-progress`.
    pub fn scan_insight(&self, path: &Path) -> Result<DirInsight> {
        insight::scan_insight(
            path,
            self.config.skip_policy,
            self.config.scan_threads,
            |progress| publish(&self.notify_tx, Notification::ScanProgress(progress)),
        )
    }

    /// The largest files under `path`, at most `top_files_limit` of them.
    pub fn top_files(&self, path: &Path) -> Result<Vec<FileStat>> {
        top_files::top_files(path, self.config.top_files_limit, self.config.scan_threads)
    }

    /// Cleanup candidates under `path`. Deletes nothing.
    pub fn scan_cleanup(&self, path: &Path) -> Result<Vec<FileStat>> {
        cleanup::scan_cleanup(path, self.config.scan_threads)
    }

    /// Remove the given paths, best effort. Always succeeds.
    pub fn execute_cleanup<P: AsRef<Path>>(&self, paths: &[P]) -> CleanupReport {
        cleanup::execute_cleanup(paths)
    }

    /// Release the watch primitive and wait for the loop to drain and exit.
    ///
    /// With [`Sentry::with_backend`], the caller's stream senders must have
    /// been dropped too or this blocks.
    pub fn shutdown(mut self) {
        self.stop();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        info!("Watch service stopped");
    }

    fn stop(&self) {
        // Dropped outside the registry lock.
        if let Some(backend) = self.registry.close() {
            drop(backend);
            debug!("Watch primitive released");
        }
    }
}

impl Drop for Sentry {
    /// Releases the primitive; the loop thread finishes on its own.
    fn drop(&mut self) {
        self.stop();
    }
}
