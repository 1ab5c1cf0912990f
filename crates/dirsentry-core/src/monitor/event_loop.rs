/// The watch loop — consumes the primitive's event and error streams for
/// the lifetime of the watcher.
///
/// Events are handled strictly in arrival order, one at a time, to
/// completion: stat, extend coverage for new directories, classify, audit,
/// publish. Nothing is batched or de-duplicated, so an editor's
/// write-then-chmod shows up as two events.
use crate::analysis::classify::{classify_extension, is_sensitive_extension};
use crate::model::{AuditEntry, FsEvent, FsOp, Notification};
use crate::monitor::audit::AuditLog;
use crate::monitor::registry::WatchRegistry;
use chrono::{DateTime, Local};
use crossbeam_channel::{never, select, Receiver, Sender, TrySendError};
use notify::event::{EventKind, ModifyKind, RenameMode};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Map one raw event to `(path, op)` pairs, one per path it carries.
///
/// A directory moved into the tree is reported as a create so that it
/// gains coverage like a freshly made one. Access notifications are
/// dropped.
pub fn classify_kind(event: notify::Event) -> Vec<(PathBuf, FsOp)> {
    let op = match event.kind {
        EventKind::Create(_) => FsOp::Create,
        EventKind::Remove(_) => FsOp::Remove,
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => FsOp::Create,
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            // paths = [from, to]
            return event
                .paths
                .into_iter()
                .enumerate()
                .map(|(i, p)| (p, if i == 0 { FsOp::Rename } else { FsOp::Create }))
                .collect();
        }
        EventKind::Modify(ModifyKind::Name(_)) => FsOp::Rename,
        EventKind::Modify(ModifyKind::Metadata(_)) => FsOp::Chmod,
        EventKind::Modify(_) | EventKind::Any => FsOp::Write,
        EventKind::Access(_) | EventKind::Other => return Vec::new(),
    };
    event.paths.into_iter().map(|p| (p, op)).collect()
}

/// Shared state the loop writes to.
pub struct LoopContext<'a> {
    pub registry: &'a WatchRegistry,
    pub audit: &'a AuditLog,
    pub notifications: &'a Sender<Notification>,
}

enum Wake {
    Event(notify::Event),
    Error(notify::Error),
    EventsClosed,
    ErrorsClosed,
}

/// Run until both `events` and `errors` are disconnected.
///
/// Errors from the primitive are logged and never end the loop.
pub fn run_event_loop(
    mut events: Receiver<notify::Event>,
    mut errors: Receiver<notify::Error>,
    ctx: LoopContext<'_>,
) {
    debug!("Watch loop: started");
    let mut events_open = true;
    let mut errors_open = true;

    while events_open || errors_open {
        let wake = select! {
            recv(events) -> msg => msg.map_or(Wake::EventsClosed, Wake::Event),
            recv(errors) -> msg => msg.map_or(Wake::ErrorsClosed, Wake::Error),
        };

        match wake {
            Wake::Event(event) => {
                for (path, op) in classify_kind(event) {
                    handle_event(path, op, &ctx);
                }
            }
            Wake::Error(err) => warn!("Watch error: {}", err),
            Wake::EventsClosed => {
                events_open = false;
                events = never();
            }
            Wake::ErrorsClosed => {
                errors_open = false;
                errors = never();
            }
        }
    }
    debug!("Watch loop: streams closed, exiting");
}

/// Enrich, act on, and publish a single event.
fn handle_event(path: PathBuf, op: FsOp, ctx: &LoopContext<'_>) {
    // The path may already be gone (delete, fast temp files).
    let meta = std::fs::metadata(&path).ok();
    let is_dir = meta.as_ref().is_some_and(|m| m.is_dir());
    let modified = meta
        .and_then(|m| m.modified().ok())
        .map(DateTime::<Local>::from);

    match op {
        FsOp::Create if is_dir => {
            if let Err(err) = ctx.registry.add_recursive(&path) {
                debug!("Watch: cannot extend coverage to {}: {}", path.display(), err);
            }
        }
        FsOp::Remove | FsOp::Rename => ctx.registry.forget(&path),
        _ => {}
    }

    let is_sensitive = is_sensitive_extension(&classify_extension(&path));
    let event = FsEvent {
        path,
        op,
        is_dir,
        is_sensitive,
        modified,
        observed_at: Local::now(),
    };

    if let Some(entry) = AuditEntry::for_event(&event) {
        ctx.audit.record(entry);
    }

    publish(ctx.notifications, Notification::FileEvent(event));
}

/// Hand a notification to the consumer without ever blocking.
pub(crate) fn publish(tx: &Sender<Notification>, notification: Notification) {
    match tx.try_send(notification) {
        Ok(()) => {}
        Err(TrySendError::Full(n)) => {
            debug!("Notification channel full, dropping {}", n.name());
        }
        Err(TrySendError::Disconnected(_)) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::classify::SkipSet;
    use crate::monitor::registry::tests::RecordingBackend;
    use crossbeam_channel::{bounded, unbounded};
    use notify::event::{CreateKind, MetadataKind, RemoveKind};
    use std::fs;
    use tempfile::TempDir;

    fn raw(kind: EventKind, path: PathBuf) -> notify::Event {
        notify::Event::new(kind).add_path(path)
    }

    // ── classify_kind ────────────────────────────────────────────────────

    #[test]
    fn kinds_map_to_ops() {
        let p = PathBuf::from("/w/x");
        let cases = [
            (EventKind::Create(CreateKind::File), FsOp::Create),
            (EventKind::Remove(RemoveKind::Any), FsOp::Remove),
            (EventKind::Modify(ModifyKind::Any), FsOp::Write),
            (
                EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
                FsOp::Chmod,
            ),
            (
                EventKind::Modify(ModifyKind::Name(RenameMode::From)),
                FsOp::Rename,
            ),
            (
                EventKind::Modify(ModifyKind::Name(RenameMode::To)),
                FsOp::Create,
            ),
        ];
        for (kind, op) in cases {
            assert_eq!(classify_kind(raw(kind, p.clone())), vec![(p.clone(), op)]);
        }
    }

    #[test]
    fn rename_both_splits_into_rename_and_create() {
        let ev = notify::Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(PathBuf::from("/w/old"))
            .add_path(PathBuf::from("/w/new"));
        assert_eq!(
            classify_kind(ev),
            vec![
                (PathBuf::from("/w/old"), FsOp::Rename),
                (PathBuf::from("/w/new"), FsOp::Create)
            ]
        );
    }

    #[test]
    fn access_is_ignored() {
        let ev = raw(
            EventKind::Access(notify::event::AccessKind::Any),
            PathBuf::from("/w/x"),
        );
        assert!(classify_kind(ev).is_empty());
    }

    // ── run_event_loop ───────────────────────────────────────────────────

    struct Harness {
        registry: WatchRegistry,
        audit: AuditLog,
        seen: std::sync::Arc<parking_lot::Mutex<Vec<PathBuf>>>,
    }

    fn harness() -> Harness {
        let backend = RecordingBackend::default();
        let seen = backend.seen.clone();
        Harness {
            registry: WatchRegistry::new(Box::new(backend), SkipSet::Aggressive),
            audit: AuditLog::new(),
            seen,
        }
    }

    /// Feed `raws` through a loop whose streams then close; return what
    /// was published.
    fn run(h: &Harness, raws: Vec<notify::Event>) -> Vec<FsEvent> {
        let (ev_tx, ev_rx) = unbounded();
        let (err_tx, err_rx) = unbounded();
        let (out_tx, out_rx) = unbounded();
        for r in raws {
            ev_tx.send(r).unwrap();
        }
        err_tx.send(notify::Error::generic("queue overflow")).unwrap();
        drop(ev_tx);
        drop(err_tx);

        run_event_loop(
            ev_rx,
            err_rx,
            LoopContext {
                registry: &h.registry,
                audit: &h.audit,
                notifications: &out_tx,
            },
        );

        out_rx
            .try_iter()
            .map(|n| match n {
                Notification::FileEvent(e) => e,
                other => panic!("unexpected {other:?}"),
            })
            .collect()
    }

    #[test]
    fn removal_of_sensitive_file_is_audited() {
        let h = harness();
        let out = run(
            &h,
            vec![raw(
                EventKind::Remove(RemoveKind::File),
                PathBuf::from("/nowhere/malware.exe"),
            )],
        );

        assert_eq!(out.len(), 1);
        assert!(out[0].is_sensitive);
        assert_eq!(out[0].op, FsOp::Remove);
        assert!(!out[0].is_dir);
        assert!(out[0].modified.is_none());

        let audit = h.audit.snapshot();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].event.path, PathBuf::from("/nowhere/malware.exe"));
    }

    /// Every event is published, audited or not, in arrival order.
    #[test]
    fn all_events_are_published_in_order() {
        let h = harness();
        let out = run(
            &h,
            vec![
                raw(EventKind::Create(CreateKind::File), PathBuf::from("/n/a.txt")),
                raw(EventKind::Modify(ModifyKind::Any), PathBuf::from("/n/a.txt")),
                raw(EventKind::Remove(RemoveKind::File), PathBuf::from("/n/a.txt")),
                raw(EventKind::Create(CreateKind::File), PathBuf::from("/n/run.ps1")),
            ],
        );

        let ops: Vec<FsOp> = out.iter().map(|e| e.op).collect();
        assert_eq!(ops, vec![FsOp::Create, FsOp::Write, FsOp::Remove, FsOp::Create]);
        // the removal and the script creation
        assert_eq!(h.audit.len(), 2);
    }

    #[test]
    fn created_directory_is_registered_recursively() {
        let tmp = TempDir::new().unwrap();
        let fresh = tmp.path().join("fresh");
        fs::create_dir_all(fresh.join("nested")).unwrap();
        fs::create_dir_all(fresh.join("Windows")).unwrap();

        let h = harness();
        let out = run(&h, vec![raw(EventKind::Create(CreateKind::Folder), fresh.clone())]);

        assert!(out[0].is_dir);
        assert!(out[0].modified.is_some());
        assert!(h.registry.is_watched(&fresh));
        assert!(h.registry.is_watched(&fresh.join("nested")));
        assert!(!h.seen.lock().iter().any(|p| p.ends_with("Windows")));
    }

    /// A created regular file never triggers registration.
    #[test]
    fn created_file_is_not_registered() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("plain.txt");
        fs::write(&file, b"x").unwrap();

        let h = harness();
        run(&h, vec![raw(EventKind::Create(CreateKind::File), file)]);
        assert!(h.seen.lock().is_empty());
    }

    #[test]
    fn full_channel_drops_without_blocking() {
        let (tx, rx) = bounded(1);
        let ev = |name: &str| FsEvent {
            path: PathBuf::from(name),
            op: FsOp::Write,
            is_dir: false,
            is_sensitive: false,
            modified: None,
            observed_at: Local::now(),
        };
        publish(&tx, Notification::FileEvent(ev("a")));
        publish(&tx, Notification::FileEvent(ev("b")));
        assert_eq!(rx.len(), 1);
    }
}
