/// Bounded audit trail of security-relevant filesystem events.
use crate::model::AuditEntry;
use parking_lot::RwLock;
use std::collections::VecDeque;

/// Maximum number of entries retained. The oldest entry is evicted first.
pub const AUDIT_CAPACITY: usize = 100;

/// FIFO ring buffer of [`AuditEntry`] records.
///
/// Written only by the watch loop; readers take a point-in-time copy via
/// [`AuditLog::snapshot`].
#[derive(Debug)]
pub struct AuditLog {
    entries: RwLock<VecDeque<AuditEntry>>,
    capacity: usize,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::with_capacity(AUDIT_CAPACITY)
    }
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log holding at most `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append `entry`, evicting the oldest entry when full.
    pub fn record(&self, entry: AuditEntry) {
        let mut entries = self.entries.write();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Copy of the current entries, oldest first.
    pub fn snapshot(&self) -> Vec<AuditEntry> {
        self.entries.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AuditReason, FsEvent, FsOp};
    use chrono::Local;
    use std::path::PathBuf;

    fn entry(i: usize) -> AuditEntry {
        AuditEntry {
            event: FsEvent {
                path: PathBuf::from(format!("/w/f{i}.exe")),
                op: FsOp::Write,
                is_dir: false,
                is_sensitive: true,
                modified: None,
                observed_at: Local::now(),
            },
            reason: AuditReason::Sensitive,
        }
    }

    fn paths(log: &AuditLog) -> Vec<PathBuf> {
        log.snapshot().into_iter().map(|e| e.event.path).collect()
    }

    #[test]
    fn starts_empty() {
        let log = AuditLog::new();
        assert!(log.is_empty());
        assert_eq!(log.capacity(), AUDIT_CAPACITY);
    }

    #[test]
    fn keeps_insertion_order_below_capacity() {
        let log = AuditLog::new();
        for i in 0..3 {
            log.record(entry(i));
        }
        assert_eq!(
            paths(&log),
            vec![
                PathBuf::from("/w/f0.exe"),
                PathBuf::from("/w/f1.exe"),
                PathBuf::from("/w/f2.exe")
            ]
        );
    }

    /// The 101st insertion evicts exactly the oldest entry and preserves
    /// the order of the remaining hundred.
    #[test]
    fn hundred_and_first_entry_evicts_oldest() {
        let log = AuditLog::new();
        for i in 0..=AUDIT_CAPACITY {
            log.record(entry(i));
        }
        assert_eq!(log.len(), AUDIT_CAPACITY);

        let kept = paths(&log);
        assert!(!kept.contains(&PathBuf::from("/w/f0.exe")));
        let expected: Vec<PathBuf> = (1..=AUDIT_CAPACITY)
            .map(|i| PathBuf::from(format!("/w/f{i}.exe")))
            .collect();
        assert_eq!(kept, expected);
    }

    #[test]
    fn never_exceeds_capacity() {
        let log = AuditLog::with_capacity(5);
        for i in 0..1_000 {
            log.record(entry(i));
            assert!(log.len() <= 5);
        }
    }

    /// A snapshot is detached from later writes.
    #[test]
    fn snapshot_is_point_in_time() {
        let log = AuditLog::new();
        log.record(entry(0));
        let snap = log.snapshot();
        log.record(entry(1));
        assert_eq!(snap.len(), 1);
        assert_eq!(log.len(), 2);
    }
}
