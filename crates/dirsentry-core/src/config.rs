/// Engine configuration.
///
/// Every field has a default, so an empty JSON object (or no file at all)
/// is a valid configuration. Audit capacity and progress interval are
/// fixed constants and cannot be set here.
use crate::analysis::classify::SkipSet;
use crate::analysis::top_files::DEFAULT_TOP_FILES;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default capacity of the notification channel. Notifications beyond this
/// backlog are dropped, never blocked on.
pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 4_096;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory names pruned from watch registration and insight scans.
    pub skip_policy: SkipSet,
    /// Capacity of the notification channel.
    pub notification_capacity: usize,
    /// Worker threads for one-shot scans. `1` walks serially.
    pub scan_threads: usize,
    /// Maximum entries returned by the top-files ranking.
    pub top_files_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            skip_policy: SkipSet::default(),
            notification_capacity: DEFAULT_NOTIFICATION_CAPACITY,
            scan_threads: num_cpus::get(),
            top_files_limit: DEFAULT_TOP_FILES,
        }
    }
}

impl Config {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn from_json(text: &str) -> std::result::Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_str(text)?;
        config.notification_capacity = config.notification_capacity.max(1);
        config.scan_threads = config.scan_threads.max(1);
        Ok(config)
    }
}
