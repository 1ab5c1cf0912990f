/// DirSentry Core — live directory watching, scans, and analysis.
///
/// This crate contains all business logic with zero presentation
/// dependencies. Everything crossing into a frontend is plain data.
///
/// # Modules
///
/// - [`model`] — Events, audit entries, scan aggregates and size formatting.
/// - [`analysis`] — Path classification, top-file ranking, cleanup candidates.
/// - [`scanner`] — Error-tolerant walker and the directory-insight scan.
/// - [`monitor`] — Recursive watch registration, the event loop, the audit log.
/// - [`config`] — Engine configuration.
/// - [`export`] — CSV export of per-file result lists.
pub mod analysis;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod monitor;
pub mod scanner;

pub use config::Config;
pub use error::{Error, Result};
pub use monitor::Sentry;
