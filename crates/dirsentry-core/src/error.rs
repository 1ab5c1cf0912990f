/// Error type for the DirSentry core.
///
/// Per-entry failures during walks and registrations never reach this type;
/// they are logged and skipped where they happen.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The root of a walk does not exist or cannot be stat'ed.
    #[error("cannot access {}: {source}", path.display())]
    RootInaccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The OS watch primitive could not be created.
    #[error("failed to initialise filesystem watcher: {0}")]
    WatcherInit(#[source] notify::Error),

    /// Registration was requested after the watcher was shut down.
    #[error("filesystem watcher has been shut down")]
    WatcherClosed,

    #[error("failed to spawn watch thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("export failed: {0}")]
    Export(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
