/// Path classification — which directories are never traversed, and which
/// extensions are sensitive or cleanup-eligible.
///
/// Every check here is a fixed whitelist. Directory matching is by base name
/// only, so a reserved name is pruned at every depth.
use compact_str::CompactString;
use serde::Deserialize;
use std::path::Path;

/// Category key used for files without an extension.
pub const OTHER_EXTENSION: &str = "<other>";

/// Reserved OS metadata directories. Never descended into.
const RESERVED_DIRS: &[&str] = &["System Volume Information", "$RECYCLE.BIN", "Recovery"];

/// Reserved directories plus the OS installation directory.
const AGGRESSIVE_DIRS: &[&str] = &[
    "System Volume Information",
    "$RECYCLE.BIN",
    "Recovery",
    "Windows",
];

/// Execution-related extensions flagged by the watch loop.
const SENSITIVE_EXTENSIONS: &[&str] = &[".exe", ".bat", ".ps1", ".cmd"];

/// Extensions that mark a file as a cleanup candidate.
const CLEANUP_EXTENSIONS: &[&str] = &[".tmp", ".log", ".bak", ".cache"];

/// Which set of directory names is pruned from skip-aware walks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipSet {
    /// Reserved OS metadata directories only.
    Reserved,
    /// Reserved directories plus `Windows`.
    #[default]
    Aggressive,
}

impl SkipSet {
    /// Directory base names in this set.
    pub fn names(self) -> &'static [&'static str] {
        match self {
            Self::Reserved => RESERVED_DIRS,
            Self::Aggressive => AGGRESSIVE_DIRS,
        }
    }

    /// `true` iff `base_name` must be pruned, together with its whole subtree.
    pub fn should_skip(self, base_name: &str) -> bool {
        self.names().contains(&base_name)
    }
}

/// [`SkipSet::should_skip`] against the default (aggressive) set.
pub fn should_skip_directory(base_name: &str) -> bool {
    SkipSet::default().should_skip(base_name)
}

/// Lower-cased suffix of the final path component, starting at its last dot.
///
/// Dot-files such as `.bashrc` are their own extension. Files with no dot
/// map to [`OTHER_EXTENSION`].
pub fn classify_extension(path: &Path) -> CompactString {
    let name = match path.file_name() {
        Some(n) => n.to_string_lossy(),
        None => return CompactString::new(OTHER_EXTENSION),
    };
    match name.rfind('.') {
        Some(dot) => CompactString::new(name[dot..].to_lowercase()),
        None => CompactString::new(OTHER_EXTENSION),
    }
}

/// `true` for execution-related extensions. Expects the lower-cased form
/// produced by [`classify_extension`].
pub fn is_sensitive_extension(ext: &str) -> bool {
    SENSITIVE_EXTENSIONS.contains(&ext)
}

/// `true` if `ext` is a temp/log/backup/cache extension, or the lower-cased
/// full path mentions `cache` anywhere.
///
/// Deliberately permissive: the result is a list for review, not a verdict.
pub fn is_cleanup_candidate(path: &Path, ext: &str) -> bool {
    CLEANUP_EXTENSIONS.contains(&ext)
        || path.to_string_lossy().to_lowercase().contains("cache")
}
