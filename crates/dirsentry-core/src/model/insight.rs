/// Aggregate statistics for one directory-insight scan.
use crate::model::size::format_size;
use compact_str::CompactString;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::BTreeMap;

/// Result of [`scan_insight`](crate::scanner::insight::scan_insight).
///
/// Recomputed from scratch on every scan; nothing here is maintained
/// incrementally.
/// Serializes `categories` a second time as `ext_details`.
#[derive(Clone, Debug, Default)]
pub struct DirInsight {
    /// Human-readable rendering of `total_bytes`.
    pub total_size: String,
    /// Exact sum of the sizes of every counted file.
    pub total_bytes: u64,
    pub file_count: u64,
    /// Directories below the scan root. Pruned directories are not counted.
    pub dir_count: u64,
    /// Lower-cased extension (with dot) → file count. Extensionless files
    /// are counted under [`OTHER_EXTENSION`](crate::analysis::classify::OTHER_EXTENSION).
    pub categories: BTreeMap<CompactString, u64>,
}

impl DirInsight {
    /// Per-extension breakdown. Tracks `categories` exactly.
    pub fn ext_details(&self) -> &BTreeMap<CompactString, u64> {
        &self.categories
    }

    /// Record one file.
    pub(crate) fn add_file(&mut self, extension: CompactString, bytes: u64) {
        self.file_count += 1;
        self.total_bytes += bytes;
        *self.categories.entry(extension).or_insert(0) += 1;
    }

    /// Derive `total_size` once the walk is finished.
    pub(crate) fn finish(&mut self) {
        self.total_size = format_size(self.total_bytes);
    }
}

impl Serialize for DirInsight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_struct("DirInsight", 6)?;
        out.serialize_field("total_size", &self.total_size)?;
        out.serialize_field("total_bytes", &self.total_bytes)?;
        out.serialize_field("file_count", &self.file_count)?;
        out.serialize_field("dir_count", &self.dir_count)?;
        out.serialize_field("categories", &self.categories)?;
        out.serialize_field("ext_details", self.ext_details())?;
        out.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_repeats_categories_as_ext_details() {
        let mut insight = DirInsight::default();
        insight.add_file(".rs".into(), 1_000);
        insight.add_file(".rs".into(), 20);
        insight.add_file("<other>".into(), 4);
        insight.finish();

        let json = serde_json::to_value(&insight).unwrap();
        assert_eq!(json["total_size"], "1.00 KB");
        assert_eq!(json["total_bytes"], 1_024);
        assert_eq!(json["file_count"], 3);
        assert_eq!(json["categories"][".rs"], 2);
        assert_eq!(json["categories"]["<other>"], 1);
        assert_eq!(json["ext_details"], json["categories"]);
    }
}
