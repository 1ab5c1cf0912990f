/// CSV export of per-file result lists (top files, cleanup candidates).
use crate::error::Result;
use crate::model::FileStat;
use std::io::Write;

/// Column order written by [`write_csv`].
pub const CSV_HEADER: [&str; 5] = ["name", "path", "size", "bytes", "modified"];

/// Write `files` as CSV with a header row. `modified` is RFC 3339 or empty.
pub fn write_csv<W: Write>(writer: W, files: &[FileStat]) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(CSV_HEADER)?;
    for file in files {
        let path = file.path.to_string_lossy();
        let bytes = file.bytes.to_string();
        let modified = file.modified.map(|m| m.to_rfc3339()).unwrap_or_default();
        out.write_record([
            file.name.as_str(),
            &*path,
            file.size.as_str(),
            bytes.as_str(),
            modified.as_str(),
        ])?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use compact_str::CompactString;
    use std::path::PathBuf;

    #[test]
    fn writes_header_and_rows() {
        let files = vec![
            FileStat::new(CompactString::new("a.log"), PathBuf::from("/x/a.log"), 2048, None),
            FileStat::new(CompactString::new("b, c.tmp"), PathBuf::from("/x/b, c.tmp"), 1, None),
        ];
        let mut buf = Vec::new();
        write_csv(&mut buf, &files).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "name,path,size,bytes,modified");
        assert_eq!(lines[1], "a.log,/x/a.log,2.00 KB,2048,");
        assert_eq!(lines[2], "\"b, c.tmp\",\"/x/b, c.tmp\",1 B,1,");
    }

    #[test]
    fn empty_list_writes_header_only() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 1);
    }
}
