//! Label File Loading
//!
//! Parses panel label files (`labels.lbl`) exported from the control-panel
//! software. Each line carries a channel number and its source and
//! destination labels:
//!
//! ```text
//! # channel,source label,destination label
//! 1,CAM 1,MON 1
//! 2,CAM 2,MON 2
//! ```
//!
//! Malformed lines are logged and skipped; a label file never fails to parse
//! as a whole.

use std::collections::HashMap;
use std::io;
use std::path::Path;

/// Parsed source and destination labels, keyed by channel number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelSet {
    sources: HashMap<u16, String>,
    destinations: HashMap<u16, String>,
}

impl LabelSet {
    /// Parse label file contents.
    pub fn parse(content: &str) -> Self {
        let mut set = LabelSet::default();

        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.splitn(3, ',');
            let id = fields.next().and_then(|f| f.trim().parse::<u16>().ok());
            let Some(id) = id else {
                tracing::warn!(line = number + 1, "skipping malformed label line");
                continue;
            };

            if let Some(label) = fields.next().map(str::trim).filter(|l| !l.is_empty()) {
                set.sources.insert(id, label.to_string());
            }
            if let Some(label) = fields.next().map(str::trim).filter(|l| !l.is_empty()) {
                set.destinations.insert(id, label.to_string());
            }
        }

        set
    }

    /// Read and parse a label file.
    pub fn load(path: &Path) -> io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    pub fn source(&self, id: u16) -> Option<&str> {
        self.sources.get(&id).map(String::as_str)
    }

    pub fn destination(&self, id: u16) -> Option<&str> {
        self.destinations.get(&id).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.destinations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sources.len().max(self.destinations.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_basic_file() {
        let set = LabelSet::parse("1,CAM 1,MON 1\n2,CAM 2,MON 2\n");
        assert_eq!(set.source(1), Some("CAM 1"));
        assert_eq!(set.destination(2), Some("MON 2"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn parse_skips_comments_blanks_and_garbage() {
        let set = LabelSet::parse("# header\n\nnot a line\n3,VTR A,MON 3\nx,y,z\n");
        assert_eq!(set.len(), 1);
        assert_eq!(set.source(3), Some("VTR A"));
    }

    #[test]
    fn source_only_lines_are_accepted() {
        let set = LabelSet::parse("7,CAM 7\n");
        assert_eq!(set.source(7), Some("CAM 7"));
        assert_eq!(set.destination(7), None);
    }

    #[test]
    fn load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1,CAM 1,MON 1").unwrap();

        let set = LabelSet::load(file.path()).unwrap();
        assert_eq!(set.source(1), Some("CAM 1"));
    }

    #[test]
    fn load_missing_file_errors() {
        assert!(LabelSet::load(Path::new("/nonexistent/labels.lbl")).is_err());
    }
}
