//! Identifier file reader

use crate::domain::{CaslError, Ppn, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Identifiers read from one or more files
///
/// Keeps the first occurrence of each PPN, in reading order.
#[derive(Debug, Default)]
pub struct IdentifierBatch {
    pub identifiers: Vec<Ppn>,
    pub invalid: usize,
    pub duplicates: usize,
    seen: HashSet<Ppn>,
}

impl IdentifierBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one input line; blank lines are ignored
    pub fn push_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        match Ppn::new(line) {
            Ok(ppn) => {
                if self.seen.insert(ppn.clone()) {
                    self.identifiers.push(ppn);
                } else {
                    self.duplicates += 1;
                }
            }
            Err(e) => {
                tracing::warn!(line = %line, error = %e, "Skipping invalid PPN");
                self.invalid += 1;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }
}

/// Reads identifier files in order
pub fn read_identifiers<P: AsRef<Path>>(paths: &[P]) -> Result<IdentifierBatch> {
    let mut batch = IdentifierBatch::new();

    for path in paths {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CaslError::Validation(format!("Cannot read identifier file {}: {e}", path.display()))
        })?;
        content.lines().for_each(|line| batch.push_line(line));
    }

    tracing::info!(
        identifiers = batch.len(),
        invalid = batch.invalid,
        duplicates = batch.duplicates,
        "Identifiers loaded"
    );
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_push_line() {
        let mut batch = IdentifierBatch::new();
        for line in ["123456789", " 12345678X ", "", "not a ppn", "123456789", "1234"] {
            batch.push_line(line);
        }

        let ids: Vec<&str> = batch.identifiers.iter().map(Ppn::as_str).collect();
        assert_eq!(ids, vec!["123456789", "12345678X"]);
        assert_eq!(batch.invalid, 2);
        assert_eq!(batch.duplicates, 1);
    }

    #[test]
    fn test_read_identifiers_across_files() {
        let mut first = NamedTempFile::new().unwrap();
        writeln!(first, "123456789\n987654321").unwrap();
        let mut second = NamedTempFile::new().unwrap();
        writeln!(second, "987654321\r\n111111111").unwrap();

        let batch = read_identifiers(&[first.path(), second.path()]).unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.duplicates, 1);
        assert_eq!(batch.identifiers[2].as_str(), "111111111");
    }

    #[test]
    fn test_missing_file() {
        let result = read_identifiers(&["/nonexistent/ppn.txt"]);
        assert!(matches!(result, Err(CaslError::Validation(_))));
    }
}
