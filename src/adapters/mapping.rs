//! CSV mapping table reader
//!
//! Rows are `"Alma library name","Alma library code",RCR,ILN[,"SUDOC name"]`.

use crate::core::mapping::{MappingRow, MappingSource};
use crate::domain::{CaslError, Result};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

/// Mapping table stored as a CSV file
#[derive(Debug, Clone)]
pub struct CsvMappingSource {
    path: PathBuf,
    has_headers: bool,
}

impl CsvMappingSource {
    pub fn new(path: impl Into<PathBuf>, has_headers: bool) -> Self {
        Self {
            path: path.into(),
            has_headers,
        }
    }
}

impl MappingSource for CsvMappingSource {
    fn load(&self) -> Result<Vec<MappingRow>> {
        let file = File::open(&self.path).map_err(|e| {
            CaslError::Mapping(format!(
                "Cannot open mapping file {}: {e}",
                self.path.display()
            ))
        })?;
        read_mapping(file, self.has_headers)
    }
}

/// Reads mapping rows from CSV
///
/// Blank rows are skipped. Rows with fewer than four columns are rejected.
pub fn read_mapping<R: Read>(reader: R, has_headers: bool) -> Result<Vec<MappingRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(|e| CaslError::Mapping(format!("Invalid mapping row: {e}")))?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        if record.iter().all(str::is_empty) {
            continue;
        }
        if record.len() < 4 {
            return Err(CaslError::Mapping(format!(
                "Mapping line {line} has {} columns, expected at least 4",
                record.len()
            )));
        }

        rows.push(MappingRow::new(
            &record[0],
            &record[1],
            &record[2],
            &record[3],
            record.get(4).unwrap_or_default(),
        ));
    }

    Ok(rows)
}
