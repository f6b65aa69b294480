//! Anomaly report output
//!
//! The report is a CSV file with every field quoted, one row per anomaly,
//! named after the local time the run finished.

use crate::domain::{Anomaly, CaslError, Result};
use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Column headers of the report
pub const REPORT_HEADERS: [&str; 5] = ["PPN", "ILN", "Bibliothèque Alma", "Bibliothèque SUDOC", "RCR"];

/// Destination of the final anomaly list
pub trait ResultSink: Send + Sync {
    /// Writes the anomalies and returns where they went
    fn write(&self, anomalies: &[Anomaly]) -> Result<PathBuf>;
}

/// Writes timestamped CSV reports into a directory
#[derive(Debug, Clone)]
pub struct CsvResultSink {
    directory: PathBuf,
}

impl CsvResultSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl ResultSink for CsvResultSink {
    fn write(&self, anomalies: &[Anomaly]) -> Result<PathBuf> {
        fs::create_dir_all(&self.directory).map_err(|e| {
            CaslError::Output(format!(
                "Cannot create output directory {}: {e}",
                self.directory.display()
            ))
        })?;

        let path = self.directory.join(file_name(Local::now()));
        let file = File::create(&path)
            .map_err(|e| CaslError::Output(format!("Cannot create {}: {e}", path.display())))?;
        write_anomalies(file, anomalies)?;

        tracing::info!(path = %path.display(), rows = anomalies.len(), "Report written");
        Ok(path)
    }
}

/// Report file name for a given instant
pub fn file_name(at: DateTime<Local>) -> String {
    format!("resultats_{}.csv", at.format("%Y%m%d-%H%M%S"))
}

/// Writes the header and one row per anomaly
pub fn write_anomalies<W: Write>(writer: W, anomalies: &[Anomaly]) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(writer);

    csv_writer.write_record(REPORT_HEADERS)?;
    for anomaly in anomalies {
        csv_writer.write_record([
            anomaly.identifier.as_str(),
            anomaly.region_code.as_str(),
            anomaly.target_label.as_str(),
            anomaly.source_label.as_str(),
            anomaly.holder_code.as_str(),
        ])?;
    }
    csv_writer
        .flush()
        .map_err(|e| CaslError::Output(format!("Cannot flush report: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Ppn;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn anomalies() -> Vec<Anomaly> {
        vec![
            Anomaly::missing_in_target(
                Ppn::new("123456789").unwrap(),
                "15",
                "341722102",
                "BU Lettres - Salle 2",
            ),
            Anomaly::missing_in_source(Ppn::new("12345678X").unwrap(), "15", "340000000", "Sciences"),
        ]
    }

    #[test]
    fn test_write_anomalies() {
        let mut buffer = Vec::new();
        write_anomalies(&mut buffer, &anomalies()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "\"PPN\",\"ILN\",\"Bibliothèque Alma\",\"Bibliothèque SUDOC\",\"RCR\""
        );
        assert_eq!(
            lines[1],
            "\"123456789\",\"15\",\"\",\"BU Lettres - Salle 2\",\"341722102\""
        );
        assert_eq!(lines[2], "\"12345678X\",\"15\",\"Sciences\",\"\",\"340000000\"");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_empty_report_has_header_only() {
        let mut buffer = Vec::new();
        write_anomalies(&mut buffer, &[]).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_file_name() {
        let at = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap();
        assert_eq!(file_name(at), "resultats_20240307-090502.csv");
    }

    #[test]
    fn test_sink_creates_directory() {
        let dir = TempDir::new().unwrap();
        let sink = CsvResultSink::new(dir.path().join("reports"));

        let path = sink.write(&anomalies()).unwrap();
        assert!(path.exists());
        assert!(path.starts_with(sink.directory()));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("resultats_"));
        assert!(name.ends_with(".csv"));
    }
}
