//! Reconciliation anomaly model

use super::ids::Ppn;
use serde::Serialize;
use std::fmt;

/// Which catalogue lacks the equivalent holding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnomalySide {
    /// Held in SUDOC, no equivalent in Alma
    MissingInTarget,
    /// Held in Alma, no equivalent in SUDOC
    MissingInSource,
}

impl fmt::Display for AnomalySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnomalySide::MissingInTarget => write!(f, "missing_in_target"),
            AnomalySide::MissingInSource => write!(f, "missing_in_source"),
        }
    }
}

/// A holding present on one side with no mapped counterpart on the other
///
/// Exactly one of `source_label` and `target_label` is non-empty. The field
/// order defines the output ordering: region, holder, identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Anomaly {
    /// ILN of the holder
    pub region_code: String,

    /// RCR of the holder
    pub holder_code: String,

    /// Work identifier
    pub identifier: Ppn,

    /// Alma library label, set for target-side anomalies
    pub target_label: String,

    /// SUDOC library label, set for source-side anomalies
    pub source_label: String,
}

impl Anomaly {
    /// A SUDOC holding with no Alma counterpart
    pub fn missing_in_target(
        identifier: Ppn,
        region_code: impl Into<String>,
        holder_code: impl Into<String>,
        source_label: impl Into<String>,
    ) -> Self {
        Self {
            region_code: region_code.into(),
            holder_code: holder_code.into(),
            identifier,
            target_label: String::new(),
            source_label: source_label.into(),
        }
    }

    /// An Alma holding with no SUDOC counterpart
    pub fn missing_in_source(
        identifier: Ppn,
        region_code: impl Into<String>,
        holder_code: impl Into<String>,
        target_label: impl Into<String>,
    ) -> Self {
        Self {
            region_code: region_code.into(),
            holder_code: holder_code.into(),
            identifier,
            target_label: target_label.into(),
            source_label: String::new(),
        }
    }

    pub fn side(&self) -> AnomalySide {
        if self.target_label.is_empty() {
            AnomalySide::MissingInTarget
        } else {
            AnomalySide::MissingInSource
        }
    }
}

/// Sorts anomalies by region, holder code and identifier and drops exact duplicates
pub fn sort_anomalies(anomalies: &mut Vec<Anomaly>) {
    anomalies.sort();
    anomalies.dedup();
}
