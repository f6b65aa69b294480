//! Reconciliation summary and reporting

use crate::core::dispatch::{FetchFailure, FetchSide};
use crate::domain::{Anomaly, AnomalySide};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Summary of a reconciliation run
#[derive(Debug, Clone, Default)]
pub struct ReconcileSummary {
    /// Identifiers submitted to the dispatcher
    pub total_identifiers: usize,

    /// Records handed to the comparator
    pub compared_records: usize,

    /// Records held back by the `complete` policy
    pub dropped_records: usize,

    /// Identifiers abandoned on shutdown
    pub cancelled_identifiers: usize,

    /// Sides that could not be fetched
    pub failures: Vec<FetchFailure>,

    /// SUDOC holdings with no Alma counterpart
    pub missing_in_target: usize,

    /// Alma holdings with no SUDOC counterpart
    pub missing_in_source: usize,

    /// Anomalies dropped because the resource is electronic
    pub electronic_excluded: usize,

    /// Anomalous identifiers whose class was not checked before shutdown
    pub unclassified_identifiers: usize,

    /// Requests issued, as `(fetcher, endpoint, count)`
    pub request_counts: Vec<(String, &'static str, u64)>,

    /// Where the report was written
    pub report_path: Option<PathBuf>,

    /// The run stopped on a shutdown signal
    pub interrupted: bool,

    pub duration: Duration,
}

impl ReconcileSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Count the reported anomalies per side
    pub fn count_anomalies(&mut self, anomalies: &[Anomaly]) {
        self.missing_in_target = anomalies
            .iter()
            .filter(|a| a.side() == AnomalySide::MissingInTarget)
            .count();
        self.missing_in_source = anomalies.len() - self.missing_in_target;
    }

    pub fn total_anomalies(&self) -> usize {
        self.missing_in_target + self.missing_in_source
    }

    /// Failure counts per side and error kind
    pub fn failures_by_kind(&self) -> BTreeMap<(String, &'static str), usize> {
        let mut counts = BTreeMap::new();
        for failure in &self.failures {
            *counts
                .entry((failure.side.to_string(), failure.kind))
                .or_insert(0) += 1;
        }
        counts
    }

    /// No fetch failed and the run was not interrupted
    pub fn is_successful(&self) -> bool {
        self.failures.is_empty() && !self.interrupted
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            identifiers = self.total_identifiers,
            compared = self.compared_records,
            anomalies = self.total_anomalies(),
            missing_in_alma = self.missing_in_target,
            missing_in_sudoc = self.missing_in_source,
            electronic_excluded = self.electronic_excluded,
            unclassified = self.unclassified_identifiers,
            duration_secs = self.duration.as_secs(),
            report = ?self.report_path,
            "Reconciliation completed"
        );

        for (fetcher, endpoint, count) in &self.request_counts {
            tracing::info!(fetcher = %fetcher, endpoint = endpoint, requests = count, "Requests issued");
        }

        if self.dropped_records > 0 {
            tracing::warn!(
                dropped = self.dropped_records,
                "Incomplete records left out of the comparison"
            );
        }

        if !self.failures.is_empty() {
            tracing::warn!(
                failure_count = self.failures.len(),
                "Reconciliation completed with fetch failures"
            );
            for ((side, kind), count) in self.failures_by_kind() {
                tracing::warn!(side = %side, error_kind = kind, count = count, "Fetch failures");
            }
            for failure in self.failures.iter().filter(|f| f.side == FetchSide::Source) {
                tracing::debug!(ppn = %failure.identifier, message = %failure.message, "SUDOC fetch failed");
            }
            for failure in self.failures.iter().filter(|f| f.side == FetchSide::Target) {
                tracing::debug!(ppn = %failure.identifier, message = %failure.message, "Alma fetch failed");
            }
        }

        if self.interrupted {
            tracing::warn!(
                cancelled = self.cancelled_identifiers,
                "Reconciliation interrupted, report covers completed identifiers only"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Ppn;

    fn ppn(id: &str) -> Ppn {
        Ppn::new(id).unwrap()
    }

    fn failure(side: FetchSide, kind: &'static str) -> FetchFailure {
        FetchFailure {
            identifier: ppn("123456789"),
            side,
            kind,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_count_anomalies() {
        let mut summary = ReconcileSummary::new();
        summary.count_anomalies(&[
            Anomaly::missing_in_target(ppn("100000000"), "15", "A1", "x"),
            Anomaly::missing_in_target(ppn("200000000"), "15", "A1", "x"),
            Anomaly::missing_in_source(ppn("100000000"), "15", "A1", "y"),
        ]);
        assert_eq!(summary.missing_in_target, 2);
        assert_eq!(summary.missing_in_source, 1);
        assert_eq!(summary.total_anomalies(), 3);
    }

    #[test]
    fn test_failures_by_kind() {
        let mut summary = ReconcileSummary::new();
        summary.failures = vec![
            failure(FetchSide::Target, "rate_limited"),
            failure(FetchSide::Target, "rate_limited"),
            failure(FetchSide::Source, "decode"),
        ];
        let counts = summary.failures_by_kind();
        assert_eq!(counts[&("target".to_string(), "rate_limited")], 2);
        assert_eq!(counts[&("source".to_string(), "decode")], 1);
        assert!(!summary.is_successful());
    }

    #[test]
    fn test_success() {
        let summary = ReconcileSummary::new().with_duration(Duration::from_secs(3));
        assert!(summary.is_successful());
        assert_eq!(summary.duration.as_secs(), 3);

        let interrupted = ReconcileSummary {
            interrupted: true,
            ..ReconcileSummary::new()
        };
        assert!(!interrupted.is_successful());
    }
}
