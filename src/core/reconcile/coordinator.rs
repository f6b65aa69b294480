//! Reconciliation coordinator - main orchestrator of a run
//!
//! Loads the code mapping, builds both catalogue clients, dispatches the
//! fetches, compares the records and writes the report.

use super::comparator::Comparator;
use super::resource::{anomalous_identifiers, drop_excluded, electronic_identifiers};
use super::sublocation::merge_sublocations;
use super::summary::ReconcileSummary;
use crate::adapters::alma::AlmaClient;
use crate::adapters::fetcher::{RecordFetcher, SourceFetcher, TargetFetcher};
use crate::adapters::mapping::CsvMappingSource;
use crate::adapters::report::{CsvResultSink, ResultSink};
use crate::adapters::sudoc::SudocClient;
use crate::config::CaslConfig;
use crate::core::dispatch::{DispatchSettings, Dispatcher, HolderScope};
use crate::core::mapping::CodeMapping;
use crate::domain::{
    sort_anomalies, Anomaly, FetchError, Ppn, Result, ValidityFilter, WorkRecord,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Everything a run talks to
pub struct Collaborators {
    pub mapping: Arc<CodeMapping>,
    pub source: Arc<dyn SourceFetcher>,
    pub target: Arc<dyn TargetFetcher>,
    /// Record reader for the resource-class filter; `None` disables it
    pub records: Option<Arc<dyn RecordFetcher>>,
    pub sink: Box<dyn ResultSink>,
    pub scope: HolderScope,
}

/// Reconciliation coordinator
pub struct ReconcileCoordinator {
    dispatcher: Dispatcher,
    comparator: Comparator,
    multi_building: HashSet<String>,
    source: Arc<dyn SourceFetcher>,
    target: Arc<dyn TargetFetcher>,
    records: Option<Arc<dyn RecordFetcher>>,
    sink: Box<dyn ResultSink>,
}

impl ReconcileCoordinator {
    /// Create a coordinator talking to SUDOC and Alma
    ///
    /// # Errors
    ///
    /// Fails when the mapping cannot be loaded, the SUDOC holder directory
    /// cannot be fetched or the Alma client cannot be built.
    pub async fn new(config: &CaslConfig, shutdown: watch::Receiver<bool>) -> Result<Self> {
        let mapping = Arc::new(CodeMapping::load(&CsvMappingSource::new(
            &config.mapping.file_path,
            config.mapping.has_headers,
        ))?);

        let sudoc = Arc::new(SudocClient::new(&config.sudoc).await?);
        let alma = Arc::new(AlmaClient::new(&config.alma)?);

        let scope = HolderScope {
            source: Some(sudoc.followed_rcrs().clone()),
            target: Some(mapping.target_code_set()),
        };
        let records: Option<Arc<dyn RecordFetcher>> = if config.filter.exclude_electronic {
            Some(sudoc.clone() as Arc<dyn RecordFetcher>)
        } else {
            None
        };

        let collaborators = Collaborators {
            mapping,
            source: sudoc,
            target: alma,
            records,
            sink: Box::new(CsvResultSink::new(&config.output.directory)),
            scope,
        };
        Ok(Self::with_collaborators(config, collaborators, shutdown))
    }

    /// Create a coordinator over the given collaborators
    pub fn with_collaborators(
        config: &CaslConfig,
        collaborators: Collaborators,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let multi_building: HashSet<String> =
            config.sudoc.multi_building_rcrs.iter().cloned().collect();

        let dispatcher = Dispatcher::new(
            Arc::clone(&collaborators.source),
            Arc::clone(&collaborators.target),
            collaborators.scope,
            DispatchSettings::from(&config.dispatch),
            shutdown,
        );
        let comparator = Comparator::new(
            collaborators.mapping,
            ValidityFilter::new(config.alma.excluded_process_codes.iter().cloned()),
            multi_building.clone(),
        );

        Self {
            dispatcher,
            comparator,
            multi_building,
            source: collaborators.source,
            target: collaborators.target,
            records: collaborators.records,
            sink: collaborators.sink,
        }
    }

    /// Execute the reconciliation
    ///
    /// This is the main entry point of a run. It:
    /// 1. Fetches both sides of every identifier
    /// 2. Merges the sub-locations of multi-building RCRs
    /// 3. Compares the records
    /// 4. Drops the anomalies of electronic resources
    /// 5. Sorts the anomalies and writes the report
    ///
    /// An interrupted run still reports the records fetched so far.
    pub async fn execute(&self, identifiers: Vec<Ppn>) -> Result<ReconcileSummary> {
        let start_time = Instant::now();
        let mut summary = ReconcileSummary::new();
        summary.total_identifiers = identifiers.len();

        tracing::info!(identifiers = identifiers.len(), "Starting reconciliation");

        let outcome = self.dispatcher.run(identifiers).await;
        summary.failures = outcome.failures;
        summary.dropped_records = outcome.dropped;
        summary.cancelled_identifiers = outcome.cancelled;
        summary.interrupted = outcome.interrupted;

        let records: Vec<WorkRecord> = outcome
            .records
            .into_iter()
            .map(|record| self.merge(record))
            .collect();
        summary.compared_records = records.len();

        let mut anomalies = self.comparator.compare_all(&records);
        tracing::debug!(anomalies = anomalies.len(), "Records compared");

        let (excluded, unclassified) = self.exclude_electronic(&mut anomalies).await;
        summary.electronic_excluded = excluded;
        summary.unclassified_identifiers = unclassified;

        sort_anomalies(&mut anomalies);
        summary.count_anomalies(&anomalies);
        summary.report_path = Some(self.sink.write(&anomalies)?);

        summary.request_counts = self.request_counts();
        Ok(summary.with_duration(start_time.elapsed()))
    }

    fn merge(&self, mut record: WorkRecord) -> WorkRecord {
        if self.multi_building.is_empty() {
            return record;
        }
        record.source_locations = record
            .source_locations
            .take()
            .map(|locations| merge_sublocations(locations, &self.multi_building));
        record
    }

    /// Returns the anomalies removed and the identifiers left unclassified
    ///
    /// After a shutdown the record fetches are cancelled, so the anomalies
    /// of those identifiers are kept and counted as unclassified.
    async fn exclude_electronic(&self, anomalies: &mut Vec<Anomaly>) -> (usize, usize) {
        let Some(fetcher) = &self.records else {
            return (0, 0);
        };
        if anomalies.is_empty() {
            return (0, 0);
        }

        let candidates = anomalous_identifiers(anomalies);
        tracing::info!(identifiers = candidates.len(), "Classifying resources");
        let fetched = self
            .dispatcher
            .fetch_records(Arc::clone(fetcher), candidates)
            .await;
        let unclassified = fetched
            .iter()
            .filter(|(_, result)| matches!(result, Err(FetchError::Cancelled)))
            .count();
        if unclassified > 0 {
            tracing::warn!(
                identifiers = unclassified,
                "Shutdown before classification, anomalies kept"
            );
        }
        let electronic = electronic_identifiers(fetched);
        let removed = drop_excluded(anomalies, &electronic);

        tracing::info!(
            electronic = electronic.len(),
            anomalies_removed = removed,
            "Electronic resources excluded"
        );
        (removed, unclassified)
    }

    fn request_counts(&self) -> Vec<(String, &'static str, u64)> {
        let source = self.source.name().to_string();
        let target = self.target.name().to_string();
        self.source
            .request_counts()
            .into_iter()
            .map(|(endpoint, count)| (source.clone(), endpoint, count))
            .chain(
                self.target
                    .request_counts()
                    .into_iter()
                    .map(|(endpoint, count)| (target.clone(), endpoint, count)),
            )
            .collect()
    }
}
