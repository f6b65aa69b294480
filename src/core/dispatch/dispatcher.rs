//! Bounded concurrent dispatcher
//!
//! Every identifier gets its own task which fetches the SUDOC side, then the
//! Alma side. Two budgets apply to each call: a slot from the semaphore
//! shared by both fetchers, then a start token from the fetcher's own rate
//! limiter. The call starts right after the token is taken.

use super::limiter::RateLimiter;
use crate::adapters::fetcher::{RecordFetcher, SourceFetcher, TargetFetcher};
use crate::config::{DispatchConfig, RateConfig, RecordPolicy};
use crate::domain::{FetchError, FetchResult, Ppn, SourceLocation, TargetLocation, WorkRecord};
use crate::{log_dispatch_progress, log_fetch_failure, log_retry_attempt};
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;

/// Progress is logged every this many finished identifiers
const PROGRESS_INTERVAL: usize = 500;

/// Failure kind of an identifier whose task died before reporting
///
/// Such failures are filed under the source side, which is fetched first.
pub const ABORTED: &str = "aborted";

/// Limits and policies applied by the dispatcher
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub max_concurrency: usize,
    pub source_rate: RateConfig,
    pub target_rate: RateConfig,
    pub max_rate_limit_retries: usize,
    pub rate_limit_backoff: Duration,
    pub record_policy: RecordPolicy,
}

impl From<&DispatchConfig> for DispatchSettings {
    fn from(config: &DispatchConfig) -> Self {
        Self {
            max_concurrency: config.max_concurrency,
            source_rate: config.source_rate,
            target_rate: config.target_rate,
            max_rate_limit_retries: config.max_rate_limit_retries,
            rate_limit_backoff: Duration::from_millis(config.rate_limit_backoff_ms),
            record_policy: config.record_policy,
        }
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self::from(&DispatchConfig::default())
    }
}

/// Holder codes each side is restricted to; `None` keeps every holding
#[derive(Debug, Clone, Default)]
pub struct HolderScope {
    pub source: Option<HashSet<String>>,
    pub target: Option<HashSet<String>>,
}

/// Catalogue a fetch was aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSide {
    Source,
    Target,
}

impl fmt::Display for FetchSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchSide::Source => write!(f, "source"),
            FetchSide::Target => write!(f, "target"),
        }
    }
}

/// A fetch that failed for good
#[derive(Debug, Clone)]
pub struct FetchFailure {
    pub identifier: Ppn,
    pub side: FetchSide,
    pub kind: &'static str,
    pub message: String,
}

/// Result of a dispatched batch
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// Emitted records, in input order
    pub records: Vec<WorkRecord>,

    pub failures: Vec<FetchFailure>,

    /// Records held back by the `complete` policy
    pub dropped: usize,

    /// Identifiers abandoned because of the shutdown signal
    pub cancelled: usize,

    pub interrupted: bool,
}

struct Shared {
    source: Arc<dyn SourceFetcher>,
    target: Arc<dyn TargetFetcher>,
    slots: Semaphore,
    source_limiter: RateLimiter,
    target_limiter: RateLimiter,
    scope: HolderScope,
    settings: DispatchSettings,
}

struct TaskOutcome {
    index: usize,
    record: WorkRecord,
    failure: Option<FetchFailure>,
    cancelled: bool,
}

/// Drives both fetchers over a batch of identifiers
#[derive(Clone)]
pub struct Dispatcher {
    shared: Arc<Shared>,
    shutdown: watch::Receiver<bool>,
}

impl Dispatcher {
    pub fn new(
        source: Arc<dyn SourceFetcher>,
        target: Arc<dyn TargetFetcher>,
        scope: HolderScope,
        settings: DispatchSettings,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let shared = Shared {
            source,
            target,
            slots: Semaphore::new(settings.max_concurrency.max(1)),
            source_limiter: RateLimiter::from_config(&settings.source_rate),
            target_limiter: RateLimiter::from_config(&settings.target_rate),
            scope,
            settings,
        };
        Self {
            shared: Arc::new(shared),
            shutdown,
        }
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.shared.settings
    }

    /// Fetches both sides of every identifier
    ///
    /// Never fails as a whole: failed sides are reported in the outcome and
    /// the records keep whatever was fetched, subject to the record policy.
    pub async fn run(&self, identifiers: Vec<Ppn>) -> DispatchOutcome {
        let total = identifiers.len();
        tracing::info!(
            identifiers = total,
            max_concurrency = self.shared.settings.max_concurrency,
            "Dispatching fetches"
        );

        // Identifiers whose task has not reported yet
        let mut unreported: Vec<Option<Ppn>> = identifiers.iter().cloned().map(Some).collect();

        let mut tasks = JoinSet::new();
        for (index, ppn) in identifiers.into_iter().enumerate() {
            let shared = Arc::clone(&self.shared);
            let shutdown = self.shutdown.clone();
            tasks.spawn(async move { shared.process(index, ppn, shutdown).await });
        }

        let mut finished: Vec<Option<WorkRecord>> = (0..total).map(|_| None).collect();
        let mut outcome = DispatchOutcome::default();
        let mut done = 0;

        while let Some(joined) = tasks.join_next().await {
            let task = match joined {
                Ok(task) => task,
                Err(e) => {
                    tracing::error!(error = %e, "Dispatch task aborted");
                    continue;
                }
            };

            unreported[task.index] = None;
            done += 1;
            if done % PROGRESS_INTERVAL == 0 {
                log_dispatch_progress!(done, total);
            }

            if task.cancelled {
                outcome.cancelled += 1;
                continue;
            }
            if let Some(failure) = task.failure {
                outcome.failures.push(failure);
            }
            let keep = match self.shared.settings.record_policy {
                RecordPolicy::Partial => true,
                RecordPolicy::Complete => task.record.is_complete(),
            };
            if keep {
                finished[task.index] = Some(task.record);
            } else {
                outcome.dropped += 1;
            }
        }

        // The join error does not say which identifier the task held
        for ppn in unreported.into_iter().flatten() {
            tracing::warn!(ppn = %ppn, error_kind = ABORTED, "Identifier lost with its task");
            outcome.failures.push(FetchFailure {
                identifier: ppn,
                side: FetchSide::Source,
                kind: ABORTED,
                message: "Dispatch task aborted before reporting".to_string(),
            });
        }

        outcome.records = finished.into_iter().flatten().collect();
        outcome.interrupted = outcome.cancelled > 0 || *self.shutdown.borrow();

        tracing::info!(
            records = outcome.records.len(),
            failures = outcome.failures.len(),
            dropped = outcome.dropped,
            cancelled = outcome.cancelled,
            "Dispatch finished"
        );
        outcome
    }

    /// Fetches raw records through the SUDOC-side limits
    ///
    /// Results come back in input order. Identifiers abandoned on shutdown
    /// are reported as [`FetchError::Cancelled`].
    pub async fn fetch_records(
        &self,
        fetcher: Arc<dyn RecordFetcher>,
        identifiers: Vec<Ppn>,
    ) -> Vec<(Ppn, FetchResult<String>)> {
        let total = identifiers.len();
        let mut tasks = JoinSet::new();
        for (index, ppn) in identifiers.into_iter().enumerate() {
            let shared = Arc::clone(&self.shared);
            let fetcher = Arc::clone(&fetcher);
            let mut shutdown = self.shutdown.clone();
            tasks.spawn(async move {
                let record_fetcher = fetcher.as_ref();
                let id = &ppn;
                let result = shared
                    .limited(&shared.source_limiter, &mut shutdown, move || {
                        record_fetcher.fetch_record(id)
                    })
                    .await;
                (index, ppn, result)
            });
        }

        let mut results: Vec<Option<(Ppn, FetchResult<String>)>> = (0..total).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, ppn, result)) => results[index] = Some((ppn, result)),
                Err(e) => tracing::error!(error = %e, "Record fetch task aborted"),
            }
        }
        results.into_iter().flatten().collect()
    }
}

impl Shared {
    async fn process(
        &self,
        index: usize,
        ppn: Ppn,
        mut shutdown: watch::Receiver<bool>,
    ) -> TaskOutcome {
        let mut task = TaskOutcome {
            index,
            record: WorkRecord::new(ppn.clone()),
            failure: None,
            cancelled: false,
        };
        let id = &ppn;

        let source = self
            .limited(&self.source_limiter, &mut shutdown, move || self.fetch_source(id))
            .await;
        match empty_if_not_found(source) {
            Ok(locations) => task.record.source_locations = Some(locations),
            Err(e) => {
                task.fail(FetchSide::Source, self.source.name(), e);
                return task;
            }
        }

        let target = self
            .limited(&self.target_limiter, &mut shutdown, move || self.fetch_target(id))
            .await;
        match empty_if_not_found(target) {
            Ok(locations) => task.record.target_locations = Some(locations),
            Err(e) => task.fail(FetchSide::Target, self.target.name(), e),
        }

        task
    }

    async fn fetch_source(&self, ppn: &Ppn) -> FetchResult<Vec<SourceLocation>> {
        match &self.scope.source {
            Some(codes) => self.source.get_filtered_locations(ppn, codes).await,
            None => self.source.get_locations(ppn).await,
        }
    }

    async fn fetch_target(&self, ppn: &Ppn) -> FetchResult<Vec<TargetLocation>> {
        match &self.scope.target {
            Some(codes) => self.target.get_filtered_locations(ppn, codes).await,
            None => self.target.get_locations(ppn).await,
        }
    }

    /// Runs one call under both budgets, retrying rate-limit answers
    async fn limited<T, F, Fut>(
        &self,
        limiter: &RateLimiter,
        shutdown: &mut watch::Receiver<bool>,
        call: F,
    ) -> FetchResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = FetchResult<T>>,
    {
        let max_retries = self.settings.max_rate_limit_retries;
        let mut retries = 0;

        loop {
            let attempt = async {
                let _slot = self
                    .slots
                    .acquire()
                    .await
                    .map_err(|_| FetchError::Cancelled)?;
                limiter.acquire().await;
                call().await
            };

            let result = tokio::select! {
                biased;
                _ = cancelled(shutdown) => return Err(FetchError::Cancelled),
                result = attempt => result,
            };

            match result {
                Err(e) if e.is_retryable() && retries < max_retries => {
                    retries += 1;
                    log_retry_attempt!(retries, max_retries, e);
                    tokio::select! {
                        biased;
                        _ = cancelled(shutdown) => return Err(FetchError::Cancelled),
                        _ = tokio::time::sleep(self.settings.rate_limit_backoff) => {}
                    }
                }
                other => return other,
            }
        }
    }
}

impl TaskOutcome {
    fn fail(&mut self, side: FetchSide, fetcher: &str, error: FetchError) {
        if error == FetchError::Cancelled {
            self.cancelled = true;
            return;
        }
        log_fetch_failure!(self.record.identifier, fetcher, error);
        self.failure = Some(FetchFailure {
            identifier: self.record.identifier.clone(),
            side,
            kind: error.kind(),
            message: error.to_string(),
        });
    }
}

fn empty_if_not_found<T>(result: FetchResult<Vec<T>>) -> FetchResult<Vec<T>> {
    match result {
        Err(FetchError::NotFound(reason)) => {
            tracing::trace!(reason = %reason, "Nothing found");
            Ok(Vec::new())
        }
        other => other,
    }
}

/// Resolves once shutdown is requested; pends forever if the sender is gone
async fn cancelled(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
