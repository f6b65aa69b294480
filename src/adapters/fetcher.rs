//! Fetcher traits
//!
//! The dispatcher talks to both catalogues through these traits so that the
//! concrete HTTP clients can be swapped for in-memory fakes in tests.

use crate::domain::ids::Ppn;
use crate::domain::{FetchResult, SourceLocation, TargetLocation};
use async_trait::async_trait;
use std::collections::HashSet;

/// Request counters reported by a fetcher, as `(endpoint, count)` pairs
pub type RequestCounts = Vec<(&'static str, u64)>;

/// Reads holdings of a work from the source catalogue (SUDOC)
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Name used in logs and summaries
    fn name(&self) -> &str;

    /// Returns every holding of the work
    ///
    /// # Errors
    ///
    /// `FetchError::NotFound` when the work is unknown; the other variants
    /// for transport, HTTP and decoding failures.
    async fn get_locations(&self, ppn: &Ppn) -> FetchResult<Vec<SourceLocation>>;

    /// Returns the holdings whose holder code is in `holder_codes`
    async fn get_filtered_locations(
        &self,
        ppn: &Ppn,
        holder_codes: &HashSet<String>,
    ) -> FetchResult<Vec<SourceLocation>> {
        let locations = self.get_locations(ppn).await?;
        Ok(locations
            .into_iter()
            .filter(|l| holder_codes.contains(&l.holder_code))
            .collect())
    }

    /// Requests issued so far
    fn request_counts(&self) -> RequestCounts {
        Vec::new()
    }
}

/// Reads holdings of a work from the target catalogue (Alma)
#[async_trait]
pub trait TargetFetcher: Send + Sync {
    /// Name used in logs and summaries
    fn name(&self) -> &str;

    /// Returns every holding of the work
    async fn get_locations(&self, ppn: &Ppn) -> FetchResult<Vec<TargetLocation>>;

    /// Returns the usable holdings whose library code is in `holder_codes`
    async fn get_filtered_locations(
        &self,
        ppn: &Ppn,
        holder_codes: &HashSet<String>,
    ) -> FetchResult<Vec<TargetLocation>> {
        let locations = self.get_locations(ppn).await?;
        Ok(locations
            .into_iter()
            .filter(|l| holder_codes.contains(&l.holder_code))
            .collect())
    }

    /// Requests issued so far
    fn request_counts(&self) -> RequestCounts {
        Vec::new()
    }
}

/// Reads the raw bibliographic record of a work (MARCXML)
#[async_trait]
pub trait RecordFetcher: Send + Sync {
    async fn fetch_record(&self, ppn: &Ppn) -> FetchResult<String>;
}
