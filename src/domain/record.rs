//! Per-identifier fetch result
//!
//! A [`WorkRecord`] gathers what both catalogues returned for one PPN.
//! A side is `None` when its fetch failed; a side that succeeded with no
//! holdings is `Some(vec![])`.

use super::ids::Ppn;
use super::location::{SourceLocation, TargetLocation};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkRecord {
    pub identifier: Ppn,
    pub source_locations: Option<Vec<SourceLocation>>,
    pub target_locations: Option<Vec<TargetLocation>>,
}

impl WorkRecord {
    pub fn new(identifier: Ppn) -> Self {
        Self {
            identifier,
            source_locations: None,
            target_locations: None,
        }
    }

    /// Both sides were fetched
    pub fn is_complete(&self) -> bool {
        self.source_locations.is_some() && self.target_locations.is_some()
    }

    /// Source locations, empty when the side is missing
    pub fn source(&self) -> &[SourceLocation] {
        self.source_locations.as_deref().unwrap_or(&[])
    }

    /// Target locations, empty when the side is missing
    pub fn target(&self) -> &[TargetLocation] {
        self.target_locations.as_deref().unwrap_or(&[])
    }
}
