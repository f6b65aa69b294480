//! Reconciliation of SUDOC and Alma holdings
//!
//! - [`coordinator`] - end-to-end run
//! - [`comparator`] - per-record matching through the code mapping
//! - [`sublocation`] - merge of multi-building holdings
//! - [`resource`] - electronic resource exclusion
//! - [`summary`] - run summary

pub mod comparator;
pub mod coordinator;
pub mod resource;
pub mod sublocation;
pub mod summary;

pub use comparator::Comparator;
pub use coordinator::{Collaborators, ReconcileCoordinator};
pub use resource::{classify, ResourceClass};
pub use sublocation::merge_sublocations;
pub use summary::ReconcileSummary;
