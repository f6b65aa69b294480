//! Domain models and types for CASL.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`Ppn`])
//! - **Holding models** ([`SourceLocation`], [`TargetLocation`], [`Item`])
//! - **Fetch results and findings** ([`WorkRecord`], [`Anomaly`])
//! - **Holding eligibility** ([`ValidityFilter`])
//! - **Error types** ([`CaslError`], [`FetchError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations outside the fetchers return [`Result<T, CaslError>`]:
//!
//! ```rust
//! use casl::domain::{CaslError, Result};
//!
//! fn example() -> Result<()> {
//!     let config = casl::config::load_config("casl.toml")?;
//!     Ok(())
//! }
//! ```

pub mod anomaly;
pub mod errors;
pub mod ids;
pub mod location;
pub mod record;
pub mod result;
pub mod validity;

// Re-export commonly used types for convenience
pub use anomaly::{sort_anomalies, Anomaly, AnomalySide};
pub use errors::{CaslError, FetchError, FetchResult};
pub use ids::Ppn;
pub use location::{Item, SourceLocation, TargetLocation, TargetLocationBuilder};
pub use record::WorkRecord;
pub use result::Result;
pub use validity::ValidityFilter;
