//! External system integrations for CASL.
//!
//! This module provides adapters for the systems around the reconciliation core:
//!
//! - [`sudoc`] - SUDOC union catalogue (holdings and MARCXML records)
//! - [`alma`] - Alma REST API (bibs and items)
//! - [`marc`] - MARCXML decoding
//! - [`mapping`] - CSV code mapping table
//! - [`input`] - PPN list files
//! - [`report`] - CSV anomaly report
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with mock implementations. The dispatcher only sees the
//! [`fetcher`] traits, so both catalogues can be replaced by in-memory fakes.
//!
//! ```rust,no_run
//! use casl::adapters::alma::AlmaClient;
//! use casl::adapters::fetcher::TargetFetcher;
//! use casl::config::{AlmaConfig, secret_string};
//! use casl::domain::Ppn;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AlmaConfig {
//!     base_url: "https://api-eu.hosted.exlibrisgroup.com/almaws/v1/".to_string(),
//!     api_key: secret_string("l8xx...".to_string()),
//!     ignored_collections: vec![],
//!     excluded_process_codes: vec!["ACQ".to_string()],
//!     timeout_seconds: 30,
//! };
//!
//! let client = AlmaClient::new(&config)?;
//! let ppn = Ppn::new("076254208")?;
//! let locations = client.get_locations(&ppn).await?;
//! # Ok(())
//! # }
//! ```

pub mod alma;
pub mod fetcher;
pub mod http;
pub mod input;
pub mod mapping;
pub mod marc;
pub mod report;
pub mod sudoc;

pub use fetcher::{RecordFetcher, RequestCounts, SourceFetcher, TargetFetcher};
