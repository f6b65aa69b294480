//! Core business logic for CASL.
//!
//! This module contains the reconciliation logic and its orchestration.
//!
//! # Modules
//!
//! - [`mapping`] - Many-to-many code mapping between RCRs and Alma libraries
//! - [`dispatch`] - Bounded, rate-limited concurrent fetching
//! - [`reconcile`] - Comparison, filters and run coordination
//!
//! # Reconciliation Workflow
//!
//! 1. **Load Mapping**: Read the RCR / Alma library table
//! 2. **Fetch**: Read the holdings of every PPN in SUDOC and Alma
//! 3. **Merge**: Fold the buildings of multi-building RCRs
//! 4. **Compare**: Report holdings with no mapped counterpart
//! 5. **Filter**: Drop electronic resources
//! 6. **Report**: Sort and write the CSV report
//!
//! # Example
//!
//! ```rust,no_run
//! use casl::adapters::input::read_identifiers;
//! use casl::config::load_config;
//! use casl::core::reconcile::ReconcileCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("casl.toml")?;
//! let batch = read_identifiers(&["ppn.txt"])?;
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let coordinator = ReconcileCoordinator::new(&config, shutdown_rx).await?;
//! let summary = coordinator.execute(batch.identifiers).await?;
//!
//! println!("Anomalies: {}", summary.total_anomalies());
//! # Ok(())
//! # }
//! ```

pub mod dispatch;
pub mod mapping;
pub mod reconcile;
