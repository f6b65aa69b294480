// CASL - SUDOC/Alma holdings reconciliation
// Copyright (c) 2025 CASL Contributors
// Licensed under the MIT License

//! # CASL - SUDOC/Alma holdings reconciliation
//!
//! CASL compares the holdings a set of libraries declares in SUDOC, the
//! French union catalogue, with the holdings recorded in their Alma
//! instance, and reports every library present on one side only.
//!
//! ## Overview
//!
//! For each PPN (SUDOC record identifier) a run:
//! - **Fetches** the SUDOC MARCXML record and the Alma holdings and items
//!   under one concurrency limit and a rate limit per catalogue
//! - **Maps** Alma library codes to SUDOC RCR holder codes
//! - **Compares** both holder sets and keeps the ones found on a single side
//! - **Filters** out electronic resources
//! - **Writes** a CSV report `resultats_YYYYMMDD-HHMMSS.csv`
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Dispatching, code mapping and reconciliation
//! - [`adapters`] - SUDOC and Alma clients, CSV inputs and report
//! - [`domain`] - Identifiers, holdings and anomalies
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use casl::config::load_config;
//! use casl::core::reconcile::ReconcileCoordinator;
//! use casl::domain::Ppn;
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("casl.toml")?;
//!     let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!
//!     let coordinator = ReconcileCoordinator::new(&config, shutdown_rx).await?;
//!     let summary = coordinator.execute(vec![Ppn::new("123456789")?]).await?;
//!
//!     println!("{} anomalies", summary.total_anomalies());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Setup and reporting errors use [`domain::CaslError`]. Per-identifier
//! fetch errors are [`domain::FetchError`] values carried in the dispatch
//! outcome, so one failing PPN never stops a run.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
