//! SUDOC union catalogue adapter
//!
//! Holdings come from the MARCXML record of each PPN (field `930`); the
//! holder directory (RCR to ILN and short name) comes from the `iln2rcr`
//! web service and is loaded once when the client is built.

pub mod client;
pub mod models;

pub use client::{HolderInfo, SudocClient};
