//! Alma library system adapter
//!
//! Reads holdings through the Alma REST API (XML representation). The API
//! key is sent as a query parameter and never logged.

pub mod client;
pub mod models;

pub use client::AlmaClient;
