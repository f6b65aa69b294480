//! CLI command implementations

pub mod init;
pub mod reconcile;
pub mod validate;
