//! Concurrent fetch dispatch
//!
//! - [`Dispatcher`] - per-identifier tasks under a shared concurrency bound
//! - [`RateLimiter`] - per-fetcher start-rate bound

pub mod dispatcher;
pub mod limiter;

pub use dispatcher::{
    DispatchOutcome, DispatchSettings, Dispatcher, FetchFailure, FetchSide, HolderScope,
};
pub use limiter::RateLimiter;
