//! Builtin tools
//!
//! Pure parameter and payload handling lives beside the I/O in each tool
//! module so it can be tested without a network.

pub mod latest_filings;

pub use latest_filings::{LatestFilingsParams, LatestFilingsTool};
