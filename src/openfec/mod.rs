//! OpenFEC REST API access
//!
//! Thin client for the Federal Election Commission's open data service.
//! One call to [`OpenFecClient::latest_filings`] issues exactly one HTTP GET
//! against the e-filing listing endpoint and returns the first page of
//! results in upstream order. There is no retry, caching or pagination
//! traversal here; callers see upstream failures as they happen.

pub mod client;
pub mod models;

pub use client::{OpenFecClient, OpenFecConfig, DEFAULT_BASE_URL, DEMO_API_KEY};
pub use models::{
    ApiEnvelope, CommitteeReport, EfileFiling, FilingRecord, FilingTotals, FilingsQuery,
    LatestFilings, Pagination, SortOrder,
};

use thiserror::Error;

/// Errors raised while talking to OpenFEC
#[derive(Debug, Error)]
pub enum OpenFecError {
    /// Upstream unreachable, timed out, or answered with a non-2xx status
    #[error("Network error: {message}")]
    Network {
        status: Option<u16>,
        message: String,
    },

    /// Response body did not have the expected shape
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Request rejected before it was sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("OpenFEC client not configured: {0}")]
    NotConfigured(String),
}

impl OpenFecError {
    pub fn network<S: Into<String>>(status: Option<u16>, message: S) -> Self {
        Self::Network {
            status,
            message: message.into(),
        }
    }

    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// HTTP status carried by a network error, if the upstream answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Network { status, .. } => *status,
            _ => None,
        }
    }
}
