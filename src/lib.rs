//! fec-info-mcp
//!
//! An MCP tool server that lets an agent query the most recent electronic
//! filings submitted to the Federal Election Commission through the OpenFEC
//! API.
//!
//! # Overview
//!
//! - [`openfec`]: HTTP client and data model for the OpenFEC endpoints
//! - [`tools`]: tool system with JSON schema validation and the builtin
//!   `latest_filings` tool
//! - [`mcp`]: rmcp-based MCP host serving the tools over stdio
//! - [`config`]: TOML configuration with environment-resolved API key
//!
//! # Quick Start
//!
//! ```rust
//! use fec_info_mcp::tools::builtin::LatestFilingsParams;
//! use fec_info_mcp::openfec::SortOrder;
//!
//! let params: LatestFilingsParams = serde_json::from_value(serde_json::json!({
//!     "limit": 5,
//!     "form_type": "F3",
//!     "since": "2025-10-01"
//! }))
//! .unwrap();
//!
//! assert!(params.validate(100).is_ok());
//! assert_eq!(params.sort, SortOrder::NewestFirst);
//!
//! let query = params.to_query();
//! assert_eq!(query.limit, 5);
//! ```

pub mod config;
pub mod error;
pub mod mcp;
pub mod observability;
pub mod openfec;
pub mod testing;
pub mod tools;

pub use config::{ConfigError, ServerConfig, ToolConfig};
pub use error::{ServerError, ServerResult};
pub use mcp::McpServer;
pub use openfec::{FilingRecord, LatestFilings, OpenFecClient, OpenFecConfig, OpenFecError};
pub use tools::{Tool, ToolDescription, ToolError, ToolSystem};
