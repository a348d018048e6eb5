//! Model Context Protocol host
//!
//! Serves the tool system to an MCP client over newline-delimited JSON-RPC 2.0
//! on stdin/stdout. Protocol handling comes from rmcp; [`framing`] screens the
//! raw input lines in front of it.

pub mod framing;
pub mod server;

pub use server::McpServer;
