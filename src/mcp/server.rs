//! MCP server built on rmcp
//!
//! `latest_filings` is routed with rmcp's tool macros. Arguments are decoded
//! into [`LatestFilingsParams`], then run through the [`ToolSystem`] so the
//! same schema validation applies here and on the CLI.

use super::framing;
use crate::config::ServerConfig;
use crate::error::{sanitize_error_message, ServerError, ServerResult};
use crate::tools::builtin::{latest_filings::TOOL_NAME, LatestFilingsParams};
use crate::tools::{ToolError, ToolSystem};
use rmcp::handler::server::{router::tool::ToolRouter, wrapper::Parameters};
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn, Instrument};

const PIPE_CAPACITY: usize = 64 * 1024;
const REPLY_QUEUE: usize = 64;

/// MCP server exposing a [`ToolSystem`]
#[derive(Clone)]
pub struct McpServer {
    name: String,
    instructions: Option<String>,
    tools: Arc<RwLock<ToolSystem>>,
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    pub fn new(name: impl Into<String>, tools: ToolSystem) -> Self {
        Self {
            name: name.into(),
            instructions: None,
            tools: Arc::new(RwLock::new(tools)),
            tool_router: Self::tool_router(),
        }
    }

    pub fn with_instructions(mut self, instructions: Option<String>) -> Self {
        self.instructions = instructions;
        self
    }

    /// Validate the configuration, then build the server and initialize every
    /// configured tool
    pub async fn from_config(config: &ServerConfig) -> ServerResult<Self> {
        config.validate()?;

        let mut tools = ToolSystem::with_openfec(config.openfec_config());
        tools.initialize(&config.tools).await?;

        info!(
            server = %config.server.name,
            tools = ?tools.list_tools(),
            "MCP server ready"
        );

        Ok(Self::new(config.server.name.clone(), tools)
            .with_instructions(config.server.instructions.clone()))
    }

    /// Names of the initialized tools
    pub async fn tool_names(&self) -> Vec<String> {
        self.tools.read().await.list_tools()
    }

    /// Serve newline-delimited JSON-RPC until the reader reaches EOF
    pub async fn run<R, W>(self, reader: R, writer: W) -> ServerResult<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (screened_tx, service_rx) = tokio::io::duplex(PIPE_CAPACITY);
        let (service_tx, relay_rx) = tokio::io::duplex(PIPE_CAPACITY);
        let (replies_tx, replies_rx) = mpsc::channel(REPLY_QUEUE);

        let output = tokio::spawn(framing::write_lines(replies_rx, writer));
        let relay = tokio::spawn(framing::relay_lines(relay_rx, replies_tx.clone()));
        let input = tokio::spawn(framing::screen_input(reader, screened_tx, replies_tx));

        let served = self.serve_session(service_rx, service_tx).await;

        input.abort();
        if let Ok(Err(e)) = input.await {
            warn!(error = %e, "Input stream failed");
        }
        relay.await.map_err(|e| ServerError::transport(e.to_string()))??;
        output.await.map_err(|e| ServerError::transport(e.to_string()))??;

        served
    }

    async fn serve_session(
        self,
        reader: tokio::io::DuplexStream,
        writer: tokio::io::DuplexStream,
    ) -> ServerResult<()> {
        let service = self
            .serve((reader, writer))
            .await
            .map_err(|e| ServerError::transport(format!("MCP initialization failed: {e}")))?;

        let reason = service
            .waiting()
            .await
            .map_err(|e| ServerError::transport(e.to_string()))?;

        debug!(?reason, "MCP session ended");
        Ok(())
    }

    /// Serve on stdin/stdout
    pub async fn run_stdio(self) -> ServerResult<()> {
        self.run(tokio::io::stdin(), tokio::io::stdout()).await
    }

    pub async fn shutdown(&self) -> ServerResult<()> {
        self.tools.write().await.shutdown().await?;
        info!("MCP server stopped");
        Ok(())
    }

    async fn execute(&self, tool_name: &str, arguments: &Value) -> Result<Value, ToolError> {
        self.tools
            .read()
            .await
            .execute_tool(tool_name, arguments)
            .await
    }
}

#[tool_router]
impl McpServer {
    #[tool(
        description = "Retrieve the most recent electronic filings submitted to the FEC, \
            newest first. Filter by committee, form type or receipt date range; \
            optionally include document URLs and processed report totals."
    )]
    async fn latest_filings(
        &self,
        Parameters(params): Parameters<LatestFilingsParams>,
    ) -> Result<CallToolResult, McpError> {
        let arguments =
            serde_json::to_value(&params).map_err(|e| ServerError::from(e).to_error_data())?;

        let span = crate::tool_span!(tool = TOOL_NAME);
        let result = self.execute(TOOL_NAME, &arguments).instrument(span).await;

        Ok(match result {
            Ok(payload) => {
                debug!(tool = TOOL_NAME, "Tool call succeeded");
                CallToolResult::structured(payload)
            }
            Err(e) => {
                warn!(tool = TOOL_NAME, kind = e.kind(), error = %e, "Tool call failed");
                tool_failure(&e)
            }
        })
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.name.clone(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: self.instructions.clone(),
            ..Default::default()
        }
    }
}

/// Failed tool call as an `isError` result carrying the sanitized message
/// and the error kind
fn tool_failure(error: &ToolError) -> CallToolResult {
    let message = sanitize_error_message(&error.to_string());
    let mut result = CallToolResult::error(vec![Content::text(message.clone())]);
    result.structured_content = Some(json!({
        "error": {
            "kind": error.kind(),
            "message": message,
        }
    }));
    result
}
