//! Tool system exposed to MCP clients
//!
//! Tools describe themselves with a JSON schema, are configured once at
//! startup, and are executed with parameters that have already been validated
//! against that schema.

use crate::config::ToolConfig;
use crate::openfec::{OpenFecConfig, OpenFecError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

pub mod builtin;

/// Tool interface
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name, description and JSON schema for the tool's parameters
    fn describe(&self) -> ToolDescription;

    /// Receives the tool's `config` table from the server configuration.
    /// Called once at startup.
    async fn initialize(&mut self, config: Option<&Value>) -> Result<(), ToolError>;

    /// Receives parameters that already match the schema from describe()
    async fn execute(&self, parameters: &Value) -> Result<Value, ToolError>;

    /// Release clients and other resources
    async fn shutdown(&mut self) -> Result<(), ToolError> {
        Ok(())
    }
}

/// Tool description advertised to clients
#[derive(Debug, Clone)]
pub struct ToolDescription {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Registry and executor for configured tools
pub struct ToolSystem {
    tools: HashMap<String, Box<dyn Tool>>,
    openfec: OpenFecConfig,
}

impl ToolSystem {
    pub fn new() -> Self {
        Self::with_openfec(OpenFecConfig::default())
    }

    /// Tool system whose builtin tools talk to OpenFEC with `openfec`
    pub fn with_openfec(openfec: OpenFecConfig) -> Self {
        Self {
            tools: HashMap::new(),
            openfec,
        }
    }

    /// Initialize tool system from the `[tools]` configuration table
    pub async fn initialize(
        &mut self,
        tool_configs: &HashMap<String, ToolConfig>,
    ) -> Result<(), ToolError> {
        for (tool_name, tool_config) in tool_configs {
            let mut tool = self.create_tool(tool_name, tool_config)?;

            let config = match tool_config {
                ToolConfig::Simple(_) => None,
                ToolConfig::Complex { config, .. } => Some(
                    serde_json::to_value(config)
                        .map_err(|e| ToolError::InitializationError(e.to_string()))?,
                ),
            };

            tool.initialize(config.as_ref()).await?;
            tracing::debug!(tool = %tool_name, "Tool initialized");

            self.tools.insert(tool_name.clone(), tool);
        }

        Ok(())
    }

    /// Register an already initialized tool under its described name
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.describe().name;
        self.tools.insert(name, tool);
    }

    /// Create tool instance based on configuration
    fn create_tool(
        &self,
        tool_name: &str,
        config: &ToolConfig,
    ) -> Result<Box<dyn Tool>, ToolError> {
        match config.implementation() {
            "builtin" => self.create_builtin_tool(tool_name),
            other => Err(ToolError::UnknownImplementation(other.to_string())),
        }
    }

    /// Create builtin tool instances
    fn create_builtin_tool(&self, tool_name: &str) -> Result<Box<dyn Tool>, ToolError> {
        match tool_name {
            "latest_filings" => Ok(Box::new(builtin::LatestFilingsTool::new(
                self.openfec.clone(),
            ))),
            _ => Err(ToolError::UnknownTool(tool_name.to_string())),
        }
    }

    pub fn has_tool(&self, tool_name: &str) -> bool {
        self.tools.contains_key(tool_name)
    }

    /// Execute tool with validated parameters
    pub async fn execute_tool(
        &self,
        tool_name: &str,
        parameters: &Value,
    ) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .get(tool_name)
            .ok_or_else(|| ToolError::UnknownTool(tool_name.to_string()))?;

        // Parameters are validated against the schema before execution
        Self::validate_parameters(&tool.describe(), parameters)?;

        tool.execute(parameters).await
    }

    /// Validate parameters against a tool schema (pure function)
    fn validate_parameters(
        description: &ToolDescription,
        parameters: &Value,
    ) -> Result<(), ToolError> {
        let validator = jsonschema::validator_for(&description.parameters)
            .map_err(|e| ToolError::SchemaError(format!("Schema compilation error: {e}")))?;

        validator.validate(parameters).map_err(|errors| {
            let error_messages: Vec<String> = errors
                .map(|e| format!("At '{}': {}", e.instance_path, e))
                .collect();
            ToolError::ValidationError(error_messages.join("; "))
        })
    }

    /// Get sorted list of available tools
    pub fn list_tools(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Shutdown all tools
    pub async fn shutdown(&mut self) -> Result<(), ToolError> {
        for tool in self.tools.values_mut() {
            tool.shutdown().await?;
        }
        Ok(())
    }
}

impl Default for ToolSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Tool system errors
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Unknown tool implementation: {0}")]
    UnknownImplementation(String),
    #[error("Tool initialization failed: {0}")]
    InitializationError(String),
    #[error("Parameter validation failed: {0}")]
    ValidationError(String),
    #[error("Schema error: {0}")]
    SchemaError(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Tool execution failed: {0}")]
    ExecutionError(String),
}

impl ToolError {
    /// Stable machine-readable kind, surfaced to clients next to the message
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::UnknownTool(_) => "UnknownTool",
            ToolError::UnknownImplementation(_) => "UnknownImplementation",
            ToolError::InitializationError(_) => "InitializationError",
            ToolError::ValidationError(_) => "ValidationError",
            ToolError::SchemaError(_) => "SchemaError",
            ToolError::NetworkError(_) => "NetworkError",
            ToolError::ParseError(_) => "ParseError",
            ToolError::ExecutionError(_) => "ExecutionError",
        }
    }
}

impl From<OpenFecError> for ToolError {
    fn from(err: OpenFecError) -> Self {
        match err {
            OpenFecError::Network { message, .. } => ToolError::NetworkError(message),
            OpenFecError::Parse { message } => ToolError::ParseError(message),
            OpenFecError::InvalidRequest(message) => ToolError::ValidationError(message),
            OpenFecError::NotConfigured(message) => ToolError::InitializationError(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTool;
    use serde_json::json;

    #[tokio::test]
    async fn test_tool_system_creation() {
        let tool_system = ToolSystem::new();
        assert_eq!(tool_system.list_tools().len(), 0);
    }

    #[tokio::test]
    async fn test_tool_system_initialization() {
        let mut tool_system = ToolSystem::new();
        let mut tool_configs = HashMap::new();

        tool_configs.insert(
            "latest_filings".to_string(),
            ToolConfig::Simple("builtin".to_string()),
        );

        let result = tool_system.initialize(&tool_configs).await;
        assert!(result.is_ok());
        assert_eq!(tool_system.list_tools(), vec!["latest_filings".to_string()]);
        assert!(tool_system.has_tool("latest_filings"));
    }

    #[tokio::test]
    async fn test_unknown_tool_implementation() {
        let mut tool_system = ToolSystem::new();
        let mut tool_configs = HashMap::new();

        tool_configs.insert(
            "test_tool".to_string(),
            ToolConfig::Simple("unknown".to_string()),
        );

        let result = tool_system.initialize(&tool_configs).await;
        assert!(matches!(result, Err(ToolError::UnknownImplementation(_))));
    }

    #[tokio::test]
    async fn test_unknown_builtin_tool() {
        let mut tool_system = ToolSystem::new();
        let mut tool_configs = HashMap::new();

        tool_configs.insert(
            "committee_lookup".to_string(),
            ToolConfig::Simple("builtin".to_string()),
        );

        let result = tool_system.initialize(&tool_configs).await;
        assert!(matches!(result, Err(ToolError::UnknownTool(_))));
    }

    #[tokio::test]
    async fn test_tool_execution_unknown_tool() {
        let tool_system = ToolSystem::new();
        let params = json!({"limit": 5});

        let result = tool_system.execute_tool("unknown", &params).await;
        assert!(matches!(result, Err(ToolError::UnknownTool(_))));
    }

    #[tokio::test]
    async fn test_registered_tool_receives_validated_parameters() {
        let mock_tool = MockTool::new("echo", json!({"ok": true})).with_schema(json!({
            "type": "object",
            "properties": {"x": {"type": "integer"}},
            "additionalProperties": false
        }));
        let calls = mock_tool.clone();

        let mut tool_system = ToolSystem::new();
        tool_system.register(Box::new(mock_tool));
        assert!(tool_system.has_tool("echo"));

        let result = tool_system.execute_tool("echo", &json!({"x": 1})).await;
        assert_eq!(result.unwrap(), json!({"ok": true}));

        let rejected = tool_system.execute_tool("echo", &json!({"y": 1})).await;
        assert!(matches!(rejected, Err(ToolError::ValidationError(_))));

        // Rejected parameters never reach the tool
        assert_eq!(calls.get_calls().await, vec![json!({"x": 1})]);
    }

    #[tokio::test]
    async fn test_failing_tool_error_passes_through() {
        let mut tool_system = ToolSystem::new();
        tool_system.register(Box::new(MockTool::with_failure("flaky")));

        let err = tool_system
            .execute_tool("flaky", &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "NetworkError");
    }

    #[test]
    fn test_validate_parameters_reports_path() {
        let description = ToolDescription {
            name: "demo".to_string(),
            description: "demo".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {"limit": {"type": "integer", "maximum": 100}},
                "additionalProperties": false
            }),
        };

        assert!(ToolSystem::validate_parameters(&description, &json!({"limit": 5})).is_ok());

        let err = ToolSystem::validate_parameters(&description, &json!({"limit": 500}))
            .unwrap_err();
        match err {
            ToolError::ValidationError(message) => assert!(message.contains("/limit")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_openfec_errors_keep_their_kind() {
        let network: ToolError = OpenFecError::network(Some(500), "boom").into();
        assert_eq!(network.kind(), "NetworkError");

        let parse: ToolError = OpenFecError::parse("bad json").into();
        assert_eq!(parse.kind(), "ParseError");

        let invalid: ToolError = OpenFecError::InvalidRequest("bad id".to_string()).into();
        assert_eq!(invalid.kind(), "ValidationError");
    }
}
