//! Mock implementations for testing
//!
//! `MockTool` stands in for a real tool so the MCP host can be exercised
//! without an upstream API.

use crate::tools::{Tool, ToolDescription, ToolError};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Mock tool that records calls and returns a fixed result
#[derive(Debug, Clone)]
pub struct MockTool {
    pub name: String,
    pub parameters: Value,
    pub response: Value,
    pub should_fail: bool,
    pub calls: Arc<Mutex<Vec<Value>>>,
}

impl MockTool {
    /// Tool that accepts any object and returns `response`
    pub fn new(name: impl Into<String>, response: Value) -> Self {
        Self {
            name: name.into(),
            parameters: json!({"type": "object"}),
            response,
            should_fail: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Tool whose every call fails with a network error
    pub fn with_failure(name: impl Into<String>) -> Self {
        Self {
            should_fail: true,
            ..Self::new(name, Value::Null)
        }
    }

    pub fn with_schema(mut self, parameters: Value) -> Self {
        self.parameters = parameters;
        self
    }

    pub async fn get_calls(&self) -> Vec<Value> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl Tool for MockTool {
    fn describe(&self) -> ToolDescription {
        ToolDescription {
            name: self.name.clone(),
            description: format!("Mock tool {}", self.name),
            parameters: self.parameters.clone(),
        }
    }

    async fn initialize(&mut self, _config: Option<&Value>) -> Result<(), ToolError> {
        Ok(())
    }

    async fn execute(&self, parameters: &Value) -> Result<Value, ToolError> {
        self.calls.lock().await.push(parameters.clone());

        if self.should_fail {
            return Err(ToolError::NetworkError(
                "Mock upstream returned HTTP 503".to_string(),
            ));
        }
        Ok(self.response.clone())
    }
}
