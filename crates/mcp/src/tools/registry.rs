// MCP tool trait and registry

use crate::error::McpError;
use crate::protocol::{CallToolResult, ToolSchema};
use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Tool executor trait
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool schema for MCP
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with given arguments
    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult>;
}

/// Tool registry for managing available tools
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let schema = tool.schema();
        self.tools.insert(schema.name.clone(), tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// List all tool schemas, ordered by name
    pub fn list_schemas(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|t| t.schema()).collect()
    }

    /// Check if a tool exists
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run a tool by name
    pub async fn call(&self, name: &str, arguments: serde_json::Value) -> Result<CallToolResult, McpError> {
        let tool = self
            .get(name)
            .ok_or_else(|| McpError::UnknownTool(name.to_string()))?;

        tool.execute(arguments)
            .await
            .map_err(|e| McpError::ToolFailed {
                name: name.to_string(),
                message: format!("{:#}", e),
            })
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// Helper functions for creating tool schemas

pub fn json_schema_object(properties: serde_json::Value, required: Vec<&str>) -> serde_json::Value {
    if required.is_empty() {
        return serde_json::json!({
            "type": "object",
            "properties": properties
        });
    }

    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

pub fn json_schema_string(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "description": description
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait::async_trait]
    impl Tool for EchoTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "echo".to_string(),
                description: "Echo arguments".to_string(),
                input_schema: json_schema_object(serde_json::json!({}), vec![]),
            }
        }

        async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
            if arguments.get("fail").is_some() {
                anyhow::bail!("asked to fail");
            }
            Ok(CallToolResult::text(arguments.to_string()))
        }
    }

    #[tokio::test]
    async fn test_registry_call() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));

        assert!(registry.contains("echo"));
        assert_eq!(registry.len(), 1);

        let result = registry.call("echo", serde_json::json!({"a": 1})).await.unwrap();
        assert_eq!(result.content.len(), 1);
    }

    #[tokio::test]
    async fn test_registry_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry.call("bogus", serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, McpError::UnknownTool(ref name) if name == "bogus"));
        assert_eq!(err.to_string(), "Unknown tool: bogus");
    }

    #[tokio::test]
    async fn test_registry_tool_failure() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));

        let err = registry
            .call("echo", serde_json::json!({"fail": true}))
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::ToolFailed { .. }));
    }

    #[test]
    fn test_object_schema_omits_empty_required() {
        let schema = json_schema_object(serde_json::json!({"x": json_schema_string("x")}), vec![]);
        assert!(schema.get("required").is_none());

        let schema = json_schema_object(serde_json::json!({"x": json_schema_string("x")}), vec!["x"]);
        assert_eq!(schema["required"], serde_json::json!(["x"]));
    }
}
