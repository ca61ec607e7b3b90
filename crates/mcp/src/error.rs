use crate::protocol::JsonRpcError;
use thiserror::Error;

/// Errors a tool call can surface to the client
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool {name} failed: {message}")]
    ToolFailed { name: String, message: String },
}

impl From<McpError> for JsonRpcError {
    fn from(error: McpError) -> Self {
        match error {
            McpError::UnknownTool(_) => JsonRpcError::invalid_params(error.to_string()),
            McpError::ToolFailed { .. } => JsonRpcError::internal_error(error.to_string()),
        }
    }
}
