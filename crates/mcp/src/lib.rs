// MCP (Model Context Protocol) server exposing the `notify` tool
// Agent clients call it to play a sound when a task completes

pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod tools;

pub use config::PingConfig;
pub use error::McpError;
pub use server::McpServer;
