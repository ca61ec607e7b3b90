pub mod notify;
mod registry;

pub use notify::{NotifyTool, NOTIFY_TOOL};
pub use registry::{json_schema_object, json_schema_string, Tool, ToolRegistry};
