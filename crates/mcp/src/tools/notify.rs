// Notification tool: play the resolved sound and acknowledge

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{json_schema_object, json_schema_string, Tool};
use anyhow::Result;
use pingmcp_core::playback::PlaybackDriver;
use pingmcp_core::sound::SoundSource;
use pingmcp_core::SoundAsset;
use std::sync::Arc;

pub const NOTIFY_TOOL: &str = "notify";

/// Plays the notification sound without waiting for it to finish
pub struct NotifyTool {
    sounds: Arc<SoundSource>,
    driver: Arc<PlaybackDriver>,
}

impl NotifyTool {
    pub fn new(sounds: Arc<SoundSource>, driver: Arc<PlaybackDriver>) -> Self {
        Self { sounds, driver }
    }

    fn acknowledgement(asset: &SoundAsset, message: Option<&str>) -> String {
        match message {
            Some(message) => format!("{} - Notification sound played: {}", message, asset.label()),
            None => format!("Notification sound played: {}", asset.label()),
        }
    }
}

#[async_trait::async_trait]
impl Tool for NotifyTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NOTIFY_TOOL.to_string(),
            description: "Play a notification sound to alert the user".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "message": json_schema_string("Optional message")
                }),
                vec![],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        // Non-string or blank messages are ignored rather than rejected
        let message = arguments
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty());

        let asset = self.sounds.current();
        tracing::info!(sound = %asset, note = message.unwrap_or_default(), "Notify");

        // Fire and forget: the handle is dropped and playback runs detached
        let _ = self.driver.play(&asset);

        Ok(CallToolResult::text(Self::acknowledgement(&asset, message)))
    }
}
