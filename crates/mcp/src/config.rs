use anyhow::{Context, Result};
use pingmcp_core::playback::{BellStream, PlaybackDriver, PlayerCommand, PlayerTable, TerminalBell};
use pingmcp_core::sound::{CacheMode, SoundResolver, SoundSource};
use pingmcp_core::Platform;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Name of the optional config file looked up in the installation root
pub const CONFIG_FILE: &str = "pingmcp.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingConfig {
    /// When the notification sound is resolved
    #[serde(default)]
    pub cache: CacheMode,

    /// Fall back to any audio file in the installation root
    #[serde(default = "default_scan_root")]
    pub scan_root: bool,

    #[serde(default)]
    pub bell: BellStream,

    /// Player preference list for this platform, replacing the built-in one
    #[serde(default)]
    pub players: Option<Vec<PlayerCommand>>,
}

fn default_scan_root() -> bool {
    true
}

impl Default for PingConfig {
    fn default() -> Self {
        Self {
            cache: CacheMode::default(),
            scan_root: default_scan_root(),
            bell: BellStream::default(),
            players: None,
        }
    }
}

impl PingConfig {
    /// Load `config_path` if it exists, otherwise use defaults
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "Configuration file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read configuration file {}", config_path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse configuration file {}", config_path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn resolver(&self, root: &Path) -> SoundResolver {
        SoundResolver::new(root).with_scan(self.scan_root)
    }

    pub fn sound_source(&self, root: &Path) -> SoundSource {
        SoundSource::new(self.resolver(root), self.cache)
    }

    /// Playback driver for the running platform
    pub fn playback_driver(&self) -> PlaybackDriver {
        let platform = Platform::current();
        let mut table = PlayerTable::builtin();
        if let Some(players) = &self.players {
            table.insert(platform.clone(), players.clone());
        }

        PlaybackDriver::for_platform(platform, &table, Arc::new(TerminalBell::new(self.bell)))
    }
}
