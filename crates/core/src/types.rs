use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Label reported when no sound file was found and the terminal bell is used
pub const BELL_LABEL: &str = "system beep";

/// The resolved choice of what to play for one notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundAsset {
    path: Option<PathBuf>,
    label: String,
}

impl SoundAsset {
    /// An audio file below `root`. The label is the path relative to the
    /// root with `/` separators, or the file name when it is not below it.
    pub fn file(root: &Path, path: PathBuf) -> Self {
        let label = match path.strip_prefix(root) {
            Ok(relative) => relative
                .components()
                .filter_map(|c| match c {
                    Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("/"),
            Err(_) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        };

        Self {
            path: Some(path),
            label,
        }
    }

    /// No file: play the terminal bell
    pub fn bell() -> Self {
        Self {
            path: None,
            label: BELL_LABEL.to_string(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_bell(&self) -> bool {
        self.path.is_none()
    }
}

impl std::fmt::Display for SoundAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Priority tier a sound candidate was found at
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundTier {
    /// Operator override at `custom/default.mp3`
    Custom,
    /// Shipped `notification.mp3`
    BuiltIn,
    /// Any other audio file in the installation root
    Discovered,
    /// Terminal bell
    Bell,
}

impl std::fmt::Display for SoundTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SoundTier::Custom => "custom",
            SoundTier::BuiltIn => "built-in",
            SoundTier::Discovered => "discovered",
            SoundTier::Bell => "bell",
        };
        f.write_str(name)
    }
}

/// One entry of the sound catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundCandidate {
    pub tier: SoundTier,
    pub asset: SoundAsset,
}

/// Result of one playback attempt. Internal; never returned to tool callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackOutcome {
    /// A player process was launched
    pub attempted: bool,
    /// Launch failed, the player exited with an error, or no player exists
    pub failed: bool,
    /// Program that played the file, if any
    pub player: Option<String>,
}

impl PlaybackOutcome {
    pub fn played(player: impl Into<String>) -> Self {
        Self {
            attempted: true,
            failed: false,
            player: Some(player.into()),
        }
    }

    pub fn fell_back(attempted: bool) -> Self {
        Self {
            attempted,
            failed: true,
            player: None,
        }
    }
}

/// Operating system family, detected once per process
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    MacOs,
    Linux,
    Windows,
    Other(String),
}

impl Platform {
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "macos" => Platform::MacOs,
            "linux" => Platform::Linux,
            "windows" => Platform::Windows,
            other => Platform::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::MacOs => f.write_str("macos"),
            Platform::Linux => f.write_str("linux"),
            Platform::Windows => f.write_str("windows"),
            Platform::Other(os) => f.write_str(os),
        }
    }
}
