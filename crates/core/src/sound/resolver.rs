use crate::types::{SoundAsset, SoundCandidate, SoundTier};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory holding the operator override, relative to the installation root
pub const CUSTOM_SOUND_DIR: &str = "custom";

/// File name of the operator override inside [`CUSTOM_SOUND_DIR`]
pub const CUSTOM_SOUND_FILE: &str = "default.mp3";

/// File name of the shipped default sound in the installation root
pub const BUILTIN_SOUND: &str = "notification.mp3";

/// Extensions recognized when scanning the installation root (lowercase)
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a"];

/// Picks the notification sound for an installation root.
///
/// Priority, first existing match wins:
/// 1. `custom/default.mp3`
/// 2. `notification.mp3`
/// 3. any other audio file in the root, alphabetical by file name
///    (skipped when scanning is disabled)
/// 4. the terminal bell
///
/// Missing files and unreadable directories are normal outcomes, never errors.
#[derive(Debug, Clone)]
pub struct SoundResolver {
    root: PathBuf,
    scan_root: bool,
}

impl SoundResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            scan_root: true,
        }
    }

    /// Enable or disable tier 3. Disabled gives the two-tier policy.
    pub fn with_scan(mut self, scan_root: bool) -> Self {
        self.scan_root = scan_root;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scans_root(&self) -> bool {
        self.scan_root
    }

    pub fn custom_path(&self) -> PathBuf {
        self.root.join(CUSTOM_SOUND_DIR).join(CUSTOM_SOUND_FILE)
    }

    pub fn builtin_path(&self) -> PathBuf {
        self.root.join(BUILTIN_SOUND)
    }

    /// Resolve the sound to play right now
    pub fn resolve(&self) -> SoundAsset {
        let custom = self.custom_path();
        if custom.is_file() {
            tracing::debug!(path = %custom.display(), "Using custom sound");
            return SoundAsset::file(&self.root, custom);
        }

        let builtin = self.builtin_path();
        if builtin.is_file() {
            tracing::debug!(path = %builtin.display(), "Using built-in sound");
            return SoundAsset::file(&self.root, builtin);
        }

        if self.scan_root {
            if let Some(path) = self.discover().into_iter().next() {
                tracing::debug!(path = %path.display(), "Using discovered sound");
                return SoundAsset::file(&self.root, path);
            }
        }

        tracing::debug!(root = %self.root.display(), "No sound file found, using bell");
        SoundAsset::bell()
    }

    /// Every candidate in priority order, ending with the bell.
    /// The first entry is always what [`resolve`](Self::resolve) returns.
    pub fn candidates(&self) -> Vec<SoundCandidate> {
        let mut candidates = Vec::new();

        let custom = self.custom_path();
        if custom.is_file() {
            candidates.push(SoundCandidate {
                tier: SoundTier::Custom,
                asset: SoundAsset::file(&self.root, custom),
            });
        }

        let builtin = self.builtin_path();
        if builtin.is_file() {
            candidates.push(SoundCandidate {
                tier: SoundTier::BuiltIn,
                asset: SoundAsset::file(&self.root, builtin),
            });
        }

        if self.scan_root {
            candidates.extend(self.discover().into_iter().map(|path| SoundCandidate {
                tier: SoundTier::Discovered,
                asset: SoundAsset::file(&self.root, path),
            }));
        }

        candidates.push(SoundCandidate {
            tier: SoundTier::Bell,
            asset: SoundAsset::bell(),
        });

        candidates
    }

    /// Audio files directly in the root other than the built-in sound,
    /// sorted by file name. A listing failure yields no candidates.
    fn discover(&self) -> Vec<PathBuf> {
        let entries: Result<Vec<_>, _> = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .collect();

        let entries = match entries {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(root = %self.root.display(), error = %e, "Failed to list sound directory");
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .filter(|entry| entry.file_name() != BUILTIN_SOUND)
            .map(|entry| entry.into_path())
            .filter(|path| is_audio_file(path))
            .collect()
    }
}

fn is_audio_file(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }

    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| AUDIO_EXTENSIONS.contains(&ext.as_str()))
}
