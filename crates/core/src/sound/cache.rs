use super::SoundResolver;
use crate::types::SoundAsset;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// When the notification sound is resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    /// Re-resolve on every call; always reflects the current files
    #[default]
    PerCall,
    /// Resolve on first use, reuse afterwards
    Lazy,
    /// Resolve when the source is created, reuse afterwards
    Eager,
}

/// Hands out the current [`SoundAsset`] according to one [`CacheMode`].
///
/// The mode is fixed at construction, so a process never mixes cached and
/// fresh results. The cached value is written at most once.
#[derive(Debug)]
pub struct SoundSource {
    resolver: SoundResolver,
    mode: CacheMode,
    cached: OnceLock<SoundAsset>,
}

impl SoundSource {
    pub fn new(resolver: SoundResolver, mode: CacheMode) -> Self {
        let cached = OnceLock::new();
        if mode == CacheMode::Eager {
            let asset = resolver.resolve();
            tracing::info!(sound = %asset, "Notification sound resolved at startup");
            let _ = cached.set(asset);
        }

        Self {
            resolver,
            mode,
            cached,
        }
    }

    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    pub fn resolver(&self) -> &SoundResolver {
        &self.resolver
    }

    /// The asset to use for this notification
    pub fn current(&self) -> SoundAsset {
        match self.mode {
            CacheMode::PerCall => self.resolver.resolve(),
            CacheMode::Lazy | CacheMode::Eager => self
                .cached
                .get_or_init(|| self.resolver.resolve())
                .clone(),
        }
    }
}
