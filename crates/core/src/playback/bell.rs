// Terminal bell fallback

use serde::{Deserialize, Serialize};
use std::io::Write;

/// The BEL control character
pub const BELL: &[u8] = b"\x07";

/// Last-resort audible cue
pub trait Bell: Send + Sync {
    fn ring(&self);
}

/// Stream the bell character is written to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BellStream {
    #[default]
    Stdout,
    Stderr,
}

/// Writes BEL to the process's standard output (or error).
///
/// Writes go through the stream's global lock, so a bell never splits a
/// line another writer emits under the same lock. On stdout the BEL byte
/// still lands in front of the next line, which strict line-JSON readers
/// reject; use [`BellStream::Stderr`] when stdout carries protocol frames
/// for such a client.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell {
    stream: BellStream,
}

impl TerminalBell {
    pub fn new(stream: BellStream) -> Self {
        Self { stream }
    }
}

impl Bell for TerminalBell {
    fn ring(&self) {
        let result = match self.stream {
            BellStream::Stdout => {
                let mut out = std::io::stdout().lock();
                out.write_all(BELL).and_then(|_| out.flush())
            }
            BellStream::Stderr => {
                let mut err = std::io::stderr().lock();
                err.write_all(BELL).and_then(|_| err.flush())
            }
        };

        if let Err(e) = result {
            tracing::debug!(error = %e, "Failed to write terminal bell");
        }
    }
}
