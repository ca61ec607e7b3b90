//! Errors for a single player attempt.
//!
//! These never leave the playback driver: each one is logged and turned into
//! a fallback to the next player or the terminal bell.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The player executable is not installed
    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    /// The player could not be started
    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The player ran but reported an error
    #[error("{program} exited with status: {status}")]
    Exit {
        program: String,
        status: std::process::ExitStatus,
    },

    /// Waiting on the player process failed
    #[error("Failed to wait for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl PlaybackError {
    pub(crate) fn launch(program: &str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            PlaybackError::PlayerNotFound(program.to_string())
        } else {
            PlaybackError::Launch {
                program: program.to_string(),
                source,
            }
        }
    }
}

pub type PlaybackResult<T> = Result<T, PlaybackError>;
