use super::bell::Bell;
use super::players::{PlayerCommand, PlayerTable};
use crate::error::{PlaybackError, PlaybackResult};
use crate::types::{PlaybackOutcome, Platform, SoundAsset};
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Plays a [`SoundAsset`] with the platform's native player, falling back to
/// the terminal bell. Never returns an error.
pub struct PlaybackDriver {
    platform: Platform,
    players: Vec<PlayerCommand>,
    bell: Arc<dyn Bell>,
    tasks: TaskTracker,
}

impl PlaybackDriver {
    /// Driver for the running platform with the built-in player table
    pub fn new(bell: Arc<dyn Bell>) -> Self {
        Self::for_platform(Platform::current(), &PlayerTable::builtin(), bell)
    }

    pub fn for_platform(platform: Platform, table: &PlayerTable, bell: Arc<dyn Bell>) -> Self {
        let players = table.players_for(&platform).to_vec();
        Self {
            platform,
            players,
            bell,
            tasks: TaskTracker::new(),
        }
    }

    /// Replace the player preference list
    pub fn with_players(mut self, players: Vec<PlayerCommand>) -> Self {
        self.players = players;
        self
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn players(&self) -> &[PlayerCommand] {
        &self.players
    }

    /// Start playing `asset` and return immediately.
    ///
    /// The player runs in a detached task; dropping the returned handle does
    /// not stop it, and [`shutdown`](Self::shutdown) still waits for it.
    /// Must be called from within a tokio runtime.
    pub fn play(&self, asset: &SoundAsset) -> PlaybackHandle {
        let Some(path) = asset.path() else {
            self.bell.ring();
            return PlaybackHandle::ready(PlaybackOutcome::fell_back(false));
        };

        if self.players.is_empty() {
            tracing::warn!(platform = %self.platform, "No audio player for platform, using bell");
            self.bell.ring();
            return PlaybackHandle::ready(PlaybackOutcome::fell_back(false));
        }

        let players = self.players.clone();
        let bell = Arc::clone(&self.bell);
        let path = path.to_path_buf();
        let task = self.tasks.spawn(async move { play_with_fallback(&players, &path, &*bell).await });

        PlaybackHandle::detached(task)
    }

    /// Number of playback attempts still running
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for every playback attempt started so far, so a failing player
    /// still gets its bell before the process exits
    pub async fn shutdown(&self) {
        self.tasks.close();
        if !self.tasks.is_empty() {
            tracing::debug!(pending = self.tasks.len(), "Waiting for playback to finish");
        }
        self.tasks.wait().await;
    }
}

/// Try each player in order; ring the bell once if none succeeds
async fn play_with_fallback(players: &[PlayerCommand], path: &Path, bell: &dyn Bell) -> PlaybackOutcome {
    let mut attempted = false;

    for player in players {
        match run_player(player, path).await {
            Ok(()) => {
                tracing::debug!(player = %player.program, path = %path.display(), "Sound played");
                return PlaybackOutcome::played(&player.program);
            }
            Err(e @ PlaybackError::PlayerNotFound(_)) => {
                tracing::debug!(error = %e, "Trying next player");
            }
            Err(e) => {
                attempted |= matches!(e, PlaybackError::Exit { .. } | PlaybackError::Wait { .. });
                tracing::warn!(error = %e, "Audio player failed");
            }
        }
    }

    tracing::warn!(path = %path.display(), "No audio player succeeded, using bell");
    bell.ring();
    PlaybackOutcome::fell_back(attempted)
}

async fn run_player(player: &PlayerCommand, path: &Path) -> PlaybackResult<()> {
    let mut command = Command::new(&player.program);
    command
        .args(player.build_args(path))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(windows)]
    command.creation_flags(CREATE_NO_WINDOW);

    let mut child = command
        .spawn()
        .map_err(|e| PlaybackError::launch(&player.program, e))?;

    let status = child.wait().await.map_err(|source| PlaybackError::Wait {
        program: player.program.clone(),
        source,
    })?;

    if !status.success() {
        return Err(PlaybackError::Exit {
            program: player.program.clone(),
            status,
        });
    }

    Ok(())
}

/// Completion of one playback attempt. Safe to ignore.
pub struct PlaybackHandle {
    state: HandleState,
}

enum HandleState {
    Ready(PlaybackOutcome),
    Running(JoinHandle<PlaybackOutcome>),
}

impl PlaybackHandle {
    fn ready(outcome: PlaybackOutcome) -> Self {
        Self {
            state: HandleState::Ready(outcome),
        }
    }

    fn detached(task: JoinHandle<PlaybackOutcome>) -> Self {
        Self {
            state: HandleState::Running(task),
        }
    }

    pub fn is_finished(&self) -> bool {
        match &self.state {
            HandleState::Ready(_) => true,
            HandleState::Running(task) => task.is_finished(),
        }
    }

    /// Wait for the player to exit
    pub async fn outcome(self) -> PlaybackOutcome {
        match self.state {
            HandleState::Ready(outcome) => outcome,
            HandleState::Running(task) => match task.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!(error = %e, "Playback task failed");
                    PlaybackOutcome::fell_back(true)
                }
            },
        }
    }
}
