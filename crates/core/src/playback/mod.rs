//! Native sound playback with a terminal-bell fallback

pub mod bell;
mod driver;
pub mod players;

pub use bell::{Bell, BellStream, TerminalBell};
pub use driver::{PlaybackDriver, PlaybackHandle};
pub use players::{PlayerArg, PlayerCommand, PlayerTable};
