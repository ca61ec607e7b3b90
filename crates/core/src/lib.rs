// Core sound selection and playback for PingMCP

pub mod error;
pub mod playback;
pub mod sound;
pub mod types;

pub use error::{PlaybackError, PlaybackResult};
pub use types::*;
