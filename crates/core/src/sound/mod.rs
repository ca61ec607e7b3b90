//! Sound selection: which asset represents "the notification sound"

mod cache;
mod resolver;

pub use cache::{CacheMode, SoundSource};
pub use resolver::{
    SoundResolver, AUDIO_EXTENSIONS, BUILTIN_SOUND, CUSTOM_SOUND_DIR, CUSTOM_SOUND_FILE,
};
