// Native audio players per platform

use crate::types::Platform;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::Path;

/// Placeholder replaced by the sound file path
pub const FILE_PLACEHOLDER: &str = "{file}";

/// Placeholder replaced by a base64 PowerShell script playing the sound file
pub const POWERSHELL_PLACEHOLDER: &str = "{powershell-sound-player}";

/// One argument of a player invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PlayerArg {
    Literal(String),
    File,
    PowerShellSoundPlayer,
}

impl From<String> for PlayerArg {
    fn from(value: String) -> Self {
        match value.as_str() {
            FILE_PLACEHOLDER => PlayerArg::File,
            POWERSHELL_PLACEHOLDER => PlayerArg::PowerShellSoundPlayer,
            _ => PlayerArg::Literal(value),
        }
    }
}

impl From<&str> for PlayerArg {
    fn from(value: &str) -> Self {
        PlayerArg::from(value.to_string())
    }
}

impl From<PlayerArg> for String {
    fn from(arg: PlayerArg) -> Self {
        match arg {
            PlayerArg::Literal(value) => value,
            PlayerArg::File => FILE_PLACEHOLDER.to_string(),
            PlayerArg::PowerShellSoundPlayer => POWERSHELL_PLACEHOLDER.to_string(),
        }
    }
}

/// An external program that plays an audio file to completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCommand {
    pub program: String,
    #[serde(default = "default_args")]
    pub args: Vec<PlayerArg>,
}

fn default_args() -> Vec<PlayerArg> {
    vec![PlayerArg::File]
}

impl PlayerCommand {
    pub fn new<A: Into<PlayerArg>>(program: impl Into<String>, args: impl IntoIterator<Item = A>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Player taking the file as its only argument
    pub fn simple(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: default_args(),
        }
    }

    /// Arguments for playing `file`
    pub fn build_args(&self, file: &Path) -> Vec<OsString> {
        self.args
            .iter()
            .map(|arg| match arg {
                PlayerArg::Literal(value) => OsString::from(value),
                PlayerArg::File => file.as_os_str().to_os_string(),
                PlayerArg::PowerShellSoundPlayer => OsString::from(encode_sound_player(file)),
            })
            .collect()
    }
}

/// `Media.SoundPlayer` script for `-EncodedCommand`: UTF-16LE, then base64
fn encode_sound_player(file: &Path) -> String {
    let escaped = file.display().to_string().replace('"', "\"\"");
    let script = format!("(New-Object Media.SoundPlayer \"{}\").PlaySync()", escaped);
    let utf16: Vec<u8> = script
        .encode_utf16()
        .flat_map(|unit| unit.to_le_bytes())
        .collect();
    base64::engine::general_purpose::STANDARD.encode(utf16)
}

/// Player preference lists keyed by platform
#[derive(Debug, Clone, Default)]
pub struct PlayerTable {
    players: HashMap<Platform, Vec<PlayerCommand>>,
}

impl PlayerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Players shipped with the OS or its common audio stacks
    pub fn builtin() -> Self {
        let mut table = Self::new();

        table.insert(Platform::MacOs, vec![PlayerCommand::simple("afplay")]);

        table.insert(
            Platform::Linux,
            vec![
                PlayerCommand::simple("paplay"),
                PlayerCommand::simple("aplay"),
                PlayerCommand::simple("play"),
                PlayerCommand::new(
                    "ffplay",
                    ["-nodisp", "-autoexit", "-loglevel", "error", FILE_PLACEHOLDER],
                ),
            ],
        );

        table.insert(
            Platform::Windows,
            vec![PlayerCommand::new(
                "powershell",
                ["-NoProfile", "-EncodedCommand", POWERSHELL_PLACEHOLDER],
            )],
        );

        table
    }

    /// Replace the preference list for a platform
    pub fn insert(&mut self, platform: Platform, players: Vec<PlayerCommand>) {
        self.players.insert(platform, players);
    }

    /// Preference list for a platform; empty when the platform is unsupported
    pub fn players_for(&self, platform: &Platform) -> &[PlayerCommand] {
        self.players
            .get(platform)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let table = PlayerTable::builtin();

        let mac = table.players_for(&Platform::MacOs);
        assert_eq!(mac.len(), 1);
        assert_eq!(mac[0].program, "afplay");

        let linux: Vec<_> = table
            .players_for(&Platform::Linux)
            .iter()
            .map(|p| p.program.as_str())
            .collect();
        assert_eq!(linux, vec!["paplay", "aplay", "play", "ffplay"]);

        assert!(table.players_for(&Platform::Other("haiku".into())).is_empty());
    }

    #[test]
    fn test_file_placeholder_expansion() {
        let ffplay = PlayerCommand::new(
            "ffplay",
            ["-nodisp", "-autoexit", "-loglevel", "error", FILE_PLACEHOLDER],
        );
        let args = ffplay.build_args(Path::new("/opt/pingmcp/notification.mp3"));
        assert_eq!(
            args,
            vec!["-nodisp", "-autoexit", "-loglevel", "error", "/opt/pingmcp/notification.mp3"]
        );

        let paplay = PlayerCommand::simple("paplay");
        assert_eq!(paplay.build_args(Path::new("a.wav")), vec!["a.wav"]);
    }

    #[test]
    fn test_powershell_script_encoding() {
        let encoded = encode_sound_player(Path::new(r#"C:\sounds\say "hi".wav"#));
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .unwrap();
        let units: Vec<u16> = bytes
            .chunks(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        let script = String::from_utf16(&units).unwrap();

        assert_eq!(
            script,
            r#"(New-Object Media.SoundPlayer "C:\sounds\say ""hi"".wav").PlaySync()"#
        );
    }

    #[test]
    fn test_player_command_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            players: Vec<PlayerCommand>,
        }

        let parsed: Wrapper = toml::from_str(
            r#"
            [[players]]
            program = "mpv"
            args = ["--no-video", "{file}"]

            [[players]]
            program = "paplay"
            "#,
        )
        .unwrap();

        assert_eq!(
            parsed.players[0].args,
            vec![PlayerArg::Literal("--no-video".into()), PlayerArg::File]
        );
        assert_eq!(parsed.players[1].args, vec![PlayerArg::File]);
    }
}
