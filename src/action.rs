use serde::{Deserialize, Serialize};

/// How far one press of volume up/down moves the volume, in percent.
pub const VOLUME_STEP: i8 = 10;

/// What a bound button does. Actions are plain data; the engine carries them out.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Switch the mixer to the scene configured under this key.
    Scene(String),
    /// Play the music file configured under `track`. `slot` identifies the button's track for
    /// the playing indicator and progress display. An exclusive play stops whatever is playing
    /// first.
    Play {
        track: String,
        slot: u8,
        #[serde(default = "exclusive_by_default")]
        exclusive: bool,
    },
    Stop,
    VolumeUp,
    VolumeDown,
    MuteToggle,
    Effect(Effect),
    Utility(Utility),
}

fn exclusive_by_default() -> bool {
    true
}

/// The system an action talks to.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum Target {
    Mixer,
    Player,
    None,
}

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Three red flashes over the grid
    Flash,
    /// Random colors for two seconds
    Celebration,
    /// Amber pulsing for twenty seconds
    Voting,
    /// Backup scene and music off
    TechnicalBreak,
}

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Utility {
    /// Put the active menu's colors back on the board
    Reset,
    /// Sweep every pad through all colors
    SelfTest,
    /// Backup scene, music off, board redrawn
    EmergencyStop,
    /// Log a summary of the current state
    Status,
}

impl Action {
    pub fn scene(key: &str) -> Self {
        Action::Scene(key.to_owned())
    }

    pub fn play(track: &str, slot: u8) -> Self {
        Action::Play {
            track: track.to_owned(),
            slot,
            exclusive: true,
        }
    }

    pub fn target(&self) -> Target {
        match self {
            Action::Scene(_) => Target::Mixer,
            Action::Play { .. }
            | Action::Stop
            | Action::VolumeUp
            | Action::VolumeDown
            | Action::MuteToggle => Target::Player,
            Action::Effect(_) | Action::Utility(_) => Target::None,
        }
    }

    /// True if pressing the button again has no further effect.
    pub fn is_idempotent(&self) -> bool {
        match self {
            Action::Scene(_) | Action::Stop => true,
            Action::Play { .. } | Action::VolumeUp | Action::VolumeDown | Action::MuteToggle => {
                false
            }
            Action::Effect(effect) => *effect == Effect::TechnicalBreak,
            Action::Utility(utility) => *utility != Utility::SelfTest,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Scene(key) => write!(f, "scene {}", key),
            Action::Play { track, slot, .. } => write!(f, "play {} (slot {})", track, slot),
            Action::Stop => f.write_str("stop music"),
            Action::VolumeUp => f.write_str("volume up"),
            Action::VolumeDown => f.write_str("volume down"),
            Action::MuteToggle => f.write_str("mute toggle"),
            Action::Effect(effect) => write!(f, "effect {:?}", effect),
            Action::Utility(utility) => write!(f, "utility {:?}", utility),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_form() {
        let action: Action = serde_json::from_str(r#"{"scene": "stage1"}"#).unwrap();
        assert_eq!(action, Action::scene("stage1"));

        let action: Action =
            serde_json::from_str(r#"{"play": {"track": "intro", "slot": 0}}"#).unwrap();
        assert_eq!(action, Action::play("intro", 0));

        let action: Action = serde_json::from_str(
            r#"{"play": {"track": "jingle", "slot": 9, "exclusive": false}}"#,
        )
        .unwrap();
        assert!(matches!(action, Action::Play { exclusive: false, .. }));

        let action: Action = serde_json::from_str(r#""volume_up""#).unwrap();
        assert_eq!(action, Action::VolumeUp);

        let action: Action = serde_json::from_str(r#"{"utility": "emergency_stop"}"#).unwrap();
        assert_eq!(action, Action::Utility(Utility::EmergencyStop));
    }

    #[test]
    fn targets() {
        assert_eq!(Action::scene("break").target(), Target::Mixer);
        assert_eq!(Action::play("intro", 0).target(), Target::Player);
        assert_eq!(Action::MuteToggle.target(), Target::Player);
        assert_eq!(Action::Effect(Effect::Flash).target(), Target::None);
        assert_eq!(Action::Utility(Utility::Status).target(), Target::None);
    }

    #[test]
    fn idempotency() {
        assert!(Action::scene("break").is_idempotent());
        assert!(Action::Stop.is_idempotent());
        assert!(!Action::VolumeUp.is_idempotent());
        assert!(!Action::play("intro", 0).is_idempotent());
        assert!(Action::Utility(Utility::EmergencyStop).is_idempotent());
    }
}
