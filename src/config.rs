//! Show configuration.
//!
//! The configuration file maps the short keys used by the layout to OBS scene names and music
//! files, and holds the OBS connection and controller settings. A missing file is created with
//! the defaults; sections missing from an existing file are filled in from the defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{ActionError, ConfigError, Menu};

pub const DEFAULT_CONFIG_PATH: &str = "eurovision_config.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub obs: ObsSettings,
    /// Music key to audio file
    pub music_files: BTreeMap<String, PathBuf>,
    /// Scene key to OBS scene name
    pub scenes: BTreeMap<String, String>,
    pub controller: ControllerSettings,
    pub feedback: FeedbackSettings,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ObsSettings {
    pub host: String,
    pub port: u16,
    /// Empty if OBS has authentication turned off
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ControllerSettings {
    /// Part of the MIDI port name of the controller
    pub device_keyword: String,
    /// Menu shown at startup
    pub default_menu: Menu,
    /// Scene key used by the technical break and the emergency stop
    pub backup_scene: String,
    /// Interval of the LED feedback and playback polling
    pub tick_ms: u64,
}

/// Optional LED feedback while the show runs.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FeedbackSettings {
    /// Flash a pressed pad red for half a second
    pub flash_on_press: bool,
    /// Blink the pad of the playing track
    pub blink_playing: bool,
    /// Show playback progress on the progress pads
    pub progress_bar: bool,
}

impl Default for ObsSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 4455,
            password: "your_password_here".to_string(),
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            device_keyword: "Launchpad Mini".to_string(),
            default_menu: Menu::Scenes,
            backup_scene: "backup".to_string(),
            tick_ms: 50,
        }
    }
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Self {
            flash_on_press: true,
            blink_playing: true,
            progress_bar: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let music_files = [
            ("intro", "music/eurovision_intro.mp3"),
            ("interval", "music/interval_act.mp3"),
            ("tension", "music/tension_music.mp3"),
            ("winner", "music/winner_fanfare.mp3"),
            ("hosts", "music/hosts.mp3"),
            ("credits", "music/credits.mp3"),
            ("greenroom", "music/greenroom.mp3"),
            ("breakintro", "music/break_intro.mp3"),
        ];
        let scenes = [
            ("intro", "Eurovision Intro"),
            ("video", "Eurovision Video"),
            ("stage1", "Main Stage CAM1"),
            ("stage2", "Main Stage CAM2"),
            ("stage3", "Main Stage CAM3"),
            ("stage4", "Main Stage CAM4"),
            ("stage5", "Main Stage CAM5"),
            ("stage6", "Main Stage CAM6"),
            ("stage7", "Main Stage CAM7"),
            ("stage8", "Main Stage CAM8"),
            ("greenroom1", "Green Room CAM1"),
            ("greenroom2", "Green Room CAM2"),
            ("greenroom3", "Green Room CAM3"),
            ("greenroom4", "Green Room CAM4"),
            ("break", "Commercial Break"),
            ("scoreboard", "Scoreboard"),
            ("winner", "Winner Announcement"),
            ("credits", "End Credits"),
            ("backup", "Technical Difficulties"),
        ];

        Self {
            obs: ObsSettings::default(),
            music_files: music_files
                .iter()
                .map(|&(key, path)| (key.to_string(), PathBuf::from(path)))
                .collect(),
            scenes: scenes
                .iter()
                .map(|&(key, name)| (key.to_string(), name.to_string()))
                .collect(),
            controller: ControllerSettings::default(),
            feedback: FeedbackSettings::default(),
        }
    }
}

impl Config {
    /// Reads the configuration at `path`. If there is no file yet, the defaults are written there
    /// and returned.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            log::info!("Created default config file: {}", path.display());
            return Ok(config);
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_error = |source| ConfigError::Write {
            path: path.to_owned(),
            source,
        };

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| write_error(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
        fs::write(path, json).map_err(write_error)
    }

    /// The OBS scene name for a scene key.
    pub fn scene(&self, key: &str) -> Result<&str, ActionError> {
        self.scenes
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ActionError::UnknownKey {
                kind: "scene",
                key: key.to_owned(),
            })
    }

    /// The audio file for a music key.
    pub fn track(&self, key: &str) -> Result<&Path, ActionError> {
        self.music_files
            .get(key)
            .map(PathBuf::as_path)
            .ok_or_else(|| ActionError::UnknownKey {
                kind: "music file",
                key: key.to_owned(),
            })
    }

    /// Music keys whose file doesn't exist.
    pub fn missing_music_files(&self) -> Vec<(&str, &Path)> {
        self.music_files
            .iter()
            .filter(|(_, path)| !path.exists())
            .map(|(key, path)| (key.as_str(), path.as_path()))
            .collect()
    }

    /// The OBS password, or `None` if authentication is off.
    pub fn obs_password(&self) -> Option<&str> {
        Some(self.obs.password.as_str()).filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_the_show_keys() {
        let config = Config::default();

        assert_eq!(config.scene("stage1").unwrap(), "Main Stage CAM1");
        assert_eq!(config.scene("backup").unwrap(), "Technical Difficulties");
        assert_eq!(
            config.track("intro").unwrap(),
            Path::new("music/eurovision_intro.mp3")
        );
        assert_eq!(config.scenes.len(), 19);
        assert_eq!(config.music_files.len(), 8);
    }

    #[test]
    fn unknown_keys_are_resolution_errors() {
        let config = Config::default();

        assert!(matches!(
            config.scene("stage9"),
            Err(ActionError::UnknownKey { kind: "scene", .. })
        ));
        assert!(matches!(
            config.track("nope"),
            Err(ActionError::UnknownKey { kind: "music file", .. })
        ));
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("show.json");

        let config = Config::load_or_create(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let reloaded = Config::load_or_create(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn missing_sections_come_from_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("show.json");
        fs::write(
            &path,
            r#"{ "obs": { "host": "10.0.0.5", "port": 4444, "password": "" },
                 "scenes": { "stage1": "Stage Wide" } }"#,
        )
        .unwrap();

        let config = Config::load_or_create(&path).unwrap();
        assert_eq!(config.obs.host, "10.0.0.5");
        assert_eq!(config.obs_password(), None);
        assert_eq!(config.scene("stage1").unwrap(), "Stage Wide");
        assert!(config.scene("stage2").is_err());
        assert_eq!(config.music_files, Config::default().music_files);
        assert_eq!(config.controller, ControllerSettings::default());
        assert!(config.feedback.blink_playing);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("show.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            Config::load_or_create(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
