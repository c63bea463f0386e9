use std::path::PathBuf;

use thiserror::Error;

use crate::{ButtonId, Menu};

/// Losing or failing to talk to the controller. This is the only error that ends the run loop.
#[derive(Debug, Error)]
pub enum HardwareError {
    #[error("MIDI context initialization failed")]
    Init(#[from] midir::InitError),
    #[error("MIDI port retrieval failed")]
    PortInfo(#[from] midir::PortInfoError),
    #[error("connecting to MIDI port {port:?} failed: {kind}")]
    Connect {
        port: String,
        kind: midir::ConnectErrorKind,
    },
    #[error("sending MIDI message failed")]
    Send(#[from] midir::SendError),
    #[error("couldn't find a port for {keyword:?}")]
    NoPortFound { keyword: String },
    #[error("the controller was disconnected")]
    Disconnected,
}

/// The note doesn't belong to any pad.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("note {note} is not a pad of the controller")]
pub struct InvalidButton {
    pub note: u8,
}

#[derive(Debug, Error)]
pub enum MixerError {
    #[error("mixer connection failed")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("scene {scene:?} does not exist")]
    NotFound { scene: String },
}

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("can't open music file {path:?}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("can't decode music file {path:?}")]
    Decode {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("audio output unavailable")]
    Output(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Why an action did not take effect. Caught and logged by the engine.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("no {kind} configured for key {key:?}")]
    UnknownKey { kind: &'static str, key: String },
    #[error(transparent)]
    Mixer(#[from] MixerError),
    #[error(transparent)]
    Player(#[from] PlayerError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can't read config file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("can't write config file {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config file {path:?} is malformed")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("can't read layout file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("layout is malformed")]
    Parse(#[from] serde_json::Error),
    #[error("{button} is bound twice in the {menu} menu")]
    DuplicateBinding { menu: Menu, button: ButtonId },
    #[error("{button} selects a menu and can't be bound in the {menu} menu")]
    ReservedButton { menu: Menu, button: ButtonId },
    #[error("the {menu} menu needs exactly one select button, found {count}")]
    MenuSelect { menu: Menu, count: usize },
    #[error("{button} selects more than one menu")]
    SharedSelectButton { button: ButtonId },
}
