//! In-memory stand-ins for the controller, the mixer and the player.
//!
//! Every mock is a cheap handle: clone it, hand one clone to the engine and keep the other to
//! look at what happened. The mixer mock also backs `--offline` mode.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use crate::leds::{Frame, LedSink};
use crate::mixer::Mixer;
use crate::player::{Player, VolumeChange};
use crate::{ButtonId, Color, HardwareError, MixerError, PlayerError};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MixerFailure {
    Connection,
    NotFound,
}

#[derive(Debug, Default)]
struct MixerState {
    scenes: Vec<String>,
    failure: Option<MixerFailure>,
    disconnected: bool,
}

/// Records scene switches instead of sending them anywhere.
#[derive(Debug, Clone, Default)]
pub struct MockMixer(Rc<RefCell<MixerState>>);

impl MockMixer {
    /// Every scene switched to, oldest first.
    pub fn scenes(&self) -> Vec<String> {
        self.0.borrow().scenes.clone()
    }

    /// Makes every following scene switch fail, or succeed again with `None`.
    pub fn fail_with(&self, failure: Option<MixerFailure>) {
        self.0.borrow_mut().failure = failure;
    }

    pub fn is_disconnected(&self) -> bool {
        self.0.borrow().disconnected
    }
}

impl Mixer for MockMixer {
    fn set_active_scene(&mut self, scene: &str) -> Result<(), MixerError> {
        let mut state = self.0.borrow_mut();
        match state.failure {
            Some(MixerFailure::Connection) => {
                Err(MixerError::Connection("mock mixer is unreachable".into()))
            }
            Some(MixerFailure::NotFound) => Err(MixerError::NotFound {
                scene: scene.to_owned(),
            }),
            None => {
                log::info!("[offline] Program scene is now {:?}", scene);
                state.scenes.push(scene.to_owned());
                Ok(())
            }
        }
    }

    fn disconnect(&mut self) {
        self.0.borrow_mut().disconnected = true;
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum PlayerCall {
    Play { path: PathBuf, slot: u8 },
    Stop,
    SetVolume(VolumeChange),
    MuteToggle,
}

#[derive(Debug)]
struct PlayerState {
    calls: Vec<PlayerCall>,
    /// Slot and elapsed time of every track still playing
    playing: Vec<(u8, Duration)>,
    track_duration: Option<Duration>,
    missing_files: bool,
    volume: u8,
    muted: bool,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            playing: Vec::new(),
            track_duration: Some(Duration::from_secs(60)),
            missing_files: false,
            volume: 70,
            muted: false,
        }
    }
}

/// Records player calls and keeps a fake play position that only moves when told to.
#[derive(Debug, Clone, Default)]
pub struct MockPlayer(Rc<RefCell<PlayerState>>);

impl MockPlayer {
    pub fn calls(&self) -> Vec<PlayerCall> {
        self.0.borrow().calls.clone()
    }

    pub fn take_calls(&self) -> Vec<PlayerCall> {
        std::mem::take(&mut self.0.borrow_mut().calls)
    }

    /// Moves every playing track forward.
    pub fn advance(&self, elapsed: Duration) {
        for (_, position) in &mut self.0.borrow_mut().playing {
            *position += elapsed;
        }
    }

    /// Lets every track run out.
    pub fn finish(&self) {
        self.0.borrow_mut().playing.clear();
    }

    /// Lets the track on `slot` run out.
    pub fn finish_slot(&self, slot: u8) {
        self.0.borrow_mut().playing.retain(|&(playing, _)| playing != slot);
    }

    /// Slots with a track playing, in the order they started.
    pub fn playing_slots(&self) -> Vec<u8> {
        self.0.borrow().playing.iter().map(|&(slot, _)| slot).collect()
    }

    /// Length reported for tracks started from now on.
    pub fn set_track_duration(&self, duration: Option<Duration>) {
        self.0.borrow_mut().track_duration = duration;
    }

    /// Makes every following play fail as if the file didn't exist.
    pub fn set_files_missing(&self, missing: bool) {
        self.0.borrow_mut().missing_files = missing;
    }

    pub fn volume(&self) -> u8 {
        self.0.borrow().volume
    }

    pub fn is_muted(&self) -> bool {
        self.0.borrow().muted
    }
}

impl Player for MockPlayer {
    fn play(&mut self, path: &Path, slot: u8) -> Result<(), PlayerError> {
        let mut state = self.0.borrow_mut();
        state.calls.push(PlayerCall::Play {
            path: path.to_owned(),
            slot,
        });

        if state.missing_files {
            return Err(PlayerError::File {
                path: path.to_owned(),
                source: std::io::ErrorKind::NotFound.into(),
            });
        }
        state.playing.retain(|&(playing, _)| playing != slot);
        state.playing.push((slot, Duration::ZERO));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PlayerError> {
        let mut state = self.0.borrow_mut();
        state.calls.push(PlayerCall::Stop);
        state.playing.clear();
        Ok(())
    }

    fn set_volume(&mut self, change: VolumeChange) -> Result<u8, PlayerError> {
        let mut state = self.0.borrow_mut();
        state.calls.push(PlayerCall::SetVolume(change));
        state.volume = change.apply(state.volume);
        Ok(state.volume)
    }

    fn mute_toggle(&mut self) -> Result<bool, PlayerError> {
        let mut state = self.0.borrow_mut();
        state.calls.push(PlayerCall::MuteToggle);
        state.muted = !state.muted;
        Ok(state.muted)
    }

    fn get_position(&self, slot: u8) -> Option<Duration> {
        let state = self.0.borrow();
        state
            .playing
            .iter()
            .find(|&&(playing, _)| playing == slot)
            .map(|&(_, position)| position)
    }

    fn duration(&self, slot: u8) -> Option<Duration> {
        self.get_position(slot)?;
        self.0.borrow().track_duration
    }
}

#[derive(Debug)]
struct LedState {
    board: Frame,
    commands: Vec<(ButtonId, Color)>,
    unplugged: bool,
}

/// A fake board that remembers every LED command.
#[derive(Debug, Clone)]
pub struct MockLeds(Rc<RefCell<LedState>>);

impl Default for MockLeds {
    fn default() -> Self {
        Self(Rc::new(RefCell::new(LedState {
            board: Frame::off(),
            commands: Vec::new(),
            unplugged: false,
        })))
    }
}

impl MockLeds {
    /// Returns the commands received since the last call.
    pub fn take_commands(&self) -> Vec<(ButtonId, Color)> {
        std::mem::take(&mut self.0.borrow_mut().commands)
    }

    /// The color the pad shows now.
    pub fn color(&self, button: ButtonId) -> Color {
        self.0.borrow().board.get(button)
    }

    pub fn board(&self) -> Frame {
        self.0.borrow().board.clone()
    }

    /// Makes every following command fail as if the controller was unplugged.
    pub fn unplug(&self) {
        self.0.borrow_mut().unplugged = true;
    }
}

impl LedSink for MockLeds {
    fn set(&mut self, button: ButtonId, color: Color) -> Result<(), HardwareError> {
        let mut state = self.0.borrow_mut();
        if state.unplugged {
            return Err(HardwareError::Disconnected);
        }
        state.commands.push((button, color));
        state.board.set(button, color);
        Ok(())
    }
}
