//! The media player: local playback of the show's music files.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use crate::PlayerError;

pub const MAX_VOLUME: u8 = 100;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum VolumeChange {
    /// Percentage points up or down
    Relative(i8),
    /// Percent
    Absolute(u8),
}

impl VolumeChange {
    /// The volume after applying this change to `current`, clamped to 0..=100.
    pub fn apply(self, current: u8) -> u8 {
        let volume = match self {
            VolumeChange::Relative(delta) => current as i16 + delta as i16,
            VolumeChange::Absolute(volume) => volume as i16,
        };
        volume.clamp(0, MAX_VOLUME as i16) as u8
    }
}

/// Plays the show's music. Every track is started on a slot, which lets callers ask for the
/// position of the track they started.
pub trait Player {
    /// Starts `path` on `slot`. A track already playing on another slot keeps playing; callers
    /// that want it silenced stop first.
    fn play(&mut self, path: &Path, slot: u8) -> Result<(), PlayerError>;

    /// Stops every track.
    fn stop(&mut self) -> Result<(), PlayerError>;

    /// Returns the new volume.
    fn set_volume(&mut self, change: VolumeChange) -> Result<u8, PlayerError>;

    /// Returns true if the player is muted now.
    fn mute_toggle(&mut self) -> Result<bool, PlayerError>;

    /// Elapsed time of the track on `slot`, or `None` if that slot isn't playing.
    fn get_position(&self, slot: u8) -> Option<Duration>;

    /// Total length of the track on `slot`, if it's playing and the length is known.
    fn duration(&self, slot: u8) -> Option<Duration>;
}

struct Track {
    slot: u8,
    path: PathBuf,
    sink: Sink,
    duration: Option<Duration>,
}

/// Plays through the default audio output device with rodio.
pub struct RodioPlayer {
    // dropping the stream silences every sink
    _stream: OutputStream,
    handle: OutputStreamHandle,
    tracks: Vec<Track>,
    volume: u8,
    muted: bool,
}

impl RodioPlayer {
    pub fn new() -> Result<Self, PlayerError> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| PlayerError::Output(Box::new(e)))?;

        Ok(Self {
            _stream: stream,
            handle,
            tracks: Vec::new(),
            volume: 70,
            muted: false,
        })
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume as f32 / MAX_VOLUME as f32
        }
    }

    fn apply_volume(&self) {
        for track in &self.tracks {
            track.sink.set_volume(self.effective_volume());
        }
    }

    fn playing_track(&self, slot: u8) -> Option<&Track> {
        self.tracks
            .iter()
            .find(|track| track.slot == slot && !track.sink.empty())
    }
}

impl Player for RodioPlayer {
    fn play(&mut self, path: &Path, slot: u8) -> Result<(), PlayerError> {
        let file = File::open(path).map_err(|source| PlayerError::File {
            path: path.to_owned(),
            source,
        })?;
        let source = Decoder::new(BufReader::new(file)).map_err(|e| PlayerError::Decode {
            path: path.to_owned(),
            source: Box::new(e),
        })?;
        let duration = source.total_duration();

        let sink = Sink::try_new(&self.handle).map_err(|e| PlayerError::Output(Box::new(e)))?;
        sink.set_volume(self.effective_volume());
        sink.append(source);

        // a slot plays one track; dropping a sink stops it
        self.tracks.retain(|track| {
            let keep = track.slot != slot && !track.sink.empty();
            if !keep {
                log::debug!("Dropped {} from slot {}", track.path.display(), track.slot);
            }
            keep
        });
        self.tracks.push(Track {
            slot,
            path: path.to_owned(),
            sink,
            duration,
        });
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PlayerError> {
        for track in self.tracks.drain(..) {
            track.sink.stop();
        }
        Ok(())
    }

    fn set_volume(&mut self, change: VolumeChange) -> Result<u8, PlayerError> {
        self.volume = change.apply(self.volume);
        self.apply_volume();
        Ok(self.volume)
    }

    fn mute_toggle(&mut self) -> Result<bool, PlayerError> {
        self.muted = !self.muted;
        self.apply_volume();
        Ok(self.muted)
    }

    fn get_position(&self, slot: u8) -> Option<Duration> {
        self.playing_track(slot).map(|track| track.sink.get_pos())
    }

    fn duration(&self, slot: u8) -> Option<Duration> {
        self.playing_track(slot)?.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_changes_clamp() {
        assert_eq!(VolumeChange::Relative(10).apply(70), 80);
        assert_eq!(VolumeChange::Relative(-10).apply(70), 60);
        assert_eq!(VolumeChange::Relative(10).apply(95), 100);
        assert_eq!(VolumeChange::Relative(-10).apply(5), 0);
        assert_eq!(VolumeChange::Absolute(150).apply(20), 100);
        assert_eq!(VolumeChange::Absolute(35).apply(90), 35);
    }
}
