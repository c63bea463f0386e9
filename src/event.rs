use std::sync::mpsc::Sender;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::ButtonId;

/// Everything the engine reacts to. Producers on other threads push events into one channel and
/// the engine handles them one at a time, in the order they arrived.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Event {
    Press(ButtonId),
    Release(ButtonId),
    /// Time to advance animations and refresh the playback feedback
    Tick,
    /// The panic button: stop the music and cut to the backup scene, whatever menu is active
    EmergencyStop,
    /// The controller went away
    Disconnected,
    /// The operator asked to quit
    Shutdown,
}

/// Sends [`Event::Tick`] every `interval` until the receiving side is gone.
pub fn spawn_ticker(interval: Duration, events: Sender<Event>) -> JoinHandle<()> {
    std::thread::spawn(move || loop {
        std::thread::sleep(interval);
        if events.send(Event::Tick).is_err() {
            return;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_stops_with_the_receiver() {
        let (sender, receiver) = std::sync::mpsc::channel();
        let ticker = spawn_ticker(Duration::from_millis(1), sender);

        assert_eq!(receiver.recv().unwrap(), Event::Tick);
        drop(receiver);
        ticker.join().unwrap();
    }
}
