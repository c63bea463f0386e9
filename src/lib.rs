/*!
Live-show control surface for the Novation Launchpad Mini.

Pads on the controller switch OBS Studio scenes, play the show's music and run LED effects. The
pads are organized into four menus (scenes, music, effects, utility); four round buttons in the
scene launch column select the menu, and every other pad does whatever the active menu binds to
it.

# Architecture

Everything the engine reacts to arrives as an [`Event`] on a single channel: presses and
releases from the controller's MIDI input, its emergency stop button, ticks from a timer thread,
the device watch noticing the controller is gone and Ctrl-C. The [`Engine`] handles them one at a time.

```no_run
use std::sync::mpsc;
use eurovision_control::{Config, Engine, Event, Layout};
use eurovision_control::mock::{MockLeds, MockMixer, MockPlayer};

let (sender, receiver) = mpsc::channel();
let mut engine = Engine::new(
    Layout::builtin()?,
    Config::default(),
    Box::new(MockMixer::default()),
    Box::new(MockPlayer::default()),
    Box::new(MockLeds::default()),
);

sender.send(Event::Shutdown)?;
engine.run(&receiver)?;
# Ok::<(), Box<dyn std::error::Error>>(())
```

What a pad does and which color it shows is data: the [`Layout`] tables, read from JSON once at
startup. Actions name scenes and music by short keys, which the [`Config`] resolves to OBS scene
names and file paths.

# Low-level access

The [`launchpad_mini`] module talks to the controller directly: decoding its input messages and
setting LEDs, including rapid updates and double buffering.
*/

pub mod util;

mod midi_io;
pub use midi_io::*;

mod errors;
pub use errors::*;

mod button;
pub use button::ButtonId;

mod color;
pub use color::Color;

mod menu;
pub use menu::Menu;

pub mod action;
pub use action::Action;

pub mod layout;
pub use layout::Layout;

pub mod config;
pub use config::Config;

pub mod leds;
pub mod animation;

mod event;
pub use event::*;

pub mod mixer;
pub mod player;

pub mod engine;
pub use engine::Engine;

pub mod launchpad_mini;
pub use launchpad_mini as mini;

pub mod mock;

/// Identifier used for e.g. the midi port names etc.
const APPLICATION_NAME: &str = "Eurovision Control";
