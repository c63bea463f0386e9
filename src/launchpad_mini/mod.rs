/*!
# Launchpad Mini low-level API

The Launchpad Mini reports its 8x8 grid and the round scene launch column as note messages
(`note = 16 * row + column`) and the round top row as control changes 104-111. LEDs are set with
the same messages, the velocity carrying the red and green brightness.
*/

mod input;
pub use input::*;

mod output;
pub use output::*;

use crate::ButtonId;

/// A physical button as the Launchpad Mini protocol addresses it.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum Button {
    /// One of the eight round buttons along the top
    ControlButton { index: u8 },
    /// A pad of the 8x8 grid (x 0-7) or a scene launch button (x = 8)
    GridButton { x: u8, y: u8 },
}

impl Button {
    /// The rightmost round button along the top. It isn't part of any menu, so it stops the
    /// show from everywhere.
    pub const EMERGENCY_STOP: Button = Button::ControlButton { index: 7 };

    /// The pad this button is in the controller's address space. Top-row buttons aren't part
    /// of it.
    pub fn pad(&self) -> Option<ButtonId> {
        match *self {
            Button::GridButton { x, y } if x < ButtonId::COLUMNS && y < ButtonId::ROWS => {
                Some(ButtonId::grid(x, y))
            }
            _ => None,
        }
    }
}

impl From<ButtonId> for Button {
    fn from(button: ButtonId) -> Self {
        Button::GridButton {
            x: button.x(),
            y: button.y(),
        }
    }
}
