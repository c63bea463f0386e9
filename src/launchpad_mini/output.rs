use midir::MidiOutputConnection;

use super::Button;
use crate::leds::{Frame, LedSink};
use crate::{ButtonId, HardwareError, OutputDevice};

/// A 2-bit color, with only red and green components
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Hash)]
pub struct Levels {
    red: u8,
    green: u8,
}

impl Levels {
    pub const OFF: Levels = Levels { red: 0, green: 0 };

    /// Both values must be less than 4 (they are 2-bit values)
    pub fn new(red: u8, green: u8) -> Levels {
        assert!(red < 4);
        assert!(green < 4);

        Levels { red, green }
    }
}

impl From<crate::Color> for Levels {
    fn from(color: crate::Color) -> Self {
        let (red, green) = color.red_green();
        Levels::new(red, green)
    }
}

#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone)]
#[repr(u8)]
pub enum Buffer {
    A = 0,
    B = 1,
}

impl Buffer {
    fn other(self) -> Buffer {
        match self {
            Buffer::A => Buffer::B,
            Buffer::B => Buffer::A,
        }
    }
}

/// This enum specifies how a light state change should affect the other buffer, if at all
#[derive(Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum DoubleBufferingBehavior {
    /// Only write to the currently edited buffer
    None,
    /// Clear the other buffer's copy of this LED
    Clear,
    /// Write this LED data to both buffers
    Copy,
}

/// Specifies a double buffering mode change
#[derive(Debug, Eq, PartialEq, Hash, Clone)]
pub struct DoubleBuffering {
    // If true, copy the contents from the new "displayed" buffer to the new "edited" buffer
    pub copy: bool,
    // If true, continually flip "displayed" buffers to make a flashing effect
    pub flash: bool,
    // The buffer that is being edited
    pub edited_buffer: Buffer,
    // The buffer that is being displayed
    pub displayed_buffer: Buffer,
}

pub(crate) fn make_color_code(levels: Levels, dbb: DoubleBufferingBehavior) -> u8 {
    // Bit 6 - Must be 0
    // Bit 5..4 - Green LED brightness
    // Bit 3 - Clear - If 1: clear the other buffer’s copy of this LED.
    // Bit 2 - Copy - If 1: write this LED data to both buffers.
    // Bit 1..0 - Red LED brightness
    let double_buffering_code = match dbb {
        DoubleBufferingBehavior::None => 0b00,
        DoubleBufferingBehavior::Copy => 0b01,
        DoubleBufferingBehavior::Clear => 0b10,
    };
    (levels.green << 4) | (double_buffering_code << 2) | levels.red
}

/// The Launchpad Mini output connection handler.
pub struct Output {
    connection: MidiOutputConnection,
    displayed: Buffer,
}

impl crate::OutputDevice for Output {
    const MIDI_CONNECTION_NAME: &'static str = "Eurovision Control Mini output";

    fn from_connection(connection: MidiOutputConnection) -> Result<Self, HardwareError> {
        let mut self_ = Self {
            connection,
            displayed: Buffer::A,
        };
        self_.reset()?;
        Ok(self_)
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), HardwareError> {
        self.connection.send(bytes)?;
        Ok(())
    }
}

impl Output {
    /// Set a `button` to a certain color.
    pub fn set_button(
        &mut self,
        button: Button,
        levels: Levels,
        d: DoubleBufferingBehavior,
    ) -> Result<(), HardwareError> {
        let light_code = make_color_code(levels, d);

        match button {
            Button::GridButton { x, y } => {
                let button_code = y * 16 + x;
                self.send(&[0x90, button_code, light_code])?;
            }
            Button::ControlButton { index } => {
                let button_code = 104 + index;
                self.send(&[0xB0, button_code, light_code])?;
            }
        }

        Ok(())
    }

    /// Lights two LEDs in a single message. The Launchpad fills the 8x8 grid left-to-right,
    /// top-to-bottom, then the eight scene launch buttons top-to-bottom, then the eight top-row
    /// buttons left-to-right. Any other message leaves the mode and resets the cursor.
    pub fn set_button_rapid(
        &mut self,
        levels1: Levels,
        dbb1: DoubleBufferingBehavior,
        levels2: Levels,
        dbb2: DoubleBufferingBehavior,
    ) -> Result<(), HardwareError> {
        self.send(&[
            0x92,
            make_color_code(levels1, dbb1),
            make_color_code(levels2, dbb2),
        ])
    }

    /// Selects which buffer incoming LED data goes to and which one is shown. Also resets the
    /// flash timer.
    pub fn control_double_buffering(&mut self, d: DoubleBuffering) -> Result<(), HardwareError> {
        let last_byte = 0b00100000
            | ((d.copy as u8) << 4)
            | ((d.flash as u8) << 3)
            | ((d.edited_buffer as u8) << 2)
            | d.displayed_buffer as u8;

        self.send(&[0xB0, 0, last_byte])?;
        self.displayed = d.displayed_buffer;
        Ok(())
    }

    /// All LEDs are turned off, and the mapping mode, buffer settings, and duty cycle are reset to
    /// their default values.
    pub fn reset(&mut self) -> Result<(), HardwareError> {
        self.send(&[0xB0, 0, 0])?;
        self.displayed = Buffer::A;
        Ok(())
    }

    pub fn light(&mut self, button: Button, levels: Levels) -> Result<(), HardwareError> {
        self.set_button(button, levels, DoubleBufferingBehavior::Copy)
    }
}

impl LedSink for Output {
    fn set(&mut self, button: ButtonId, color: crate::Color) -> Result<(), HardwareError> {
        self.light(button.into(), color.into())
    }

    /// Writes the frame into the hidden buffer using rapid update, then flips buffers so the
    /// whole board changes at once.
    fn show_frame(&mut self, frame: &Frame) -> Result<(), HardwareError> {
        let hidden = self.displayed.other();
        self.control_double_buffering(DoubleBuffering {
            copy: false,
            flash: false,
            edited_buffer: hidden,
            displayed_buffer: self.displayed,
        })?;

        let dbb = DoubleBufferingBehavior::None;
        let levels = |x: u8, y: u8| Levels::from(frame.get(ButtonId::grid(x, y)));

        // Set the main body
        for y in 0..8 {
            for x in (0..8).step_by(2) {
                self.set_button_rapid(levels(x, y), dbb, levels(x + 1, y), dbb)?;
            }
        }

        // Set the scene launch buttons (x = 8)
        for y in (0..8).step_by(2) {
            self.set_button_rapid(levels(8, y), dbb, levels(8, y + 1), dbb)?;
        }

        // The top row is dark apart from the emergency stop
        let top = |index: u8| {
            let button = Button::ControlButton { index };
            if button == Button::EMERGENCY_STOP {
                Levels::from(crate::Color::RedFull)
            } else {
                Levels::OFF
            }
        };
        for index in (0..8).step_by(2) {
            self.set_button_rapid(top(index), dbb, top(index + 1), dbb)?;
        }

        // showing the edited buffer also ends rapid update mode
        self.control_double_buffering(DoubleBuffering {
            copy: false,
            flash: false,
            edited_buffer: hidden,
            displayed_buffer: hidden,
        })
    }

    fn clear(&mut self) -> Result<(), HardwareError> {
        self.reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    #[test]
    fn color_codes() {
        let code = |c: Color| make_color_code(c.into(), DoubleBufferingBehavior::None);
        assert_eq!(code(Color::RedFull), 3);
        assert_eq!(code(Color::GreenFull), 48);
        assert_eq!(code(Color::AmberFull), 51);
        assert_eq!(code(Color::Yellow), 50);
        assert_eq!(code(Color::Orange), 35);

        assert_eq!(
            make_color_code(Color::RedFull.into(), DoubleBufferingBehavior::Copy),
            3 | 0b100
        );
        assert_eq!(
            make_color_code(Color::Off.into(), DoubleBufferingBehavior::Clear),
            0b1000
        );
    }

    #[test]
    fn every_color_is_a_valid_velocity() {
        for color in Color::ALL {
            for dbb in [
                DoubleBufferingBehavior::None,
                DoubleBufferingBehavior::Copy,
                DoubleBufferingBehavior::Clear,
            ] {
                let code = make_color_code(color.into(), dbb);
                assert!(code < 64, "{:?} {:?} -> {}", color, dbb, code);
            }
        }
    }
}
