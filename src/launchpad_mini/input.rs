use super::Button;
use crate::Event;

/// A Launchpad Mini input message
#[derive(Debug, Eq, PartialEq, Hash, Clone)]
pub enum Message {
    /// A button was pressed
    Press { button: Button },
    /// A button was released
    Release { button: Button },
    /// Emitted after a text scroll ends or loops
    TextEndedOrLooped,
    /// Anything the Launchpad Mini isn't documented to send
    Other(Vec<u8>),
}

impl Message {
    /// The engine event this message stands for, if any. Releases of the emergency stop and the
    /// other top-row buttons mean nothing to the engine.
    pub fn to_event(&self) -> Option<Event> {
        match self {
            Message::Press { button } if *button == Button::EMERGENCY_STOP => {
                Some(Event::EmergencyStop)
            }
            Message::Press { button } => button.pad().map(Event::Press),
            Message::Release { button } => button.pad().map(Event::Release),
            Message::TextEndedOrLooped => None,
            Message::Other(bytes) => {
                log::warn!("Unexpected message from the controller: {:02X?}", bytes);
                None
            }
        }
    }
}

fn decode_grid_button(btn: u8) -> Button {
    Button::GridButton {
        x: btn % 16,
        y: btn / 16,
    }
}

/// The Launchpad Mini input connection creator.
pub struct Input;

impl crate::InputDevice for Input {
    const MIDI_CONNECTION_NAME: &'static str = "Eurovision Control Mini Input";
    type Message = Message;

    fn decode_message(_timestamp: u64, data: &[u8]) -> Message {
        // first byte of a launchpad midi message is the message type
        match *data {
            // Note on. The Launchpad sends zero-velocity note-ons instead of note-offs, but a
            // real note-off is treated the same in case a driver rewrites them.
            [0x90, button, velocity] => {
                let button = decode_grid_button(button);

                if velocity == 0 {
                    Message::Release { button }
                } else {
                    Message::Press { button }
                }
            }
            [0x80, button, _] => Message::Release {
                button: decode_grid_button(button),
            },
            // Controller change
            [0xB0, number @ 104..=111, velocity] => {
                let button = Button::ControlButton {
                    index: number - 104,
                };

                if velocity == 0 {
                    Message::Release { button }
                } else {
                    Message::Press { button }
                }
            }
            [0xB0, 0, 3] => Message::TextEndedOrLooped,
            _ => Message::Other(data.to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InputDevice;

    fn decode(data: &[u8]) -> Message {
        Input::decode_message(0, data)
    }

    #[test]
    fn grid_press_and_release() {
        assert_eq!(
            decode(&[0x90, 16, 127]),
            Message::Press {
                button: Button::GridButton { x: 0, y: 1 }
            }
        );
        assert_eq!(
            decode(&[0x90, 56, 0]),
            Message::Release {
                button: Button::GridButton { x: 8, y: 3 }
            }
        );
        assert_eq!(
            decode(&[0x80, 56, 64]),
            Message::Release {
                button: Button::GridButton { x: 8, y: 3 }
            }
        );
    }

    #[test]
    fn top_row_is_control_change() {
        assert_eq!(
            decode(&[0xB0, 105, 127]),
            Message::Press {
                button: Button::ControlButton { index: 1 }
            }
        );
        assert_eq!(
            Button::ControlButton { index: 1 }.pad(),
            None
        );
    }

    #[test]
    fn messages_become_events() {
        use crate::ButtonId;

        assert_eq!(
            decode(&[0x90, 0x23, 127]).to_event(),
            Some(Event::Press(ButtonId::new(0x23).unwrap()))
        );
        assert_eq!(
            decode(&[0x90, 0x08, 0]).to_event(),
            Some(Event::Release(ButtonId::new(0x08).unwrap()))
        );
        assert_eq!(decode(&[0xB0, 0, 3]).to_event(), None);
        assert_eq!(decode(&[0xF8]).to_event(), None);
    }

    #[test]
    fn top_right_button_is_the_emergency_stop() {
        assert_eq!(decode(&[0xB0, 111, 127]).to_event(), Some(Event::EmergencyStop));
        assert_eq!(decode(&[0xB0, 111, 0]).to_event(), None);
        // the rest of the top row is unbound
        assert_eq!(decode(&[0xB0, 104, 127]).to_event(), None);
    }

    #[test]
    fn unexpected_bytes_do_not_panic() {
        assert_eq!(decode(&[0xF8]), Message::Other(vec![0xF8]));
        assert_eq!(decode(&[0x90, 1]), Message::Other(vec![0x90, 1]));
        assert_eq!(decode(&[0xB0, 0, 3]), Message::TextEndedOrLooped);
    }
}
