use serde::{Deserialize, Serialize};

/// One pad of the Launchpad Mini, addressed by the note number the device uses for it.
///
/// The note of the pad in column `x` and row `y` (both counted from the top left) is
/// `16 * y + x`. Columns 0-7 are the main 8x8 grid, column 8 is the round scene launch column.
/// The top row of round buttons talks CC instead of notes and is not part of this address space.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ButtonId(u8);

impl ButtonId {
    pub const COLUMNS: u8 = 9;
    pub const ROWS: u8 = 8;
    /// Number of pads in the address space.
    pub const COUNT: usize = (Self::COLUMNS as usize) * (Self::ROWS as usize);

    /// Returns `None` if no pad sends this note.
    pub fn new(note: u8) -> Option<Self> {
        if note % 16 < Self::COLUMNS && note / 16 < Self::ROWS {
            Some(Self(note))
        } else {
            None
        }
    }

    /// Creates a button from its column and row.
    pub const fn grid(x: u8, y: u8) -> Self {
        assert!(x < Self::COLUMNS);
        assert!(y < Self::ROWS);
        Self(y * 16 + x)
    }

    pub fn note(self) -> u8 {
        self.0
    }

    pub fn x(self) -> u8 {
        self.0 % 16
    }

    pub fn y(self) -> u8 {
        self.0 / 16
    }

    /// Returns true if the button is part of the main 8x8 grid.
    pub fn is_main_grid(self) -> bool {
        self.x() < 8
    }

    /// Returns true if the button is one of the round buttons on the right.
    pub fn is_scene_launch(self) -> bool {
        self.x() == 8
    }

    /// Every pad, row by row from the top left.
    pub fn all() -> impl Iterator<Item = ButtonId> {
        (0..Self::ROWS).flat_map(|y| (0..Self::COLUMNS).map(move |x| Self::grid(x, y)))
    }

    /// The pads of the main 8x8 grid, row by row.
    pub fn main_grid() -> impl Iterator<Item = ButtonId> {
        Self::all().filter(|b| b.is_main_grid())
    }
}

impl TryFrom<u8> for ButtonId {
    type Error = crate::InvalidButton;

    fn try_from(note: u8) -> Result<Self, Self::Error> {
        Self::new(note).ok_or(crate::InvalidButton { note })
    }
}

impl From<ButtonId> for u8 {
    fn from(button: ButtonId) -> u8 {
        button.0
    }
}

impl std::fmt::Display for ButtonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pad {} ({}, {})", self.0, self.x(), self.y())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_space_has_gaps() {
        assert!(ButtonId::new(0).is_some());
        assert!(ButtonId::new(8).is_some());
        assert!(ButtonId::new(9).is_none());
        assert!(ButtonId::new(15).is_none());
        assert!(ButtonId::new(16).is_some());
        assert!(ButtonId::new(120).is_some());
        assert!(ButtonId::new(127).is_none());
        assert!(ButtonId::new(128).is_none());
    }

    #[test]
    fn all_covers_every_pad_once() {
        let all: Vec<_> = ButtonId::all().collect();
        assert_eq!(all.len(), ButtonId::COUNT);

        let mut notes: Vec<u8> = all.iter().map(|b| b.note()).collect();
        notes.dedup();
        assert_eq!(notes.len(), ButtonId::COUNT);

        assert_eq!(ButtonId::main_grid().count(), 64);
        assert_eq!(all.iter().filter(|b| b.is_scene_launch()).count(), 8);
    }

    #[test]
    fn coordinates() {
        let button = ButtonId::grid(8, 3);
        assert_eq!(button.note(), 56);
        assert_eq!((button.x(), button.y()), (8, 3));
        assert!(button.is_scene_launch());
        assert!(!button.is_main_grid());
    }

    #[test]
    fn deserializes_from_note_numbers() {
        let button: ButtonId = serde_json::from_str("24").unwrap();
        assert_eq!(button, ButtonId::grid(8, 1));
        assert!(serde_json::from_str::<ButtonId>("12").is_err());
    }
}
