use serde::{Deserialize, Serialize};

/// The colors a pad can be assigned.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
	#[default]
	Off,
	RedDim,
	RedFull,
	AmberDim,
	AmberFull,
	Yellow,
	GreenDim,
	GreenFull,
	Orange,
	Blue,
}

impl Color {
	pub const ALL: [Color; 10] = [
		Color::Off,
		Color::RedDim,
		Color::RedFull,
		Color::AmberDim,
		Color::AmberFull,
		Color::Yellow,
		Color::GreenDim,
		Color::GreenFull,
		Color::Orange,
		Color::Blue,
	];

	/// Red and green LED brightness (each 0..=3) for this color, or `None` if the color needs an
	/// LED the bicolor pads don't have.
	pub fn levels(self) -> Option<(u8, u8)> {
		let levels = match self {
			Color::Off => (0, 0),
			Color::RedDim => (1, 0),
			Color::RedFull => (3, 0),
			Color::AmberDim => (1, 1),
			Color::AmberFull => (3, 3),
			Color::Yellow => (2, 3),
			Color::GreenDim => (0, 1),
			Color::GreenFull => (0, 3),
			Color::Orange => (3, 2),
			Color::Blue => return None,
		};
		return Some(levels);
	}

	/// Red and green levels to show on a red/green pad. Colors without levels are replaced by
	/// the closest color that has them, so a lit color never turns into a dark pad.
	pub fn red_green(self) -> (u8, u8) {
		match self.levels() {
			Some(levels) => levels,
			// blue sits between the greens on the bicolor pads
			None => (0, 1),
		}
	}

	pub fn is_lit(self) -> bool {
		self != Color::Off
	}
}
