use serde::{Deserialize, Serialize};

/// The menu pages of the board. Exactly one is active at a time.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Menu {
    #[default]
    Scenes,
    Music,
    Effects,
    Utility,
}

impl Menu {
    pub const ALL: [Menu; 4] = [Menu::Scenes, Menu::Music, Menu::Effects, Menu::Utility];

    pub fn name(self) -> &'static str {
        match self {
            Menu::Scenes => "SCENES",
            Menu::Music => "MUSIC",
            Menu::Effects => "EFFECTS",
            Menu::Utility => "UTILITY",
        }
    }
}

impl std::fmt::Display for Menu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
