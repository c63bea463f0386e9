//! The binding and color tables of the board.
//!
//! For every menu the layout says which action each pad triggers and which color it shows. Four
//! pads are reserved for selecting a menu: they work in every menu and can't be bound to
//! anything else. The tables are read once at startup, from the layout embedded in the binary
//! or from a file given on the command line, and never change while running.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;

use crate::leds::Frame;
use crate::{Action, ButtonId, Color, LayoutError, Menu};

const BUILTIN_LAYOUT: &str = include_str!("default_layout.json");

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutFile {
    menu_select: Vec<MenuSelect>,
    active_select_color: Color,
    #[serde(default)]
    progress_pads: Vec<ButtonId>,
    pages: Vec<Page>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
struct MenuSelect {
    button: ButtonId,
    menu: Menu,
    color: Color,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Page {
    menu: Menu,
    bindings: Vec<Binding>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Binding {
    button: ButtonId,
    #[serde(default)]
    action: Option<Action>,
    #[serde(default)]
    color: Color,
}

#[derive(Debug, Default)]
struct MenuTable {
    actions: BTreeMap<ButtonId, Action>,
    colors: BTreeMap<ButtonId, Color>,
}

#[derive(Debug)]
pub struct Layout {
    select: Vec<MenuSelect>,
    active_select_color: Color,
    progress_pads: Vec<ButtonId>,
    menus: HashMap<Menu, MenuTable>,
}

impl Layout {
    /// The show layout compiled into the binary.
    pub fn builtin() -> Result<Self, LayoutError> {
        Self::from_json(BUILTIN_LAYOUT)
    }

    pub fn load(path: &Path) -> Result<Self, LayoutError> {
        let json = std::fs::read_to_string(path).map_err(|source| LayoutError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        let file: LayoutFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    fn from_file(file: LayoutFile) -> Result<Self, LayoutError> {
        let mut select = file.menu_select;
        select.sort_by_key(|s| s.menu);

        for menu in Menu::ALL {
            let count = select.iter().filter(|s| s.menu == menu).count();
            if count != 1 {
                return Err(LayoutError::MenuSelect { menu, count });
            }
        }
        for (i, s) in select.iter().enumerate() {
            if select[..i].iter().any(|other| other.button == s.button) {
                return Err(LayoutError::SharedSelectButton { button: s.button });
            }
        }

        let mut menus: HashMap<Menu, MenuTable> = HashMap::new();
        for page in file.pages {
            let table = menus.entry(page.menu).or_default();

            for binding in page.bindings {
                let button = binding.button;
                if select.iter().any(|s| s.button == button) {
                    return Err(LayoutError::ReservedButton {
                        menu: page.menu,
                        button,
                    });
                }
                if table.colors.contains_key(&button) {
                    return Err(LayoutError::DuplicateBinding {
                        menu: page.menu,
                        button,
                    });
                }

                table.colors.insert(button, binding.color);
                if let Some(action) = binding.action {
                    table.actions.insert(button, action);
                }
            }
        }

        Ok(Self {
            select,
            active_select_color: file.active_select_color,
            progress_pads: file.progress_pads,
            menus,
        })
    }

    /// The menu a reserved button selects, or `None` for every other button.
    pub fn menu_for(&self, button: ButtonId) -> Option<Menu> {
        self.select.iter().find(|s| s.button == button).map(|s| s.menu)
    }

    /// The reserved button that selects `menu`.
    pub fn select_button(&self, menu: Menu) -> ButtonId {
        // from_file guarantees one entry per menu, sorted by menu
        self.select[Menu::ALL.iter().position(|&m| m == menu).unwrap_or(0)].button
    }

    pub fn action(&self, menu: Menu, button: ButtonId) -> Option<&Action> {
        self.menus.get(&menu)?.actions.get(&button)
    }

    /// Bound buttons of `menu`, in note order.
    pub fn bindings(&self, menu: Menu) -> impl Iterator<Item = (ButtonId, &Action)> + '_ {
        self.menus
            .get(&menu)
            .into_iter()
            .flat_map(|table| table.actions.iter().map(|(&b, a)| (b, a)))
    }

    /// The first button of `menu` bound to `action`.
    pub fn button_for(&self, menu: Menu, action: &Action) -> Option<ButtonId> {
        self.bindings(menu).find(|&(_, a)| a == action).map(|(b, _)| b)
    }

    /// The color `button` shows while `menu` is active. Unassigned buttons are off.
    pub fn color(&self, menu: Menu, button: ButtonId) -> Color {
        if let Some(s) = self.select.iter().find(|s| s.button == button) {
            return if s.menu == menu {
                self.active_select_color
            } else {
                s.color
            };
        }

        self.menus
            .get(&menu)
            .and_then(|table| table.colors.get(&button))
            .copied()
            .unwrap_or(Color::Off)
    }

    /// The complete board for `menu`.
    pub fn frame(&self, menu: Menu) -> Frame {
        let mut frame = Frame::off();
        for button in ButtonId::all() {
            frame.set(button, self.color(menu, button));
        }
        frame
    }

    /// Pads showing playback progress, left to right.
    pub fn progress_pads(&self) -> &[ButtonId] {
        &self.progress_pads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Effect, Utility};

    fn pad(note: u8) -> ButtonId {
        ButtonId::new(note).unwrap()
    }

    #[test]
    fn builtin_layout_is_valid() {
        let layout = Layout::builtin().unwrap();

        assert_eq!(layout.menu_for(pad(8)), Some(Menu::Scenes));
        assert_eq!(layout.menu_for(pad(24)), Some(Menu::Music));
        assert_eq!(layout.menu_for(pad(40)), Some(Menu::Effects));
        assert_eq!(layout.menu_for(pad(56)), Some(Menu::Utility));
        assert_eq!(layout.menu_for(pad(16)), None);

        for menu in Menu::ALL {
            assert_eq!(layout.menu_for(layout.select_button(menu)), Some(menu));
        }

        assert_eq!(layout.bindings(Menu::Scenes).count(), 19);
        assert_eq!(layout.bindings(Menu::Music).count(), 12);
        assert_eq!(layout.bindings(Menu::Effects).count(), 4);
        assert_eq!(layout.bindings(Menu::Utility).count(), 4);
        assert_eq!(layout.progress_pads().len(), 8);
    }

    #[test]
    fn reserved_buttons_are_never_bound() {
        let layout = Layout::builtin().unwrap();
        for menu in Menu::ALL {
            for select in Menu::ALL {
                assert!(layout.action(menu, layout.select_button(select)).is_none());
            }
        }
    }

    #[test]
    fn builtin_bindings() {
        let layout = Layout::builtin().unwrap();

        assert_eq!(
            layout.action(Menu::Scenes, pad(16)),
            Some(&Action::scene("stage1"))
        );
        assert_eq!(
            layout.action(Menu::Music, pad(0)),
            Some(&Action::play("intro", 0))
        );
        assert_eq!(
            layout.action(Menu::Effects, pad(35)),
            Some(&Action::Effect(Effect::TechnicalBreak))
        );
        assert_eq!(
            layout.action(Menu::Utility, pad(50)),
            Some(&Action::Utility(Utility::EmergencyStop))
        );
        assert_eq!(layout.action(Menu::Effects, pad(16)), None);
        assert_eq!(
            layout.button_for(Menu::Music, &Action::MuteToggle),
            Some(pad(35))
        );
    }

    const SELECT: &str = r#"
        "menu_select": [
            { "button": 8, "menu": "scenes", "color": "blue" },
            { "button": 24, "menu": "music", "color": "green_full" },
            { "button": 40, "menu": "effects", "color": "amber_full" },
            { "button": 56, "menu": "utility", "color": "orange" }
        ],
        "active_select_color": "red_full"
    "#;

    fn with_pages(pages: &str) -> Result<Layout, LayoutError> {
        Layout::from_json(&format!("{{ {}, \"pages\": {} }}", SELECT, pages))
    }

    #[test]
    fn rejects_duplicate_bindings() {
        let result = with_pages(
            r#"[{ "menu": "scenes", "bindings": [
                { "button": 0, "action": { "scene": "intro" } },
                { "button": 0, "action": { "scene": "video" } }
            ]}]"#,
        );
        assert!(matches!(
            result,
            Err(LayoutError::DuplicateBinding { menu: Menu::Scenes, .. })
        ));
    }

    #[test]
    fn rejects_binding_a_select_button() {
        let result = with_pages(
            r#"[{ "menu": "music", "bindings": [
                { "button": 24, "action": "stop" }
            ]}]"#,
        );
        assert!(matches!(
            result,
            Err(LayoutError::ReservedButton { menu: Menu::Music, .. })
        ));
    }

    #[test]
    fn rejects_invalid_pads() {
        let result = with_pages(
            r#"[{ "menu": "music", "bindings": [
                { "button": 12, "action": "stop" }
            ]}]"#,
        );
        assert!(matches!(result, Err(LayoutError::Parse(_))));
    }

    #[test]
    fn requires_one_select_button_per_menu() {
        let json = r#"{
            "menu_select": [
                { "button": 8, "menu": "scenes", "color": "blue" },
                { "button": 24, "menu": "scenes", "color": "green_full" },
                { "button": 40, "menu": "effects", "color": "amber_full" },
                { "button": 56, "menu": "utility", "color": "orange" }
            ],
            "active_select_color": "red_full",
            "pages": []
        }"#;
        assert!(matches!(
            Layout::from_json(json),
            Err(LayoutError::MenuSelect { menu: Menu::Scenes, count: 2 })
        ));
    }

    #[test]
    fn color_only_entries_and_defaults() {
        let layout = with_pages(
            r#"[{ "menu": "effects", "bindings": [
                { "button": 70, "color": "green_dim" },
                { "button": 71, "action": { "effect": "flash" } }
            ]}]"#,
        )
        .unwrap();

        assert_eq!(layout.color(Menu::Effects, pad(70)), Color::GreenDim);
        assert_eq!(layout.action(Menu::Effects, pad(70)), None);
        assert_eq!(layout.color(Menu::Effects, pad(71)), Color::Off);
        assert!(layout.action(Menu::Effects, pad(71)).is_some());
        assert!(layout.progress_pads().is_empty());
    }
}
