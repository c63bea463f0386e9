//! LED feedback: what the board shows and how it gets there.
//!
//! A [`Frame`] holds one color per pad. The [`Renderer`] remembers the frame it last put on the
//! board, redraws it completely for [`Renderer::render`] and only touches single pads for
//! [`Renderer::set_single`] and [`Renderer::sync`].

use crate::util::Array2d;
use crate::{ButtonId, Color, HardwareError, Layout, Menu};

/// One color for every pad of the controller.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Frame(Array2d<Color>);

impl Frame {
    /// A frame with every pad off.
    pub fn off() -> Self {
        Self::filled(Color::Off)
    }

    pub fn filled(color: Color) -> Self {
        Self(Array2d::filled(
            ButtonId::COLUMNS as usize,
            ButtonId::ROWS as usize,
            color,
        ))
    }

    pub fn get(&self, button: ButtonId) -> Color {
        self.0
            .get(button.x() as usize, button.y() as usize)
            .unwrap_or_default()
    }

    pub fn set(&mut self, button: ButtonId, color: Color) {
        self.0.set(button.x() as usize, button.y() as usize, color);
    }

    /// Every pad with its color, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (ButtonId, Color)> + '_ {
        ButtonId::all().map(move |button| (button, self.get(button)))
    }
}

/// Something that can light the controller's pads.
pub trait LedSink {
    fn set(&mut self, button: ButtonId, color: Color) -> Result<(), HardwareError>;

    /// Shows a whole frame. Every pad gets exactly one update.
    fn show_frame(&mut self, frame: &Frame) -> Result<(), HardwareError> {
        for (button, color) in frame.iter() {
            self.set(button, color)?;
        }
        Ok(())
    }

    /// Turns every LED off.
    fn clear(&mut self) -> Result<(), HardwareError> {
        self.show_frame(&Frame::off())
    }
}

pub struct Renderer {
    sink: Box<dyn LedSink>,
    shown: Frame,
}

impl Renderer {
    pub fn new(sink: Box<dyn LedSink>) -> Self {
        Self {
            sink,
            shown: Frame::off(),
        }
    }

    /// Redraws every pad with the colors `layout` assigns to `menu`.
    pub fn render(&mut self, layout: &Layout, menu: Menu) -> Result<(), HardwareError> {
        self.show(&layout.frame(menu))
    }

    /// Redraws every pad from `frame`.
    pub fn show(&mut self, frame: &Frame) -> Result<(), HardwareError> {
        self.sink.show_frame(frame)?;
        self.shown = frame.clone();
        Ok(())
    }

    /// Changes a single pad without touching the others. The next full render replaces it.
    pub fn set_single(&mut self, button: ButtonId, color: Color) -> Result<(), HardwareError> {
        self.sink.set(button, color)?;
        self.shown.set(button, color);
        Ok(())
    }

    /// Updates only the pads where `frame` differs from the board. Returns the number of pads
    /// changed.
    pub fn sync(&mut self, frame: &Frame) -> Result<usize, HardwareError> {
        let changes: Vec<_> = frame
            .iter()
            .filter(|&(button, color)| self.shown.get(button) != color)
            .collect();

        for &(button, color) in &changes {
            self.set_single(button, color)?;
        }
        Ok(changes.len())
    }

    pub fn clear(&mut self) -> Result<(), HardwareError> {
        self.sink.clear()?;
        self.shown = Frame::off();
        Ok(())
    }

    /// What the board currently shows.
    pub fn shown(&self) -> &Frame {
        &self.shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockLeds;

    #[test]
    fn render_reads_back_as_the_color_assignment() {
        let layout = Layout::builtin().unwrap();
        let leds = MockLeds::default();
        let mut renderer = Renderer::new(Box::new(leds.clone()));

        for menu in Menu::ALL {
            leds.take_commands();
            renderer.render(&layout, menu).unwrap();

            let commands = leds.take_commands();
            assert_eq!(commands.len(), ButtonId::COUNT);

            for button in ButtonId::all() {
                assert_eq!(leds.color(button), layout.color(menu, button), "{} {}", menu, button);
            }
            assert_eq!(renderer.shown(), &layout.frame(menu));
        }
    }

    #[test]
    fn unassigned_pads_render_off() {
        let layout = Layout::builtin().unwrap();
        let leds = MockLeds::default();
        let mut renderer = Renderer::new(Box::new(leds.clone()));

        renderer.render(&layout, Menu::Effects).unwrap();
        assert_eq!(leds.color(ButtonId::new(0).unwrap()), Color::Off);
        assert_eq!(leds.color(ButtonId::new(119).unwrap()), Color::Off);
        assert_eq!(leds.color(ButtonId::new(32).unwrap()), Color::Yellow);
    }

    #[test]
    fn active_menu_select_button_stands_out() {
        let layout = Layout::builtin().unwrap();
        let frame = layout.frame(Menu::Music);

        assert_eq!(frame.get(ButtonId::new(24).unwrap()), Color::RedFull);
        assert_eq!(frame.get(ButtonId::new(8).unwrap()), Color::Blue);
        assert_eq!(frame.get(ButtonId::new(40).unwrap()), Color::AmberFull);
        assert_eq!(frame.get(ButtonId::new(56).unwrap()), Color::Orange);
    }

    #[test]
    fn set_single_is_undone_by_the_next_render() {
        let layout = Layout::builtin().unwrap();
        let leds = MockLeds::default();
        let mut renderer = Renderer::new(Box::new(leds.clone()));
        let pad = ButtonId::new(16).unwrap();

        renderer.render(&layout, Menu::Scenes).unwrap();
        leds.take_commands();

        renderer.set_single(pad, Color::RedFull).unwrap();
        assert_eq!(leds.take_commands(), vec![(pad, Color::RedFull)]);
        assert_eq!(leds.color(pad), Color::RedFull);

        renderer.render(&layout, Menu::Scenes).unwrap();
        assert_eq!(leds.color(pad), Color::GreenFull);
    }

    #[test]
    fn sync_only_touches_changed_pads() {
        let layout = Layout::builtin().unwrap();
        let leds = MockLeds::default();
        let mut renderer = Renderer::new(Box::new(leds.clone()));

        renderer.render(&layout, Menu::Scenes).unwrap();
        leds.take_commands();

        let mut frame = layout.frame(Menu::Scenes);
        frame.set(ButtonId::new(112).unwrap(), Color::GreenFull);
        frame.set(ButtonId::new(113).unwrap(), Color::GreenFull);

        assert_eq!(renderer.sync(&frame).unwrap(), 2);
        assert_eq!(leds.take_commands().len(), 2);
        assert_eq!(renderer.sync(&frame).unwrap(), 0);
    }
}
