//! The menu/dispatch engine.
//!
//! The engine owns everything that changes while the show runs: the active menu, the playing
//! track, the running animation and the short-lived LED overlays. Events are handled one at a
//! time; every press runs at most one action to completion before the next event is looked at.
//!
//! What the board shows is always the active menu's colors with the overlays on top (press
//! flashes, the blinking pad of the playing track, the progress bar and the mute indicator),
//! unless an animation is running. Overlays are recomputed on every tick and applied by diffing,
//! so they never leave stale pads behind.

use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::action::{Effect, Utility, VOLUME_STEP};
use crate::animation::{Animation, Step};
use crate::config::Config;
use crate::leds::{Frame, LedSink, Renderer};
use crate::mixer::Mixer;
use crate::player::{Player, VolumeChange};
use crate::{Action, ActionError, ButtonId, Color, Event, HardwareError, Layout, Menu};

const PRESS_FLASH: Duration = Duration::from_millis(500);
const BLINK_INTERVAL: Duration = Duration::from_millis(500);

/// What a press ended up doing.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Dispatch {
    /// A menu-select button switched to this menu
    Menu(Menu),
    /// The button's action ran. `ok` is false if it failed and the failure was logged.
    Action { action: Action, ok: bool },
    /// Nothing is bound to the button in the active menu
    Unbound,
}

/// Whether the run loop should keep going after an event.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Flow {
    Continue,
    Stop,
}

/// How much of the board an action changed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Redraw {
    /// Only overlays may have changed
    Overlay,
    /// Put the active menu back on the board from scratch
    Full,
}

#[derive(Debug, Clone)]
struct Playing {
    track: String,
    slot: u8,
    /// The button that started the track, and the menu it belongs to
    button: ButtonId,
    menu: Menu,
    started: Instant,
}

pub struct Engine {
    layout: Layout,
    config: Config,
    mixer: Box<dyn Mixer>,
    player: Box<dyn Player>,
    renderer: Renderer,
    rng: StdRng,

    current_menu: Menu,
    playing: Option<Playing>,
    last_scene: Option<String>,
    volume: Option<u8>,
    muted: bool,
    animation: Option<Animation>,
    /// Pads flashing red until the given time
    flashes: Vec<(ButtonId, Instant)>,
    shut_down: bool,
}

impl Engine {
    pub fn new(
        layout: Layout,
        config: Config,
        mixer: Box<dyn Mixer>,
        player: Box<dyn Player>,
        leds: Box<dyn LedSink>,
    ) -> Self {
        let current_menu = config.controller.default_menu;
        Self {
            layout,
            config,
            mixer,
            player,
            renderer: Renderer::new(leds),
            rng: StdRng::from_rng(&mut rand::rng()),
            current_menu,
            playing: None,
            last_scene: None,
            volume: None,
            muted: false,
            animation: None,
            flashes: Vec::new(),
            shut_down: false,
        }
    }

    pub fn current_menu(&self) -> Menu {
        self.current_menu
    }

    /// The slot of the track started last, while it plays.
    pub fn playing_slot(&self) -> Option<u8> {
        self.playing.as_ref().map(|p| p.slot)
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Plays the startup sweep. The active menu is rendered when it ends.
    pub fn start(&mut self) -> Result<(), HardwareError> {
        log::info!("Starting in the {} menu", self.current_menu);
        self.animation = Some(Animation::sweep());
        self.refresh(Instant::now())
    }

    /// Handles events until a shutdown is requested or the controller is lost, then shuts down.
    pub fn run(&mut self, events: &Receiver<Event>) -> Result<(), HardwareError> {
        let result = self.event_loop(events);
        if let Err(e) = &result {
            log::error!("Controller failure, shutting down: {}", e);
        }
        self.shutdown();
        result
    }

    fn event_loop(&mut self, events: &Receiver<Event>) -> Result<(), HardwareError> {
        self.start()?;
        for event in events.iter() {
            if self.handle_event(event)? == Flow::Stop {
                return Ok(());
            }
        }
        log::info!("All event sources are gone");
        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) -> Result<Flow, HardwareError> {
        match event {
            Event::Press(button) => {
                self.handle_press(button)?;
            }
            Event::Release(button) => log::debug!("Released {}", button),
            Event::Tick => self.tick()?,
            Event::EmergencyStop => self.emergency_stop()?,
            Event::Disconnected => return Err(HardwareError::Disconnected),
            Event::Shutdown => {
                log::info!("Shutdown requested");
                return Ok(Flow::Stop);
            }
        }
        Ok(Flow::Continue)
    }

    pub fn handle_press(&mut self, button: ButtonId) -> Result<Dispatch, HardwareError> {
        self.press_at(button, Instant::now())
    }

    fn press_at(&mut self, button: ButtonId, now: Instant) -> Result<Dispatch, HardwareError> {
        if let Some(menu) = self.layout.menu_for(button) {
            self.switch_menu(menu, now)?;
            return Ok(Dispatch::Menu(menu));
        }

        let action = match self.layout.action(self.current_menu, button) {
            Some(action) => action.clone(),
            None => {
                log::debug!("{} is not bound in the {} menu", button, self.current_menu);
                return Ok(Dispatch::Unbound);
            }
        };

        log::info!("{}: {}", button, action);
        log::debug!("{} goes to {:?}", action, action.target());
        let (ok, redraw) = match self.execute(&action, button, now) {
            Ok(redraw) => (true, redraw),
            Err(e) => {
                if action.is_idempotent() {
                    log::error!("{} ({}) failed, press again to retry: {}", action, button, e);
                } else {
                    log::error!("{} ({}) failed: {}", action, button, e);
                }
                (false, failure_redraw(&action))
            }
        };

        if self.config.feedback.flash_on_press {
            self.flashes.push((button, now + PRESS_FLASH));
        }
        if redraw == Redraw::Full && self.animation.is_none() {
            self.render()?;
        }
        self.refresh(now)?;

        Ok(Dispatch::Action { action, ok })
    }

    fn switch_menu(&mut self, menu: Menu, now: Instant) -> Result<(), HardwareError> {
        if menu != self.current_menu {
            log::info!("Menu: {}", menu);
        }
        self.current_menu = menu;
        self.animation = None;
        self.flashes.clear();
        self.render()?;
        self.refresh(now)
    }

    /// Redraws every pad with the active menu's colors.
    pub fn render(&mut self) -> Result<(), HardwareError> {
        self.renderer.render(&self.layout, self.current_menu)
    }

    /// Advances the running animation and refreshes the playback feedback.
    pub fn tick(&mut self) -> Result<(), HardwareError> {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> Result<(), HardwareError> {
        if let Some(playing) = &self.playing {
            if self.player.get_position(playing.slot).is_none() {
                log::info!("Finished playing {}", playing.track);
                self.playing = None;
            }
        }
        self.flashes.retain(|&(_, until)| until > now);

        self.refresh(now)
    }

    /// Brings the board up to date: the animation's next frame if one runs, otherwise the
    /// active menu with its overlays.
    fn refresh(&mut self, now: Instant) -> Result<(), HardwareError> {
        if let Some(animation) = &mut self.animation {
            match animation.advance(now) {
                Step::Show(frame) => return self.renderer.show(&frame),
                Step::Wait => return Ok(()),
                Step::Done => {
                    log::debug!("Animation {} ended", animation.name());
                    self.animation = None;
                    self.render()?;
                }
            }
        }

        let frame = self.overlay(now);
        let changed = self.renderer.sync(&frame)?;
        if changed > 0 {
            log::debug!("Updated {} pads", changed);
        }
        Ok(())
    }

    fn overlay(&self, now: Instant) -> Frame {
        let mut frame = self.layout.frame(self.current_menu);
        let feedback = &self.config.feedback;

        if let Some(playing) = &self.playing {
            if feedback.progress_bar {
                let position = self.player.get_position(playing.slot);
                let duration = self.player.duration(playing.slot);
                if let (Some(position), Some(duration)) = (position, duration) {
                    let pads = self.layout.progress_pads();
                    let lit = progress_pads_lit(position, duration, pads.len());
                    for &pad in &pads[..lit] {
                        frame.set(pad, Color::GreenFull);
                    }
                }
            }

            if feedback.blink_playing && playing.menu == self.current_menu {
                let phase = now.saturating_duration_since(playing.started).as_millis()
                    / BLINK_INTERVAL.as_millis();
                let color = if phase % 2 == 0 { Color::RedFull } else { Color::Off };
                frame.set(playing.button, color);
            }
        }

        if self.muted {
            if let Some(button) = self.layout.button_for(self.current_menu, &Action::MuteToggle) {
                frame.set(button, Color::RedFull);
            }
        }

        for &(button, _) in &self.flashes {
            frame.set(button, Color::RedFull);
        }

        frame
    }

    fn execute(
        &mut self,
        action: &Action,
        button: ButtonId,
        now: Instant,
    ) -> Result<Redraw, ActionError> {
        match action {
            Action::Scene(key) => self.switch_scene(key)?,
            Action::Play {
                track,
                slot,
                exclusive,
            } => {
                let path = self.config.track(track)?.to_owned();
                // a track started without exclusivity may have outlived `playing`
                if *exclusive {
                    self.playing = None;
                    self.player.stop()?;
                }
                self.player.play(&path, *slot)?;
                log::info!("Playing {} ({})", track, path.display());

                self.playing = Some(Playing {
                    track: track.clone(),
                    slot: *slot,
                    button,
                    menu: self.current_menu,
                    started: now,
                });
            }
            Action::Stop => {
                self.playing = None;
                self.player.stop()?;
                log::info!("Music stopped");
            }
            Action::VolumeUp => self.change_volume(VOLUME_STEP)?,
            Action::VolumeDown => self.change_volume(-VOLUME_STEP)?,
            Action::MuteToggle => {
                self.muted = self.player.mute_toggle()?;
                log::info!("Mute {}", if self.muted { "on" } else { "off" });
            }
            Action::Effect(effect) => self.effect(*effect)?,
            Action::Utility(utility) => return self.utility(*utility),
        }
        Ok(Redraw::Overlay)
    }

    fn switch_scene(&mut self, key: &str) -> Result<(), ActionError> {
        let scene = self.config.scene(key)?;
        self.mixer.set_active_scene(scene)?;
        log::info!("Switched to scene: {}", scene);
        self.last_scene = Some(key.to_owned());
        Ok(())
    }

    fn change_volume(&mut self, delta: i8) -> Result<(), ActionError> {
        let volume = self.player.set_volume(VolumeChange::Relative(delta))?;
        log::info!("Volume: {}%", volume);
        self.volume = Some(volume);
        Ok(())
    }

    fn effect(&mut self, effect: Effect) -> Result<(), ActionError> {
        let base = self.layout.frame(self.current_menu);
        let animation = match effect {
            Effect::Flash => Animation::flash(&base),
            Effect::Celebration => Animation::celebration(&base, &mut self.rng),
            Effect::Voting => Animation::voting(&base),
            Effect::TechnicalBreak => {
                log::info!("Technical break");
                return self.safe_state();
            }
        };
        log::info!("Effect: {}", animation.name());
        self.animation = Some(animation);
        Ok(())
    }

    fn utility(&mut self, utility: Utility) -> Result<Redraw, ActionError> {
        match utility {
            Utility::Reset => {
                self.animation = None;
                self.flashes.clear();
                log::info!("LEDs reset");
                Ok(Redraw::Full)
            }
            Utility::SelfTest => {
                log::info!("Running self-test");
                self.animation = Some(Animation::sweep());
                Ok(Redraw::Overlay)
            }
            Utility::EmergencyStop => {
                log::warn!("EMERGENCY STOP");
                self.animation = None;
                self.safe_state()?;
                Ok(Redraw::Full)
            }
            Utility::Status => {
                self.log_status();
                Ok(Redraw::Overlay)
            }
        }
    }

    /// Music off and the backup scene on program. Both are attempted even if one fails.
    fn safe_state(&mut self) -> Result<(), ActionError> {
        self.playing = None;
        let stopped = self.player.stop();
        let backup = self.config.controller.backup_scene.clone();
        let switched = self.switch_scene(&backup);

        stopped?;
        switched
    }

    /// Stops the music, puts the backup scene on program and redraws the active menu, whatever
    /// menu that is. Bound to a top-row button, so it works in every menu.
    pub fn emergency_stop(&mut self) -> Result<(), HardwareError> {
        let now = Instant::now();
        if let Err(e) = self.utility(Utility::EmergencyStop) {
            log::error!("Emergency stop incomplete: {}", e);
        }
        self.render()?;
        self.refresh(now)
    }

    fn log_status(&self) {
        let playing = match &self.playing {
            Some(playing) => format!("{} (slot {})", playing.track, playing.slot),
            None => "nothing".to_owned(),
        };
        let volume = match self.volume {
            Some(volume) => format!("{}%", volume),
            None => "unchanged".to_owned(),
        };
        log::info!(
            "Status: menu {}, last scene {}, playing {}, volume {}, mute {}",
            self.current_menu,
            self.last_scene.as_deref().unwrap_or("none"),
            playing,
            volume,
            if self.muted { "on" } else { "off" },
        );
    }

    /// Stops playback, turns the LEDs off and disconnects from the mixer. Every step is best
    /// effort; calling this again does nothing.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        log::info!("Shutting down");

        self.playing = None;
        if let Err(e) = self.player.stop() {
            log::error!("Couldn't stop the music: {}", e);
        }
        if let Err(e) = self.renderer.clear() {
            log::warn!("Couldn't turn the LEDs off: {}", e);
        }
        self.mixer.disconnect();
    }
}

/// The emergency stop always puts the menu back, even if it could only do half its job.
fn failure_redraw(action: &Action) -> Redraw {
    match action {
        Action::Utility(Utility::EmergencyStop) => Redraw::Full,
        _ => Redraw::Overlay,
    }
}

/// How many of `pads` progress pads to light for a track `position` into `duration`.
fn progress_pads_lit(position: Duration, duration: Duration, pads: usize) -> usize {
    if duration.is_zero() {
        return 0;
    }
    let fraction = (position.as_secs_f64() / duration.as_secs_f64()).min(1.0);
    (fraction * pads as f64).floor() as usize
}
