//! Timed LED sequences.
//!
//! An [`Animation`] is a list of frames shown one after another at a fixed interval. It doesn't
//! sleep or own a thread: the engine calls [`Animation::advance`] on every tick and puts the
//! returned frame on the board, so input keeps flowing while an animation runs.

use std::time::{Duration, Instant};

use rand::Rng;

use crate::leds::Frame;
use crate::{ButtonId, Color};

const SWEEP_COLORS: [Color; 4] = [Color::RedFull, Color::AmberFull, Color::GreenFull, Color::Blue];
const CELEBRATION_COLORS: [Color; 4] = [Color::RedFull, Color::GreenFull, Color::Blue, Color::Yellow];

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Step {
    /// Put this frame on the board
    Show(Frame),
    /// The current frame stays
    Wait,
    /// The last frame has been shown for its full interval
    Done,
}

#[derive(Debug, Clone)]
pub struct Animation {
    name: &'static str,
    frames: Vec<Frame>,
    interval: Duration,
    next: usize,
    due: Option<Instant>,
}

impl Animation {
    pub fn new(name: &'static str, frames: Vec<Frame>, interval: Duration) -> Self {
        Self {
            name,
            frames,
            interval,
            next: 0,
            due: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of frames in the whole sequence.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// How long the sequence runs from the first frame to the end.
    pub fn total_duration(&self) -> Duration {
        self.interval * self.frames.len() as u32
    }

    /// The first call shows the first frame right away. Every later frame is due one interval
    /// after the previous one.
    pub fn advance(&mut self, now: Instant) -> Step {
        if let Some(due) = self.due {
            if now < due {
                return Step::Wait;
            }
        }

        match self.frames.get(self.next) {
            Some(frame) => {
                self.next += 1;
                self.due = Some(now + self.interval);
                Step::Show(frame.clone())
            }
            None => Step::Done,
        }
    }

    /// The whole board goes red, amber, green and blue. Played at startup and as the self-test.
    pub fn sweep() -> Self {
        let frames = SWEEP_COLORS.iter().map(|&color| Frame::filled(color)).collect();
        Self::new("sweep", frames, Duration::from_millis(200))
    }

    /// Three red flashes over the main grid. Everything else keeps showing `base`.
    pub fn flash(base: &Frame) -> Self {
        let mut frames = Vec::new();
        for _ in 0..3 {
            frames.push(with_grid(base, |_| Color::RedFull));
            frames.push(with_grid(base, |_| Color::Off));
        }
        Self::new("flash", frames, Duration::from_millis(100))
    }

    /// Ten frames of random colors on the main grid.
    pub fn celebration(base: &Frame, rng: &mut impl Rng) -> Self {
        let frames = (0..10)
            .map(|_| {
                with_grid(base, |_| {
                    CELEBRATION_COLORS[rng.random_range(0..CELEBRATION_COLORS.len())]
                })
            })
            .collect();
        Self::new("celebration", frames, Duration::from_millis(200))
    }

    /// The main grid pulses amber twenty times while the audience votes.
    pub fn voting(base: &Frame) -> Self {
        let mut frames = Vec::new();
        for _ in 0..20 {
            frames.push(with_grid(base, |_| Color::AmberFull));
            frames.push(with_grid(base, |_| Color::AmberDim));
        }
        Self::new("voting", frames, Duration::from_millis(500))
    }
}

fn with_grid(base: &Frame, mut color: impl FnMut(ButtonId) -> Color) -> Frame {
    let mut frame = base.clone();
    for button in ButtonId::main_grid() {
        frame.set(button, color(button));
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn run_to_end(mut animation: Animation) -> Vec<Frame> {
        let mut now = Instant::now();
        let mut shown = Vec::new();
        loop {
            match animation.advance(now) {
                Step::Show(frame) => shown.push(frame),
                Step::Wait => {}
                Step::Done => return shown,
            }
            now += Duration::from_millis(50);
        }
    }

    #[test]
    fn frames_wait_for_their_interval() {
        let start = Instant::now();
        let mut animation = Animation::flash(&Frame::off());

        assert!(matches!(animation.advance(start), Step::Show(_)));
        assert_eq!(animation.advance(start + Duration::from_millis(50)), Step::Wait);
        assert!(matches!(
            animation.advance(start + Duration::from_millis(100)),
            Step::Show(_)
        ));
    }

    #[test]
    fn flash_leaves_the_side_column_alone() {
        let mut base = Frame::off();
        let side = ButtonId::grid(8, 2);
        base.set(side, Color::AmberFull);

        let frames = run_to_end(Animation::flash(&base));
        assert_eq!(frames.len(), 6);
        assert_eq!(frames[0].get(ButtonId::grid(3, 3)), Color::RedFull);
        assert_eq!(frames[1].get(ButtonId::grid(3, 3)), Color::Off);
        assert!(frames.iter().all(|frame| frame.get(side) == Color::AmberFull));
    }

    #[test]
    fn sweep_covers_the_whole_board() {
        let frames = run_to_end(Animation::sweep());
        let colors: Vec<_> = frames.iter().map(|f| f.get(ButtonId::grid(8, 7))).collect();
        assert_eq!(colors, SWEEP_COLORS);
        assert_eq!(Animation::sweep().total_duration(), Duration::from_millis(800));
    }

    #[test]
    fn celebration_uses_its_palette() {
        let mut rng = StdRng::seed_from_u64(7);
        let animation = Animation::celebration(&Frame::off(), &mut rng);
        assert_eq!(animation.len(), 10);

        for frame in run_to_end(animation) {
            for button in ButtonId::main_grid() {
                assert!(CELEBRATION_COLORS.contains(&frame.get(button)));
            }
        }
    }

    #[test]
    fn voting_alternates_full_and_dim() {
        let animation = Animation::voting(&Frame::off());
        assert_eq!(animation.len(), 40);
        assert_eq!(animation.total_duration(), Duration::from_secs(20));

        let frames = run_to_end(animation);
        assert_eq!(frames[0].get(ButtonId::grid(0, 0)), Color::AmberFull);
        assert_eq!(frames[1].get(ButtonId::grid(0, 0)), Color::AmberDim);
    }
}
