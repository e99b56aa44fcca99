//! User controls and status indicators.
//!
//! Buttons are sampled once per foreground iteration as debounced levels;
//! [`EdgeDetector`] turns them into the press events that drive the recorder.

use crate::session::State;

/// Debounced button levels, `true` while pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlLevels {
    pub record: bool,
    pub play: bool,
    pub stop: bool,
    pub fast: bool,
}

/// Buttons that went from released to pressed since the previous sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlEdges {
    pub record: bool,
    pub play: bool,
    pub stop: bool,
    pub fast: bool,
}

impl ControlEdges {
    pub fn any(&self) -> bool {
        self.record || self.play || self.stop || self.fast
    }
}

/// Rising-edge detector over [`ControlLevels`].
///
/// Holding a button produces a single edge, so a session never restarts while
/// its button is still down.
#[derive(Debug, Default)]
pub struct EdgeDetector {
    prev: ControlLevels,
}

impl EdgeDetector {
    pub const fn new() -> Self {
        EdgeDetector {
            prev: ControlLevels {
                record: false,
                play: false,
                stop: false,
                fast: false,
            },
        }
    }

    pub fn update(&mut self, now: ControlLevels) -> ControlEdges {
        let prev = core::mem::replace(&mut self.prev, now);
        ControlEdges {
            record: now.record && !prev.record,
            play: now.play && !prev.play,
            stop: now.stop && !prev.stop,
            fast: now.fast && !prev.fast,
        }
    }
}

/// Source of button levels for [`Recorder::run`](crate::recorder::Recorder::run).
pub trait ControlInputs {
    fn sample(&mut self) -> ControlLevels;
}

impl<F: FnMut() -> ControlLevels> ControlInputs for F {
    fn sample(&mut self) -> ControlLevels {
        self()
    }
}

/// Status display (LEDs on the reference board).
pub trait Indicators {
    /// Show the current state and whether fast playback is engaged.
    fn show(&mut self, state: State, fast: bool);
}

impl Indicators for () {
    fn show(&mut self, _state: State, _fast: bool) {}
}
