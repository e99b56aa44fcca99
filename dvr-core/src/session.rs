//! Cross-context session state.
//!
//! [`SessionSignals`] is the only state shared between the sample interrupt
//! and the foreground loop besides the buffer cursors. Every field is an
//! atomic so a flag or counter can never be observed half-written, even on
//! 8-bit cores where `u16` is wider than a machine word.
//!
//! | Field             | Written by                      | Read by          |
//! |-------------------|---------------------------------|------------------|
//! | `pages_remaining` | ISR (decrement), fg (set)       | ISR              |
//! | `page_ready`      | ISR (set), fg (clear)           | fg               |
//! | `session_complete`| ISR (set), fg (clear)           | fg               |
//! | `mode`            | fg (start/stop), ISR (budget)   | ISR              |
//! | `divisor`         | fg                              | ISR              |
//! | `state`           | fg                              | fg, indicators   |

use portable_atomic::{AtomicBool, AtomicU16, AtomicU8, Ordering};

use crate::buffer::PageEvents;
use crate::constants::NORMAL_RATE_DIVISOR;

/// What the sample tick does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ClockMode {
    /// Tick source stopped: no acquisition, no output.
    Idle = 0,
    /// Acquire one sample per tick into the buffer.
    Recording = 1,
    /// Drain the buffer to the output sink.
    Playing = 2,
}

impl ClockMode {
    pub const fn from_bits(bits: u8) -> Self {
        match bits {
            1 => ClockMode::Recording,
            2 => ClockMode::Playing,
            _ => ClockMode::Idle,
        }
    }
}

/// Recorder state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum State {
    Stopped = 0,
    Recording = 1,
    Playing = 2,
}

impl State {
    /// Decode a published state byte. `None` for values no state maps to.
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(State::Stopped),
            1 => Some(State::Recording),
            2 => Some(State::Playing),
            _ => None,
        }
    }
}

/// Flags and counters shared between the sample ISR and the foreground loop.
///
/// Registered with the [`PageBuffer`](crate::buffer::PageBuffer) as its
/// [`PageEvents`] listener: each page boundary decrements the page budget and
/// either raises `page_ready` or, when the budget runs out, halts the tick
/// source and raises `session_complete`.
pub struct SessionSignals {
    pages_remaining: AtomicU16,
    page_ready: AtomicBool,
    session_complete: AtomicBool,
    mode: AtomicU8,
    divisor: AtomicU8,
    state: AtomicU8,
}

impl SessionSignals {
    pub const fn new() -> Self {
        SessionSignals {
            pages_remaining: AtomicU16::new(0),
            page_ready: AtomicBool::new(false),
            session_complete: AtomicBool::new(false),
            mode: AtomicU8::new(ClockMode::Idle as u8),
            divisor: AtomicU8::new(NORMAL_RATE_DIVISOR),
            state: AtomicU8::new(State::Stopped as u8),
        }
    }

    /// Arm a new session with a page budget. Flags are cleared; the tick
    /// source is left as it is.
    pub fn begin(&self, pages: u16) {
        self.page_ready.store(false, Ordering::Release);
        self.session_complete.store(false, Ordering::Release);
        self.pages_remaining.store(pages, Ordering::Release);
    }

    /// Make the page currently being filled or drained the last one.
    pub fn request_last_page(&self) {
        self.pages_remaining.store(1, Ordering::Release);
    }

    pub fn pages_remaining(&self) -> u16 {
        self.pages_remaining.load(Ordering::Acquire)
    }

    /// Observe and clear the page-ready flag.
    pub fn take_page_ready(&self) -> bool {
        self.page_ready.swap(false, Ordering::AcqRel)
    }

    /// Re-raise the page-ready flag when more pages are pending than one
    /// iteration serviced.
    pub fn rearm_page_ready(&self) {
        self.page_ready.store(true, Ordering::Release);
    }

    /// Observe and clear the session-complete flag.
    pub fn take_session_complete(&self) -> bool {
        self.session_complete.swap(false, Ordering::AcqRel)
    }

    pub fn mode(&self) -> ClockMode {
        ClockMode::from_bits(self.mode.load(Ordering::Acquire))
    }

    /// Start or stop the sample tick. Takes effect at the next tick.
    pub fn set_mode(&self, mode: ClockMode) {
        self.mode.store(mode as u8, Ordering::Release);
    }

    /// Output ticks per emitted sample.
    pub fn divisor(&self) -> u8 {
        self.divisor.load(Ordering::Acquire)
    }

    pub fn set_divisor(&self, divisor: u8) {
        self.divisor.store(divisor.max(1), Ordering::Release);
    }

    /// Raw published state byte, as stored.
    pub fn state_bits(&self) -> u8 {
        self.state.load(Ordering::Acquire)
    }

    /// Decoded published state; `None` if the byte is corrupt.
    pub fn state(&self) -> Option<State> {
        State::from_bits(self.state_bits())
    }

    pub(crate) fn publish_state(&self, state: State) {
        self.state.store(state as u8, Ordering::Release);
    }

    #[cfg(test)]
    pub(crate) fn publish_state_bits(&self, bits: u8) {
        self.state.store(bits, Ordering::Release);
    }

    /// Count down one page; halt the tick source once the budget is spent.
    ///
    /// Runs in the sample ISR, which the foreground cannot preempt, so the
    /// load/store pair never loses a concurrent `request_last_page`.
    fn page_boundary(&self) {
        let remaining = self.pages_remaining.load(Ordering::Acquire);
        if remaining <= 1 {
            self.pages_remaining.store(0, Ordering::Release);
            self.set_mode(ClockMode::Idle);
            self.session_complete.store(true, Ordering::Release);
        } else {
            self.pages_remaining.store(remaining - 1, Ordering::Release);
            self.page_ready.store(true, Ordering::Release);
        }
    }
}

impl Default for SessionSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl PageEvents for SessionSignals {
    fn page_full(&self) {
        self.page_boundary();
    }

    fn page_empty(&self) {
        self.page_boundary();
    }

    fn reset(&self) {
        self.page_ready.store(false, Ordering::Release);
        self.session_complete.store(false, Ordering::Release);
    }
}
