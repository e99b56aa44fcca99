//! `embedded-hal` 1.0 bindings for the recorder ports.
//!
//! Generic over any HAL's pin and PWM types, so the same recorder builds for
//! the reference board and for other MCUs.
//!
//! | Type | Port | Hardware |
//! |------|------|----------|
//! | [`PwmSink`] | [`SampleSink`] | PWM channel, duty tracks the sample |
//! | [`ButtonPins`] | [`ControlInputs`] | four active-low push buttons |
//! | [`StatusLeds`] | [`Indicators`] | four status LEDs |
//!
//! Pin errors cannot be reported from the tick or the indicator update, so
//! they are dropped: a failed read counts as "not pressed".

use embedded_hal::digital::{InputPin, OutputPin, PinState};
use embedded_hal::pwm::SetDutyCycle;

use crate::control::{ControlInputs, ControlLevels, Indicators};
use crate::io::SampleSink;
use crate::session::State;

// ── Audio output ───────────────────────────────────────────────────────────

/// Drives a PWM channel with unsigned 8-bit samples.
///
/// The full sample range `0..=255` maps onto `0..=max_duty_cycle()`.
pub struct PwmSink<P> {
    pwm: P,
}

impl<P: SetDutyCycle> PwmSink<P> {
    pub fn new(pwm: P) -> Self {
        PwmSink { pwm }
    }

    pub fn release(self) -> P {
        self.pwm
    }
}

impl<P: SetDutyCycle> SampleSink for PwmSink<P> {
    #[inline]
    fn emit(&mut self, sample: u8) {
        let _ = self.pwm.set_duty_cycle_fraction(sample as u16, u8::MAX as u16);
    }
}

// ── Buttons ────────────────────────────────────────────────────────────────

/// Four push buttons wired to ground with pull-ups (pressed reads low).
pub struct ButtonPins<R, P, S, F> {
    record: R,
    play: P,
    stop: S,
    fast: F,
}

impl<R, P, S, F> ButtonPins<R, P, S, F>
where
    R: InputPin,
    P: InputPin,
    S: InputPin,
    F: InputPin,
{
    pub fn new(record: R, play: P, stop: S, fast: F) -> Self {
        ButtonPins {
            record,
            play,
            stop,
            fast,
        }
    }
}

impl<R, P, S, F> ControlInputs for ButtonPins<R, P, S, F>
where
    R: InputPin,
    P: InputPin,
    S: InputPin,
    F: InputPin,
{
    fn sample(&mut self) -> ControlLevels {
        ControlLevels {
            record: self.record.is_low().unwrap_or(false),
            play: self.play.is_low().unwrap_or(false),
            stop: self.stop.is_low().unwrap_or(false),
            fast: self.fast.is_low().unwrap_or(false),
        }
    }
}

// ── LEDs ───────────────────────────────────────────────────────────────────

/// One LED per state plus a fast-playback LED, lit while active.
pub struct StatusLeds<S, R, P, F> {
    stopped: S,
    recording: R,
    playing: P,
    fast: F,
}

impl<S, R, P, F> StatusLeds<S, R, P, F>
where
    S: OutputPin,
    R: OutputPin,
    P: OutputPin,
    F: OutputPin,
{
    pub fn new(stopped: S, recording: R, playing: P, fast: F) -> Self {
        StatusLeds {
            stopped,
            recording,
            playing,
            fast,
        }
    }
}

impl<S, R, P, F> Indicators for StatusLeds<S, R, P, F>
where
    S: OutputPin,
    R: OutputPin,
    P: OutputPin,
    F: OutputPin,
{
    fn show(&mut self, state: State, fast: bool) {
        let _ = self
            .stopped
            .set_state(PinState::from(state == State::Stopped));
        let _ = self
            .recording
            .set_state(PinState::from(state == State::Recording));
        let _ = self
            .playing
            .set_state(PinState::from(state == State::Playing));
        let _ = self
            .fast
            .set_state(PinState::from(state == State::Playing && fast));
    }
}
