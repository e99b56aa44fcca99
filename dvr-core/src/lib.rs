//! # dvr-core
//!
//! A `no_std`, zero-allocation core for a single-channel digital voice
//! recorder: 8-bit samples are captured at a fixed rate, staged in a paged
//! RAM buffer, written to a storage medium as a WAVE stream and later played
//! back through a PWM output.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Memory | [`buffer`] | Paged circular buffer shared by ISR and foreground |
//! | Signals | [`session`] | Atomic flags, page budget, clock mode, state byte |
//! | Tick | [`clock`] / [`io`] | Sample ISR body and its source/sink ports |
//! | Storage | [`storage`] | `Medium` port and WAVE stream bridge |
//! | Control | [`recorder`] / [`control`] | State machine, buttons, indicators |
//! | Board | [`hal`] | `embedded-hal` pin and PWM bindings (feature-gated) |
//!
//! ## Wiring
//!
//! ```ignore
//! use dvr_core::{DvrBuffer, PageBuffer, Recorder, RecorderConfig, SampleClock, SessionSignals};
//!
//! static SIGNALS: SessionSignals = SessionSignals::new();
//! static BUFFER: DvrBuffer<'static> = PageBuffer::new(&SIGNALS);
//!
//! // Sample timer ISR (15 625 Hz recording, 31 250 Hz playback):
//! fn on_tick(clock: &mut SampleClock, adc: &mut Adc, pwm: &mut PwmSink<Ch>) {
//!     clock.tick(&SIGNALS, &BUFFER, adc, pwm);
//! }
//!
//! // Foreground:
//! let mut recorder = Recorder::new(&BUFFER, sd_file, RecorderConfig::new(), serial)?
//!     .with_indicators(leds);
//! recorder.run(buttons);
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `hal` | yes | [`hal`] bindings over `embedded-hal` 1.0 |
//! | `defmt` | no | Log through `defmt` |
//! | `tracing` | no | Log through `tracing` (host simulation) |
//!
//! ## Audio parameters
//!
//! - **Sample rate:** 15 625 Hz ([`constants::SAMPLE_RATE_HZ`])
//! - **Sample format:** `u8` (unsigned 8-bit, mono, silence at `0x80`)
//! - **Page size:** 512 bytes ([`constants::PAGE_SIZE`])
//! - **Buffer:** 1 024 bytes, two pages ([`constants::BUFFER_SIZE`])
//! - **Session length:** 900 pages, about 29.5 s ([`constants::MAX_RECORD_PAGES`])

#![no_std]

#[cfg(test)]
extern crate std;

#[macro_use]
mod log;

pub mod buffer;
pub mod clock;
pub mod config;
pub mod constants;
pub mod control;
pub mod error;
pub mod io;
pub mod recorder;
pub mod session;
pub mod storage;

#[cfg(feature = "hal")]
pub mod hal;

#[cfg(test)]
mod test_support;


pub use buffer::{PageBuffer, PageEvents, PageRead, PageWrite};
pub use clock::{SampleClock, ServiceEvents, ServiceTimer};
pub use config::{RecorderConfig, StopMode};
pub use control::{ControlEdges, ControlInputs, ControlLevels, Indicators};
pub use error::{ConfigError, Error};
pub use io::{SampleSink, SampleSource};
pub use recorder::{Recorder, Silent};
pub use session::{ClockMode, SessionSignals, State};
pub use storage::{Medium, StorageBridge};

/// Page buffer with the reference board's geometry.
pub type DvrBuffer<'a> =
    PageBuffer<'a, SessionSignals, { constants::BUFFER_SIZE }, { constants::PAGE_SIZE }>;
