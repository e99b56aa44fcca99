//! Session configuration.
//!
//! Buffer geometry is fixed at compile time through the const parameters of
//! [`PageBuffer`](crate::buffer::PageBuffer); everything that may vary per
//! board lives in [`RecorderConfig`].

use crate::constants::{FAST_RATE_DIVISOR, MAX_RECORD_PAGES, NORMAL_RATE_DIVISOR, SAMPLE_RATE_HZ};
use crate::error::ConfigError;

/// What a stop edge does to a recording in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopMode {
    /// Keep sampling until the current page is complete, then finalize.
    #[default]
    Drain,
    /// Halt the producer at once and flush the partial page.
    Immediate,
}

/// Runtime parameters of the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RecorderConfig {
    /// Sample rate written to the WAVE header, in Hz.
    pub sample_rate: u32,
    /// Maximum recording length in pages.
    pub page_budget: u16,
    /// Output ticks per sample during normal playback.
    pub normal_divisor: u8,
    /// Output ticks per sample while fast-forwarding.
    pub fast_divisor: u8,
    /// Record stop policy.
    pub stop_mode: StopMode,
}

impl RecorderConfig {
    pub const fn new() -> Self {
        RecorderConfig {
            sample_rate: SAMPLE_RATE_HZ,
            page_budget: MAX_RECORD_PAGES,
            normal_divisor: NORMAL_RATE_DIVISOR,
            fast_divisor: FAST_RATE_DIVISOR,
            stop_mode: StopMode::Drain,
        }
    }

    pub const fn with_sample_rate(mut self, hz: u32) -> Self {
        self.sample_rate = hz;
        self
    }

    pub const fn with_page_budget(mut self, pages: u16) -> Self {
        self.page_budget = pages;
        self
    }

    pub const fn with_divisors(mut self, normal: u8, fast: u8) -> Self {
        self.normal_divisor = normal;
        self.fast_divisor = fast;
        self
    }

    pub const fn with_stop_mode(mut self, mode: StopMode) -> Self {
        self.stop_mode = mode;
        self
    }

    /// Rate of the output tick that [`SampleClock`](crate::clock::SampleClock)
    /// expects during playback, in Hz.
    pub const fn playback_tick_hz(&self) -> u32 {
        self.sample_rate * self.normal_divisor as u32
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if self.page_budget == 0 {
            return Err(ConfigError::ZeroPageBudget);
        }
        if self.normal_divisor == 0 || self.fast_divisor == 0 {
            return Err(ConfigError::ZeroDivisor);
        }
        if self.fast_divisor >= self.normal_divisor {
            return Err(ConfigError::FastNotFaster);
        }
        Ok(())
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self::new()
    }
}
