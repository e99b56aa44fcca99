//! Sample-rate tick handling.
//!
//! [`SampleClock::tick`] is the body of the sample interrupt. It owns no
//! buffer state: it reads the session mode and rate divisor from
//! [`SessionSignals`] and moves one byte through the [`PageBuffer`].
//!
//! ```text
//!   Recording:  source.acquire() ──► buffer.enqueue()
//!   Playing:    buffer.dequeue() ──► sink.emit()        (every Nth tick)
//! ```
//!
//! [`ServiceTimer`] divides the same tick into the slower housekeeping
//! events of the storage layer and the heartbeat LED.

use crate::buffer::{PageBuffer, PageEvents};
use crate::constants::{HEARTBEAT_TICKS, SILENCE, STORAGE_SERVICE_TICKS};
use crate::io::{SampleSink, SampleSource};
use crate::session::{ClockMode, SessionSignals};

/// Per-interrupt state of the sample tick.
///
/// During playback the output tick runs faster than the sample rate; one tick
/// in every [`divisor`](SessionSignals::divisor) pulls a new sample and the
/// others repeat the held value.
pub struct SampleClock {
    ticks: u8,
    held: u8,
}

impl SampleClock {
    pub const fn new() -> Self {
        SampleClock {
            ticks: 0,
            held: SILENCE,
        }
    }

    /// Last value sent to the sink.
    pub fn held(&self) -> u8 {
        self.held
    }

    /// Handle one timer tick. Constant time, no blocking I/O.
    pub fn tick<E, S, K, const C: usize, const P: usize>(
        &mut self,
        signals: &SessionSignals,
        buffer: &PageBuffer<'_, E, C, P>,
        source: &mut S,
        sink: &mut K,
    ) where
        E: PageEvents,
        S: SampleSource,
        K: SampleSink,
    {
        match signals.mode() {
            ClockMode::Idle => {
                self.ticks = 0;
                self.held = SILENCE;
            }
            ClockMode::Recording => {
                buffer.enqueue(source.acquire());
            }
            ClockMode::Playing => {
                self.ticks = self.ticks.saturating_add(1);
                // `>=` so a divisor lowered mid-count takes effect immediately
                if self.ticks >= signals.divisor() {
                    self.ticks = 0;
                    self.held = buffer.dequeue();
                }
                sink.emit(self.held);
            }
        }
    }
}

impl Default for SampleClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Housekeeping events due on a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServiceEvents {
    /// Run the storage layer's timer procedure (~10 ms).
    pub storage_service: bool,
    /// Toggle the heartbeat LED (~500 ms).
    pub heartbeat: bool,
}

/// Down-counters deriving slow periodic events from the sample tick.
pub struct ServiceTimer {
    storage: u8,
    heartbeat: u16,
}

impl ServiceTimer {
    pub const fn new() -> Self {
        ServiceTimer {
            storage: STORAGE_SERVICE_TICKS,
            heartbeat: HEARTBEAT_TICKS,
        }
    }

    pub fn tick(&mut self) -> ServiceEvents {
        let mut events = ServiceEvents::default();

        self.storage -= 1;
        if self.storage == 0 {
            self.storage = STORAGE_SERVICE_TICKS;
            events.storage_service = true;
        }

        self.heartbeat -= 1;
        if self.heartbeat == 0 {
            self.heartbeat = HEARTBEAT_TICKS;
            events.heartbeat = true;
        }
        events
    }
}

impl Default for ServiceTimer {
    fn default() -> Self {
        Self::new()
    }
}
