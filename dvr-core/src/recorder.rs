//! Record/playback state machine.
//!
//! [`Recorder`] is the foreground half of the recorder. Each call to
//! [`poll()`](Recorder::poll) samples the control edges, services at most one
//! page transfer and returns immediately, so the loop stays responsive while
//! the sample interrupt keeps filling or draining the [`PageBuffer`].
//!
//! ```text
//!              record edge                       play edge
//!   Recording ◄──────────── Stopped ────────────► Playing
//!       │                   ▲     ▲                   │
//!       └── budget / stop ──┘     └── end / stop ─────┘
//!           / I/O error              / I/O error
//! ```
//!
//! The current state lives in [`SessionSignals`] as a byte so indicators in
//! any context can read it; a byte that decodes to no state forces `Stopped`.

use core::fmt::{self, Write};

use crate::buffer::PageBuffer;
use crate::config::{RecorderConfig, StopMode};
use crate::control::{ControlEdges, ControlInputs, ControlLevels, EdgeDetector, Indicators};
use crate::error::{ConfigError, Error};
use crate::session::{ClockMode, SessionSignals, State};
use crate::storage::{Medium, StorageBridge};

/// Diagnostics sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Write for Silent {
    fn write_str(&mut self, _s: &str) -> fmt::Result {
        Ok(())
    }
}

/// Pages needed to play `len` payload bytes, saturated to the budget type.
///
/// Computed in `u32`: the payload length does not fit a 16-bit `usize`.
fn playback_pages(len: u32, page_size: usize) -> u16 {
    let page = u32::try_from(page_size).unwrap_or(u32::MAX);
    u16::try_from(len.div_ceil(page)).unwrap_or(u16::MAX)
}

/// Foreground controller for record and playback sessions.
///
/// # Type Parameters
///
/// - `M`: stream [`Medium`].
/// - `D`: diagnostics sink (serial console); write errors are ignored.
/// - `C`, `P`: buffer capacity and page size, as on [`PageBuffer`].
/// - `I`: status [`Indicators`], `()` for none.
pub struct Recorder<'a, M, D, const C: usize, const P: usize, I = ()> {
    buffer: &'a PageBuffer<'a, SessionSignals, C, P>,
    signals: &'a SessionSignals,
    bridge: StorageBridge<M>,
    config: RecorderConfig,
    diag: D,
    indicators: I,
    edges: EdgeDetector,
    fast: bool,
    pages_transferred: u16,
}

impl<'a, M, D, const C: usize, const P: usize> Recorder<'a, M, D, C, P>
where
    M: Medium,
    D: Write,
{
    /// Build a stopped recorder around `buffer` and the stream on `medium`.
    ///
    /// The session signals are the buffer's page listener, shared with the
    /// sample interrupt.
    pub fn new(
        buffer: &'a PageBuffer<'a, SessionSignals, C, P>,
        medium: M,
        config: RecorderConfig,
        diag: D,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let signals = buffer.events();
        signals.set_mode(ClockMode::Idle);
        signals.set_divisor(config.normal_divisor);
        signals.publish_state(State::Stopped);

        Ok(Recorder {
            buffer,
            signals,
            bridge: StorageBridge::new(medium, config.sample_rate),
            config,
            diag,
            indicators: (),
            edges: EdgeDetector::new(),
            fast: false,
            pages_transferred: 0,
        })
    }

    /// Attach status indicators.
    pub fn with_indicators<J: Indicators>(self, indicators: J) -> Recorder<'a, M, D, C, P, J> {
        Recorder {
            buffer: self.buffer,
            signals: self.signals,
            bridge: self.bridge,
            config: self.config,
            diag: self.diag,
            indicators,
            edges: self.edges,
            fast: self.fast,
            pages_transferred: self.pages_transferred,
        }
    }
}

impl<'a, M, D, I, const C: usize, const P: usize> Recorder<'a, M, D, C, P, I>
where
    M: Medium,
    D: Write,
    I: Indicators,
{
    /// Current state; a corrupt state byte reads as `Stopped`.
    pub fn state(&self) -> State {
        self.signals.state().unwrap_or(State::Stopped)
    }

    pub fn is_fast(&self) -> bool {
        self.fast
    }

    /// Pages moved between buffer and medium in the current or last session.
    pub fn pages_transferred(&self) -> u16 {
        self.pages_transferred
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    pub fn storage(&self) -> &StorageBridge<M> {
        &self.bridge
    }

    pub fn diagnostics(&self) -> &D {
        &self.diag
    }

    /// Run the foreground loop forever.
    pub fn run<K: ControlInputs>(&mut self, mut inputs: K) -> ! {
        loop {
            let levels = inputs.sample();
            self.poll(levels);
        }
    }

    /// One foreground iteration. Returns the state after it.
    pub fn poll(&mut self, levels: ControlLevels) -> State {
        let edges = self.edges.update(levels);

        match self.signals.state() {
            Some(State::Stopped) => self.stopped(edges),
            Some(State::Recording) => self.recording(edges),
            Some(State::Playing) => self.playing(edges),
            None => {
                let bits = self.signals.state_bits();
                error!("invalid state byte {}", bits);
                let _ = writeln!(self.diag, "invalid state {:#04x}, stopping", bits);
                self.halt();
            }
        }

        let state = self.state();
        self.indicators.show(state, self.fast);
        state
    }

    // ── Stopped ───────────────────────────────────────────────────────

    fn stopped(&mut self, edges: ControlEdges) {
        if edges.play {
            self.start_play();
        } else if edges.record {
            self.start_record();
        }
    }

    fn start_record(&mut self) {
        self.signals.set_mode(ClockMode::Idle);
        self.buffer.reset();
        self.signals.begin(self.config.page_budget);
        self.pages_transferred = 0;

        if let Err(err) = self.bridge.create_stream() {
            warn!("cannot create stream: {}", err);
            let _ = writeln!(self.diag, "record failed: {}", err);
            return;
        }

        info!("recording, budget {} pages", self.config.page_budget);
        let _ = writeln!(self.diag, "Start Recording...");
        self.signals.publish_state(State::Recording);
        self.signals.set_mode(ClockMode::Recording);
    }

    fn start_play(&mut self) {
        self.signals.set_mode(ClockMode::Idle);
        self.buffer.reset();
        self.pages_transferred = 0;

        let len = match self.bridge.open_stream() {
            Ok(len) => len,
            Err(err) => {
                warn!("cannot open stream: {}", err);
                let _ = writeln!(self.diag, "play failed: {}", err);
                return;
            }
        };

        let pages = playback_pages(len, P);
        if pages == 0 {
            let _ = writeln!(self.diag, "recording is empty");
            self.bridge.abort_stream();
            return;
        }
        self.signals.begin(pages);

        // fill every slot so the consumer starts a full buffer ahead
        for _ in 0..(pages as usize).min(C / P) {
            if let Err(err) = self.load_page() {
                self.abort(err);
                return;
            }
        }

        self.fast = false;
        self.signals.set_divisor(self.config.normal_divisor);
        info!("playing {} bytes", len);
        let _ = writeln!(self.diag, "Begin Playback...");
        self.signals.publish_state(State::Playing);
        self.signals.set_mode(ClockMode::Playing);
    }

    // ── Recording ─────────────────────────────────────────────────────

    fn recording(&mut self, edges: ControlEdges) {
        if self.buffer.overrun() {
            self.abort(Error::BufferOverrun);
            return;
        }

        if edges.stop {
            match self.config.stop_mode {
                StopMode::Drain => self.signals.request_last_page(),
                StopMode::Immediate => {
                    self.finish_recording();
                    return;
                }
            }
        }

        if self.signals.take_page_ready() {
            if let Err(err) = self.save_page() {
                self.abort(err);
                return;
            }
            if self.buffer.readable_pages() > 0 {
                self.signals.rearm_page_ready();
            }
        } else if self.signals.take_session_complete() {
            self.finish_recording();
        }
    }

    /// Move the oldest full page to the stream.
    fn save_page(&mut self) -> Result<(), Error> {
        let buffer = self.buffer;
        let Some(page) = buffer.read_page() else {
            return Ok(());
        };
        self.bridge.write_block(&page)?;
        drop(page);
        self.pages_transferred = self.pages_transferred.saturating_add(1);
        Ok(())
    }

    /// Halt the producer, flush what it left behind and finalize the stream.
    fn finish_recording(&mut self) {
        self.signals.set_mode(ClockMode::Idle);
        if self.buffer.overrun() {
            self.abort(Error::BufferOverrun);
            return;
        }

        let flushed = self.flush_remaining();
        if let Err(err) = flushed {
            self.abort(err);
            return;
        }
        let bytes = self.bridge.data_len().unwrap_or(0);
        if let Err(err) = self.bridge.close_stream() {
            self.abort(err);
            return;
        }

        info!("recorded {} bytes", bytes);
        let _ = writeln!(self.diag, "completed recording ({} bytes)", bytes);
        self.signals.publish_state(State::Stopped);
    }

    fn flush_remaining(&mut self) -> Result<(), Error> {
        while self.buffer.readable_pages() > 0 {
            self.save_page()?;
        }
        let buffer = self.buffer;
        if let Some(tail) = buffer.read_tail() {
            self.bridge.write_block(&tail)?;
        }
        Ok(())
    }

    // ── Playing ───────────────────────────────────────────────────────

    fn playing(&mut self, edges: ControlEdges) {
        if edges.fast {
            self.fast = !self.fast;
            let divisor = if self.fast {
                self.config.fast_divisor
            } else {
                self.config.normal_divisor
            };
            self.signals.set_divisor(divisor);
            debug!("playback divisor {}", divisor);
        }

        if edges.stop || self.signals.take_session_complete() {
            self.finish_playing();
            return;
        }

        if self.signals.take_page_ready() {
            if let Err(err) = self.load_page() {
                self.abort(err);
                return;
            }
            if self.buffer.writable_pages() > 0 {
                self.signals.rearm_page_ready();
            }
        }
    }

    /// Refill the next free page from the stream.
    fn load_page(&mut self) -> Result<(), Error> {
        let buffer = self.buffer;
        let Some(mut page) = buffer.write_page() else {
            return Ok(());
        };
        self.bridge.read_block(&mut page)?;
        drop(page);
        self.pages_transferred = self.pages_transferred.saturating_add(1);
        Ok(())
    }

    fn finish_playing(&mut self) {
        self.signals.set_mode(ClockMode::Idle);
        let underruns = self.buffer.underruns();
        let closed = self.bridge.close_stream();
        self.reset_rate();
        self.signals.publish_state(State::Stopped);

        match closed {
            Ok(()) => {
                info!("playback done, {} underruns", underruns);
                let _ = writeln!(self.diag, "completed playback ({} underruns)", underruns);
            }
            Err(err) => {
                warn!("close after playback failed: {}", err);
                let _ = writeln!(self.diag, "completed playback, close failed: {}", err);
            }
        }
    }

    // ── Shared ────────────────────────────────────────────────────────

    fn reset_rate(&mut self) {
        self.fast = false;
        self.signals.set_divisor(self.config.normal_divisor);
    }

    /// Stop the tick source, drop the stream and return to `Stopped`.
    fn halt(&mut self) {
        self.signals.set_mode(ClockMode::Idle);
        self.bridge.abort_stream();
        self.reset_rate();
        self.signals.publish_state(State::Stopped);
    }

    fn abort(&mut self, err: Error) {
        self.halt();
        error!("session aborted: {}", err);
        let _ = writeln!(self.diag, "aborted: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SampleClock;
    use crate::constants::{MAX_RECORD_PAGES, PAGE_SIZE, WAVE_HEADER_LEN};
    use crate::test_support::{MemoryMedium, Ramp, Tape, Transcript};

    const C: usize = 32;
    const P: usize = 8;

    type TestRecorder<'a> = Recorder<'a, MemoryMedium, Transcript, C, P>;

    fn press_record() -> ControlLevels {
        ControlLevels {
            record: true,
            ..Default::default()
        }
    }

    fn press_play() -> ControlLevels {
        ControlLevels {
            play: true,
            ..Default::default()
        }
    }

    fn press_stop() -> ControlLevels {
        ControlLevels {
            stop: true,
            ..Default::default()
        }
    }

    fn press_fast() -> ControlLevels {
        ControlLevels {
            fast: true,
            ..Default::default()
        }
    }

    fn idle() -> ControlLevels {
        ControlLevels::default()
    }

    /// Run `ticks` sample ticks, polling the recorder after each one.
    fn run_ticks(
        rec: &mut TestRecorder<'_>,
        buffer: &PageBuffer<'_, SessionSignals, C, P>,
        signals: &SessionSignals,
        clock: &mut SampleClock,
        src: &mut Ramp,
        out: &mut Tape,
        ticks: usize,
    ) {
        for _ in 0..ticks {
            clock.tick(signals, buffer, src, out);
            rec.poll(idle());
        }
    }

    fn le_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    #[test]
    fn rejects_invalid_config() {
        let signals = SessionSignals::new();
        let buffer: PageBuffer<'_, _, C, P> = PageBuffer::new(&signals);
        let cfg = RecorderConfig::new().with_page_budget(0);
        assert!(matches!(
            Recorder::new(&buffer, MemoryMedium::new(), cfg, Silent),
            Err(ConfigError::ZeroPageBudget)
        ));
    }

    #[test]
    fn budget_bounds_recording() {
        let signals = SessionSignals::new();
        let buffer = PageBuffer::new(&signals);
        let cfg = RecorderConfig::new().with_page_budget(3);
        let mut rec: TestRecorder<'_> =
            Recorder::new(&buffer, MemoryMedium::new(), cfg, Transcript::default()).unwrap();
        let mut clock = SampleClock::new();
        let mut src = Ramp(0);
        let mut out = Tape::default();

        assert_eq!(rec.poll(press_record()), State::Recording);
        assert_eq!(signals.mode(), ClockMode::Recording);
        run_ticks(&mut rec, &buffer, &signals, &mut clock, &mut src, &mut out, 40);

        assert_eq!(rec.state(), State::Stopped);
        assert_eq!(signals.mode(), ClockMode::Idle);
        let file = rec.storage().medium().contents().unwrap();
        assert_eq!(le_u32(file, 40), 3 * P as u32);
        assert_eq!(file.len(), WAVE_HEADER_LEN + 3 * P);
        let expected: std::vec::Vec<u8> = (0..3 * P as u8).collect();
        assert_eq!(&file[WAVE_HEADER_LEN..], &expected[..]);
        assert!(rec.diagnostics().0.contains("completed recording"));
    }

    #[test]
    fn drain_stop_finishes_current_page() {
        let signals = SessionSignals::new();
        let buffer = PageBuffer::new(&signals);
        let mut rec: TestRecorder<'_> = Recorder::new(
            &buffer,
            MemoryMedium::new(),
            RecorderConfig::new(),
            Transcript::default(),
        )
        .unwrap();
        let mut clock = SampleClock::new();
        let mut src = Ramp(0);
        let mut out = Tape::default();

        rec.poll(press_record());
        rec.poll(idle());
        // two full pages and 3 bytes into the third
        run_ticks(&mut rec, &buffer, &signals, &mut clock, &mut src, &mut out, 2 * P + 3);
        assert_eq!(rec.state(), State::Recording);

        rec.poll(press_stop());
        run_ticks(&mut rec, &buffer, &signals, &mut clock, &mut src, &mut out, 2 * P);

        assert_eq!(rec.state(), State::Stopped);
        let file = rec.storage().medium().contents().unwrap();
        assert_eq!(le_u32(file, 40), 3 * P as u32);
        assert_eq!(file.len(), WAVE_HEADER_LEN + 3 * P);
    }

    #[test]
    fn immediate_stop_keeps_partial_page() {
        let signals = SessionSignals::new();
        let buffer = PageBuffer::new(&signals);
        let cfg = RecorderConfig::new().with_stop_mode(StopMode::Immediate);
        let mut rec: TestRecorder<'_> =
            Recorder::new(&buffer, MemoryMedium::new(), cfg, Transcript::default()).unwrap();
        let mut clock = SampleClock::new();
        let mut src = Ramp(0);
        let mut out = Tape::default();

        rec.poll(press_record());
        run_ticks(&mut rec, &buffer, &signals, &mut clock, &mut src, &mut out, 2 * P + 5);
        assert_eq!(rec.poll(press_stop()), State::Stopped);

        // ticks after the stop record nothing
        clock.tick(&signals, &buffer, &mut src, &mut out);
        let file = rec.storage().medium().contents().unwrap();
        let k_p_m = 2 * P + 5;
        assert_eq!(le_u32(file, 40), k_p_m as u32);
        assert_eq!(le_u32(file, 4), 36 + k_p_m as u32);
        assert_eq!(file.len(), WAVE_HEADER_LEN + k_p_m);
        assert_eq!(file[WAVE_HEADER_LEN + k_p_m - 1], (k_p_m - 1) as u8);
    }

    #[test]
    fn no_transfer_before_page_ready() {
        let signals = SessionSignals::new();
        let buffer = PageBuffer::new(&signals);
        let mut rec: TestRecorder<'_> = Recorder::new(
            &buffer,
            MemoryMedium::new(),
            RecorderConfig::new(),
            Transcript::default(),
        )
        .unwrap();
        let mut clock = SampleClock::new();
        let mut src = Ramp(0);
        let mut out = Tape::default();

        rec.poll(press_record());
        run_ticks(&mut rec, &buffer, &signals, &mut clock, &mut src, &mut out, P - 1);
        assert_eq!(rec.storage().data_len(), Some(0));
        assert_eq!(rec.pages_transferred(), 0);

        run_ticks(&mut rec, &buffer, &signals, &mut clock, &mut src, &mut out, 1);
        assert_eq!(rec.storage().data_len(), Some(P as u32));
        assert_eq!(rec.pages_transferred(), 1);
    }

    #[test]
    fn playback_budget_in_full_width() {
        let full_session = MAX_RECORD_PAGES as u32 * PAGE_SIZE as u32;
        assert_eq!(full_session, 460_800);
        assert_eq!(playback_pages(full_session, PAGE_SIZE), MAX_RECORD_PAGES);
        assert_eq!(playback_pages(full_session + 1, PAGE_SIZE), MAX_RECORD_PAGES + 1);
        assert_eq!(playback_pages(0, PAGE_SIZE), 0);
        assert_eq!(playback_pages(1, PAGE_SIZE), 1);
        assert_eq!(playback_pages(u32::MAX, PAGE_SIZE), u16::MAX);
    }

    #[test]
    fn playback_refills_only_after_page_empty() {
        let signals = SessionSignals::new();
        let buffer = PageBuffer::new(&signals);
        let mut medium = MemoryMedium::new();
        let mut file = crate::storage::wave::WaveHeader::new(15_625, 10 * P as u32)
            .encode()
            .to_vec();
        file.extend((0..10 * P).map(|n| n as u8));
        medium.install(&file);
        let mut rec: TestRecorder<'_> =
            Recorder::new(&buffer, medium, RecorderConfig::new(), Transcript::default()).unwrap();
        let mut clock = SampleClock::new();
        let mut src = Ramp(0);
        let mut out = Tape::default();

        assert_eq!(rec.poll(press_play()), State::Playing);
        let primed = (C / P) as u16;
        assert_eq!(rec.pages_transferred(), primed);

        // no ticks: nothing was drained, nothing to refill
        for _ in 0..5 {
            rec.poll(idle());
        }
        assert_eq!(rec.pages_transferred(), primed);

        // normal rate takes two ticks per sample; stop one sample short
        run_ticks(&mut rec, &buffer, &signals, &mut clock, &mut src, &mut out, 2 * (P - 1));
        assert_eq!(rec.pages_transferred(), primed);
        assert_eq!(buffer.writable_pages(), 0);

        run_ticks(&mut rec, &buffer, &signals, &mut clock, &mut src, &mut out, 2);
        assert_eq!(rec.pages_transferred(), primed + 1);
        assert_eq!(buffer.len(), C);
    }

    #[test]
    fn backlog_is_serviced_one_page_per_poll() {
        let signals = SessionSignals::new();
        let buffer = PageBuffer::new(&signals);
        let mut rec: TestRecorder<'_> = Recorder::new(
            &buffer,
            MemoryMedium::new(),
            RecorderConfig::new(),
            Transcript::default(),
        )
        .unwrap();
        let mut clock = SampleClock::new();
        let mut src = Ramp(0);
        let mut out = Tape::default();

        rec.poll(press_record());
        // storage stalled: three pages land before the loop runs
        for _ in 0..3 * P {
            clock.tick(&signals, &buffer, &mut src, &mut out);
        }
        rec.poll(idle());
        assert_eq!(rec.pages_transferred(), 1);
        rec.poll(idle());
        assert_eq!(rec.pages_transferred(), 2);
        rec.poll(idle());
        assert_eq!(rec.pages_transferred(), 3);
        rec.poll(idle());
        assert_eq!(rec.pages_transferred(), 3);
    }

    #[test]
    fn write_failure_aborts_session() {
        let signals = SessionSignals::new();
        let buffer = PageBuffer::new(&signals);
        let mut medium = MemoryMedium::new();
        // header succeeds, first page fails
        medium.fail_writes_after(1);
        let mut rec: TestRecorder<'_> =
            Recorder::new(&buffer, medium, RecorderConfig::new(), Transcript::default()).unwrap();
        let mut clock = SampleClock::new();
        let mut src = Ramp(0);
        let mut out = Tape::default();

        rec.poll(press_record());
        run_ticks(&mut rec, &buffer, &signals, &mut clock, &mut src, &mut out, P);

        assert_eq!(rec.state(), State::Stopped);
        assert_eq!(signals.mode(), ClockMode::Idle);
        assert!(!rec.storage().is_open());
        assert!(rec.diagnostics().0.contains("aborted: storage I/O error"));
    }

    #[test]
    fn full_medium_aborts_recording() {
        let signals = SessionSignals::new();
        let buffer = PageBuffer::new(&signals);
        let mut medium = MemoryMedium::new();
        medium.set_capacity(WAVE_HEADER_LEN + P + 2);
        let mut rec: TestRecorder<'_> =
            Recorder::new(&buffer, medium, RecorderConfig::new(), Transcript::default()).unwrap();
        let mut clock = SampleClock::new();
        let mut src = Ramp(0);
        let mut out = Tape::default();

        rec.poll(press_record());
        run_ticks(&mut rec, &buffer, &signals, &mut clock, &mut src, &mut out, 2 * P);

        assert_eq!(rec.state(), State::Stopped);
        assert!(rec.diagnostics().0.contains("aborted: storage full"));
        let file = rec.storage().medium().contents().unwrap();
        assert_eq!(le_u32(file, 40), (P + 2) as u32);
    }

    #[test]
    fn create_failure_stays_stopped() {
        let signals = SessionSignals::new();
        let buffer = PageBuffer::new(&signals);
        let mut medium = MemoryMedium::new();
        medium.set_capacity(10);
        let mut rec: TestRecorder<'_> =
            Recorder::new(&buffer, medium, RecorderConfig::new(), Transcript::default()).unwrap();

        assert_eq!(rec.poll(press_record()), State::Stopped);
        assert_eq!(signals.mode(), ClockMode::Idle);
        assert!(rec.diagnostics().0.contains("record failed: storage full"));
    }

    #[test]
    fn play_without_recording() {
        let signals = SessionSignals::new();
        let buffer = PageBuffer::new(&signals);
        let mut rec: TestRecorder<'_> = Recorder::new(
            &buffer,
            MemoryMedium::new(),
            RecorderConfig::new(),
            Transcript::default(),
        )
        .unwrap();

        assert_eq!(rec.poll(press_play()), State::Stopped);
        assert!(rec.diagnostics().0.contains("recording not found"));
    }

    #[test]
    fn play_empty_recording() {
        let signals = SessionSignals::new();
        let buffer = PageBuffer::new(&signals);
        let mut medium = MemoryMedium::new();
        medium.install(&crate::storage::wave::WaveHeader::new(15_625, 0).encode());
        let mut rec: TestRecorder<'_> =
            Recorder::new(&buffer, medium, RecorderConfig::new(), Transcript::default()).unwrap();

        assert_eq!(rec.poll(press_play()), State::Stopped);
        assert!(rec.diagnostics().0.contains("recording is empty"));
        assert!(!rec.storage().is_open());
    }

    #[test]
    fn playback_primes_every_page() {
        let signals = SessionSignals::new();
        let buffer = PageBuffer::new(&signals);
        let mut medium = MemoryMedium::new();
        let mut file = crate::storage::wave::WaveHeader::new(15_625, 10 * P as u32)
            .encode()
            .to_vec();
        file.extend((0..10 * P).map(|n| n as u8));
        medium.install(&file);
        let mut rec: TestRecorder<'_> =
            Recorder::new(&buffer, medium, RecorderConfig::new(), Transcript::default()).unwrap();

        assert_eq!(rec.poll(press_play()), State::Playing);
        assert_eq!(buffer.len(), C);
        assert_eq!(rec.pages_transferred(), (C / P) as u16);
        assert_eq!(signals.pages_remaining(), 10);
        assert_eq!(signals.mode(), ClockMode::Playing);
    }

    #[test]
    fn read_failure_aborts_playback() {
        let signals = SessionSignals::new();
        let buffer = PageBuffer::new(&signals);
        let mut medium = MemoryMedium::new();
        let mut file = crate::storage::wave::WaveHeader::new(15_625, 6 * P as u32)
            .encode()
            .to_vec();
        file.extend(core::iter::repeat(0x40).take(6 * P));
        medium.install(&file);
        // header walk takes four reads, then one primed page
        medium.fail_reads_after(5);
        let mut rec: TestRecorder<'_> =
            Recorder::new(&buffer, medium, RecorderConfig::new(), Transcript::default()).unwrap();

        assert_eq!(rec.poll(press_play()), State::Stopped);
        assert_eq!(signals.mode(), ClockMode::Idle);
        assert!(!rec.storage().is_open());
        assert!(rec.diagnostics().0.contains("aborted: storage I/O error"));
    }

    #[test]
    fn stop_edge_ends_playback_and_resets_rate() {
        let signals = SessionSignals::new();
        let buffer = PageBuffer::new(&signals);
        let mut medium = MemoryMedium::new();
        let mut file = crate::storage::wave::WaveHeader::new(15_625, 8 * P as u32)
            .encode()
            .to_vec();
        file.extend(core::iter::repeat(0x40).take(8 * P));
        medium.install(&file);
        let mut rec: TestRecorder<'_> =
            Recorder::new(&buffer, medium, RecorderConfig::new(), Transcript::default()).unwrap();

        rec.poll(press_play());
        rec.poll(idle());
        rec.poll(press_fast());
        assert!(rec.is_fast());
        assert_eq!(signals.divisor(), 1);

        assert_eq!(rec.poll(press_stop()), State::Stopped);
        assert!(!rec.is_fast());
        assert_eq!(signals.divisor(), 2);
        assert_eq!(signals.mode(), ClockMode::Idle);
        assert!(!rec.storage().is_open());
    }

    #[test]
    fn fast_toggle_only_while_playing() {
        let signals = SessionSignals::new();
        let buffer = PageBuffer::new(&signals);
        let mut rec: TestRecorder<'_> = Recorder::new(
            &buffer,
            MemoryMedium::new(),
            RecorderConfig::new(),
            Transcript::default(),
        )
        .unwrap();

        rec.poll(press_fast());
        assert!(!rec.is_fast());
        assert_eq!(signals.divisor(), 2);
    }

    #[test]
    fn corrupt_state_forces_stopped() {
        let signals = SessionSignals::new();
        let buffer = PageBuffer::new(&signals);
        let mut rec: TestRecorder<'_> = Recorder::new(
            &buffer,
            MemoryMedium::new(),
            RecorderConfig::new(),
            Transcript::default(),
        )
        .unwrap();

        rec.poll(press_record());
        assert_eq!(signals.mode(), ClockMode::Recording);
        signals.publish_state_bits(0x5A);

        assert_eq!(rec.poll(idle()), State::Stopped);
        assert_eq!(signals.state(), Some(State::Stopped));
        assert_eq!(signals.mode(), ClockMode::Idle);
        assert!(!rec.storage().is_open());
        assert!(rec.diagnostics().0.contains("invalid state 0x5a"));
    }

    #[test]
    fn held_record_button_does_not_restart() {
        let signals = SessionSignals::new();
        let buffer = PageBuffer::new(&signals);
        let cfg = RecorderConfig::new().with_page_budget(1);
        let mut rec: TestRecorder<'_> =
            Recorder::new(&buffer, MemoryMedium::new(), cfg, Transcript::default()).unwrap();
        let mut clock = SampleClock::new();
        let mut src = Ramp(0);
        let mut out = Tape::default();

        rec.poll(press_record());
        for _ in 0..P {
            clock.tick(&signals, &buffer, &mut src, &mut out);
        }
        assert_eq!(rec.poll(press_record()), State::Stopped);
        assert_eq!(rec.poll(press_record()), State::Stopped);
        assert_eq!(rec.storage().medium().contents().unwrap().len(), WAVE_HEADER_LEN + P);
    }

    struct Shown<'s>(&'s core::cell::Cell<(State, bool)>);

    impl Indicators for Shown<'_> {
        fn show(&mut self, state: State, fast: bool) {
            self.0.set((state, fast));
        }
    }

    #[test]
    fn indicators_follow_state() {
        let signals = SessionSignals::new();
        let buffer: PageBuffer<'_, _, C, P> = PageBuffer::new(&signals);
        let mut medium = MemoryMedium::new();
        let mut file = crate::storage::wave::WaveHeader::new(15_625, 4 * P as u32)
            .encode()
            .to_vec();
        file.extend(core::iter::repeat(0x40).take(4 * P));
        medium.install(&file);
        let shown = core::cell::Cell::new((State::Recording, true));
        let mut rec = Recorder::new(&buffer, medium, RecorderConfig::new(), Silent)
            .unwrap()
            .with_indicators(Shown(&shown));

        rec.poll(idle());
        assert_eq!(shown.get(), (State::Stopped, false));
        rec.poll(press_play());
        assert_eq!(shown.get(), (State::Playing, false));
        rec.poll(press_fast());
        assert_eq!(shown.get(), (State::Playing, true));
        rec.poll(press_stop());
        assert_eq!(shown.get(), (State::Stopped, false));
    }

    #[test]
    fn overrun_aborts_recording() {
        let signals = SessionSignals::new();
        let buffer = PageBuffer::new(&signals);
        let mut rec: TestRecorder<'_> = Recorder::new(
            &buffer,
            MemoryMedium::new(),
            RecorderConfig::new(),
            Transcript::default(),
        )
        .unwrap();
        let mut clock = SampleClock::new();
        let mut src = Ramp(0);
        let mut out = Tape::default();

        rec.poll(press_record());
        // foreground starved for more than a buffer's worth of samples
        for _ in 0..C + 1 {
            clock.tick(&signals, &buffer, &mut src, &mut out);
        }
        assert!(buffer.overrun());
        assert_eq!(rec.poll(idle()), State::Stopped);
        assert!(rec.diagnostics().0.contains("aborted: page buffer overrun"));
    }
}
