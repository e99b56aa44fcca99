/// Audio sample rate in Hz (16 MHz clock, /8 prescaler, compare at 128).
pub const SAMPLE_RATE_HZ: u32 = 15_625;

/// Bytes per page: the unit of transfer between RAM and storage.
pub const PAGE_SIZE: usize = 512;

/// Total page buffer capacity in bytes (two pages, double-buffered).
pub const BUFFER_SIZE: usize = 1024;

/// Default session length in pages (~29.5 s at [`SAMPLE_RATE_HZ`]).
pub const MAX_RECORD_PAGES: u16 = 900;

/// Output ticks per emitted sample at normal speed.
///
/// The output timer overflows at twice the sample rate, so every second tick
/// pulls a new sample.
pub const NORMAL_RATE_DIVISOR: u8 = 2;

/// Output ticks per emitted sample while fast-forwarding.
pub const FAST_RATE_DIVISOR: u8 = 1;

/// Mid-scale value of an unsigned 8-bit sample.
pub const SILENCE: u8 = 0x80;

/// Size of the canonical PCM WAVE header in bytes.
pub const WAVE_HEADER_LEN: usize = 44;

/// Sample ticks between storage-layer housekeeping calls (~10 ms).
pub const STORAGE_SERVICE_TICKS: u8 = 156;

/// Sample ticks between heartbeat toggles (~500 ms).
pub const HEARTBEAT_TICKS: u16 = 7_813;
