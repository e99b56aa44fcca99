//! Error types for the recorder core.
//!
//! Interrupt-context operations ([`PageBuffer::enqueue`], [`PageBuffer::dequeue`],
//! [`SampleClock::tick`]) never fail visibly. Everything in this module surfaces
//! in the foreground loop, at block-transfer time or at session start.
//!
//! [`PageBuffer::enqueue`]: crate::buffer::PageBuffer::enqueue
//! [`PageBuffer::dequeue`]: crate::buffer::PageBuffer::dequeue
//! [`SampleClock::tick`]: crate::clock::SampleClock::tick

/// Failure of a record or playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The medium has no room for the stream header or another block.
    #[error("storage full")]
    StorageFull,
    /// No stream exists to play back.
    #[error("recording not found")]
    NotFound,
    /// The stored stream is not 8-bit mono PCM WAVE data.
    #[error("malformed WAVE header")]
    MalformedHeader,
    /// The medium reported a transfer failure.
    #[error("storage I/O error")]
    Io,
    /// The producer caught up with unsaved data. Indicates a logic defect.
    #[error("page buffer overrun")]
    BufferOverrun,
}

/// Rejected [`RecorderConfig`](crate::config::RecorderConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    #[error("sample rate must be non-zero")]
    ZeroSampleRate,
    #[error("page budget must be at least one page")]
    ZeroPageBudget,
    #[error("rate divisors must be non-zero")]
    ZeroDivisor,
    #[error("fast divisor must be smaller than the normal divisor")]
    FastNotFaster,
}
