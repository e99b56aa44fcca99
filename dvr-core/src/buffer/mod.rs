//! Page-structured circular sample buffer.
//!
//! [`PageBuffer`] stages 8-bit samples between the sample-rate interrupt and
//! the foreground storage loop. Interrupt code moves single bytes with
//! [`enqueue()`](PageBuffer::enqueue) / [`dequeue()`](PageBuffer::dequeue);
//! the foreground moves whole pages through [`PageRead`] / [`PageWrite`]
//! handles.
//!
//! ```text
//!  recording:  ADC ISR ──enqueue──► [ page 0 | page 1 ] ──read_page──► storage
//!  playback:   storage ──write_page──► [ page 0 | page 1 ] ──dequeue──► PWM ISR
//! ```
//!
//! ## Cursor ownership
//!
//! | Session   | `write` cursor owner | `read` cursor owner |
//! |-----------|----------------------|---------------------|
//! | Recording | producer ISR         | foreground (pages)  |
//! | Playback  | foreground (pages)   | consumer ISR        |
//!
//! Each cursor has exactly one writer per session, so no locks are needed.
//! Page boundaries crossed by the interrupt side are reported inline through
//! [`PageEvents`].

mod page;
mod ring;

pub use page::{PageRead, PageWrite};
pub use ring::PageBuffer;

/// Page-boundary notifications raised from interrupt context.
///
/// Implementations run inside the sample ISR: they must only touch atomics
/// and return immediately.
pub trait PageEvents {
    /// The producer just completed a page.
    fn page_full(&self);

    /// The consumer just drained a page.
    fn page_empty(&self);

    /// The buffer was reset; drop any pending page notification.
    fn reset(&self) {}
}

impl PageEvents for () {
    fn page_full(&self) {}
    fn page_empty(&self) {}
}
