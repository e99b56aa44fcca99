use core::ops::{Deref, DerefMut};

use super::ring::PageBuffer;

/// Shared view of a filled page, handed to storage for writing.
///
/// The page stays reserved while the handle lives. Dropping it advances the
/// read cursor past the page so the producer may refill the slot.
pub struct PageRead<'b, E, const C: usize, const P: usize> {
    buffer: &'b PageBuffer<'b, E, C, P>,
    start: usize,
    len: usize,
}

impl<'b, E, const C: usize, const P: usize> PageRead<'b, E, C, P> {
    pub(super) fn new(buffer: &'b PageBuffer<'b, E, C, P>, start: usize, len: usize) -> Self {
        PageRead { buffer, start, len }
    }
}

impl<E, const C: usize, const P: usize> Deref for PageRead<'_, E, C, P> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        // SAFETY: `[start, start + len)` is contiguous, lies inside the unread
        // region, and the producer never writes there until we commit.
        unsafe { core::slice::from_raw_parts(self.buffer.slot_ptr(self.start), self.len) }
    }
}

impl<E, const C: usize, const P: usize> Drop for PageRead<'_, E, C, P> {
    fn drop(&mut self) {
        self.buffer.commit_read(self.start, self.len);
    }
}

/// Exclusive view of a free page slot, filled from storage during playback.
///
/// Dropping the handle advances the write cursor, making the page visible to
/// the consumer interrupt.
pub struct PageWrite<'b, E, const C: usize, const P: usize> {
    buffer: &'b PageBuffer<'b, E, C, P>,
    start: usize,
    len: usize,
}

impl<'b, E, const C: usize, const P: usize> PageWrite<'b, E, C, P> {
    pub(super) fn new(buffer: &'b PageBuffer<'b, E, C, P>, start: usize, len: usize) -> Self {
        PageWrite { buffer, start, len }
    }
}

impl<E, const C: usize, const P: usize> Deref for PageWrite<'_, E, C, P> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        // SAFETY: the slot is free space the consumer will not read until commit.
        unsafe { core::slice::from_raw_parts(self.buffer.slot_ptr(self.start), self.len) }
    }
}

impl<E, const C: usize, const P: usize> DerefMut for PageWrite<'_, E, C, P> {
    fn deref_mut(&mut self) -> &mut [u8] {
        // SAFETY: as above; the buffer lends at most one handle at a time.
        unsafe { core::slice::from_raw_parts_mut(self.buffer.slot_ptr(self.start), self.len) }
    }
}

impl<E, const C: usize, const P: usize> Drop for PageWrite<'_, E, C, P> {
    fn drop(&mut self) {
        self.buffer.commit_write(self.start, self.len);
    }
}
