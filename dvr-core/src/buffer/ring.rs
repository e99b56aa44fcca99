use core::cell::UnsafeCell;

use portable_atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};

use crate::constants::SILENCE;

use super::page::{PageRead, PageWrite};
use super::PageEvents;

/// Fixed-capacity circular byte buffer divided into `C / P` pages of `P` bytes.
///
/// Cursors run over `0..2C` so that a completely full buffer (`C` unread
/// bytes) is distinguishable from an empty one; the storage slot of a cursor
/// is its value modulo `C`.
///
/// # Type Parameters
///
/// - `E`: page-boundary listener, usually [`SessionSignals`](crate::session::SessionSignals).
/// - `C`: capacity in bytes. Must be a non-zero multiple of `P`.
/// - `P`: page size in bytes.
pub struct PageBuffer<'a, E, const C: usize, const P: usize> {
    storage: UnsafeCell<[u8; C]>,
    /// Producer position (enqueue, or `write_page` during playback).
    write: AtomicUsize,
    /// Consumer position (dequeue, or `read_page` during recording).
    read: AtomicUsize,
    /// Sticky: the producer found the buffer full and dropped a sample.
    overrun: AtomicBool,
    underruns: AtomicU16,
    /// A `PageRead`/`PageWrite` handle is outstanding.
    lent: AtomicBool,
    events: &'a E,
}

// SAFETY: `write` is only advanced by the producing side and `read` only by
// the consuming side. A byte slot is touched by the producer only while it is
// outside `[read, write)` and by the consumer only while inside it, and the
// Release/Acquire pairs on the cursors publish the slot contents.
unsafe impl<E: Sync, const C: usize, const P: usize> Sync for PageBuffer<'_, E, C, P> {}

impl<'a, E, const C: usize, const P: usize> PageBuffer<'a, E, C, P> {
    /// Number of pages in the buffer.
    pub const PAGES: usize = C / P;

    /// Create an empty buffer reporting page boundaries to `events`.
    ///
    /// # Panics
    ///
    /// Compile-time assertion when used in a `static`: `P` must be non-zero
    /// and `C` a non-zero multiple of `P`.
    pub const fn new(events: &'a E) -> Self {
        assert!(P > 0, "page size must be non-zero");
        assert!(C >= P && C % P == 0, "capacity must be a whole number of pages");

        PageBuffer {
            storage: UnsafeCell::new([0u8; C]),
            write: AtomicUsize::new(0),
            read: AtomicUsize::new(0),
            overrun: AtomicBool::new(false),
            underruns: AtomicU16::new(0),
            lent: AtomicBool::new(false),
            events,
        }
    }

    pub const fn capacity(&self) -> usize {
        C
    }

    pub const fn page_size(&self) -> usize {
        P
    }

    /// The page-boundary listener this buffer reports to.
    pub fn events(&self) -> &'a E {
        self.events
    }

    #[inline]
    fn advance(pos: usize, n: usize) -> usize {
        let next = pos + n;
        if next >= 2 * C {
            next - 2 * C
        } else {
            next
        }
    }

    #[inline]
    fn slot(pos: usize) -> usize {
        if pos >= C {
            pos - C
        } else {
            pos
        }
    }

    #[inline]
    fn distance(write: usize, read: usize) -> usize {
        if write >= read {
            write - read
        } else {
            write + 2 * C - read
        }
    }

    /// Pointer to the storage slot for cursor position `pos`.
    #[inline]
    pub(super) fn slot_ptr(&self, pos: usize) -> *mut u8 {
        // SAFETY: slot(pos) < C, so the offset stays inside the array.
        unsafe { self.storage.get().cast::<u8>().add(Self::slot(pos)) }
    }

    pub(super) fn commit_read(&self, from: usize, len: usize) {
        self.read.store(Self::advance(from, len), Ordering::Release);
        self.lent.store(false, Ordering::Release);
    }

    pub(super) fn commit_write(&self, from: usize, len: usize) {
        self.write.store(Self::advance(from, len), Ordering::Release);
        self.lent.store(false, Ordering::Release);
    }

    /// Claim the single page-handle slot. Fails if a handle is already out.
    fn lend(&self) -> bool {
        !self.lent.swap(true, Ordering::Acquire)
    }

    fn unlend(&self) {
        self.lent.store(false, Ordering::Release);
    }

    /// Unread bytes currently held.
    pub fn len(&self) -> usize {
        let read = self.read.load(Ordering::Acquire);
        let write = self.write.load(Ordering::Acquire);
        Self::distance(write, read)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Complete pages waiting to be read by the foreground.
    pub fn readable_pages(&self) -> usize {
        self.len() / P
    }

    /// Page slots free for the foreground to fill.
    pub fn writable_pages(&self) -> usize {
        (C - self.len()) / P
    }

    /// Offset of the write cursor within the backing store.
    pub fn write_offset(&self) -> usize {
        Self::slot(self.write.load(Ordering::Acquire))
    }

    /// Offset of the read cursor within the backing store.
    pub fn read_offset(&self) -> usize {
        Self::slot(self.read.load(Ordering::Acquire))
    }

    /// Whether the producer has ever found the buffer full since the last reset.
    pub fn overrun(&self) -> bool {
        self.overrun.load(Ordering::Acquire)
    }

    /// Dequeues that found no data since the last reset (saturating).
    pub fn underruns(&self) -> u16 {
        self.underruns.load(Ordering::Relaxed)
    }
}

impl<'a, E: PageEvents, const C: usize, const P: usize> PageBuffer<'a, E, C, P> {
    /// Return both cursors to the top of the buffer.
    ///
    /// Must only be called while no sample interrupt is feeding or draining
    /// the buffer (between sessions). Capacity is unchanged; the listener's
    /// pending page notification is cleared.
    pub fn reset(&self) {
        self.write.store(0, Ordering::Release);
        self.read.store(0, Ordering::Release);
        self.overrun.store(false, Ordering::Release);
        self.underruns.store(0, Ordering::Relaxed);
        self.lent.store(false, Ordering::Release);
        self.events.reset();
    }

    /// Store one sample (producer interrupt, recording).
    ///
    /// Constant time, never blocks. Completing a page invokes
    /// [`PageEvents::page_full`] before returning. A full buffer drops the
    /// sample and latches [`overrun()`](Self::overrun).
    pub fn enqueue(&self, sample: u8) {
        let write = self.write.load(Ordering::Relaxed);
        let read = self.read.load(Ordering::Acquire);

        if Self::distance(write, read) == C {
            self.overrun.store(true, Ordering::Release);
            return;
        }

        // SAFETY: distance < C, so this slot is outside `[read, write)` and
        // outside any page the foreground may hold through a `PageRead`.
        unsafe { self.slot_ptr(write).write(sample) };

        let next = Self::advance(write, 1);
        self.write.store(next, Ordering::Release);

        if next % P == 0 {
            self.events.page_full();
        }
    }

    /// Take one sample (consumer interrupt, playback).
    ///
    /// Constant time, never blocks. Draining a page invokes
    /// [`PageEvents::page_empty`] before returning. An empty buffer yields
    /// [`SILENCE`] without moving the cursor and is counted in
    /// [`underruns()`](Self::underruns).
    pub fn dequeue(&self) -> u8 {
        let read = self.read.load(Ordering::Relaxed);
        let write = self.write.load(Ordering::Acquire);

        if read == write {
            let n = self.underruns.load(Ordering::Relaxed);
            self.underruns.store(n.saturating_add(1), Ordering::Relaxed);
            return SILENCE;
        }

        // SAFETY: read != write, so this slot is inside `[read, write)` and
        // was published by the Release store of `write`.
        let sample = unsafe { self.slot_ptr(read).read() };

        let next = Self::advance(read, 1);
        self.read.store(next, Ordering::Release);

        if next % P == 0 {
            self.events.page_empty();
        }
        sample
    }

    /// Borrow the oldest complete page for transfer to storage (foreground,
    /// recording).
    ///
    /// Returns `None` until a full page is available. Dropping the handle
    /// releases the page back to the producer.
    pub fn read_page(&self) -> Option<PageRead<'_, E, C, P>> {
        if !self.lend() {
            return None;
        }
        let read = self.read.load(Ordering::Relaxed);
        let write = self.write.load(Ordering::Acquire);

        if Self::distance(write, read) < P || Self::slot(read) % P != 0 {
            self.unlend();
            return None;
        }
        Some(PageRead::new(self, read, P))
    }

    /// Borrow what is left of the current page once the producer has stopped.
    ///
    /// Yields at most the bytes up to the next page boundary. Returns `None`
    /// when nothing is unread.
    pub fn read_tail(&self) -> Option<PageRead<'_, E, C, P>> {
        if !self.lend() {
            return None;
        }
        let read = self.read.load(Ordering::Relaxed);
        let write = self.write.load(Ordering::Acquire);

        let unread = Self::distance(write, read);
        if unread == 0 {
            self.unlend();
            return None;
        }
        let to_boundary = P - Self::slot(read) % P;
        Some(PageRead::new(self, read, unread.min(to_boundary)))
    }

    /// Borrow the next free page slot to fill from storage (foreground,
    /// playback).
    ///
    /// Returns `None` while every slot still holds unplayed samples. Dropping
    /// the handle hands the page to the consumer.
    pub fn write_page(&self) -> Option<PageWrite<'_, E, C, P>> {
        if !self.lend() {
            return None;
        }
        let write = self.write.load(Ordering::Relaxed);
        let read = self.read.load(Ordering::Acquire);

        if C - Self::distance(write, read) < P || Self::slot(write) % P != 0 {
            self.unlend();
            return None;
        }
        Some(PageWrite::new(self, write, P))
    }
}
