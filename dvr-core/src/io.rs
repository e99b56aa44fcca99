//! Sample ports driven by the [`SampleClock`](crate::clock::SampleClock).
//!
//! Both traits are called from interrupt context once per tick, so
//! implementations must be constant time and must not block.

/// Analog front end: yields one unsigned 8-bit sample per call.
pub trait SampleSource {
    fn acquire(&mut self) -> u8;
}

/// Audio output stage: accepts one unsigned 8-bit sample per call.
///
/// Output errors cannot be reported from the tick; implementations drop them.
pub trait SampleSink {
    fn emit(&mut self, sample: u8);
}

impl<T: SampleSource + ?Sized> SampleSource for &mut T {
    fn acquire(&mut self) -> u8 {
        (**self).acquire()
    }
}

impl<T: SampleSink + ?Sized> SampleSink for &mut T {
    fn emit(&mut self, sample: u8) {
        (**self).emit(sample)
    }
}
