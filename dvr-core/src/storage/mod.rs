//! Persistent stream storage.
//!
//! The recorder keeps a single WAVE stream on a block medium (a FAT file on an
//! SD card on the reference board). The medium itself is a port: anything that
//! can create, open, seek, read and write one file implements [`Medium`].
//! [`StorageBridge`] sits on top and frames pages as a WAVE stream.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`wave`] | RIFF/WAVE header encoding and parsing |
//! | [`bridge`] | Page transfers and header finalization |

pub mod bridge;
pub mod wave;

pub use bridge::StorageBridge;

/// Coarse classification of a medium failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum ErrorKind {
    /// No free space left on the medium.
    Full,
    /// The stream does not exist.
    NotFound,
    /// Any other transfer or filesystem failure.
    Other,
}

/// Medium error type: anything that can say what kind of failure it was.
pub trait MediumError: core::fmt::Debug {
    fn kind(&self) -> ErrorKind;
}

impl MediumError for ErrorKind {
    fn kind(&self) -> ErrorKind {
        *self
    }
}

impl MediumError for core::convert::Infallible {
    fn kind(&self) -> ErrorKind {
        match *self {}
    }
}

/// Byte-addressed access to the single stream file.
///
/// All calls happen in the foreground loop and may block.
pub trait Medium {
    type Error: MediumError;

    /// Create (or truncate) the stream and position at offset 0.
    fn create(&mut self) -> Result<(), Self::Error>;

    /// Open the existing stream for reading at offset 0.
    fn open(&mut self) -> Result<(), Self::Error>;

    /// Move to an absolute byte offset.
    fn seek(&mut self, offset: u32) -> Result<(), Self::Error>;

    /// Write bytes at the current offset. Returns how many were written; fewer
    /// than requested means the medium is full.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Read bytes at the current offset. Returns how many were read; fewer
    /// than requested means end of stream.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Push buffered writes to the medium.
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Release the stream.
    fn close(&mut self) -> Result<(), Self::Error>;
}

impl<T: Medium + ?Sized> Medium for &mut T {
    type Error = T::Error;

    fn create(&mut self) -> Result<(), Self::Error> {
        T::create(self)
    }

    fn open(&mut self) -> Result<(), Self::Error> {
        T::open(self)
    }

    fn seek(&mut self, offset: u32) -> Result<(), Self::Error> {
        T::seek(self, offset)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        T::write(self, data)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        T::read(self, buf)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        T::flush(self)
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        T::close(self)
    }
}
