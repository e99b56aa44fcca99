//! Page transfers between the [`PageBuffer`](crate::buffer::PageBuffer) and
//! the medium, framed as a WAVE stream.
//!
//! A recording stream is created with a placeholder header whose size fields
//! are zero; [`close_stream()`](StorageBridge::close_stream) seeks back and
//! rewrites them once the payload length is known.

use crate::error::Error;

use super::wave::{
    self, ChunkHeader, FmtChunk, WaveHeader, CHUNK_HEADER_LEN, DATA_TAG, FMT_CHUNK_LEN, FMT_TAG,
    RIFF_PREAMBLE_LEN,
};
use super::{ErrorKind, Medium, MediumError};

/// Chunks examined before giving up on finding `data`.
const MAX_CHUNKS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Closed,
    Writing { data_len: u32 },
    Reading { remaining: u32 },
}

fn medium_err<E: MediumError>(err: E) -> Error {
    match err.kind() {
        ErrorKind::Full => Error::StorageFull,
        ErrorKind::NotFound => Error::NotFound,
        ErrorKind::Other => Error::Io,
    }
}

/// Bytes to read into a `buf_len` buffer with `remaining` payload left.
///
/// Compared in `u32` so a payload above 64 KiB is not cut on 16-bit targets.
fn read_len(buf_len: usize, remaining: u32) -> usize {
    u32::try_from(buf_len).map_or(remaining, |n| n.min(remaining)) as usize
}

/// WAVE stream adapter over a [`Medium`].
pub struct StorageBridge<M> {
    medium: M,
    sample_rate: u32,
    stream: Stream,
}

impl<M: Medium> StorageBridge<M> {
    /// Wrap `medium`; new streams are stamped with `sample_rate`.
    pub fn new(medium: M, sample_rate: u32) -> Self {
        StorageBridge {
            medium,
            sample_rate,
            stream: Stream::Closed,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn is_open(&self) -> bool {
        self.stream != Stream::Closed
    }

    /// Payload bytes written to the current recording stream.
    pub fn data_len(&self) -> Option<u32> {
        match self.stream {
            Stream::Writing { data_len } => Some(data_len),
            _ => None,
        }
    }

    /// Payload bytes not yet read from the current playback stream.
    pub fn remaining(&self) -> Option<u32> {
        match self.stream {
            Stream::Reading { remaining } => Some(remaining),
            _ => None,
        }
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    pub fn medium_mut(&mut self) -> &mut M {
        &mut self.medium
    }

    pub fn into_inner(self) -> M {
        self.medium
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), Error> {
        let written = self.medium.write(data).map_err(medium_err)?;
        if written < data.len() {
            return Err(Error::StorageFull);
        }
        Ok(())
    }

    fn read_header_bytes(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        let read = self.medium.read(buf).map_err(medium_err)?;
        if read < buf.len() {
            return Err(Error::MalformedHeader);
        }
        Ok(())
    }

    /// Create a new recording stream with a placeholder header.
    ///
    /// Any stream still open is closed first.
    pub fn create_stream(&mut self) -> Result<(), Error> {
        if self.is_open() {
            self.abort_stream();
        }
        self.medium.create().map_err(medium_err)?;

        let header = WaveHeader::new(self.sample_rate, 0).encode();
        if let Err(err) = self.write_all(&header) {
            let _ = self.medium.close();
            return Err(err);
        }
        self.stream = Stream::Writing { data_len: 0 };
        Ok(())
    }

    /// Open the existing stream for playback and return its payload length in
    /// samples.
    pub fn open_stream(&mut self) -> Result<u32, Error> {
        if self.is_open() {
            self.abort_stream();
        }
        self.medium.open().map_err(medium_err)?;

        match self.parse_header() {
            Ok(len) => {
                self.stream = Stream::Reading { remaining: len };
                Ok(len)
            }
            Err(err) => {
                let _ = self.medium.close();
                Err(err)
            }
        }
    }

    /// Walk the RIFF chunks up to `data`, validating `fmt ` on the way.
    fn parse_header(&mut self) -> Result<u32, Error> {
        let mut preamble = [0u8; RIFF_PREAMBLE_LEN];
        self.read_header_bytes(&mut preamble)?;
        wave::parse_preamble(&preamble)?;

        let mut offset = RIFF_PREAMBLE_LEN as u32;
        let mut seen_fmt = false;

        for _ in 0..MAX_CHUNKS {
            let mut raw = [0u8; CHUNK_HEADER_LEN];
            self.read_header_bytes(&mut raw)?;
            offset = offset.saturating_add(CHUNK_HEADER_LEN as u32);
            let chunk = ChunkHeader::parse(&raw);

            match chunk.tag {
                FMT_TAG => {
                    if chunk.len < FMT_CHUNK_LEN {
                        return Err(Error::MalformedHeader);
                    }
                    let mut body = [0u8; FMT_CHUNK_LEN as usize];
                    self.read_header_bytes(&mut body)?;
                    let fmt = FmtChunk::parse(&body);
                    if !fmt.is_supported() {
                        return Err(Error::MalformedHeader);
                    }
                    if fmt.sample_rate != self.sample_rate {
                        warn!(
                            "stream recorded at {} Hz, playing at {} Hz",
                            fmt.sample_rate,
                            self.sample_rate
                        );
                    }
                    seen_fmt = true;
                    offset = offset.saturating_add(chunk.padded_len());
                    if chunk.padded_len() != FMT_CHUNK_LEN {
                        self.medium.seek(offset).map_err(medium_err)?;
                    }
                }
                DATA_TAG => {
                    if !seen_fmt {
                        return Err(Error::MalformedHeader);
                    }
                    return Ok(chunk.len);
                }
                _ => {
                    offset = offset.saturating_add(chunk.padded_len());
                    self.medium.seek(offset).map_err(medium_err)?;
                }
            }
        }
        Err(Error::MalformedHeader)
    }

    /// Append a page (or the final partial page) to the recording stream.
    ///
    /// A short write still counts the bytes that made it and fails with
    /// [`Error::StorageFull`].
    pub fn write_block(&mut self, data: &[u8]) -> Result<(), Error> {
        let Stream::Writing { data_len } = self.stream else {
            return Err(Error::Io);
        };

        let written = self.medium.write(data).map_err(medium_err)?;
        self.stream = Stream::Writing {
            data_len: data_len.saturating_add(written as u32),
        };
        if written < data.len() {
            return Err(Error::StorageFull);
        }
        Ok(())
    }

    /// Fill `buf` from the playback stream. Bytes past the end of the payload
    /// are zero. Returns how many payload bytes were copied.
    pub fn read_block(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let Stream::Reading { remaining } = self.stream else {
            return Err(Error::Io);
        };

        let want = read_len(buf.len(), remaining);
        let read = if want > 0 {
            self.medium.read(&mut buf[..want]).map_err(medium_err)?
        } else {
            0
        };
        buf[read..].fill(0);

        self.stream = Stream::Reading {
            remaining: remaining - read as u32,
        };
        Ok(read)
    }

    /// Finish the current stream. A recording gets its final header.
    pub fn close_stream(&mut self) -> Result<(), Error> {
        match core::mem::replace(&mut self.stream, Stream::Closed) {
            Stream::Closed => Ok(()),
            Stream::Reading { .. } => self.medium.close().map_err(medium_err),
            Stream::Writing { data_len } => {
                let finalized = self.finalize(data_len);
                let closed = self.medium.close().map_err(medium_err);
                finalized.and(closed)
            }
        }
    }

    fn finalize(&mut self, data_len: u32) -> Result<(), Error> {
        self.medium.seek(0).map_err(medium_err)?;
        let header = WaveHeader::new(self.sample_rate, data_len).encode();
        self.write_all(&header)?;
        self.medium.flush().map_err(medium_err)
    }

    /// Best-effort close after a failed transfer. Errors are only logged.
    pub fn abort_stream(&mut self) {
        if let Err(err) = self.close_stream() {
            warn!("stream close failed: {:?}", err);
        }
    }
}
