//! Host-side doubles shared by unit and integration tests.

use std::string::String;
use std::vec::Vec;

use crate::io::{SampleSink, SampleSource};
use crate::storage::{ErrorKind, Medium};

/// One in-memory stream file with a size cap and failure injection.
pub struct MemoryMedium {
    file: Option<Vec<u8>>,
    pos: usize,
    capacity: usize,
    writes_before_failure: Option<usize>,
    reads_before_failure: Option<usize>,
    flushed: bool,
    closes: usize,
}

impl MemoryMedium {
    pub fn new() -> Self {
        MemoryMedium {
            file: None,
            pos: 0,
            capacity: usize::MAX,
            writes_before_failure: None,
            reads_before_failure: None,
            flushed: false,
            closes: 0,
        }
    }

    /// Replace the stored file with `bytes`.
    pub fn install(&mut self, bytes: &[u8]) {
        self.file = Some(bytes.to_vec());
    }

    pub fn contents(&self) -> Option<&[u8]> {
        self.file.as_deref()
    }

    /// Cap the file size; writes past it come back short.
    pub fn set_capacity(&mut self, bytes: usize) {
        self.capacity = bytes;
    }

    /// Let `n` more write calls succeed, then fail every one after.
    pub fn fail_writes_after(&mut self, n: usize) {
        self.writes_before_failure = Some(n);
    }

    /// Let `n` more read calls succeed, then fail every one after.
    pub fn fail_reads_after(&mut self, n: usize) {
        self.reads_before_failure = Some(n);
    }

    pub fn flushed(&self) -> bool {
        self.flushed
    }

    pub fn closes(&self) -> usize {
        self.closes
    }
}

impl Default for MemoryMedium {
    fn default() -> Self {
        Self::new()
    }
}

impl Medium for MemoryMedium {
    type Error = ErrorKind;

    fn create(&mut self) -> Result<(), ErrorKind> {
        if self.capacity == 0 {
            return Err(ErrorKind::Full);
        }
        self.file = Some(Vec::new());
        self.pos = 0;
        self.flushed = false;
        Ok(())
    }

    fn open(&mut self) -> Result<(), ErrorKind> {
        if self.file.is_none() {
            return Err(ErrorKind::NotFound);
        }
        self.pos = 0;
        Ok(())
    }

    fn seek(&mut self, offset: u32) -> Result<(), ErrorKind> {
        self.pos = offset as usize;
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ErrorKind> {
        if let Some(left) = self.writes_before_failure.as_mut() {
            if *left == 0 {
                return Err(ErrorKind::Other);
            }
            *left -= 1;
        }
        let file = self.file.as_mut().ok_or(ErrorKind::Other)?;
        let room = self.capacity.saturating_sub(self.pos);
        let n = data.len().min(room);
        let end = self.pos + n;
        if file.len() < end {
            file.resize(end, 0);
        }
        file[self.pos..end].copy_from_slice(&data[..n]);
        self.pos = end;
        Ok(n)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ErrorKind> {
        if let Some(left) = self.reads_before_failure.as_mut() {
            if *left == 0 {
                return Err(ErrorKind::Other);
            }
            *left -= 1;
        }
        let file = self.file.as_ref().ok_or(ErrorKind::Other)?;
        let start = self.pos.min(file.len());
        let n = buf.len().min(file.len() - start);
        buf[..n].copy_from_slice(&file[start..start + n]);
        self.pos = start + n;
        Ok(n)
    }

    fn flush(&mut self) -> Result<(), ErrorKind> {
        self.flushed = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), ErrorKind> {
        self.closes += 1;
        Ok(())
    }
}

/// Source yielding an incrementing byte sequence.
pub struct Ramp(pub u8);

impl SampleSource for Ramp {
    fn acquire(&mut self) -> u8 {
        let v = self.0;
        self.0 = self.0.wrapping_add(1);
        v
    }
}

/// Sink collecting every emitted sample.
#[derive(Default)]
pub struct Tape(pub Vec<u8>);

impl SampleSink for Tape {
    fn emit(&mut self, sample: u8) {
        self.0.push(sample);
    }
}

/// Diagnostic text collected from a recorder.
#[derive(Default)]
pub struct Transcript(pub String);

impl core::fmt::Write for Transcript {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.0.push_str(s);
        Ok(())
    }
}
