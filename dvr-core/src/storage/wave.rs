//! RIFF/WAVE framing for 8-bit mono PCM streams.
//!
//! All multi-byte fields are little-endian. The canonical header written by
//! the recorder is 44 bytes:
//!
//! ```text
//! 0   "RIFF"   4   riff size (= 36 + data size)   8   "WAVE"
//! 12  "fmt "   16  16   20  format=1   22  channels=1
//! 24  sample rate   28  byte rate   32  block align   34  bits=8
//! 36  "data"   40  data size   44  samples...
//! ```

use crate::constants::WAVE_HEADER_LEN;
use crate::error::Error;

// ── Tags and fixed fields ──────────────────────────────────────────────────

pub const RIFF_TAG: [u8; 4] = *b"RIFF";
pub const WAVE_TAG: [u8; 4] = *b"WAVE";
pub const FMT_TAG: [u8; 4] = *b"fmt ";
pub const DATA_TAG: [u8; 4] = *b"data";

/// Size of the PCM `fmt ` chunk body.
pub const FMT_CHUNK_LEN: u32 = 16;

/// `AudioFormat` value for uncompressed PCM.
pub const FORMAT_PCM: u16 = 1;

pub const CHANNELS: u16 = 1;
pub const BITS_PER_SAMPLE: u16 = 8;

/// Length of the `RIFF` preamble (tag, size, form type).
pub const RIFF_PREAMBLE_LEN: usize = 12;

/// Length of a chunk header (tag, size).
pub const CHUNK_HEADER_LEN: usize = 8;

// ── Header ─────────────────────────────────────────────────────────────────

/// The variable fields of a canonical recorder header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WaveHeader {
    pub sample_rate: u32,
    /// Payload length in bytes (one byte per sample).
    pub data_len: u32,
}

impl WaveHeader {
    pub const fn new(sample_rate: u32, data_len: u32) -> Self {
        WaveHeader {
            sample_rate,
            data_len,
        }
    }

    /// Serialize to the 44-byte canonical layout.
    pub fn encode(&self) -> [u8; WAVE_HEADER_LEN] {
        let block_align = CHANNELS * BITS_PER_SAMPLE / 8;
        let byte_rate = self.sample_rate * block_align as u32;
        let riff_len = (WAVE_HEADER_LEN as u32 - 8).saturating_add(self.data_len);

        let mut out = [0u8; WAVE_HEADER_LEN];
        out[0..4].copy_from_slice(&RIFF_TAG);
        out[4..8].copy_from_slice(&riff_len.to_le_bytes());
        out[8..12].copy_from_slice(&WAVE_TAG);
        out[12..16].copy_from_slice(&FMT_TAG);
        out[16..20].copy_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
        out[20..22].copy_from_slice(&FORMAT_PCM.to_le_bytes());
        out[22..24].copy_from_slice(&CHANNELS.to_le_bytes());
        out[24..28].copy_from_slice(&self.sample_rate.to_le_bytes());
        out[28..32].copy_from_slice(&byte_rate.to_le_bytes());
        out[32..34].copy_from_slice(&block_align.to_le_bytes());
        out[34..36].copy_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
        out[36..40].copy_from_slice(&DATA_TAG);
        out[40..44].copy_from_slice(&self.data_len.to_le_bytes());
        out
    }
}

// ── Parsing ────────────────────────────────────────────────────────────────

fn le_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn le_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Check the `RIFF....WAVE` preamble and return the declared RIFF size.
pub fn parse_preamble(bytes: &[u8; RIFF_PREAMBLE_LEN]) -> Result<u32, Error> {
    if bytes[0..4] != RIFF_TAG || bytes[8..12] != WAVE_TAG {
        return Err(Error::MalformedHeader);
    }
    Ok(le_u32(bytes, 4))
}

/// A chunk header: four-byte tag and body length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub tag: [u8; 4],
    pub len: u32,
}

impl ChunkHeader {
    pub fn parse(bytes: &[u8; CHUNK_HEADER_LEN]) -> Self {
        ChunkHeader {
            tag: [bytes[0], bytes[1], bytes[2], bytes[3]],
            len: le_u32(bytes, 4),
        }
    }

    /// Body length rounded up to the RIFF word boundary.
    pub fn padded_len(&self) -> u32 {
        self.len.saturating_add(self.len & 1)
    }
}

/// Decoded `fmt ` chunk body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FmtChunk {
    pub format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
}

impl FmtChunk {
    pub fn parse(bytes: &[u8; FMT_CHUNK_LEN as usize]) -> Self {
        FmtChunk {
            format: le_u16(bytes, 0),
            channels: le_u16(bytes, 2),
            sample_rate: le_u32(bytes, 4),
            byte_rate: le_u32(bytes, 8),
            block_align: le_u16(bytes, 12),
            bits_per_sample: le_u16(bytes, 14),
        }
    }

    /// Whether this is the 8-bit mono PCM layout the player can emit.
    pub fn is_supported(&self) -> bool {
        self.format == FORMAT_PCM
            && self.channels == CHANNELS
            && self.bits_per_sample == BITS_PER_SAMPLE
            && self.block_align == CHANNELS * BITS_PER_SAMPLE / 8
    }
}
