//! Fixed-duration chunk accumulation
//!
//! Converted samples are buffered until half a second of audio has
//! accumulated, then emitted as an immutable chunk and the buffer starts
//! over. Chunk length therefore depends on the source sample rate.

use super::convert::pcm_to_le_bytes;

/// Seconds of audio per chunk.
pub const CHUNK_SECONDS: f64 = 0.5;

/// Number of samples in one chunk at the given sample rate.
///
/// Equals `floor(sample_rate * 0.5)` for any positive rate, including
/// rates that are not powers of two (e.g. 44100 -> 22050).
pub fn chunk_capacity(sample_rate: u32) -> usize {
    (sample_rate as f64 * CHUNK_SECONDS) as usize
}

/// An immutable block of 16-bit PCM samples, exactly one chunk long.
///
/// Produced once per fill of the [`ChunkBuffer`]; ownership moves to the
/// transport on emission and the samples are never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    samples: Box<[i16]>,
}

impl AudioChunk {
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Raw little-endian PCM bytes, the wire layout of the ingest endpoint.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        pcm_to_le_bytes(&self.samples)
    }
}

impl From<Vec<i16>> for AudioChunk {
    fn from(samples: Vec<i16>) -> Self {
        Self {
            samples: samples.into_boxed_slice(),
        }
    }
}

/// Fixed-capacity accumulator that emits a chunk each time it fills.
///
/// On fill, the live buffer is moved out wholesale and a fresh allocation
/// takes its place, so the emitted snapshot and the new live buffer never
/// share backing storage.
#[derive(Debug)]
pub struct ChunkBuffer {
    buffer: Vec<i16>,
    capacity: usize,
}

impl ChunkBuffer {
    /// Create a buffer sized for the given source sample rate.
    pub fn for_sample_rate(sample_rate: u32) -> Self {
        let capacity = chunk_capacity(sample_rate);
        Self {
            buffer: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append one sample. Returns the completed chunk when the buffer
    /// fills, resetting the write cursor to zero.
    pub fn push(&mut self, sample: i16) -> Option<AudioChunk> {
        self.buffer.push(sample);

        if self.buffer.len() >= self.capacity {
            let full = std::mem::replace(&mut self.buffer, Vec::with_capacity(self.capacity));
            Some(AudioChunk::from(full))
        } else {
            None
        }
    }

    /// Samples accumulated since the last emission.
    pub fn cursor(&self) -> usize {
        self.buffer.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
