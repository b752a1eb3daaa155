//! Authored level data and the run-length program codec.
//!
//! A level carries a full memory image, run-length encoded as
//! `(value, run)` byte pairs for compact authoring. The core consumes the
//! decoded image through [`crate::memory::Memory::load`] and nothing else;
//! cycle thresholds and labels are data it stores but never interprets
//! (scoring tiers and label rendering are presentation concerns).

use thiserror::Error;

/// Failure modes when decoding an authored program image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum LevelError {
    /// The run-length stream ended in the middle of a `(value, run)` pair.
    #[error("run-length stream ends mid-pair")]
    TruncatedRun,
    /// The decoded image does not match the session's memory size.
    #[error("decoded image is {actual} bytes, expected {expected}")]
    WrongImageSize {
        /// Bytes the target memory holds.
        expected: usize,
        /// Bytes the image decoded to.
        actual: usize,
    },
}

/// One authored puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Level {
    /// Stable level identifier.
    pub id: u16,
    /// Cycle-count goals `[gold, silver, bronze]`, data only.
    pub cycle_thresholds: [u8; 3],
    /// Run-length encoded full memory image.
    pub encoded_program: Vec<u8>,
    /// Label strings referenced by TXT operands.
    pub labels: Vec<String>,
}

impl Level {
    /// Decodes this level's program image.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError::TruncatedRun`] when the encoded stream is
    /// malformed.
    pub fn decoded_program(&self) -> Result<Vec<u8>, LevelError> {
        decode_rle(&self.encoded_program)
    }
}

/// Run-length encodes a byte image as `(value, run)` pairs.
///
/// Runs longer than 255 split into multiple pairs, so any image encodes.
#[must_use]
pub fn encode_rle(bytes: &[u8]) -> Vec<u8> {
    let mut encoded = Vec::new();
    let mut bytes = bytes.iter().copied();

    let Some(mut value) = bytes.next() else {
        return encoded;
    };
    let mut run: u8 = 1;

    for byte in bytes {
        if byte == value && run < u8::MAX {
            run += 1;
        } else {
            encoded.push(value);
            encoded.push(run);
            value = byte;
            run = 1;
        }
    }
    encoded.push(value);
    encoded.push(run);
    encoded
}

/// Decodes a `(value, run)` pair stream back into a byte image.
///
/// # Errors
///
/// Returns [`LevelError::TruncatedRun`] when the stream has a trailing
/// value without a run length.
pub fn decode_rle(encoded: &[u8]) -> Result<Vec<u8>, LevelError> {
    if encoded.len() % 2 != 0 {
        return Err(LevelError::TruncatedRun);
    }

    let mut decoded = Vec::new();
    for pair in encoded.chunks_exact(2) {
        let (value, run) = (pair[0], pair[1]);
        decoded.extend(std::iter::repeat(value).take(usize::from(run)));
    }
    Ok(decoded)
}
