//! BER-TLV framing types (Tag, Length)

use emv_core::{EmvError, EmvResult, TagId};

/// Decode a tag from the start of `data`
///
/// # Arguments
/// * `data` - Buffer positioned at the first tag byte
/// * `offset` - Absolute offset of `data[0]`, used in error reports
///
/// # Returns
/// Returns `Ok((TagId, bytes_consumed))` if successful.
///
/// # Error Handling
/// Returns `TruncatedTag` if the first byte announces a two-byte tag and
/// the second byte is missing (or the buffer is empty).
pub fn decode_tag(data: &[u8], offset: usize) -> EmvResult<(TagId, usize)> {
    let Some(&first_byte) = data.first() else {
        return Err(EmvError::TruncatedTag {
            offset,
            expected: 1,
            available: 0,
        });
    };

    let tag_len = TagId::encoded_len(first_byte);
    if data.len() < tag_len {
        return Err(EmvError::TruncatedTag {
            offset,
            expected: tag_len,
            available: data.len(),
        });
    }

    let tag = TagId::from_bytes(&data[..tag_len])?;
    Ok((tag, tag_len))
}

/// BER-TLV Length encoding
///
/// # Encoding Format
///
/// Short form:
/// ```text
/// Byte: 0 L L L L L L L
/// ```
///
/// Long form:
/// ```text
/// First byte:  1 N N N N N N N  (N = number of length bytes)
/// Following bytes: L L L L L L L L  (big-endian length value)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TlvLength {
    /// Short form: length 0-127
    Short(u8),
    /// Long form: length encoded with length-of-length
    Long(usize),
}

impl TlvLength {
    /// Create a new length
    ///
    /// Chooses short form below 128 and long form otherwise.
    pub fn new(length: usize) -> Self {
        if length < 128 {
            TlvLength::Short(length as u8)
        } else {
            TlvLength::Long(length)
        }
    }

    /// Get the length value
    pub fn value(&self) -> usize {
        match self {
            TlvLength::Short(l) => *l as usize,
            TlvLength::Long(l) => *l,
        }
    }

    /// Encode length to bytes
    ///
    /// Long form uses the minimum number of big-endian bytes, with no
    /// leading zero byte.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            TlvLength::Short(length) => vec![*length],
            TlvLength::Long(length) => {
                let num_bytes = (usize::BITS - length.leading_zeros()).div_ceil(8).max(1) as usize;

                let mut result = Vec::with_capacity(1 + num_bytes);
                result.push(0x80 | num_bytes as u8);
                result.extend_from_slice(&length.to_be_bytes()[size_of::<usize>() - num_bytes..]);
                result
            }
        }
    }

    /// Decode length from bytes
    ///
    /// # Arguments
    /// * `data` - Buffer positioned at the first length byte
    /// * `offset` - Absolute offset of `data[0]`, used in error reports
    ///
    /// # Returns
    /// Returns `Ok((TlvLength, bytes_consumed))` if successful.
    ///
    /// # Error Handling
    /// - `TruncatedLength` if the buffer ends before the length is complete
    /// - `LengthOverflow` if the value does not fit in `usize`
    ///
    /// A long-form byte of `0x80` (no length octets) decodes as length 0.
    pub fn decode(data: &[u8], offset: usize) -> EmvResult<(Self, usize)> {
        let Some(&first_byte) = data.first() else {
            return Err(EmvError::TruncatedLength {
                offset,
                expected: 1,
                available: 0,
            });
        };

        if first_byte & 0x80 == 0 {
            return Ok((TlvLength::Short(first_byte & 0x7F), 1));
        }

        let num_bytes = (first_byte & 0x7F) as usize;
        if data.len() < 1 + num_bytes {
            return Err(EmvError::TruncatedLength {
                offset,
                expected: 1 + num_bytes,
                available: data.len(),
            });
        }

        let mut length = 0usize;
        for &byte in &data[1..1 + num_bytes] {
            length = length
                .checked_mul(256)
                .map(|l| l | byte as usize)
                .ok_or(EmvError::LengthOverflow {
                    offset,
                    octets: num_bytes,
                })?;
        }

        Ok((TlvLength::Long(length), 1 + num_bytes))
    }
}
