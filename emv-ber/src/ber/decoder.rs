//! BER-TLV decoder
//!
//! ```rust
//! use emv_ber::ber::TlvDecoder;
//!
//! let data = [0x9F, 0x27, 0x01, 0x80];
//! let mut decoder = TlvDecoder::new(&data);
//! let tlv = decoder.decode_tlv().unwrap();
//! assert_eq!(tlv.tag.to_string(), "9F27");
//! assert_eq!(tlv.value, &[0x80]);
//! ```

use crate::ber::map::TlvMap;
use crate::ber::types::{TlvLength, decode_tag};
use emv_core::{EmvError, EmvResult, TagId};

/// Maximum nesting of constructed tags followed by the decoders
pub const MAX_NESTING_DEPTH: usize = 16;

/// One decoded TLV record borrowing its value from the input buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tlv<'a> {
    pub tag: TagId,
    pub value: &'a [u8],
    /// Absolute offset of the first tag byte
    pub offset: usize,
    /// Tag bytes plus length bytes
    pub header_len: usize,
}

impl<'a> Tlv<'a> {
    /// Check if the record's value is a nested TLV sequence
    pub fn is_constructed(&self) -> bool {
        self.tag.is_constructed()
    }

    /// Absolute offset of the first value byte
    pub fn value_offset(&self) -> usize {
        self.offset + self.header_len
    }

    /// Total encoded size of the record
    pub fn encoded_len(&self) -> usize {
        self.header_len + self.value.len()
    }
}

/// BER-TLV decoder
///
/// Reads TLV triplets sequentially from a byte buffer, keeping a position
/// that advances as records are decoded. Offsets reported in errors are
/// absolute: a decoder created for a nested value with
/// [`TlvDecoder::with_base`] reports positions relative to the outermost
/// buffer.
pub struct TlvDecoder<'a> {
    buffer: &'a [u8],
    position: usize,
    base: usize,
}

impl<'a> TlvDecoder<'a> {
    /// Create a new decoder over a top-level buffer
    pub fn new(buffer: &'a [u8]) -> Self {
        Self::with_base(buffer, 0)
    }

    /// Create a decoder for a buffer that starts at `base` in the outer input
    pub fn with_base(buffer: &'a [u8], base: usize) -> Self {
        Self {
            buffer,
            position: 0,
            base,
        }
    }

    /// Get current position in buffer
    pub fn position(&self) -> usize {
        self.position
    }

    /// Get remaining bytes
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Check if there is more data to decode
    pub fn has_remaining(&self) -> bool {
        self.position < self.buffer.len()
    }

    /// Decode a TLV (Tag-Length-Value) triplet
    ///
    /// # Decoding Process
    /// 1. Decode tag (1 or 2 bytes)
    /// 2. Decode length (short or long form)
    /// 3. Read exactly `length` value bytes
    ///
    /// The position only advances when the whole record is available.
    pub fn decode_tlv(&mut self) -> EmvResult<Tlv<'a>> {
        let start = self.position;
        let offset = self.base + start;

        let (tag, tag_bytes) = decode_tag(&self.buffer[start..], offset)?;
        let length_pos = start + tag_bytes;

        let (length, length_bytes) =
            TlvLength::decode(&self.buffer[length_pos..], self.base + length_pos)?;
        let value_pos = length_pos + length_bytes;

        let value_len = length.value();
        let available = self.buffer.len() - value_pos;
        if value_len > available {
            return Err(EmvError::TruncatedValue {
                offset: self.base + value_pos,
                expected: value_len,
                available,
            });
        }

        self.position = value_pos + value_len;
        Ok(Tlv {
            tag,
            value: &self.buffer[value_pos..self.position],
            offset,
            header_len: tag_bytes + length_bytes,
        })
    }

    /// Skip a TLV
    ///
    /// # Returns
    /// Returns the number of bytes skipped.
    pub fn skip_tlv(&mut self) -> EmvResult<usize> {
        Ok(self.decode_tlv()?.encoded_len())
    }
}

/// Strictly decode a buffer into a flat tag → value map
///
/// Constructed tags are descended into and only their nested records are
/// stored; the constructed tag itself does not appear as an entry. The first
/// structural error aborts the whole decode.
pub fn decode(data: &[u8]) -> EmvResult<TlvMap> {
    let mut map = TlvMap::new();
    decode_into(data, 0, 0, &mut map)?;
    Ok(map)
}

fn decode_into(data: &[u8], base: usize, depth: usize, map: &mut TlvMap) -> EmvResult<()> {
    let mut decoder = TlvDecoder::with_base(data, base);

    while decoder.has_remaining() {
        let tlv = decoder.decode_tlv()?;
        log::debug!(
            "Decoded tag {} ({} bytes) at offset {}",
            tlv.tag,
            tlv.value.len(),
            tlv.offset
        );

        if tlv.is_constructed() {
            if depth >= MAX_NESTING_DEPTH {
                return Err(EmvError::NestingTooDeep {
                    offset: tlv.offset,
                    limit: MAX_NESTING_DEPTH,
                });
            }
            decode_into(tlv.value, tlv.value_offset(), depth + 1, map)?;
        } else {
            map.insert(tlv.tag, tlv.value.to_vec());
        }
    }

    Ok(())
}

/// Strictly decode the top-level records of a buffer without flattening
pub fn decode_records(data: &[u8]) -> EmvResult<Vec<Tlv<'_>>> {
    let mut decoder = TlvDecoder::new(data);
    let mut records = Vec::new();
    while decoder.has_remaining() {
        records.push(decoder.decode_tlv()?);
    }
    Ok(records)
}

/// Best-effort extraction of every tag in a buffer
///
/// Unlike [`decode`], constructed tags are stored with their raw value as
/// well as being descended into. Extraction never fails: at each nesting
/// level it stops at the first malformed record and keeps what was decoded
/// before it.
pub fn extract_all(data: &[u8]) -> TlvMap {
    let mut map = TlvMap::new();
    extract_into(data, 0, 0, &mut map);
    map
}

fn extract_into(data: &[u8], base: usize, depth: usize, map: &mut TlvMap) {
    let mut decoder = TlvDecoder::with_base(data, base);

    while decoder.has_remaining() {
        let tlv = match decoder.decode_tlv() {
            Ok(tlv) => tlv,
            Err(e) => {
                log::trace!("Stopping extraction: {}", e);
                break;
            }
        };

        map.insert(tlv.tag, tlv.value.to_vec());
        if tlv.is_constructed() && depth < MAX_NESTING_DEPTH {
            extract_into(tlv.value, tlv.value_offset(), depth + 1, map);
        }
    }
}
