//! BER-TLV encoder
//!
//! ```rust
//! use emv_ber::ber::TlvEncoder;
//! use emv_core::TagId;
//!
//! let tag: TagId = "82".parse().unwrap();
//! let mut encoder = TlvEncoder::new();
//! encoder.encode_tlv(&tag, &[0x20, 0x30]);
//! assert_eq!(encoder.into_bytes(), vec![0x82, 0x02, 0x20, 0x30]);
//! ```

use crate::ber::types::TlvLength;
use bytes::{BufMut, BytesMut};
use emv_core::TagId;

/// BER-TLV encoder
///
/// Accumulates encoded records in a `BytesMut` buffer. Encoding cannot fail
/// for in-memory input, so the methods return nothing.
#[derive(Debug, Default)]
pub struct TlvEncoder {
    buffer: BytesMut,
}

impl TlvEncoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new encoder with initial capacity
    ///
    /// # Arguments
    /// * `capacity` - Initial buffer capacity in bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Encode a TLV (Tag-Length-Value) triplet
    ///
    /// # Arguments
    /// * `tag` - Tag identifier, written as its 1 or 2 bytes
    /// * `value` - Raw value bytes, written unchanged
    ///
    /// # Encoding Process
    /// 1. Tag bytes as they appear in the identifier
    /// 2. Length in short form below 128, minimal long form otherwise
    /// 3. Value bytes unchanged
    pub fn encode_tlv(&mut self, tag: &TagId, value: &[u8]) {
        let length = TlvLength::new(value.len()).encode();
        self.buffer.reserve(tag.len() + length.len() + value.len());
        self.buffer.put_slice(tag.as_bytes());
        self.buffer.put_slice(&length);
        self.buffer.put_slice(value);
        log::debug!("Encoded tag {} ({} bytes)", tag, value.len());
    }

    /// Wrap already-encoded TLVs in a constructed tag
    ///
    /// # Arguments
    /// * `tag` - Template tag; callers pass a tag with the constructed bit set
    /// * `inner` - Encoder holding the nested records
    ///
    /// The nested bytes become the value of one outer record, so the outer
    /// length covers every nested header and value.
    pub fn encode_constructed(&mut self, tag: &TagId, inner: &TlvEncoder) {
        self.encode_tlv(tag, inner.as_bytes());
    }

    /// Append bytes that are already TLV-encoded
    pub fn extend_raw(&mut self, encoded: &[u8]) {
        self.buffer.put_slice(encoded);
    }

    /// Number of bytes encoded so far
    ///
    /// # Returns
    /// The total length of all records written, headers included. Useful to
    /// size an outer encoder before wrapping this one.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Get a reference to the encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the encoded bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer.to_vec()
    }
}

/// Encode a single TLV record
///
/// # Returns
/// `tag || length || value` as a new buffer.
pub fn encode_tlv(tag: &TagId, value: &[u8]) -> Vec<u8> {
    let mut encoder = TlvEncoder::with_capacity(tag.len() + 3 + value.len());
    encoder.encode_tlv(tag, value);
    encoder.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ber::decoder::decode;

    fn tag(s: &str) -> TagId {
        s.parse().unwrap()
    }

    #[test]
    fn test_reproduces_original_bytes() {
        for input in ["82022030", "9F100706021203A00000"] {
            let data = hex::decode(input).unwrap();
            let map = decode(&data).unwrap();
            let (t, v) = map.iter().next().unwrap();
            assert_eq!(encode_tlv(t, v), data);
        }
    }

    #[test]
    fn test_length_form_boundaries() {
        let t = tag("9F10");
        let cases: [(usize, &[u8]); 4] = [
            (127, &[0x7F]),
            (128, &[0x81, 0x80]),
            (255, &[0x81, 0xFF]),
            (256, &[0x82, 0x01, 0x00]),
        ];
        for (len, header) in cases {
            let encoded = encode_tlv(&t, &vec![0xAB; len]);
            assert_eq!(&encoded[..2], &[0x9F, 0x10]);
            assert_eq!(&encoded[2..2 + header.len()], header);
            assert_eq!(encoded.len(), 2 + header.len() + len);

            let map = decode(&encoded).unwrap();
            assert_eq!(map.get(&t).map(<[u8]>::len), Some(len));
        }
    }

    #[test]
    fn test_empty_value() {
        assert_eq!(encode_tlv(&tag("9F27"), &[]), vec![0x9F, 0x27, 0x00]);
    }

    #[test]
    fn test_encode_constructed() {
        let mut inner = TlvEncoder::new();
        inner.encode_tlv(&tag("82"), &[0x20, 0x30]);
        inner.encode_tlv(&tag("9F27"), &[0x80]);

        let mut outer = TlvEncoder::new();
        outer.encode_constructed(&tag("77"), &inner);
        assert_eq!(
            outer.into_bytes(),
            hex::decode("7708820220309F270180").unwrap()
        );
    }

    #[test]
    fn test_extend_raw() {
        let mut encoder = TlvEncoder::new();
        encoder.extend_raw(&[0x82, 0x00]);
        encoder.encode_tlv(&tag("87"), &[0x01]);
        assert_eq!(encoder.len(), 5);
        assert_eq!(encoder.as_bytes(), &[0x82, 0x00, 0x87, 0x01, 0x01]);
    }
}
