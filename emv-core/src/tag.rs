use crate::error::{EmvError, EmvResult};
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Low five bits of a first tag byte marking a two-byte tag
const TAG_NUMBER_MASK: u8 = 0x1F;

/// Bit 6 of the first tag byte: constructed (1) or primitive (0)
const CONSTRUCTED_BIT: u8 = 0x20;

/// EMV tag identifier
///
/// EMV uses the BER tag encoding restricted to one or two bytes:
///
/// ```text
/// First byte:  C C P T T T T T
/// ```
///
/// - CC = class
/// - P = primitive (0) or constructed (1)
/// - TTTTT = tag number, or 11111 when a second tag byte follows
///
/// The identifier is compared and displayed as its canonical uppercase
/// hexadecimal text (`"9F10"`), and ordered by its numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagId {
    bytes: [u8; 2],
    len: u8,
}

impl TagId {
    /// Create a tag from its raw bytes
    ///
    /// # Returns
    /// Returns `Err(EmvError::InvalidTag)` if the byte count does not match
    /// what the first byte announces.
    pub fn from_bytes(raw: &[u8]) -> EmvResult<Self> {
        match raw {
            [first] if first & TAG_NUMBER_MASK != TAG_NUMBER_MASK => Ok(Self {
                bytes: [*first, 0],
                len: 1,
            }),
            [first, second] if first & TAG_NUMBER_MASK == TAG_NUMBER_MASK => Ok(Self {
                bytes: [*first, *second],
                len: 2,
            }),
            _ => Err(EmvError::InvalidTag(format!(
                "{} is not a well-formed one or two byte tag",
                hex::encode_upper(raw)
            ))),
        }
    }

    /// Number of bytes the tag occupies given its first byte
    pub fn encoded_len(first_byte: u8) -> usize {
        if first_byte & TAG_NUMBER_MASK == TAG_NUMBER_MASK {
            2
        } else {
            1
        }
    }

    /// Raw tag bytes as they appear on the wire
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// First tag byte (class, constructed flag, tag number)
    pub fn first_byte(&self) -> u8 {
        self.bytes[0]
    }

    /// Number of raw bytes (1 or 2)
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Tags are never empty; provided for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check if the tag marks a constructed value
    pub fn is_constructed(&self) -> bool {
        self.bytes[0] & CONSTRUCTED_BIT != 0
    }

    /// Numeric value of the tag bytes read big-endian
    pub fn value(&self) -> u16 {
        self.as_bytes()
            .iter()
            .fold(0u16, |acc, &b| (acc << 8) | b as u16)
    }
}

impl Ord for TagId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value().cmp(&other.value())
    }
}

impl PartialOrd for TagId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for TagId {
    type Err = EmvError;

    /// Parse hexadecimal tag text such as `"82"` or `"9f10"`
    fn from_str(s: &str) -> EmvResult<Self> {
        let raw = hex::decode(s.trim())
            .map_err(|e| EmvError::InvalidTag(format!("{}: {}", s, e)))?;
        Self::from_bytes(&raw)
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.as_bytes()))
    }
}

impl Serialize for TagId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TagId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}
