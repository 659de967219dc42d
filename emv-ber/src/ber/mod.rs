//! BER-TLV encoder and decoder
//!
//! Each EMV data element is encoded as a TLV (Tag-Length-Value) triplet:
//!
//! ```text
//! [Tag] [Length] [Value]
//! ```
//!
//! ## Tag Encoding
//!
//! One byte, or two bytes when the low five bits of the first byte are all
//! set (`0x1F`). Bit 6 (`0x20`) of the first byte marks a constructed tag
//! whose value is itself a sequence of TLVs.
//!
//! ## Length Encoding
//!
//! - **Short form** (1 byte): lengths 0-127, bit 7 = 0
//! - **Long form**: first byte `0x80 | N`, followed by `N` big-endian length bytes
//!
//! # Decoding Contracts
//!
//! - [`decode`] is strict: the first structural error aborts the parse and
//!   no partial result is returned.
//! - [`extract_all`] is lenient: it never fails and returns everything
//!   decoded before the first malformed record.
//!
//! Both flatten constructed tags into a single [`TlvMap`].

pub mod decoder;
pub mod encoder;
pub mod map;
pub mod types;

pub use decoder::{Tlv, TlvDecoder, decode, decode_records, extract_all};
pub use encoder::{TlvEncoder, encode_tlv};
pub use map::TlvMap;
pub use types::TlvLength;
