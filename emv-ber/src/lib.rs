//! BER-TLV processing for EMV chip data
//!
//! This crate provides the low-level TLV codec: tag/length/value framing,
//! recursive descent into constructed tags, and byte-exact re-encoding.
//!
//! ```rust
//! use emv_ber::{decode, encode_tlv};
//!
//! let data = [0x82, 0x02, 0x20, 0x30];
//! let tlvs = decode(&data).unwrap();
//! let (tag, value) = tlvs.iter().next().unwrap();
//! assert_eq!(tag.to_string(), "82");
//! assert_eq!(encode_tlv(tag, value), data);
//! ```

pub mod ber;

pub use ber::{
    Tlv, TlvDecoder, TlvEncoder, TlvLength, TlvMap, decode, decode_records, encode_tlv,
    extract_all,
};
pub use emv_core::{EmvError, EmvResult, TagId};
