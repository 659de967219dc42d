//! Tag-to-field mapping for EMV records
//!
//! This crate binds BER-TLV tags to named record fields through an explicit,
//! statically declared field table, and applies per-tag formatting rules from
//! a swappable tag catalog when encoding.
//!
//! ```rust
//! use emv_mapper::{EmvRecord, TagFieldMapper};
//!
//! let mapper = TagFieldMapper::emv().unwrap();
//! let parsed = mapper.parse(&[0x82, 0x02, 0x20, 0x30]).unwrap();
//! assert_eq!(parsed.record.application_interchange_profile, vec![0x20, 0x30]);
//!
//! let de55 = mapper.marshal_de55(&parsed.record);
//! assert_eq!(de55, vec![0x82, 0x02, 0x20, 0x30]);
//! ```

pub mod catalog;
pub mod field;
pub mod mapper;
pub mod record;

pub use catalog::{TagCatalog, TagFormat};
pub use field::{FieldDescriptor, FieldIndex, FieldShape, FieldSlot, TlvRecord};
pub use mapper::{MarshalOptions, OutputShape, Parsed, TagFieldMapper, TagOrder, TagSubset};
pub use record::EmvRecord;
