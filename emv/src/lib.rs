//! EMV BER-TLV record processing
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `emv-core`: Tag identifier and error handling
//! - `emv-ber`: BER-TLV codec (strict decode, lenient extraction, encode)
//! - `emv-mapper`: Tag catalog and tag ↔ record field mapping
//!
//! # Usage
//!
//! ```
//! use emv::mapper::{EmvRecord, TagFieldMapper};
//!
//! let mapper = TagFieldMapper::emv().unwrap();
//! let record = EmvRecord {
//!     application_cryptogram: vec![0xD0, 0xC6, 0x69, 0xEE, 0xB7, 0x0C, 0x58, 0xDD],
//!     ..Default::default()
//! };
//! let de55 = mapper.marshal_de55(&record);
//! assert_eq!(&de55[..3], &[0x9F, 0x26, 0x08]);
//! ```

// Re-export core types
pub use emv_core::{EmvError, EmvResult, TagId};

// Re-export codec API
pub mod ber {
    pub use emv_ber::*;
}

// Re-export mapper API
pub mod mapper {
    pub use emv_mapper::*;
}
