//! Core types and utilities for EMV BER-TLV processing
//!
//! This crate provides the tag identifier type and the error type shared by
//! the codec and mapper crates.

pub mod error;
pub mod tag;

pub use error::{EmvError, EmvResult};
pub use tag::TagId;
