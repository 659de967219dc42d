//! EMV tag catalog (per-tag formatting metadata)
//!
//! The catalog is domain reference data: it can be replaced or loaded from
//! any serde format without touching codec logic.
//!
//! ```json
//! {
//!   "default": { "min_length": 0 },
//!   "tags": {
//!     "9F26": { "min_length": 8, "max_length": 8, "pad_left": true, "de55": true }
//!   }
//! }
//! ```

use emv_core::TagId;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Expected format of one EMV tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagFormat {
    /// Minimum length in bytes; shorter values are zero-padded on encode
    pub min_length: usize,
    /// Maximum length in bytes (0 means no maximum)
    pub max_length: usize,
    /// Pad with leading zeros (true) or trailing zeros (false)
    pub pad_left: bool,
    pub description: String,
    /// Whether the tag belongs to the DE55 data element
    pub de55: bool,
}

impl TagFormat {
    /// Create a tag format
    ///
    /// # Arguments
    /// * `min_length` - Minimum encoded length in bytes; 0 disables padding
    /// * `max_length` - Maximum length in bytes; 0 means unbounded
    /// * `pad_left` - Pad with leading zeros instead of trailing zeros
    /// * `description` - Human-readable tag name
    /// * `de55` - Include the tag in DE55 output
    pub fn new(
        min_length: usize,
        max_length: usize,
        pad_left: bool,
        description: impl Into<String>,
        de55: bool,
    ) -> Self {
        Self {
            min_length,
            max_length,
            pad_left,
            description: description.into(),
            de55,
        }
    }

    /// Apply the padding rule to a raw value
    ///
    /// Values at least `min_length` long are returned unchanged. Shorter
    /// values are copied into a zero-filled buffer of exactly `min_length`
    /// bytes, right-aligned when `pad_left` is set and left-aligned
    /// otherwise.
    pub fn format_value<'v>(&self, value: &'v [u8]) -> Cow<'v, [u8]> {
        if value.len() >= self.min_length {
            return Cow::Borrowed(value);
        }

        let mut padded = vec![0u8; self.min_length];
        if self.pad_left {
            padded[self.min_length - value.len()..].copy_from_slice(value);
        } else {
            padded[..value.len()].copy_from_slice(value);
        }
        Cow::Owned(padded)
    }

    /// Check a value against `max_length`
    pub fn exceeds_max(&self, len: usize) -> bool {
        self.max_length != 0 && len > self.max_length
    }
}

/// Built-in EMV tag dictionary
///
/// Columns: tag, min length, max length, pad left, description, DE55.
const EMV_TAG_FORMATS: &[(&str, usize, usize, bool, &str, bool)] = &[
    ("4F", 5, 16, false, "Application Identifier (AID)", false),
    ("50", 0, 0, false, "Application Label", false),
    ("57", 0, 37, false, "Track 2 Equivalent Data", false),
    ("5F20", 0, 26, false, "Cardholder Name", false),
    ("5F24", 3, 3, true, "Application Expiration Date", false),
    ("82", 2, 2, true, "Application Interchange Profile", true),
    ("84", 0, 0, false, "Dedicated File Name", false),
    ("87", 0, 0, false, "Application Priority Indicator", false),
    ("9F02", 6, 6, true, "Amount, Authorized (Numeric)", true),
    ("9F03", 6, 6, true, "Amount, Other (Numeric)", true),
    ("9F10", 0, 32, false, "Issuer Application Data", true),
    ("9F26", 8, 8, true, "Application Cryptogram", true),
    ("9F27", 1, 1, true, "Cryptogram Information Data", true),
    ("9F36", 2, 2, true, "Application Transaction Counter", true),
    ("9F37", 4, 4, true, "Unpredictable Number", true),
    ("95", 5, 5, false, "Terminal Verification Results", true),
    ("77", 0, 0, false, "Response Message Template", false),
    ("6F", 0, 0, false, "File Control Information (FCI) Template", false),
    ("BF0C", 0, 0, false, "File Control Information (Proprietary Template)", false),
    ("A5", 0, 0, false, "File Control Information (FCI) Issuer Discretionary Data", false),
];

/// Mapping from tag to [`TagFormat`] with a fallback for unknown tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCatalog {
    /// Fallback format for tags absent from `tags`
    #[serde(default)]
    default: TagFormat,
    #[serde(default)]
    tags: BTreeMap<TagId, TagFormat>,
}

impl TagCatalog {
    /// Create an empty catalog with the given fallback format
    pub fn with_default(default: TagFormat) -> Self {
        Self {
            default,
            tags: BTreeMap::new(),
        }
    }

    /// The built-in EMV tag dictionary
    ///
    /// Unknown tags fall back to a zero-length, unpadded, non-DE55 format.
    pub fn emv_default() -> Self {
        let mut catalog = Self::with_default(TagFormat::new(0, 0, false, "Default Tag Format", false));
        for &(text, min, max, pad_left, description, de55) in EMV_TAG_FORMATS {
            match text.parse() {
                Ok(tag) => {
                    catalog.insert(tag, TagFormat::new(min, max, pad_left, description, de55));
                }
                Err(e) => {
                    debug_assert!(false, "built-in tag {:?} is malformed: {}", text, e);
                    log::error!("Built-in tag {:?} is malformed: {}", text, e);
                }
            }
        }
        catalog
    }

    /// Add or replace the format of a tag
    pub fn insert(&mut self, tag: TagId, format: TagFormat) -> Option<TagFormat> {
        self.tags.insert(tag, format)
    }

    /// Format of a tag present in the catalog
    pub fn get(&self, tag: &TagId) -> Option<&TagFormat> {
        self.tags.get(tag)
    }

    /// Format of a tag, falling back to the default entry
    pub fn format_for(&self, tag: &TagId) -> &TagFormat {
        self.tags.get(tag).unwrap_or(&self.default)
    }

    pub fn default_format(&self) -> &TagFormat {
        &self.default
    }

    /// Human description of a tag, `"Unknown"` when not catalogued
    pub fn description(&self, tag: &TagId) -> &str {
        self.get(tag).map_or("Unknown", |f| f.description.as_str())
    }

    pub fn is_de55(&self, tag: &TagId) -> bool {
        self.format_for(tag).de55
    }

    /// Pad a value for encoding according to its tag's format
    pub fn format_value<'v>(&self, value: &'v [u8], tag: &TagId) -> Cow<'v, [u8]> {
        self.format_for(tag).format_value(value)
    }

    /// Iterate over catalogued tags in ascending order
    pub fn iter(&self) -> impl Iterator<Item = (&TagId, &TagFormat)> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
