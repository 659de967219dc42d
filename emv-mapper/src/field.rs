//! Static tag ↔ field binding
//!
//! A record type declares its fields once, as a table of
//! [`FieldDescriptor`]s. Each descriptor names the tag, the field and a pair
//! of accessor functions whose signature fixes the field's shape (raw bytes
//! or text) at compile time.

use emv_core::{EmvError, EmvResult, TagId};
use std::collections::BTreeMap;

/// Shape of a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldShape {
    /// Raw bytes, stored as-is
    Bytes,
    /// Text, stored as the UTF-8 decoding of the bytes
    Text,
}

/// Accessors for one field of record type `R`
pub enum FieldSlot<R> {
    Bytes {
        get: fn(&R) -> &[u8],
        set: fn(&mut R, Vec<u8>),
    },
    Text {
        get: fn(&R) -> &str,
        set: fn(&mut R, String),
    },
}

/// Binding of one EMV tag to one record field
pub struct FieldDescriptor<R> {
    /// Tag in hex text form (`"9F10"`)
    pub tag: &'static str,
    /// Rust field name
    pub name: &'static str,
    /// Name used when the record is serialized
    pub json_name: &'static str,
    pub slot: FieldSlot<R>,
}

impl<R> FieldDescriptor<R> {
    pub fn shape(&self) -> FieldShape {
        match self.slot {
            FieldSlot::Bytes { .. } => FieldShape::Bytes,
            FieldSlot::Text { .. } => FieldShape::Text,
        }
    }

    /// Current value of the field as bytes
    pub fn value<'r>(&self, record: &'r R) -> &'r [u8] {
        match &self.slot {
            FieldSlot::Bytes { get, .. } => get(record),
            FieldSlot::Text { get, .. } => get(record).as_bytes(),
        }
    }

    /// A field is empty when its byte length is zero
    pub fn is_empty(&self, record: &R) -> bool {
        self.value(record).is_empty()
    }

    /// Store a decoded value into the field
    ///
    /// Text fields take the UTF-8 decoding of the bytes; invalid sequences
    /// are replaced with U+FFFD and reported.
    pub fn assign(&self, record: &mut R, raw: &[u8]) {
        match &self.slot {
            FieldSlot::Bytes { set, .. } => set(record, raw.to_vec()),
            FieldSlot::Text { set, .. } => {
                let text = match std::str::from_utf8(raw) {
                    Ok(text) => text.to_string(),
                    Err(e) => {
                        log::warn!("Tag {} ({}) is not valid UTF-8: {}", self.tag, self.name, e);
                        String::from_utf8_lossy(raw).into_owned()
                    }
                };
                set(record, text)
            }
        }
    }
}

/// A record whose fields are bound to EMV tags
pub trait TlvRecord: Default + 'static {
    /// The record's static field table
    fn fields() -> &'static [FieldDescriptor<Self>];

    /// Value of the field bound to `tag`, if the record has one
    fn value_by_tag(&self, tag: &TagId) -> Option<&[u8]> {
        Self::fields()
            .iter()
            .find(|d| d.tag.parse::<TagId>().is_ok_and(|t| t == *tag))
            .map(|d| d.value(self))
    }
}

/// Declare a raw-bytes field descriptor for a `Vec<u8>` record field
#[macro_export]
macro_rules! bytes_field {
    ($tag:literal, $field:ident, $json:literal) => {
        $crate::field::FieldDescriptor {
            tag: $tag,
            name: stringify!($field),
            json_name: $json,
            slot: $crate::field::FieldSlot::Bytes {
                get: |r| r.$field.as_slice(),
                set: |r, v| r.$field = v,
            },
        }
    };
}

/// Declare a text field descriptor for a `String` record field
#[macro_export]
macro_rules! text_field {
    ($tag:literal, $field:ident, $json:literal) => {
        $crate::field::FieldDescriptor {
            tag: $tag,
            name: stringify!($field),
            json_name: $json,
            slot: $crate::field::FieldSlot::Text {
                get: |r| r.$field.as_str(),
                set: |r, v| r.$field = v,
            },
        }
    };
}

/// Lookup from tag to field descriptor
///
/// Built once from a record's field table. Keeps the table's declaration
/// order alongside the tag index.
pub struct FieldIndex<R: 'static> {
    by_tag: BTreeMap<TagId, &'static FieldDescriptor<R>>,
    declared: Vec<TagId>,
}

impl<R: 'static> FieldIndex<R> {
    /// Build the index from a field table
    ///
    /// # Error Handling
    /// - `InvalidTag` if a descriptor's tag text is malformed
    /// - `DuplicateTag` if two descriptors claim the same tag
    pub fn build(descriptors: &'static [FieldDescriptor<R>]) -> EmvResult<Self> {
        let mut by_tag = BTreeMap::new();
        let mut declared = Vec::with_capacity(descriptors.len());

        for descriptor in descriptors {
            let tag: TagId = descriptor.tag.parse()?;
            if by_tag.insert(tag, descriptor).is_some() {
                return Err(EmvError::DuplicateTag {
                    tag: tag.to_string(),
                });
            }
            declared.push(tag);
        }

        Ok(Self { by_tag, declared })
    }

    /// Descriptor bound to a tag
    ///
    /// # Returns
    /// `None` for tags the record has no field for; callers report these as
    /// unmapped.
    pub fn get(&self, tag: &TagId) -> Option<&'static FieldDescriptor<R>> {
        self.by_tag.get(tag).copied()
    }

    pub fn contains(&self, tag: &TagId) -> bool {
        self.by_tag.contains_key(tag)
    }

    /// Fields in ascending tag order
    pub fn ascending(&self) -> impl Iterator<Item = (TagId, &'static FieldDescriptor<R>)> + '_ {
        self.by_tag.iter().map(|(t, d)| (*t, *d))
    }

    /// Fields in the order the table declares them
    pub fn declared(&self) -> impl Iterator<Item = (TagId, &'static FieldDescriptor<R>)> + '_ {
        self.declared.iter().map(|t| (*t, self.by_tag[t]))
    }

    pub fn len(&self) -> usize {
        self.declared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }
}
