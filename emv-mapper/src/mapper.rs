//! Tag-field mapper: TLV bytes ↔ structured record
//!
//! # Decode
//!
//! ```text
//! bytes → decode (flat tag → value) → assign into record fields
//! ```
//!
//! Tags without a field are skipped and reported, never fatal: the EMV tag
//! space is larger than any one record. Callers that need every tag mapped
//! use [`Parsed::into_strict`].
//!
//! # Encode
//!
//! ```text
//! record fields → subset filter → padding → encode → (optional template) → bytes
//! ```
//!
//! The mapper keeps no per-call state, so one instance can serve any number
//! of concurrent callers.

use crate::catalog::TagCatalog;
use crate::field::{FieldIndex, TlvRecord};
use crate::record::EmvRecord;
use emv_ber::{TlvEncoder, TlvMap, decode};
use emv_core::{EmvError, EmvResult, TagId};
use std::borrow::Cow;
use std::collections::BTreeSet;

/// Which fields take part in encoding
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TagSubset {
    /// Every non-empty field
    #[default]
    All,
    /// Fields whose catalog entry is marked DE55
    De55,
    /// Only the listed tags
    Only(BTreeSet<TagId>),
    /// Every tag except the listed ones
    Except(BTreeSet<TagId>),
}

impl TagSubset {
    pub fn includes(&self, tag: &TagId, catalog: &TagCatalog) -> bool {
        match self {
            TagSubset::All => true,
            TagSubset::De55 => catalog.is_de55(tag),
            TagSubset::Only(tags) => tags.contains(tag),
            TagSubset::Except(tags) => !tags.contains(tag),
        }
    }
}

/// Layout of the encoded output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputShape {
    /// Concatenated TLVs
    #[default]
    Flat,
    /// All TLVs wrapped in one constructed template tag, when the record has
    /// a non-empty field for that tag; flat otherwise
    ///
    /// A primitive tag is encoded as an ordinary field and the output stays
    /// flat.
    Template(TagId),
}

/// Order of the encoded TLVs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagOrder {
    /// Ascending numeric tag value
    #[default]
    Ascending,
    /// The record's field table order
    Declaration,
}

/// Encoding configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarshalOptions {
    pub subset: TagSubset,
    pub shape: OutputShape,
    pub order: TagOrder,
}

impl MarshalOptions {
    /// DE55 tags only, flat, ascending
    pub fn de55() -> Self {
        Self {
            subset: TagSubset::De55,
            ..Default::default()
        }
    }

    pub fn with_subset(mut self, subset: TagSubset) -> Self {
        self.subset = subset;
        self
    }

    pub fn with_shape(mut self, shape: OutputShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_order(mut self, order: TagOrder) -> Self {
        self.order = order;
        self
    }
}

/// Result of mapping decoded TLVs onto a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed<R> {
    pub record: R,
    /// Tags decoded but without a field in the record, in input order
    pub unmapped: Vec<TagId>,
}

impl<R> Parsed<R> {
    /// Check if every decoded tag found a field
    pub fn is_complete(&self) -> bool {
        self.unmapped.is_empty()
    }

    /// Treat any unmapped tag as an error
    pub fn into_strict(self) -> EmvResult<R> {
        match self.unmapped.first() {
            Some(tag) => Err(EmvError::UnmappedTag {
                tag: tag.to_string(),
            }),
            None => Ok(self.record),
        }
    }
}

/// Maps between BER-TLV bytes and records of type `R`
///
/// Holds only the immutable field index and tag catalog.
pub struct TagFieldMapper<R: TlvRecord = EmvRecord> {
    fields: FieldIndex<R>,
    catalog: TagCatalog,
}

impl TagFieldMapper<EmvRecord> {
    /// Mapper for [`EmvRecord`] with the built-in EMV catalog
    pub fn emv() -> EmvResult<Self> {
        Self::new(TagCatalog::emv_default())
    }
}

impl<R: TlvRecord> TagFieldMapper<R> {
    /// Create a mapper for `R` using the given catalog
    ///
    /// # Error Handling
    /// Fails if `R`'s field table binds one tag twice or holds a malformed tag.
    pub fn new(catalog: TagCatalog) -> EmvResult<Self> {
        Ok(Self {
            fields: FieldIndex::build(R::fields())?,
            catalog,
        })
    }

    pub fn catalog(&self) -> &TagCatalog {
        &self.catalog
    }

    pub fn fields(&self) -> &FieldIndex<R> {
        &self.fields
    }

    /// Strictly decode `data` and map it onto a new record
    ///
    /// The trailing status word of a card response must already be stripped.
    pub fn parse(&self, data: &[u8]) -> EmvResult<Parsed<R>> {
        let tlvs = decode(data)?;
        Ok(self.assign(&tlvs))
    }

    /// Map a flat tag → value mapping onto a new record
    pub fn assign(&self, tlvs: &TlvMap) -> Parsed<R> {
        let mut record = R::default();
        let mut unmapped = Vec::new();

        for (tag, value) in tlvs.iter() {
            match self.fields.get(tag) {
                Some(descriptor) => descriptor.assign(&mut record, value),
                None => {
                    log::warn!(
                        "Tag {} ({}) found in data but has no field in the record",
                        tag,
                        self.catalog.description(tag)
                    );
                    unmapped.push(*tag);
                }
            }
        }

        Parsed { record, unmapped }
    }

    /// Pad a raw value for encoding according to the catalog
    pub fn format_for_encode<'v>(&self, value: &'v [u8], tag: &TagId) -> Cow<'v, [u8]> {
        self.catalog.format_value(value, tag)
    }

    /// Encode a record's non-empty fields
    ///
    /// # Encoding Process
    /// 1. Walk the field table in the order `options.order` selects
    /// 2. Skip empty fields, fields outside `options.subset` and the template tag
    /// 3. Pad each value per the catalog and encode it as one TLV
    /// 4. Wrap the result in the template tag, if one applies
    ///
    /// Values longer than the catalog maximum are encoded unchanged and
    /// logged.
    pub fn marshal(&self, record: &R, options: &MarshalOptions) -> Vec<u8> {
        let template = match options.shape {
            OutputShape::Template(tag) if !tag.is_constructed() => {
                log::warn!("Template tag {} is primitive, encoding flat", tag);
                None
            }
            OutputShape::Template(tag) => self
                .fields
                .get(&tag)
                .filter(|d| !d.is_empty(record))
                .map(|_| tag),
            OutputShape::Flat => None,
        };

        let fields: Vec<_> = match options.order {
            TagOrder::Ascending => self.fields.ascending().collect(),
            TagOrder::Declaration => self.fields.declared().collect(),
        };

        let mut encoder = TlvEncoder::new();
        for (tag, descriptor) in fields {
            if Some(tag) == template || descriptor.is_empty(record) {
                continue;
            }
            if !options.subset.includes(&tag, &self.catalog) {
                continue;
            }

            let format = self.catalog.format_for(&tag);
            let value = format.format_value(descriptor.value(record));
            if format.exceeds_max(value.len()) {
                log::warn!(
                    "Tag {} value is {} bytes, longer than the {} byte maximum",
                    tag,
                    value.len(),
                    format.max_length
                );
            }
            encoder.encode_tlv(&tag, &value);
        }

        match template {
            Some(tag) => {
                let mut outer = TlvEncoder::with_capacity(encoder.len() + 4);
                outer.encode_constructed(&tag, &encoder);
                outer.into_bytes()
            }
            None => encoder.into_bytes(),
        }
    }

    /// Encode the DE55 fields of a record as flat, ascending TLVs
    pub fn marshal_de55(&self, record: &R) -> Vec<u8> {
        self.marshal(record, &MarshalOptions::de55())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GPO_RESPONSE: &str = "77598202200057134147202500716749D26072011010041301051F5F200F43415244484F4C4445522F564953415F3401019F100706021203A000009F2608D0C669EEB70C58DD9F2701809F360200699F6C0200009F6E04207000009000";
    const FCI_RESPONSE: &str = "6F30840E325041592E5359532E4444463031A51EBF0C1B61194F07A0000000031010500B56495341204352454449548701019000";

    fn tag(s: &str) -> TagId {
        s.parse().unwrap()
    }

    /// Card response with the status word stripped
    fn response(hex_text: &str) -> Vec<u8> {
        let mut data = hex::decode(hex_text).unwrap();
        data.truncate(data.len() - 2);
        data
    }

    #[test]
    fn test_parse_gpo_response() {
        let mapper = TagFieldMapper::emv().unwrap();
        let parsed = mapper.parse(&response(GPO_RESPONSE)).unwrap();
        let record = &parsed.record;

        assert_eq!(record.application_interchange_profile, vec![0x20, 0x00]);
        assert_eq!(record.cardholder_name, "CARDHOLDER/VISA");
        assert_eq!(record.pan_sequence_number, vec![0x01]);
        assert_eq!(
            record.application_cryptogram,
            hex::decode("D0C669EEB70C58DD").unwrap()
        );
        assert_eq!(record.cryptogram_information_data, vec![0x80]);
        assert_eq!(record.application_transaction_counter, vec![0x00, 0x69]);
        assert_eq!(record.card_transaction_qualifiers, vec![0x00, 0x00]);
        assert_eq!(record.transaction_status_information, vec![0x20, 0x70, 0x00, 0x00]);
        // Templates are flattened away
        assert!(record.response_message_template.is_empty());
        assert!(parsed.is_complete());
    }

    #[test]
    fn test_parse_fci_response() {
        let mapper = TagFieldMapper::emv().unwrap();
        let parsed = mapper.parse(&response(FCI_RESPONSE)).unwrap();
        let record = &parsed.record;

        assert_eq!(record.dedicated_file_name, b"2PAY.SYS.DDF01".to_vec());
        assert_eq!(
            record.application_identifier,
            hex::decode("A0000000031010").unwrap()
        );
        assert_eq!(record.application_label, "VISA CREDIT");
        assert_eq!(record.application_priority_indicator, vec![0x01]);
        assert!(record.file_control_information.is_empty());
    }

    #[test]
    fn test_unmapped_tags_reported() {
        let mapper = TagFieldMapper::emv().unwrap();
        // 9F02 is catalogued but has no field; DF01 is neither
        let data = hex::decode("820220309F0206000000001000DF0101AA").unwrap();
        let parsed = mapper.parse(&data).unwrap();

        assert_eq!(parsed.record.application_interchange_profile, vec![0x20, 0x30]);
        assert_eq!(parsed.unmapped, vec![tag("9F02"), tag("DF01")]);
        assert_eq!(
            parsed.into_strict().unwrap_err(),
            EmvError::UnmappedTag { tag: "9F02".to_string() }
        );
    }

    #[test]
    fn test_parse_is_strict() {
        let mapper = TagFieldMapper::emv().unwrap();
        let err = mapper.parse(&[0x82, 0x05, 0x20]).err().unwrap();
        assert_eq!(
            err,
            EmvError::TruncatedValue {
                offset: 2,
                expected: 5,
                available: 1
            }
        );
    }

    #[test]
    fn test_marshal_de55_subset() {
        let mapper = TagFieldMapper::emv().unwrap();
        let record = EmvRecord {
            response_message_template: vec![0x01],
            issuer_application_data: hex::decode("06021203A00000").unwrap(),
            application_cryptogram: hex::decode("D0C669EEB70C58DD").unwrap(),
            ..Default::default()
        };

        let encoded = mapper.marshal_de55(&record);
        assert_eq!(
            hex::encode_upper(&encoded),
            "9F100706021203A000009F2608D0C669EEB70C58DD"
        );
    }

    #[test]
    fn test_marshal_de55_from_gpo() {
        let mapper = TagFieldMapper::emv().unwrap();
        let parsed = mapper.parse(&response(GPO_RESPONSE)).unwrap();
        let encoded = mapper.marshal_de55(&parsed.record);
        assert_eq!(
            hex::encode_upper(&encoded),
            "820220009F100706021203A000009F2608D0C669EEB70C58DD9F2701809F36020069"
        );
    }

    #[test]
    fn test_marshal_applies_padding() {
        let mapper = TagFieldMapper::emv().unwrap();
        let record = EmvRecord {
            application_interchange_profile: vec![0x30],
            application_identifier: vec![0xA0, 0x00],
            ..Default::default()
        };
        let encoded = mapper.marshal(&record, &MarshalOptions::default());
        assert_eq!(hex::encode_upper(&encoded), "4F05A00000000082020030");
        // The record itself is left untouched
        assert_eq!(record.application_interchange_profile, vec![0x30]);
    }

    #[test]
    fn test_marshal_template_wraps() {
        let mapper = TagFieldMapper::emv().unwrap();
        let record = EmvRecord {
            response_message_template: vec![0xFF],
            application_interchange_profile: vec![0x20, 0x30],
            cryptogram_information_data: vec![0x80],
            ..Default::default()
        };
        let options = MarshalOptions::default().with_shape(OutputShape::Template(tag("77")));
        let encoded = mapper.marshal(&record, &options);
        assert_eq!(hex::encode_upper(&encoded), "7708820220309F270180");
    }

    #[test]
    fn test_marshal_template_absent_is_flat() {
        let mapper = TagFieldMapper::emv().unwrap();
        let record = EmvRecord {
            application_interchange_profile: vec![0x20, 0x30],
            ..Default::default()
        };
        let options = MarshalOptions::default().with_shape(OutputShape::Template(tag("77")));
        assert_eq!(mapper.marshal(&record, &options), vec![0x82, 0x02, 0x20, 0x30]);
    }

    #[test]
    fn test_marshal_primitive_template_is_flat() {
        let mapper = TagFieldMapper::emv().unwrap();
        let record = EmvRecord {
            application_interchange_profile: vec![0x20, 0x30],
            cryptogram_information_data: vec![0x80],
            ..Default::default()
        };
        let options = MarshalOptions::default().with_shape(OutputShape::Template(tag("82")));
        let encoded = mapper.marshal(&record, &options);
        assert_eq!(hex::encode_upper(&encoded), "820220309F270180");

        let parsed = mapper.parse(&encoded).unwrap();
        assert_eq!(parsed.record, record);
    }

    #[test]
    fn test_marshal_declaration_order() {
        let mapper = TagFieldMapper::emv().unwrap();
        let record = EmvRecord {
            application_interchange_profile: vec![0x20, 0x30],
            track2_equivalent_data: vec![0x41],
            application_label: "VISA".to_string(),
            ..Default::default()
        };

        let ascending = mapper.marshal(&record, &MarshalOptions::default());
        assert_eq!(hex::encode_upper(&ascending), "50045649534157014182022030");

        let declared = mapper.marshal(
            &record,
            &MarshalOptions::default().with_order(TagOrder::Declaration),
        );
        assert_eq!(hex::encode_upper(&declared), "82022030570141500456495341");
    }

    #[test]
    fn test_marshal_only_and_except() {
        let mapper = TagFieldMapper::emv().unwrap();
        let record = EmvRecord {
            application_interchange_profile: vec![0x20, 0x30],
            cryptogram_information_data: vec![0x80],
            ..Default::default()
        };

        let only = MarshalOptions::default().with_subset(TagSubset::Only([tag("9F27")].into()));
        assert_eq!(mapper.marshal(&record, &only), vec![0x9F, 0x27, 0x01, 0x80]);

        let except = MarshalOptions::default().with_subset(TagSubset::Except([tag("9F27")].into()));
        assert_eq!(mapper.marshal(&record, &except), vec![0x82, 0x02, 0x20, 0x30]);
    }

    #[test]
    fn test_round_trip_field_for_field() {
        let mapper = TagFieldMapper::emv().unwrap();
        for fixture in [GPO_RESPONSE, FCI_RESPONSE] {
            let first = mapper.parse(&response(fixture)).unwrap().record;
            let encoded = mapper.marshal(&first, &MarshalOptions::default());
            let second = mapper.parse(&encoded).unwrap().record;
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_round_trip_after_padding() {
        let mapper = TagFieldMapper::emv().unwrap();
        // Short cryptogram is normalized to 8 bytes on the first encode
        let data = hex::decode("9F2603C669EE").unwrap();
        let first = mapper.parse(&data).unwrap().record;
        let encoded = mapper.marshal_de55(&first);
        assert_eq!(hex::encode_upper(&encoded), "9F26080000000000C669EE");

        let second = mapper.parse(&encoded).unwrap().record;
        let again = mapper.marshal_de55(&second);
        assert_eq!(again, encoded);
        assert_eq!(mapper.parse(&again).unwrap().record, second);
    }

    #[test]
    fn test_format_for_encode_idempotent() {
        let mapper = TagFieldMapper::emv().unwrap();
        for t in ["82", "9F26", "4F", "9F6E"] {
            let t = tag(t);
            let once = mapper.format_for_encode(&[0x01], &t).into_owned();
            let twice = mapper.format_for_encode(&once, &t).into_owned();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_mapper_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TagFieldMapper>();
    }
}
