//! EMV record with fields bound to the tags of GPO, Read Record and SELECT responses

use crate::field::{FieldDescriptor, TlvRecord};
use crate::{bytes_field, text_field};
use serde::{Deserialize, Serialize};

/// Parsed EMV record
///
/// Every field holds the raw value of one EMV tag; an empty field means the
/// tag was absent. The constructed templates (`77`, `6F`) are never filled
/// by decoding, which flattens them, but can be set to make the encoder wrap
/// its output in them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmvRecord {
    /// `77` Response Message Template Format 2
    #[serde(
        rename = "responseMessageTemplate1",
        with = "serde_bytes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub response_message_template: Vec<u8>,
    /// `82` Application Interchange Profile
    #[serde(with = "serde_bytes", skip_serializing_if = "Vec::is_empty")]
    pub application_interchange_profile: Vec<u8>,
    /// `57` Track 2 Equivalent Data
    #[serde(with = "serde_bytes", skip_serializing_if = "Vec::is_empty")]
    pub track2_equivalent_data: Vec<u8>,
    /// `5F20` Cardholder Name
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cardholder_name: String,
    /// `5F24` Application Expiration Date (YYMMDD)
    #[serde(with = "serde_bytes", skip_serializing_if = "Vec::is_empty")]
    pub application_expiration_date: Vec<u8>,
    /// `9F10` Issuer Application Data
    #[serde(with = "serde_bytes", skip_serializing_if = "Vec::is_empty")]
    pub issuer_application_data: Vec<u8>,
    /// `9F17` PIN Try Counter
    #[serde(with = "serde_bytes", skip_serializing_if = "Vec::is_empty")]
    pub pin_try_counter: Vec<u8>,
    /// `9F6E` Form Factor Indicator / Transaction Status Information
    #[serde(with = "serde_bytes", skip_serializing_if = "Vec::is_empty")]
    pub transaction_status_information: Vec<u8>,
    /// `9F6C` Card Transaction Qualifiers
    #[serde(
        rename = "cardTransactionQualifier",
        with = "serde_bytes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub card_transaction_qualifiers: Vec<u8>,
    /// `9F37` Unpredictable Number
    #[serde(with = "serde_bytes", skip_serializing_if = "Vec::is_empty")]
    pub unpredictable_number: Vec<u8>,
    /// `9F26` Application Cryptogram
    #[serde(with = "serde_bytes", skip_serializing_if = "Vec::is_empty")]
    pub application_cryptogram: Vec<u8>,
    /// `91` Issuer Authentication Data
    #[serde(with = "serde_bytes", skip_serializing_if = "Vec::is_empty")]
    pub issuer_authentication_data: Vec<u8>,
    /// `5F34` PAN Sequence Number
    #[serde(with = "serde_bytes", skip_serializing_if = "Vec::is_empty")]
    pub pan_sequence_number: Vec<u8>,
    /// `9F47` ICC Public Key Exponent
    ///
    /// Serialized as `cryptogramInformationData`, the name existing JSON
    /// documents carry for this tag.
    #[serde(
        rename = "cryptogramInformationData",
        with = "serde_bytes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub icc_public_key_exponent: Vec<u8>,
    /// `9F27` Cryptogram Information Data
    ///
    /// Serialized as `integratedCircuitLevelResults`.
    #[serde(
        rename = "integratedCircuitLevelResults",
        with = "serde_bytes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub cryptogram_information_data: Vec<u8>,
    /// `4F` Application Identifier (AID)
    #[serde(with = "serde_bytes", skip_serializing_if = "Vec::is_empty")]
    pub application_identifier: Vec<u8>,
    /// `50` Application Label
    #[serde(skip_serializing_if = "String::is_empty")]
    pub application_label: String,
    /// `87` Application Priority Indicator
    #[serde(with = "serde_bytes", skip_serializing_if = "Vec::is_empty")]
    pub application_priority_indicator: Vec<u8>,
    /// `9F36` Application Transaction Counter
    #[serde(with = "serde_bytes", skip_serializing_if = "Vec::is_empty")]
    pub application_transaction_counter: Vec<u8>,
    /// `6F` File Control Information Template
    #[serde(with = "serde_bytes", skip_serializing_if = "Vec::is_empty")]
    pub file_control_information: Vec<u8>,
    /// `84` Dedicated File Name
    #[serde(with = "serde_bytes", skip_serializing_if = "Vec::is_empty")]
    pub dedicated_file_name: Vec<u8>,
}

static EMV_RECORD_FIELDS: [FieldDescriptor<EmvRecord>; 21] = [
    bytes_field!("77", response_message_template, "responseMessageTemplate1"),
    bytes_field!("82", application_interchange_profile, "applicationInterchangeProfile"),
    bytes_field!("57", track2_equivalent_data, "track2EquivalentData"),
    text_field!("5F20", cardholder_name, "cardholderName"),
    bytes_field!("5F24", application_expiration_date, "applicationExpirationDate"),
    bytes_field!("9F10", issuer_application_data, "issuerApplicationData"),
    bytes_field!("9F17", pin_try_counter, "pinTryCounter"),
    bytes_field!("9F6E", transaction_status_information, "transactionStatusInformation"),
    bytes_field!("9F6C", card_transaction_qualifiers, "cardTransactionQualifier"),
    bytes_field!("9F37", unpredictable_number, "unpredictableNumber"),
    bytes_field!("9F26", application_cryptogram, "applicationCryptogram"),
    bytes_field!("91", issuer_authentication_data, "issuerAuthenticationData"),
    bytes_field!("5F34", pan_sequence_number, "panSequenceNumber"),
    bytes_field!("9F47", icc_public_key_exponent, "cryptogramInformationData"),
    bytes_field!("9F27", cryptogram_information_data, "integratedCircuitLevelResults"),
    bytes_field!("4F", application_identifier, "applicationIdentifier"),
    text_field!("50", application_label, "applicationLabel"),
    bytes_field!("87", application_priority_indicator, "applicationPriorityIndicator"),
    bytes_field!("9F36", application_transaction_counter, "applicationTransactionCounter"),
    bytes_field!("6F", file_control_information, "fileControlInformation"),
    bytes_field!("84", dedicated_file_name, "dedicatedFileName"),
];

impl TlvRecord for EmvRecord {
    fn fields() -> &'static [FieldDescriptor<Self>] {
        &EMV_RECORD_FIELDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldIndex, FieldShape};
    use emv_core::TagId;

    #[test]
    fn test_field_table_is_consistent() {
        let index = FieldIndex::build(EmvRecord::fields()).unwrap();
        assert_eq!(index.len(), 21);

        let text: Vec<&str> = EmvRecord::fields()
            .iter()
            .filter(|d| d.shape() == FieldShape::Text)
            .map(|d| d.tag)
            .collect();
        assert_eq!(text, ["5F20", "50"]);
    }

    #[test]
    fn test_json_names_match_serde() {
        let mut record = EmvRecord::default();
        for descriptor in EmvRecord::fields() {
            descriptor.assign(&mut record, b"X");
        }
        let json = serde_json::to_value(&record).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 21);
        for descriptor in EmvRecord::fields() {
            assert!(object.contains_key(descriptor.json_name), "{}", descriptor.json_name);
        }
    }

    #[test]
    fn test_empty_fields_not_serialized() {
        let record = EmvRecord {
            application_label: "VISA CREDIT".to_string(),
            application_priority_indicator: vec![0x01],
            ..Default::default()
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"applicationLabel":"VISA CREDIT","applicationPriorityIndicator":[1]}"#
        );
        let back: EmvRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_existing_json_names() {
        let json = r#"{
            "responseMessageTemplate1": [1],
            "cardTransactionQualifier": [2],
            "cryptogramInformationData": [3],
            "integratedCircuitLevelResults": [128]
        }"#;
        let record: EmvRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.response_message_template, vec![0x01]);
        assert_eq!(record.card_transaction_qualifiers, vec![0x02]);
        assert_eq!(record.icc_public_key_exponent, vec![0x03]);
        assert_eq!(record.cryptogram_information_data, vec![0x80]);

        let tag: TagId = "9F27".parse().unwrap();
        assert_eq!(record.value_by_tag(&tag), Some(&[0x80][..]));
        let tag: TagId = "9F47".parse().unwrap();
        assert_eq!(record.value_by_tag(&tag), Some(&[0x03][..]));

        let written = serde_json::to_value(&record).unwrap();
        assert_eq!(written, serde_json::from_str::<serde_json::Value>(json).unwrap());
    }

    #[test]
    fn test_value_by_tag() {
        let record = EmvRecord {
            issuer_application_data: vec![0x06, 0x02],
            cardholder_name: "CARDHOLDER/VISA".to_string(),
            ..Default::default()
        };
        let tag: TagId = "9F10".parse().unwrap();
        assert_eq!(record.value_by_tag(&tag), Some(&[0x06, 0x02][..]));
        let tag: TagId = "5F20".parse().unwrap();
        assert_eq!(record.value_by_tag(&tag), Some(&b"CARDHOLDER/VISA"[..]));
        let tag: TagId = "9F02".parse().unwrap();
        assert_eq!(record.value_by_tag(&tag), None);
    }
}
