use thiserror::Error;

/// Main error type for EMV TLV operations
///
/// The truncation variants carry the absolute byte offset (within the
/// top-level buffer) at which the incomplete field starts, the number of
/// bytes the field needs and the number actually left.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmvError {
    #[error("Truncated tag at offset {offset}: need {expected} bytes, have {available}")]
    TruncatedTag {
        offset: usize,
        expected: usize,
        available: usize,
    },

    #[error("Truncated length at offset {offset}: need {expected} bytes, have {available}")]
    TruncatedLength {
        offset: usize,
        expected: usize,
        available: usize,
    },

    #[error("Truncated value at offset {offset}: need {expected} bytes, have {available}")]
    TruncatedValue {
        offset: usize,
        expected: usize,
        available: usize,
    },

    #[error("Length at offset {offset} uses {octets} length octets, more than this platform supports")]
    LengthOverflow { offset: usize, octets: usize },

    #[error("Constructed value at offset {offset} nests deeper than {limit} levels")]
    NestingTooDeep { offset: usize, limit: usize },

    #[error("Invalid tag: {0}")]
    InvalidTag(String),

    #[error("Tag {tag} is claimed by more than one field")]
    DuplicateTag { tag: String },

    #[error("Tag {tag} has no field in the record")]
    UnmappedTag { tag: String },
}

impl EmvError {
    /// Byte offset of a structural decode error, if this is one
    pub fn offset(&self) -> Option<usize> {
        match self {
            EmvError::TruncatedTag { offset, .. }
            | EmvError::TruncatedLength { offset, .. }
            | EmvError::TruncatedValue { offset, .. }
            | EmvError::LengthOverflow { offset, .. }
            | EmvError::NestingTooDeep { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

/// Result type alias for EMV TLV operations
pub type EmvResult<T> = Result<T, EmvError>;
