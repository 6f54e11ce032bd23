use thiserror::Error;

/// Errors produced while decoding a buffer.
///
/// Offsets are relative to the start of the region being decoded, which
/// for a deferred composite is its own retained region, not the outer
/// buffer.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Structurally invalid bytes: truncation, bad length prefix, invalid
    /// scalar encoding, trailing data.
    #[error("malformed input at offset {offset}: {reason}")]
    Malformed { offset: usize, reason: String },

    /// A tag outside the recognized set. Kept apart from `Malformed` since
    /// it may come from a newer format extension.
    #[error("unknown tag 0x{tag:02x} at offset {offset}")]
    UnknownTag { tag: u8, offset: usize },

    #[error("unsupported format version: {0}")]
    UnsupportedVersion(u16),
}

impl DecodeError {
    pub fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            offset,
            reason: reason.into(),
        }
    }

    /// Offset of the failure, if it has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Malformed { offset, .. } | Self::UnknownTag { offset, .. } => Some(*offset),
            Self::UnsupportedVersion(_) => None,
        }
    }
}

/// Errors produced while encoding a value.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("length {size} exceeds the format limit of {max}")]
    TooLarge { size: usize, max: usize },

    /// `CompositeKind::Unknown` has no wire representation.
    #[error("composite {0} has no kind")]
    UnknownKind(String),

    /// The value nests deeper than the writer's depth limit.
    #[error("value nests deeper than {max} levels")]
    TooDeep { max: u32 },

    /// A retained region had to be decoded during encode and was invalid.
    #[error("retained region could not be decoded: {0}")]
    Decode(#[from] DecodeError),
}

pub type DecodeResult<T> = Result<T, DecodeError>;

pub type EncodeResult<T> = Result<T, EncodeError>;
