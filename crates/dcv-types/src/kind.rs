use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of a composite value.
///
/// `Unknown` only describes a composite whose identity has not been decoded
/// yet. It is never written to the wire and never a valid decoded kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompositeKind {
    #[default]
    Unknown,
    Structure,
    Resource,
    Contract,
    Event,
    Enum,
}

impl CompositeKind {
    /// Wire byte for this kind. `Unknown` has no wire representation.
    pub fn to_byte(self) -> Option<u8> {
        match self {
            Self::Unknown => None,
            Self::Structure => Some(1),
            Self::Resource => Some(2),
            Self::Contract => Some(3),
            Self::Event => Some(4),
            Self::Enum => Some(5),
        }
    }

    /// Parse a wire byte. Returns `None` for `0` and any unassigned byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::Structure),
            2 => Some(Self::Resource),
            3 => Some(Self::Contract),
            4 => Some(Self::Event),
            5 => Some(Self::Enum),
            _ => None,
        }
    }

    /// Whether values of this kind are resources.
    pub fn is_resource(self) -> bool {
        matches!(self, Self::Resource)
    }
}

impl fmt::Display for CompositeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Structure => write!(f, "structure"),
            Self::Resource => write!(f, "resource"),
            Self::Contract => write!(f, "contract"),
            Self::Event => write!(f, "event"),
            Self::Enum => write!(f, "enum"),
        }
    }
}
