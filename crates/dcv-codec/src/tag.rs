use std::fmt;

/// Leading type tag of every encoded value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Absent optional.
    Nil,
    /// Present optional, followed by the wrapped value.
    Some,
    Bool,
    String,
    /// Signed integer.
    Int,
    UInt64,
    Address,
    /// Element count followed by the elements.
    Array,
    /// Entry count followed by alternating keys and values.
    Dictionary,
    /// Body length followed by the composite body.
    Composite,
}

impl Tag {
    pub const ALL: [Tag; 10] = [
        Tag::Nil,
        Tag::Some,
        Tag::Bool,
        Tag::String,
        Tag::Int,
        Tag::UInt64,
        Tag::Address,
        Tag::Array,
        Tag::Dictionary,
        Tag::Composite,
    ];

    pub fn to_byte(self) -> u8 {
        match self {
            Self::Nil => 0x01,
            Self::Some => 0x02,
            Self::Bool => 0x03,
            Self::String => 0x04,
            Self::Int => 0x05,
            Self::UInt64 => 0x06,
            Self::Address => 0x07,
            Self::Array => 0x08,
            Self::Dictionary => 0x09,
            Self::Composite => 0x10,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::Nil),
            0x02 => Some(Self::Some),
            0x03 => Some(Self::Bool),
            0x04 => Some(Self::String),
            0x05 => Some(Self::Int),
            0x06 => Some(Self::UInt64),
            0x07 => Some(Self::Address),
            0x08 => Some(Self::Array),
            0x09 => Some(Self::Dictionary),
            0x10 => Some(Self::Composite),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Nil => "Nil",
            Self::Some => "Some",
            Self::Bool => "Bool",
            Self::String => "String",
            Self::Int => "Int",
            Self::UInt64 => "UInt64",
            Self::Address => "Address",
            Self::Array => "Array",
            Self::Dictionary => "Dictionary",
            Self::Composite => "Composite",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
