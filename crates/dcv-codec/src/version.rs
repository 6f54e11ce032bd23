use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, DecodeResult};

/// Encoding format version.
///
/// Passed explicitly to every decode call; there is no process-wide
/// "current version" switch. Supported versions are listed in
/// [`Ruleset::ALL`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatVersion(u16);

impl FormatVersion {
    /// Legacy layout: fixed-width big-endian lengths and integers.
    pub const V1: Self = Self(1);
    /// Varint layout.
    pub const V2: Self = Self(2);
    /// The version new encodings are written in.
    pub const CURRENT: Self = Self::V2;

    pub const fn new(version: u16) -> Self {
        Self(version)
    }

    pub const fn get(self) -> u16 {
        self.0
    }

    /// Look up the decoding ruleset for this version.
    pub fn ruleset(self) -> DecodeResult<Ruleset> {
        Ruleset::for_version(self)
    }
}

impl Default for FormatVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// How an unsigned quantity is laid out on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntEncoding {
    /// Fixed-width big-endian (4 bytes for lengths, 8 for integers).
    FixedBigEndian,
    /// LEB128 varint; signed integers are zigzag-mapped first.
    Varint,
}

/// The rules one format version decodes and encodes by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ruleset {
    pub version: FormatVersion,
    /// Layout of length prefixes and element counts.
    pub lengths: IntEncoding,
    /// Layout of `Int` and `UInt64` payloads.
    pub integers: IntEncoding,
}

impl Ruleset {
    pub const V1: Self = Self {
        version: FormatVersion::V1,
        lengths: IntEncoding::FixedBigEndian,
        integers: IntEncoding::FixedBigEndian,
    };

    pub const V2: Self = Self {
        version: FormatVersion::V2,
        lengths: IntEncoding::Varint,
        integers: IntEncoding::Varint,
    };

    /// Every supported ruleset, oldest first.
    pub const ALL: [Ruleset; 2] = [Self::V1, Self::V2];

    pub fn current() -> Self {
        Self::V2
    }

    pub fn for_version(version: FormatVersion) -> DecodeResult<Self> {
        Self::ALL
            .iter()
            .find(|r| r.version == version)
            .copied()
            .ok_or(DecodeError::UnsupportedVersion(version.get()))
    }

    /// Largest length the ruleset can express.
    pub fn max_len(&self) -> usize {
        match self.lengths {
            IntEncoding::FixedBigEndian => u32::MAX as usize,
            IntEncoding::Varint => usize::MAX,
        }
    }
}

impl Default for Ruleset {
    fn default() -> Self {
        Self::current()
    }
}
