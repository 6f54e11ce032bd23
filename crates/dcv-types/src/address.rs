use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Account address.
///
/// Addresses identify the account a stored value belongs to. The decoder
/// threads an optional `Address` through as the owner context; it is only
/// ever compared for equality, never interpreted.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address([u8; Address::LENGTH]);

impl Address {
    /// Number of bytes in an address.
    pub const LENGTH: usize = 8;

    /// The zero address.
    pub const ZERO: Self = Self([0u8; Self::LENGTH]);

    /// Create an address from its raw bytes.
    pub const fn new(bytes: [u8; Self::LENGTH]) -> Self {
        Self(bytes)
    }

    /// Create an address from a `u64`, big-endian.
    pub const fn from_u64(value: u64) -> Self {
        Self(value.to_be_bytes())
    }

    /// The raw address bytes.
    pub fn as_bytes(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }

    /// Returns `true` for the zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; Self::LENGTH]
    }

    /// Hex-encoded string without prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a hex string, with or without a `0x` prefix.
    ///
    /// Short inputs are left-padded with zeros, so `0x1` is the address
    /// `0x0000000000000001`.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let padded;
        let s = if s.len() % 2 == 1 {
            padded = format!("0{s}");
            padded.as_str()
        } else {
            s
        };
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() > Self::LENGTH {
            return Err(TypeError::InvalidLength {
                expected: Self::LENGTH,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; Self::LENGTH];
        arr[Self::LENGTH - bytes.len()..].copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl From<[u8; Address::LENGTH]> for Address {
    fn from(bytes: [u8; Address::LENGTH]) -> Self {
        Self(bytes)
    }
}

impl From<Address> for [u8; Address::LENGTH] {
    fn from(address: Address) -> Self {
        address.0
    }
}
