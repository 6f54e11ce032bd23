use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address::Address;

/// Where a composite's type is defined.
///
/// Locations are opaque to the decoder: they are read, compared, and written
/// back, nothing more.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Location {
    /// A named built-in or test location.
    Identifier(String),
    /// A location named by an arbitrary string (e.g. a script path).
    String(String),
    /// A contract deployed to an account.
    Address { address: Address, name: String },
}

impl Location {
    /// Location tag byte used by the wire layout.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Identifier(_) => 1,
            Self::String(_) => 2,
            Self::Address { .. } => 3,
        }
    }

    /// The name component of the location.
    pub fn name(&self) -> &str {
        match self {
            Self::Identifier(name) | Self::String(name) => name,
            Self::Address { name, .. } => name,
        }
    }

    /// Type ID of `qualified_identifier` declared in this location.
    pub fn type_id(&self, qualified_identifier: &str) -> String {
        match self {
            Self::Identifier(name) => format!("I.{name}.{qualified_identifier}"),
            Self::String(name) => format!("S.{name}.{qualified_identifier}"),
            Self::Address { address, .. } => {
                format!("A.{}.{qualified_identifier}", address.to_hex())
            }
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(name) => write!(f, "{name}"),
            Self::String(name) => write!(f, "S.{name}"),
            Self::Address { address, name } => write!(f, "A.{}.{name}", address.to_hex()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_unique() {
        let locations = [
            Location::Identifier("a".into()),
            Location::String("a".into()),
            Location::Address { address: Address::ZERO, name: "a".into() },
        ];
        let mut tags: Vec<u8> = locations.iter().map(Location::tag).collect();
        tags.sort();
        tags.dedup();
        assert_eq!(tags.len(), locations.len());
    }

    #[test]
    fn type_id_format() {
        let location = Location::Address {
            address: Address::from_u64(1),
            name: "FungibleToken".into(),
        };
        assert_eq!(location.type_id("Vault"), "A.0000000000000001.Vault");
        assert_eq!(Location::Identifier("test".into()).type_id("R"), "I.test.R");
        assert_eq!(Location::String("s".into()).type_id("T"), "S.s.T");
    }

    #[test]
    fn name_accessor() {
        assert_eq!(Location::String("script".into()).name(), "script");
        let location = Location::Address { address: Address::ZERO, name: "C".into() };
        assert_eq!(location.name(), "C");
    }

    #[test]
    fn display() {
        assert_eq!(Location::Identifier("test".into()).to_string(), "test");
        let location = Location::Address { address: Address::from_u64(2), name: "C".into() };
        assert_eq!(location.to_string(), "A.0000000000000002.C");
    }
}
