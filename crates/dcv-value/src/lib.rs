//! Deferred decoding of composite interpreter values.
//!
//! A composite (structure, resource, contract, event, enum) decoded from a
//! buffer keeps its encoded body and decodes it only as far as callers ask:
//! identity first, fields second. Re-encoding a composite nobody touched
//! copies the retained bytes straight through instead of serializing it
//! again.
//!
//! # Architecture
//!
//! - [`Value`]: closed variant type with one variant per wire tag
//! - [`CompositeValue`]: the Raw / IdentityLoaded / FullyLoaded state machine
//! - [`FieldMap`]: insertion-ordered field storage
//! - [`DecodeContext`]: owner, format version, and limits threaded through
//!   every decode and captured by each deferred composite
//! - [`decode_value`] / [`encode_value`]: top-level entry points
//! - [`validate`]: eager well-formedness check over a whole buffer
//!
//! ```
//! use dcv_codec::FormatVersion;
//! use dcv_types::{CompositeKind, Location};
//! use dcv_value::{decode_value, encode_value, CompositeValue, FieldMap, LoadState, Value};
//!
//! let point = CompositeValue::new(
//!     Location::Identifier("geo".into()),
//!     "Point",
//!     CompositeKind::Structure,
//!     FieldMap::from_iter([("x", Value::Int(1)), ("y", Value::Int(2))]),
//!     None,
//! );
//! let bytes = encode_value(&Value::from(point)).unwrap();
//!
//! let mut decoded = decode_value(bytes.clone(), None, FormatVersion::CURRENT).unwrap();
//! let point = decoded.as_composite_mut().unwrap();
//! assert_eq!(point.qualified_identifier().unwrap(), "Point");
//! assert_eq!(point.load_state(), LoadState::IdentityLoaded);
//! assert_eq!(encode_value(&decoded).unwrap(), bytes);
//! ```

pub mod composite;
pub mod context;
pub mod encoding;
pub mod fields;
pub mod layout;
pub mod validate;
pub mod value;

pub use composite::{CompositeValue, LoadState};
pub use context::DecodeContext;
pub use encoding::{decode_value, decode_value_with, encode_value, encode_value_as};
pub use fields::FieldMap;
pub use layout::Identity;
pub use validate::{validate, ValidationReport};
pub use value::Value;
