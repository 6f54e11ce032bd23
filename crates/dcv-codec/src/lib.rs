//! Tagged binary codec for interpreter values.
//!
//! Every encoded unit starts with a one-byte [`Tag`] naming its value kind,
//! which makes the format self-describing and lets containers embed any
//! other kind recursively.
//!
//! # Architecture
//!
//! - [`Writer`]: appends tags, length prefixes, and scalars; also copies
//!   untouched regions verbatim (`write_raw`)
//! - [`Reader`]: zero-copy cursor over a [`bytes::Bytes`] buffer that hands
//!   out sub-regions without copying
//! - [`FormatVersion`] / [`Ruleset`]: closed table mapping a version to how
//!   lengths and integers are laid out
//! - [`Encodable`]: implemented by every value kind that can write itself
//!
//! The codec never panics on malformed input; every failure is a
//! [`DecodeError`].

pub mod config;
pub mod encodable;
pub mod error;
pub mod reader;
pub mod tag;
pub mod varint;
pub mod version;
pub mod writer;

pub use config::DecodeLimits;
pub use encodable::Encodable;
pub use error::{DecodeError, DecodeResult, EncodeError, EncodeResult};
pub use reader::Reader;
pub use tag::Tag;
pub use version::{FormatVersion, IntEncoding, Ruleset};
pub use writer::Writer;
