//! Foundation types for deferred composite values.
//!
//! This crate provides the identity-level types every other `dcv` crate
//! shares. None of them know anything about the wire format.
//!
//! # Key Types
//!
//! - [`Address`]: 8-byte account address, also used as the owner context
//! - [`Location`]: where a composite's type is defined
//! - [`CompositeKind`]: structure, resource, contract, event, or enum

pub mod address;
pub mod error;
pub mod kind;
pub mod location;

pub use address::Address;
pub use error::TypeError;
pub use kind::CompositeKind;
pub use location::Location;
