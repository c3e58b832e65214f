//! Foundation types for Quarry.
//!
//! Every other Quarry crate depends on `quarry-types` for the content
//! identity that addresses stored objects.
//!
//! # Key Types
//!
//! - [`ObjectId`] -- Content-addressed identifier (32-byte BLAKE3 digest)
//! - [`TypeError`] -- Parse failures for identities

pub mod error;
pub mod object;

pub use error::TypeError;
pub use object::ObjectId;
