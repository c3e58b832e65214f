//! Content identity hashing for Quarry.
//!
//! The identity function is domain-separated BLAKE3: the object kind is
//! mixed into every digest so that a blob and a tree with the same bytes
//! never share an id.

pub mod hasher;

pub use hasher::ContentHasher;
