//! Staging index for Quarry.
//!
//! Maintains the staging area between the working directory and the next
//! commit. Each path has either one unconflicted entry at [`Stage::Normal`]
//! or, while a merge conflict is pending, up to three entries at the
//! ancestor/ours/theirs stages.
//!
//! # Key Types
//!
//! - [`Index`] -- The in-memory staging area (BTreeMap-backed)
//! - [`IndexEntry`] -- A tracked path at one stage
//! - [`Stage`] -- Merge stage of an entry

pub mod entry;
pub mod error;
pub mod index;

pub use entry::{IndexEntry, Stage};
pub use error::{IndexError, IndexResult};
pub use index::Index;
