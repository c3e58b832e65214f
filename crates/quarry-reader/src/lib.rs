//! Uniform content readers for Quarry.
//!
//! A [`ContentReader`] answers "what are the bytes and blob id of path X"
//! against one backing store, chosen once at construction:
//!
//! - [`TreeReader`] -- a committed tree snapshot
//! - [`IndexReader`] -- the staging index
//! - [`WorkdirReader`] -- the working directory, run through the
//!   to-storage filters so the result is canonical and comparable with
//!   staged and committed content
//!
//! Callers go through [`read`] and [`dispose`], which work the same for
//! every backend.
//!
//! ```no_run
//! use quarry_reader::{read, WorkdirReader};
//! use quarry_repo::{ObjectId, Repository};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = Repository::open("/path/to/workdir")?;
//! let reader = WorkdirReader::new(&repo, true)?;
//!
//! let mut content = Vec::new();
//! let mut id = ObjectId::null();
//! match read(&reader, "src/main.rs", &mut content, Some(&mut id)) {
//!     Ok(()) => println!("{id} ({} bytes)", content.len()),
//!     Err(e) if e.is_mismatch() => println!("modified since staging"),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod index;
pub mod reader;
pub mod tree;
pub mod workdir;

pub use error::{ReaderError, ReaderErrorKind, ReaderResult};
pub use index::IndexReader;
pub use reader::{dispose, read, ContentReader, ReaderBackend};
pub use tree::TreeReader;
pub use workdir::{IdentityPolicy, WorkdirReader};
