//! The reader trait and the backend-independent dispatcher.

use quarry_types::ObjectId;
use tracing::{debug, trace};

use crate::error::{ReaderError, ReaderResult};

/// Which backing store a reader was built over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReaderBackend {
    Tree,
    Index,
    Workdir,
}

impl std::fmt::Display for ReaderBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tree => write!(f, "tree"),
            Self::Index => write!(f, "index"),
            Self::Workdir => write!(f, "workdir"),
        }
    }
}

/// Resolves a repository-relative path to content bytes and a blob id.
///
/// Implementations replace the contents of `out` on success and write the
/// identity to `id_out` only when it is requested. Use [`read`] rather than
/// calling [`ContentReader::read`] directly: the dispatcher validates the
/// path and guarantees `out` is left empty on failure.
pub trait ContentReader {
    fn backend(&self) -> ReaderBackend;

    /// Backend-specific read.
    fn read(
        &self,
        path: &str,
        out: &mut Vec<u8>,
        id_out: Option<&mut ObjectId>,
    ) -> ReaderResult<()>;

    /// Read `path` into a fresh buffer, always computing its identity.
    fn read_blob(&self, path: &str) -> ReaderResult<(Vec<u8>, ObjectId)> {
        let mut content = Vec::new();
        let mut id = ObjectId::null();
        read(self, path, &mut content, Some(&mut id))?;
        Ok((content, id))
    }
}

impl<R: ContentReader + ?Sized> ContentReader for Box<R> {
    fn backend(&self) -> ReaderBackend {
        (**self).backend()
    }

    fn read(
        &self,
        path: &str,
        out: &mut Vec<u8>,
        id_out: Option<&mut ObjectId>,
    ) -> ReaderResult<()> {
        (**self).read(path, out, id_out)
    }
}

/// Read `path` through `reader` into `out`.
///
/// On success `out` holds exactly the resolved content and `id_out`, when
/// given, holds its identity. On failure `out` is empty.
pub fn read<R: ContentReader + ?Sized>(
    reader: &R,
    path: &str,
    out: &mut Vec<u8>,
    id_out: Option<&mut ObjectId>,
) -> ReaderResult<()> {
    let backend = reader.backend();
    let result = if path.is_empty() {
        Err(ReaderError::InvalidPath(path.to_string()))
    } else {
        reader.read(path, out, id_out)
    };

    match &result {
        Ok(()) => trace!(%backend, path, len = out.len(), "read content"),
        Err(e) => {
            out.clear();
            debug!(%backend, path, error = %e, "read failed");
        }
    }
    result
}

/// Release a reader. Does nothing for `None`.
///
/// Only the reader itself is dropped; the repository, index or tree it
/// borrows are untouched.
pub fn dispose(reader: Option<Box<dyn ContentReader + '_>>) {
    if let Some(reader) = reader {
        trace!(backend = %reader.backend(), "disposing reader");
        drop(reader);
    }
}

/// Replace the contents of `out` with `data`, surfacing allocation failure.
pub(crate) fn replace_contents(out: &mut Vec<u8>, data: &[u8]) -> ReaderResult<()> {
    out.clear();
    out.try_reserve(data.len())?;
    out.extend_from_slice(data);
    Ok(())
}
