use crate::blob::Blob;
use crate::filter::ExtensionFilter;
use crate::{Backend, VfsError};
use enumflags2::{bitflags, BitFlags};
use std::sync::Arc;

/// A class of backend operations.
#[bitflags]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum Access {
    /// Existence checks and reads.
    Read,
    /// Writes.
    Write,
    /// Directory and file listings.
    List,
}

/// A backend that only passes through the operations it was granted. Denied queries report absence, and denied
/// writes and listings fail with [`VfsError::NotSupported`], so a write falls through to lower mounts.
pub struct GuardedBackend {
    inner: Arc<dyn Backend>,
    access: BitFlags<Access>,
}

impl GuardedBackend {
    /// Creates a guard around `inner`.
    ///
    /// # Arguments
    /// `inner`: The guarded backend.
    /// `access`: The operations to pass through.
    pub fn new(inner: Arc<dyn Backend>, access: impl Into<BitFlags<Access>>) -> Self {
        Self {
            inner,
            access: access.into(),
        }
    }

    /// Creates a guard that permits reading and listing, but never writing.
    pub fn read_only(inner: Arc<dyn Backend>) -> Self {
        Self::new(inner, Access::Read | Access::List)
    }

    /// Returns the granted operations.
    pub fn access(&self) -> BitFlags<Access> {
        self.access
    }

    fn allows(&self, access: Access) -> bool {
        self.access.contains(access)
    }

    fn check(&self, access: Access) -> crate::Result<()> {
        if self.allows(access) {
            Ok(())
        } else {
            Err(VfsError::NotSupported)
        }
    }
}

impl Backend for GuardedBackend {
    fn exists_file(&self, path: &str) -> bool {
        self.allows(Access::Read) && self.inner.exists_file(path)
    }

    fn exists_dir(&self, path: &str) -> bool {
        self.allows(Access::Read) && self.inner.exists_dir(path)
    }

    fn read_file(&self, path: &str) -> Option<Blob> {
        if self.allows(Access::Read) {
            self.inner.read_file(path)
        } else {
            None
        }
    }

    fn write_file(&self, path: &str, data: &[u8]) -> crate::Result<()> {
        self.check(Access::Write)?;
        self.inner.write_file(path, data)
    }

    fn list_files(
        &self,
        path: &str,
        filter: &ExtensionFilter,
        emit: &mut dyn FnMut(&str),
        allow_duplicates: bool,
    ) -> crate::Result<()> {
        self.check(Access::List)?;
        self.inner.list_files(path, filter, emit, allow_duplicates)
    }

    fn list_dirs(
        &self,
        path: &str,
        emit: &mut dyn FnMut(&str),
        allow_duplicates: bool,
    ) -> crate::Result<()> {
        self.check(Access::List)?;
        self.inner.list_dirs(path, emit, allow_duplicates)
    }
}
