//! # Overlay Virtual Filesystem for Rust
//! This crate serves a single logical path namespace from any number of backends mounted at virtual directories.
//! Application code reads `content/hello.txt` without knowing which directory, archive or other source holds it, and
//! patch or mod directories can shadow base content by mounting over it.
//!
//! Virtual paths are `/`-separated and relative. They are normalized before use, and rooted paths or paths containing
//! `..` are rejected outright.
//!
//! `overlay-vfs` has the following backends implemented out of the box:
//! - `DiskBackend`: The host filesystem, addressed by host paths.
//! - `SubtreeBackend`: Exposes a directory of another backend as its root. `Vfs::mount_disk` mounts a `DiskBackend`
//! through one of these.
//! - `MemoryBackend`: A read-write in-memory filesystem.
//! - `GuardedBackend`: Restricts another backend to a set of operations, e.g. to make an overlay read-only.
//! - `Vfs`: The mount table itself, so composed namespaces can be nested.
//!
//! Mount precedence follows insertion order: existence checks and reads are answered by the most recent mount that
//! has the entry, writes land in the most recent mount that accepts them, and listings merge every mount.

use crate::blob::Blob;
use crate::filter::ExtensionFilter;

pub use error::*;
pub use vfs::{MountPoint, Vfs};

/// A provider of files and directories. Paths are relative to the backend's root and have already been normalized
/// by the caller.
pub trait Backend: Send + Sync {
    /// Returns true if a regular file exists at `path`.
    fn exists_file(&self, path: &str) -> bool;
    /// Returns true if a directory exists at `path`.
    fn exists_dir(&self, path: &str) -> bool;
    /// Reads the whole file at `path`. Returns `None` if it is missing or unreadable.
    fn read_file(&self, path: &str) -> Option<Blob>;
    /// Replaces the contents of the file at `path` with `data`, creating the file if needed. Fails with
    /// [`VfsError::NotFound`] if the parent directory does not exist, as directories are never created implicitly.
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
    /// Emits the name of every regular file directly inside `path` that passes `filter`. Fails with
    /// [`VfsError::NotFound`] if `path` is not a directory.
    ///
    /// # Arguments
    /// `path`: The directory to list.
    /// `filter`: The extensions to report.
    /// `emit`: Receives each file name.
    /// `allow_duplicates`: If false, a name is emitted at most once per call.
    fn list_files(
        &self,
        path: &str,
        filter: &ExtensionFilter,
        emit: &mut dyn FnMut(&str),
        allow_duplicates: bool,
    ) -> Result<()>;
    /// Emits the name of every directory directly inside `path`. Fails with [`VfsError::NotFound`] if `path` is not
    /// a directory.
    fn list_dirs(
        &self,
        path: &str,
        emit: &mut dyn FnMut(&str),
        allow_duplicates: bool,
    ) -> Result<()>;
}

pub mod blob;
pub mod config;
pub mod disk;
pub mod error;
pub mod filter;
pub mod guarded;
pub mod memory;
pub mod subtree;
pub mod util;
pub mod vfs;
