use crate::blob::Blob;
use crate::filter::ExtensionFilter;
use crate::subtree::SubtreeBackend;
use crate::util::{child_mount_name, normalize, relative_to_mount};
use crate::{Backend, VfsError};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// A backend bound to a virtual directory.
#[derive(Clone)]
pub struct MountPoint {
    path: String,
    backend: Arc<dyn Backend>,
}

impl MountPoint {
    /// Returns the normalized virtual path the backend is mounted at.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the mounted backend.
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }
}

impl fmt::Debug for MountPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountPoint")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Forwards listed names to a callback, dropping names it has already forwarded unless duplicates are allowed.
struct Listing<F> {
    emit: F,
    seen: Option<HashSet<String>>,
}

impl<F: FnMut(&str)> Listing<F> {
    fn new(emit: F, allow_duplicates: bool) -> Self {
        Self {
            emit,
            seen: (!allow_duplicates).then(HashSet::new),
        }
    }

    fn emit(&mut self, name: &str) {
        if let Some(seen) = &mut self.seen {
            if !seen.insert(name.to_owned()) {
                return;
            }
        }

        (self.emit)(name)
    }
}

/// A virtual filesystem that serves a single namespace from an ordered list of mounted backends.
///
/// Mounts may share a path, which stacks them as overlays, or nest inside one another. Existence checks and reads
/// consult the matching mounts from the most recently mounted to the oldest and take the first answer, so later
/// mounts shadow earlier ones. Listings are the union of every matching mount.
///
/// There is no internal locking. Share a `Vfs` between threads behind an external lock.
#[derive(Debug, Default, Clone)]
pub struct Vfs {
    mounts: Vec<MountPoint>,
}

impl Vfs {
    /// Creates a virtual filesystem with no mounts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounts a backend at the given virtual path. The backend takes precedence over every earlier mount it
    /// overlaps.
    ///
    /// # Arguments
    /// `path`: The virtual directory to expose the backend's root under.
    /// `backend`: The backend to mount.
    pub fn mount(&mut self, path: &str, backend: Arc<dyn Backend>) -> crate::Result<()> {
        let path = normalize(path)?;
        debug!(mount = %path, "mounting backend");

        self.mounts.push(MountPoint { path, backend });
        Ok(())
    }

    /// Mounts the physical directory `root` at the given virtual path.
    ///
    /// # Arguments
    /// `path`: The virtual directory to expose `root` under.
    /// `root`: The host directory.
    pub fn mount_disk<P: AsRef<Path>>(&mut self, path: &str, root: P) -> crate::Result<()> {
        debug!(root = %root.as_ref().display(), "mounting disk directory");
        self.mount(path, Arc::new(SubtreeBackend::disk(root)))
    }

    /// Removes every mount at exactly the given virtual path, including all overlays stacked there. Mounts nested
    /// below the path are kept. Returns true if anything was removed.
    pub fn unmount(&mut self, path: &str) -> crate::Result<bool> {
        let path = normalize(path)?;

        let before = self.mounts.len();
        self.mounts.retain(|mount| mount.path != path);
        let removed = before - self.mounts.len();

        debug!(mount = %path, removed, "unmounted");
        Ok(removed > 0)
    }

    /// Iterates over the mounts in the order they were mounted.
    pub fn mounts(&self) -> impl DoubleEndedIterator<Item = &MountPoint> + ExactSizeIterator {
        self.mounts.iter()
    }

    /// Returns the number of mounts.
    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    /// Returns true if nothing is mounted.
    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }

    /// Iterates over the mounts serving `normalized`, oldest first, along with the path relative to each mount.
    fn resolve<'a>(
        &'a self,
        normalized: &'a str,
    ) -> impl DoubleEndedIterator<Item = (&'a MountPoint, &'a str)> + 'a {
        self.mounts.iter().filter_map(move |mount| {
            relative_to_mount(normalized, &mount.path).map(|relative| (mount, relative))
        })
    }

    /// Returns true if a file exists at `path` in any mount.
    pub fn exists_file(&self, path: &str) -> bool {
        let Ok(normalized) = normalize(path) else {
            return false;
        };

        let found = self
            .resolve(&normalized)
            .rev()
            .any(|(mount, relative)| mount.backend.exists_file(relative));
        found
    }

    /// Returns true if a directory exists at `path`. Mount points imply their own directory and all of its
    /// ancestors, whether or not any backend has them.
    pub fn exists_dir(&self, path: &str) -> bool {
        let Ok(normalized) = normalize(path) else {
            return false;
        };

        if normalized.is_empty() {
            return !self.mounts.is_empty();
        }

        if self
            .mounts
            .iter()
            .any(|mount| relative_to_mount(&mount.path, &normalized).is_some())
        {
            return true;
        }

        let found = self
            .resolve(&normalized)
            .rev()
            .any(|(mount, relative)| mount.backend.exists_dir(relative));
        found
    }

    /// Reads the file at `path` from the most recent mount that has it.
    pub fn read_file(&self, path: &str) -> Option<Blob> {
        let normalized = normalize(path).ok()?;

        let blob = self.resolve(&normalized).rev().find_map(|(mount, relative)| {
            trace!(mount = %mount.path, relative, "reading file");
            mount.backend.read_file(relative)
        });
        blob
    }

    /// Reads the file at `path` as text. Invalid UTF-8 is replaced rather than rejected.
    ///
    /// # Arguments
    /// `path`: The virtual path of the file.
    /// `append_nul`: If true, a trailing `'\0'` is appended.
    pub fn read_text(&self, path: &str, append_nul: bool) -> Option<String> {
        self.read_file(path).map(|blob| blob.to_text(append_nul))
    }

    /// Writes `data` to `path` in the most recent mount that accepts it.
    ///
    /// Mounts are tried from the most recent. Success or an I/O failure ends the search. A mount answering
    /// [`VfsError::NotSupported`] is skipped; any other failure is remembered and reported if no later candidate
    /// succeeds.
    pub fn write_file(&self, path: &str, data: &[u8]) -> crate::Result<()> {
        let normalized = normalize(path)?;

        let mut matched = false;
        let mut failure = None;
        for (mount, relative) in self.resolve(&normalized).rev() {
            matched = true;
            trace!(mount = %mount.path, relative, "writing file");

            match mount.backend.write_file(relative, data) {
                Ok(()) => return Ok(()),
                Err(err @ VfsError::Io(_)) => {
                    warn!(mount = %mount.path, relative, %err, "write failed");
                    return Err(err);
                }
                Err(VfsError::NotSupported) => continue,
                Err(err) => failure = Some(err),
            }
        }

        if !matched {
            return Err(VfsError::not_found(normalized));
        }

        Err(failure.unwrap_or(VfsError::NotSupported))
    }

    /// Lists the files directly inside `path` across every mount serving it, in mount order.
    ///
    /// # Arguments
    /// `path`: The virtual directory.
    /// `filter`: The extensions to report.
    /// `emit`: Receives each file name.
    /// `allow_duplicates`: If false, a name reported by several mounts is emitted once.
    pub fn list_files<F: FnMut(&str)>(
        &self,
        path: &str,
        filter: impl Into<ExtensionFilter>,
        emit: F,
        allow_duplicates: bool,
    ) -> crate::Result<()> {
        let normalized = normalize(path)?;
        let filter = filter.into();
        let mut listing = Listing::new(emit, allow_duplicates);

        let mut matched = false;
        for (mount, relative) in self.resolve(&normalized) {
            matched = true;
            trace!(mount = %mount.path, relative, "listing files");

            let result = mount
                .backend
                .list_files(relative, &filter, &mut |name: &str| listing.emit(name), true);
            if let Err(err @ VfsError::Io(_)) = result {
                warn!(mount = %mount.path, relative, %err, "file listing failed");
                return Err(err);
            }
        }

        if matched {
            Ok(())
        } else {
            Err(VfsError::not_found(normalized))
        }
    }

    /// Lists the directories directly inside `path` across every mount serving it, in mount order. Directories
    /// implied by deeper mount points come first.
    ///
    /// # Arguments
    /// `path`: The virtual directory.
    /// `emit`: Receives each directory name.
    /// `allow_duplicates`: If false, a name reported more than once is emitted once.
    pub fn list_dirs<F: FnMut(&str)>(
        &self,
        path: &str,
        emit: F,
        allow_duplicates: bool,
    ) -> crate::Result<()> {
        let normalized = normalize(path)?;
        let mut listing = Listing::new(emit, allow_duplicates);

        let mut found = false;
        for name in self
            .mounts
            .iter()
            .filter_map(|mount| child_mount_name(&normalized, &mount.path))
        {
            found = true;
            listing.emit(name);
        }

        for (mount, relative) in self.resolve(&normalized) {
            found = true;
            trace!(mount = %mount.path, relative, "listing directories");

            let result = mount
                .backend
                .list_dirs(relative, &mut |name: &str| listing.emit(name), true);
            if let Err(err @ VfsError::Io(_)) = result {
                warn!(mount = %mount.path, relative, %err, "directory listing failed");
                return Err(err);
            }
        }

        if found {
            Ok(())
        } else {
            Err(VfsError::not_found(normalized))
        }
    }

    /// Collects the de-duplicated file listing of `path`, in emission order.
    pub fn collect_files(
        &self,
        path: &str,
        filter: impl Into<ExtensionFilter>,
    ) -> crate::Result<Vec<String>> {
        let mut names = Vec::new();
        self.list_files(path, filter, |name| names.push(name.to_owned()), false)?;
        Ok(names)
    }

    /// Collects the de-duplicated directory listing of `path`, in emission order.
    pub fn collect_dirs(&self, path: &str) -> crate::Result<Vec<String>> {
        let mut names = Vec::new();
        self.list_dirs(path, |name| names.push(name.to_owned()), false)?;
        Ok(names)
    }
}

/// A `Vfs` can itself be mounted, so a composed namespace can be nested inside another.
impl Backend for Vfs {
    fn exists_file(&self, path: &str) -> bool {
        Vfs::exists_file(self, path)
    }

    fn exists_dir(&self, path: &str) -> bool {
        Vfs::exists_dir(self, path)
    }

    fn read_file(&self, path: &str) -> Option<Blob> {
        Vfs::read_file(self, path)
    }

    fn write_file(&self, path: &str, data: &[u8]) -> crate::Result<()> {
        Vfs::write_file(self, path, data)
    }

    fn list_files(
        &self,
        path: &str,
        filter: &ExtensionFilter,
        emit: &mut dyn FnMut(&str),
        allow_duplicates: bool,
    ) -> crate::Result<()> {
        Vfs::list_files(self, path, filter, emit, allow_duplicates)
    }

    fn list_dirs(
        &self,
        path: &str,
        emit: &mut dyn FnMut(&str),
        allow_duplicates: bool,
    ) -> crate::Result<()> {
        Vfs::list_dirs(self, path, emit, allow_duplicates)
    }
}
