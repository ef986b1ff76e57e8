use crate::blob::Blob;
use crate::filter::ExtensionFilter;
use crate::{Backend, VfsError};
use path_slash::PathBufExt;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// The physical filesystem. Paths are handed to the host as they are, with forward slashes converted to the host
/// separator, so relative paths resolve against the working directory. Mount it through a
/// [`SubtreeBackend`](crate::subtree::SubtreeBackend) to root it at a directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskBackend;

impl DiskBackend {
    /// Creates a new physical backend.
    pub fn new() -> Self {
        Self
    }

    /// Converts a backend path into a host path. The empty path is the working directory.
    fn host_path(path: &str) -> PathBuf {
        if path.is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from_slash(path)
        }
    }

    /// Emits the names of the entries of directory `path` for which `keep` returns true.
    ///
    /// # Arguments
    /// `path`: The directory to enumerate.
    /// `allow_duplicates`: If false, names already emitted by this call are skipped.
    /// `emit`: Receives each name.
    /// `keep`: Decides whether an entry is reported, given its name and metadata.
    fn list_entries<F: Fn(&str, &fs::Metadata) -> bool>(
        path: &str,
        allow_duplicates: bool,
        emit: &mut dyn FnMut(&str),
        keep: F,
    ) -> crate::Result<()> {
        let directory = Self::host_path(path);
        if !directory.is_dir() {
            return Err(VfsError::not_found(path));
        }

        let mut seen = HashSet::new();
        for entry in fs::read_dir(&directory)? {
            let entry = entry?;

            // follow symbolic links, but skip the dangling ones
            let metadata = match fs::metadata(entry.path()) {
                Ok(metadata) => metadata,
                Err(err) if err.kind() == ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            if !keep(name.as_str(), &metadata) {
                continue;
            }
            if !allow_duplicates && !seen.insert(name.clone()) {
                continue;
            }

            emit(name.as_str());
        }

        Ok(())
    }
}

impl Backend for DiskBackend {
    fn exists_file(&self, path: &str) -> bool {
        Self::host_path(path).is_file()
    }

    fn exists_dir(&self, path: &str) -> bool {
        Self::host_path(path).is_dir()
    }

    fn read_file(&self, path: &str) -> Option<Blob> {
        fs::read(Self::host_path(path)).ok().map(Blob::from)
    }

    fn write_file(&self, path: &str, data: &[u8]) -> crate::Result<()> {
        let host_path = Self::host_path(path);

        // directories are never created implicitly
        if let Some(parent) = host_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(VfsError::not_found(parent.to_string_lossy()));
            }
        }

        fs::write(&host_path, data)?;
        Ok(())
    }

    fn list_files(
        &self,
        path: &str,
        filter: &ExtensionFilter,
        emit: &mut dyn FnMut(&str),
        allow_duplicates: bool,
    ) -> crate::Result<()> {
        Self::list_entries(path, allow_duplicates, emit, |name, metadata| {
            metadata.is_file() && filter.matches(name)
        })
    }

    fn list_dirs(
        &self,
        path: &str,
        emit: &mut dyn FnMut(&str),
        allow_duplicates: bool,
    ) -> crate::Result<()> {
        Self::list_entries(path, allow_duplicates, emit, |_, metadata| metadata.is_dir())
    }
}
