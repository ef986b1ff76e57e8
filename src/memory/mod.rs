mod tree;

use crate::blob::Blob;
use crate::filter::ExtensionFilter;
use crate::memory::tree::{Entry, FilesystemTree};
use crate::util::{normalize, split_parent};
use crate::{Backend, VfsError};
use itertools::Itertools;
use std::collections::btree_map;
use std::io;

/// The contents of a file within the memory filesystem.
type File = Vec<u8>;

/// A memory-backed filesystem. All files are stored within, and listings are reported in name order.
///
/// Like any backend, writes never create missing directories; use [`MemoryBackend::create_dir_all`] first.
#[derive(Default)]
pub struct MemoryBackend {
    inner: FilesystemTree<File>,
}

impl MemoryBackend {
    /// Creates an empty memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory `path` and all of its parents.
    pub fn create_dir_all(&self, path: &str) -> crate::Result<()> {
        self.inner.create_dir_all(path, |_| ())
    }

    /// Collects the names within directory `path` for which `keep` returns true. Names are collected so that
    /// callbacks never run under the lock.
    fn names<F: Fn(&str, &Entry<File>) -> bool>(
        &self,
        path: &str,
        keep: F,
    ) -> crate::Result<Vec<String>> {
        self.inner.with_directory(path, |dir| {
            dir.iter()
                .filter(|(name, entry)| keep(name.as_str(), *entry))
                .map(|(name, _)| name.clone())
                .collect_vec()
        })
    }
}

fn is_a_directory(path: &str) -> VfsError {
    io::Error::other(format!("is a directory: {path}")).into()
}

impl Backend for MemoryBackend {
    fn exists_file(&self, path: &str) -> bool {
        self.inner
            .with_entry(path, |entry| matches!(entry, Some(Entry::UserData(_))))
    }

    fn exists_dir(&self, path: &str) -> bool {
        self.inner
            .with_entry(path, |entry| matches!(entry, Some(Entry::Directory(_))))
    }

    fn read_file(&self, path: &str) -> Option<Blob> {
        self.inner.with_entry(path, |entry| match entry {
            Some(Entry::UserData(file)) => Some(Blob::from(file.clone())),
            _ => None,
        })
    }

    fn write_file(&self, path: &str, data: &[u8]) -> crate::Result<()> {
        let normalized = normalize(path)?;
        let (parent, file_name) = split_parent(&normalized);
        if file_name.is_empty() {
            return Err(is_a_directory(path));
        }

        self.inner.with_directory(parent, |dir| match dir.entry(file_name.to_owned()) {
            btree_map::Entry::Occupied(mut occ) => match occ.get_mut() {
                Entry::UserData(file) => {
                    *file = data.to_vec();
                    Ok(())
                }
                Entry::Directory(_) => Err(is_a_directory(path)),
            },
            btree_map::Entry::Vacant(vac) => {
                vac.insert(Entry::UserData(data.to_vec()));
                Ok(())
            }
        })?
    }

    fn list_files(
        &self,
        path: &str,
        filter: &ExtensionFilter,
        emit: &mut dyn FnMut(&str),
        _allow_duplicates: bool,
    ) -> crate::Result<()> {
        // names within a directory are unique already
        let names = self.names(path, |name, entry| {
            matches!(entry, Entry::UserData(_)) && filter.matches(name)
        })?;
        names.iter().for_each(|name| emit(name.as_str()));
        Ok(())
    }

    fn list_dirs(
        &self,
        path: &str,
        emit: &mut dyn FnMut(&str),
        _allow_duplicates: bool,
    ) -> crate::Result<()> {
        let names = self.names(path, |_, entry| matches!(entry, Entry::Directory(_)))?;
        names.iter().for_each(|name| emit(name.as_str()));
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::filter::ExtensionFilter;
    use crate::memory::MemoryBackend;
    use crate::{Backend, VfsError};

    fn memory_backend() -> MemoryBackend {
        let backend = MemoryBackend::new();

        backend.write_file("file.txt", b"something interesting").unwrap();
        backend.create_dir_all("folder/and/it/goes/deeper").unwrap();
        backend.write_file("folder/and/it/goes/desc", b"goes").unwrap();
        backend.write_file("folder/and/it/goes/notes.md", b"# notes").unwrap();

        backend
    }

    fn list_files(backend: &MemoryBackend, path: &str, filter: ExtensionFilter) -> Vec<String> {
        let mut names = Vec::new();
        backend
            .list_files(path, &filter, &mut |name| names.push(name.to_owned()), false)
            .unwrap();
        names
    }

    #[test]
    fn exists() {
        let backend = memory_backend();

        assert!(backend.exists_file("file.txt"));
        assert!(backend.exists_file("folder/and/it/goes/desc"));
        assert!(!backend.exists_file("folder"));
        assert!(backend.exists_dir(""));
        assert!(backend.exists_dir("folder/and/it/goes/deeper"));
        assert!(!backend.exists_dir("file.txt"));
        assert!(!backend.exists_dir("nonsense"));
    }

    #[test]
    fn read_write() {
        let backend = memory_backend();

        assert_eq!(
            backend.read_file("file.txt").unwrap().to_text(false),
            "something interesting"
        );
        assert!(backend.read_file("folder").is_none());
        assert!(backend.read_file("missing").is_none());

        backend.write_file("file.txt", b"").unwrap();
        assert!(backend.read_file("file.txt").unwrap().is_empty());
    }

    #[test]
    fn write_requires_parent() {
        let backend = memory_backend();

        let result = backend.write_file("missing/file.txt", b"data");
        assert!(matches!(result, Err(VfsError::NotFound(_))));
        assert!(!backend.exists_dir("missing"));
    }

    #[test]
    fn write_over_directory() {
        let backend = memory_backend();

        assert!(matches!(backend.write_file("folder", b"data"), Err(VfsError::Io(_))));
        assert!(matches!(backend.write_file("", b"data"), Err(VfsError::Io(_))));
    }

    #[test]
    fn list() {
        let backend = memory_backend();

        itertools::assert_equal(list_files(&backend, "", ExtensionFilter::any()), vec!["file.txt"]);
        itertools::assert_equal(
            list_files(&backend, "folder/and/it/goes", ExtensionFilter::any()),
            vec!["desc", "notes.md"],
        );
        itertools::assert_equal(
            list_files(&backend, "folder/and/it/goes", ExtensionFilter::from(["md"])),
            vec!["notes.md"],
        );

        let mut dirs = Vec::new();
        backend
            .list_dirs("folder/and/it/goes", &mut |name| dirs.push(name.to_owned()), false)
            .unwrap();
        itertools::assert_equal(dirs, vec!["deeper"]);

        let result = backend.list_dirs("file.txt", &mut |_| {}, false);
        assert!(matches!(result, Err(VfsError::NotFound(_))));
    }
}
