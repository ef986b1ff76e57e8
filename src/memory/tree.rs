use crate::util::normalize;
use crate::VfsError;
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// A directory in tree-based filesystem.
pub type Directory<T> = BTreeMap<String, Entry<T>>;

/// A node in the file tree.
pub enum Entry<T> {
    Directory(Directory<T>),
    UserData(T),
}

impl<T> Default for Entry<T> {
    fn default() -> Self {
        Self::Directory(BTreeMap::default())
    }
}

/// A tree-based filesystem with directories and other data.
pub struct FilesystemTree<T> {
    root: Mutex<Entry<T>>,
}

/// Iterates over the segments of a normalized path.
fn components(normalized: &str) -> impl Iterator<Item = &str> {
    normalized.split('/').filter(|component| !component.is_empty())
}

impl<T> FilesystemTree<T> {
    /// Creates all directories specified in `path`, including the trailing path. Calls `f` with the resulting
    /// directory on success.
    ///
    /// # Arguments
    /// `path`: The path to create all of the directories for.
    /// `f`: The function.
    pub fn create_dir_all<R, F: FnOnce(&mut Directory<T>) -> R>(
        &self,
        path: &str,
        f: F,
    ) -> crate::Result<R> {
        let normalized = normalize(path)?;

        let mut entry = self.root.lock();
        let mut entry = &mut *entry;
        for component in components(&normalized) {
            let Entry::Directory(dir) = entry else {
                return Err(VfsError::not_found(path));
            };

            entry = dir.entry(component.to_owned()).or_default();
        }

        // make sure the last entry was also a directory
        match entry {
            Entry::Directory(dir) => Ok(f(dir)),
            Entry::UserData(_) => Err(VfsError::not_found(path)),
        }
    }

    /// Calls `f` with the entry at `path`, or `None` if there is no such entry.
    ///
    /// # Arguments
    /// `path`: The path of the entry.
    /// `f`: The function.
    pub fn with_entry<R, F: FnOnce(Option<&mut Entry<T>>) -> R>(&self, path: &str, f: F) -> R {
        let Ok(normalized) = normalize(path) else {
            return f(None);
        };

        let mut entry = self.root.lock();
        let mut entry = &mut *entry;
        for component in components(&normalized) {
            let Entry::Directory(dir) = entry else {
                return f(None);
            };

            match dir.get_mut(component) {
                Some(child) => entry = child,
                None => return f(None),
            }
        }

        f(Some(entry))
    }

    /// Calls `f` with the directory at `path`, only if it is located.
    ///
    /// # Arguments
    /// `path`: The directory to fetch.
    /// `f`: The function.
    pub fn with_directory<R, F: FnOnce(&mut Directory<T>) -> R>(
        &self,
        path: &str,
        f: F,
    ) -> crate::Result<R> {
        self.with_entry(path, |entry| match entry {
            Some(Entry::Directory(dir)) => Ok(f(dir)),
            _ => Err(VfsError::not_found(path)),
        })
    }
}

impl<T> Default for FilesystemTree<T> {
    fn default() -> Self {
        Self {
            root: Mutex::default(),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::memory::tree::{Entry, FilesystemTree};

    #[test]
    fn create_and_find() {
        let tree = FilesystemTree::<u32>::default();
        tree.create_dir_all("a/b", |dir| {
            dir.insert("leaf".to_owned(), Entry::UserData(7));
        })
        .unwrap();

        assert!(tree.with_entry("a/b/leaf", |entry| matches!(entry, Some(Entry::UserData(7)))));
        assert!(tree.with_entry("a", |entry| matches!(entry, Some(Entry::Directory(_)))));
        assert!(tree.with_entry("", |entry| matches!(entry, Some(Entry::Directory(_)))));
        assert!(tree.with_entry("a/c", |entry| entry.is_none()));
        assert!(tree.with_entry("a/b/leaf/deeper", |entry| entry.is_none()));
    }

    #[test]
    fn create_through_file() {
        let tree = FilesystemTree::<u32>::default();
        tree.create_dir_all("", |dir| {
            dir.insert("leaf".to_owned(), Entry::UserData(7));
        })
        .unwrap();

        assert!(tree.create_dir_all("leaf", |_| ()).is_err());
        assert!(tree.create_dir_all("leaf/below", |_| ()).is_err());
        assert!(tree.with_directory("leaf", |_| ()).is_err());
    }
}
