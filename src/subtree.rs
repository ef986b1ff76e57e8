use crate::blob::Blob;
use crate::disk::DiskBackend;
use crate::filter::ExtensionFilter;
use crate::Backend;
use normalize_path::NormalizePath;
use path_slash::PathBufExt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// A backend that exposes the subtree of another backend under `base` as its root. Every path is lexically normalized
/// and joined onto `base` before it is handed to the inner backend.
pub struct SubtreeBackend {
    inner: Arc<dyn Backend>,
    base: PathBuf,
}

impl SubtreeBackend {
    /// Creates a backend rooted at `base` within `inner`.
    ///
    /// # Arguments
    /// `inner`: The backend to delegate to.
    /// `base`: The directory of `inner` that becomes the root.
    pub fn new<P: AsRef<Path>>(inner: Arc<dyn Backend>, base: P) -> Self {
        Self {
            inner,
            base: lexical_base(base.as_ref()),
        }
    }

    /// Creates a backend rooted at the physical directory `root`.
    pub fn disk<P: AsRef<Path>>(root: P) -> Self {
        Self::new(Arc::new(DiskBackend::new()), root)
    }

    /// Returns the base path within the inner backend.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Maps a path relative to this backend onto the inner backend.
    fn map(&self, path: &str) -> String {
        let relative = Path::new(path).normalize();
        if relative == Path::new(".") {
            return self.base.to_slash_lossy().into_owned();
        }

        self.base.join(relative).to_slash_lossy().into_owned()
    }
}

/// Lexically normalizes a base path. A `..` only cancels a preceding named component, so leading `..` segments are
/// kept and the base may lie outside the current directory. `.` and the empty path normalize to the empty path.
fn lexical_base(base: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    let mut named = 0usize;
    for component in base.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir if named > 0 => {
                normalized.pop();
                named -= 1;
            }
            // the parent of the root is the root
            Component::ParentDir if normalized.has_root() => {}
            Component::Normal(_) => {
                normalized.push(component);
                named += 1;
            }
            _ => normalized.push(component),
        }
    }

    normalized
}

impl Backend for SubtreeBackend {
    fn exists_file(&self, path: &str) -> bool {
        self.inner.exists_file(&self.map(path))
    }

    fn exists_dir(&self, path: &str) -> bool {
        self.inner.exists_dir(&self.map(path))
    }

    fn read_file(&self, path: &str) -> Option<Blob> {
        self.inner.read_file(&self.map(path))
    }

    fn write_file(&self, path: &str, data: &[u8]) -> crate::Result<()> {
        self.inner.write_file(&self.map(path), data)
    }

    fn list_files(
        &self,
        path: &str,
        filter: &ExtensionFilter,
        emit: &mut dyn FnMut(&str),
        allow_duplicates: bool,
    ) -> crate::Result<()> {
        self.inner
            .list_files(&self.map(path), filter, emit, allow_duplicates)
    }

    fn list_dirs(
        &self,
        path: &str,
        emit: &mut dyn FnMut(&str),
        allow_duplicates: bool,
    ) -> crate::Result<()> {
        self.inner.list_dirs(&self.map(path), emit, allow_duplicates)
    }
}

#[cfg(test)]
mod test {
    use crate::memory::MemoryBackend;
    use crate::subtree::SubtreeBackend;
    use crate::vfs::Vfs;
    use crate::Backend;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn nested_memory() -> Arc<MemoryBackend> {
        let memory = MemoryBackend::new();
        memory.create_dir_all("assets/shaders").unwrap();
        memory.write_file("assets/shaders/basic.hlsl", b"float4").unwrap();
        memory.write_file("top.txt", b"top").unwrap();
        Arc::new(memory)
    }

    #[test]
    fn map() {
        let subtree = SubtreeBackend::new(nested_memory(), "assets/./shaders/");
        assert_eq!(subtree.map(""), "assets/shaders");
        assert_eq!(subtree.map("basic.hlsl"), "assets/shaders/basic.hlsl");
        assert_eq!(subtree.map("a/./b"), "assets/shaders/a/b");

        let unrooted = SubtreeBackend::new(nested_memory(), "");
        assert_eq!(unrooted.map(""), "");
        assert_eq!(unrooted.map("."), "");
        assert_eq!(unrooted.map("a/./b"), "a/b");

        let current = SubtreeBackend::new(nested_memory(), ".");
        assert_eq!(current.base(), Path::new(""));
        assert_eq!(current.map(""), "");
    }

    #[test]
    fn parent_segments_in_base() {
        let cases = [
            ("../assets", "../assets"),
            ("../../assets", "../../assets"),
            ("a/../../b", "../b"),
            ("./a/../b", "b"),
            ("a/b/..", "a"),
            ("a/..", ""),
        ];
        for (base, expected) in cases {
            let subtree = SubtreeBackend::new(nested_memory(), base);
            assert_eq!(subtree.base(), Path::new(expected), "{base}");
        }

        let sibling = SubtreeBackend::new(nested_memory(), "../assets");
        assert_eq!(sibling.map(""), "../assets");
        assert_eq!(sibling.map("hello.txt"), "../assets/hello.txt");
    }

    #[cfg(unix)]
    #[test]
    fn parent_segments_in_base_root() {
        let subtree = SubtreeBackend::new(nested_memory(), "/../srv/assets");
        assert_eq!(subtree.base(), Path::new("/srv/assets"));
    }

    // reaches the temporary directory from the working directory through `..` segments
    #[cfg(unix)]
    #[test]
    fn disk_root_outside_working_directory() {
        let dir = TempDir::new().unwrap();
        let assets = dir.path().join("assets");
        fs::create_dir_all(&assets).unwrap();
        fs::write(assets.join("hello.txt"), "hi").unwrap();

        let current = std::env::current_dir().unwrap().canonicalize().unwrap();
        let assets = assets.canonicalize().unwrap();
        let mut relative = PathBuf::new();
        for _ in current.components().skip(1) {
            relative.push("..");
        }
        relative.push(assets.strip_prefix("/").unwrap());
        assert!(relative.starts_with(".."));

        let subtree = SubtreeBackend::disk(&relative);
        assert_eq!(subtree.base(), relative.as_path());
        assert!(subtree.exists_dir(""));
        assert_eq!(subtree.read_file("hello.txt").unwrap().to_text(false), "hi");

        let mut vfs = Vfs::new();
        vfs.mount_disk("assets", &relative).unwrap();
        assert_eq!(vfs.read_text("assets/hello.txt", false).unwrap(), "hi");
    }

    #[test]
    fn rooted_at_subdirectory() {
        let subtree = SubtreeBackend::new(nested_memory(), "assets");

        assert!(subtree.exists_dir(""));
        assert!(subtree.exists_dir("shaders"));
        assert!(subtree.exists_file("shaders/basic.hlsl"));
        assert!(!subtree.exists_file("top.txt"));
        assert_eq!(
            subtree.read_file("shaders/basic.hlsl").unwrap().as_bytes(),
            b"float4"
        );

        let mut dirs = Vec::new();
        subtree
            .list_dirs("", &mut |name| dirs.push(name.to_owned()), false)
            .unwrap();
        itertools::assert_equal(dirs, vec!["shaders"]);
    }

    #[test]
    fn writes_land_in_inner() {
        let memory = nested_memory();
        let subtree = SubtreeBackend::new(memory.clone(), "assets/shaders");

        subtree.write_file("new.hlsl", b"new").unwrap();
        assert_eq!(
            memory.read_file("assets/shaders/new.hlsl").unwrap().as_bytes(),
            b"new"
        );
    }

    #[test]
    fn disk_root() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("hello.txt"), "hello").unwrap();

        let subtree = SubtreeBackend::disk(dir.path());
        assert!(subtree.exists_dir(""));
        assert!(subtree.exists_file("hello.txt"));
        assert_eq!(subtree.read_file("hello.txt").unwrap().to_text(false), "hello");
    }
}
