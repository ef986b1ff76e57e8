use crate::guarded::GuardedBackend;
use crate::subtree::SubtreeBackend;
use crate::vfs::Vfs;
use crate::Backend;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// A physical directory to mount.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct MountConfig {
    /// The virtual directory to mount at.
    pub path: String,
    /// The host directory to expose.
    pub root: PathBuf,
    /// If true, writes through this mount are declined and fall through to earlier mounts.
    #[serde(default)]
    pub read_only: bool,
}

/// A mount manifest. Mounts are applied in order, so later entries take precedence.
///
/// ```
/// use overlay_vfs::config::VfsConfig;
///
/// let config = VfsConfig::from_ron(r#"(
///     mounts: [
///         (path: "content", root: "base/content"),
///         (path: "content", root: "mods/hd/content", read_only: true),
///     ],
/// )"#)
/// .unwrap();
/// assert_eq!(config.mounts.len(), 2);
/// ```
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct VfsConfig {
    /// The mounts, lowest precedence first.
    #[serde(default)]
    pub mounts: Vec<MountConfig>,
}

impl VfsConfig {
    /// Parses a manifest from RON text.
    pub fn from_ron(text: &str) -> crate::Result<Self> {
        Ok(ron::from_str(text)?)
    }

    /// Reads and parses the manifest at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        debug!(manifest = %path.as_ref().display(), "loaded mount manifest");
        Self::from_ron(&text)
    }
}

impl Vfs {
    /// Creates a virtual filesystem with every mount from `config` applied in order.
    pub fn from_config(config: &VfsConfig) -> crate::Result<Self> {
        let mut vfs = Self::new();
        for mount in &config.mounts {
            let mut backend: Arc<dyn Backend> = Arc::new(SubtreeBackend::disk(&mount.root));
            if mount.read_only {
                backend = Arc::new(GuardedBackend::read_only(backend));
            }

            vfs.mount(&mount.path, backend)?;
        }

        debug!(mounts = vfs.len(), "applied mount manifest");
        Ok(vfs)
    }
}

#[cfg(test)]
mod test {
    use crate::config::{MountConfig, VfsConfig};
    use crate::vfs::Vfs;
    use crate::VfsError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn parse() {
        let config = VfsConfig::from_ron(
            r#"(mounts: [
                (path: "assets", root: "/srv/assets"),
                (path: "", root: "base", read_only: true),
            ])"#,
        )
        .unwrap();

        assert_eq!(
            config.mounts,
            vec![
                MountConfig {
                    path: "assets".to_owned(),
                    root: "/srv/assets".into(),
                    read_only: false,
                },
                MountConfig {
                    path: "".to_owned(),
                    root: "base".into(),
                    read_only: true,
                },
            ]
        );
        assert_eq!(VfsConfig::from_ron("(mounts: [])").unwrap(), VfsConfig::default());
    }

    #[test]
    fn parse_error() {
        assert!(matches!(
            VfsConfig::from_ron("(mounts: [(path: 7)])"),
            Err(VfsError::Config(_))
        ));
        assert!(matches!(
            VfsConfig::load("definitely/not/a/manifest.ron"),
            Err(VfsError::Io(_))
        ));
    }

    #[test]
    fn invalid_mount_path() {
        let config = VfsConfig {
            mounts: vec![MountConfig {
                path: "../escape".to_owned(),
                root: ".".into(),
                read_only: false,
            }],
        };
        assert!(matches!(Vfs::from_config(&config), Err(VfsError::InvalidPath(_))));
    }

    #[test]
    fn apply() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("base");
        let hd = dir.path().join("hd");
        fs::create_dir_all(&base).unwrap();
        fs::create_dir_all(&hd).unwrap();
        fs::write(base.join("hello.txt"), "base").unwrap();
        fs::write(hd.join("hello.txt"), "hd").unwrap();

        let manifest = dir.path().join("mounts.ron");
        let config = VfsConfig {
            mounts: vec![
                MountConfig {
                    path: "content".to_owned(),
                    root: base.clone(),
                    read_only: false,
                },
                MountConfig {
                    path: "content".to_owned(),
                    root: hd.clone(),
                    read_only: true,
                },
            ],
        };
        fs::write(&manifest, ron::to_string(&config).unwrap()).unwrap();

        let loaded = VfsConfig::load(&manifest).unwrap();
        assert_eq!(loaded, config);

        let vfs = Vfs::from_config(&loaded).unwrap();
        assert_eq!(vfs.len(), 2);
        assert_eq!(vfs.read_text("content/hello.txt", false).unwrap(), "hd");

        // the read-only overlay declines, so the write lands in the base directory
        vfs.write_file("content/new.txt", b"new").unwrap();
        assert!(base.join("new.txt").exists());
        assert!(!hd.join("new.txt").exists());
    }
}
