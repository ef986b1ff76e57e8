use crate::VfsError;
use itertools::Itertools;

/// Returns true for either separator accepted in virtual paths.
fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Returns true if the path starts with a drive designator like `C:`.
fn has_drive(path: &str) -> bool {
    let mut chars = path.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(letter), Some(':')) if letter.is_ascii_alphabetic()
    )
}

/// Normalizes a virtual path by collapsing `.` segments and repeated separators, and joining the remaining segments
/// with forward slashes. Rooted paths, drive-prefixed paths and paths containing any `..` segment are rejected.
///
/// The namespace root normalizes to the empty string.
///
/// # Arguments
/// `path`: The virtual path to normalize.
///
/// # Example
/// ```
/// use overlay_vfs::util::normalize;
///
/// assert_eq!(normalize("a/./b//").unwrap(), "a/b");
/// assert_eq!(normalize(".").unwrap(), "");
/// assert!(normalize("/a/b").is_err());
/// assert!(normalize("a/../b").is_err());
/// ```
pub fn normalize(path: &str) -> crate::Result<String> {
    if path.starts_with(is_separator) || has_drive(path) {
        return Err(VfsError::invalid_path(path));
    }

    let segments = path
        .split(is_separator)
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect_vec();

    // no traversal, even if it would stay inside the namespace
    if segments.contains(&"..") {
        return Err(VfsError::invalid_path(path));
    }

    Ok(segments.into_iter().join("/"))
}

/// Returns the path relative to `mount` if `mount` serves `full`. Both paths must already be normalized. The root
/// mount serves everything, and a match must end on a segment boundary.
///
/// # Arguments
/// `full`: The normalized virtual path.
/// `mount`: The normalized mount path.
///
/// # Example
/// ```
/// use overlay_vfs::util::relative_to_mount;
///
/// assert_eq!(relative_to_mount("content/a.txt", "content"), Some("a.txt"));
/// assert_eq!(relative_to_mount("content", "content"), Some(""));
/// assert_eq!(relative_to_mount("contentx/a.txt", "content"), None);
/// ```
pub fn relative_to_mount<'a>(full: &'a str, mount: &str) -> Option<&'a str> {
    if mount.is_empty() {
        return Some(full);
    }

    match full.strip_prefix(mount)? {
        "" => Some(""),
        rest => rest.strip_prefix('/'),
    }
}

/// Returns the first segment of `mount` below `parent`, if `mount` lies strictly under `parent`. This is the name of
/// the directory the mount implies when listing `parent`, however deep the mount is.
///
/// # Arguments
/// `parent`: The normalized directory being listed.
/// `mount`: The normalized mount path.
///
/// # Example
/// ```
/// use overlay_vfs::util::child_mount_name;
///
/// assert_eq!(child_mount_name("", "a/b/c"), Some("a"));
/// assert_eq!(child_mount_name("a", "a/b/c"), Some("b"));
/// assert_eq!(child_mount_name("a/b/c", "a/b/c"), None);
/// ```
pub fn child_mount_name<'a>(parent: &str, mount: &'a str) -> Option<&'a str> {
    if mount.is_empty() {
        return None;
    }

    let rest = if parent.is_empty() {
        mount
    } else {
        mount.strip_prefix(parent)?.strip_prefix('/')?
    };

    rest.split('/').next()
}

/// Splits a backend path into its parent directory and file name. The parent of a single segment is the empty
/// string.
pub(crate) fn split_parent(path: &str) -> (&str, &str) {
    path.rsplit_once('/').unwrap_or(("", path))
}
