use std::path::Path;

/// A set of file extensions used to filter listings. Matching is case-sensitive and includes the leading dot, which
/// is added to any entry supplied without one. An empty filter matches every file.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ExtensionFilter {
    extensions: Option<Vec<String>>,
}

impl ExtensionFilter {
    /// Returns a filter that matches every file.
    pub fn any() -> Self {
        Self::default()
    }

    /// Returns true if the filter places no restriction on files.
    pub fn is_any(&self) -> bool {
        self.extensions.is_none()
    }

    /// Returns true if `file_name` passes the filter.
    ///
    /// # Arguments
    /// `file_name`: The name of the file, without any parent directories.
    pub fn matches(&self, file_name: &str) -> bool {
        let Some(extensions) = &self.extensions else {
            return true;
        };

        let Some(extension) = Path::new(file_name).extension().and_then(|ext| ext.to_str()) else {
            return false;
        };

        extensions
            .iter()
            .any(|entry| entry.strip_prefix('.') == Some(extension))
    }
}

impl<S: AsRef<str>> FromIterator<S> for ExtensionFilter {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut iter = iter.into_iter().peekable();
        if iter.peek().is_none() {
            return Self::any();
        }

        // empty entries are kept out but still make the filter restrictive
        let extensions = iter
            .map(|entry| entry.as_ref().to_owned())
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                if entry.starts_with('.') {
                    entry
                } else {
                    format!(".{entry}")
                }
            })
            .collect();

        Self {
            extensions: Some(extensions),
        }
    }
}

impl From<&ExtensionFilter> for ExtensionFilter {
    fn from(value: &ExtensionFilter) -> Self {
        value.clone()
    }
}

impl<S: AsRef<str>, const N: usize> From<[S; N]> for ExtensionFilter {
    fn from(value: [S; N]) -> Self {
        value.into_iter().collect()
    }
}

impl<S: AsRef<str>> From<&[S]> for ExtensionFilter {
    fn from(value: &[S]) -> Self {
        value.iter().collect()
    }
}

impl<S: AsRef<str>> From<Vec<S>> for ExtensionFilter {
    fn from(value: Vec<S>) -> Self {
        value.into_iter().collect()
    }
}
