use std::ops::Deref;

/// An immutable byte buffer returned by a successful read.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct Blob {
    bytes: Vec<u8>,
}

impl Blob {
    /// Returns the contents as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the length of the contents, in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the blob holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consumes the blob, returning the underlying buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Converts the contents into text. Invalid UTF-8 sequences are replaced with `U+FFFD`.
    ///
    /// # Arguments
    /// `append_nul`: If true, a trailing `'\0'` is appended to the text.
    pub fn to_text(&self, append_nul: bool) -> String {
        let mut text = String::from_utf8_lossy(&self.bytes).into_owned();
        if append_nul {
            text.push('\0');
        }
        text
    }
}

impl Deref for Blob {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.bytes
    }
}

impl AsRef<[u8]> for Blob {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl From<&[u8]> for Blob {
    fn from(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }
}
