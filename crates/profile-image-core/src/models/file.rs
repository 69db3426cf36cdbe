use bytes::Bytes;

/// A file the user picked for upload.
///
/// Only lives between selection and either a finished transfer or a rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// Display name; becomes the last segment of the storage key.
    pub name: String,
    /// Declared media type, e.g. `image/png`.
    pub content_type: String,
    pub data: Bytes,
}

impl CandidateFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
