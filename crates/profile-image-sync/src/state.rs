/// Observable phase of the uploader.
///
/// `Error` is display-only: the next upload or removal leaves it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadPhase {
    #[default]
    Idle,
    Uploading,
    Removing,
    Error(String),
}

/// Snapshot published to UI surfaces on every transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSession {
    pub phase: UploadPhase,
    /// Name of the file being uploaded; cleared once the attempt ends so the same
    /// file can be picked again.
    pub selected_file: Option<String>,
}

impl UploadSession {
    pub fn is_busy(&self) -> bool {
        matches!(self.phase, UploadPhase::Uploading | UploadPhase::Removing)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            UploadPhase::Error(message) => Some(message),
            _ => None,
        }
    }
}
