// Staged documents and upload feedback

use std::fmt;
use std::sync::Arc;

/// The two document slots of the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Resume,
    JobDescription,
}

impl DocumentKind {
    /// Human label used in operator messages
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Resume => "resume",
            DocumentKind::JobDescription => "job description",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            DocumentKind::Resume => 0,
            DocumentKind::JobDescription => 1,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Resume => write!(f, "RESUME"),
            DocumentKind::JobDescription => write!(f, "JOB"),
        }
    }
}

/// A file selected locally but not yet confirmed uploaded
///
/// The content is shared, so cloning a staged file for an upload does not
/// copy the bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct StagedFile {
    name: String,
    bytes: Arc<[u8]>,
}

impl StagedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: Arc::from(bytes.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Content is elided so logs never dump document bytes
impl fmt::Debug for StagedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagedFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Confirmation text returned by the upload endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub message: String,
}

impl UploadReceipt {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Per-slot feedback shown under the upload action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadMessage {
    Confirmed(UploadReceipt),
    Failed(String),
}

impl UploadMessage {
    /// Failure text for a slot, e.g. "Error uploading resume"
    pub fn failed(kind: DocumentKind, detail: impl fmt::Display) -> Self {
        UploadMessage::Failed(format!("Error uploading {} ({})", kind.label(), detail))
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, UploadMessage::Confirmed(_))
    }
}

impl fmt::Display for UploadMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadMessage::Confirmed(receipt) => write!(f, "{}", receipt.message),
            UploadMessage::Failed(text) => write!(f, "{}", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staged_file_debug_hides_content() {
        let file = StagedFile::new("resume.pdf", b"%PDF-secret".to_vec());
        let rendered = format!("{:?}", file);
        assert!(rendered.contains("resume.pdf"));
        assert!(!rendered.contains("secret"));
        assert_eq!(file.len(), 11);
    }

    #[test]
    fn test_failed_message_names_slot() {
        let msg = UploadMessage::failed(DocumentKind::JobDescription, "HTTP 500");
        assert_eq!(
            msg.to_string(),
            "Error uploading job description (HTTP 500)"
        );
        assert!(!msg.is_confirmed());
    }
}
