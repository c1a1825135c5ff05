// Document loading for file selection

use resume_match_core::domain::StagedFile;
use resume_match_core::error::{AppError, Result};
use std::path::Path;
use tracing::debug;

/// Read a local file into a staged document named after its last path component
pub async fn load_document(path: &Path) -> Result<StagedFile> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| AppError::Internal(format!("Not a file: {}", path.display())))?;

    let bytes = tokio::fs::read(path).await?;
    debug!(path = %path.display(), bytes = bytes.len(), "Document loaded");
    Ok(StagedFile::new(name, bytes))
}
