// Export writer: artifacts land under one directory with fixed names

use resume_match_core::application::ExportArtifact;
use resume_match_core::error::Result;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct ExportWriter {
    directory: PathBuf,
}

impl ExportWriter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Write the artifact, replacing an earlier export of the same format
    pub async fn write(&self, artifact: &ExportArtifact) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.directory).await?;
        let path = self.directory.join(artifact.file_name());
        tokio::fs::write(&path, &artifact.bytes).await?;

        info!(path = %path.display(), bytes = artifact.bytes.len(), "Export written");
        Ok(path)
    }
}
