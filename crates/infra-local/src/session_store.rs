// JSON file session store

use resume_match_core::domain::PersistedSession;
use resume_match_core::error::Result;
use resume_match_core::port::SessionStore;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Persists the session as one small JSON document
///
/// A missing file is the logged-out default. Writes go through a sibling
/// temp file and a rename, so a crash never leaves a truncated file.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<PersistedSession> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No persisted session");
                Ok(PersistedSession::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, session: &PersistedSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(session)?)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), authenticated = session.authenticated, "Session saved");
        Ok(())
    }
}
