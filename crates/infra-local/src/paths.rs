// Platform directory defaults

use directories::ProjectDirs;
use resume_match_core::error::{AppError, Result};
use std::path::PathBuf;

pub const APP_NAME: &str = "resume-match";
pub const SESSION_FILE: &str = "session.json";
pub const CONFIG_FILE: &str = "resume-match.toml";
pub const EXPORT_DIR: &str = "exports";

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
        .ok_or_else(|| AppError::Config("No home directory for platform defaults".to_string()))
}

/// `<data dir>/session.json`
pub fn default_session_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().join(SESSION_FILE))
}

/// `<config dir>/resume-match.toml`
pub fn default_config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join(CONFIG_FILE))
}

/// `<data dir>/exports`
pub fn default_export_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().join(EXPORT_DIR))
}
