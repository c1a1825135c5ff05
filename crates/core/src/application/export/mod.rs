// Export Generator - result view-state rendered as downloadable artifacts
//
// Both encodings are pure functions of the match result and the staged file
// names: no network, no controller mutation, identical input gives identical
// bytes.

pub mod csv;
pub mod pdf;

use crate::application::constants::{CSV_FILE_NAME, PDF_FILE_NAME};
use crate::domain::MatchResult;

/// Column headings shared by both encodings
pub const TABLE_HEADER: [&str; 2] = ["Field", "Value"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => CSV_FILE_NAME,
            ExportFormat::Pdf => PDF_FILE_NAME,
        }
    }
}

/// Rendered export ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn file_name(&self) -> &'static str {
        self.format.file_name()
    }
}

/// Owned copy of everything an export needs
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub resume_file: String,
    pub job_file: String,
    pub result: MatchResult,
}

impl ExportReport {
    pub fn new(result: &MatchResult, resume_file: &str, job_file: &str) -> Self {
        Self {
            resume_file: resume_file.to_string(),
            job_file: job_file.to_string(),
            result: result.clone(),
        }
    }

    /// The six data rows, in table order
    pub fn rows(&self) -> [(&'static str, String); 6] {
        [
            ("Resume File", self.resume_file.clone()),
            ("Job File", self.job_file.clone()),
            ("Match Score", self.result.score_label()),
            ("Matched Skills", self.result.matched_skills.join(", ")),
            ("Missing Skills", self.result.missing_skills.join(", ")),
            ("Timestamp", self.result.computed_at_label()),
        ]
    }
}
