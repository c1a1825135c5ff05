// Domain Error Types

use thiserror::Error;

/// Validation failures: a local block shown to the operator as a prompt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Please select a resume file.")]
    ResumeNotStaged,

    #[error("Please select a job description file.")]
    JobNotStaged,

    #[error("Upload both resume and job first.")]
    PairNotStaged,
}
