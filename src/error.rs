//! Error types for list projection
//!
//! Errors are classified by who has to act:
//! - CallerContract: the host passed something that is not a projection input
//! - Configuration: the workspace config file could not be read or parsed
//!
//! Dirty record data (corrupt ranks, missing timestamps) is never an error.
//! It is corrected in place and surfaced through logging and counters.

use std::path::PathBuf;
use thiserror::Error;

/// Error types for list projection
#[derive(Debug, Error)]
pub enum ProjectionError {
    // Caller-contract violations
    #[error("Records payload must be a JSON array, got {0}")]
    RecordsNotArray(&'static str),

    #[error("Record at position {index} is malformed: {reason}")]
    InvalidRecord { index: usize, reason: String },

    #[error("Section is required")]
    MissingSection,

    #[error("Page numbers start at 1, got {0}")]
    InvalidPage(usize),

    // Configuration errors
    #[error("Failed to read config {path}: {reason}")]
    ConfigRead { path: PathBuf, reason: String },

    #[error("Failed to parse config {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },
}

impl ProjectionError {
    /// Returns true if the host called the projector incorrectly
    pub fn is_caller_bug(&self) -> bool {
        matches!(
            self,
            ProjectionError::RecordsNotArray(_)
                | ProjectionError::InvalidRecord { .. }
                | ProjectionError::MissingSection
                | ProjectionError::InvalidPage(_)
        )
    }

    /// Get a developer-facing recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ProjectionError::RecordsNotArray(_) => {
                "Pass the records list itself, not the API response envelope."
            }
            ProjectionError::InvalidRecord { .. } => {
                "Every record needs a string `id`; check the fetch mapping."
            }
            ProjectionError::MissingSection => {
                "Pass one of: leads, prospects, opportunities, companies, people, speedrun."
            }
            ProjectionError::InvalidPage(_) => "Request page 1 or later.",
            ProjectionError::ConfigRead { .. } => {
                "Check that the config file exists and is readable."
            }
            ProjectionError::ConfigParse { .. } => {
                "Check the config file is valid JSON in the workspace config format."
            }
        }
    }
}

/// Serializable error representation for the host UI
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionErrorPayload {
    pub message: String,
    pub error_type: ErrorType,
    pub recovery_suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorType {
    CallerContract,
    Configuration,
}

impl From<&ProjectionError> for ProjectionErrorPayload {
    fn from(err: &ProjectionError) -> Self {
        let error_type = if err.is_caller_bug() {
            ErrorType::CallerContract
        } else {
            ErrorType::Configuration
        };

        ProjectionErrorPayload {
            message: err.to_string(),
            error_type,
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}
