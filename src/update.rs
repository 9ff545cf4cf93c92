//! Inline edits from the table (rank changes and field updates).
//!
//! The host persists edits; this module only decides what to send and how
//! the result is reported back to the table.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::rank::{read_rank_hint, RankHint};
use crate::types::{Section, ViewRow};

/// Why an edit was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "camelCase")]
pub enum UpdateFailure {
    #[error("Invalid value: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Record changed elsewhere: {0}")]
    Conflict(String),
}

/// Result of persisting an edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "failure", rename_all = "camelCase")]
pub enum UpdateOutcome {
    Success,
    Failure(UpdateFailure),
}

impl UpdateOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UpdateOutcome::Success)
    }

    /// Only transport failures are worth retrying as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, UpdateOutcome::Failure(UpdateFailure::Network(_)))
    }
}

impl From<Result<(), UpdateFailure>> for UpdateOutcome {
    fn from(result: Result<(), UpdateFailure>) -> Self {
        match result {
            Ok(()) => UpdateOutcome::Success,
            Err(failure) => UpdateOutcome::Failure(failure),
        }
    }
}

/// Host-side persistence for a single field edit.
pub trait RecordUpdater {
    fn update(&self, record_id: &str, field: &str, value: Value) -> UpdateOutcome;
}

/// Validate a proposed rank. Same bounds as rank hints from the backend.
pub fn validate_rank_edit(value: &Value) -> Result<u32, UpdateFailure> {
    match read_rank_hint(Some(value)) {
        RankHint::Valid(rank) => Ok(rank),
        RankHint::Absent => Err(UpdateFailure::Validation("rank is required".to_string())),
        RankHint::Corrupt => Err(UpdateFailure::Validation(format!(
            "rank must be a whole number between 1 and {}, got {}",
            crate::rank::MAX_TRUSTED_RANK,
            value
        ))),
    }
}

/// Field a rank edit writes to for a section.
pub fn rank_field_for(section: &Section) -> &'static str {
    match section {
        Section::Speedrun => "globalRank",
        Section::People => "globalPersonRank",
        _ => "rank",
    }
}

/// Validate and submit a rank edit for a projected row.
///
/// Completed Speedrun rows edit their retained numeric rank; an edit that
/// does not change the rank succeeds without calling the updater.
pub fn submit_rank_edit(
    updater: &dyn RecordUpdater,
    section: &Section,
    row: &ViewRow,
    new_rank: &Value,
) -> UpdateOutcome {
    let rank = match validate_rank_edit(new_rank) {
        Ok(rank) => rank,
        Err(failure) => {
            log::debug!("rank edit rejected for {}: {}", row.record.id, failure);
            return UpdateOutcome::Failure(failure);
        }
    };

    if rank == row.display_rank.editable_rank() {
        return UpdateOutcome::Success;
    }

    let outcome = updater.update(&row.record.id, rank_field_for(section), Value::from(rank));
    if let UpdateOutcome::Failure(failure) = &outcome {
        log::warn!("rank edit failed for {}: {}", row.record.id, failure);
    }
    outcome
}
