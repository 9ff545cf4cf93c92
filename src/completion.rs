//! Speedrun "worked today" detection.
//!
//! A Speedrun row is completed when the backend says its last action happened
//! today. Until the backend catches up, the host keeps its own per-day set of
//! completed ids, which is consulted second.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::timing::parse_timestamp;
use crate::types::Record;

/// Which tier marked a record completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionSource {
    LastActionDate,
    CompletedSet,
}

/// Two-tier completion check; the first tier that matches wins.
///
/// `lastActionDate` must fall on `today` (UTC calendar day). Otherwise the
/// caller's completed-id set for today is consulted.
pub fn completion_source(
    record: &Record,
    today: NaiveDate,
    completed_ids: &HashSet<String>,
) -> Option<CompletionSource> {
    let acted_today = record
        .last_action_date
        .as_deref()
        .and_then(parse_timestamp)
        .map(|at| at.date_naive() == today)
        .unwrap_or(false);
    if acted_today {
        return Some(CompletionSource::LastActionDate);
    }

    if completed_ids.contains(&record.id) {
        return Some(CompletionSource::CompletedSet);
    }

    None
}

pub fn compute_completion_flag(
    record: &Record,
    today: NaiveDate,
    completed_ids: &HashSet<String>,
) -> bool {
    completion_source(record, today, completed_ids).is_some()
}

/// Result of a Speedrun call attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpeedrunOutcome {
    Connected,
    Pitched,
    DemoScheduled,
    NotInterested,
    WrongNumber,
    Voicemail,
    NoAnswer,
    Busy,
}

/// Status a Speedrun record moves to after an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionStatus {
    /// Worked for today; leaves the queue.
    Done,
    /// Touched but stays in the queue for a retry.
    Attempted,
}

impl SpeedrunOutcome {
    /// Parse an outcome label. Unknown labels are `None`; callers treat them as done.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "connected" => Some(SpeedrunOutcome::Connected),
            "pitched" => Some(SpeedrunOutcome::Pitched),
            "demo-scheduled" => Some(SpeedrunOutcome::DemoScheduled),
            "not-interested" => Some(SpeedrunOutcome::NotInterested),
            "wrong-number" => Some(SpeedrunOutcome::WrongNumber),
            "voicemail" => Some(SpeedrunOutcome::Voicemail),
            "no-answer" => Some(SpeedrunOutcome::NoAnswer),
            "busy" => Some(SpeedrunOutcome::Busy),
            _ => None,
        }
    }

    pub fn status(self) -> CompletionStatus {
        match self {
            SpeedrunOutcome::Voicemail | SpeedrunOutcome::NoAnswer | SpeedrunOutcome::Busy => {
                CompletionStatus::Attempted
            }
            _ => CompletionStatus::Done,
        }
    }
}

/// Status for a raw outcome label, defaulting unknown labels to `Done`.
pub fn completion_status_for(raw_outcome: &str) -> CompletionStatus {
    SpeedrunOutcome::parse(raw_outcome)
        .map(SpeedrunOutcome::status)
        .unwrap_or(CompletionStatus::Done)
}

/// Per-day completed-id set, persisted by the host between sessions.
///
/// The set belongs to a single calendar day. Reading it for any other day
/// yields nothing, and recording on a new day starts a fresh set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCompletions {
    #[serde(default)]
    pub day: Option<NaiveDate>,
    #[serde(default)]
    pub ids: BTreeSet<String>,
}

impl DailyCompletions {
    pub fn new(day: NaiveDate) -> Self {
        DailyCompletions {
            day: Some(day),
            ids: BTreeSet::new(),
        }
    }

    /// Record an outcome for `record_id` on `today`.
    ///
    /// Returns true when the record now counts as completed for the day.
    pub fn record_outcome(&mut self, record_id: &str, outcome: &str, today: NaiveDate) -> bool {
        if self.day != Some(today) {
            log::debug!(
                "completions: rolling over from {:?} to {}, dropping {} ids",
                self.day,
                today,
                self.ids.len()
            );
            self.day = Some(today);
            self.ids.clear();
        }

        match completion_status_for(outcome) {
            CompletionStatus::Done => {
                self.ids.insert(record_id.to_string());
                true
            }
            CompletionStatus::Attempted => false,
        }
    }

    /// Completed ids valid for `today`.
    pub fn ids_for(&self, today: NaiveDate) -> HashSet<String> {
        if self.day == Some(today) {
            self.ids.iter().cloned().collect()
        } else {
            HashSet::new()
        }
    }
}
