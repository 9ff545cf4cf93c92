//! Display rank resolution for pipeline rows.
//!
//! Backend rank hints are trusted only when they are positive integers no
//! larger than `MAX_TRUSTED_RANK`. Anything else is replaced by the row's
//! sequential position so a bad import never shows up as "rank 48213".

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::types::{Record, Section};

/// Largest rank hint accepted from the backend.
pub const MAX_TRUSTED_RANK: u64 = 1000;

/// Shown in place of the rank for Speedrun rows already worked today.
pub const COMPLETED_MARKER: &str = "✓";

/// What a single rank field contributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankHint {
    Absent,
    Valid(u32),
    Corrupt,
}

/// Classify a raw rank field. `null` counts as absent.
pub fn read_rank_hint(value: Option<&Value>) -> RankHint {
    let Some(value) = value else {
        return RankHint::Absent;
    };
    match value {
        Value::Null => RankHint::Absent,
        Value::Number(n) => {
            let whole = n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= 1.0 && *f <= MAX_TRUSTED_RANK as f64)
                    .map(|f| f as u64)
            });
            match whole {
                Some(r) if (1..=MAX_TRUSTED_RANK).contains(&r) => RankHint::Valid(r as u32),
                _ => RankHint::Corrupt,
            }
        }
        _ => RankHint::Corrupt,
    }
}

/// The rank cell as rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayRank {
    Position(u32),
    /// Company-scoped person rank, rendered `company:person`.
    Hierarchical { company: u32, person: u32 },
    /// Speedrun row completed today. `rank` is kept for rank edits.
    Completed { rank: u32 },
}

impl DisplayRank {
    /// The number an inline rank edit starts from.
    pub fn editable_rank(&self) -> u32 {
        match self {
            DisplayRank::Position(rank) | DisplayRank::Completed { rank } => *rank,
            DisplayRank::Hierarchical { person, .. } => *person,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, DisplayRank::Completed { .. })
    }
}

impl fmt::Display for DisplayRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayRank::Position(rank) => write!(f, "{}", rank),
            DisplayRank::Hierarchical { company, person } => write!(f, "{}:{}", company, person),
            DisplayRank::Completed { .. } => f.write_str(COMPLETED_MARKER),
        }
    }
}

impl Serialize for DisplayRank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DisplayRank::Position(rank) => serializer.serialize_u32(*rank),
            other => serializer.collect_str(other),
        }
    }
}

/// A resolved rank plus whether a corrupt hint had to be overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedPosition {
    pub display: DisplayRank,
    pub corrected: bool,
}

/// Resolve `first ?? second ?? index + 1`, guarding against corrupt hints.
///
/// The first non-absent hint decides; a corrupt one is not skipped in favour
/// of the next field, it is replaced by the sequential position.
fn resolve_flat(record: &Record, hints: &[Option<&Value>], index: usize) -> (u32, bool) {
    let fallback = (index + 1) as u32;
    for hint in hints {
        match read_rank_hint(*hint) {
            RankHint::Absent => continue,
            RankHint::Valid(rank) => return (rank, false),
            RankHint::Corrupt => {
                log::warn!(
                    "rank: record {} has corrupt rank {:?}, using position {}",
                    record.id,
                    hint,
                    fallback
                );
                return (fallback, true);
            }
        }
    }
    (fallback, false)
}

/// Compute the rank cell for a row at `index` of the projected list.
///
/// `completed` is only honoured in the Speedrun section.
pub fn compute_display_rank(
    record: &Record,
    index: usize,
    section: &Section,
    completed: bool,
) -> RankedPosition {
    if section.is_speedrun() {
        let (rank, corrected) = resolve_flat(
            record,
            &[record.global_rank.as_ref(), record.rank.as_ref()],
            index,
        );
        let display = if completed {
            DisplayRank::Completed { rank }
        } else {
            DisplayRank::Position(rank)
        };
        return RankedPosition { display, corrected };
    }

    let mut company_corrupt = false;
    let company = match read_rank_hint(record.company_rank.as_ref()) {
        RankHint::Valid(company) => Some(company),
        RankHint::Corrupt => {
            log::warn!(
                "rank: record {} has corrupt company rank {:?}, using flat rank",
                record.id,
                record.company_rank
            );
            company_corrupt = true;
            None
        }
        RankHint::Absent => None,
    };

    if let Some(company) = company {
        let (person, corrected) = resolve_flat(record, &[record.person_rank.as_ref()], index);
        return RankedPosition {
            display: DisplayRank::Hierarchical { company, person },
            corrected,
        };
    }

    let (rank, corrected) = resolve_flat(
        record,
        &[record.global_person_rank.as_ref(), record.rank.as_ref()],
        index,
    );
    RankedPosition {
        display: DisplayRank::Position(rank),
        corrected: corrected || company_corrupt,
    }
}
