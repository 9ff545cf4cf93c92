use chrono::{DateTime, Utc};

use crate::timing::{next_action_timing, parse_timestamp, ActionTiming, NEVER};
use crate::types::{person_name, str_field, ActionSummary, ColorToken, Record};

pub const NO_ACTION: &str = "No action";
pub const JUST_CREATED: &str = "Record just created";
pub const EMPTY_CELL: &str = "-";

/// Action texts that describe record creation or nothing at all.
const PLACEHOLDER_ACTIONS: [&str; 4] = [NO_ACTION, EMPTY_CELL, "Company record created", "Record created"];

fn is_placeholder_action(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || PLACEHOLDER_ACTIONS.contains(&trimmed)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// Build the last-action cell: timing badge plus action text.
pub fn compute_last_action_summary(
    record: &Record,
    timing: &dyn ActionTiming,
    now: DateTime<Utc>,
) -> ActionSummary {
    let (timing_text, color_token) = match record.last_action_time.as_deref() {
        Some(precomputed) => (precomputed.to_string(), ColorToken::Neutral),
        None => {
            let at = non_blank(&record.last_action_date)
                .or_else(|| non_blank(&record.last_contact_date))
                .or_else(|| non_blank(&record.last_contact))
                .and_then(parse_timestamp);
            let bucket = timing.last_action_timing(at, now);
            (bucket.text, bucket.color)
        }
    };

    let action_text = record
        .last_action
        .as_deref()
        .or(record.last_action_description.as_deref())
        .unwrap_or(NO_ACTION);

    let never = timing_text == NEVER;
    let placeholder = is_placeholder_action(action_text);

    let text = if (never || placeholder) && record.created_at.is_some() {
        JUST_CREATED.to_string()
    } else if !placeholder {
        action_text.to_string()
    } else {
        EMPTY_CELL.to_string()
    };

    ActionSummary {
        text,
        timing: timing_text,
        color_token,
    }
}

/// Build the next-action cell from `nextAction` / `nextActionDate`.
pub fn compute_next_action_summary(record: &Record, now: DateTime<Utc>) -> ActionSummary {
    let due = non_blank(&record.next_action_date).and_then(parse_timestamp);
    let bucket = next_action_timing(due, now);
    let text = non_blank(&record.next_action)
        .unwrap_or(EMPTY_CELL)
        .to_string();

    ActionSummary {
        text,
        timing: bucket.text,
        color_token: bucket.color,
    }
}

/// Owner column label: "Me" for the signed-in seller, else the seller name.
///
/// Falls back to the flat `sellerFirstName` / `sellerLastName` /
/// `sellerName` / `sellerEmail` columns when `mainSeller` is missing.
pub fn owner_label(record: &Record, current_user_id: Option<&str>) -> String {
    let is_me = match (record.main_seller_id.as_deref(), current_user_id) {
        (Some(owner), Some(me)) => owner == me,
        _ => false,
    };
    if is_me {
        return "Me".to_string();
    }
    if let Some(name) = non_blank(&record.main_seller) {
        return name.to_string();
    }
    let fields = &record.fields;
    person_name(
        str_field(fields, "sellerFirstName"),
        str_field(fields, "sellerLastName"),
        str_field(fields, "sellerName"),
        str_field(fields, "sellerEmail"),
    )
    .unwrap_or_else(|| EMPTY_CELL.to_string())
}
