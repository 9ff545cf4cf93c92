//! Column sorting for pipeline tables.
//!
//! Header clicks cycle ascending → descending → unsorted. Sorting is stable,
//! so rows with equal keys keep their filtered order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Some(SortDirection::Asc),
            "desc" | "descending" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortState {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub direction: Option<SortDirection>,
}

impl SortState {
    pub fn by(field: impl Into<String>, direction: SortDirection) -> Self {
        SortState {
            field: Some(field.into()),
            direction: Some(direction),
        }
    }

    pub fn is_active(&self) -> bool {
        self.field.is_some() && self.direction.is_some()
    }

    /// Next state after clicking `column`'s header.
    pub fn toggle(&self, column: &str) -> SortState {
        if self.field.as_deref() != Some(column) {
            return SortState::by(column, SortDirection::Asc);
        }
        match self.direction {
            None => SortState::by(column, SortDirection::Asc),
            Some(SortDirection::Asc) => SortState::by(column, SortDirection::Desc),
            Some(SortDirection::Desc) => SortState {
                field: Some(column.to_string()),
                direction: None,
            },
        }
    }
}

/// Comparable projection of a cell value.
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Number(f64),
    Text(String),
}

fn sort_key(value: Option<Value>) -> Option<SortKey> {
    match value? {
        Value::Number(n) => n.as_f64().map(SortKey::Number),
        Value::Bool(b) => Some(SortKey::Number(if b { 1.0 } else { 0.0 })),
        Value::String(s) => Some(SortKey::Text(s)),
        Value::Object(obj) => obj
            .get("name")
            .and_then(Value::as_str)
            .map(|s| SortKey::Text(s.to_string())),
        Value::Null | Value::Array(_) => None,
    }
}

fn compare_keys(a: &SortKey, b: &SortKey) -> Ordering {
    match (a, b) {
        (SortKey::Number(x), SortKey::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
        // Numbers before text, regardless of direction.
        (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
        (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
    }
}

/// Stable sort by `sort.field`. An inactive sort returns `rows` as given.
///
/// Rows without a value for the field always sink to the bottom.
pub fn sort_rows(rows: &[Record], sort: &SortState) -> Vec<Record> {
    let (Some(field), Some(direction)) = (sort.field.as_deref(), sort.direction) else {
        return rows.to_vec();
    };

    let mut keyed: Vec<(Option<SortKey>, &Record)> = rows
        .iter()
        .map(|record| (sort_key(record.field(field)), record))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => {
            let ord = compare_keys(a, b);
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    keyed.into_iter().map(|(_, record)| record.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(id: &str, name: Value, amount: Value) -> Record {
        Record::new(id)
            .with_field("name", name)
            .with_field("amount", amount)
    }

    fn rows() -> Vec<Record> {
        vec![
            row("1", json!("beta"), json!(300)),
            row("2", json!("Alpha"), json!(50)),
            row("3", json!("alpha"), json!(300)),
            row("4", Value::Null, json!(10)),
        ]
    }

    fn ids(rows: &[Record]) -> Vec<&str> {
        rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn three_state_cycle() {
        let s0 = SortState::default();
        let s1 = s0.toggle("name");
        assert_eq!(s1.direction, Some(SortDirection::Asc));
        let s2 = s1.toggle("name");
        assert_eq!(s2.direction, Some(SortDirection::Desc));
        let s3 = s2.toggle("name");
        assert_eq!(s3.direction, None);
        assert!(!s3.is_active());
        let s4 = s3.toggle("name");
        assert_eq!(s4.direction, Some(SortDirection::Asc));
    }

    #[test]
    fn switching_column_resets_to_ascending() {
        let state = SortState::by("name", SortDirection::Desc).toggle("amount");
        assert_eq!(state, SortState::by("amount", SortDirection::Asc));
    }

    #[test]
    fn inactive_sort_keeps_order() {
        let input = rows();
        let unsorted = SortState {
            field: Some("name".to_string()),
            direction: None,
        };
        assert_eq!(sort_rows(&input, &unsorted), input);
    }

    #[test]
    fn strings_sort_case_sensitive_with_missing_last() {
        let sorted = sort_rows(&rows(), &SortState::by("name", SortDirection::Asc));
        assert_eq!(ids(&sorted), vec!["2", "3", "1", "4"]);

        let sorted = sort_rows(&rows(), &SortState::by("name", SortDirection::Desc));
        assert_eq!(ids(&sorted), vec!["1", "3", "2", "4"]);
    }

    #[test]
    fn numbers_sort_naturally_and_stably() {
        let sorted = sort_rows(&rows(), &SortState::by("amount", SortDirection::Asc));
        assert_eq!(ids(&sorted), vec!["4", "2", "1", "3"]);

        let sorted = sort_rows(&rows(), &SortState::by("amount", SortDirection::Desc));
        assert_eq!(ids(&sorted), vec!["1", "3", "2", "4"]);
    }

    #[test]
    fn sorting_twice_is_identical() {
        let state = SortState::by("amount", SortDirection::Desc);
        let once = sort_rows(&rows(), &state);
        let twice = sort_rows(&rows(), &state);
        assert_eq!(once, twice);
    }

    #[test]
    fn typed_rank_field_sorts() {
        let mut a = Record::new("a");
        a.global_rank = Some(json!(9));
        let mut b = Record::new("b");
        b.global_rank = Some(json!(2));
        let sorted = sort_rows(&[a, b], &SortState::by("globalRank", SortDirection::Asc));
        assert_eq!(ids(&sorted), vec!["b", "a"]);
    }

    #[test]
    fn parse_direction() {
        assert_eq!(SortDirection::parse("DESC"), Some(SortDirection::Desc));
        assert_eq!(SortDirection::parse("up"), None);
    }
}
