use crate::types::{Record, Section};

/// Fields a search box query is matched against.
const SEARCH_FIELDS: [&str; 13] = [
    "name",
    "fullName",
    "firstName",
    "lastName",
    "title",
    "jobTitle",
    "description",
    "company",
    "email",
    "assignee",
    "mainSeller",
    "status",
    "stage",
];

/// Case-insensitive substring filter. A blank query keeps every record in
/// its original order; the input slice is never touched.
pub fn filter_by_search(records: &[Record], query: &str) -> Vec<Record> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.to_vec();
    }

    records
        .iter()
        .filter(|record| matches_query(record, &needle))
        .cloned()
        .collect()
}

fn matches_query(record: &Record, needle: &str) -> bool {
    SEARCH_FIELDS.iter().any(|key| {
        record
            .text_field(key)
            .map(|text| text.to_lowercase().contains(needle))
            .unwrap_or(false)
    })
}

/// Drop records flagged as hidden from `section`.
pub fn filter_hidden_from_section(records: &[Record], section: &Section) -> Vec<Record> {
    records
        .iter()
        .filter(|record| {
            !record
                .hidden_from_sections
                .iter()
                .any(|s| s.eq_ignore_ascii_case(section.as_str()))
        })
        .cloned()
        .collect()
}
