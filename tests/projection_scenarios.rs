//! End-to-end projection checks against JSON payloads shaped like the
//! pipeline API responses.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::json;

use pipeline_projector::completion::compute_completion_flag;
use pipeline_projector::config::WorkspaceConfig;
use pipeline_projector::rank::compute_display_rank;
use pipeline_projector::search::filter_by_search;
use pipeline_projector::sort::{sort_rows, SortDirection, SortState};
use pipeline_projector::summary::{compute_last_action_summary, JUST_CREATED};
use pipeline_projector::timing::RealtimeTiming;
use pipeline_projector::types::parse_records;
use pipeline_projector::{ProjectionContext, ProjectionRequest, RankedListProjector, Record, Section};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 15, 0, 0).unwrap()
}

fn today() -> NaiveDate {
    now().date_naive()
}

#[test]
fn corrupt_global_rank_falls_back_to_position() {
    let projector = RankedListProjector::new(WorkspaceConfig::default());
    let payload = json!([
        { "id": "1", "globalRank": 5000 },
        { "id": "2", "globalRank": 2 }
    ]);
    let empty = HashSet::new();
    let ctx = ProjectionContext::new(now(), &empty);

    let projection = projector
        .project_json(payload, &ProjectionRequest::new("speedrun"), &ctx)
        .unwrap();

    let value = serde_json::to_value(&projection).unwrap();
    assert_eq!(value["rows"][0]["displayRank"], json!(1));
    assert_eq!(value["rows"][1]["displayRank"], json!(2));
    assert_eq!(value["correctedRanks"], json!(1));
    assert_eq!(value["rows"][0]["isCompletedMarker"], json!(false));
}

#[test]
fn absent_or_non_numeric_rank_is_index_plus_one() {
    let records = parse_records(json!([
        { "id": "a" },
        { "id": "b", "globalRank": "n/a" },
        { "id": "c", "globalRank": 1001 },
        { "id": "d", "globalRank": null }
    ]))
    .unwrap();

    for (index, record) in records.iter().enumerate() {
        let ranked = compute_display_rank(record, index, &Section::Speedrun, false);
        assert_eq!(ranked.display.to_string(), (index + 1).to_string(), "record {}", record.id);
    }
}

#[test]
fn placeholder_action_on_new_record_reads_just_created() {
    let records = parse_records(json!([
        { "id": "x", "lastAction": "-", "createdAt": "2024-01-01" }
    ]))
    .unwrap();

    let summary = compute_last_action_summary(&records[0], &RealtimeTiming, now());
    assert_eq!(summary.timing, "Never");
    assert_eq!(summary.text, JUST_CREATED);
}

#[test]
fn company_scoped_rank_renders_pair() {
    let projector = RankedListProjector::new(WorkspaceConfig::default());
    let payload = json!([{ "id": "p", "companyRank": 3, "personRank": 7 }]);
    let empty = HashSet::new();
    let ctx = ProjectionContext::new(now(), &empty);

    let projection = projector
        .project_json(payload, &ProjectionRequest::new("people"), &ctx)
        .unwrap();
    assert_eq!(projection.rows[0].display_rank.to_string(), "3:7");
    assert_eq!(
        serde_json::to_value(&projection.rows[0].display_rank).unwrap(),
        json!("3:7")
    );
}

#[test]
fn null_direction_leaves_rows_in_place() {
    let rows = parse_records(json!([
        { "id": "1", "name": "Cy" },
        { "id": "2", "name": "Ab" },
        { "id": "3", "name": "Bo" }
    ]))
    .unwrap();
    let state = SortState {
        field: Some("name".to_string()),
        direction: None,
    };
    assert_eq!(sort_rows(&rows, &state), rows);
}

#[test]
fn header_clicks_cycle_through_three_states() {
    let mut state = SortState::default();
    let mut seen = Vec::new();
    for _ in 0..4 {
        state = state.toggle("company");
        seen.push(state.direction);
    }
    assert_eq!(
        seen,
        vec![
            Some(SortDirection::Asc),
            Some(SortDirection::Desc),
            None,
            Some(SortDirection::Asc)
        ]
    );
}

#[test]
fn sort_is_stable_across_runs() {
    let rows = parse_records(json!([
        { "id": "1", "status": "Open" },
        { "id": "2", "status": "Closed" },
        { "id": "3", "status": "Open" },
        { "id": "4", "status": "Closed" }
    ]))
    .unwrap();
    let state = SortState::by("status", SortDirection::Asc);
    let first = sort_rows(&rows, &state);
    let second = sort_rows(&rows, &state);
    assert_eq!(first, second);
    let ids: Vec<&str> = first.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "4", "1", "3"]);
}

#[test]
fn empty_search_is_identity_and_pure() {
    let records = parse_records(json!([
        { "id": "1", "name": "Ana" },
        { "id": "2", "name": "Ben" }
    ]))
    .unwrap();
    let snapshot = records.clone();
    assert_eq!(filter_by_search(&records, ""), records);
    let _ = filter_by_search(&records, "ana");
    assert_eq!(records, snapshot);
}

#[test]
fn last_action_today_completes_without_set_entry() {
    let mut record = Record::new("r");
    record.last_action_date = Some("2026-03-10T07:45:00Z".to_string());
    let completed: HashSet<String> = ["someone-else".to_string()].into_iter().collect();
    assert!(compute_completion_flag(&record, today(), &completed));
}

#[test]
fn hidden_records_and_columns_are_dropped() {
    let mut config = WorkspaceConfig::default();
    config
        .hidden_columns
        .insert("leads".to_string(), vec!["email".to_string()]);
    let projector = RankedListProjector::new(config);
    let payload = json!([
        { "id": "1", "name": "Ana", "hiddenFromSections": ["leads"] },
        { "id": "2", "name": "Ben" }
    ]);
    let empty = HashSet::new();
    let ctx = ProjectionContext::new(now(), &empty);

    let projection = projector
        .project_json(payload, &ProjectionRequest::new("leads"), &ctx)
        .unwrap();
    assert_eq!(projection.total_count, 1);
    assert_eq!(projection.rows[0].record.id, "2");
    assert!(!projection.rows[0]
        .ordered_visible_columns
        .iter()
        .any(|c| c == "email"));
    assert_eq!(projection.rows[0].ordered_visible_columns[0], "rank");
}

#[test]
fn nullable_backend_fields_still_render_every_row() {
    let projector = RankedListProjector::new(WorkspaceConfig::default());
    let payload = json!([
        { "id": "1", "name": "Ana", "hiddenFromSections": null, "lastActionDate": null },
        { "id": "2", "name": "Ben", "hiddenFromSections": "[\"speedrun\"]", "status": 3 },
        { "id": "3", "name": "Cy", "lastActionDate": 1710000000000u64, "createdAt": null },
        { "id": "4", "name": "Di", "nextActionDate": false, "mainSeller": null }
    ]);
    let empty = HashSet::new();
    let ctx = ProjectionContext::new(now(), &empty);

    let people = projector
        .project_json(payload.clone(), &ProjectionRequest::new("people"), &ctx)
        .unwrap();
    assert_eq!(people.total_count, 4);
    let ids: Vec<&str> = people.rows.iter().map(|r| r.record.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "4"]);
    assert_eq!(people.rows[0].last_action_summary.timing, "Never");
    assert_eq!(people.rows[2].last_action_summary.timing, "24 months ago");
    assert_eq!(people.rows[3].next_action_summary.timing, "No date set");

    let speedrun = projector
        .project_json(payload, &ProjectionRequest::new("speedrun"), &ctx)
        .unwrap();
    assert_eq!(speedrun.total_count, 3);
    assert!(speedrun.rows.iter().all(|r| r.record.id != "2"));
}
