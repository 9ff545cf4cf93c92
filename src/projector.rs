//! Ranked list projection: records in, table rows out.
//!
//! Pipeline: section visibility → search → sort → rank/completion/summary
//! annotation → pagination. Ranks are assigned over the full filtered and
//! sorted list so page 2 continues where page 1 stopped.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::columns::{apply_column_order, default_column_order, ColumnVisibility, SectionConfig};
use crate::completion::compute_completion_flag;
use crate::config::WorkspaceConfig;
use crate::error::ProjectionError;
use crate::rank::compute_display_rank;
use crate::search::{filter_by_search, filter_hidden_from_section};
use crate::sort::{sort_rows, SortState};
use crate::summary::{compute_last_action_summary, compute_next_action_summary, owner_label};
use crate::timing::{ActionTiming, RealtimeTiming};
use crate::types::{parse_records, Projection, Record, Section, ViewRow};

/// What the table is asking for.
#[derive(Debug, Clone)]
pub struct ProjectionRequest {
    pub section: String,
    /// Overrides the workspace's configured order for this section.
    pub column_order: Option<Vec<String>>,
    /// Columns the user has toggled on. `None` shows every known column.
    pub visible_columns: Option<Vec<String>>,
    pub sort: SortState,
    pub search_query: String,
    /// 1-based.
    pub page: usize,
    pub page_size: Option<usize>,
}

impl ProjectionRequest {
    pub fn new(section: impl Into<String>) -> Self {
        ProjectionRequest {
            section: section.into(),
            column_order: None,
            visible_columns: None,
            sort: SortState::default(),
            search_query: String::new(),
            page: 1,
            page_size: None,
        }
    }
}

/// Caller-owned, read-only inputs for a single projection.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionContext<'a> {
    pub now: DateTime<Utc>,
    /// Ids completed today outside of `lastActionDate` (Speedrun only).
    pub completed_ids: &'a HashSet<String>,
    pub current_user_id: Option<&'a str>,
}

impl<'a> ProjectionContext<'a> {
    pub fn new(now: DateTime<Utc>, completed_ids: &'a HashSet<String>) -> Self {
        ProjectionContext {
            now,
            completed_ids,
            current_user_id: None,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }
}

/// Projects fetched records into table rows for one workspace.
///
/// Holds no per-call state; the same projector can serve every render.
pub struct RankedListProjector<T: ActionTiming = RealtimeTiming> {
    config: WorkspaceConfig,
    timing: T,
}

impl RankedListProjector<RealtimeTiming> {
    pub fn new(config: WorkspaceConfig) -> Self {
        RankedListProjector {
            config,
            timing: RealtimeTiming,
        }
    }
}

impl<T: ActionTiming> RankedListProjector<T> {
    pub fn with_timing(config: WorkspaceConfig, timing: T) -> Self {
        RankedListProjector { config, timing }
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// Project a raw JSON payload. Non-array payloads are a caller bug.
    pub fn project_json(
        &self,
        payload: Value,
        request: &ProjectionRequest,
        ctx: &ProjectionContext<'_>,
    ) -> Result<Projection, ProjectionError> {
        let records = parse_records(payload)?;
        self.project(&records, request, ctx)
    }

    pub fn project(
        &self,
        records: &[Record],
        request: &ProjectionRequest,
        ctx: &ProjectionContext<'_>,
    ) -> Result<Projection, ProjectionError> {
        let section = Section::parse(&request.section)?;
        if request.page == 0 {
            return Err(ProjectionError::InvalidPage(request.page));
        }
        let page_size = self.config.effective_page_size(request.page_size);

        let columns = self.ordered_visible_columns(&section, request);

        let listed = filter_hidden_from_section(records, &section);
        let matched = filter_by_search(&listed, &request.search_query);
        let sorted = sort_rows(&matched, &request.sort);
        let total_count = sorted.len();

        let today = ctx.today();
        let mut corrected_ranks = 0;
        let start = (request.page - 1).saturating_mul(page_size);

        // Every row is ranked so the correction count covers the whole list,
        // but only the requested page is materialized.
        let mut rows = Vec::with_capacity(page_size.min(total_count));
        for (index, record) in sorted.into_iter().enumerate() {
            let completed = section.is_speedrun()
                && compute_completion_flag(&record, today, ctx.completed_ids);
            let ranked = compute_display_rank(&record, index, &section, completed);
            if ranked.corrected {
                corrected_ranks += 1;
            }

            if index < start || index >= start + page_size {
                continue;
            }

            rows.push(ViewRow {
                last_action_summary: compute_last_action_summary(&record, &self.timing, ctx.now),
                next_action_summary: compute_next_action_summary(&record, ctx.now),
                owner_label: owner_label(&record, ctx.current_user_id),
                is_completed_marker: ranked.display.is_completed(),
                display_rank: ranked.display,
                ordered_visible_columns: columns.clone(),
                record,
            });
        }

        if corrected_ranks > 0 {
            log::warn!(
                "projector: corrected {} corrupt rank(s) in section {}",
                corrected_ranks,
                section
            );
        }
        log::debug!(
            "projector: section={} total={} page={} rows={}",
            section,
            total_count,
            request.page,
            rows.len()
        );

        Ok(Projection {
            section,
            rows,
            total_count,
            page: request.page,
            page_size,
            corrected_ranks,
        })
    }

    /// Configured order ∩ visible columns, minus workspace-hidden columns.
    pub fn ordered_visible_columns(
        &self,
        section: &Section,
        request: &ProjectionRequest,
    ) -> Vec<String> {
        let default_order = default_column_order(section);
        let request_config;
        let section_config = match &request.column_order {
            Some(order) => {
                request_config = SectionConfig {
                    column_order: Some(order.clone()),
                };
                Some(&request_config)
            }
            None => self.config.section_config(section),
        };

        let visible = match &request.visible_columns {
            Some(visible) => visible.clone(),
            None => {
                let mut all = default_order.clone();
                if let Some(order) = section_config.and_then(|c| c.column_order.as_ref()) {
                    all.extend(order.iter().cloned());
                }
                all
            }
        };

        apply_column_order(section_config, &default_order, &visible)
            .into_iter()
            .filter(|column| {
                !self.config.is_column_hidden(
                    &self.config.workspace_id,
                    section,
                    column,
                    &self.config.workspace_name,
                )
            })
            .collect()
    }
}
