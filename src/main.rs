//! `pipeline-project`: project a records JSON file into table rows.
//!
//! Usage: `pipeline-project --records leads.json --section speedrun --sort name`
//! Logging is controlled with `RUST_LOG` (e.g. `RUST_LOG=debug`).

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::{NaiveDate, Utc};
use clap::Parser;

use pipeline_projector::completion::DailyCompletions;
use pipeline_projector::config::{load_config, load_default_config};
use pipeline_projector::sort::{SortDirection, SortState};
use pipeline_projector::{ProjectionContext, ProjectionErrorPayload, ProjectionRequest, RankedListProjector};

#[derive(Debug, Parser)]
#[command(name = "pipeline-project", version, about = "Project pipeline records into ranked table rows")]
struct Args {
    /// JSON file holding the records array
    #[arg(long)]
    records: PathBuf,

    /// Section: leads, prospects, opportunities, companies, people, speedrun
    #[arg(long)]
    section: String,

    /// Workspace config (defaults to ~/.pipeline/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "")]
    search: String,

    /// Column key to sort by
    #[arg(long)]
    sort: Option<String>,

    /// asc or desc (defaults to asc when --sort is given)
    #[arg(long)]
    direction: Option<String>,

    #[arg(long, default_value_t = 1)]
    page: usize,

    #[arg(long)]
    page_size: Option<usize>,

    /// Comma-separated visible columns
    #[arg(long, value_delimiter = ',')]
    columns: Option<Vec<String>>,

    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Comma-separated record ids completed today
    #[arg(long, value_delimiter = ',')]
    completed: Vec<String>,

    /// Saved per-day completions file
    #[arg(long)]
    completions: Option<PathBuf>,

    /// Current user id, shown as "Me" in the owner column
    #[arg(long)]
    user: Option<String>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Args::parse()) {
        if let Some(err) = e.downcast_ref::<pipeline_projector::ProjectionError>() {
            let payload = ProjectionErrorPayload::from(err);
            log::error!("{} ({})", payload.message, payload.recovery_suggestion);
        }
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => load_default_config()?,
    };

    let raw = fs::read_to_string(&args.records)
        .with_context(|| format!("Failed to read records from {}", args.records.display()))?;
    let payload: serde_json::Value =
        serde_json::from_str(&raw).context("Records file is not valid JSON")?;

    let now = match args.today {
        Some(day) => day
            .and_hms_opt(12, 0, 0)
            .map(|naive| naive.and_utc())
            .context("Invalid --today date")?,
        None => Utc::now(),
    };

    let mut completed_ids: HashSet<String> = args.completed.iter().cloned().collect();
    if let Some(path) = &args.completions {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read completions from {}", path.display()))?;
        let daily: DailyCompletions =
            serde_json::from_str(&content).context("Completions file is not valid JSON")?;
        completed_ids.extend(daily.ids_for(now.date_naive()));
    }

    let sort = match (&args.sort, &args.direction) {
        (None, _) => SortState::default(),
        (Some(field), None) => SortState::by(field.clone(), SortDirection::Asc),
        (Some(field), Some(raw)) => match SortDirection::parse(raw) {
            Some(direction) => SortState::by(field.clone(), direction),
            None => bail!("Unknown sort direction '{}', expected asc or desc", raw),
        },
    };

    let mut request = ProjectionRequest::new(args.section.clone());
    request.visible_columns = args.columns.clone();
    request.sort = sort;
    request.search_query = args.search.clone();
    request.page = args.page;
    request.page_size = args.page_size;

    let current_user = args.user.clone().or_else(|| config.current_user_id.clone());
    let mut ctx = ProjectionContext::new(now, &completed_ids);
    ctx.current_user_id = current_user.as_deref();

    let projector = RankedListProjector::new(config);
    let projection = projector.project_json(payload, &request, &ctx)?;

    println!("{}", serde_json::to_string_pretty(&projection)?);
    Ok(())
}
