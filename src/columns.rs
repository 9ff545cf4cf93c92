//! Column definitions and ordering for pipeline sections.
//!
//! Each section has a built-in column list. A workspace may reorder it via
//! `SectionConfig::column_order`; the user's visibility toggles and the
//! workspace hidden-column rules then narrow it down for rendering.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::timing::parse_timestamp;
use crate::types::{Record, Section};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Email,
    Phone,
    Date,
    Currency,
    Number,
    Status,
    Badge,
    Link,
    Avatar,
}

/// Custom cell renderer.
pub type CellFormatter = fn(&Value) -> String;

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConfig {
    pub key: String,
    pub label: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub column_type: Option<ColumnType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default)]
    pub sortable: bool,
    #[serde(skip)]
    pub formatter: Option<CellFormatter>,
}

impl fmt::Debug for ColumnConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnConfig")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("column_type", &self.column_type)
            .field("width", &self.width)
            .field("sortable", &self.sortable)
            .field("formatter", &self.formatter.is_some())
            .finish()
    }
}

impl ColumnConfig {
    pub fn new(key: &str, label: &str, column_type: ColumnType) -> Self {
        ColumnConfig {
            key: key.to_string(),
            label: label.to_string(),
            column_type: Some(column_type),
            width: None,
            sortable: true,
            formatter: None,
        }
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn with_formatter(mut self, formatter: CellFormatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Render this column's cell for `record`. Missing values render as "-".
    pub fn format_cell(&self, record: &Record) -> String {
        let value = record.field(&self.key).unwrap_or(Value::Null);
        if let Some(formatter) = self.formatter {
            return formatter(&value);
        }
        format_value(&value, self.column_type.unwrap_or(ColumnType::Text))
    }
}

fn format_value(value: &Value, column_type: ColumnType) -> String {
    match (value, column_type) {
        (Value::Null, _) => "-".to_string(),
        (Value::String(s), _) if s.trim().is_empty() => "-".to_string(),
        (Value::Number(n), ColumnType::Currency) => n
            .as_f64()
            .map(|f| format!("${}", group_thousands(f.round() as i64)))
            .unwrap_or_else(|| n.to_string()),
        (Value::Number(n), ColumnType::Number) => match n.as_i64() {
            Some(i) => group_thousands(i),
            None => n.to_string(),
        },
        (Value::String(s), ColumnType::Date) => parse_timestamp(s)
            .map(|dt| dt.format("%b %-d, %Y").to_string())
            .unwrap_or_else(|| s.clone()),
        (Value::String(s), _) => s.clone(),
        (Value::Object(obj), _) => obj
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("-")
            .to_string(),
        (other, _) => other.to_string(),
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if n < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

/// Built-in columns for a section, in default display order.
pub fn section_columns(section: &Section) -> Vec<ColumnConfig> {
    use ColumnType::*;

    let rank = ColumnConfig::new("rank", "Rank", Number).width(64);
    let name = ColumnConfig::new("name", "Name", Text);
    let company = ColumnConfig::new("company", "Company", Link);
    let title = ColumnConfig::new("title", "Title", Text);
    let email = ColumnConfig::new("email", "Email", Email);
    let status = ColumnConfig::new("status", "Status", Status);
    let last_action = ColumnConfig::new("lastAction", "Last Action", Text);
    let next_action = ColumnConfig::new("nextAction", "Next Action", Text);

    match section {
        Section::Speedrun => vec![
            rank,
            name,
            company,
            status,
            ColumnConfig::new("mainSeller", "Owner", Avatar).unsortable(),
            last_action,
            next_action,
        ],
        Section::Leads | Section::Prospects => vec![
            rank,
            name,
            company,
            title,
            email,
            ColumnConfig::new("phone", "Phone", Phone).unsortable(),
            status,
            last_action,
            next_action,
        ],
        Section::Opportunities => vec![
            rank,
            name,
            company,
            ColumnConfig::new("stage", "Stage", Badge),
            ColumnConfig::new("amount", "Amount", Currency),
            ColumnConfig::new("closeDate", "Close Date", Date),
            last_action,
            next_action,
        ],
        Section::Companies => vec![
            rank,
            ColumnConfig::new("name", "Company", Text),
            ColumnConfig::new("industry", "Industry", Text),
            ColumnConfig::new("size", "Size", Text),
            status,
            last_action,
            next_action,
        ],
        Section::People => vec![
            rank,
            name,
            company,
            title,
            email,
            last_action,
            next_action,
        ],
        Section::Other(_) => Vec::new(),
    }
}

/// Default logical column order for a section.
pub fn default_column_order(section: &Section) -> Vec<String> {
    section_columns(section).into_iter().map(|c| c.key).collect()
}

/// Per-section workspace settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_order: Option<Vec<String>>,
}

/// Intersect the configured (or default) order with the visible columns.
///
/// The configured order's sequence is kept; the visibility list only
/// decides membership. Duplicate keys collapse to their first position.
pub fn apply_column_order(
    section_config: Option<&SectionConfig>,
    default_order: &[String],
    visible_columns: &[String],
) -> Vec<String> {
    let configured = section_config
        .and_then(|c| c.column_order.as_deref())
        .filter(|order| !order.is_empty())
        .unwrap_or(default_order);

    let visible: HashSet<&str> = visible_columns.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();

    configured
        .iter()
        .filter(|key| visible.contains(key.as_str()))
        .filter(|key| seen.insert(key.as_str()))
        .cloned()
        .collect()
}

/// Workspace-level hidden-column rule (`isColumnHidden`).
pub trait ColumnVisibility {
    fn is_column_hidden(
        &self,
        workspace_id: &str,
        section: &Section,
        column: &str,
        workspace_name: &str,
    ) -> bool;
}

/// Visibility rule that hides nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShowAllColumns;

impl ColumnVisibility for ShowAllColumns {
    fn is_column_hidden(&self, _: &str, _: &Section, _: &str, _: &str) -> bool {
        false
    }
}
