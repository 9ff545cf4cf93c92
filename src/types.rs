use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ProjectionError;
use crate::rank::DisplayRank;

/// A sales entity row as delivered by the pipeline APIs.
///
/// Only the fields the projector reasons about are typed. Everything else
/// (company, title, email, amount, ...) rides along in `fields` and is
/// serialized back out untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(deserialize_with = "record_id")]
    pub id: String,
    /// Rank hints stay raw JSON so corrupt payloads (strings, huge numbers)
    /// can be detected instead of failing deserialization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_rank: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_rank: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_rank: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_person_rank: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    /// Display string precomputed by the backend ("2 days ago").
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub last_action_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub last_action_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub last_contact_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub last_contact: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub last_action: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub last_action_description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub next_action: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub next_action_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub main_seller_id: Option<String>,
    /// Either a display name or a user object (`firstName`, `lastName`,
    /// `name`, `email`), stored as its display name.
    #[serde(default, deserialize_with = "lenient_person_name", skip_serializing_if = "Option::is_none")]
    pub main_seller: Option<String>,
    /// Sections this record must never be listed in. The backend stores this
    /// as a JSON-encoded array string, so both shapes are accepted.
    #[serde(default, deserialize_with = "lenient_sections", skip_serializing_if = "Vec::is_empty")]
    pub hidden_from_sections: Vec<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Record {
            id: id.into(),
            rank: None,
            global_rank: None,
            company_rank: None,
            person_rank: None,
            global_person_rank: None,
            status: None,
            stage: None,
            last_action_time: None,
            last_action_date: None,
            last_contact_date: None,
            last_contact: None,
            last_action: None,
            last_action_description: None,
            next_action: None,
            next_action_date: None,
            created_at: None,
            main_seller_id: None,
            main_seller: None,
            hidden_from_sections: Vec::new(),
            fields: Map::new(),
        }
    }

    /// Look up a column value by its camelCase key.
    ///
    /// Typed fields win over pass-through fields of the same name.
    pub fn field(&self, key: &str) -> Option<Value> {
        let text = |v: &Option<String>| v.as_ref().map(|s| Value::String(s.clone()));
        match key {
            "id" => Some(Value::String(self.id.clone())),
            "rank" => self.rank.clone(),
            "globalRank" => self.global_rank.clone(),
            "companyRank" => self.company_rank.clone(),
            "personRank" => self.person_rank.clone(),
            "globalPersonRank" => self.global_person_rank.clone(),
            "status" => text(&self.status),
            "stage" => text(&self.stage),
            "lastActionTime" => text(&self.last_action_time),
            "lastActionDate" => text(&self.last_action_date),
            "lastContactDate" => text(&self.last_contact_date),
            "lastContact" => text(&self.last_contact),
            "lastAction" => text(&self.last_action),
            "lastActionDescription" => text(&self.last_action_description),
            "nextAction" => text(&self.next_action),
            "nextActionDate" => text(&self.next_action_date),
            "createdAt" => text(&self.created_at),
            "mainSellerId" => text(&self.main_seller_id),
            "mainSeller" => text(&self.main_seller),
            _ => self.fields.get(key).cloned(),
        }
    }

    /// Text form of a field for matching. Nested objects such as
    /// `company: { name }` resolve to their `name`.
    pub fn text_field(&self, key: &str) -> Option<String> {
        match self.field(key)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Object(obj) => obj.get("name").and_then(Value::as_str).map(str::to_string),
            _ => None,
        }
    }

    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }
}

fn text_value(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn record_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let kind = json_kind(&value);
    text_value(value).ok_or_else(|| de::Error::custom(format!("id must be a string, got {}", kind)))
}

/// Numbers are stringified; nulls, booleans, arrays and objects read as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(text_value))
}

fn lenient_person_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Object(user)) => person_name(
            str_field(&user, "firstName"),
            str_field(&user, "lastName"),
            str_field(&user, "name"),
            str_field(&user, "email"),
        ),
        Some(other) => text_value(other),
        None => None,
    })
}

fn lenient_sections<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => section_names(items),
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => section_names(items),
            _ => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        },
        _ => Vec::new(),
    })
}

fn section_names(items: Vec<Value>) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        })
        .collect()
}

pub(crate) fn str_field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

/// "First Last" when both parts exist, else `name`, else `email`.
pub(crate) fn person_name(
    first: Option<&str>,
    last: Option<&str>,
    name: Option<&str>,
    email: Option<&str>,
) -> Option<String> {
    if let (Some(first), Some(last)) = (first, last) {
        let full = format!("{} {}", first, last).trim().to_string();
        if !full.is_empty() {
            return Some(full);
        }
    }
    [name, email]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse a fetched records payload, rejecting anything that is not an array
/// of objects with an `id`. Loosely typed fields never fail a record.
pub fn parse_records(payload: Value) -> Result<Vec<Record>, ProjectionError> {
    let items = match payload {
        Value::Array(items) => items,
        other => return Err(ProjectionError::RecordsNotArray(json_kind(&other))),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<Record>(item).map_err(|e| ProjectionError::InvalidRecord {
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A named pipeline table view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Section {
    Leads,
    Prospects,
    Opportunities,
    Companies,
    People,
    Speedrun,
    /// Workspace-specific views with no built-in column defaults.
    Other(String),
}

impl Section {
    /// Parse a section name. Blank names are a caller bug.
    pub fn parse(raw: &str) -> Result<Self, ProjectionError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(ProjectionError::MissingSection);
        }
        Ok(match name.to_lowercase().as_str() {
            "leads" => Section::Leads,
            "prospects" => Section::Prospects,
            "opportunities" => Section::Opportunities,
            "companies" => Section::Companies,
            "people" => Section::People,
            "speedrun" => Section::Speedrun,
            _ => Section::Other(name.to_string()),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            Section::Leads => "leads",
            Section::Prospects => "prospects",
            Section::Opportunities => "opportunities",
            Section::Companies => "companies",
            Section::People => "people",
            Section::Speedrun => "speedrun",
            Section::Other(name) => name,
        }
    }

    pub fn is_speedrun(&self) -> bool {
        matches!(self, Section::Speedrun)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Section {
    type Error = ProjectionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Section::parse(&value)
    }
}

impl From<Section> for String {
    fn from(section: Section) -> Self {
        section.as_str().to_string()
    }
}

/// Badge color for timing cells. Hosts map these to their own palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorToken {
    Neutral,
    Success,
    Info,
    Warning,
    Danger,
}

/// Text plus timing badge for a last-action or next-action cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionSummary {
    pub text: String,
    pub timing: String,
    pub color_token: ColorToken,
}

/// One rendered table row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRow {
    pub record: Record,
    pub display_rank: DisplayRank,
    pub is_completed_marker: bool,
    pub last_action_summary: ActionSummary,
    pub next_action_summary: ActionSummary,
    pub owner_label: String,
    pub ordered_visible_columns: Vec<String>,
}

/// A projected page of rows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub section: Section,
    pub rows: Vec<ViewRow>,
    /// Rows matching the filters, across all pages.
    pub total_count: usize,
    pub page: usize,
    pub page_size: usize,
    /// Rank hints that were replaced by their sequential position.
    pub corrected_ranks: usize,
}
