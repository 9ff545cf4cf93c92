use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::columns::{ColumnVisibility, SectionConfig};
use crate::error::ProjectionError;
use crate::types::Section;

/// Rows per page when the workspace does not say otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Hard ceiling on rows per page.
pub const MAX_PAGE_SIZE: usize = 100;

/// Workspace table configuration stored in ~/.pipeline/config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub workspace_id: String,
    #[serde(default)]
    pub workspace_name: String,
    /// Keyed by section name ("speedrun", "people", ...).
    #[serde(default)]
    pub sections: HashMap<String, SectionConfig>,
    /// Columns hidden workspace-wide, keyed by section name.
    #[serde(default)]
    pub hidden_columns: HashMap<String, Vec<String>>,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user_id: Option<String>,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        WorkspaceConfig {
            workspace_id: String::new(),
            workspace_name: String::new(),
            sections: HashMap::new(),
            hidden_columns: HashMap::new(),
            page_size: DEFAULT_PAGE_SIZE,
            current_user_id: None,
        }
    }
}

impl WorkspaceConfig {
    pub fn section_config(&self, section: &Section) -> Option<&SectionConfig> {
        self.sections.get(section.as_str())
    }

    /// Page size clamped to `1..=MAX_PAGE_SIZE`; zero means the default.
    pub fn effective_page_size(&self, requested: Option<usize>) -> usize {
        match requested.unwrap_or(self.page_size) {
            0 => DEFAULT_PAGE_SIZE,
            n => n.min(MAX_PAGE_SIZE),
        }
    }

    fn applies_to(&self, workspace_id: &str, workspace_name: &str) -> bool {
        if self.workspace_id.is_empty() && self.workspace_name.is_empty() {
            return true;
        }
        (!self.workspace_id.is_empty() && self.workspace_id == workspace_id)
            || (!self.workspace_name.is_empty()
                && self.workspace_name.eq_ignore_ascii_case(workspace_name))
    }
}

impl ColumnVisibility for WorkspaceConfig {
    fn is_column_hidden(
        &self,
        workspace_id: &str,
        section: &Section,
        column: &str,
        workspace_name: &str,
    ) -> bool {
        if !self.applies_to(workspace_id, workspace_name) {
            return false;
        }
        self.hidden_columns
            .get(section.as_str())
            .map(|cols| cols.iter().any(|c| c == column))
            .unwrap_or(false)
    }
}

/// ~/.pipeline/config.json, if a home directory exists.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".pipeline").join("config.json"))
}

/// Load a workspace config from an explicit path.
pub fn load_config(path: &Path) -> Result<WorkspaceConfig, ProjectionError> {
    let content = fs::read_to_string(path).map_err(|e| ProjectionError::ConfigRead {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    serde_json::from_str(&content).map_err(|e| ProjectionError::ConfigParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Load the config from the default location, or defaults when none exists.
pub fn load_default_config() -> Result<WorkspaceConfig, ProjectionError> {
    match default_config_path() {
        Some(path) if path.exists() => load_config(&path),
        Some(path) => {
            log::debug!("config: {} not found, using defaults", path.display());
            Ok(WorkspaceConfig::default())
        }
        None => {
            log::debug!("config: no home directory, using defaults");
            Ok(WorkspaceConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn test_load_config_full() {
        let file = write_config(
            r#"{
                "workspaceId": "ws-1",
                "workspaceName": "Northwind",
                "sections": { "speedrun": { "columnOrder": ["name", "rank"] } },
                "hiddenColumns": { "speedrun": ["nextAction"] },
                "pageSize": 25,
                "currentUserId": "u-7"
            }"#,
        );
        let config = load_config(file.path()).expect("should load");
        assert_eq!(config.workspace_id, "ws-1");
        assert_eq!(config.page_size, 25);
        assert_eq!(
            config
                .section_config(&Section::Speedrun)
                .and_then(|c| c.column_order.clone()),
            Some(vec!["name".to_string(), "rank".to_string()])
        );
        assert!(config.is_column_hidden("ws-1", &Section::Speedrun, "nextAction", "Northwind"));
        assert!(!config.is_column_hidden("ws-1", &Section::People, "nextAction", "Northwind"));
        assert!(!config.is_column_hidden("ws-2", &Section::Speedrun, "nextAction", "Other"));
        assert!(config.is_column_hidden("ws-2", &Section::Speedrun, "nextAction", "northwind"));
    }

    #[test]
    fn test_load_config_defaults() {
        let file = write_config("{}");
        let config = load_config(file.path()).expect("should load");
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert!(config.sections.is_empty());
        assert!(!config.is_column_hidden("any", &Section::Leads, "email", "any"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_config(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ProjectionError::ConfigRead { .. }));
    }

    #[test]
    fn test_load_config_bad_json() {
        let file = write_config("{ not json");
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ProjectionError::ConfigParse { .. }));
        assert!(!err.is_caller_bug());
    }

    #[test]
    fn test_effective_page_size() {
        let config = WorkspaceConfig::default();
        assert_eq!(config.effective_page_size(None), 50);
        assert_eq!(config.effective_page_size(Some(0)), 50);
        assert_eq!(config.effective_page_size(Some(10)), 10);
        assert_eq!(config.effective_page_size(Some(500)), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_unscoped_config_applies_everywhere() {
        let mut config = WorkspaceConfig::default();
        config
            .hidden_columns
            .insert("leads".to_string(), vec!["email".to_string()]);
        assert!(config.is_column_hidden("ws-9", &Section::Leads, "email", "Anything"));
    }
}
