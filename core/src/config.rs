use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the complaint worksheet comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Service-account key granting read access. `None` skips the check.
    pub credentials_path: Option<PathBuf>,
    /// Spreadsheet name; resolved to `<workbook_dir>/<name>.<ext>`.
    pub spreadsheet_name: String,
    pub worksheet_index: usize,
    pub workbook_dir: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            credentials_path: Some(PathBuf::from("creds.json")),
            spreadsheet_name: "consumer_complaint_formated".into(),
            worksheet_index: 0,
            workbook_dir: PathBuf::from("./data"),
        }
    }
}

/// Labels offered by the state selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Sentinel meaning "no state predicate".
    pub all_states_label: String,
    /// Appended after the distinct states, even when already present.
    pub extra_state_options: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            all_states_label: "All States".into(),
            extra_state_options: vec!["Colorado".into()],
        }
    }
}

/// Value that sizes each treemap tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreemapWeight {
    #[default]
    ComplaintIdSum,
    RowCount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub title: String,
    pub footer: Option<String>,
    pub source: SourceConfig,
    pub selectors: SelectorConfig,
    pub treemap_weight: TreemapWeight,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            title: "Consumer Financial Complaints Dashboard".into(),
            footer: Some("Designed by Raza".into()),
            source: SourceConfig::default(),
            selectors: SelectorConfig::default(),
            treemap_weight: TreemapWeight::default(),
        }
    }
}

impl DashConfig {
    /// Load from a JSON config file. Missing keys fall back to defaults.
    /// In tests, use DashConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: DashConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        log::info!(
            "config loaded from {path}: spreadsheet={} worksheet={}",
            config.source.spreadsheet_name,
            config.source.worksheet_index
        );
        Ok(config)
    }

    /// Defaults with the credentials check disabled.
    pub fn default_test() -> Self {
        Self {
            source: SourceConfig {
                credentials_path: None,
                ..SourceConfig::default()
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let json = r#"{ "source": { "spreadsheet_name": "complaints_2024" },
                        "treemap_weight": "row_count" }"#;
        let config: DashConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.source.spreadsheet_name, "complaints_2024");
        assert_eq!(config.source.worksheet_index, 0);
        assert_eq!(config.selectors.all_states_label, "All States");
        assert_eq!(config.selectors.extra_state_options, vec!["Colorado"]);
        assert_eq!(config.treemap_weight, TreemapWeight::RowCount);
    }

    #[test]
    fn default_test_skips_credentials() {
        assert!(DashConfig::default_test().source.credentials_path.is_none());
        assert!(DashConfig::default().source.credentials_path.is_some());
    }
}
