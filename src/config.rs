//! Per-tool static configuration.
//!
//! The config names the tools to generate and carries string overrides that
//! are merged into each tool's descriptor before rendering.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Default location of the clients config, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "clients.json";

/// Section name treated as shared defaults rather than a tool.
const DEFAULTS_SECTION: &str = "DEFAULT";

/// Selector value meaning every configured tool.
pub const ALL_TOOLS: &str = "all";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientsConfig {
    pub schema_version: u32,
    #[serde(default)]
    pub tools: BTreeMap<String, BTreeMap<String, String>>,
}

pub fn load_config(path: &Path) -> Result<ClientsConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: ClientsConfig =
        serde_json::from_slice(&bytes).context("parse clients config JSON")?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &ClientsConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported clients config schema_version {}",
            config.schema_version
        ));
    }
    if config.tools.keys().any(|id| id.trim().is_empty()) {
        return Err(anyhow!("tool ids must be non-empty"));
    }
    Ok(())
}

impl ClientsConfig {
    /// Configured tools matching `selectors`, ordered by tool id, each with
    /// its effective overrides.
    ///
    /// `all` selects every tool and selectors match case-insensitively. The
    /// `DEFAULT` section is never a tool; its keys are inherited by every
    /// tool that does not set them itself. Selectors naming unknown tools
    /// are logged and skipped.
    pub fn selected_tools(&self, selectors: &[String]) -> Vec<(&str, BTreeMap<String, String>)> {
        let selectors: Vec<String> = selectors
            .iter()
            .map(|selector| selector.trim().to_lowercase())
            .collect();
        let select_all = selectors.iter().any(|selector| selector == ALL_TOOLS);
        for selector in &selectors {
            if selector != ALL_TOOLS && !self.tools.contains_key(selector.as_str()) {
                tracing::warn!(tool = %selector, "tool not found in clients config");
            }
        }
        self.tools
            .iter()
            .filter(|(id, _)| id.as_str() != DEFAULTS_SECTION)
            .filter(|(id, _)| select_all || selectors.iter().any(|selector| selector == *id))
            .map(|(id, overrides)| (id.as_str(), self.effective_overrides(overrides)))
            .collect()
    }

    fn effective_overrides(
        &self,
        overrides: &BTreeMap<String, String>,
    ) -> BTreeMap<String, String> {
        let mut merged = self.tools.get(DEFAULTS_SECTION).cloned().unwrap_or_default();
        merged.extend(overrides.iter().map(|(key, value)| (key.clone(), value.clone())));
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
        "schema_version": 1,
        "tools": {
            "DEFAULT": { "outputs": "  result: stdout", "docker_image": "shared" },
            "ncbiblast": { "outputs": "  out:\n    type: stdout" },
            "emboss_needle": {},
            "clustalo": { "label": "Clustal Omega" }
        }
    }"#;

    fn write_config(contents: &str) -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join(DEFAULT_CONFIG_PATH);
        std::fs::write(&path, contents).expect("write config");
        (dir, path)
    }

    fn ids(config: &ClientsConfig, selectors: &[&str]) -> Vec<String> {
        let selectors: Vec<String> = selectors.iter().map(|s| s.to_string()).collect();
        config
            .selected_tools(&selectors)
            .into_iter()
            .map(|(id, _)| id.to_string())
            .collect()
    }

    #[test]
    fn loads_and_selects_tools() {
        let (_dir, path) = write_config(SAMPLE);
        let config = load_config(&path).expect("load config");
        assert_eq!(
            ids(&config, &["all"]),
            vec!["clustalo", "emboss_needle", "ncbiblast"]
        );
        assert_eq!(ids(&config, &["ncbiblast", "missing"]), vec!["ncbiblast"]);
        assert!(ids(&config, &["DEFAULT"]).is_empty());
        let selected = config.selected_tools(&["clustalo".to_string()]);
        assert_eq!(
            selected[0].1.get("label").map(String::as_str),
            Some("Clustal Omega")
        );
    }

    #[test]
    fn selectors_match_case_insensitively() {
        let (_dir, path) = write_config(SAMPLE);
        let config = load_config(&path).expect("load config");
        assert_eq!(ids(&config, &["NCBIBLAST"]), vec!["ncbiblast"]);
        assert_eq!(ids(&config, &[" Emboss_Needle "]), vec!["emboss_needle"]);
        assert_eq!(ids(&config, &["ALL"]).len(), 3);
    }

    #[test]
    fn default_section_is_inherited_with_tool_keys_winning() {
        let (_dir, path) = write_config(SAMPLE);
        let config = load_config(&path).expect("load config");
        let selected = config.selected_tools(&["all".to_string()]);
        let overrides = |id: &str| {
            selected
                .iter()
                .find(|(tool, _)| *tool == id)
                .map(|(_, overrides)| overrides.clone())
                .expect("tool selected")
        };
        let needle = overrides("emboss_needle");
        assert_eq!(needle.get("outputs").map(String::as_str), Some("  result: stdout"));
        assert_eq!(needle.get("docker_image").map(String::as_str), Some("shared"));
        let blast = overrides("ncbiblast");
        assert_eq!(
            blast.get("outputs").map(String::as_str),
            Some("  out:\n    type: stdout")
        );
        assert_eq!(blast.get("docker_image").map(String::as_str), Some("shared"));
    }

    #[test]
    fn tools_without_default_section_keep_their_own_keys() {
        let (_dir, path) = write_config(
            r#"{ "schema_version": 1, "tools": { "lalign": { "label": "LALIGN" } } }"#,
        );
        let config = load_config(&path).expect("load config");
        let selected = config.selected_tools(&["all".to_string()]);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].1.len(), 1);
    }

    #[test]
    fn rejects_unknown_schema_version() {
        let (_dir, path) = write_config(r#"{ "schema_version": 2, "tools": {} }"#);
        let err = load_config(&path).expect_err("schema version must be checked");
        assert!(err.to_string().contains("schema_version"));
    }

    #[test]
    fn rejects_blank_tool_ids() {
        let (_dir, path) = write_config(r#"{ "schema_version": 1, "tools": { " ": {} } }"#);
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new().expect("create temp dir");
        assert!(load_config(&dir.path().join("nope.json")).is_err());
    }
}
