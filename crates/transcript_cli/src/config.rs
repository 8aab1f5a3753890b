//! RON configuration for the command line tool.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use engine_logging::engine_info;
use serde::Deserialize;
use transcript_engine::{ExportSettings, RoleSelectors, DEFAULT_EXPORT_PREFIX};

/// Everything the exporter can be tuned with. Omitted fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub selectors: RoleSelectors,
    pub export: ExportSettings,
    /// Prefix of generated transcript filenames.
    pub filename_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            selectors: RoleSelectors::default(),
            export: ExportSettings::default(),
            filename_prefix: DEFAULT_EXPORT_PREFIX.to_string(),
        }
    }
}

/// Defaults when `path` is `None`; an explicit path must exist and parse.
pub fn load_config(path: Option<&Path>) -> Result<ExportConfig> {
    let Some(path) = path else {
        return Ok(ExportConfig::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: ExportConfig = ron::from_str(&content)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    engine_info!("Loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use transcript_core::AuthorRule;

    #[test]
    fn no_path_means_defaults() {
        assert_eq!(load_config(None).unwrap(), ExportConfig::default());
    }

    #[test]
    fn partial_config_overrides_only_given_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("export.ron");
        fs::write(
            &path,
            r#"(
                selectors: (conversation_item: "li.message"),
                export: (
                    pagination: (settle_delay_ms: 250, max_iterations: 10),
                    extraction: (
                        edited_markers: ["edited", "bearbeitet"],
                        author_rules: [name_like(min_len: 2), no_colon],
                    ),
                    transcript: (source_label: "Team Chat"),
                ),
                filename_prefix: "standup",
            )"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.selectors.conversation_item, "li.message");
        assert_eq!(config.selectors.body, RoleSelectors::default().body);
        assert_eq!(config.export.pagination.settle_delay_ms, 250);
        assert_eq!(config.export.pagination.max_iterations, 10);
        assert_eq!(config.export.pagination.scroll_step, 500.0);
        assert_eq!(
            config.export.extraction.edited_markers.0,
            vec!["edited".to_string(), "bearbeitet".to_string()]
        );
        assert_eq!(
            config.export.extraction.author_rules.0,
            vec![AuthorRule::NameLike { min_len: 2 }, AuthorRule::NoColon]
        );
        assert_eq!(config.export.transcript.source_label, "Team Chat");
        assert!(config.export.transcript.include_header);
        assert_eq!(config.export.final_settle_ms, 1500);
        assert_eq!(config.filename_prefix, "standup");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = load_config(Some(&temp.path().join("absent.ron"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.ron");
        fs::write(&path, "(export: (pagination: (settle_delay_ms: \"soon\")))").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }
}
