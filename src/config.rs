use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result};
use glob::Pattern;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{
    reconcile::{HeaderTemplate, ReconcileOptions, header::CREATION_DATE_FIELD},
    rules::{ExtractionRule, MethodRule, ParamRole, ParamSpec, TagRule},
};

pub const CONFIG_FILE_NAME: &str = ".glotporc.json";

pub const TEST_FILE_PATTERNS: &[&str] = &[
    "**/*.test.tsx",
    "**/*.test.ts",
    "**/*.test.jsx",
    "**/*.test.js",
    "**/*.spec.tsx",
    "**/*.spec.ts",
    "**/*.spec.jsx",
    "**/*.spec.js",
    "**/__tests__/**",
];

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default = "default_ignores")]
    pub ignores: Vec<String>,
    #[serde(default = "default_ignore_test_files")]
    pub ignore_test_files: bool,
    /// Catalog path, relative to the source root.
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default)]
    pub rules: Vec<ExtractionRule>,
    #[serde(default)]
    pub remove_unused: bool,
    #[serde(default)]
    pub create_empty_template: bool,
    /// Only `//` comments starting with this tag become extracted comments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_tag: Option<String>,
    #[serde(default)]
    pub header: IndexMap<String, String>,
    #[serde(default)]
    pub header_comments: Vec<String>,
    #[serde(default = "default_variable_header_fields")]
    pub variable_header_fields: Vec<String>,
}

fn default_ignores() -> Vec<String> {
    vec!["**/node_modules/**".to_string(), "**/dist/**".to_string()]
}

fn default_ignore_test_files() -> bool {
    true
}

fn default_output() -> String {
    "./messages/messages.pot".to_string()
}

fn default_variable_header_fields() -> Vec<String> {
    vec![CREATION_DATE_FIELD.to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            includes: Vec::new(),
            ignores: default_ignores(),
            ignore_test_files: default_ignore_test_files(),
            output: default_output(),
            rules: Vec::new(),
            remove_unused: false,
            create_empty_template: false,
            comment_tag: None,
            header: IndexMap::new(),
            header_comments: Vec::new(),
            variable_header_fields: default_variable_header_fields(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error if any glob patterns in `ignores` or `includes` are invalid.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        // Patterns without wildcards are literal directory paths
        for pattern in &self.includes {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'includes': \"{}\"", pattern)
                })?;
            }
        }

        Ok(())
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            remove_unused: self.remove_unused,
            create_empty_template: self.create_empty_template,
            header: HeaderTemplate {
                comments: self.header_comments.clone(),
                fields: self.header.clone(),
                variable_fields: self.variable_header_fields.clone(),
            },
        }
    }

    /// Configuration written by `glotpo init`: defaults plus a typical rule set.
    pub fn example() -> Self {
        let string = |role| ParamSpec::new("string", role);
        Self {
            includes: vec!["src".to_string()],
            rules: vec![
                ExtractionRule::Method(MethodRule {
                    name: "tr".to_string(),
                    owner: "globalThis".to_string(),
                    description: None,
                    is_static: false,
                    inherited: false,
                    signature: vec![string(ParamRole::Singular)],
                }),
                ExtractionRule::Method(MethodRule {
                    name: "trc".to_string(),
                    owner: "globalThis".to_string(),
                    description: None,
                    is_static: false,
                    inherited: false,
                    signature: vec![string(ParamRole::Context), string(ParamRole::Singular)],
                }),
                ExtractionRule::Method(MethodRule {
                    name: "trn".to_string(),
                    owner: "globalThis".to_string(),
                    description: None,
                    is_static: false,
                    inherited: false,
                    signature: vec![
                        string(ParamRole::Singular),
                        string(ParamRole::Plural),
                        ParamSpec::new("number", ParamRole::None),
                    ],
                }),
                ExtractionRule::Tag(TagRule {
                    name: "Label".to_string(),
                    owner: "src/i18n#Label".to_string(),
                    description: None,
                    fields: vec!["text".to_string()],
                    context_field: Some("context".to_string()),
                }),
            ],
            ..Default::default()
        }
    }
}

pub fn default_config_json() -> Result<String> {
    serde_json::to_string_pretty(&Config::example()).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            tracing::debug!(path = %path.display(), rules = config.rules.len(), "config loaded");
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use crate::config::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.includes.is_empty());
        assert!(config.rules.is_empty());
        assert_eq!(config.output, "./messages/messages.pot");
        assert_eq!(config.variable_header_fields, vec!["POT-Creation-Date"]);
        assert!(config.ignore_test_files);
    }

    #[test]
    fn test_parse_config_with_rules() {
        let json = r#"{
            "output": "locale/app.pot",
            "removeUnused": true,
            "commentTag": "TRANSLATORS:",
            "header": { "Project-Id-Version": "demo 1.0" },
            "rules": [
                {
                    "kind": "method",
                    "name": "tr",
                    "owner": "src/i18n#Translator",
                    "inherited": true,
                    "signature": [{ "type": "string", "role": "singular" }]
                },
                {
                    "kind": "tag",
                    "name": "Label",
                    "owner": "src/i18n#Label",
                    "fields": ["text"],
                    "contextField": "ctx"
                }
            ]
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.output, "locale/app.pot");
        assert!(config.remove_unused);
        assert_eq!(config.comment_tag.as_deref(), Some("TRANSLATORS:"));
        assert_eq!(config.rules.len(), 2);
        match &config.rules[0] {
            ExtractionRule::Method(rule) => {
                assert!(rule.inherited);
                assert_eq!(rule.signature[0].role, ParamRole::Singular);
            }
            other => panic!("unexpected rule {:?}", other),
        }

        let options = config.reconcile_options();
        assert!(options.remove_unused);
        assert_eq!(options.header.fields["Project-Id-Version"], "demo 1.0");
    }

    #[test]
    fn test_find_config_file() {
        let dir = tempdir().unwrap();
        let sub_dir = dir.path().join("src").join("components");
        fs::create_dir_all(&sub_dir).unwrap();

        let config_path = dir.path().join(CONFIG_FILE_NAME);
        File::create(&config_path).unwrap();

        assert_eq!(find_config_file(&sub_dir), Some(config_path));
    }

    #[test]
    fn test_find_config_stops_at_git_root() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        assert!(find_config_file(dir.path()).is_none());
        let result = load_config(dir.path()).unwrap();
        assert!(!result.from_file);
    }

    #[test]
    fn test_load_config_with_invalid_pattern_fails() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "ignores": ["[invalid"] }"#,
        )
        .unwrap();

        let result = load_config(dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_literal_bracket_include() {
        let config = Config {
            includes: vec!["app/[locale]".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        let invalid = Config {
            includes: vec!["src/**/[invalid".to_string()],
            ..Default::default()
        };
        assert!(invalid.validate().unwrap_err().to_string().contains("includes"));
    }

    #[test]
    fn test_example_config_round_trips() {
        let json = default_config_json().unwrap();
        let config: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.rules, Config::example().rules);
        for rule in &config.rules {
            assert!(rule.validate().is_ok());
        }
    }
}
