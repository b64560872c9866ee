use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{Context, Ok, Result};
use insta::Settings;
use insta_cmd::get_cargo_bin;
use tempfile::TempDir;

mod check;
mod extract;
mod init;

const BIN_NAME: &str = "glotpo";

/// Rules for free functions `tr`, `trc` and `trn` plus a `Label` decorator from `src/i18n`.
pub const CONFIG: &str = r#"{
  "includes": ["src"],
  "output": "messages/messages.pot",
  "rules": [
    { "kind": "method", "name": "tr", "owner": "globalThis",
      "signature": [{ "type": "string", "role": "singular" }] },
    { "kind": "method", "name": "trc", "owner": "globalThis",
      "signature": [{ "type": "string", "role": "context" }, { "type": "string", "role": "singular" }] },
    { "kind": "method", "name": "trn", "owner": "globalThis",
      "signature": [
        { "type": "string", "role": "singular" },
        { "type": "string", "role": "plural" },
        { "type": "number" }
      ] }
  ]
}"#;

pub const CATALOG: &str = "messages/messages.pot";

pub struct CliTest {
    _temp_dir: TempDir,
    project_dir: PathBuf,
}

impl CliTest {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().canonicalize()?;
        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
        })
    }

    /// A project with [`CONFIG`] and one source file.
    pub fn with_source(path: &str, content: &str) -> Result<Self> {
        let test = Self::new()?;
        test.write_file(".glotporc.json", CONFIG)?;
        test.write_file(path, content)?;
        Ok(test)
    }

    pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
        let file_path = self.project_dir.join(path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory:{}", parent.display()))?;
        }

        fs::write(&file_path, content)
            .with_context(|| format!("Failed to write file: {}", file_path.display()))?;

        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.project_dir
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(get_cargo_bin(BIN_NAME));
        cmd.current_dir(&self.project_dir);
        cmd.env_clear();
        cmd.env("NO_COLOR", "1");
        cmd
    }

    pub fn extract_command(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("extract");
        cmd
    }

    pub fn check_command(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("check");
        cmd
    }

    pub fn read_file(&self, path: &str) -> Result<String> {
        let file_path = self.project_dir.join(path);
        fs::read_to_string(&file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))
    }

    pub fn exists(&self, path: &str) -> bool {
        self.project_dir.join(path).exists()
    }

    /// Snapshot settings that mask the temporary project root and the creation date.
    pub fn snapshot_settings(&self) -> Settings {
        let mut settings = Settings::clone_current();
        settings.add_filter(&regex::escape(&self.project_dir.display().to_string()), "[ROOT]");
        settings.add_filter(r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}[+-]\d{4}", "[DATE]");
        settings
    }
}
