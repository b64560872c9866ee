use anyhow::{Context, Result};
use insta_cmd::assert_cmd_snapshot;
use serde_json::Value;

use crate::{CATALOG, CliTest};

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let mut cmd = test.command();
    cmd.arg("init");
    assert_cmd_snapshot!(cmd, @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Created .glotporc.json

    ----- stderr -----
    ");

    let content = test.read_file(".glotporc.json")?;
    let parsed: Value = serde_json::from_str(&content).context("Config should be valid JSON")?;
    assert!(parsed.get("includes").is_some());
    assert!(parsed.get("output").is_some());
    let rules = parsed["rules"].as_array().context("rules should be an array")?;
    assert!(rules.iter().any(|r| r["kind"] == "tag"));
    assert!(content.contains("  "), "Config should use 2-space indentation");

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".glotporc.json", "{}")?;

    let mut cmd = test.command();
    cmd.arg("init");
    assert_cmd_snapshot!(cmd, @r"
    success: false
    exit_code: 1
    ----- stdout -----
    ✘ .glotporc.json already exists

    ----- stderr -----
    ");
    assert_eq!(test.read_file(".glotporc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;
    test.command().arg("init").output()?;

    test.write_file("src/app.ts", "tr(\"Hello\");\n")?;

    let output = test.extract_command().output()?;
    assert!(
        output.status.success(),
        "extract should work with the initialized config. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(test.read_file(CATALOG)?.contains("msgid \"Hello\""));

    Ok(())
}
