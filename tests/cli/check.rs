use anyhow::Result;
use insta_cmd::assert_cmd_snapshot;

use crate::{CATALOG, CliTest};

#[test]
fn test_check_up_to_date() -> Result<()> {
    let test = CliTest::with_source("src/app.ts", "tr(\"Open\");\n")?;
    let _settings = test.snapshot_settings().bind_to_scope();
    test.extract_command().output()?;

    assert_cmd_snapshot!(test.check_command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ [ROOT]/messages/messages.pot is up to date (1 message from 1 source file)

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn test_check_outdated_catalog_fails_without_writing() -> Result<()> {
    let test = CliTest::with_source("src/app.ts", "tr(\"Open\");\n")?;
    test.extract_command().output()?;
    let committed = test.read_file(CATALOG)?;

    test.write_file("src/app.ts", "tr(\"Open\");\ntr(\"Save\");\n")?;
    let _settings = test.snapshot_settings().bind_to_scope();
    assert_cmd_snapshot!(test.check_command(), @r"
    success: false
    exit_code: 1
    ----- stdout -----
    ✘ [ROOT]/messages/messages.pot is out of date (kept 1, renamed 0, added 1, obsoleted 0, removed 0)
      Run glotpo extract to update it.

    ----- stderr -----
    ");
    assert_eq!(test.read_file(CATALOG)?, committed);

    Ok(())
}

#[test]
fn test_check_missing_catalog_fails() -> Result<()> {
    let test = CliTest::with_source("src/app.ts", "tr(\"Open\");\n")?;
    let _settings = test.snapshot_settings().bind_to_scope();

    assert_cmd_snapshot!(test.check_command(), @r"
    success: false
    exit_code: 1
    ----- stdout -----
    ✘ [ROOT]/messages/messages.pot is out of date (kept 0, renamed 0, added 1, obsoleted 0, removed 0)
      Run glotpo extract to update it.

    ----- stderr -----
    ");
    assert!(!test.exists(CATALOG));

    Ok(())
}

#[test]
fn test_check_source_root_flag() -> Result<()> {
    let test = CliTest::with_source("web/src/app.ts", "tr(\"Open\");\n")?;
    test.write_file("web/.glotporc.json", crate::CONFIG)?;

    let output = test
        .command()
        .args(["extract", "--source-root", "web"])
        .output()?;
    assert_eq!(output.status.code(), Some(0));
    assert!(test.read_file("web/messages/messages.pot")?.contains("msgid \"Open\""));

    let output = test
        .command()
        .args(["check", "--source-root", "web"])
        .output()?;
    assert_eq!(output.status.code(), Some(0));

    Ok(())
}

#[test]
fn test_help() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("--help").output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("extract"));
    assert!(stdout.contains("check"));
    assert!(stdout.contains("init"));

    Ok(())
}
