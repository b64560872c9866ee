use anyhow::Result;
use insta::assert_snapshot;
use insta_cmd::assert_cmd_snapshot;

use crate::{CATALOG, CliTest};

const APP: &str = r#"const GREETING = "Hello";

// Shown on the toolbar
tr("Open");
tr(GREETING + " world");
trc("menu", "File");
trn("file", "files", 3);
"#;

#[test]
fn test_extract_writes_catalog() -> Result<()> {
    let test = CliTest::with_source("src/app.ts", APP)?;
    let _settings = test.snapshot_settings().bind_to_scope();

    assert_cmd_snapshot!(test.extract_command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Wrote 4 messages from 1 source file to [ROOT]/messages/messages.pot (kept 0, renamed 0, added 4, obsoleted 0, removed 0)

    ----- stderr -----
    ");

    assert_snapshot!(test.read_file(CATALOG)?, @r#"
    msgid ""
    msgstr ""
    "Project-Id-Version: PACKAGE VERSION\n"
    "MIME-Version: 1.0\n"
    "Content-Type: text/plain; charset=UTF-8\n"
    "Content-Transfer-Encoding: 8bit\n"
    "POT-Creation-Date: [DATE]\n"

    #. Shown on the toolbar
    #: src/app.ts:4
    msgid "Open"
    msgstr ""

    #: src/app.ts:5
    msgid "Hello world"
    msgstr ""

    #: src/app.ts:6
    msgctxt "menu"
    msgid "File"
    msgstr ""

    #: src/app.ts:7
    msgid "file"
    msgid_plural "files"
    msgstr[0] ""
    msgstr[1] ""
    "#);

    Ok(())
}

#[test]
fn test_extract_twice_leaves_catalog_untouched() -> Result<()> {
    let test = CliTest::with_source("src/app.ts", APP)?;

    let _settings = test.snapshot_settings().bind_to_scope();
    test.extract_command().output()?;
    let first = test.read_file(CATALOG)?;

    assert_cmd_snapshot!(test.extract_command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ [ROOT]/messages/messages.pot is up to date (4 messages from 1 source file)

    ----- stderr -----
    ");
    assert_eq!(test.read_file(CATALOG)?, first);

    Ok(())
}

#[test]
fn test_extract_records_rename_lineage() -> Result<()> {
    let test = CliTest::with_source("src/app.ts", "tr(\"Open\");\n")?;
    test.extract_command().output()?;

    let translated = test
        .read_file(CATALOG)?
        .replace("msgid \"Open\"\nmsgstr \"\"", "msgid \"Open\"\nmsgstr \"Ouvrir\"");
    test.write_file(CATALOG, &translated)?;

    test.write_file("src/app.ts", "tr(\"Open file\");\n")?;
    let _settings = test.snapshot_settings().bind_to_scope();
    assert_cmd_snapshot!(test.extract_command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Wrote 1 message from 1 source file to [ROOT]/messages/messages.pot (kept 0, renamed 1, added 0, obsoleted 1, removed 0)

    ----- stderr -----
    ");

    let catalog = test.read_file(CATALOG)?;
    assert!(catalog.contains("#| msgid \"Open\"\nmsgid \"Open file\"\nmsgstr \"\""));
    assert!(catalog.contains("#~ msgid \"Open\"\n#~ msgstr \"Ouvrir\""));

    Ok(())
}

#[test]
fn test_extract_marks_vanished_messages_obsolete() -> Result<()> {
    let test = CliTest::with_source("src/app.ts", "tr(\"Open\");\n")?;
    test.extract_command().output()?;

    test.write_file("src/app.ts", "\ntrc(\"menu\", \"Quit\");\n")?;
    test.extract_command().output()?;

    let catalog = test.read_file(CATALOG)?;
    assert!(catalog.contains("#~ msgid \"Open\""));
    assert!(catalog.contains("msgid \"Quit\""));

    test.command()
        .args(["extract", "--remove-unused"])
        .output()?;
    let catalog = test.read_file(CATALOG)?;
    assert!(!catalog.contains("\"Open\""));

    Ok(())
}

#[test]
fn test_extract_reports_unresolvable_argument() -> Result<()> {
    let test = CliTest::with_source(
        "src/app.ts",
        "export function greet(userName: string) {\n    tr(userName);\n}\ntr(\"Open\");\n",
    )?;

    let output = test.extract_command().output()?;
    assert_eq!(output.status.code(), Some(0), "warnings do not fail extract");

    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("evaluation-failed"));
    assert!(stdout.contains("userName"));
    assert!(stdout.contains("--> src/app.ts:2:"));

    let catalog = test.read_file(CATALOG)?;
    assert!(catalog.contains("msgid \"Open\""));

    Ok(())
}

#[test]
fn test_extract_parse_error_fails() -> Result<()> {
    let test = CliTest::with_source("src/app.ts", "tr(\"Open\");\n")?;
    test.write_file("src/broken.ts", "tr(\"Oops\"\nconst = ;\n")?;

    let output = test.extract_command().output()?;
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("parse-error"));
    assert!(stdout.contains("src/broken.ts"));

    let catalog = test.read_file(CATALOG)?;
    assert!(catalog.contains("msgid \"Open\""));
    assert!(!catalog.contains("Oops"));

    Ok(())
}

#[test]
fn test_extract_without_messages_writes_nothing() -> Result<()> {
    let test = CliTest::with_source("src/app.ts", "export const x = 1;\n")?;
    let _settings = test.snapshot_settings().bind_to_scope();

    assert_cmd_snapshot!(test.extract_command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ No messages found in 1 source file, [ROOT]/messages/messages.pot not written

    ----- stderr -----
    ");
    assert!(!test.exists(CATALOG));

    let output = test
        .command()
        .args(["extract", "--create-empty-template"])
        .output()?;
    assert_eq!(output.status.code(), Some(0));
    assert!(test.read_file(CATALOG)?.contains("msgid \"\""));

    Ok(())
}

#[test]
fn test_extract_output_override() -> Result<()> {
    let test = CliTest::with_source("src/app.ts", "tr(\"Open\");\n")?;

    test.command()
        .args(["extract", "-o", "locale/app.pot"])
        .output()?;

    assert!(test.read_file("locale/app.pot")?.contains("msgid \"Open\""));
    assert!(!test.exists(CATALOG));

    Ok(())
}

#[test]
fn test_extract_invalid_config_is_fatal() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".glotporc.json", "{ \"rules\": 3 }")?;

    let output = test.extract_command().output()?;
    assert_eq!(output.status.code(), Some(2));

    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("Error:"));

    Ok(())
}

#[test]
fn test_extract_without_rules_is_fatal() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("src/app.ts", "tr(\"Open\");\n")?;

    let output = test.extract_command().output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(!test.exists(CATALOG));

    Ok(())
}
