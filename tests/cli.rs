// End-to-end runs of the apd-explorer binary against an offline checkout.
mod support;

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use std::process::{Command, Output};
use support::{descriptor_yaml, write_file};
use tempfile::TempDir;

fn fixture_checkout() -> Result<TempDir> {
    let temp = TempDir::new()?;
    write_file(
        temp.path(),
        "core/Agriculture/crop-yields.yml",
        &descriptor_yaml("Crop Yields", "http://crops.example"),
    )?;
    write_file(
        temp.path(),
        "core/Agriculture/soil.yml",
        "title: Soil Survey\nkeywords: [soil, survey]\nimage: https://soil.example/logo.png\n",
    )?;
    write_file(temp.path(), "core/Biology/untitled.yml", "homepage: cells.example\n")?;
    write_file(temp.path(), "core/Biology/broken.yml", "title: [oops\n")?;
    Ok(temp)
}

fn explorer(checkout: &Path, args: &[&str]) -> Result<Output> {
    Command::new(env!("CARGO_BIN_EXE_apd-explorer"))
        .arg("--offline")
        .arg("--checkout")
        .arg(checkout)
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .context("running apd-explorer")
}

#[test]
fn topics_lists_counts_and_warns_about_broken_files() -> Result<()> {
    let checkout = fixture_checkout()?;
    let output = explorer(checkout.path(), &["topics", "--chart"])?;
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("Agriculture (2)"), "{stdout}");
    assert!(stdout.contains("Biology (1)"), "{stdout}");
    assert!(stdout.contains("Data count by topic"), "{stdout}");

    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("yml syntax issues"), "{stderr}");
    assert!(stderr.contains("broken.yml"), "{stderr}");
    Ok(())
}

#[test]
fn topics_json_is_a_count_map() -> Result<()> {
    let checkout = fixture_checkout()?;
    let output = explorer(checkout.path(), &["--json", "topics"])?;
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["Agriculture"], 2);
    assert_eq!(value["Biology"], 1);
    Ok(())
}

#[test]
fn list_falls_back_to_file_name_for_untitled_datasets() -> Result<()> {
    let checkout = fixture_checkout()?;
    let output = explorer(checkout.path(), &["list", "Biology"])?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert_eq!(stdout.trim(), "untitled.yml\tuntitled.yml");
    Ok(())
}

#[test]
fn show_without_check_prints_details() -> Result<()> {
    let checkout = fixture_checkout()?;
    let output = explorer(checkout.path(), &["show", "Agriculture", "soil.yml", "--no-check"])?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Soil Survey",
            "Image: https://soil.example/logo.png",
            "Title: Soil Survey",
            "Keywords: soil, survey",
        ]
    );
    Ok(())
}

#[test]
fn show_json_includes_raw_descriptor() -> Result<()> {
    let checkout = fixture_checkout()?;
    let output = explorer(
        checkout.path(),
        &["--json", "show", "Agriculture", "crop-yields.yml", "--no-check"],
    )?;
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["title"], "Crop Yields");
    assert_eq!(value["descriptor"]["homepage"], "http://crops.example");
    assert!(value["homepage_status"].is_null());
    Ok(())
}

#[test]
fn unknown_topic_fails_with_message() -> Result<()> {
    let checkout = fixture_checkout()?;
    let output = explorer(checkout.path(), &["list", "Astronomy"])?;
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("unknown topic 'Astronomy'"), "{stderr}");
    Ok(())
}

#[test]
fn check_url_rejects_unsupported_scheme() -> Result<()> {
    let checkout = fixture_checkout()?;
    let output = explorer(checkout.path(), &["--json", "check-url", "ftp://data.example"])?;
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["result"]["kind"], "invalid_schema");
    assert_eq!(value["level"], "info");
    Ok(())
}
