//! Integration tests for csv2tex CLI

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::{tempdir, TempDir};

fn run_csv2tex(args: &[&str], dir: &Path) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_csv2tex"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();

    (stdout, stderr, success)
}

/// A directory with a results CSV and a matching configuration
fn fixture() -> TempDir {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("results.csv"),
        "model,mse,year\n\
         base,0.312,2022\n\
         tuned,0.2551,2023\n\
         debug,0.001,2023\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("table.yaml"),
        r#"
display_names: {mse: 'MSE $\downarrow$'}
column_formats: {mse: .2f, year: d}
model_order: {tuned: 1, base: 2}
ignored_models: [debug]
column_underline: {year: false}
"#,
    )
    .unwrap();
    dir
}

#[test]
fn test_cli_help() {
    let dir = tempdir().unwrap();
    let (stdout, _, success) = run_csv2tex(&["--help"], dir.path());

    assert!(success);
    assert!(stdout.contains("csv2tex"));
    assert!(stdout.contains("--config"));
    assert!(stdout.contains("--output"));
    assert!(stdout.contains("check-config"));
}

#[test]
fn test_cli_version() {
    let dir = tempdir().unwrap();
    let (stdout, _, success) = run_csv2tex(&["--version"], dir.path());

    assert!(success);
    assert!(stdout.contains("csv2tex"));
}

#[test]
fn test_latex_output() {
    let dir = fixture();
    let (stdout, stderr, success) =
        run_csv2tex(&["results.csv", "-c", "table.yaml"], dir.path());

    assert!(success, "{stderr}");
    assert!(stdout.starts_with("\\begin{table}[t]"));
    assert!(stdout.contains("\\textbf{Model} & \\textbf{MSE $\\downarrow$} & \\textbf{Year} \\\\"));
    assert!(stdout.contains("tuned & \\underline{$0.26$} & $2023$ \\\\"));
    assert!(stdout.contains("base & $0.31$ & $2022$ \\\\"));
    assert!(!stdout.contains("debug"));
    assert!(stdout.trim_end().ends_with("\\end{table}"));
    // tuned is ranked first
    assert!(stdout.find("tuned").unwrap() < stdout.find("base &").unwrap());
}

#[test]
fn test_json_output() {
    let dir = fixture();
    let (stdout, _, success) = run_csv2tex(
        &["results.csv", "-c", "table.yaml", "--output", "json"],
        dir.path(),
    );

    assert!(success);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(json["latex"].as_str().unwrap().contains("\\begin{tabular}{ccc}"));
    assert_eq!(json["display"]["rows"].as_array().unwrap().len(), 2);
    assert_eq!(json["filtered"]["visible"], serde_json::json!([0, 1]));
    assert_eq!(json["minima"]["mse"], serde_json::json!([1]));
}

#[test]
fn test_preview_output() {
    let dir = fixture();
    let (stdout, _, success) = run_csv2tex(
        &["results.csv", "-c", "table.yaml", "--output", "preview"],
        dir.path(),
    );

    assert!(success);
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines[0].contains("Model"));
    assert!(lines[2].starts_with("tuned"));
    assert!(lines[3].starts_with("base"));
}

#[test]
fn test_preview_to_file_is_plain_text() {
    let dir = fixture();
    let (_, stderr, success) = run_csv2tex(
        &["results.csv", "-c", "table.yaml", "--output", "preview", "-o", "preview.txt"],
        dir.path(),
    );

    assert!(success, "{stderr}");
    let written = fs::read_to_string(dir.path().join("preview.txt")).unwrap();
    assert!(!written.contains('\u{1b}'));
    assert!(written.lines().nth(2).unwrap().starts_with("tuned"));
}

#[test]
fn test_run_options() {
    let dir = fixture();
    let (stdout, stderr, success) = run_csv2tex(
        &[
            "results.csv",
            "--columns",
            "model,mse",
            "--where",
            "mse>0.01",
            "--sort",
            "mse:desc",
            "--decimal-places",
            "1",
            "--style",
            "booktabs",
        ],
        dir.path(),
    );

    assert!(success, "{stderr}");
    assert!(stdout.contains("\\begin{tabular}{cc}"));
    assert!(stdout.contains("\\toprule"));
    assert!(!stdout.contains("debug"));
    assert!(stdout.find("base").unwrap() < stdout.find("tuned").unwrap());
    assert!(stdout.contains("tuned & \\underline{$0.3$} \\\\"));
}

#[test]
fn test_multiple_csv_files_are_stacked() {
    let dir = fixture();
    fs::write(dir.path().join("more.csv"), "model,mse\nextra,0.5\n").unwrap();
    let (stdout, _, success) =
        run_csv2tex(&["results.csv", "more.csv", "--output", "preview"], dir.path());

    assert!(success);
    assert!(stdout.contains("extra"));
    assert!(stdout.contains("debug"));
}

#[test]
fn test_out_file() {
    let dir = fixture();
    let (stdout, _, success) = run_csv2tex(
        &["results.csv", "-c", "table.yaml", "-o", "table.tex"],
        dir.path(),
    );

    assert!(success);
    assert!(stdout.is_empty());
    let written = fs::read_to_string(dir.path().join("table.tex")).unwrap();
    assert!(written.starts_with("\\begin{table}"));
    assert!(written.ends_with("\\end{table}\n"));
}

#[test]
fn test_missing_config_uses_defaults() {
    let dir = fixture();
    let (stdout, stderr, success) =
        run_csv2tex(&["results.csv", "-c", "nope.yaml"], dir.path());

    assert!(success);
    assert!(stderr.contains("warning:"));
    assert!(stderr.contains("using defaults"));
    assert!(stdout.contains("\\caption{Your Caption Here}"));
    assert!(stdout.contains("debug"));
}

#[test]
fn test_malformed_section_warns_but_converts() {
    let dir = fixture();
    fs::write(
        dir.path().join("partial.yaml"),
        "display_names: [oops]\ncolumn_formats: {mse: .1f}\n",
    )
    .unwrap();
    let (stdout, stderr, success) =
        run_csv2tex(&["results.csv", "-c", "partial.yaml"], dir.path());

    assert!(success);
    assert!(stderr.contains("display_names"));
    assert!(stdout.contains("$0.3$"));
}

#[test]
fn test_non_mapping_config_fails() {
    let dir = fixture();
    fs::write(dir.path().join("list.yaml"), "- a\n- b\n").unwrap();
    let (_, stderr, success) = run_csv2tex(&["results.csv", "-c", "list.yaml"], dir.path());

    assert!(!success);
    assert!(stderr.contains("Error:"));
    assert!(stderr.contains("mapping"));
}

#[test]
fn test_unknown_column_fails() {
    let dir = fixture();
    let (_, stderr, success) =
        run_csv2tex(&["results.csv", "--columns", "model,nope"], dir.path());

    assert!(!success);
    assert!(stderr.contains("unknown column: nope"));
}

#[test]
fn test_check_config() {
    let dir = fixture();
    fs::write(
        dir.path().join("check.yaml"),
        "table_style: zebra\nlatex_model_names: {a: A}\n",
    )
    .unwrap();
    let (stdout, stderr, success) = run_csv2tex(&["check-config", "check.yaml"], dir.path());

    assert!(success, "{stderr}");
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["warnings"].as_array().unwrap().len(), 1);
    assert_eq!(json["config"]["table_style"], "hline");
    assert_eq!(json["config"]["value_replacements"]["model"]["a"], "A");
}
