//! Exit code and summary tests against the built binary
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | Audit workbook written |
//! | 1 | No files, no data, missing root, bad config or write error |

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

fn write_report(root: &Path, relative: &str, rows: &[(&str, f64)]) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("All Data").unwrap();
    sheet.write_string(0, 0, "Run").unwrap();
    sheet.write_string(0, 1, "Agent Fee").unwrap();
    for (i, (run, fee)) in rows.iter().enumerate() {
        sheet.write_string(i as u32 + 1, 0, *run).unwrap();
        sheet.write_number(i as u32 + 1, 1, *fee).unwrap();
    }
    workbook.save(path).unwrap();
}

fn report_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_report(dir.path(), "2025/6 Jun/16-06-2025/STE_Report.xlsx", &[("20", 100.0), ("32", 5.5)]);
    write_report(dir.path(), "2025/6 Jun/20-06-2025/STE_Report.xlsx", &[("20", 1.25)]);
    dir
}

fn feeaudit() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_feeaudit"));
    cmd.env_remove("FEEAUDIT_ROOT_DIR")
        .env_remove("FEEAUDIT_OUTPUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Run feeaudit and return (exit_code, stdout, stderr)
fn run(cmd: &mut Command) -> (i32, String, String) {
    let output = cmd.output().expect("failed to execute feeaudit");
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

// =============================================================================
// Success
// =============================================================================

#[test]
fn exit_0_writes_workbook() {
    let tree = report_tree();
    let out = tree.path().join("audit.xlsx");

    let (code, stdout, _) = run(feeaudit().arg("--root-dir").arg(tree.path()).arg("-o").arg(&out));

    assert_eq!(code, 0);
    assert!(out.exists());
    assert!(stdout.contains("Processed:      2"));
    assert!(stdout.contains("101.25"));
}

#[test]
fn exit_0_with_skipped_files() {
    let tree = report_tree();
    fs::write(tree.path().join("2025/6 Jun/16-06-2025/STE_Report_bad.xlsx"), b"junk").unwrap();
    let out = tree.path().join("audit.xlsx");

    let (code, stdout, stderr) = run(feeaudit().arg("--root-dir").arg(tree.path()).arg("-o").arg(&out));

    assert_eq!(code, 0);
    assert!(out.exists());
    assert!(stdout.contains("[UnreadableFile]"));
    assert!(stderr.contains("skipping file"));
}

#[test]
fn root_dir_from_environment() {
    let tree = report_tree();
    let out = tree.path().join("env.xlsx");

    let (code, _, _) = run(feeaudit().env("FEEAUDIT_ROOT_DIR", tree.path()).env("FEEAUDIT_OUTPUT", &out));

    assert_eq!(code, 0);
    assert!(out.exists());
}

#[test]
fn config_file_supplies_settings() {
    let tree = report_tree();
    let out = tree.path().join("from_config.xlsx");
    let config = tree.path().join("feeaudit.toml");
    fs::write(
        &config,
        format!(
            "root_dir = {:?}\noutput = {:?}\nend_date = \"2025-06-16\"\n",
            tree.path().to_string_lossy(),
            out.to_string_lossy()
        ),
    )
    .unwrap();

    let (code, stdout, _) = run(feeaudit().arg("--config").arg(&config));

    assert_eq!(code, 0);
    assert!(out.exists());
    assert!(stdout.contains("Outside range:  1"));
}

#[test]
fn json_summary() {
    let tree = report_tree();
    let out = tree.path().join("audit.xlsx");

    let (code, stdout, _) = run(feeaudit()
        .arg("--root-dir")
        .arg(tree.path())
        .arg("-o")
        .arg(&out)
        .args(["--format", "json", "--start-date", "2025-06-17"]));

    assert_eq!(code, 0);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["runs"][0]["run"], "20");
    assert_eq!(json["runs"][0]["total"], "1.25");
    assert_eq!(json["range"]["start"], "2025-06-17");
    assert_eq!(json["out_of_range"].as_array().unwrap().len(), 1);
}

#[test]
fn interactive_date_range() {
    let tree = report_tree();
    let out = tree.path().join("audit.xlsx");

    let mut child = feeaudit()
        .arg("--root-dir")
        .arg(tree.path())
        .arg("-o")
        .arg(&out)
        .arg("--interactive")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"2\n2025-06-20\n2025-06-20\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(0));
    assert!(stderr.contains("2. Specify date range"));
    assert!(!stdout.contains("Select processing mode"));
    assert!(stdout.contains("Date range:     2025-06-20 .. 2025-06-20"));
}

#[test]
fn interactive_json_summary_stays_parseable() {
    let tree = report_tree();
    let out = tree.path().join("audit.xlsx");

    let mut child = feeaudit()
        .arg("--root-dir")
        .arg(tree.path())
        .arg("-o")
        .arg(&out)
        .args(["--interactive", "--format", "json"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(b"1\n").unwrap();
    let output = child.wait_with_output().unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(0));
    assert!(stderr.contains("Enter choice (1 or 2)"));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["runs"][0]["total"], "101.25");
    assert_eq!(json["range"]["start"], serde_json::Value::Null);
}

// =============================================================================
// Failure
// =============================================================================

#[test]
fn exit_1_no_files_in_range() {
    let tree = report_tree();
    let out = tree.path().join("audit.xlsx");

    let (code, _, stderr) = run(feeaudit()
        .arg("--root-dir")
        .arg(tree.path())
        .arg("-o")
        .arg(&out)
        .args(["--start-date", "2025-06-01", "--end-date", "2025-06-15"]));

    assert_eq!(code, 1);
    assert!(!out.exists());
    assert!(stderr.contains("No report files found"));
}

#[test]
fn exit_1_missing_root() {
    let dir = TempDir::new().unwrap();
    let (code, _, stderr) = run(feeaudit().arg("--root-dir").arg(dir.path().join("absent")));

    assert_eq!(code, 1);
    assert!(stderr.contains("Root directory does not exist"));
}

#[test]
fn exit_1_without_root() {
    let (code, _, stderr) = run(&mut feeaudit());

    assert_eq!(code, 1);
    assert!(stderr.contains("No root directory given"));
}

#[test]
fn exit_1_inverted_range() {
    let tree = report_tree();
    let (code, _, stderr) = run(feeaudit()
        .arg("--root-dir")
        .arg(tree.path())
        .args(["--start-date", "2025-06-20", "--end-date", "2025-06-01"]));

    assert_eq!(code, 1);
    assert!(stderr.contains("Invalid date range"));
}

#[test]
fn exit_1_no_data() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("16-06-2025")).unwrap();
    fs::write(dir.path().join("16-06-2025/STE_Report.xlsx"), b"junk").unwrap();
    let out = dir.path().join("audit.xlsx");

    let (code, _, stderr) = run(feeaudit().arg("--root-dir").arg(dir.path()).arg("-o").arg(&out));

    assert_eq!(code, 1);
    assert!(!out.exists());
    assert!(stderr.contains("No fee data found"));
}

#[test]
fn exit_1_unwritable_output() {
    let tree = report_tree();
    let out = tree.path().join("missing_dir/audit.xlsx");

    let (code, _, stderr) = run(feeaudit().arg("--root-dir").arg(tree.path()).arg("-o").arg(&out));

    assert_eq!(code, 1);
    assert!(stderr.contains("Failed to write"));
}
