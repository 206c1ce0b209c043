use std::fs;
use std::path::PathBuf;

use predicates::prelude::*;
use quiz_edit_core::ExitCode;
use quiz_test_support::write_temp;
use tempfile::tempdir;

fn cargo_bin() -> assert_cmd::Command {
    assert_cmd::Command::cargo_bin("quiz-edit").unwrap()
}

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture_copy() -> (tempfile::TempDir, PathBuf) {
    let contents = fs::read_to_string(fixture_path("sample.md")).unwrap();
    write_temp("bank.md", &contents)
}

#[test]
fn list_reports_shapes_and_reasons() {
    let mut cmd = cargo_bin();
    cmd.arg(fixture_path("sample.md")).arg("list");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1  true-false"))
        .stdout(predicate::str::contains("2. 以下哪个是智能指针"))
        .stdout(predicate::str::contains("found 1 options"));
}

#[test]
fn select_dry_run_prints_diff_without_writing() {
    let (_dir, path) = fixture_copy();
    let before = fs::read_to_string(&path).unwrap();

    let mut cmd = cargo_bin();
    cmd.arg(&path)
        .args(["select", "--block", "1", "--key", "1", "--dry-run"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("+> - [x] A. 正确"))
        .stdout(predicate::str::contains("-> 答案：A"));
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn select_writes_back_with_backup() {
    let (_dir, path) = fixture_copy();
    let before = fs::read_to_string(&path).unwrap();

    let mut cmd = cargo_bin();
    cmd.arg(&path)
        .args(["select", "--block", "2", "--key", "a", "--quiet"]);

    cmd.assert().success().stdout(predicate::str::is_empty());

    let after = fs::read_to_string(&path).unwrap();
    assert!(after.contains("> - [x] A. Box"));
    assert!(!after.contains("解析"));
    assert!(after.contains("答案：A"));
    assert_eq!(fs::read_to_string(path.with_extension("bak")).unwrap(), before);
}

#[test]
fn multi_policy_accepts_several_keys() {
    let (_dir, path) = fixture_copy();

    let mut cmd = cargo_bin();
    cmd.arg(&path).args([
        "select", "--block", "2", "--key", "1", "3", "--policy", "multi", "--no-backup",
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Updated"));

    let after = fs::read_to_string(&path).unwrap();
    assert!(after.contains("> - [x] A. Box"));
    assert!(after.contains("> - [x] C. bool"));
    assert!(!path.with_extension("bak").exists());
}

#[test]
fn out_of_range_key_is_rejected() {
    let (_dir, path) = fixture_copy();
    let before = fs::read_to_string(&path).unwrap();

    let mut cmd = cargo_bin();
    cmd.arg(&path)
        .args(["select", "--block", "1", "--key", "C"]);

    cmd.assert()
        .failure()
        .code(ExitCode::Rejected as i32)
        .stderr(predicate::str::contains("out of range"));
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn non_numeric_block_is_invalid() {
    let mut cmd = cargo_bin();
    cmd.arg(fixture_path("sample.md"))
        .args(["select", "--block", "two", "--key", "A", "--dry-run"]);

    cmd.assert()
        .failure()
        .code(ExitCode::InvalidArguments as i32)
        .stderr(predicate::str::contains("'two' is not a block number"));
}

#[test]
fn repair_splits_one_line_options() {
    let (_dir, path) = fixture_copy();

    let mut cmd = cargo_bin();
    cmd.arg(&path).args(["repair", "--block", "3", "--no-backup"]);
    cmd.assert().success();

    let after = fs::read_to_string(&path).unwrap();
    assert!(after.contains("> - [ ] A. map\n> - [ ] B. filter\n> - [ ] C. fold\n> - [ ] D. zip"));

    let mut again = cargo_bin();
    again.arg(&path).args(["repair", "--dry-run"]);
    again
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes (dry run)"));
}

#[test]
fn export_writes_requested_view() {
    let (dir, path) = fixture_copy();
    let output = dir.path().join("quoted.md");

    let mut cmd = cargo_bin();
    cmd.arg(&path)
        .args(["export", "--view", "quoted", "--output"])
        .arg(&output);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Exported quoted view"));

    let exported = fs::read_to_string(&output).unwrap();
    assert!(exported.starts_with("## 1. 借用检查在编译期完成\n- [ ] A. 正确"));
    assert!(exported.contains("\n\n---\n\n## 2."));
    assert!(exported.ends_with("D.zip\n"));
}

#[test]
fn config_sets_policy_and_autosave() {
    let (dir, path) = fixture_copy();
    fs::write(
        dir.path().join(".quiz-extract.toml"),
        "[selection]\npolicy = \"multi\"\n\n[export]\nautosave = true\n",
    )
    .unwrap();

    let mut cmd = cargo_bin();
    cmd.arg(&path)
        .args(["select", "--block", "2", "--key", "A", "B", "--no-backup"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Autosaved"));

    let autosave = dir.path().join("bank_autosave.md");
    let exported = fs::read_to_string(autosave).unwrap();
    assert!(exported.contains("- [x] A. Box\n- [x] B. u8 B"));
}

#[test]
fn invalid_config_reports_validation_error() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("broken.toml");
    fs::write(&config, "[export]\nview = \"both\"\n").unwrap();

    let mut cmd = cargo_bin();
    cmd.arg(fixture_path("sample.md"))
        .arg("list")
        .arg("--config")
        .arg(&config);

    cmd.assert()
        .failure()
        .code(ExitCode::Validation as i32)
        .stderr(predicate::str::contains("export.view: unknown export view 'both'"));
}

#[test]
fn empty_document_is_not_found() {
    let (_dir, path) = write_temp("empty.md", "\n---\n\n");

    let mut cmd = cargo_bin();
    cmd.arg(&path).arg("list");

    cmd.assert()
        .failure()
        .code(ExitCode::NotFound as i32)
        .stderr(predicate::str::contains("No question blocks found"));
}
