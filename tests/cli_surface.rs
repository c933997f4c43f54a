use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn unique_workspace(prefix: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock should be after the epoch")
        .as_nanos();
    let path = std::env::temp_dir().join(format!("{prefix}-{}-{nanos}", std::process::id()));
    std::fs::create_dir_all(&path).expect("workspace should be creatable");
    path
}

fn run_kousu(args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_kousu"));
    for variable in [
        "KOUSU_MA_URL",
        "KOUSU_MA_USER",
        "KOUSU_MA_PASS",
        "KOUSU_MONTH",
        "KOUSU_OUT_CSV",
        "KOUSU_OUT_JSON",
        "KOUSU_IN_CSV",
        "KOUSU_IN_JSON",
    ] {
        command.env_remove(variable);
    }
    command.args(args).output().expect("kousu should run")
}

fn run_with_credentials(extra: &[&str]) -> Output {
    let mut args = vec![
        "--ma-url",
        "https://example.invalid/maeyes/loginView.xhtml",
        "--ma-user",
        "user0",
        "--ma-pass",
        "pass0",
        "--month",
        "2006-01",
    ];
    args.extend(extra);
    run_kousu(&args)
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("file should be writable");
    path
}

#[test]
fn help_lists_the_subcommands() {
    let output = run_kousu(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["get", "put", "import-kinmu", "--ma-url", "--month"] {
        assert!(stdout.contains(name), "help should mention {name}");
    }
}

#[test]
fn missing_credentials_fail_before_anything_runs() {
    let output = run_kousu(&["get", "out.json"]);
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("--ma-url"));
}

#[test]
fn malformed_month_is_rejected() {
    let output = run_kousu(&[
        "--ma-url",
        "u",
        "--ma-user",
        "u",
        "--ma-pass",
        "p",
        "--month",
        "2006-13",
        "get",
        "out.json",
    ]);
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("yyyy-mm"));
}

#[test]
fn removed_csv_flags_direct_to_the_replacement() {
    let output = run_with_credentials(&["put", "--in-csv", "in.csv", "in.json"]);
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("removed in 0.2.0"));

    let output = run_with_credentials(&["get", "--out-json", "x.json", "out.json"]);
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("kousu get <file>"));
}

#[test]
fn put_with_invalid_document_exits_one_without_a_browser() {
    let workspace = unique_workspace("kousu-put-invalid");
    let input = write_file(&workspace, "in.json", "{}");

    let output = run_with_credentials(&["put", input.to_str().expect("utf8 path")]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = stderr_of(&output);
    assert!(stderr.contains("error:"), "stderr: {stderr}");
    assert!(stderr.contains("version"), "stderr: {stderr}");

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn put_with_unsupported_version_names_the_field_path() {
    let workspace = unique_workspace("kousu-put-version");
    let input = write_file(
        &workspace,
        "in.json",
        r#"{"version":"9.9.9","projects":{},"works":[]}"#,
    );

    let output = run_with_credentials(&["put", input.to_str().expect("utf8 path")]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = stderr_of(&output);
    assert!(stderr.contains("$.version"), "stderr: {stderr}");
    assert!(stderr.contains("unsupported"), "stderr: {stderr}");

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn put_with_missing_file_exits_one() {
    let output = run_with_credentials(&["put", "/nonexistent/kousu-in.json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("unable to read input"));
}
