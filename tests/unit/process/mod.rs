use super::*;

#[test]
fn split_args_on_ascii_whitespace() {
    assert_eq!(split_args("a b  c"), vec!["a", "b", "c"]);
    assert_eq!(split_args("  lone  "), vec!["lone"]);
    assert!(split_args("").is_empty());
    assert!(split_args("   ").is_empty());
}

#[test]
fn run_captured_returns_child_stdout() {
    let output = run_captured("echo", "hello world").unwrap();
    assert_eq!(output.trim_end(), "hello world");
}

#[test]
fn run_captured_with_no_args() {
    let output = run_captured("echo", "").unwrap();
    assert_eq!(output, "\n");
}

#[test]
fn run_captured_reports_spawn_failures() {
    let err = run_captured("terrace-no-such-binary", "").unwrap_err();
    assert!(matches!(err, ProcessError::Spawn(_)));
}

#[test]
fn run_captured_keeps_output_of_a_failing_child() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("fail.sh");
    fs::write(&script, "echo partial\nexit 3\n").unwrap();

    let output = run_captured("sh", script.to_str().unwrap()).unwrap();
    assert_eq!(output, "partial\n");
}

#[test]
fn write_file_roundtrips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.conf");

    write_file(&path, "LANG=en_US.UTF-8\n").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "LANG=en_US.UTF-8\n");
}

#[test]
fn write_file_replaces_instead_of_appending() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.conf");

    write_file(&path, "a much longer first body\n").unwrap();
    write_file(&path, "short\n").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "short\n");
}

#[test]
fn write_file_reports_unwritable_paths() {
    let dir = tempfile::tempdir().unwrap();
    let err = write_file(dir.path(), "content").unwrap_err();
    assert!(matches!(err, ProcessError::Io(_)));
}
