//! Integration tests for the flowgrid binary.
//!
//! Golden files: each demos/*.mm.md pairs with a *.expect.txt that the
//! default configuration must reproduce byte-for-byte.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn binary() -> &'static str {
    env!("CARGO_BIN_EXE_flowgrid")
}

fn demos_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos")
}

fn run_with_stdin(input: &str, args: &[&str]) -> Output {
    let mut child = Command::new(binary())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn flowgrid");
    {
        use std::io::Write;
        child
            .stdin
            .as_mut()
            .unwrap()
            .write_all(input.as_bytes())
            .unwrap();
    }
    child.wait_with_output().expect("failed to wait on flowgrid")
}

fn run_ok(input: &str, args: &[&str]) -> String {
    let out = run_with_stdin(input, args);
    assert!(
        out.status.success(),
        "flowgrid exited with {:?}; stderr: {}",
        out.status.code(),
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8(out.stdout).expect("non-UTF8 output")
}

// ─── Golden files ────────────────────────────────────────────────────────────

fn golden_pairs() -> Vec<(String, PathBuf, PathBuf)> {
    let dir = demos_dir();
    let mut pairs = Vec::new();
    for entry in fs::read_dir(&dir).expect("demos dir missing").flatten() {
        let path = entry.path();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        if let Some(stem) = name.strip_suffix(".mm.md") {
            let expect = dir.join(format!("{stem}.expect.txt"));
            if expect.exists() {
                pairs.push((stem.to_string(), path.clone(), expect));
            }
        }
    }
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    pairs
}

#[test]
fn golden_files_match_byte_for_byte() {
    let pairs = golden_pairs();
    assert!(!pairs.is_empty(), "no golden pairs found in {:?}", demos_dir());

    let mut failures = Vec::new();
    for (name, source, expect) in &pairs {
        let src = fs::read_to_string(source).unwrap();
        let expected = fs::read_to_string(expect).unwrap();
        let actual = run_ok(&src, &[]);
        if actual != expected {
            failures.push(format!(
                "{name}: expected {} bytes, got {} bytes\n--- expected ---\n{expected}\n--- actual ---\n{actual}",
                expected.len(),
                actual.len()
            ));
        }
    }
    assert!(
        failures.is_empty(),
        "golden mismatches ({}/{}):\n{}",
        failures.len(),
        golden_pairs().len(),
        failures.join("\n")
    );
}

// ─── Flags ───────────────────────────────────────────────────────────────────

#[test]
fn ascii_flag_produces_plain_ascii() {
    let out = run_ok("graph TD\n    A --> B\n", &["--ascii"]);
    assert_eq!(
        out,
        "+---+\n| A |\n+-+-+\n  |\n  |\n  v\n+---+\n| B |\n+---+\n"
    );
}

#[test]
fn direction_flag_overrides_header() {
    let src = "graph TD\n    A --> B --> C\n";
    let td = run_ok(src, &[]);
    let lr = run_ok(src, &["--direction", "LR"]);
    let td_width = td.lines().map(|l| l.chars().count()).max().unwrap();
    let lr_width = lr.lines().map(|l| l.chars().count()).max().unwrap();
    assert!(lr_width > td_width);
    assert!(lr.lines().count() < td.lines().count());
}

#[test]
fn bt_direction_puts_target_on_top() {
    let out = run_ok("graph TD\n    A --> B\n", &["-d", "BT"]);
    let lines: Vec<&str> = out.lines().collect();
    let b = lines.iter().position(|l| l.contains('B')).unwrap();
    let a = lines.iter().position(|l| l.contains('A')).unwrap();
    assert!(b < a);
}

#[test]
fn padding_flag_widens_boxes() {
    let narrow = run_ok("graph TD\n    A\n", &["-p", "0"]);
    let wide = run_ok("graph TD\n    A\n", &["-p", "3"]);
    assert_eq!(narrow.lines().next().unwrap().chars().count(), 3);
    assert_eq!(wide.lines().next().unwrap().chars().count(), 9);
}

#[test]
fn reads_input_file_and_writes_output_file() {
    let dir = std::env::temp_dir().join("flowgrid_cli_test");
    fs::create_dir_all(&dir).unwrap();
    let input = dir.join("in.mm.md");
    let output = dir.join("out.txt");
    fs::write(&input, "graph LR\n    X --> Y\n").unwrap();

    let status = Command::new(binary())
        .arg(input.to_str().unwrap())
        .args(["--output", output.to_str().unwrap()])
        .status()
        .unwrap();
    assert!(status.success());

    let content = fs::read_to_string(&output).unwrap();
    assert!(content.contains('X'));
    assert!(content.contains('Y'));
    assert!(content.contains('►'));

    fs::remove_file(&input).ok();
    fs::remove_file(&output).ok();
    fs::remove_dir(&dir).ok();
}

// ─── Exit codes ──────────────────────────────────────────────────────────────

#[test]
fn parse_error_exits_one_with_a_single_stderr_line() {
    let out = run_with_stdin("graph TD\n    A[unclosed\n", &[]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert_eq!(stderr.lines().count(), 1);
    assert!(stderr.starts_with("error:"));
}

#[test]
fn missing_input_file_exits_one() {
    let out = Command::new(binary())
        .arg("/nonexistent/flowgrid/input.mm.md")
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn usage_error_exits_two() {
    let out = run_with_stdin("", &["--no-such-flag"]);
    assert_eq!(out.status.code(), Some(2));

    let out = run_with_stdin("graph TD\nA\n", &["--direction", "sideways"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn version_flag_works() {
    let out = run_with_stdin("", &["--version"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("flowgrid"));
}
