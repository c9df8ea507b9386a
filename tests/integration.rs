mod common;

use std::process::Command;

use crate::common::fixture_dir;

fn symref_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_symref"));
    cmd.current_dir(fixture_dir());
    cmd
}

#[test]
fn resolve_prints_canonical_references() {
    let output = symref_cmd().args(["resolve", "/MixedFramework/MFWidget/spin"]).output().unwrap();
    assert!(output.status.success(), "resolve failed: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("doc://org.swift.MixedFramework/documentation/MixedFramework/Widget/spin()"),
        "unexpected output: {stdout}"
    );
}

#[test]
fn ambiguous_link_exits_with_one() {
    let output = symref_cmd().args(["resolve", "/MixedFramework/Options/first"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("symref.link.Ambiguous"), "unexpected stderr: {stderr}");
    assert!(stderr.contains("first-enum.case"), "unexpected stderr: {stderr}");
}

#[test]
fn snapshot_then_resolve_externally() {
    let out = tempfile::tempdir().unwrap();
    let snapshot = symref_cmd().arg("snapshot").arg("--output").arg(out.path()).output().unwrap();
    assert!(snapshot.status.success(), "snapshot failed: {}", String::from_utf8_lossy(&snapshot.stderr));
    assert!(out.path().join("link-hierarchy.json").exists());
    assert!(out.path().join("linkable-entities.json").exists());

    let resolve = Command::new(env!("CARGO_BIN_EXE_symref"))
        .current_dir(out.path())
        .arg("resolve")
        .arg("--snapshot")
        .arg(out.path().join("link-hierarchy.json"))
        .arg("--summaries")
        .arg(out.path().join("linkable-entities.json"))
        .args(["/MixedFramework/Options/first-enum.case", "/MixedFramework/Widget/spin()"])
        .output()
        .unwrap();
    assert!(resolve.status.success(), "resolve failed: {}", String::from_utf8_lossy(&resolve.stderr));

    let stdout = String::from_utf8_lossy(&resolve.stdout);
    assert!(stdout.contains("/documentation/MixedFramework/Options/first-swift.enum.case"), "{stdout}");
    assert!(stdout.contains("/documentation/MixedFramework/Widget/spin()"), "{stdout}");
}

#[test]
fn merge_prints_relationships_as_json() {
    let output = symref_cmd().arg("merge").output().unwrap();
    assert!(output.status.success(), "merge failed: {}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(report["problems"].as_array().unwrap().is_empty());
    assert!(report["symbols"].as_array().unwrap().len() >= 10);
}

#[test]
fn missing_graphs_exit_with_two() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_symref"))
        .current_dir(dir.path())
        .args(["dump"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn corrupt_snapshot_exits_with_two() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("h.json"), r#"{"version": 99}"#).unwrap();
    std::fs::write(dir.path().join("s.json"), "[]").unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_symref"))
        .current_dir(dir.path())
        .args(["resolve", "--snapshot", "h.json", "--summaries", "s.json", "/Kit"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn graph_flags_are_reported_as_ignored_with_a_snapshot() {
    let out = tempfile::tempdir().unwrap();
    let snapshot = symref_cmd().arg("snapshot").arg("--output").arg(out.path()).output().unwrap();
    assert!(snapshot.status.success(), "snapshot failed: {}", String::from_utf8_lossy(&snapshot.stderr));

    let resolve = symref_cmd()
        .arg("resolve")
        .arg("--snapshot")
        .arg(out.path().join("link-hierarchy.json"))
        .arg("--summaries")
        .arg(out.path().join("linkable-entities.json"))
        .args(["--graph", "graphs", "/MixedFramework/Widget"])
        .output()
        .unwrap();
    assert!(resolve.status.success(), "resolve failed: {}", String::from_utf8_lossy(&resolve.stderr));

    let stderr = String::from_utf8_lossy(&resolve.stderr);
    assert!(stderr.contains("ignored with --snapshot"), "unexpected stderr: {stderr}");
}

#[test]
fn local_resolve_prints_merge_problems() {
    let dir = tempfile::tempdir().unwrap();
    let graph = serde_json::json!({
        "metadata": { "formatVersion": { "major": 0, "minor": 6, "patch": 0 }, "generator": "test" },
        "module": { "name": "Kit", "platform": {} },
        "symbols": [{
            "identifier": { "precise": "s:3Kit6WidgetC", "interfaceLanguage": "swift" },
            "kind": { "identifier": "swift.class", "displayName": "Class" },
            "names": { "title": "Widget" },
            "pathComponents": ["Widget"]
        }],
        "relationships": [
            { "kind": "conformsTo", "source": "s:3Kit7MissingV", "target": "s:3Kit6WidgetC" }
        ]
    });
    std::fs::write(dir.path().join("Kit.symbols.json"), graph.to_string()).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_symref"))
        .current_dir(dir.path())
        .args(["resolve", "--graph", ".", "/Kit/Widget"])
        .output()
        .unwrap();
    assert!(output.status.success(), "resolve failed: {}", String::from_utf8_lossy(&output.stderr));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("symref.relationship.SymbolNotFound"), "unexpected stderr: {stderr}");
    assert!(stderr.contains("s:3Kit7MissingV"), "unexpected stderr: {stderr}");
}
