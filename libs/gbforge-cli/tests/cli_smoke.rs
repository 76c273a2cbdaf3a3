#![cfg(unix)]

use gbforge_core::{BuildReport, UnitStatus, TOOLCHAIN_HOME_VAR};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn bin_path() -> &'static str {
    env!("CARGO_BIN_EXE_gbforge-cli")
}

fn run_cli(toolchain_home: &Path, args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .env(TOOLCHAIN_HOME_VAR, toolchain_home)
        .output()
        .expect("failed to run gbforge-cli")
}

/// Stub RGBDS toolchain: each tool creates its `-o` target (when it has one)
/// and exits nonzero for inputs with a `fail-<stage>` stem.
fn setup_toolchain(dir: &Path) {
    let creating_stub = |fail: &str| {
        format!(
            "#!/bin/sh\n\
             out=\"\"; last=\"\"\n\
             while [ $# -gt 0 ]; do\n\
             \x20 if [ \"$1\" = \"-o\" ]; then shift; out=\"$1\"; fi\n\
             \x20 last=\"$1\"; shift\n\
             done\n\
             case \"$last\" in *{fail}*) exit 1 ;; esac\n\
             : > \"$out\"\n"
        )
    };
    stub_tool(dir, "rgbasm", &creating_stub("fail-assemble"));
    stub_tool(dir, "rgblink", &creating_stub("fail-link"));
    stub_tool(
        dir,
        "rgbfix",
        "#!/bin/sh\n\
         last=\"\"\n\
         for a in \"$@\"; do last=\"$a\"; done\n\
         case \"$last\" in *fail-fix*) exit 1 ;; esac\n",
    );
}

fn stub_tool(dir: &Path, name: &str, script: &str) {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    std::fs::write(&path, script).expect("write stub");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod stub");
}

fn setup_tree(files: &[&str]) -> (TempDir, PathBuf, PathBuf) {
    let td = TempDir::new().expect("tempdir");
    let tree = td.path().join("roms");
    let tools = td.path().join("rgbds");
    std::fs::create_dir_all(&tree).expect("tree dir");
    std::fs::create_dir_all(&tools).expect("tools dir");
    setup_toolchain(&tools);
    for f in files {
        let p = tree.join(f);
        if let Some(parent) = p.parent() {
            std::fs::create_dir_all(parent).expect("parent dir");
        }
        std::fs::write(&p, "SECTION \"x\", ROM0\n").expect("write source");
    }
    (td, tree, tools)
}

#[test]
fn help_runs() {
    let output = Command::new(bin_path())
        .arg("--help")
        .output()
        .expect("failed to run gbforge-cli --help");

    assert!(output.status.success(), "help command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Usage:"),
        "unexpected help output: {stdout}"
    );
}

#[test]
fn batch_builds_every_source_in_the_tree() {
    let (_td, tree, tools) = setup_tree(&["a.asm", "b.txt", "sub/c.asm"]);

    let output = run_cli(&tools, &["--all", tree.to_str().unwrap()]);
    assert!(output.status.success(), "batch build should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Found 2 file(s) to compile"),
        "unexpected output: {stdout}"
    );
    assert!(stdout.contains("OK: built 2 file(s)"));

    for artifact in ["a.o", "a.gb", "sub/c.o", "sub/c.gb"] {
        assert!(tree.join(artifact).is_file(), "missing {artifact}");
    }
    assert!(!tree.join("b.o").exists(), "b.txt must not be compiled");
}

#[test]
fn batch_failure_exits_nonzero_but_attempts_every_unit() {
    let (_td, tree, tools) = setup_tree(&["good.asm", "fail-assemble.asm"]);

    let output = run_cli(&tools, &["--all", tree.to_str().unwrap()]);
    assert!(!output.status.success(), "batch with a failure must exit nonzero");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("ERR: assemble failed"), "got: {stdout}");
    assert!(stderr.contains("build failed: 1 file(s) failed"), "got: {stderr}");

    // the sibling unit was still built
    assert!(tree.join("good.gb").is_file());
}

#[test]
fn single_file_mode_builds_one_source() {
    let (_td, tree, tools) = setup_tree(&["game.asm"]);
    let src = tree.join("game.asm");

    let output = run_cli(&tools, &[src.to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("OK: built"), "got: {stdout}");
    assert!(tree.join("game.gb").is_file());
}

#[test]
fn single_file_mode_rejects_non_sources() {
    let (_td, tree, tools) = setup_tree(&["readme.txt"]);
    let path = tree.join("readme.txt");

    let output = run_cli(&tools, &[path.to_str().unwrap()]);
    assert!(!output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("is not a regular .asm file"), "got: {stdout}");
    assert!(!tree.join("readme.o").exists());
}

#[test]
fn json_report_round_trips_through_the_typed_structs() {
    let (_td, tree, tools) = setup_tree(&["a.asm", "fail-fix.asm"]);

    let output = run_cli(&tools, &["--all", "--json", tree.to_str().unwrap()]);
    assert!(!output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        !stdout.contains("Compiling"),
        "json mode must not mix in status lines: {stdout}"
    );

    let reports: Vec<BuildReport> =
        serde_json::from_str(&stdout).expect("stdout should parse as build reports");
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.found, 2);
    assert!(!report.ok);

    // fix failure still leaves the linked image on disk
    assert!(tree.join("fail-fix.gb").is_file());
    let failed: Vec<_> = report.units.iter().filter(|u| !u.ok()).collect();
    assert_eq!(failed.len(), 1);
    assert!(matches!(
        failed[0].status,
        UnitStatus::StageFailed { .. }
    ));
}
