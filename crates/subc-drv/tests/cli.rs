//! End-to-end CLI tests driving the built `subc` binary.
//!
//! These exercise the external interface's mutual-exclusion rules and the
//! six positive / five negative scenarios from the component design.
//! Compiling and running the produced executables requires a working
//! `gcc` on PATH, consistent with the driver treating the assembler and
//! linker as an external collaborator.

use std::fs;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::tempdir;

fn subc() -> Command {
    Command::cargo_bin("subc").unwrap()
}

fn write_source(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn help_exits_zero() {
    subc()
        .arg("--help")
        .assert()
        .success();
}

#[test]
fn no_inputs_is_a_usage_error() {
    subc().assert().failure().code(129);
}

#[test]
fn lex_and_tree_together_is_a_usage_error() {
    let dir = tempdir().unwrap();
    let src = write_source(&dir, "a.c", "int main(void) { return 0; }");
    subc()
        .arg("--lex")
        .arg("--tree")
        .arg(&src)
        .assert()
        .failure()
        .code(129);
}

#[test]
fn lex_with_output_flag_is_a_usage_error() {
    let dir = tempdir().unwrap();
    let src = write_source(&dir, "a.c", "int main(void) { return 0; }");
    subc()
        .arg("--lex")
        .arg("-o")
        .arg("out")
        .arg(&src)
        .assert()
        .failure()
        .code(129);
}

#[test]
fn lex_requires_exactly_one_source() {
    let dir = tempdir().unwrap();
    let a = write_source(&dir, "a.c", "int main(void) { return 0; }");
    let b = write_source(&dir, "b.c", "int f(void) { return 1; }");
    subc()
        .arg("--lex")
        .arg(&a)
        .arg(&b)
        .assert()
        .failure()
        .code(129);
}

#[test]
fn lex_prints_tokens() {
    let dir = tempdir().unwrap();
    let src = write_source(&dir, "a.c", "int main(void) { return 0; }");
    subc()
        .arg("--lex")
        .arg(&src)
        .assert()
        .success()
        .stdout(predicate::str::contains("'int'"));
}

#[test]
fn tree_prints_dot_format() {
    let dir = tempdir().unwrap();
    let src = write_source(&dir, "a.c", "int main(void) { return 0; }");
    subc()
        .arg("--tree")
        .arg(&src)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("digraph AST"));
}

#[test]
fn assembly_only_leaves_s_file_in_place() {
    let dir = tempdir().unwrap();
    let src = write_source(&dir, "a.c", "int main(void) { return 0; }");
    subc().arg("-S").arg(&src).assert().success();
    assert!(dir.path().join("a.s").exists());
}

#[test]
fn syntax_error_exits_128() {
    let dir = tempdir().unwrap();
    let src = write_source(&dir, "a.c", "int main(void) { return }");
    subc().arg("-S").arg(&src).assert().failure().code(128);
}

fn run_and_capture_exit_code(dir: &std::path::Path, src: &str) -> i32 {
    let source = write_source(dir, "prog.c", src);
    let out_path = dir.join("prog");
    subc()
        .arg(&source)
        .arg("-o")
        .arg(&out_path)
        .assert()
        .success();
    let status = Command::new(&out_path).status().unwrap();
    status.code().unwrap()
}

#[test]
fn precedence_scenario() {
    let dir = tempdir().unwrap();
    assert_eq!(
        run_and_capture_exit_code(dir.path(), "int main(void) { return 2 + 3 * 4; }"),
        14
    );
}

#[test]
fn compound_assignment_scenario() {
    let dir = tempdir().unwrap();
    assert_eq!(
        run_and_capture_exit_code(
            dir.path(),
            "int main(void) { int a = 1, b = 2; a += b; return a; }"
        ),
        3
    );
}

#[test]
fn recursion_scenario() {
    let dir = tempdir().unwrap();
    assert_eq!(
        run_and_capture_exit_code(
            dir.path(),
            "int fact(int n) { if (n <= 1) return 1; return n * fact(n-1); }\n\
             int main(void) { return fact(5); }"
        ),
        120
    );
}

#[test]
fn for_decl_scoping_scenario() {
    let dir = tempdir().unwrap();
    assert_eq!(
        run_and_capture_exit_code(
            dir.path(),
            "int main(void) { int s = 0; for (int i = 1; i <= 10; i = i + 1) s = s + i; return s; }"
        ),
        55
    );
}

#[test]
fn shadowing_scenario() {
    let dir = tempdir().unwrap();
    assert_eq!(
        run_and_capture_exit_code(
            dir.path(),
            "int g = 7; int main(void) { int g = 3; { int g = 100; } return g; }"
        ),
        3
    );
}

#[test]
fn forward_goto_scenario() {
    let dir = tempdir().unwrap();
    assert_eq!(
        run_and_capture_exit_code(
            dir.path(),
            "int main(void) { int x = 0; goto L; x = 1; L: return x; }"
        ),
        0
    );
}

#[test]
fn assignment_to_non_lvalue_is_rejected() {
    let dir = tempdir().unwrap();
    let src = write_source(&dir, "a.c", "int main(void) { return 1 = 2; }");
    subc().arg("-S").arg(&src).assert().failure().code(128);
}

#[test]
fn break_outside_loop_is_rejected() {
    let dir = tempdir().unwrap();
    let src = write_source(&dir, "a.c", "int main(void) { break; return 0; }");
    subc().arg("-S").arg(&src).assert().failure().code(128);
}

#[test]
fn undefined_goto_label_is_rejected() {
    let dir = tempdir().unwrap();
    let src = write_source(&dir, "a.c", "int main(void) { goto x; return 0; }");
    subc().arg("-S").arg(&src).assert().failure().code(128);
}

#[test]
fn value_in_void_return_is_rejected() {
    let dir = tempdir().unwrap();
    let src = write_source(&dir, "a.c", "void f(void) { return 1; } int main(void) { f(); return 0; }");
    subc().arg("-S").arg(&src).assert().failure().code(128);
}

#[test]
fn function_signature_mismatch_is_rejected() {
    let dir = tempdir().unwrap();
    let src = write_source(
        &dir,
        "a.c",
        "int f(int); int f(int, int) { return 0; } int main(void) { return 0; }",
    );
    subc().arg("-S").arg(&src).assert().failure().code(128);
}
