//! End-to-end checks of the `lower` subcommand against the built-in demo
//! pipeline (`g` called twice by `f`), covering the split/vectorize/chunk
//! and inline scheduling scenarios by running the actual compiled binary
//! and inspecting its printed statement tree.

use std::process::Command;

fn run_lower(schedule: &str) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_loopweave"))
        .args(["lower", "--schedule", schedule, "--format", "text"])
        .output()
        .expect("failed to run loopweave binary");
    assert!(
        output.status.success(),
        "loopweave lower --schedule {schedule} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout is valid UTF-8")
}

#[test]
fn chunked_schedule_allocates_g_and_vectorizes_away_the_inner_split() {
    let out = run_lower("chunked");

    assert!(out.contains("for (serial f.y"), "missing the untouched f.y loop:\n{out}");
    assert!(out.contains("for (parallel f.x_o"), "missing the parallelized outer split:\n{out}");
    assert!(!out.contains("f.x_i"), "the vectorized inner split should not survive as a loop:\n{out}");
    assert!(out.contains("allocate g["), "g should be realized into its own allocation:\n{out}");
    assert!(!out.contains("g("), "no Halide-kind call to g should remain after flattening:\n{out}");
}

#[test]
fn inline_schedule_has_no_allocation_for_g() {
    let out = run_lower("inline");

    assert!(!out.contains("allocate g["), "inlined g should never be realized:\n{out}");
    assert!(!out.contains("g("), "inlined g should leave no call node behind:\n{out}");
    assert!(out.contains("for (parallel f.x_o"), "f's own schedule is unaffected by g's:\n{out}");
}

#[test]
fn print_expr_reproduces_the_canonical_form() {
    let output = Command::new(env!("CARGO_BIN_EXE_loopweave"))
        .arg("print-expr")
        .output()
        .expect("failed to run loopweave binary");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.trim(), "((x + 3)*((y/2) + 17))");
}
