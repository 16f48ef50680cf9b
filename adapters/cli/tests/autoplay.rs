use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dam-defense"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to launch dam-defense")
}

#[test]
fn short_run_prints_the_session_summary() {
    let output = run(&["--max-seconds", "5", "--tower", "1:agile", "--tower", "2:capable"]);

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("status:  Playing"), "{stdout}");
    assert!(stdout.contains("stage:   1 wave 1"), "{stdout}");
    assert!(stdout.contains("dam:     100/100"), "{stdout}");
}

#[test]
fn malformed_tower_plan_is_refused() {
    let output = run(&["--max-seconds", "1", "--tower", "1:archer"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("'archer' is not a tower family"), "{stderr}");
}
