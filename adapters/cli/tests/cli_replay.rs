use std::path::PathBuf;
use std::process::{Command, Output};

fn lift_scenario() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../scenarios/lift.toml")
}

fn pistonworks(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pistonworks"))
        .args(args)
        .arg(lift_scenario())
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to invoke pistonworks binary")
}

fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "pistonworks failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).expect("utf-8 output")
}

#[test]
fn run_replays_lift_until_fully_retracted() {
    let stdout = stdout_of(&pistonworks(&["run"]));

    assert_eq!(stdout.matches("Extend -> Ok").count(), 2);
    assert_eq!(stdout.matches("Retract -> Ok").count(), 3);
    assert!(stdout.contains("step 1: actuator"));
    assert!(stdout.ends_with("length 16 px\n"), "unexpected output:\n{stdout}");
}

#[test]
fn inspect_lists_the_decomposed_ship() {
    let stdout = stdout_of(&pistonworks(&["inspect"]));

    assert!(stdout.starts_with("terrain at [0, 80] with 10 solid tiles\n"));
    assert!(stdout.contains("ship of 2 structures and 1 actuators"));
    assert!(stdout.contains("length 32 px"));
    assert!(!stdout.contains("step "));
}

#[test]
fn pick_reports_the_actuator_under_the_point() {
    let stdout = stdout_of(&pistonworks(&["pick", "--x", "88", "--y", "32"]));
    assert!(stdout.contains("at distance 0 px"), "unexpected output:\n{stdout}");

    let stdout = stdout_of(&pistonworks(&["pick", "--x", "-200", "--y", "32"]));
    assert!(stdout.starts_with("no actuator within 8 px"));
}
