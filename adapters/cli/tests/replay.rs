use std::{fs, path::PathBuf, process::Command};

const SCENARIO: &str = r#"[
    {"me": 0, "width": 240.0, "height": 160.0, "planets": [
        {"id": 0, "position": {"x": 10.0, "y": 16.0}, "radius": 3.0,
         "owner": null, "docking_spots": 1}
    ]},
    {"me": "nobody"},
    {"me": 0, "width": 240.0, "height": 160.0,
     "units": [
        {"id": 1, "owner": 0, "position": {"x": 10.0, "y": 10.0}, "docking": "undocked"}
     ],
     "planets": [
        {"id": 0, "position": {"x": 10.0, "y": 16.0}, "radius": 3.0,
         "owner": null, "docking_spots": 1}
    ]}
]"#;

fn write_fixture(name: &str, contents: &str) -> PathBuf {
    let path = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn fleet_policy() -> Command {
    Command::new(env!("CARGO_BIN_EXE_fleet-policy"))
}

#[test]
fn replay_prints_one_line_per_turn() {
    let scenario = write_fixture("replay_lines.json", SCENARIO);

    let output = fleet_policy()
        .arg("--scenario")
        .arg(&scenario)
        .output()
        .expect("run fleet-policy");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8(output.stdout).expect("utf8 stdout"), "\n\nd 1 0\n");
}

#[test]
fn unreadable_phase_table_fails_the_run() {
    let scenario = write_fixture("replay_bad_profiles.json", SCENARIO);
    let profiles = write_fixture("replay_bad_profiles.toml", "bands = 3\n");

    let output = fleet_policy()
        .arg("--scenario")
        .arg(&scenario)
        .arg("--profiles")
        .arg(&profiles)
        .output()
        .expect("run fleet-policy");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn missing_scenario_fails_the_run() {
    let output = fleet_policy()
        .arg("--scenario")
        .arg(PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("no_such_scenario.json"))
        .output()
        .expect("run fleet-policy");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
