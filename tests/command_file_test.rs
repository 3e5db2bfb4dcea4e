//! JSON command file round trip and CLI smoke tests

use std::fs;
use std::process::Command;

use signal_sim::simulation::{
    read_input, run_commands, write_output, AdaptiveController, ControllerConfig,
    FirstLaneSelector, Intersection, IntersectionLayout, SimError, StepStatus, VehicleId,
};

const INPUT: &str = r#"{
  "commands": [
    {"type": "addVehicle", "vehicleId": "vehicle1", "startRoad": "south", "endRoad": "north"},
    {"type": "addVehicle", "vehicleId": "vehicle2", "startRoad": "north", "endRoad": "south"},
    {"type": "step"},
    {"type": "step"},
    {"type": "addVehicle", "vehicleId": "vehicle3", "startRoad": "west", "endRoad": "south"},
    {"type": "step"},
    {"type": "step"}
  ]
}"#;

fn ns_ew_intersection() -> Intersection {
    let controller = AdaptiveController::new(ControllerConfig {
        min_green: 3,
        max_green: 5,
        phases: Some(vec![
            vec!["sg-north".into(), "sg-south".into()],
            vec!["sg-east".into(), "sg-west".into()],
        ]),
    })
    .unwrap();
    Intersection::new(
        IntersectionLayout::four_way().unwrap(),
        controller,
        FirstLaneSelector,
    )
    .unwrap()
}

fn left(ids: &[&str]) -> StepStatus {
    StepStatus {
        left_vehicles: ids.iter().map(|id| VehicleId::from(*id)).collect(),
    }
}

#[test]
fn test_command_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("input.json");
    let output_path = dir.path().join("output.json");
    fs::write(&input_path, INPUT).unwrap();

    let input = read_input(&input_path).unwrap();
    assert_eq!(input.commands.len(), 7);

    let mut intersection = ns_ew_intersection();
    let output = run_commands(&mut intersection, &input.commands).unwrap();

    // Tick 1 red-yellow, tick 2 green with both straights admitted, tick 3 exits
    assert_eq!(
        output.step_statuses,
        vec![left(&[]), left(&[]), left(&["vehicle2", "vehicle1"]), left(&[])]
    );

    write_output(&output_path, &output).unwrap();
    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(
        written,
        serde_json::json!({
            "stepStatuses": [
                {"leftVehicles": []},
                {"leftVehicles": []},
                {"leftVehicles": ["vehicle2", "vehicle1"]},
                {"leftVehicles": []}
            ]
        })
    );
}

#[test]
fn test_duplicate_vehicle_aborts_run() {
    let json = r#"{"commands": [
        {"type": "addVehicle", "vehicleId": "v1", "startRoad": "east", "endRoad": "west"},
        {"type": "addVehicle", "vehicleId": "v1", "startRoad": "west", "endRoad": "east"}
    ]}"#;
    let input: signal_sim::simulation::SimulationInput = serde_json::from_str(json).unwrap();
    let mut intersection = ns_ew_intersection();
    assert!(matches!(
        run_commands(&mut intersection, &input.commands),
        Err(SimError::DuplicateVehicle(_))
    ));
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        read_input(dir.path().join("missing.json")),
        Err(SimError::Io(_))
    ));

    let bad = dir.path().join("bad.json");
    fs::write(&bad, r#"{"commands": [{"type": "fly"}]}"#).unwrap();
    assert!(matches!(read_input(&bad), Err(SimError::Json(_))));
}

#[test]
fn test_cli_runs_command_file() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("input.json");
    let output_path = dir.path().join("output.json");
    fs::write(&input_path, INPUT).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_signal_sim"))
        .arg(&input_path)
        .arg(&output_path)
        .args(["--phase", "sg-north,sg-south", "--phase", "sg-east,sg-west"])
        .args(["--seed", "1"])
        .env("RUST_LOG", "info")
        .output()
        .expect("Failed to execute simulation");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "Simulation failed. stderr: {}", stderr);
    assert!(
        stderr.contains("SIMULATION COMPLETE"),
        "Missing summary. stderr: {}",
        stderr
    );
    assert!(stderr.contains("Total vehicles added: 3"), "stderr: {}", stderr);

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(written["stepStatuses"].as_array().unwrap().len(), 4);
    assert_eq!(
        written["stepStatuses"][2]["leftVehicles"],
        serde_json::json!(["vehicle2", "vehicle1"])
    );
}

/// Runs the binary on `INPUT` and returns the parsed step statuses
fn run_cli(extra_args: &[&str]) -> serde_json::Value {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("input.json");
    let output_path = dir.path().join("output.json");
    fs::write(&input_path, INPUT).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_signal_sim"))
        .arg(&input_path)
        .arg(&output_path)
        .args(extra_args)
        .output()
        .expect("Failed to execute simulation");
    assert!(
        output.status.success(),
        "Simulation failed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
    written["stepStatuses"].clone()
}

#[test]
fn test_cli_pairs_opposing_approaches_by_default() {
    let statuses = run_cli(&["--seed", "1"]);
    assert_eq!(statuses.as_array().unwrap().len(), 4);
    assert_eq!(
        statuses[2]["leftVehicles"],
        serde_json::json!(["vehicle2", "vehicle1"])
    );
}

#[test]
fn test_cli_auto_phases_serve_one_approach_at_a_time() {
    // Every four-way group allows left turns, so each approach gets its own phase
    let statuses = run_cli(&["--seed", "1", "--auto-phases"]);
    assert_eq!(statuses[2]["leftVehicles"], serde_json::json!(["vehicle2"]));
}

#[test]
fn test_cli_rejects_invalid_green_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("input.json");
    fs::write(&input_path, INPUT).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_signal_sim"))
        .arg(&input_path)
        .arg(dir.path().join("output.json"))
        .args(["--min-green", "4", "--max-green", "2"])
        .output()
        .expect("Failed to execute simulation");

    assert!(!output.status.success());
    assert!(!dir.path().join("output.json").exists());
}
