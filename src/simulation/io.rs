//! JSON command files
//!
//! Input is a list of commands (`addVehicle`, `step`); output holds one status per
//! `step` command listing the vehicles that left the intersection on that tick.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::engine::Intersection;
use super::error::Result;
use super::types::{Direction, Movement, VehicleId};
use super::vehicle::Vehicle;

/// One entry of the input command list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    #[serde(rename_all = "camelCase")]
    AddVehicle {
        vehicle_id: VehicleId,
        start_road: Direction,
        end_road: Direction,
    },
    Step,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationInput {
    pub commands: Vec<Command>,
}

/// Vehicles that left the intersection during one `step` command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepStatus {
    pub left_vehicles: Vec<VehicleId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationOutput {
    pub step_statuses: Vec<StepStatus>,
}

pub fn read_input(path: impl AsRef<Path>) -> Result<SimulationInput> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

pub fn write_output(path: impl AsRef<Path>, output: &SimulationOutput) -> Result<()> {
    let json = serde_json::to_string_pretty(output)?;
    fs::write(path, json)?;
    Ok(())
}

/// Execute `commands` in order against `intersection`
///
/// Stops at the first failing command and returns its error.
pub fn run_commands(
    intersection: &mut Intersection,
    commands: &[Command],
) -> Result<SimulationOutput> {
    let mut output = SimulationOutput::default();

    for command in commands {
        match command {
            Command::AddVehicle {
                vehicle_id,
                start_road,
                end_road,
            } => {
                let movement = Movement::new(*start_road, *end_road);
                debug!("adding vehicle {} ({})", vehicle_id, movement);
                intersection.add_vehicle(Vehicle::new(vehicle_id.clone(), movement))?;
            }
            Command::Step => {
                let result = intersection.step()?;
                if !result.left_intersection.is_empty() {
                    info!(
                        "tick {}: {} vehicle(s) left the intersection",
                        result.tick,
                        result.left_intersection.len()
                    );
                }
                output.step_statuses.push(StepStatus {
                    left_vehicles: result.left_intersection,
                });
            }
        }
    }

    Ok(output)
}
