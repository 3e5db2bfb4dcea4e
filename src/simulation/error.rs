//! Error types for the signal simulation
//!
//! Every fallible library operation returns [`SimError`]. Configuration errors are
//! raised while building layouts and controllers, usage errors when a caller drives
//! the engine or a vehicle incorrectly.

use thiserror::Error;

use super::types::{Direction, LaneId, Movement, SignalGroupId, VehicleId};
use super::vehicle::VehicleState;

/// Errors produced by the simulation core
#[derive(Debug, Error)]
pub enum SimError {
    #[error("minGreen must be at least 1 (got {0})")]
    MinGreenTooSmall(u32),
    #[error("maxGreen ({max}) must be >= minGreen ({min})")]
    MaxGreenBelowMin { min: u32, max: u32 },
    #[error("explicit phase configuration is empty")]
    EmptyPhaseConfig,
    #[error("unknown signal group: {0}")]
    UnknownSignalGroup(SignalGroupId),

    #[error("signal groups cannot be empty")]
    NoSignalGroups,
    #[error("signal group {0} must control at least one movement")]
    EmptySignalGroup(SignalGroupId),
    #[error("signal group id {0} is used more than once")]
    DuplicateSignalGroup(SignalGroupId),
    #[error("movement {0} is not covered by any signal group")]
    UncoveredMovement(Movement),
    #[error("lane {0} must allow at least one movement")]
    EmptyLane(LaneId),
    #[error("movement {movement} is not compatible with lane {lane} approach {approach}")]
    LaneApproachMismatch {
        lane: LaneId,
        approach: Direction,
        movement: Movement,
    },
    #[error("road {0} must have at least one lane")]
    EmptyRoad(Direction),
    #[error("lane {lane} approaches from {lane_approach} but its road is {road_approach}")]
    RoadApproachMismatch {
        lane: LaneId,
        lane_approach: Direction,
        road_approach: Direction,
    },
    #[error("lane id {lane} is used more than once on road {road}")]
    DuplicateLane { road: Direction, lane: LaneId },
    #[error("lane id {0} is used on more than one road")]
    LaneOnSeveralRoads(LaneId),
    #[error("road for approach {0} is defined more than once")]
    DuplicateRoad(Direction),

    #[error("controller not initialized")]
    ControllerNotInitialized,
    #[error("vehicle with id {0} already exists")]
    DuplicateVehicle(VehicleId),
    #[error("no lanes available for movement {0}")]
    NoLaneForMovement(Movement),
    #[error("lane selection requires at least one lane")]
    NoLanes,
    #[error("lane selector returned unknown lane {0}")]
    UnknownLane(LaneId),
    #[error("cannot {action} vehicle {vehicle} when state is {state}")]
    InvalidTransition {
        vehicle: VehicleId,
        action: &'static str,
        state: VehicleState,
    },
    #[error("crossing time must be positive")]
    InvalidCrossingTime,

    #[error("unknown road name: {0}")]
    UnknownDirection(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
