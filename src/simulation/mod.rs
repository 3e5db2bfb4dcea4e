//! Signalized intersection simulation
//!
//! A discrete-time model of one four-approach intersection: vehicles queue in lanes,
//! a controller drives the signal groups and the engine admits conflict-free
//! movements each tick.

mod conflict;
mod controller;
mod engine;
mod error;
mod io;
mod lane_selector;
mod layout;
mod signal;
mod stats;
mod types;
mod vehicle;

pub use conflict::{conflict_graph, conflicts, groups_conflict};
pub use controller::{
    AdaptiveController, Controller, ControllerConfig, FixedController, Phase, Stage,
    DEFAULT_MAX_GREEN, DEFAULT_MIN_GREEN,
};
pub use engine::{Intersection, IntersectionSnapshot, StepResult};
pub use error::{Result, SimError};
pub use io::{
    read_input, run_commands, write_output, Command, SimulationInput, SimulationOutput, StepStatus,
};
pub use lane_selector::{FirstLaneSelector, LaneSelector, RandomLaneSelector};
pub use layout::{IntersectionLayout, Lane, Road, SignalGroup};
pub use signal::{SignalCommand, SignalState};
pub use stats::SimulationStats;
pub use types::{
    Direction, LaneId, Movement, SignalGroupId, TurnType, VehicleId, CLOCKWISE_TURN,
    COUNTER_CLOCKWISE_TURN, CROSSING_TIME,
};
pub use vehicle::{Vehicle, VehicleState};
