//! Vehicle lifecycle for the signal simulation
//!
//! A vehicle waits in a lane queue, crosses the intersection for a fixed number of
//! ticks and then exits. Each lifecycle operation checks the current state and
//! refuses transitions that make no sense.

use std::fmt;

use super::error::{Result, SimError};
use super::types::{Movement, VehicleId};

/// Where a vehicle is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleState {
    Queued,
    Crossing,
    Exited,
}

impl fmt::Display for VehicleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VehicleState::Queued => "QUEUED",
            VehicleState::Crossing => "CROSSING",
            VehicleState::Exited => "EXITED",
        };
        f.write_str(name)
    }
}

/// A vehicle in the signal simulation
#[derive(Debug, Clone)]
pub struct Vehicle {
    id: VehicleId,
    movement: Movement,
    state: VehicleState,
    /// Ticks spent waiting in a queue
    wait_time: u32,
    crossing_time_remaining: u32,
}

impl Vehicle {
    pub fn new(id: impl Into<VehicleId>, movement: Movement) -> Self {
        Self {
            id: id.into(),
            movement,
            state: VehicleState::Queued,
            wait_time: 0,
            crossing_time_remaining: 0,
        }
    }

    pub fn id(&self) -> &VehicleId {
        &self.id
    }

    pub fn movement(&self) -> Movement {
        self.movement
    }

    pub fn state(&self) -> VehicleState {
        self.state
    }

    pub fn wait_time(&self) -> u32 {
        self.wait_time
    }

    pub fn crossing_time_remaining(&self) -> u32 {
        self.crossing_time_remaining
    }

    fn require(&self, expected: VehicleState, action: &'static str) -> Result<()> {
        if self.state != expected {
            return Err(SimError::InvalidTransition {
                vehicle: self.id.clone(),
                action,
                state: self.state,
            });
        }
        Ok(())
    }

    /// Count one more tick of waiting in the queue
    pub fn increment_wait_time(&mut self) -> Result<()> {
        self.require(VehicleState::Queued, "increment wait time of")?;
        self.wait_time += 1;
        Ok(())
    }

    /// Enter the intersection for `crossing_time` ticks
    pub fn start_crossing(&mut self, crossing_time: u32) -> Result<()> {
        self.require(VehicleState::Queued, "start crossing with")?;
        if crossing_time == 0 {
            return Err(SimError::InvalidCrossingTime);
        }
        self.state = VehicleState::Crossing;
        self.crossing_time_remaining = crossing_time;
        Ok(())
    }

    /// Advance the crossing by one tick
    /// Returns true if the vehicle left the intersection on this tick
    pub fn tick_crossing(&mut self) -> Result<bool> {
        self.require(VehicleState::Crossing, "tick crossing of")?;
        self.crossing_time_remaining -= 1;
        if self.crossing_time_remaining == 0 {
            self.state = VehicleState::Exited;
            return Ok(true);
        }
        Ok(false)
    }
}
