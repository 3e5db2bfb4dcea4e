//! Lane assignment for arriving vehicles
//!
//! When several parallel lanes serve the same movement, a [`LaneSelector`] picks the
//! one a new vehicle joins. Selectors only see the candidate lanes, never the queues.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

use super::error::{Result, SimError};
use super::layout::Lane;
use super::types::LaneId;

/// Strategy choosing one lane out of a non-empty candidate list
pub trait LaneSelector {
    fn select(&mut self, lanes: &[&Lane]) -> Result<LaneId>;
}

/// Picks a lane uniformly at random
#[derive(Debug, Default)]
pub struct RandomLaneSelector {
    /// Optional seeded RNG for reproducible simulations
    rng: Option<StdRng>,
}

impl RandomLaneSelector {
    pub fn new() -> Self {
        Self { rng: None }
    }

    /// Create a selector with a seeded RNG for reproducible simulations
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Some(StdRng::seed_from_u64(seed)),
        }
    }
}

impl LaneSelector for RandomLaneSelector {
    fn select(&mut self, lanes: &[&Lane]) -> Result<LaneId> {
        let chosen = match &mut self.rng {
            Some(rng) => lanes.choose(rng),
            None => lanes.choose(&mut rand::rng()),
        };
        chosen.map(|lane| lane.id().clone()).ok_or(SimError::NoLanes)
    }
}

/// Always picks the first candidate lane
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstLaneSelector;

impl LaneSelector for FirstLaneSelector {
    fn select(&mut self, lanes: &[&Lane]) -> Result<LaneId> {
        lanes
            .first()
            .map(|lane| lane.id().clone())
            .ok_or(SimError::NoLanes)
    }
}
