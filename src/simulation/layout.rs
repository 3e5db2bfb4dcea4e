//! Static intersection geometry
//!
//! Lanes, roads, signal groups and the layout that ties them together. All of these
//! are validated on construction and never change afterwards.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::error::{Result, SimError};
use super::types::{Direction, LaneId, Movement, SignalGroupId};

/// A single lane on an approach
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lane {
    id: LaneId,
    approach: Direction,
    movements: BTreeSet<Movement>,
}

impl Lane {
    pub fn new(
        id: impl Into<LaneId>,
        approach: Direction,
        movements: impl IntoIterator<Item = Movement>,
    ) -> Result<Self> {
        let id = id.into();
        let movements: BTreeSet<Movement> = movements.into_iter().collect();

        if movements.is_empty() {
            return Err(SimError::EmptyLane(id));
        }
        if let Some(movement) = movements.iter().find(|m| m.from != approach) {
            return Err(SimError::LaneApproachMismatch {
                lane: id,
                approach,
                movement: *movement,
            });
        }

        Ok(Self {
            id,
            approach,
            movements,
        })
    }

    pub fn id(&self) -> &LaneId {
        &self.id
    }

    pub fn approach(&self) -> Direction {
        self.approach
    }

    pub fn movements(&self) -> &BTreeSet<Movement> {
        &self.movements
    }

    pub fn allows(&self, movement: &Movement) -> bool {
        self.movements.contains(movement)
    }
}

/// All lanes entering the intersection from one direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Road {
    approach: Direction,
    lanes: Vec<Lane>,
}

impl Road {
    pub fn new(approach: Direction, lanes: Vec<Lane>) -> Result<Self> {
        if lanes.is_empty() {
            return Err(SimError::EmptyRoad(approach));
        }

        let mut seen = HashSet::new();
        for lane in &lanes {
            if lane.approach != approach {
                return Err(SimError::RoadApproachMismatch {
                    lane: lane.id.clone(),
                    lane_approach: lane.approach,
                    road_approach: approach,
                });
            }
            if !seen.insert(&lane.id) {
                return Err(SimError::DuplicateLane {
                    road: approach,
                    lane: lane.id.clone(),
                });
            }
        }

        Ok(Self { approach, lanes })
    }

    pub fn approach(&self) -> Direction {
        self.approach
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn movements(&self) -> impl Iterator<Item = &Movement> {
        self.lanes.iter().flat_map(|lane| lane.movements.iter())
    }

    /// Lanes on this road that serve a turn towards `to`, in road order
    pub fn lanes_allowing(&self, to: Direction) -> Vec<&Lane> {
        let movement = Movement::new(self.approach, to);
        self.lanes
            .iter()
            .filter(|lane| lane.allows(&movement))
            .collect()
    }
}

/// A named set of movements sharing one signal indication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalGroup {
    id: SignalGroupId,
    movements: BTreeSet<Movement>,
}

impl SignalGroup {
    pub fn new(
        id: impl Into<SignalGroupId>,
        movements: impl IntoIterator<Item = Movement>,
    ) -> Result<Self> {
        let id = id.into();
        let movements: BTreeSet<Movement> = movements.into_iter().collect();
        if movements.is_empty() {
            return Err(SimError::EmptySignalGroup(id));
        }
        Ok(Self { id, movements })
    }

    pub fn id(&self) -> &SignalGroupId {
        &self.id
    }

    pub fn movements(&self) -> &BTreeSet<Movement> {
        &self.movements
    }

    pub fn controls(&self, movement: &Movement) -> bool {
        self.movements.contains(movement)
    }

    /// Approaches whose traffic this group releases
    pub fn approaches(&self) -> BTreeSet<Direction> {
        self.movements.iter().map(|m| m.from).collect()
    }
}

/// Complete static description of one intersection
#[derive(Debug, Clone)]
pub struct IntersectionLayout {
    roads: BTreeMap<Direction, Road>,
    movements: BTreeSet<Movement>,
    signal_groups: Vec<SignalGroup>,
}

impl IntersectionLayout {
    pub fn new(roads: Vec<Road>, signal_groups: Vec<SignalGroup>) -> Result<Self> {
        if signal_groups.is_empty() {
            return Err(SimError::NoSignalGroups);
        }

        let mut group_ids = HashSet::new();
        for group in &signal_groups {
            if !group_ids.insert(&group.id) {
                return Err(SimError::DuplicateSignalGroup(group.id.clone()));
            }
        }

        let mut road_map = BTreeMap::new();
        let mut lane_ids = HashSet::new();
        for road in roads {
            for lane in &road.lanes {
                if !lane_ids.insert(lane.id.clone()) {
                    return Err(SimError::LaneOnSeveralRoads(lane.id.clone()));
                }
            }
            let approach = road.approach;
            if road_map.insert(approach, road).is_some() {
                return Err(SimError::DuplicateRoad(approach));
            }
        }

        let movements: BTreeSet<Movement> = road_map
            .values()
            .flat_map(|road| road.movements().copied())
            .collect();

        if let Some(uncovered) = movements
            .iter()
            .find(|m| !signal_groups.iter().any(|g| g.controls(m)))
        {
            return Err(SimError::UncoveredMovement(*uncovered));
        }

        Ok(Self {
            roads: road_map,
            movements,
            signal_groups,
        })
    }

    /// Standard four-way intersection: one lane per approach allowing every movement
    /// (U-turns included) and one signal group per approach.
    ///
    /// Lanes are named `north-0`, `east-0`, ... and signal groups `sg-north`, `sg-east`, ...
    pub fn four_way() -> Result<Self> {
        let mut roads = Vec::new();
        let mut groups = Vec::new();

        for from in Direction::ALL {
            let lane = Lane::new(format!("{}-0", from.name()), from, Movement::all_from(from))?;
            roads.push(Road::new(from, vec![lane])?);
            groups.push(SignalGroup::new(
                format!("sg-{}", from.name()),
                Movement::all_from(from),
            )?);
        }

        Self::new(roads, groups)
    }

    /// Lanes serving `movement`, in road order
    pub fn lanes_for(&self, movement: &Movement) -> Vec<&Lane> {
        self.roads
            .get(&movement.from)
            .map(|road| road.lanes_allowing(movement.to))
            .unwrap_or_default()
    }

    /// Signal groups controlling `movement`, in layout order
    pub fn groups_for<'a>(
        &'a self,
        movement: &'a Movement,
    ) -> impl Iterator<Item = &'a SignalGroup> {
        self.signal_groups.iter().filter(move |g| g.controls(movement))
    }

    pub fn road(&self, approach: Direction) -> Option<&Road> {
        self.roads.get(&approach)
    }

    pub fn roads(&self) -> impl Iterator<Item = &Road> {
        self.roads.values()
    }

    /// Approaches that have a road, in N, E, S, W order
    pub fn approaches(&self) -> impl Iterator<Item = Direction> + '_ {
        self.roads.keys().copied()
    }

    /// Every lane of every road, roads in N, E, S, W order
    pub fn lanes(&self) -> impl Iterator<Item = &Lane> {
        self.roads.values().flat_map(|road| road.lanes.iter())
    }

    pub fn lane_ids(&self) -> impl Iterator<Item = &LaneId> {
        self.lanes().map(Lane::id)
    }

    pub fn all_movements(&self) -> &BTreeSet<Movement> {
        &self.movements
    }

    pub fn signal_groups(&self) -> &[SignalGroup] {
        &self.signal_groups
    }

    pub fn group_ids(&self) -> impl Iterator<Item = &SignalGroupId> {
        self.signal_groups.iter().map(|g| &g.id)
    }
}
