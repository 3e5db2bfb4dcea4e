//! Intersection simulation engine
//!
//! Owns the lane queues, the vehicles and the live signal table. Each call to
//! [`Intersection::step`] runs one tick in a fixed order: snapshot, controller
//! decision, command application, exits, admissions, wait accounting.

use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use super::conflict::conflicts;
use super::controller::Controller;
use super::error::{Result, SimError};
use super::lane_selector::LaneSelector;
use super::layout::IntersectionLayout;
use super::signal::{SignalCommand, SignalState};
use super::stats::SimulationStats;
use super::types::{Direction, LaneId, Movement, SignalGroupId, VehicleId, CROSSING_TIME};
use super::vehicle::{Vehicle, VehicleState};

/// Read-only view of the intersection handed to the controller each tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntersectionSnapshot {
    pub tick: u64,
    pub signal_states: BTreeMap<SignalGroupId, SignalState>,
    pub queue_lengths: BTreeMap<LaneId, usize>,
    /// Queued vehicles per approach, summed over the approach's lanes
    pub waiting_per_approach: BTreeMap<Direction, usize>,
    /// Movements of vehicles still on the intersection from earlier ticks
    pub crossing_movements: BTreeSet<Movement>,
}

/// Outcome of one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub tick: u64,
    pub signal_states: BTreeMap<SignalGroupId, SignalState>,
    /// Vehicles that finished crossing this tick, in admission order
    pub left_intersection: Vec<VehicleId>,
    /// Queue length of every lane after admissions
    pub queue_lengths: BTreeMap<LaneId, usize>,
}

#[derive(Debug)]
struct LaneQueue {
    lane: LaneId,
    approach: Direction,
    vehicles: VecDeque<VehicleId>,
}

/// A signalized intersection being simulated
pub struct Intersection {
    layout: IntersectionLayout,
    controller: Box<dyn Controller>,
    selector: Box<dyn LaneSelector>,

    /// Every vehicle ever added, including those that have exited
    vehicles: HashMap<VehicleId, Vehicle>,
    /// One FIFO queue per lane, in layout order
    lane_queues: Vec<LaneQueue>,
    lane_index: HashMap<LaneId, usize>,
    signal_states: BTreeMap<SignalGroupId, SignalState>,
    /// Vehicles currently crossing, in admission order
    on_intersection: Vec<VehicleId>,

    tick: u64,
    stats: SimulationStats,
}

impl Intersection {
    /// Create the engine and initialize `controller` against `layout`
    ///
    /// Every signal group starts RED.
    pub fn new(
        layout: IntersectionLayout,
        controller: impl Controller + 'static,
        selector: impl LaneSelector + 'static,
    ) -> Result<Self> {
        let mut controller: Box<dyn Controller> = Box::new(controller);
        controller.initialize(&layout)?;

        let lane_queues: Vec<LaneQueue> = layout
            .lanes()
            .map(|lane| LaneQueue {
                lane: lane.id().clone(),
                approach: lane.approach(),
                vehicles: VecDeque::new(),
            })
            .collect();
        let lane_index = lane_queues
            .iter()
            .enumerate()
            .map(|(i, q)| (q.lane.clone(), i))
            .collect();
        let signal_states = layout
            .group_ids()
            .map(|id| (id.clone(), SignalState::Red))
            .collect();

        Ok(Self {
            layout,
            controller,
            selector: Box::new(selector),
            vehicles: HashMap::new(),
            lane_queues,
            lane_index,
            signal_states,
            on_intersection: Vec::new(),
            tick: 0,
            stats: SimulationStats::default(),
        })
    }

    pub fn layout(&self) -> &IntersectionLayout {
        &self.layout
    }

    /// Number of ticks simulated so far
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    pub fn vehicle(&self, id: &VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(id)
    }

    pub fn signal_state(&self, group: &SignalGroupId) -> Option<SignalState> {
        self.signal_states.get(group).copied()
    }

    pub fn signal_states(&self) -> &BTreeMap<SignalGroupId, SignalState> {
        &self.signal_states
    }

    pub fn queue_length(&self, lane: &LaneId) -> Option<usize> {
        self.lane_index
            .get(lane)
            .map(|&i| self.lane_queues[i].vehicles.len())
    }

    /// Queue a new vehicle on a lane serving its movement
    pub fn add_vehicle(&mut self, vehicle: Vehicle) -> Result<()> {
        if self.vehicles.contains_key(vehicle.id()) {
            return Err(SimError::DuplicateVehicle(vehicle.id().clone()));
        }
        if vehicle.state() != VehicleState::Queued {
            return Err(SimError::InvalidTransition {
                vehicle: vehicle.id().clone(),
                action: "enqueue",
                state: vehicle.state(),
            });
        }

        let movement = vehicle.movement();
        let lanes = self.layout.lanes_for(&movement);
        if lanes.is_empty() {
            return Err(SimError::NoLaneForMovement(movement));
        }

        let lane = self.selector.select(&lanes)?;
        let index = *self
            .lane_index
            .get(&lane)
            .ok_or_else(|| SimError::UnknownLane(lane.clone()))?;

        debug!("vehicle {} ({}) queued on lane {}", vehicle.id(), movement, lane);
        self.lane_queues[index]
            .vehicles
            .push_back(vehicle.id().clone());
        self.vehicles.insert(vehicle.id().clone(), vehicle);
        self.stats.record_added();
        Ok(())
    }

    /// Advance the simulation by one tick
    pub fn step(&mut self) -> Result<StepResult> {
        let tick = self.tick + 1;

        let snapshot = self.snapshot(tick);
        let commands = self.controller.decide(&snapshot)?;
        self.tick = tick;
        self.stats.ticks = tick;

        self.apply_commands(commands);
        let left_intersection = self.exit_vehicles()?;
        self.admit_vehicles()?;
        self.accumulate_wait()?;

        Ok(StepResult {
            tick,
            signal_states: self.signal_states.clone(),
            left_intersection,
            queue_lengths: self.queue_lengths(),
        })
    }

    fn queue_lengths(&self) -> BTreeMap<LaneId, usize> {
        self.lane_queues
            .iter()
            .map(|q| (q.lane.clone(), q.vehicles.len()))
            .collect()
    }

    fn snapshot(&self, tick: u64) -> IntersectionSnapshot {
        let mut waiting_per_approach: BTreeMap<Direction, usize> =
            self.layout.approaches().map(|d| (d, 0)).collect();
        for queue in &self.lane_queues {
            *waiting_per_approach.entry(queue.approach).or_default() += queue.vehicles.len();
        }

        let crossing_movements = self
            .on_intersection
            .iter()
            .filter_map(|id| self.vehicles.get(id))
            .filter(|v| v.state() == VehicleState::Crossing)
            .map(Vehicle::movement)
            .collect();

        IntersectionSnapshot {
            tick,
            signal_states: self.signal_states.clone(),
            queue_lengths: self.queue_lengths(),
            waiting_per_approach,
            crossing_movements,
        }
    }

    fn apply_commands(&mut self, commands: Vec<SignalCommand>) {
        for command in commands {
            match self.signal_states.get_mut(&command.group) {
                Some(state) => *state = command.state,
                None => debug!("ignoring command for unknown signal group {}", command.group),
            }
        }
    }

    /// Advance every crossing vehicle; returns those that left, in admission order
    fn exit_vehicles(&mut self) -> Result<Vec<VehicleId>> {
        let mut exited = Vec::new();
        let mut still_crossing = Vec::new();

        for id in std::mem::take(&mut self.on_intersection) {
            let Some(vehicle) = self.vehicles.get_mut(&id) else {
                continue;
            };
            if vehicle.tick_crossing()? {
                self.stats.record_exit(vehicle.wait_time());
                exited.push(id);
            } else {
                still_crossing.push(id);
            }
        }

        self.on_intersection = still_crossing;
        Ok(exited)
    }

    /// Whether any signal group controlling `movement` currently permits entry
    fn has_green(&self, movement: &Movement) -> bool {
        self.layout.groups_for(movement).any(|group| {
            self.signal_states
                .get(group.id())
                .is_some_and(|state| state.permits_entry())
        })
    }

    /// Admit queue heads that have green and do not conflict with anything
    /// admitted earlier in the same tick
    fn admit_vehicles(&mut self) -> Result<()> {
        let mut candidates: Vec<(usize, VehicleId, Movement)> = Vec::new();
        for (index, queue) in self.lane_queues.iter().enumerate() {
            let Some(head) = queue.vehicles.front() else {
                continue;
            };
            let Some(vehicle) = self.vehicles.get(head) else {
                continue;
            };
            let movement = vehicle.movement();
            if self.has_green(&movement) {
                candidates.push((index, head.clone(), movement));
            }
        }

        // Stable sort keeps lane order among equal turn types
        candidates.sort_by_key(|(_, _, movement)| movement.turn_type().admission_priority());

        let mut admitted: Vec<Movement> = Vec::new();
        for (index, id, movement) in candidates {
            if admitted.iter().any(|other| conflicts(other, &movement)) {
                continue;
            }
            let Some(vehicle) = self.vehicles.get_mut(&id) else {
                continue;
            };
            vehicle.start_crossing(CROSSING_TIME)?;
            self.lane_queues[index].vehicles.pop_front();
            self.on_intersection.push(id.clone());
            admitted.push(movement);
            debug!("tick {}: vehicle {} entered ({})", self.tick, id, movement);
        }

        Ok(())
    }

    fn accumulate_wait(&mut self) -> Result<()> {
        for queue in &self.lane_queues {
            for id in &queue.vehicles {
                if let Some(vehicle) = self.vehicles.get_mut(id) {
                    vehicle.increment_wait_time()?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::controller::FixedController;
    use crate::simulation::lane_selector::FirstLaneSelector;

    fn mv(from: Direction, to: Direction) -> Movement {
        Movement::new(from, to)
    }

    fn green(groups: &[&str]) -> Intersection {
        let commands = groups
            .iter()
            .map(|g| SignalCommand::new(*g, SignalState::Green))
            .collect();
        Intersection::new(
            IntersectionLayout::four_way().unwrap(),
            FixedController::repeating(commands),
            FirstLaneSelector,
        )
        .unwrap()
    }

    #[test]
    fn test_all_groups_start_red() {
        let intersection = green(&[]);
        assert_eq!(intersection.signal_states().len(), 4);
        assert!(intersection
            .signal_states()
            .values()
            .all(|s| *s == SignalState::Red));
        assert_eq!(intersection.tick(), 0);
    }

    #[test]
    fn test_snapshot_counts_waiting_per_approach() {
        let mut intersection = green(&[]);
        intersection
            .add_vehicle(Vehicle::new("v1", mv(Direction::South, Direction::North)))
            .unwrap();
        intersection
            .add_vehicle(Vehicle::new("v2", mv(Direction::South, Direction::East)))
            .unwrap();
        intersection
            .add_vehicle(Vehicle::new("v3", mv(Direction::East, Direction::West)))
            .unwrap();

        let snapshot = intersection.snapshot(1);
        assert_eq!(snapshot.waiting_per_approach[&Direction::South], 2);
        assert_eq!(snapshot.waiting_per_approach[&Direction::East], 1);
        assert_eq!(snapshot.waiting_per_approach[&Direction::North], 0);
        assert_eq!(snapshot.queue_lengths[&LaneId::from("south-0")], 2);
        assert!(snapshot.crossing_movements.is_empty());
    }

    #[test]
    fn test_exits_keep_unfinished_crossings() {
        let mut intersection = green(&[]);
        let id = VehicleId::from("slow");
        let mut vehicle = Vehicle::new(id.clone(), mv(Direction::South, Direction::North));
        vehicle.start_crossing(2).unwrap();
        intersection.vehicles.insert(id.clone(), vehicle);
        intersection.on_intersection.push(id.clone());

        assert!(intersection.exit_vehicles().unwrap().is_empty());
        assert_eq!(intersection.on_intersection, vec![id.clone()]);
        assert_eq!(
            intersection.snapshot(2).crossing_movements,
            BTreeSet::from([mv(Direction::South, Direction::North)])
        );
        assert_eq!(intersection.exit_vehicles().unwrap(), vec![id]);
        assert!(intersection.on_intersection.is_empty());
    }

    #[test]
    fn test_admission_ignores_vehicles_already_crossing() {
        // A vehicle still mid-crossing from an earlier tick is not considered
        // when admitting new vehicles.
        let mut intersection = green(&["sg-east"]);
        let id = VehicleId::from("slow");
        let mut vehicle = Vehicle::new(id.clone(), mv(Direction::South, Direction::North));
        vehicle.start_crossing(3).unwrap();
        intersection.vehicles.insert(id.clone(), vehicle);
        intersection.on_intersection.push(id);

        intersection
            .add_vehicle(Vehicle::new("cross", mv(Direction::East, Direction::West)))
            .unwrap();
        intersection.step().unwrap();

        assert_eq!(
            intersection.vehicle(&"cross".into()).unwrap().state(),
            VehicleState::Crossing
        );
    }

    #[test]
    fn test_enqueue_rejects_non_queued_vehicle() {
        let mut intersection = green(&[]);
        let mut vehicle = Vehicle::new("v1", mv(Direction::South, Direction::North));
        vehicle.start_crossing(1).unwrap();
        assert!(matches!(
            intersection.add_vehicle(vehicle),
            Err(SimError::InvalidTransition { .. })
        ));
        assert_eq!(intersection.stats().vehicles_added, 0);
    }
}
