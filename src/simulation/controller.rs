//! Signal phase controller
//!
//! Groups signal groups into conflict-free phases and steps through the
//! RED_YELLOW -> GREEN -> YELLOW -> ALL_RED cycle, extending or cutting the green
//! interval based on how many vehicles wait on each approach.

use log::debug;
use petgraph::graph::NodeIndex;
use std::collections::{BTreeSet, HashMap, VecDeque};

use super::conflict::conflict_graph;
use super::engine::IntersectionSnapshot;
use super::error::{Result, SimError};
use super::layout::{IntersectionLayout, SignalGroup};
use super::signal::{SignalCommand, SignalState};
use super::types::{Direction, SignalGroupId};

/// Default minimum green interval in ticks
pub const DEFAULT_MIN_GREEN: u32 = 3;
/// Default maximum green interval in ticks
pub const DEFAULT_MAX_GREEN: u32 = 5;

/// Decides, tick by tick, which indication every signal group shows
///
/// `decide` returns either an empty list (keep everything as is) or exactly one
/// command per signal group of the layout.
pub trait Controller {
    fn initialize(&mut self, layout: &IntersectionLayout) -> Result<()>;

    fn decide(&mut self, state: &IntersectionSnapshot) -> Result<Vec<SignalCommand>>;
}

/// Timing and phase configuration for [`AdaptiveController`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Ticks a phase stays green before demand may cut it
    pub min_green: u32,
    /// Ticks after which a phase is switched regardless of demand
    pub max_green: u32,
    /// Explicit phases as lists of signal group ids; computed from conflicts when `None`
    pub phases: Option<Vec<Vec<SignalGroupId>>>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            min_green: DEFAULT_MIN_GREEN,
            max_green: DEFAULT_MAX_GREEN,
            phases: None,
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_green < 1 {
            return Err(SimError::MinGreenTooSmall(self.min_green));
        }
        if self.max_green < self.min_green {
            return Err(SimError::MaxGreenBelowMin {
                min: self.min_green,
                max: self.max_green,
            });
        }
        if matches!(&self.phases, Some(phases) if phases.is_empty()) {
            return Err(SimError::EmptyPhaseConfig);
        }
        Ok(())
    }
}

/// A set of signal groups that may show green together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase {
    group_ids: Vec<SignalGroupId>,
    approaches: BTreeSet<Direction>,
}

impl Phase {
    fn from_groups<'a>(groups: impl IntoIterator<Item = &'a SignalGroup>) -> Self {
        let mut group_ids = Vec::new();
        let mut approaches = BTreeSet::new();
        for group in groups {
            group_ids.push(group.id().clone());
            approaches.extend(group.approaches());
        }
        Self {
            group_ids,
            approaches,
        }
    }

    pub fn group_ids(&self) -> &[SignalGroupId] {
        &self.group_ids
    }

    pub fn approaches(&self) -> &BTreeSet<Direction> {
        &self.approaches
    }

    /// Demand score: vehicles waiting on every approach this phase serves
    pub fn score(&self, state: &IntersectionSnapshot) -> usize {
        self.approaches
            .iter()
            .map(|d| state.waiting_per_approach.get(d).copied().unwrap_or(0))
            .sum()
    }
}

/// Position of the controller in the signal cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Initial,
    RedYellow,
    Green,
    Yellow,
    AllRed,
}

/// Demand-actuated controller cycling through conflict-free phases
#[derive(Debug)]
pub struct AdaptiveController {
    config: ControllerConfig,
    initialized: bool,
    phases: Vec<Phase>,
    group_ids: Vec<SignalGroupId>,
    active_phase: Option<usize>,
    next_phase: usize,
    stage: Stage,
    green_start: u64,
}

impl AdaptiveController {
    pub fn new(config: ControllerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            initialized: false,
            phases: Vec::new(),
            group_ids: Vec::new(),
            active_phase: None,
            next_phase: 0,
            stage: Stage::Initial,
            green_start: 0,
        })
    }

    /// Controller with the given bounds and automatically computed phases
    pub fn with_bounds(min_green: u32, max_green: u32) -> Result<Self> {
        Self::new(ControllerConfig {
            min_green,
            max_green,
            phases: None,
        })
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Index of the phase currently holding (or last given) green
    pub fn active_phase(&self) -> Option<usize> {
        self.active_phase
    }

    fn resolve_phases(
        definitions: &[Vec<SignalGroupId>],
        groups: &[SignalGroup],
    ) -> Result<Vec<Phase>> {
        let by_id: HashMap<&SignalGroupId, &SignalGroup> =
            groups.iter().map(|g| (g.id(), g)).collect();

        definitions
            .iter()
            .map(|definition| {
                let members = definition
                    .iter()
                    .map(|id| {
                        by_id
                            .get(id)
                            .copied()
                            .ok_or_else(|| SimError::UnknownSignalGroup(id.clone()))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Phase::from_groups(members))
            })
            .collect()
    }

    /// Greedy colouring of the conflict graph in group order
    fn compute_phases(groups: &[SignalGroup]) -> Vec<Phase> {
        let graph = conflict_graph(groups);
        let mut assigned = vec![false; groups.len()];
        let mut phases = Vec::new();

        while assigned.iter().any(|done| !done) {
            let mut members: Vec<usize> = Vec::new();
            for candidate in 0..groups.len() {
                if assigned[candidate] {
                    continue;
                }
                let node = NodeIndex::new(candidate);
                let compatible = members
                    .iter()
                    .all(|&m| !graph.contains_edge(node, NodeIndex::new(m)));
                if compatible {
                    assigned[candidate] = true;
                    members.push(candidate);
                }
            }
            phases.push(Phase::from_groups(members.iter().map(|&i| &groups[i])));
        }

        phases
    }

    /// Highest scoring phase other than `exclude`; ties go to the lowest index
    fn best_phase(&self, state: &IntersectionSnapshot, exclude: Option<usize>) -> usize {
        let mut best: Option<(usize, usize)> = None;
        for (index, phase) in self.phases.iter().enumerate() {
            if Some(index) == exclude {
                continue;
            }
            let score = phase.score(state);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((index, score));
            }
        }
        best.map(|(index, _)| index).unwrap_or(0)
    }

    /// One command per known group: `state` for the phase's groups, RED for the rest
    fn commands_for(&self, phase: Option<usize>, state: SignalState) -> Vec<SignalCommand> {
        let members: &[SignalGroupId] = match phase {
            Some(index) => &self.phases[index].group_ids,
            None => &[],
        };
        self.group_ids
            .iter()
            .map(|id| {
                let target = if members.contains(id) {
                    state
                } else {
                    SignalState::Red
                };
                SignalCommand::new(id.clone(), target)
            })
            .collect()
    }

    fn enter(&mut self, stage: Stage, tick: u64) {
        debug!("tick {}: stage {:?} -> {:?}", tick, self.stage, stage);
        self.stage = stage;
    }

    fn handle_initial(&mut self, state: &IntersectionSnapshot) -> Vec<SignalCommand> {
        self.next_phase = self.best_phase(state, None);
        self.enter(Stage::RedYellow, state.tick);
        self.commands_for(Some(self.next_phase), SignalState::RedYellow)
    }

    fn handle_red_yellow(&mut self, state: &IntersectionSnapshot) -> Vec<SignalCommand> {
        self.active_phase = Some(self.next_phase);
        self.green_start = state.tick;
        self.enter(Stage::Green, state.tick);
        self.commands_for(self.active_phase, SignalState::Green)
    }

    fn handle_green(&mut self, state: &IntersectionSnapshot) -> Vec<SignalCommand> {
        let Some(active) = self.active_phase else {
            return Vec::new();
        };
        let elapsed = state.tick.saturating_sub(self.green_start);

        if elapsed < u64::from(self.config.min_green) || self.phases.len() <= 1 {
            return Vec::new();
        }

        let best = self.best_phase(state, Some(active));
        let current_score = self.phases[active].score(state);
        let best_score = self.phases[best].score(state);

        let demand_elsewhere = best_score > current_score;
        let max_reached = elapsed >= u64::from(self.config.max_green);

        if !demand_elsewhere && !max_reached {
            return Vec::new();
        }

        self.next_phase = if demand_elsewhere {
            best
        } else {
            (active + 1) % self.phases.len()
        };
        debug!(
            "tick {}: ending phase {} after {} ticks (score {} vs {}), next phase {}",
            state.tick, active, elapsed, current_score, best_score, self.next_phase
        );

        self.enter(Stage::Yellow, state.tick);
        self.commands_for(Some(active), SignalState::Yellow)
    }

    fn handle_yellow(&mut self, state: &IntersectionSnapshot) -> Vec<SignalCommand> {
        self.enter(Stage::AllRed, state.tick);
        self.commands_for(None, SignalState::Red)
    }

    fn handle_all_red(&mut self, state: &IntersectionSnapshot) -> Vec<SignalCommand> {
        self.enter(Stage::RedYellow, state.tick);
        self.commands_for(Some(self.next_phase), SignalState::RedYellow)
    }
}

impl Controller for AdaptiveController {
    fn initialize(&mut self, layout: &IntersectionLayout) -> Result<()> {
        let groups = layout.signal_groups();

        self.phases = match &self.config.phases {
            Some(definitions) => Self::resolve_phases(definitions, groups)?,
            None => Self::compute_phases(groups),
        };
        self.group_ids = layout.group_ids().cloned().collect();
        self.active_phase = None;
        self.next_phase = 0;
        self.stage = Stage::Initial;
        self.green_start = 0;
        self.initialized = true;

        debug!(
            "controller initialized with {} phases: {:?}",
            self.phases.len(),
            self.phases
                .iter()
                .map(|p| p.group_ids.iter().map(|id| id.as_str()).collect::<Vec<_>>())
                .collect::<Vec<_>>()
        );
        Ok(())
    }

    fn decide(&mut self, state: &IntersectionSnapshot) -> Result<Vec<SignalCommand>> {
        if !self.initialized {
            return Err(SimError::ControllerNotInitialized);
        }

        let commands = match self.stage {
            Stage::Initial => self.handle_initial(state),
            Stage::RedYellow => self.handle_red_yellow(state),
            Stage::Green => self.handle_green(state),
            Stage::Yellow => self.handle_yellow(state),
            Stage::AllRed => self.handle_all_red(state),
        };
        Ok(commands)
    }
}

/// Controller that plays back predetermined commands
///
/// Useful for driving the engine through a known signal sequence.
#[derive(Debug, Clone)]
pub struct FixedController {
    script: VecDeque<Vec<SignalCommand>>,
    /// Commands returned on every tick once the script runs out
    repeat: Vec<SignalCommand>,
    initialized: bool,
}

impl FixedController {
    /// Return the same commands on every tick
    pub fn repeating(commands: Vec<SignalCommand>) -> Self {
        Self {
            script: VecDeque::new(),
            repeat: commands,
            initialized: false,
        }
    }

    /// Return one entry per tick, then nothing
    pub fn scripted(script: Vec<Vec<SignalCommand>>) -> Self {
        Self {
            script: script.into(),
            repeat: Vec::new(),
            initialized: false,
        }
    }
}

impl Controller for FixedController {
    fn initialize(&mut self, _layout: &IntersectionLayout) -> Result<()> {
        self.initialized = true;
        Ok(())
    }

    fn decide(&mut self, _state: &IntersectionSnapshot) -> Result<Vec<SignalCommand>> {
        if !self.initialized {
            return Err(SimError::ControllerNotInitialized);
        }
        Ok(self
            .script
            .pop_front()
            .unwrap_or_else(|| self.repeat.clone()))
    }
}
