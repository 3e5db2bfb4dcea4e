//! Movement conflict rules
//!
//! The single predicate deciding whether two maneuvers may share the intersection.
//! The controller uses it to group signal groups into phases and the engine uses it
//! to admit vehicles, so both always agree on what is safe.

use petgraph::graph::{NodeIndex, UnGraph};

use super::layout::SignalGroup;
use super::types::{Movement, TurnType};

/// Whether two movements physically conflict
///
/// - same approach: never
/// - opposing approaches: only when exactly one of them turns left
/// - perpendicular approaches: always, unless both turn right
pub fn conflicts(a: &Movement, b: &Movement) -> bool {
    if a.from == b.from {
        return false;
    }

    let a_turn = a.turn_type();
    let b_turn = b.turn_type();

    if a.from == b.from.opposite() {
        return (a_turn == TurnType::Left) != (b_turn == TurnType::Left);
    }

    !(a_turn == TurnType::Right && b_turn == TurnType::Right)
}

/// Whether any movement of one group conflicts with any movement of the other
pub fn groups_conflict(a: &SignalGroup, b: &SignalGroup) -> bool {
    a.movements()
        .iter()
        .any(|ma| b.movements().iter().any(|mb| conflicts(ma, mb)))
}

/// Build the conflict graph over signal groups
///
/// Node `i` carries the index of `groups[i]`; an edge joins every pair of
/// conflicting groups.
pub fn conflict_graph(groups: &[SignalGroup]) -> UnGraph<usize, ()> {
    let mut graph = UnGraph::with_capacity(groups.len(), 0);
    let nodes: Vec<NodeIndex> = (0..groups.len()).map(|i| graph.add_node(i)).collect();

    for i in 0..groups.len() {
        for j in (i + 1)..groups.len() {
            if groups_conflict(&groups[i], &groups[j]) {
                graph.add_edge(nodes[i], nodes[j], ());
            }
        }
    }

    graph
}
