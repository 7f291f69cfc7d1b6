use std::cmp::Ordering;

use petgraph::graph::NodeIndex;

use crate::Millimeters;

#[derive(Copy, Clone, Eq, PartialEq)]
pub(super) struct State {
    pub(super) cost: Millimeters,
    pub(super) node: NodeIndex,
}

// Min-heap by cost, ties broken by node index so the search is deterministic
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
