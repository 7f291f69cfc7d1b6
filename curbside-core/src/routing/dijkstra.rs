use std::collections::BinaryHeap;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use super::network::RouteGraph;
use super::state::State;

/// Shortest path from `start` to `target`.
///
/// Returns the traversed edges in order, each paired with the node it was
/// entered from, or `None` if `target` is unreachable.
pub(super) fn shortest_path(
    graph: &RouteGraph,
    start: NodeIndex,
    target: NodeIndex,
) -> Option<Vec<(NodeIndex, EdgeIndex)>> {
    let mut distances: HashMap<NodeIndex, u32> = HashMap::with_capacity(graph.node_count());
    let mut predecessors: HashMap<NodeIndex, (NodeIndex, EdgeIndex)> =
        HashMap::with_capacity(graph.node_count());
    let mut heap = BinaryHeap::new();

    heap.push(State {
        cost: 0,
        node: start,
    });
    distances.insert(start, 0);

    while let Some(State { cost, node }) = heap.pop() {
        if node == target {
            break;
        }

        // Skip if we've found a better path
        if distances.get(&node).is_some_and(|&best| cost > best) {
            continue;
        }

        for edge in graph.edges(node) {
            let next = edge.target();
            let next_cost = cost.saturating_add(edge.weight().weight);

            match distances.entry(next) {
                Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                    predecessors.insert(next, (node, edge.id()));
                }
                Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                        predecessors.insert(next, (node, edge.id()));
                    }
                }
            }
        }
    }

    if start == target || !predecessors.contains_key(&target) {
        return None;
    }

    // Follow predecessors backward from target to start
    let mut steps = Vec::new();
    let mut current = target;
    while current != start {
        let &(prev, edge) = predecessors.get(&current)?;
        steps.push((prev, edge));
        current = prev;
    }
    steps.reverse();
    Some(steps)
}
