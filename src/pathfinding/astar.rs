use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::debug;

use super::{CostMatrix, NodeId, RouteGraph, RouteQuery};

#[derive(Clone, Copy, Debug)]
struct State {
    priority: f64,
    seq: u64,
    node: NodeId,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on priority; earlier pushes win ties
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// True if a unit described by `query` may enter `node`
pub(super) fn admits<G: RouteGraph + ?Sized>(
    graph: &G,
    node: NodeId,
    query: &RouteQuery,
    costs: &CostMatrix,
) -> bool {
    if costs.is_impassable(node) {
        return false;
    }
    let altitude = graph.altitude(node);
    query.capability.allows(graph.terrain(node))
        && altitude >= query.min_altitude
        && altitude <= query.max_altitude
}

fn reconstruct(came_from: &[Option<NodeId>], mut current: NodeId) -> Vec<NodeId> {
    let mut path = vec![current];
    while let Some(prev) = came_from[current] {
        current = prev;
        path.push(current);
    }
    path.reverse();
    path
}

/// Best-first search from `start` to `goal`; returns the node path and its cost
///
/// Node ids must already be validated against the graph.
pub(super) fn search<G: RouteGraph + ?Sized>(
    graph: &G,
    start: NodeId,
    goal: NodeId,
    query: &RouteQuery,
    costs: &CostMatrix,
    max_cost: u32,
) -> Option<(Vec<NodeId>, u32)> {
    if start == goal {
        return Some((vec![start], 0));
    }
    if !admits(graph, goal, query, costs) {
        debug!("goal node {} is not enterable under the query", goal);
        return None;
    }

    let goal_center = graph.center(goal);
    let step = graph.step_length();
    // f64 keeps every u32 path cost exact in the priority
    let scale = if step > 0.0 {
        f64::from(costs.min_cost()) / f64::from(step)
    } else {
        0.0
    };
    let heuristic = |node: NodeId| f64::from(graph.center(node).distance(goal_center)) * scale;

    let n = graph.node_count();
    let mut g_score = vec![u32::MAX; n];
    let mut came_from: Vec<Option<NodeId>> = vec![None; n];
    let mut closed = vec![false; n];
    let mut open = BinaryHeap::new();
    let mut seq = 0u64;
    let mut expanded = 0usize;

    g_score[start] = 0;
    open.push(State {
        priority: heuristic(start),
        seq,
        node: start,
    });

    while let Some(State { node: current, .. }) = open.pop() {
        if closed[current] {
            continue;
        }
        if current == goal {
            debug!(
                "route {} -> {} found: cost {}, {} nodes expanded",
                start, goal, g_score[goal], expanded
            );
            return Some((reconstruct(&came_from, goal), g_score[goal]));
        }
        closed[current] = true;
        expanded += 1;

        for &neighbour in graph.neighbours(current) {
            if closed[neighbour] || !admits(graph, neighbour, query, costs) {
                continue;
            }
            let tentative = g_score[current].saturating_add(costs.cost_of(neighbour));
            if tentative > max_cost || tentative >= g_score[neighbour] {
                continue;
            }
            g_score[neighbour] = tentative;
            came_from[neighbour] = Some(current);
            seq += 1;
            open.push(State {
                priority: f64::from(tentative) + heuristic(neighbour),
                seq,
                node: neighbour,
            });
        }
    }

    debug!(
        "no route {} -> {} within cost {} ({} nodes expanded)",
        start, goal, max_cost, expanded
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point2D;
    use crate::terrain::TerrainType;
    use glam::Vec2;

    /// Two routes from 0 to 4: 0-1-4 and 0-2-3-4, every node at the origin
    struct Diamond {
        neighbours: Vec<Vec<NodeId>>,
    }

    impl Diamond {
        fn new() -> Self {
            Self {
                neighbours: vec![vec![1, 2], vec![0, 4], vec![0, 3], vec![2, 4], vec![1, 3]],
            }
        }
    }

    impl RouteGraph for Diamond {
        fn node_count(&self) -> usize {
            self.neighbours.len()
        }

        fn neighbours(&self, node: NodeId) -> &[NodeId] {
            &self.neighbours[node]
        }

        fn center(&self, _node: NodeId) -> Point2D {
            Vec2::ZERO
        }

        fn terrain(&self, _node: NodeId) -> TerrainType {
            TerrainType::Ground
        }

        fn altitude(&self, _node: NodeId) -> f32 {
            0.5
        }

        fn node_at(&self, _point: Point2D) -> Option<NodeId> {
            Some(0)
        }

        fn step_length(&self) -> f32 {
            1.0
        }
    }

    #[test]
    fn test_heap_orders_min_priority_then_fifo() {
        let mut heap = BinaryHeap::new();
        heap.push(State { priority: 2.0, seq: 0, node: 0 });
        heap.push(State { priority: 1.0, seq: 1, node: 1 });
        heap.push(State { priority: 1.0, seq: 2, node: 2 });
        let order: Vec<NodeId> = std::iter::from_fn(|| heap.pop().map(|s| s.node)).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_large_costs_stay_distinct() {
        // Above 2^26 neighbouring integers share one f32 value
        let graph = Diamond::new();
        let mut costs = CostMatrix::for_graph(&graph);
        costs.set(1, 67_108_867).unwrap();
        costs.set(2, 67_108_865).unwrap();

        let (nodes, cost) = search(&graph, 0, 4, &RouteQuery::default(), &costs, u32::MAX).unwrap();
        assert_eq!(nodes, vec![0, 2, 3, 4]);
        assert_eq!(cost, 67_108_867);
    }
}
