//! Route planning over cell and region adjacency graphs
//!
//! Any structure exposing nodes with centres, terrain and neighbour lists can
//! be searched by implementing [`RouteGraph`]. Both [`crate::Grid`] and
//! [`crate::RegionMap`] do.
//!
//! Per-node cost overrides live in a [`CostMatrix`] that the caller owns and
//! passes into every search. The search reads it without synchronization:
//! populate or reset it completely before calling [`find_route`].
//!
//! # Example
//!
//! ```
//! use region_atlas::{find_route, CostMatrix, FlatTerrainSampler, RouteQuery, WorldConfigBuilder};
//! use region_atlas::grid::build_grid;
//! use glam::Vec2;
//!
//! let config = WorldConfigBuilder::new().grid_size(3, 3).unwrap().build().unwrap();
//! let grid = build_grid(&config, &FlatTerrainSampler::default());
//! let costs = CostMatrix::for_graph(&grid);
//!
//! let start = grid.cell_center(0, 0).unwrap();
//! let goal = grid.cell_center(2, 2).unwrap();
//! let route = find_route(&grid, start, goal, &RouteQuery::default(), &costs, 1000)
//!     .unwrap()
//!     .expect("open grid always has a route");
//!
//! assert_eq!(route.nodes.len(), 5);
//! assert_eq!(route.cost, 4);
//! ```

mod astar;
mod cost;

pub use cost::{CostMatrix, DEFAULT_NODE_COST, IMPASSABLE};

use glam::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, WorldError};
use crate::geometry::Point2D;
use crate::terrain::{TerrainCapability, TerrainType};

/// Index of a node in a routing graph
pub type NodeId = usize;

/// A graph the pathfinder can search
pub trait RouteGraph {
    /// Number of nodes; valid ids are `0..node_count()`
    fn node_count(&self) -> usize;

    /// Nodes adjacent to `node`
    fn neighbours(&self, node: NodeId) -> &[NodeId];

    /// Representative point of `node`, used for waypoints and the heuristic
    fn center(&self, node: NodeId) -> Point2D;

    /// Surface type of `node`
    fn terrain(&self, node: NodeId) -> TerrainType;

    /// Normalized altitude of `node`
    fn altitude(&self, node: NodeId) -> f32;

    /// Node containing `point`, if any
    fn node_at(&self, point: Point2D) -> Option<NodeId>;

    /// Longest distance between the centres of two adjacent nodes
    fn step_length(&self) -> f32;
}

/// Movement constraints of the unit being routed
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteQuery {
    /// Terrain the unit may enter
    pub capability: TerrainCapability,
    /// Lowest altitude the unit may enter
    pub min_altitude: f32,
    /// Highest altitude the unit may enter
    pub max_altitude: f32,
    /// Maximum accumulated cost; 0 selects the caller's default
    pub max_search_cost: u32,
}

impl Default for RouteQuery {
    fn default() -> Self {
        Self {
            capability: TerrainCapability::Any,
            min_altitude: 0.0,
            max_altitude: 1.0,
            max_search_cost: 0,
        }
    }
}

impl RouteQuery {
    /// Unrestricted altitude, default cost limit
    pub fn new(capability: TerrainCapability) -> Self {
        Self {
            capability,
            ..Default::default()
        }
    }

    /// Restrict the altitude band the unit may enter
    pub fn with_altitude(mut self, min_altitude: f32, max_altitude: f32) -> Self {
        self.min_altitude = min_altitude;
        self.max_altitude = max_altitude;
        self
    }

    /// Limit the accumulated route cost
    pub fn with_max_search_cost(mut self, max_search_cost: u32) -> Self {
        self.max_search_cost = max_search_cost;
        self
    }
}

/// A successful search result
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Route {
    /// Visited nodes, start and goal inclusive
    pub nodes: Vec<NodeId>,
    /// Centre of every visited node, in order
    pub waypoints: Vec<Vec2>,
    /// Sum of entry costs of every node after the start
    pub cost: u32,
}

impl Route {
    /// Number of moves along the route
    pub fn steps(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }
}

fn check_costs<G: RouteGraph + ?Sized>(graph: &G, costs: &CostMatrix) -> Result<()> {
    if costs.len() != graph.node_count() {
        return Err(WorldError::CostMatrixMismatch {
            expected: graph.node_count(),
            found: costs.len(),
        });
    }
    Ok(())
}

/// Find a route between the nodes containing `start` and `goal`
///
/// Returns `Ok(None)` when either point lies outside every node or when no
/// route exists under the query's constraints and cost limit. A
/// `max_search_cost` of 0 in the query falls back to `default_max_cost`.
///
/// # Errors
///
/// Returns `CostMatrixMismatch` if `costs` was sized for a different graph
pub fn find_route<G: RouteGraph + ?Sized>(
    graph: &G,
    start: Point2D,
    goal: Point2D,
    query: &RouteQuery,
    costs: &CostMatrix,
    default_max_cost: u32,
) -> Result<Option<Route>> {
    check_costs(graph, costs)?;
    let (Some(start_node), Some(goal_node)) = (graph.node_at(start), graph.node_at(goal)) else {
        return Ok(None);
    };
    find_route_between(graph, start_node, goal_node, query, costs, default_max_cost)
}

/// Find a route between two node ids
///
/// The start node is always admitted; the goal and every intermediate node
/// must pass the cost and terrain filters of `query`.
///
/// # Errors
///
/// Returns `NodeOutOfRange` for ids outside the graph and
/// `CostMatrixMismatch` if `costs` was sized for a different graph
pub fn find_route_between<G: RouteGraph + ?Sized>(
    graph: &G,
    start: NodeId,
    goal: NodeId,
    query: &RouteQuery,
    costs: &CostMatrix,
    default_max_cost: u32,
) -> Result<Option<Route>> {
    check_costs(graph, costs)?;
    let node_count = graph.node_count();
    for node in [start, goal] {
        if node >= node_count {
            return Err(WorldError::NodeOutOfRange { node, node_count });
        }
    }

    let max_cost = match query.max_search_cost {
        0 => default_max_cost,
        limit => limit,
    };

    Ok(
        astar::search(graph, start, goal, query, costs, max_cost).map(|(nodes, cost)| Route {
            waypoints: nodes.iter().map(|&n| graph.center(n)).collect(),
            nodes,
            cost,
        }),
    )
}
