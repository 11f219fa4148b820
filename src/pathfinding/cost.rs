//! Per-node traversal cost overrides

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{NodeId, RouteGraph};
use crate::error::{Result, WorldError};

/// Override value marking a node as impassable
pub const IMPASSABLE: u32 = u32::MAX;

/// Cost of entering a node without an override
pub const DEFAULT_NODE_COST: u32 = 1;

/// Dense table of traversal cost overrides, one slot per routing node
///
/// The matrix is passed to every search explicitly. Reset or populate it
/// completely before starting a search; the search reads it as-is. A change
/// takes effect on the next search without rebuilding the graph.
///
/// # Example
///
/// ```
/// use region_atlas::pathfinding::{CostMatrix, IMPASSABLE};
///
/// let mut costs = CostMatrix::new(9);
/// costs.set(4, IMPASSABLE).unwrap();
/// assert!(costs.is_impassable(4));
///
/// costs.reset();
/// assert_eq!(costs.cost_of(4), 1);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostMatrix {
    overrides: Vec<Option<u32>>,
}

impl CostMatrix {
    /// Create an empty matrix for a graph with `node_count` nodes
    pub fn new(node_count: usize) -> Self {
        Self {
            overrides: vec![None; node_count],
        }
    }

    /// Create an empty matrix sized for `graph`
    pub fn for_graph<G: RouteGraph + ?Sized>(graph: &G) -> Self {
        Self::new(graph.node_count())
    }

    /// Number of nodes the matrix covers
    #[inline]
    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    /// True if the matrix covers no nodes
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    fn check(&self, node: NodeId) -> Result<()> {
        if node >= self.overrides.len() {
            return Err(WorldError::NodeOutOfRange {
                node,
                node_count: self.overrides.len(),
            });
        }
        Ok(())
    }

    /// Override the cost of entering `node`
    ///
    /// # Errors
    ///
    /// Returns `NodeOutOfRange` if the node is not covered by this matrix
    pub fn set(&mut self, node: NodeId, cost: u32) -> Result<()> {
        self.check(node)?;
        self.overrides[node] = Some(cost);
        Ok(())
    }

    /// Mark `node` as impassable
    pub fn set_impassable(&mut self, node: NodeId) -> Result<()> {
        self.set(node, IMPASSABLE)
    }

    /// Remove the override for `node`
    ///
    /// # Errors
    ///
    /// Returns `NodeOutOfRange` if the node is not covered by this matrix
    pub fn clear(&mut self, node: NodeId) -> Result<()> {
        self.check(node)?;
        self.overrides[node] = None;
        Ok(())
    }

    /// Remove every override
    pub fn reset(&mut self) {
        self.overrides.fill(None);
    }

    /// The override for `node`, if any
    ///
    /// # Errors
    ///
    /// Returns `NodeOutOfRange` if the node is not covered by this matrix
    pub fn get(&self, node: NodeId) -> Result<Option<u32>> {
        self.check(node)?;
        Ok(self.overrides[node])
    }

    /// Effective cost of entering `node`; nodes outside the matrix are impassable
    #[inline]
    pub fn cost_of(&self, node: NodeId) -> u32 {
        match self.overrides.get(node) {
            Some(Some(cost)) => *cost,
            Some(None) => DEFAULT_NODE_COST,
            None => IMPASSABLE,
        }
    }

    /// True if `node` may not be entered
    #[inline]
    pub fn is_impassable(&self, node: NodeId) -> bool {
        self.cost_of(node) == IMPASSABLE
    }

    /// Cheapest passable entry cost present in the matrix
    pub fn min_cost(&self) -> u32 {
        self.overrides
            .iter()
            .flatten()
            .copied()
            .filter(|&c| c != IMPASSABLE)
            .fold(DEFAULT_NODE_COST, u32::min)
    }

    /// Number of nodes carrying an override
    pub fn override_count(&self) -> usize {
        self.overrides.iter().filter(|o| o.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let costs = CostMatrix::new(4);
        assert_eq!(costs.len(), 4);
        assert_eq!(costs.cost_of(0), DEFAULT_NODE_COST);
        assert_eq!(costs.get(3).unwrap(), None);
        assert_eq!(costs.min_cost(), DEFAULT_NODE_COST);
        assert_eq!(costs.override_count(), 0);
    }

    #[test]
    fn test_set_clear_reset() {
        let mut costs = CostMatrix::new(4);
        costs.set(1, 5).unwrap();
        costs.set_impassable(2).unwrap();

        assert_eq!(costs.cost_of(1), 5);
        assert!(costs.is_impassable(2));
        assert_eq!(costs.override_count(), 2);

        costs.clear(1).unwrap();
        assert_eq!(costs.cost_of(1), DEFAULT_NODE_COST);

        costs.reset();
        assert!(!costs.is_impassable(2));
        assert_eq!(costs.override_count(), 0);
    }

    #[test]
    fn test_min_cost_ignores_impassable() {
        let mut costs = CostMatrix::new(3);
        costs.set_impassable(0).unwrap();
        assert_eq!(costs.min_cost(), 1);
        costs.set(1, 0).unwrap();
        assert_eq!(costs.min_cost(), 0);
    }

    #[test]
    fn test_out_of_range_is_an_error() {
        let mut costs = CostMatrix::new(2);
        assert_eq!(
            costs.set(2, 3),
            Err(WorldError::NodeOutOfRange { node: 2, node_count: 2 })
        );
        assert!(costs.clear(7).is_err());
        assert!(costs.get(2).is_err());
        assert_eq!(costs.cost_of(2), IMPASSABLE);
    }
}
