//! Error types for world construction, editing and routing

use std::fmt;

/// Errors returned at the crate boundary
///
/// Expected misses (a point outside every region, no route under the current
/// constraints) are reported as `None` by the query functions, not as errors.
/// These variants cover invalid configuration and caller bugs.
#[derive(Debug, Clone, PartialEq)]
pub enum WorldError {
    /// Configuration validation failed
    InvalidConfig(String),
    /// A routing node id does not belong to the graph it was used with
    NodeOutOfRange {
        /// The offending node id
        node: usize,
        /// Number of nodes in the graph
        node_count: usize,
    },
    /// A cost matrix was sized for a different graph
    CostMatrixMismatch {
        /// Node count of the graph being searched
        expected: usize,
        /// Node count the matrix was built for
        found: usize,
    },
    /// Requested entity id does not exist
    EntityNotFound(usize),
    /// Requested region id does not exist
    RegionNotFound(usize),
    /// Geometry could not be turned into a usable boundary
    DegenerateGeometry(String),
    /// Boundary data for an entity could not be loaded
    BoundaryUnavailable(String),
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            WorldError::NodeOutOfRange { node, node_count } => {
                write!(f, "node {} out of range (graph has {} nodes)", node, node_count)
            }
            WorldError::CostMatrixMismatch { expected, found } => write!(
                f,
                "cost matrix sized for {} nodes, graph has {}",
                found, expected
            ),
            WorldError::EntityNotFound(id) => write!(f, "entity not found: {}", id),
            WorldError::RegionNotFound(id) => write!(f, "region not found: {}", id),
            WorldError::DegenerateGeometry(msg) => write!(f, "degenerate geometry: {}", msg),
            WorldError::BoundaryUnavailable(msg) => write!(f, "boundary unavailable: {}", msg),
        }
    }
}

impl std::error::Error for WorldError {}

/// Result type alias for world operations
pub type Result<T> = std::result::Result<T, WorldError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = WorldError::NodeOutOfRange { node: 12, node_count: 9 };
        assert_eq!(err.to_string(), "node 12 out of range (graph has 9 nodes)");

        let err = WorldError::CostMatrixMismatch { expected: 9, found: 4 };
        assert_eq!(err.to_string(), "cost matrix sized for 4 nodes, graph has 9");

        let err = WorldError::RegionNotFound(3);
        assert_eq!(err.to_string(), "region not found: 3");
    }
}
