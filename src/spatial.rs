//! Spatial indexing for nearest-region lookups
//!
//! This module is only available with the `spatial-index` feature.

use glam::Vec2;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

/// KD-tree over representative points
///
/// Gives O(log n) nearest-point lookups. [`crate::RegionMap`] builds one over
/// region centres to snap arbitrary positions (clicks, spawn points) to the
/// closest region even when they fall outside every boundary.
#[derive(Clone)]
pub struct SpatialIndex {
    tree: ImmutableKdTree<f32, usize, 2, 32>,
    len: usize,
}

impl SpatialIndex {
    /// Build an index from points; returns `None` for an empty slice
    ///
    /// # Example
    ///
    /// ```
    /// use region_atlas::SpatialIndex;
    /// use glam::Vec2;
    ///
    /// let centers = vec![Vec2::new(-0.25, 0.0), Vec2::new(0.25, 0.0)];
    /// let index = SpatialIndex::new(&centers).unwrap();
    /// assert_eq!(index.find_nearest(Vec2::new(0.2, 0.1)), 1);
    /// ```
    pub fn new(centers: &[Vec2]) -> Option<Self> {
        if centers.is_empty() {
            return None;
        }
        let points: Vec<[f32; 2]> = centers.iter().map(|c| [c.x, c.y]).collect();
        Some(Self {
            tree: ImmutableKdTree::new_from_slice(&points),
            len: points.len(),
        })
    }

    /// Number of indexed points
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; empty indexes are never built
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Index of the point closest to `position`
    pub fn find_nearest(&self, position: Vec2) -> usize {
        let query = [position.x, position.y];
        self.tree.nearest_one::<SquaredEuclidean>(&query).item as usize
    }
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex").field("len", &self.len).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spatial_index_basic() {
        let centers = vec![
            Vec2::new(0.4, 0.0),
            Vec2::new(0.0, 0.4),
            Vec2::new(-0.4, 0.0),
            Vec2::new(0.0, -0.4),
        ];
        let index = SpatialIndex::new(&centers).unwrap();
        assert_eq!(index.len(), 4);

        assert_eq!(index.find_nearest(Vec2::new(0.35, 0.05)), 0);
        assert_eq!(index.find_nearest(Vec2::new(0.0, 0.38)), 1);
        assert_eq!(index.find_nearest(Vec2::new(-0.3, -0.02)), 2);
        assert_eq!(index.find_nearest(Vec2::new(0.01, -0.45)), 3);
    }

    #[test]
    fn test_spatial_index_exact_match() {
        let centers = vec![Vec2::new(0.1, 0.1), Vec2::new(-0.2, 0.3)];
        let index = SpatialIndex::new(&centers).unwrap();
        assert_eq!(index.find_nearest(centers[0]), 0);
        assert_eq!(index.find_nearest(centers[1]), 1);
    }

    #[test]
    fn test_empty_index() {
        assert!(SpatialIndex::new(&[]).is_none());
    }
}
