//! World configuration and builder
//!
//! A `WorldConfig` fully determines the grid partition and the default
//! terrain of a generated world. The same configuration always produces the
//! same cells with the same terrain.

use glam::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, WorldError};

/// Neighbour rule used when linking grid cells
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Connectivity {
    /// Cells sharing an edge are neighbours
    #[default]
    Four,
    /// Cells sharing an edge or a corner are neighbours
    Eight,
}

/// Axis-aligned logical extent of the world
///
/// World coordinates are normalized; the default extent spans -0.5..0.5 on
/// both axes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldExtent {
    /// Lower-left corner
    pub min: Vec2,
    /// Upper-right corner
    pub max: Vec2,
}

impl WorldExtent {
    /// Create an extent from two corners
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Width and height of the extent
    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Check whether a point lies inside the extent (edges included)
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

impl Default for WorldExtent {
    fn default() -> Self {
        Self {
            min: Vec2::splat(-0.5),
            max: Vec2::splat(0.5),
        }
    }
}

/// Configuration for a world instance
///
/// # Example
///
/// ```rust
/// use region_atlas::*;
///
/// let config = WorldConfigBuilder::new()
///     .grid_size(3, 3)
///     .unwrap()
///     .connectivity(Connectivity::Four)
///     .terrain_seed(7)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.cell_count(), 9);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldConfig {
    /// Number of grid rows (along y)
    pub rows: usize,
    /// Number of grid columns (along x)
    pub columns: usize,
    /// Logical extent covered by the grid
    pub extent: WorldExtent,
    /// Cell neighbour rule
    pub connectivity: Connectivity,
    /// Search budget used when a route query passes `max_search_cost == 0`
    pub default_max_search_cost: u32,
    /// Seed for the default terrain sampler
    pub terrain_seed: u32,
    /// Altitude below which sampled cells become water (0..=1)
    pub sea_level: f32,
}

impl WorldConfig {
    /// Total number of grid cells
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.rows * self.columns
    }

    /// Size of one grid cell in world units
    #[inline]
    pub fn cell_size(&self) -> Vec2 {
        let size = self.extent.size();
        Vec2::new(size.x / self.columns as f32, size.y / self.rows as f32)
    }

    /// Check a configuration assembled without the builder
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the first invalid field
    pub fn validate(&self) -> Result<()> {
        WorldConfigBuilder::new()
            .grid_size(self.rows, self.columns)?
            .extent(self.extent.min, self.extent.max)?
            .default_max_search_cost(self.default_max_search_cost)?
            .sea_level(self.sea_level)?;
        Ok(())
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfigBuilder::new().build().unwrap_or(WorldConfig {
            rows: 16,
            columns: 16,
            extent: WorldExtent::default(),
            connectivity: Connectivity::Four,
            default_max_search_cost: DEFAULT_MAX_SEARCH_COST,
            terrain_seed: 0,
            sea_level: DEFAULT_SEA_LEVEL,
        })
    }
}

/// Search budget used when none is configured
pub const DEFAULT_MAX_SEARCH_COST: u32 = 100_000;

/// Default sea level for sampled terrain
pub const DEFAULT_SEA_LEVEL: f32 = 0.35;

/// Builder for creating a `WorldConfig` with validation
///
/// Setters that can receive invalid values return `Result<Self>` so mistakes
/// surface where they are made.
#[derive(Debug, Clone)]
pub struct WorldConfigBuilder {
    rows: usize,
    columns: usize,
    extent: WorldExtent,
    connectivity: Connectivity,
    default_max_search_cost: u32,
    terrain_seed: Option<u32>,
    sea_level: f32,
}

impl WorldConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - grid: 16 x 16
    /// - extent: -0.5..0.5 on both axes
    /// - connectivity: Four
    /// - default_max_search_cost: 100_000
    /// - terrain_seed: random
    /// - sea_level: 0.35
    pub fn new() -> Self {
        Self {
            rows: 16,
            columns: 16,
            extent: WorldExtent::default(),
            connectivity: Connectivity::Four,
            default_max_search_cost: DEFAULT_MAX_SEARCH_COST,
            terrain_seed: None,
            sea_level: DEFAULT_SEA_LEVEL,
        }
    }

    /// Set the number of grid rows and columns
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if either dimension is zero
    pub fn grid_size(mut self, rows: usize, columns: usize) -> Result<Self> {
        if rows == 0 || columns == 0 {
            return Err(WorldError::InvalidConfig(format!(
                "grid must have at least one row and column (got {}x{})",
                rows, columns
            )));
        }
        self.rows = rows;
        self.columns = columns;
        Ok(self)
    }

    /// Set the logical world extent
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the extent has no area
    pub fn extent(mut self, min: Vec2, max: Vec2) -> Result<Self> {
        if !(max.x > min.x && max.y > min.y) {
            return Err(WorldError::InvalidConfig(format!(
                "extent must have positive area (got {:?}..{:?})",
                min, max
            )));
        }
        self.extent = WorldExtent::new(min, max);
        Ok(self)
    }

    /// Set the cell neighbour rule
    pub fn connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Set the search budget used for queries that do not specify one
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the budget is zero
    pub fn default_max_search_cost(mut self, cost: u32) -> Result<Self> {
        if cost == 0 {
            return Err(WorldError::InvalidConfig(
                "default max search cost must be positive".to_string(),
            ));
        }
        self.default_max_search_cost = cost;
        Ok(self)
    }

    /// Set the terrain seed
    pub fn terrain_seed(mut self, seed: u32) -> Self {
        self.terrain_seed = Some(seed);
        self
    }

    /// Set the sea level used by the default terrain sampler
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the level is outside 0..=1
    pub fn sea_level(mut self, level: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&level) {
            return Err(WorldError::InvalidConfig(format!(
                "sea level must be within 0..=1 (got {})",
                level
            )));
        }
        self.sea_level = level;
        Ok(self)
    }

    /// Build the configuration
    ///
    /// If no terrain seed was provided, a random one is drawn.
    pub fn build(self) -> Result<WorldConfig> {
        Ok(WorldConfig {
            rows: self.rows,
            columns: self.columns,
            extent: self.extent,
            connectivity: self.connectivity,
            default_max_search_cost: self.default_max_search_cost,
            terrain_seed: self.terrain_seed.unwrap_or_else(rand::random),
            sea_level: self.sea_level,
        })
    }
}

impl Default for WorldConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
