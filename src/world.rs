//! World facade: grid, region map and routing state in one place

use crate::atlas::RegionMap;
use crate::config::WorldConfig;
use crate::error::Result;
use crate::geometry::Point2D;
use crate::grid::{build_grid, Grid};
use crate::pathfinding::{find_route, CostMatrix, NodeId, Route, RouteQuery};
use crate::terrain::{PerlinTerrainSampler, PerlinConfig, TerrainSampler};

/// A generated world
///
/// Holds the grid partition, an initially empty [`RegionMap`] and the cost
/// matrix used for grid routes. Region routes take their cost matrix as an
/// argument since region ids change with every boundary edit.
///
/// Not intended for concurrent use: route searches read the cost matrix
/// without synchronization.
///
/// # Example
///
/// ```
/// use region_atlas::*;
///
/// let config = WorldConfigBuilder::new()
///     .grid_size(8, 8)
///     .unwrap()
///     .terrain_seed(42)
///     .build()
///     .unwrap();
/// let world = World::generate_with_sampler(config, &FlatTerrainSampler::default()).unwrap();
///
/// let start = world.grid().cell_center(0, 0).unwrap();
/// let goal = world.grid().cell_center(7, 7).unwrap();
/// let route = world.find_route(start, goal, &RouteQuery::default()).unwrap().unwrap();
/// assert_eq!(route.cost, 14);
/// ```
#[derive(Debug, Clone)]
pub struct World {
    config: WorldConfig,
    grid: Grid,
    regions: RegionMap,
    costs: CostMatrix,
}

impl World {
    /// Generate a world with Perlin terrain seeded from the configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration fails validation
    pub fn generate(config: WorldConfig) -> Result<Self> {
        let sampler =
            PerlinTerrainSampler::with_config(config.terrain_seed, config.sea_level, PerlinConfig::default());
        Self::generate_with_sampler(config, &sampler)
    }

    /// Generate a world with a custom terrain sampler
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration fails validation
    pub fn generate_with_sampler<S: TerrainSampler + ?Sized>(config: WorldConfig, sampler: &S) -> Result<Self> {
        config.validate()?;
        let grid = build_grid(&config, sampler);
        let costs = CostMatrix::for_graph(&grid);
        Ok(Self {
            config,
            grid,
            regions: RegionMap::new(),
            costs,
        })
    }

    /// Configuration used to generate this world
    #[inline]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The grid partition
    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The region map
    #[inline]
    pub fn regions(&self) -> &RegionMap {
        &self.regions
    }

    /// Mutable access to the region map for adding and editing regions
    #[inline]
    pub fn regions_mut(&mut self) -> &mut RegionMap {
        &mut self.regions
    }

    /// Cost overrides applied to grid routes
    #[inline]
    pub fn cost_matrix(&self) -> &CostMatrix {
        &self.costs
    }

    /// Mutable cost overrides; changes apply to the next grid route
    #[inline]
    pub fn cost_matrix_mut(&mut self) -> &mut CostMatrix {
        &mut self.costs
    }

    /// Override the cost of entering a grid cell
    ///
    /// # Errors
    ///
    /// Returns `NodeOutOfRange` if the cell is not part of the grid
    pub fn set_cost_override(&mut self, cell: NodeId, cost: u32) -> Result<()> {
        self.costs.set(cell, cost)
    }

    /// Remove the cost override of a grid cell
    ///
    /// # Errors
    ///
    /// Returns `NodeOutOfRange` if the cell is not part of the grid
    pub fn clear_cost_override(&mut self, cell: NodeId) -> Result<()> {
        self.costs.clear(cell)
    }

    /// Remove every grid cost override
    pub fn reset_cost_overrides(&mut self) {
        self.costs.reset();
    }

    /// Route between two points across the grid
    ///
    /// A query with `max_search_cost == 0` uses the configured default.
    pub fn find_route(&self, start: Point2D, goal: Point2D, query: &RouteQuery) -> Result<Option<Route>> {
        find_route(
            &self.grid,
            start,
            goal,
            query,
            &self.costs,
            self.config.default_max_search_cost,
        )
    }

    /// Route between two points across the region neighbour graph
    ///
    /// # Errors
    ///
    /// Returns `CostMatrixMismatch` if `costs` does not match the current
    /// region count
    pub fn find_region_route(
        &self,
        start: Point2D,
        goal: Point2D,
        query: &RouteQuery,
        costs: &CostMatrix,
    ) -> Result<Option<Route>> {
        find_route(
            &self.regions,
            start,
            goal,
            query,
            costs,
            self.config.default_max_search_cost,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Connectivity, WorldConfigBuilder};
    use crate::error::WorldError;
    use crate::geometry::Contour;
    use crate::pathfinding::IMPASSABLE;
    use crate::region::EntityKind;
    use crate::terrain::{FlatTerrainSampler, TerrainCapability};
    use glam::Vec2;

    fn flat_world(rows: usize, columns: usize) -> World {
        let config = WorldConfigBuilder::new()
            .grid_size(rows, columns)
            .unwrap()
            .terrain_seed(3)
            .build()
            .unwrap();
        World::generate_with_sampler(config, &FlatTerrainSampler::default()).unwrap()
    }

    #[test]
    fn test_generate_is_deterministic() {
        let config = WorldConfigBuilder::new()
            .grid_size(12, 12)
            .unwrap()
            .terrain_seed(42)
            .build()
            .unwrap();
        let a = World::generate(config).unwrap();
        let b = World::generate(config).unwrap();
        assert_eq!(a.grid().cells(), b.grid().cells());
        assert_eq!(a.cost_matrix().len(), 144);
    }

    #[test]
    fn test_generate_rejects_invalid_config() {
        let mut config = WorldConfigBuilder::new().terrain_seed(1).build().unwrap();
        config.columns = 0;
        assert!(matches!(World::generate(config), Err(WorldError::InvalidConfig(_))));
    }

    #[test]
    fn test_cost_overrides_take_effect_without_rebuild() {
        let mut world = flat_world(3, 3);
        let start = world.grid().cell_center(0, 0).unwrap();
        let goal = world.grid().cell_center(2, 2).unwrap();
        let query = RouteQuery::default();

        let open = world.find_route(start, goal, &query).unwrap().unwrap();
        assert_eq!(open.cost, 4);

        for (row, col) in [(0, 1), (1, 0)] {
            let cell = world.grid().cell_index(row, col).unwrap();
            world.set_cost_override(cell, IMPASSABLE).unwrap();
        }
        assert!(world.find_route(start, goal, &query).unwrap().is_none());

        world.clear_cost_override(1).unwrap();
        assert_eq!(world.find_route(start, goal, &query).unwrap().unwrap().cost, 4);

        world.reset_cost_overrides();
        assert_eq!(world.find_route(start, goal, &query).unwrap(), Some(open));

        assert_eq!(
            world.set_cost_override(9, 2),
            Err(WorldError::NodeOutOfRange { node: 9, node_count: 9 })
        );
    }

    #[test]
    fn test_default_budget_applies() {
        let config = WorldConfigBuilder::new()
            .grid_size(3, 3)
            .unwrap()
            .default_max_search_cost(3)
            .unwrap()
            .terrain_seed(0)
            .build()
            .unwrap();
        let world = World::generate_with_sampler(config, &FlatTerrainSampler::default()).unwrap();
        let start = world.grid().cell_center(0, 0).unwrap();
        let goal = world.grid().cell_center(2, 2).unwrap();

        assert!(world.find_route(start, goal, &RouteQuery::default()).unwrap().is_none());
        let generous = RouteQuery::default().with_max_search_cost(10);
        assert!(world.find_route(start, goal, &generous).unwrap().is_some());
    }

    #[test]
    fn test_eight_connected_world() {
        let config = WorldConfigBuilder::new()
            .grid_size(4, 4)
            .unwrap()
            .connectivity(Connectivity::Eight)
            .terrain_seed(0)
            .build()
            .unwrap();
        let world = World::generate_with_sampler(config, &FlatTerrainSampler::default()).unwrap();
        let route = world
            .find_route(
                world.grid().cell_center(0, 0).unwrap(),
                world.grid().cell_center(3, 3).unwrap(),
                &RouteQuery::default(),
            )
            .unwrap()
            .unwrap();
        assert_eq!(route.cost, 3);
    }

    #[test]
    fn test_perlin_world_respects_capability() {
        let config = WorldConfigBuilder::new()
            .grid_size(16, 16)
            .unwrap()
            .terrain_seed(7)
            .build()
            .unwrap();
        let world = World::generate(config).unwrap();
        let query = RouteQuery::new(TerrainCapability::OnlyGround);

        let ground: Vec<_> = world
            .grid()
            .cells()
            .iter()
            .filter(|c| !c.terrain.is_water())
            .map(|c| c.center)
            .collect();
        if let (Some(&start), Some(&goal)) = (ground.first(), ground.last()) {
            if let Some(route) = world.find_route(start, goal, &query).unwrap() {
                for &node in &route.nodes {
                    assert!(!world.grid().cells()[node].terrain.is_water());
                }
            }
        }
    }

    #[test]
    fn test_region_route() {
        let mut world = flat_world(2, 2);
        {
            let map = world.regions_mut();
            for (name, x) in [("West", -0.5), ("Middle", -0.2), ("East", 0.1)] {
                let entity = map.add_entity(name, EntityKind::Country).unwrap();
                let outline = Contour::rectangle(Vec2::new(x, -0.1), Vec2::new(x + 0.3, 0.1));
                map.add_region(entity, &outline.into()).unwrap();
            }
            map.build_neighbours();
        }

        let costs = CostMatrix::for_graph(world.regions());
        let route = world
            .find_region_route(Vec2::new(-0.4, 0.0), Vec2::new(0.3, 0.0), &RouteQuery::default(), &costs)
            .unwrap()
            .unwrap();
        assert_eq!(route.nodes, vec![0, 1, 2]);
        assert_eq!(route.waypoints.len(), 3);

        let stale = CostMatrix::new(2);
        assert!(world
            .find_region_route(Vec2::ZERO, Vec2::ZERO, &RouteQuery::default(), &stale)
            .is_err());
    }
}
