//! Rectangular grid partition of the world
//!
//! The world extent is tiled into `rows × columns` axis-aligned cells. Row 0
//! lies along the bottom (`extent.min.y`) and column 0 along the left edge.
//! Cell ids are `row * columns + col`.
//!
//! Cell boundaries are stored as references into a shared edge arena: two
//! cells that touch along an edge hold the same edge id, traversed in opposite
//! directions. Neighbour lists are derived from those shared edges (and from
//! shared corner vertices for eight-connectivity) once, when the grid is
//! built. Cell shapes never change afterwards.

use std::collections::VecDeque;

use glam::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{Connectivity, WorldConfig, WorldExtent};
use crate::geometry::{Contour, Point2D, Segment, EPSILON};
use crate::pathfinding::{NodeId, RouteGraph};
use crate::terrain::{TerrainSampler, TerrainType};

/// Reference to an edge in the grid's edge arena
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeRef {
    /// Index into [`Grid::edges`]
    pub edge: usize,
    /// True if the cell walks the edge from `end` to `start`
    pub reversed: bool,
}

impl EdgeRef {
    fn forward(edge: usize) -> Self {
        Self { edge, reversed: false }
    }

    fn backward(edge: usize) -> Self {
        Self { edge, reversed: true }
    }
}

/// One tile of the grid
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Cell id, `row * columns + col`
    pub id: usize,
    /// Row index, counted from the bottom
    pub row: usize,
    /// Column index, counted from the left
    pub col: usize,
    /// Centre point
    pub center: Vec2,
    /// Counter-clockwise boundary: bottom, right, top, left
    pub boundary: [EdgeRef; 4],
    /// Surface type sampled at the centre
    pub terrain: TerrainType,
    /// Altitude sampled at the centre
    pub altitude: f32,
    /// Adjacent cell ids, ascending
    pub neighbours: Vec<usize>,
}

impl Cell {
    /// Number of adjacent cells
    #[inline]
    pub fn neighbour_count(&self) -> usize {
        self.neighbours.len()
    }
}

/// A built grid partition
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    columns: usize,
    extent: WorldExtent,
    connectivity: Connectivity,
    cell_size: Vec2,
    vertices: Vec<Vec2>,
    edges: Vec<Segment>,
    cells: Vec<Cell>,
}

/// Build the grid described by `config`, sampling terrain at every cell centre
///
/// # Example
///
/// ```
/// use region_atlas::*;
/// use region_atlas::grid::build_grid;
///
/// let config = WorldConfigBuilder::new()
///     .grid_size(2, 3)
///     .unwrap()
///     .build()
///     .unwrap();
/// let grid = build_grid(&config, &FlatTerrainSampler::default());
///
/// assert_eq!(grid.cell_count(), 6);
/// assert_eq!(grid.neighbours(0), &[1, 3]);
/// ```
pub fn build_grid<S: TerrainSampler + ?Sized>(config: &WorldConfig, sampler: &S) -> Grid {
    let rows = config.rows;
    let columns = config.columns;
    let extent = config.extent;
    let cell_size = config.cell_size();

    // Vertex (r, c) sits at index r * (columns + 1) + c
    let vertex_cols = columns + 1;
    let mut vertices = Vec::with_capacity((rows + 1) * vertex_cols);
    for r in 0..=rows {
        let y = if r == rows {
            extent.max.y
        } else {
            extent.min.y + r as f32 * cell_size.y
        };
        for c in 0..=columns {
            let x = if c == columns {
                extent.max.x
            } else {
                extent.min.x + c as f32 * cell_size.x
            };
            vertices.push(Vec2::new(x, y));
        }
    }
    let vertex = |r: usize, c: usize| r * vertex_cols + c;

    // Horizontal edges first, then vertical ones
    let mut edges = Vec::with_capacity((rows + 1) * columns + rows * (columns + 1));
    for r in 0..=rows {
        for c in 0..columns {
            edges.push(Segment::new(vertices[vertex(r, c)], vertices[vertex(r, c + 1)]));
        }
    }
    let vertical_base = edges.len();
    for r in 0..rows {
        for c in 0..=columns {
            edges.push(Segment::new(vertices[vertex(r, c)], vertices[vertex(r + 1, c)]));
        }
    }
    let horizontal = |r: usize, c: usize| r * columns + c;
    let vertical = |r: usize, c: usize| vertical_base + r * (columns + 1) + c;

    let mut edge_owners: Vec<Vec<usize>> = vec![Vec::new(); edges.len()];
    let mut vertex_owners: Vec<Vec<usize>> = vec![Vec::new(); vertices.len()];
    let mut cells = Vec::with_capacity(rows * columns);

    for row in 0..rows {
        for col in 0..columns {
            let id = row * columns + col;
            let boundary = [
                EdgeRef::forward(horizontal(row, col)),
                EdgeRef::forward(vertical(row, col + 1)),
                EdgeRef::backward(horizontal(row + 1, col)),
                EdgeRef::backward(vertical(row, col)),
            ];
            for edge_ref in &boundary {
                edge_owners[edge_ref.edge].push(id);
            }
            for v in [
                vertex(row, col),
                vertex(row, col + 1),
                vertex(row + 1, col + 1),
                vertex(row + 1, col),
            ] {
                vertex_owners[v].push(id);
            }

            let center = (vertices[vertex(row, col)] + vertices[vertex(row + 1, col + 1)]) * 0.5;
            let sample = sampler.sample(center);
            cells.push(Cell {
                id,
                row,
                col,
                center,
                boundary,
                terrain: sample.terrain,
                altitude: sample.altitude,
                neighbours: Vec::new(),
            });
        }
    }

    for cell in &mut cells {
        let mut neighbours: Vec<usize> = cell
            .boundary
            .iter()
            .flat_map(|e| edge_owners[e.edge].iter().copied())
            .filter(|&other| other != cell.id)
            .collect();

        if config.connectivity == Connectivity::Eight {
            let (row, col) = (cell.row, cell.col);
            for v in [
                vertex(row, col),
                vertex(row, col + 1),
                vertex(row + 1, col + 1),
                vertex(row + 1, col),
            ] {
                neighbours.extend(vertex_owners[v].iter().copied().filter(|&o| o != cell.id));
            }
        }

        neighbours.sort_unstable();
        neighbours.dedup();
        cell.neighbours = neighbours;
    }

    Grid {
        rows,
        columns,
        extent,
        connectivity: config.connectivity,
        cell_size,
        vertices,
        edges,
        cells,
    }
}

impl Grid {
    /// Number of rows
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Covered extent
    #[inline]
    pub fn extent(&self) -> WorldExtent {
        self.extent
    }

    /// Neighbour rule the grid was built with
    #[inline]
    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Size of one cell
    #[inline]
    pub fn cell_size(&self) -> Vec2 {
        self.cell_size
    }

    /// Number of cells
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// All cells, indexed by id
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Get a cell by id
    #[inline]
    pub fn get_cell(&self, id: usize) -> Option<&Cell> {
        self.cells.get(id)
    }

    /// Id of the cell at (`row`, `col`), if inside the grid
    #[inline]
    pub fn cell_index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.columns).then(|| row * self.columns + col)
    }

    /// Centre of the cell at (`row`, `col`)
    pub fn cell_center(&self, row: usize, col: usize) -> Option<Vec2> {
        self.cell_index(row, col).map(|id| self.cells[id].center)
    }

    /// The shared edge arena
    #[inline]
    pub fn edges(&self) -> &[Segment] {
        &self.edges
    }

    /// Grid corner points, `(rows + 1) * (columns + 1)` of them
    #[inline]
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Neighbour ids of a cell; empty for an invalid id
    pub fn neighbours(&self, id: usize) -> &[usize] {
        self.cells
            .get(id)
            .map(|c| c.neighbours.as_slice())
            .unwrap_or(&[])
    }

    /// Boundary edges of a cell in walking order (counter-clockwise)
    pub fn cell_segments(&self, id: usize) -> Option<[Segment; 4]> {
        let cell = self.cells.get(id)?;
        Some(cell.boundary.map(|r| {
            let edge = self.edges[r.edge];
            if r.reversed {
                edge.reversed()
            } else {
                edge
            }
        }))
    }

    /// Boundary of a cell as a closed contour
    pub fn cell_contour(&self, id: usize) -> Option<Contour> {
        let segments = self.cell_segments(id)?;
        Some(Contour::new(segments.iter().map(|s| s.start).collect()))
    }

    /// Cell containing `point`
    ///
    /// Uses index arithmetic, then re-checks against the cell boundaries of
    /// the surrounding block when the point is within `EPSILON` of a tile
    /// edge. Points on a shared edge belong to the cell on their right or
    /// above; points on the outer right or top edge of the grid belong to the
    /// last column or row.
    pub fn cell_at(&self, point: Point2D) -> Option<usize> {
        if self.cells.is_empty() || !self.extent.contains(point) {
            return None;
        }

        let local = (point - self.extent.min) / self.cell_size;
        let col = (local.x.floor().max(0.0) as usize).min(self.columns - 1);
        let row = (local.y.floor().max(0.0) as usize).min(self.rows - 1);
        let guess = row * self.columns + col;

        let frac = local - local.floor();
        let margin = Vec2::splat(EPSILON) / self.cell_size;
        let near_edge = frac.x < margin.x
            || frac.y < margin.y
            || 1.0 - frac.x < margin.x
            || 1.0 - frac.y < margin.y;
        if !near_edge {
            return Some(guess);
        }

        for r in row.saturating_sub(1)..=(row + 1).min(self.rows - 1) {
            for c in col.saturating_sub(1)..=(col + 1).min(self.columns - 1) {
                let id = r * self.columns + c;
                if self.cell_contour(id).is_some_and(|contour| contour.contains_point(point)) {
                    return Some(id);
                }
            }
        }
        Some(guess)
    }

    /// Cells reachable from `start` in at most `steps` moves, in
    /// breadth-first order (start first)
    ///
    /// Returns an empty vec if `start` is invalid.
    pub fn cells_within_steps(&self, start: usize, steps: usize) -> Vec<usize> {
        if start >= self.cells.len() {
            return vec![];
        }

        let mut visited = vec![false; self.cells.len()];
        let mut order = vec![start];
        let mut queue = VecDeque::from([(start, 0usize)]);
        visited[start] = true;

        while let Some((id, depth)) = queue.pop_front() {
            if depth == steps {
                continue;
            }
            for &n in self.neighbours(id) {
                if !visited[n] {
                    visited[n] = true;
                    order.push(n);
                    queue.push_back((n, depth + 1));
                }
            }
        }
        order
    }
}

impl RouteGraph for Grid {
    fn node_count(&self) -> usize {
        self.cells.len()
    }

    fn neighbours(&self, node: NodeId) -> &[NodeId] {
        Grid::neighbours(self, node)
    }

    fn center(&self, node: NodeId) -> Point2D {
        self.cells[node].center
    }

    fn terrain(&self, node: NodeId) -> TerrainType {
        self.cells[node].terrain
    }

    fn altitude(&self, node: NodeId) -> f32 {
        self.cells[node].altitude
    }

    fn node_at(&self, point: Point2D) -> Option<NodeId> {
        self.cell_at(point)
    }

    fn step_length(&self) -> f32 {
        match self.connectivity {
            Connectivity::Four => self.cell_size.max_element(),
            Connectivity::Eight => self.cell_size.length(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfigBuilder;
    use crate::pathfinding::{find_route, CostMatrix, RouteQuery, IMPASSABLE};
    use crate::terrain::FlatTerrainSampler;

    fn grid(rows: usize, columns: usize, connectivity: Connectivity) -> Grid {
        let config = WorldConfigBuilder::new()
            .grid_size(rows, columns)
            .unwrap()
            .connectivity(connectivity)
            .terrain_seed(1)
            .build()
            .unwrap();
        build_grid(&config, &FlatTerrainSampler::default())
    }

    #[test]
    fn test_build_counts() {
        let g = grid(3, 4, Connectivity::Four);
        assert_eq!(g.cell_count(), 12);
        assert_eq!(g.vertices().len(), 4 * 5);
        assert_eq!(g.edges().len(), 4 * 4 + 3 * 5);
        assert_eq!(g.cell_index(2, 3), Some(11));
        assert_eq!(g.cell_index(3, 0), None);
        assert!(g.get_cell(12).is_none());
    }

    #[test]
    fn test_cells_tile_the_extent() {
        let g = grid(3, 3, Connectivity::Four);
        let total: f32 = (0..g.cell_count())
            .map(|id| g.cell_contour(id).unwrap().signed_area())
            .sum();
        assert!((total - 1.0).abs() < 1e-5);
        for id in 0..g.cell_count() {
            assert!(!g.cell_contour(id).unwrap().is_clockwise());
        }
    }

    #[test]
    fn test_adjacent_cells_share_reversed_edges() {
        let g = grid(3, 3, Connectivity::Four);
        let left = g.get_cell(g.cell_index(1, 0).unwrap()).unwrap();
        let right = g.get_cell(g.cell_index(1, 1).unwrap()).unwrap();

        // right edge of the left cell is the left edge of the right cell
        assert_eq!(left.boundary[1].edge, right.boundary[3].edge);
        assert_ne!(left.boundary[1].reversed, right.boundary[3].reversed);

        let a = g.cell_segments(left.id).unwrap()[1];
        let b = g.cell_segments(right.id).unwrap()[3];
        assert!(a.is_reverse_of(&b, 0.0));
    }

    #[test]
    fn test_four_connectivity() {
        let g = grid(3, 3, Connectivity::Four);
        assert_eq!(g.neighbours(4), &[1, 3, 5, 7]);
        assert_eq!(g.neighbours(0), &[1, 3]);
        assert_eq!(g.neighbours(8), &[5, 7]);
        assert!(g.neighbours(99).is_empty());
    }

    #[test]
    fn test_eight_connectivity() {
        let g = grid(3, 3, Connectivity::Eight);
        assert_eq!(g.neighbours(4), &[0, 1, 2, 3, 5, 6, 7, 8]);
        assert_eq!(g.neighbours(0), &[1, 3, 4]);
        assert_eq!(g.neighbours(2), &[1, 4, 5]);
    }

    #[test]
    fn test_neighbours_are_symmetric() {
        for connectivity in [Connectivity::Four, Connectivity::Eight] {
            let g = grid(4, 5, connectivity);
            for cell in g.cells() {
                for &n in &cell.neighbours {
                    assert!(g.neighbours(n).contains(&cell.id));
                }
            }
        }
    }

    #[test]
    fn test_cell_at_centres() {
        let g = grid(3, 3, Connectivity::Four);
        for cell in g.cells() {
            assert_eq!(g.cell_at(cell.center), Some(cell.id));
        }
        assert_eq!(g.cell_at(Vec2::new(0.6, 0.0)), None);
        assert_eq!(g.cell_at(Vec2::new(0.0, -0.51)), None);
    }

    #[test]
    fn test_cell_at_shared_edge() {
        let g = grid(3, 3, Connectivity::Four);
        let centre = g.get_cell(4).unwrap();
        let left_edge = g.cell_segments(4).unwrap()[3];
        let on_edge = Vec2::new(left_edge.start.x, centre.center.y);

        // left edge belongs to the cell itself, not to its left neighbour
        assert_eq!(g.cell_at(on_edge), Some(4));
        let bottom_edge = g.cell_segments(4).unwrap()[0];
        assert_eq!(g.cell_at(Vec2::new(centre.center.x, bottom_edge.start.y)), Some(4));
    }

    #[test]
    fn test_cell_at_outer_corner() {
        let g = grid(3, 3, Connectivity::Four);
        assert_eq!(g.cell_at(Vec2::splat(0.5)), Some(8));
        assert_eq!(g.cell_at(Vec2::splat(-0.5)), Some(0));
    }

    #[test]
    fn test_cells_within_steps() {
        let g = grid(3, 3, Connectivity::Four);
        assert_eq!(g.cells_within_steps(4, 0), vec![4]);
        assert_eq!(g.cells_within_steps(4, 1), vec![4, 1, 3, 5, 7]);
        assert_eq!(g.cells_within_steps(0, 4).len(), 9);
        assert!(g.cells_within_steps(9, 2).is_empty());
    }

    #[test]
    fn test_terrain_sampled_at_centres() {
        let g = grid(2, 2, Connectivity::Four);
        for cell in g.cells() {
            assert_eq!(cell.terrain, TerrainType::Ground);
            assert_eq!(cell.altitude, 0.5);
        }
    }

    #[test]
    fn test_route_across_grid() {
        let g = grid(3, 3, Connectivity::Four);
        let mut costs = CostMatrix::for_graph(&g);
        let start = g.cell_center(0, 0).unwrap();
        let goal = g.cell_center(2, 2).unwrap();

        let route = find_route(&g, start, goal, &RouteQuery::default(), &costs, 1000)
            .unwrap()
            .unwrap();
        assert_eq!(route.nodes.len(), 5);
        assert_eq!(route.cost, 4);
        assert_eq!(route.waypoints.first(), Some(&start));
        assert_eq!(route.waypoints.last(), Some(&goal));

        costs.set(4, IMPASSABLE).unwrap();
        let detour = find_route(&g, start, goal, &RouteQuery::default(), &costs, 1000)
            .unwrap()
            .unwrap();
        assert_eq!(detour.cost, 4);
        assert!(!detour.nodes.contains(&4));

        let capped = RouteQuery::default().with_max_search_cost(2);
        assert!(find_route(&g, start, goal, &capped, &costs, 1000).unwrap().is_none());
    }

    #[test]
    fn test_diagonal_route() {
        let g = grid(3, 3, Connectivity::Eight);
        let costs = CostMatrix::for_graph(&g);
        let route = find_route(
            &g,
            g.cell_center(0, 0).unwrap(),
            g.cell_center(2, 2).unwrap(),
            &RouteQuery::default(),
            &costs,
            1000,
        )
        .unwrap()
        .unwrap();
        assert_eq!(route.nodes, vec![0, 4, 8]);
        assert_eq!(route.cost, 2);
    }
}
