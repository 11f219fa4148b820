//! Region map: the queryable political geography of the world
//!
//! A [`RegionMap`] owns every [`Entity`] and [`Region`] in flat arenas.
//! Neighbour lists, entity membership and main regions are stored as ids
//! into those arenas.
//!
//! Boundary edits (merge, subtract, transfer) never mutate a region's shape
//! in place: the affected regions are dropped, new ones are built from the
//! clipped polygon, and the arena is reindexed. Any `RegionId` obtained before
//! an edit must be considered stale afterwards.

use log::{debug, warn};

use crate::clip::{clip, ClipOperation};
use crate::error::{Result, WorldError};
use crate::geometry::{Point2D, Polygon, Rect, Segment, EPSILON};
use crate::pathfinding::{NodeId, RouteGraph};
use crate::region::{pieces, shares_edge, Entity, EntityId, EntityKind, Region, RegionId};
#[cfg(feature = "spatial-index")]
use crate::spatial::SpatialIndex;
use crate::terrain::{TerrainSample, TerrainSampler, TerrainType};

/// On-demand provider of entity boundaries
///
/// Used by [`RegionMap::ensure_loaded`] to fetch the geometry of an entity
/// the first time it is needed.
pub trait BoundarySource {
    /// Load every boundary polygon of `entity`
    ///
    /// An empty result means the source has no geometry for the entity.
    fn load(&self, entity: &Entity) -> Result<Vec<Polygon>>;
}

/// Arena of entities and their regions
///
/// # Example
///
/// ```
/// use region_atlas::*;
/// use glam::Vec2;
///
/// let mut map = RegionMap::new();
/// let west = map.add_entity("West", EntityKind::Country).unwrap();
/// let east = map.add_entity("East", EntityKind::Country).unwrap();
/// map.add_region(west, &Contour::rectangle(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0)).into()).unwrap();
/// map.add_region(east, &Contour::rectangle(Vec2::new(1.0, 0.0), Vec2::new(2.0, 1.0)).into()).unwrap();
/// map.build_neighbours();
///
/// assert_eq!(map.entity_at(Vec2::new(1.5, 0.5)), Some(east));
/// assert_eq!(map.neighbours(0), &[1]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RegionMap {
    entities: Vec<Entity>,
    regions: Vec<Region>,
    step_length: f32,
    #[cfg(feature = "spatial-index")]
    index: Option<SpatialIndex>,
}

impl RegionMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a country or province
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if a province names a country that does not
    /// exist or is itself a province
    pub fn add_entity(&mut self, name: impl Into<String>, kind: EntityKind) -> Result<EntityId> {
        if let EntityKind::Province { country } = kind {
            match self.entities.get(country) {
                Some(e) if e.kind == EntityKind::Country => {}
                _ => return Err(WorldError::EntityNotFound(country)),
            }
        }
        let id = self.entities.len();
        self.entities.push(Entity::new(id, name.into(), kind));
        Ok(id)
    }

    /// Add the connected pieces of `polygon` as regions of `entity`
    ///
    /// Each outer loop becomes one region carrying the holes nested directly
    /// inside it. Neighbour lists are not updated until
    /// [`RegionMap::build_neighbours`] runs.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` for an unknown entity and
    /// `DegenerateGeometry` if the polygon encloses no area
    pub fn add_region(&mut self, entity: EntityId, polygon: &Polygon) -> Result<Vec<RegionId>> {
        self.check_entity(entity)?;
        let ids = self.insert_pieces(entity, polygon, TerrainSample::default());
        if ids.is_empty() {
            return Err(WorldError::DegenerateGeometry(format!(
                "boundary for entity {} encloses no area",
                entity
            )));
        }
        self.entities[entity].loaded = true;
        self.refresh_entities();
        Ok(ids)
    }

    /// Number of regions
    #[inline]
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Number of entities
    #[inline]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Get a region by id
    #[inline]
    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id)
    }

    /// Get an entity by id
    #[inline]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// All regions, indexed by id
    #[inline]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// All entities, indexed by id
    #[inline]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Check whether region `id` contains `point`
    ///
    /// # Errors
    ///
    /// Returns `RegionNotFound` for an unknown region
    pub fn contains(&self, id: RegionId, point: Point2D) -> Result<bool> {
        self.regions
            .get(id)
            .map(|r| r.contains(point))
            .ok_or(WorldError::RegionNotFound(id))
    }

    /// First region containing `point`
    ///
    /// Main regions are tested before the others; within each group regions
    /// are tested in insertion order.
    pub fn query(&self, point: Point2D) -> Option<RegionId> {
        let is_main = |r: &&Region| self.entities[r.entity].main_region == Some(r.id);
        self.regions
            .iter()
            .filter(is_main)
            .chain(self.regions.iter().filter(|r| !is_main(r)))
            .find(|r| r.contains(point))
            .map(|r| r.id)
    }

    /// Entity owning the region returned by [`RegionMap::query`]
    pub fn entity_at(&self, point: Point2D) -> Option<EntityId> {
        self.query(point).map(|id| self.regions[id].entity)
    }

    /// Neighbour ids of a region; empty for an invalid id
    pub fn neighbours(&self, id: RegionId) -> &[RegionId] {
        self.regions
            .get(id)
            .map(|r| r.neighbours.as_slice())
            .unwrap_or(&[])
    }

    /// Rebuild every region's neighbour list
    ///
    /// Two regions are neighbours when they share a boundary stretch walked
    /// in opposite directions. Candidate pairs come from a sweep over the
    /// bounding rectangles sorted by their left edge, so only regions whose
    /// rectangles touch compare segments. Links are always mutual.
    pub fn build_neighbours(&mut self) {
        for region in &mut self.regions {
            region.neighbours.clear();
        }

        let mut order: Vec<RegionId> = (0..self.regions.len()).collect();
        order.sort_by(|&a, &b| {
            self.regions[a]
                .bounds
                .min
                .x
                .total_cmp(&self.regions[b].bounds.min.x)
                .then(a.cmp(&b))
        });

        let mut active: Vec<RegionId> = Vec::new();
        let mut links = Vec::new();
        let mut candidates = 0usize;
        for &id in &order {
            let bounds = self.regions[id].bounds.expanded(EPSILON);
            active.retain(|&other| self.regions[other].bounds.max.x >= bounds.min.x);
            for &other in &active {
                if !bounds.intersects(&self.regions[other].bounds) {
                    continue;
                }
                candidates += 1;
                if share_boundary(&self.regions[id], &self.regions[other]) {
                    links.push((id, other));
                }
            }
            active.push(id);
        }

        let mut step_length = 0.0f32;
        for &(a, b) in &links {
            self.regions[a].neighbours.push(b);
            self.regions[b].neighbours.push(a);
            step_length = step_length.max(self.regions[a].center.distance(self.regions[b].center));
        }
        for region in &mut self.regions {
            region.neighbours.sort_unstable();
            region.neighbours.dedup();
        }
        self.step_length = step_length;

        #[cfg(feature = "spatial-index")]
        {
            let centers: Vec<Point2D> = self.regions.iter().map(|r| r.center).collect();
            self.index = SpatialIndex::new(&centers);
        }

        debug!(
            "neighbour graph: {} regions, {} candidate pairs, {} links",
            self.regions.len(),
            candidates,
            links.len()
        );
    }

    /// Region whose centre is closest to `point`
    ///
    /// Uses the KD-tree built by [`RegionMap::build_neighbours`] when it is
    /// current, a linear scan otherwise.
    pub fn nearest_region(&self, point: Point2D) -> Option<RegionId> {
        #[cfg(feature = "spatial-index")]
        {
            if let Some(index) = &self.index {
                return Some(index.find_nearest(point));
            }
        }

        self.regions
            .iter()
            .min_by(|a, b| {
                a.center
                    .distance_squared(point)
                    .total_cmp(&b.center.distance_squared(point))
            })
            .map(|r| r.id)
    }

    /// Regions reachable from `start` in at most `steps` neighbour hops, in
    /// breadth-first order (start first)
    ///
    /// Returns an empty vec if `start` is invalid.
    pub fn regions_within_steps(&self, start: RegionId, steps: usize) -> Vec<RegionId> {
        if start >= self.regions.len() {
            return vec![];
        }

        let mut visited = vec![false; self.regions.len()];
        visited[start] = true;
        let mut order = vec![start];
        let mut frontier = vec![start];

        for _ in 0..steps {
            let mut next = Vec::new();
            for &id in &frontier {
                for &n in self.neighbours(id) {
                    if !visited[n] {
                        visited[n] = true;
                        order.push(n);
                        next.push(n);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }
        order
    }

    /// Set the terrain of one region
    ///
    /// # Errors
    ///
    /// Returns `RegionNotFound` for an unknown region
    pub fn set_terrain(&mut self, id: RegionId, sample: TerrainSample) -> Result<()> {
        let region = self.regions.get_mut(id).ok_or(WorldError::RegionNotFound(id))?;
        region.terrain = sample;
        Ok(())
    }

    /// Sample terrain at every region centre
    pub fn sample_terrain<S: TerrainSampler + ?Sized>(&mut self, sampler: &S) {
        for region in &mut self.regions {
            region.terrain = sampler.sample(region.center);
        }
    }

    /// Replace two regions by their union, owned by the first one's entity
    ///
    /// Returns the ids of the resulting regions. Merging a region with
    /// itself changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `RegionNotFound` for an unknown region
    pub fn merge_regions(&mut self, a: RegionId, b: RegionId) -> Result<Vec<RegionId>> {
        self.check_region(a)?;
        self.check_region(b)?;
        if a == b {
            return Ok(vec![a]);
        }

        let (entity, terrain) = (self.regions[a].entity, self.regions[a].terrain);
        let merged = clip(
            &self.regions[a].to_polygon(),
            &self.regions[b].to_polygon(),
            ClipOperation::Union,
        );
        Ok(self.replace(&[a, b], entity, &merged, terrain))
    }

    /// Cut `polygon` out of a region
    ///
    /// The remainder may fall apart into several regions or vanish entirely;
    /// the ids of whatever remains are returned.
    ///
    /// # Errors
    ///
    /// Returns `RegionNotFound` for an unknown region
    pub fn subtract_from_region(&mut self, id: RegionId, polygon: &Polygon) -> Result<Vec<RegionId>> {
        self.check_region(id)?;
        let (entity, terrain) = (self.regions[id].entity, self.regions[id].terrain);
        let remainder = clip(&self.regions[id].to_polygon(), polygon, ClipOperation::Difference);
        Ok(self.replace(&[id], entity, &remainder, terrain))
    }

    /// Hand a region over to another entity
    ///
    /// The boundary is unchanged; entity membership and main regions are
    /// recomputed.
    ///
    /// # Errors
    ///
    /// Returns `RegionNotFound` or `EntityNotFound` for unknown ids
    pub fn transfer_region(&mut self, id: RegionId, entity: EntityId) -> Result<RegionId> {
        self.check_region(id)?;
        self.check_entity(entity)?;
        self.regions[id].entity = entity;
        self.entities[entity].loaded = true;
        self.refresh_entities();
        Ok(id)
    }

    /// Make sure `entity` has its boundaries, loading them from `source` on
    /// first use
    ///
    /// Rebuilds the neighbour graph after a load.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` for an unknown entity,
    /// `BoundaryUnavailable` if the source yields no usable geometry, or the
    /// source's own error
    pub fn ensure_loaded<S: BoundarySource + ?Sized>(
        &mut self,
        entity: EntityId,
        source: &S,
    ) -> Result<&[RegionId]> {
        self.check_entity(entity)?;
        if !self.entities[entity].loaded {
            let polygons = source.load(&self.entities[entity]).map_err(|err| {
                warn!("failed to load boundaries of '{}': {}", self.entities[entity].name, err);
                err
            })?;

            let mut added = 0;
            for polygon in &polygons {
                added += self.insert_pieces(entity, polygon, TerrainSample::default()).len();
            }
            if added == 0 {
                let name = &self.entities[entity].name;
                warn!("no usable boundaries for '{}'", name);
                return Err(WorldError::BoundaryUnavailable(name.clone()));
            }

            self.entities[entity].loaded = true;
            self.refresh_entities();
            self.build_neighbours();
        }
        Ok(self.entities[entity].regions.as_slice())
    }

    fn check_entity(&self, id: EntityId) -> Result<()> {
        if id >= self.entities.len() {
            return Err(WorldError::EntityNotFound(id));
        }
        Ok(())
    }

    fn check_region(&self, id: RegionId) -> Result<()> {
        if id >= self.regions.len() {
            return Err(WorldError::RegionNotFound(id));
        }
        Ok(())
    }

    /// Append one region per connected piece of `polygon`; skips slivers
    fn insert_pieces(&mut self, entity: EntityId, polygon: &Polygon, terrain: TerrainSample) -> Vec<RegionId> {
        let mut ids = Vec::new();
        for (outline, holes) in pieces(polygon) {
            if outline.len() < 3 || outline.area() <= EPSILON * EPSILON {
                continue;
            }
            let mut region = Region::new(outline, holes, terrain);
            region.id = self.regions.len();
            region.entity = entity;
            ids.push(region.id);
            self.regions.push(region);
        }
        #[cfg(feature = "spatial-index")]
        {
            self.index = None;
        }
        ids
    }

    /// Drop `removed`, add the pieces of `polygon` for `entity` and reindex
    fn replace(
        &mut self,
        removed: &[RegionId],
        entity: EntityId,
        polygon: &Polygon,
        terrain: TerrainSample,
    ) -> Vec<RegionId> {
        let mut next_id = 0;
        self.regions.retain_mut(|region| {
            if removed.contains(&region.id) {
                return false;
            }
            region.id = next_id;
            next_id += 1;
            true
        });

        let ids = self.insert_pieces(entity, polygon, terrain);
        self.refresh_entities();
        self.build_neighbours();
        ids
    }

    /// Recompute entity region lists, region indices and main regions
    fn refresh_entities(&mut self) {
        for entity in &mut self.entities {
            entity.regions.clear();
            entity.main_region = None;
        }
        for region in &mut self.regions {
            let entity = &mut self.entities[region.entity];
            region.index = entity.regions.len();
            entity.regions.push(region.id);
        }
        for entity in &mut self.entities {
            let mut best: Option<(RegionId, f32)> = None;
            for &id in &entity.regions {
                let area = self.regions[id].area;
                if best.map_or(true, |(_, a)| area > a) {
                    best = Some((id, area));
                }
            }
            entity.main_region = best.map(|(id, _)| id);
        }
    }
}

/// True if the two regions share any stretch of boundary
fn share_boundary(a: &Region, b: &Region) -> bool {
    let overlap = Rect::new(a.bounds.min.max(b.bounds.min), a.bounds.max.min(b.bounds.max)).expanded(EPSILON);
    let near = |s: &Segment| s.bounds().intersects(&overlap);
    let theirs: Vec<Segment> = b.segments().filter(|s| near(s)).collect();
    a.segments()
        .filter(|s| near(s))
        .any(|s| theirs.iter().any(|t| shares_edge(&s, t, EPSILON)))
}

impl RouteGraph for RegionMap {
    fn node_count(&self) -> usize {
        self.regions.len()
    }

    fn neighbours(&self, node: NodeId) -> &[NodeId] {
        RegionMap::neighbours(self, node)
    }

    fn center(&self, node: NodeId) -> Point2D {
        self.regions[node].center
    }

    fn terrain(&self, node: NodeId) -> TerrainType {
        self.regions[node].terrain()
    }

    fn altitude(&self, node: NodeId) -> f32 {
        self.regions[node].altitude()
    }

    fn node_at(&self, point: Point2D) -> Option<NodeId> {
        self.query(point)
    }

    fn step_length(&self) -> f32 {
        self.step_length
    }
}
