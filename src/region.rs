//! Regions and the entities that own them
//!
//! A [`Region`] is one connected piece of an administrative entity: an outer
//! boundary loop, optional holes, a cached bounding rectangle and a list of
//! neighbouring region ids. Regions live in the arena of a
//! [`crate::RegionMap`] and refer to each other and to their owning
//! [`Entity`] by index only.

use glam::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{Contour, Polygon, Rect, Segment};
use crate::terrain::{TerrainSample, TerrainType};

/// Index of a region in its map's arena
///
/// Ids are invalidated by every edit that replaces regions.
pub type RegionId = usize;

/// Index of an entity in its map
pub type EntityId = usize;

/// What an entity is
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A sovereign country
    Country,
    /// A subdivision of a country
    Province {
        /// Owning country
        country: EntityId,
    },
}

/// A country or province
///
/// Owns zero or more regions. The main region is the one with the largest
/// area; ties go to the earlier region.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Entity id
    pub id: EntityId,
    /// Display name
    pub name: String,
    /// Country or province
    pub kind: EntityKind,
    pub(crate) regions: Vec<RegionId>,
    pub(crate) main_region: Option<RegionId>,
    pub(crate) loaded: bool,
}

impl Entity {
    pub(crate) fn new(id: EntityId, name: String, kind: EntityKind) -> Self {
        Self {
            id,
            name,
            kind,
            regions: Vec::new(),
            main_region: None,
            loaded: false,
        }
    }

    /// Regions owned by this entity, in region index order
    #[inline]
    pub fn regions(&self) -> &[RegionId] {
        &self.regions
    }

    /// The largest region, if any
    #[inline]
    pub fn main_region(&self) -> Option<RegionId> {
        self.main_region
    }

    /// True once boundaries were added or loaded
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Country this entity belongs to (itself for a country)
    pub fn country(&self) -> EntityId {
        match self.kind {
            EntityKind::Country => self.id,
            EntityKind::Province { country } => country,
        }
    }
}

/// One connected piece of an entity's territory
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub(crate) id: RegionId,
    pub(crate) entity: EntityId,
    pub(crate) index: usize,
    pub(crate) outline: Contour,
    pub(crate) holes: Vec<Contour>,
    pub(crate) bounds: Rect,
    pub(crate) center: Vec2,
    pub(crate) area: f32,
    pub(crate) terrain: TerrainSample,
    pub(crate) neighbours: Vec<RegionId>,
}

impl Region {
    /// Create an unattached region from an outline and its holes
    ///
    /// The outline is wound counter-clockwise and holes clockwise.
    pub(crate) fn new(mut outline: Contour, mut holes: Vec<Contour>, terrain: TerrainSample) -> Self {
        if outline.is_clockwise() {
            outline.reverse();
        }
        for hole in &mut holes {
            if !hole.is_clockwise() {
                hole.reverse();
            }
        }
        let bounds = outline.bounds();
        let center = outline.centroid();
        let area = outline.area() - holes.iter().map(Contour::area).sum::<f32>();
        Self {
            id: 0,
            entity: 0,
            index: 0,
            outline,
            holes,
            bounds,
            center,
            area,
            terrain,
            neighbours: Vec::new(),
        }
    }

    /// Region id within its map
    #[inline]
    pub fn id(&self) -> RegionId {
        self.id
    }

    /// Owning entity
    #[inline]
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Position of this region in its entity's region list
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Outer boundary loop, counter-clockwise
    #[inline]
    pub fn outline(&self) -> &Contour {
        &self.outline
    }

    /// Hole loops, clockwise
    #[inline]
    pub fn holes(&self) -> &[Contour] {
        &self.holes
    }

    /// Bounding rectangle; contains every boundary point
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Area-weighted centre of the outline
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Enclosed area minus holes
    #[inline]
    pub fn area(&self) -> f32 {
        self.area
    }

    /// Surface type
    #[inline]
    pub fn terrain(&self) -> TerrainType {
        self.terrain.terrain
    }

    /// Normalized altitude
    #[inline]
    pub fn altitude(&self) -> f32 {
        self.terrain.altitude
    }

    /// Adjacent region ids, ascending
    #[inline]
    pub fn neighbours(&self) -> &[RegionId] {
        &self.neighbours
    }

    /// Point containment
    ///
    /// Rejects via the bounding rectangle without touching the boundary.
    /// Points on an edge follow the crossing-number rule of
    /// [`Contour::contains_point`].
    pub fn contains(&self, point: Vec2) -> bool {
        if !self.bounds.contains(point) {
            return false;
        }
        self.outline.contains_point(point) && !self.holes.iter().any(|h| h.contains_point(point))
    }

    /// Every boundary edge, outline first
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.outline
            .segments()
            .chain(self.holes.iter().flat_map(|h| h.segments()))
    }

    /// Boundary as a polygon (outline followed by holes)
    pub fn to_polygon(&self) -> Polygon {
        let mut contours = Vec::with_capacity(1 + self.holes.len());
        contours.push(self.outline.clone());
        contours.extend(self.holes.iter().cloned());
        Polygon::new(contours)
    }
}

/// Split a polygon into connected pieces: each outer loop with the holes
/// directly inside it
///
/// Loops at even nesting depth are outlines; a hole goes to the smallest
/// outline one level up that contains it.
pub(crate) fn pieces(polygon: &Polygon) -> Vec<(Contour, Vec<Contour>)> {
    let contours = polygon.contours();
    let depths: Vec<usize> = (0..contours.len()).map(|i| polygon.nesting_depth(i)).collect();

    let outer: Vec<usize> = (0..contours.len()).filter(|&i| depths[i] % 2 == 0).collect();
    let mut holes: Vec<Vec<Contour>> = vec![Vec::new(); outer.len()];

    for (i, contour) in contours.iter().enumerate() {
        if depths[i] % 2 == 0 {
            continue;
        }
        let Some(probe) = contour.points().first().copied() else {
            continue;
        };
        let owner = outer
            .iter()
            .enumerate()
            .filter(|&(_, &o)| depths[o] + 1 == depths[i] && contours[o].contains_point(probe))
            .min_by(|&(_, &a), &(_, &b)| contours[a].area().total_cmp(&contours[b].area()))
            .map(|(slot, _)| slot);
        if let Some(slot) = owner {
            holes[slot].push(contour.clone());
        }
    }

    outer
        .into_iter()
        .zip(holes)
        .map(|(o, h)| (contours[o].clone(), h))
        .collect()
}

/// True if two boundary edges run along each other in opposite directions
///
/// Either the segments are exact reverses within `eps`, or they are
/// collinear within `eps`, point opposite ways and overlap for more than
/// `eps` of length.
pub(crate) fn shares_edge(a: &Segment, b: &Segment, eps: f32) -> bool {
    if a.is_reverse_of(b, eps) {
        return true;
    }
    let len = a.length();
    if len <= eps || b.length() <= eps {
        return false;
    }
    let dir = a.direction() / len;
    if dir.dot(b.direction()) >= 0.0 {
        return false;
    }
    let offset = |p: Vec2| dir.perp_dot(p - a.start).abs();
    if offset(b.start) > eps || offset(b.end) > eps {
        return false;
    }
    let t0 = dir.dot(b.start - a.start);
    let t1 = dir.dot(b.end - a.start);
    t0.max(t1).min(len) - t0.min(t1).max(0.0) > eps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::EPSILON;

    fn square(min: (f32, f32), size: f32) -> Contour {
        let min = Vec2::new(min.0, min.1);
        Contour::rectangle(min, min + Vec2::splat(size))
    }

    #[test]
    fn test_region_normalizes_winding() {
        let region = Region::new(square((0.0, 0.0), 1.0).reversed(), vec![], TerrainSample::default());
        assert!(!region.outline().is_clockwise());
        assert_eq!(region.area(), 1.0);
        assert!(region.center().distance(Vec2::splat(0.5)) < 1e-6);
    }

    #[test]
    fn test_region_contains_with_hole() {
        let region = Region::new(
            square((0.0, 0.0), 1.0),
            vec![square((0.25, 0.25), 0.5)],
            TerrainSample::default(),
        );
        assert!(region.holes()[0].is_clockwise());
        assert!((region.area() - 0.75).abs() < 1e-6);
        assert!(region.contains(Vec2::new(0.1, 0.1)));
        assert!(!region.contains(Vec2::new(0.5, 0.5)));
        assert!(!region.contains(Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn test_bounds_contain_boundary() {
        let region = Region::new(
            Contour::new(vec![Vec2::new(0.0, 0.0), Vec2::new(0.3, -0.2), Vec2::new(0.1, 0.4)]),
            vec![],
            TerrainSample::default(),
        );
        for p in region.outline().points() {
            assert!(region.bounds().contains(*p));
        }
    }

    #[test]
    fn test_pieces_assigns_holes() {
        let polygon = Polygon::new(vec![
            square((0.0, 0.0), 1.0),
            square((0.25, 0.25), 0.5).reversed(),
            square((2.0, 0.0), 1.0),
        ]);
        let parts = pieces(&polygon);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].1.len(), 1);
        assert!(parts[1].1.is_empty());
    }

    #[test]
    fn test_pieces_island_in_hole() {
        let polygon = Polygon::new(vec![
            square((0.0, 0.0), 3.0),
            square((0.5, 0.5), 2.0).reversed(),
            square((1.0, 1.0), 1.0),
        ]);
        let parts = pieces(&polygon);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].1.len(), 1);
        assert!(parts[1].1.is_empty());
    }

    #[test]
    fn test_shares_edge() {
        let a = Segment::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0));
        assert!(shares_edge(&a, &a.reversed(), EPSILON));
        assert!(!shares_edge(&a, &a, EPSILON));

        // partial overlap along the same line
        let b = Segment::new(Vec2::new(1.5, 0.0), Vec2::new(0.5, 0.0));
        assert!(shares_edge(&a, &b, EPSILON));
        assert!(shares_edge(&b, &a, EPSILON));

        // touching only at a point
        let c = Segment::new(Vec2::new(2.0, 0.0), Vec2::new(1.0, 0.0));
        assert!(!shares_edge(&a, &c, EPSILON));

        // parallel but offset
        let d = Segment::new(Vec2::new(1.0, 0.1), Vec2::new(0.0, 0.1));
        assert!(!shares_edge(&a, &d, EPSILON));
    }
}
