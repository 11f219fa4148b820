//! Closed point loops and polygons built from them

use glam::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{cross, point_segment_distance_squared, Rect, Segment};

/// One closed boundary loop
///
/// The last point connects back to the first; the closing point is not
/// repeated. Counter-clockwise loops are outer boundaries, clockwise loops
/// are holes. The bounding rectangle is cached and kept current by every
/// mutating method.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    points: Vec<Vec2>,
    bounds: Rect,
}

impl Contour {
    /// Create a contour from an ordered point loop
    pub fn new(points: Vec<Vec2>) -> Self {
        let bounds = Rect::from_points(&points);
        Self { points, bounds }
    }

    /// Axis-aligned rectangle from `min` to `max`, counter-clockwise
    pub fn rectangle(min: Vec2, max: Vec2) -> Self {
        Self::new(vec![
            min,
            Vec2::new(max.x, min.y),
            max,
            Vec2::new(min.x, max.y),
        ])
    }

    /// The points of the loop
    #[inline]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Number of points
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if the contour has no points
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Cached bounding rectangle
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Append a point to the loop
    pub fn push(&mut self, point: Vec2) {
        self.points.push(point);
        self.bounds = self.bounds.including(point);
    }

    /// Insert a point before position `index`
    ///
    /// # Panics
    ///
    /// Panics if `index > self.len()`.
    pub fn insert(&mut self, index: usize, point: Vec2) {
        self.points.insert(index, point);
        self.bounds = self.bounds.including(point);
    }

    /// Replace the point at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn set(&mut self, index: usize, point: Vec2) {
        self.points[index] = point;
        self.bounds = Rect::from_points(&self.points);
    }

    /// Reverse the winding order
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Copy of this contour with the opposite winding
    pub fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        points.reverse();
        Self {
            points,
            bounds: self.bounds,
        }
    }

    /// Edge `index`, from point `index` to the next point (wrapping)
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn segment(&self, index: usize) -> Segment {
        let next = (index + 1) % self.points.len();
        Segment::new(self.points[index], self.points[next])
    }

    /// All edges of the closed loop, in order
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| Segment::new(self.points[i], self.points[(i + 1) % n]))
    }

    /// Shoelace area; positive when counter-clockwise
    pub fn signed_area(&self) -> f32 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..n {
            sum += self.points[i].perp_dot(self.points[(i + 1) % n]);
        }
        sum * 0.5
    }

    /// Enclosed area regardless of winding
    #[inline]
    pub fn area(&self) -> f32 {
        self.signed_area().abs()
    }

    /// True if the loop winds clockwise
    #[inline]
    pub fn is_clockwise(&self) -> bool {
        self.signed_area() < 0.0
    }

    /// Area centroid, or the vertex mean for loops without area
    pub fn centroid(&self) -> Vec2 {
        let n = self.points.len();
        if n == 0 {
            return Vec2::ZERO;
        }
        let area = self.signed_area();
        if area.abs() <= f32::EPSILON {
            return self.points.iter().copied().sum::<Vec2>() / n as f32;
        }
        // Shift to the first vertex to keep the products small
        let origin = self.points[0];
        let mut acc = Vec2::ZERO;
        for i in 0..n {
            let a = self.points[i] - origin;
            let b = self.points[(i + 1) % n] - origin;
            acc += (a + b) * a.perp_dot(b);
        }
        origin + acc / (6.0 * area)
    }

    /// Crossing-number point containment
    ///
    /// Rejects via the cached bounds first. A point on an edge is resolved
    /// by the half-open rule: the crossing test uses `y > p.y` on both
    /// endpoints and `p.x < x_cross`, so for an axis-aligned box the left
    /// and bottom edges are inside while the right and top edges are not.
    pub fn contains_point(&self, point: Vec2) -> bool {
        if self.points.len() < 3 || !self.bounds.contains(point) {
            return false;
        }
        self.crossing_test(point)
    }

    fn crossing_test(&self, point: Vec2) -> bool {
        let n = self.points.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[j];
            if (a.y > point.y) != (b.y > point.y) {
                let x_cross = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if point.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// True if `point` lies within `eps` of any edge
    pub fn is_on_boundary(&self, point: Vec2, eps: f32) -> bool {
        if !self.bounds.expanded(eps).contains(point) {
            return false;
        }
        self.segments()
            .any(|s| point_segment_distance_squared(point, &s) <= eps * eps)
    }

    /// Drop consecutive points closer than `eps`, including the closing pair
    pub fn remove_duplicates(&mut self, eps: f32) {
        let eps_sq = eps * eps;
        self.points.dedup_by(|b, a| a.distance_squared(*b) <= eps_sq);
        while self.points.len() > 1 {
            let first = self.points[0];
            let last = self.points[self.points.len() - 1];
            if first.distance_squared(last) <= eps_sq {
                self.points.pop();
            } else {
                break;
            }
        }
        self.bounds = Rect::from_points(&self.points);
    }

    /// Drop vertices lying on the straight line between their neighbours
    pub fn simplify_collinear(&mut self, eps: f32) {
        let mut changed = true;
        while changed && self.points.len() > 3 {
            changed = false;
            let n = self.points.len();
            for i in 0..n {
                let prev = self.points[(i + n - 1) % n];
                let cur = self.points[i];
                let next = self.points[(i + 1) % n];
                let base = prev.distance(next);
                if base == 0.0 {
                    continue;
                }
                let off_line = cross(prev, cur, next).abs() / base;
                let between = (cur - prev).dot(next - cur) >= 0.0;
                if off_line <= eps && between {
                    self.points.remove(i);
                    changed = true;
                    break;
                }
            }
        }
        self.bounds = Rect::from_points(&self.points);
    }

    /// True if any two non-adjacent edges cross
    pub fn is_self_intersecting(&self) -> bool {
        let n = self.points.len();
        if n < 4 {
            return false;
        }
        for i in 0..n {
            let a = self.segment(i);
            for j in (i + 2)..n {
                if i == 0 && j == n - 1 {
                    continue;
                }
                if super::intersects(&a, &self.segment(j)) {
                    return true;
                }
            }
        }
        false
    }
}

impl From<Vec<Vec2>> for Contour {
    fn from(points: Vec<Vec2>) -> Self {
        Self::new(points)
    }
}

/// A shape made of one or more contours
///
/// Outer loops wind counter-clockwise and holes clockwise once
/// [`Polygon::normalize_orientation`] has run. Containment uses the even-odd
/// rule over all contours. Cloning deep-copies every point sequence.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    contours: Vec<Contour>,
}

impl Polygon {
    /// Create a polygon from its contours
    pub fn new(contours: Vec<Contour>) -> Self {
        Self { contours }
    }

    /// A polygon with no contours
    pub fn empty() -> Self {
        Self::default()
    }

    /// The contours of this polygon
    #[inline]
    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    /// Consume the polygon, yielding its contours
    pub fn into_contours(self) -> Vec<Contour> {
        self.contours
    }

    /// Add a contour
    pub fn push(&mut self, contour: Contour) {
        self.contours.push(contour);
    }

    /// True if there are no contours
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    /// Bounding rectangle of every contour
    pub fn bounds(&self) -> Rect {
        self.contours
            .iter()
            .fold(Rect::EMPTY, |rect, c| rect.union(c.bounds()))
    }

    /// Number of other contours enclosing contour `index`
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a contour of this polygon.
    pub fn nesting_depth(&self, index: usize) -> usize {
        let Some(probe) = self.contours[index].points().first().copied() else {
            return 0;
        };
        self.contours
            .iter()
            .enumerate()
            .filter(|(i, c)| *i != index && c.contains_point(probe))
            .count()
    }

    /// Enclosed area; holes subtract
    pub fn area(&self) -> f32 {
        (0..self.contours.len())
            .map(|i| {
                let area = self.contours[i].area();
                if self.nesting_depth(i) % 2 == 0 {
                    area
                } else {
                    -area
                }
            })
            .sum()
    }

    /// Even-odd containment over all contours
    pub fn contains_point(&self, point: Vec2) -> bool {
        self.contours
            .iter()
            .filter(|c| c.contains_point(point))
            .count()
            % 2
            == 1
    }

    /// True if `point` lies within `eps` of any contour edge
    pub fn is_on_boundary(&self, point: Vec2, eps: f32) -> bool {
        self.contours.iter().any(|c| c.is_on_boundary(point, eps))
    }

    /// Wind outer loops counter-clockwise and holes clockwise
    pub fn normalize_orientation(&mut self) {
        let depths: Vec<usize> = (0..self.contours.len())
            .map(|i| self.nesting_depth(i))
            .collect();
        for (contour, depth) in self.contours.iter_mut().zip(depths) {
            let want_clockwise = depth % 2 == 1;
            if contour.is_clockwise() != want_clockwise {
                contour.reverse();
            }
        }
    }
}

impl From<Contour> for Polygon {
    fn from(contour: Contour) -> Self {
        Self::new(vec![contour])
    }
}

impl From<Vec<Contour>> for Polygon {
    fn from(contours: Vec<Contour>) -> Self {
        Self::new(contours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::EPSILON;

    fn unit_square() -> Contour {
        Contour::rectangle(Vec2::ZERO, Vec2::ONE)
    }

    #[test]
    fn test_signed_area_and_winding() {
        let square = unit_square();
        assert_eq!(square.signed_area(), 1.0);
        assert!(!square.is_clockwise());

        let reversed = square.reversed();
        assert_eq!(reversed.signed_area(), -1.0);
        assert!(reversed.is_clockwise());
        assert_eq!(reversed.bounds(), square.bounds());
    }

    #[test]
    fn test_centroid() {
        let contour = Contour::rectangle(Vec2::new(1.0, 1.0), Vec2::new(3.0, 2.0));
        assert!(contour.centroid().distance(Vec2::new(2.0, 1.5)) < 1e-6);
    }

    #[test]
    fn test_bounds_follow_mutation() {
        let mut contour = unit_square();
        contour.push(Vec2::new(-1.0, 0.5));
        assert_eq!(contour.bounds().min.x, -1.0);

        contour.set(4, Vec2::new(0.0, 0.5));
        assert_eq!(contour.bounds().min.x, 0.0);

        contour.insert(1, Vec2::new(0.5, -2.0));
        assert_eq!(contour.bounds().min.y, -2.0);
    }

    #[test]
    fn test_contains_interior_and_exterior() {
        let square = unit_square();
        assert!(square.contains_point(Vec2::new(0.5, 0.5)));
        assert!(!square.contains_point(Vec2::new(1.5, 0.5)));
        assert!(!square.contains_point(Vec2::new(-5.0, -5.0)));
    }

    #[test]
    fn test_edge_rule_is_half_open() {
        let square = unit_square();
        assert!(square.contains_point(Vec2::new(0.0, 0.5)));
        assert!(square.contains_point(Vec2::new(0.5, 0.0)));
        assert!(!square.contains_point(Vec2::new(1.0, 0.5)));
        assert!(!square.contains_point(Vec2::new(0.5, 1.0)));
    }

    #[test]
    fn test_contains_concave() {
        // U shape opening upwards
        let contour = Contour::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(3.0, 0.0),
            Vec2::new(3.0, 3.0),
            Vec2::new(2.0, 3.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 3.0),
            Vec2::new(0.0, 3.0),
        ]);
        assert!(contour.contains_point(Vec2::new(0.5, 2.0)));
        assert!(!contour.contains_point(Vec2::new(1.5, 2.0)));
        assert!(contour.contains_point(Vec2::new(1.5, 0.5)));
    }

    #[test]
    fn test_remove_duplicates() {
        let mut contour = Contour::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(0.0, 0.000001),
        ]);
        contour.remove_duplicates(EPSILON);
        assert_eq!(contour.len(), 4);
    }

    #[test]
    fn test_simplify_collinear() {
        let mut contour = Contour::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(0.5, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ]);
        contour.simplify_collinear(EPSILON);
        assert_eq!(
            contour.points(),
            &[Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0)]
        );
    }

    #[test]
    fn test_self_intersection_detection() {
        assert!(!unit_square().is_self_intersecting());
        let bowtie = Contour::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
        ]);
        assert!(bowtie.is_self_intersecting());
    }

    #[test]
    fn test_polygon_with_hole() {
        let mut polygon = Polygon::new(vec![
            Contour::rectangle(Vec2::ZERO, Vec2::splat(4.0)),
            Contour::rectangle(Vec2::ONE, Vec2::splat(3.0)),
        ]);
        polygon.normalize_orientation();

        assert!(!polygon.contours()[0].is_clockwise());
        assert!(polygon.contours()[1].is_clockwise());
        assert_eq!(polygon.area(), 12.0);
        assert!(polygon.contains_point(Vec2::new(0.5, 0.5)));
        assert!(!polygon.contains_point(Vec2::new(2.0, 2.0)));
    }

    #[test]
    fn test_clone_is_deep() {
        let polygon = Polygon::from(unit_square());
        let mut copy = polygon.clone();
        copy.push(Contour::rectangle(Vec2::splat(5.0), Vec2::splat(6.0)));
        assert_eq!(polygon.contours().len(), 1);
        assert_eq!(copy.contours().len(), 2);
    }

    #[test]
    #[should_panic]
    fn test_set_out_of_bounds_panics() {
        let mut contour = unit_square();
        contour.set(4, Vec2::ZERO);
    }

    #[test]
    #[should_panic]
    fn test_nesting_depth_out_of_bounds_panics() {
        let polygon = Polygon::from(unit_square());
        polygon.nesting_depth(1);
    }
}
