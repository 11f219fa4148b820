//! 2D geometry primitives
//!
//! Points are `glam::Vec2` values in the normalized world frame. Segments are
//! directional and compared by endpoint equality. Everything here is a pure
//! function of its inputs.

mod contour;

pub use contour::{Contour, Polygon};

use glam::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point in the normalized world frame
pub type Point2D = Vec2;

/// Distance under which two points are considered coincident
pub const EPSILON: f32 = 1e-5;

/// Turn direction of three points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Left turn
    CounterClockwise,
    /// Right turn
    Clockwise,
    /// No turn
    Collinear,
}

/// Twice the signed area of triangle (a, b, c); positive for a left turn
#[inline]
pub fn cross(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - a)
}

/// Classify the turn a -> b -> c
pub fn orientation(a: Vec2, b: Vec2, c: Vec2) -> Orientation {
    let value = cross(a, b, c);
    if value > f32::EPSILON {
        Orientation::CounterClockwise
    } else if value < -f32::EPSILON {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}

/// Rotate `point` around `origin` by `angle` radians (counter-clockwise)
#[inline]
pub fn rotate(point: Vec2, origin: Vec2, angle: f32) -> Vec2 {
    origin + Vec2::from_angle(angle).rotate(point - origin)
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Squared distance from a point to the closest point of a segment
pub fn point_segment_distance_squared(point: Vec2, segment: &Segment) -> f32 {
    let d = segment.end - segment.start;
    let len_sq = d.length_squared();
    if len_sq == 0.0 {
        return point.distance_squared(segment.start);
    }
    let t = ((point - segment.start).dot(d) / len_sq).clamp(0.0, 1.0);
    point.distance_squared(segment.start + d * t)
}

/// A directional line segment
///
/// Two segments are equal only if their starts and ends match; a segment is
/// not equal to its reverse.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// First endpoint
    pub start: Vec2,
    /// Second endpoint
    pub end: Vec2,
}

impl Segment {
    /// Create a segment from two endpoints
    #[inline]
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    /// Squared length, for comparisons that do not need the square root
    #[inline]
    pub fn squared_length(&self) -> f32 {
        self.start.distance_squared(self.end)
    }

    /// Length of the segment
    #[inline]
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// Vector from start to end
    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.end - self.start
    }

    /// Point halfway along the segment
    #[inline]
    pub fn midpoint(&self) -> Vec2 {
        (self.start + self.end) * 0.5
    }

    /// Point at parameter `t` (0 = start, 1 = end)
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec2 {
        self.start + self.direction() * t
    }

    /// The same segment walked the other way
    #[inline]
    pub fn reversed(&self) -> Self {
        Self::new(self.end, self.start)
    }

    /// True if both endpoints coincide
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.squared_length() == 0.0
    }

    /// True if `other` is this segment walked backwards, within `eps`
    pub fn is_reverse_of(&self, other: &Segment, eps: f32) -> bool {
        self.start.distance_squared(other.end) <= eps * eps
            && self.end.distance_squared(other.start) <= eps * eps
    }

    /// Bounding rectangle of the segment
    pub fn bounds(&self) -> Rect {
        Rect::new(self.start.min(self.end), self.start.max(self.end))
    }
}

/// Test whether two segments cross
///
/// Returns true iff the segments meet at a parameter within [0, 1] on both.
/// Segments chained end-to-start (`a.end == b.start` or `b.end == a.start`)
/// are reported as non-intersecting so consecutive contour edges never test
/// positive. Degenerate and parallel segments report no intersection.
///
/// # Example
///
/// ```
/// use region_atlas::geometry::{intersects, Segment};
/// use glam::Vec2;
///
/// let a = Segment::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
/// let b = Segment::new(Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0));
/// assert!(intersects(&a, &b));
///
/// let c = Segment::new(Vec2::new(1.0, 1.0), Vec2::new(2.0, 0.0));
/// assert!(!intersects(&a, &c));
/// ```
pub fn intersects(a: &Segment, b: &Segment) -> bool {
    if a.is_degenerate() || b.is_degenerate() {
        return false;
    }
    if a.end == b.start || b.end == a.start {
        return false;
    }
    let d1 = a.direction();
    let d2 = b.direction();
    let denom = d1.perp_dot(d2);
    if denom == 0.0 {
        return false;
    }
    let offset = b.start - a.start;
    let t = offset.perp_dot(d2) / denom;
    let u = offset.perp_dot(d1) / denom;
    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

/// Where two segments meet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    /// Parameter along the first segment
    pub t: f32,
    /// Parameter along the second segment
    pub u: f32,
    /// The meeting point
    pub point: Vec2,
}

/// Parametric intersection of two non-parallel segments
///
/// Unlike [`intersects`], shared endpoints count, and parameters within
/// `eps` (relative to each segment's length) of the [0, 1] range are accepted
/// and clamped. Parallel, collinear and degenerate pairs return `None`.
pub fn segment_intersection(a: &Segment, b: &Segment, eps: f32) -> Option<SegmentHit> {
    let la = a.length();
    let lb = b.length();
    if la == 0.0 || lb == 0.0 {
        return None;
    }
    let d1 = a.direction();
    let d2 = b.direction();
    let denom = d1.perp_dot(d2);
    if denom.abs() <= f32::EPSILON * la * lb {
        return None;
    }
    let offset = b.start - a.start;
    let t = offset.perp_dot(d2) / denom;
    let u = offset.perp_dot(d1) / denom;
    let (tol_a, tol_b) = (eps / la, eps / lb);
    if t < -tol_a || t > 1.0 + tol_a || u < -tol_b || u > 1.0 + tol_b {
        return None;
    }
    let t = t.clamp(0.0, 1.0);
    Some(SegmentHit {
        t,
        u: u.clamp(0.0, 1.0),
        point: a.point_at(t),
    })
}

/// Axis-aligned bounding rectangle
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Lower-left corner
    pub min: Vec2,
    /// Upper-right corner
    pub max: Vec2,
}

impl Rect {
    /// A rectangle that contains nothing; growing it yields the first point
    pub const EMPTY: Rect = Rect {
        min: Vec2::splat(f32::INFINITY),
        max: Vec2::splat(f32::NEG_INFINITY),
    };

    /// Create a rectangle from its corners
    #[inline]
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Smallest rectangle containing all points
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec2>) -> Self {
        points.into_iter().fold(Rect::EMPTY, |rect, p| rect.including(*p))
    }

    /// True if no point has been added
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// This rectangle grown to contain `point`
    #[inline]
    pub fn including(self, point: Vec2) -> Self {
        Self::new(self.min.min(point), self.max.max(point))
    }

    /// Union of two rectangles
    #[inline]
    pub fn union(self, other: Rect) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// This rectangle grown by `margin` on every side
    #[inline]
    pub fn expanded(self, margin: f32) -> Self {
        Self::new(self.min - Vec2::splat(margin), self.max + Vec2::splat(margin))
    }

    /// Point containment, edges included
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// True if the rectangles overlap or touch
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Center point
    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Width and height
    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(x1: f32, y1: f32, x2: f32, y2: f32) -> Segment {
        Segment::new(Vec2::new(x1, y1), Vec2::new(x2, y2))
    }

    #[test]
    fn test_crossing_segments_intersect() {
        assert!(intersects(&seg(0.0, 0.0, 1.0, 1.0), &seg(0.0, 1.0, 1.0, 0.0)));
    }

    #[test]
    fn test_chained_segments_do_not_intersect() {
        let a = seg(0.0, 0.0, 1.0, 0.0);
        let b = seg(1.0, 0.0, 1.0, 1.0);
        assert!(!intersects(&a, &b));
        assert!(!intersects(&b, &a));
    }

    #[test]
    fn test_t_junction_intersects() {
        // b starts on the interior of a
        assert!(intersects(&seg(0.0, 0.0, 2.0, 0.0), &seg(1.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn test_disjoint_and_parallel_segments() {
        assert!(!intersects(&seg(0.0, 0.0, 1.0, 0.0), &seg(0.0, 1.0, 1.0, 1.0)));
        assert!(!intersects(&seg(0.0, 0.0, 1.0, 1.0), &seg(2.0, 0.0, 3.0, -1.0)));
    }

    #[test]
    fn test_degenerate_segment_never_intersects() {
        let point = seg(0.5, 0.5, 0.5, 0.5);
        assert!(!intersects(&point, &seg(0.0, 0.0, 1.0, 1.0)));
        assert!(!intersects(&point, &point));
        assert!(segment_intersection(&point, &seg(0.0, 0.0, 1.0, 1.0), EPSILON).is_none());
    }

    #[test]
    fn test_segment_intersection_point() {
        let hit = segment_intersection(&seg(0.0, 0.0, 2.0, 0.0), &seg(1.0, -1.0, 1.0, 1.0), EPSILON)
            .unwrap();
        assert!((hit.t - 0.5).abs() < 1e-6);
        assert!((hit.u - 0.5).abs() < 1e-6);
        assert!(hit.point.distance(Vec2::new(1.0, 0.0)) < 1e-6);
    }

    #[test]
    fn test_segment_intersection_counts_shared_endpoint() {
        let hit = segment_intersection(&seg(0.0, 0.0, 1.0, 0.0), &seg(1.0, 0.0, 1.0, 1.0), EPSILON)
            .unwrap();
        assert_eq!(hit.t, 1.0);
        assert_eq!(hit.u, 0.0);
    }

    #[test]
    fn test_squared_length() {
        assert_eq!(seg(0.0, 0.0, 3.0, 4.0).squared_length(), 25.0);
        assert_eq!(seg(0.0, 0.0, 3.0, 4.0).length(), 5.0);
    }

    #[test]
    fn test_segment_equality_is_directional() {
        let a = seg(0.0, 0.0, 1.0, 0.0);
        assert_eq!(a, seg(0.0, 0.0, 1.0, 0.0));
        assert_ne!(a, a.reversed());
        assert!(a.is_reverse_of(&a.reversed(), EPSILON));
    }

    #[test]
    fn test_orientation() {
        let a = Vec2::ZERO;
        let b = Vec2::new(1.0, 0.0);
        assert_eq!(orientation(a, b, Vec2::new(1.0, 1.0)), Orientation::CounterClockwise);
        assert_eq!(orientation(a, b, Vec2::new(1.0, -1.0)), Orientation::Clockwise);
        assert_eq!(orientation(a, b, Vec2::new(2.0, 0.0)), Orientation::Collinear);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let rotated = rotate(Vec2::new(1.0, 0.0), Vec2::ZERO, std::f32::consts::FRAC_PI_2);
        assert!(rotated.distance(Vec2::new(0.0, 1.0)) < 1e-6);
    }

    #[test]
    fn test_point_segment_distance() {
        let s = seg(0.0, 0.0, 2.0, 0.0);
        assert_eq!(point_segment_distance_squared(Vec2::new(1.0, 1.0), &s), 1.0);
        assert_eq!(point_segment_distance_squared(Vec2::new(3.0, 0.0), &s), 1.0);
    }

    #[test]
    fn test_rect_operations() {
        let points = [Vec2::new(0.0, 1.0), Vec2::new(2.0, -1.0), Vec2::new(1.0, 0.0)];
        let rect = Rect::from_points(&points);
        assert_eq!(rect.min, Vec2::new(0.0, -1.0));
        assert_eq!(rect.max, Vec2::new(2.0, 1.0));
        assert!(rect.contains(Vec2::new(2.0, 1.0)));
        assert!(!rect.contains(Vec2::new(2.1, 0.0)));
        assert!(Rect::EMPTY.is_empty());
        assert!(!rect.is_empty());

        let other = Rect::new(Vec2::new(2.0, 0.0), Vec2::new(3.0, 3.0));
        assert!(rect.intersects(&other));
        assert!(!rect.intersects(&Rect::new(Vec2::new(2.5, 0.0), Vec2::new(3.0, 3.0))));
    }
}
