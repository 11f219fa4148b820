//! Boundary arcs between crossing points of two polygons
//!
//! Both polygons' contours are augmented with every point where they meet,
//! then cut at those points into arcs. Each arc is classified against the
//! other polygon and later stitched into result contours.

use glam::Vec2;

use crate::geometry::{
    point_segment_distance_squared, segment_intersection, Contour, Polygon, Segment,
};

/// Which input an arc came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Side {
    Subject,
    Clip,
}

/// Position of an arc relative to the other polygon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ArcClass {
    Inside,
    Outside,
    /// Runs along the other boundary in the same direction
    SharedSame,
    /// Runs along the other boundary in the opposite direction
    SharedOpposite,
}

/// A run of boundary between two crossing points, or a whole loop
#[derive(Debug, Clone)]
pub(super) struct Arc {
    pub points: Vec<Vec2>,
    pub closed: bool,
    pub side: Side,
    pub class: ArcClass,
}

#[derive(Debug, Clone, Copy)]
struct Vertex {
    point: Vec2,
    node: bool,
}

/// Split points recorded along one edge: (parameter, point)
type EdgeSplits = Vec<(f32, Vec2)>;

/// Augmented rings for both polygons plus the number of contact events
pub(super) struct Augmented {
    subject: Vec<Vec<Vertex>>,
    clip: Vec<Vec<Vertex>>,
    pub contacts: usize,
}

fn edge_param(segment: &Segment, point: Vec2) -> f32 {
    let d = segment.direction();
    let len_sq = d.length_squared();
    if len_sq == 0.0 {
        return 0.0;
    }
    ((point - segment.start).dot(d) / len_sq).clamp(0.0, 1.0)
}

/// Replace `point` with an endpoint of either segment if one lies within `eps`
fn snap(point: Vec2, a: &Segment, b: &Segment, eps: f32) -> Vec2 {
    let eps_sq = eps * eps;
    [a.start, a.end, b.start, b.end]
        .into_iter()
        .find(|v| v.distance_squared(point) <= eps_sq)
        .unwrap_or(point)
}

fn is_collinear(a: &Segment, b: &Segment, eps: f32) -> bool {
    let line_len = a.length();
    if line_len == 0.0 {
        return false;
    }
    let d = a.direction();
    let off = |p: Vec2| d.perp_dot(p - a.start).abs() / line_len;
    off(b.start) <= eps && off(b.end) <= eps
}

fn record_contacts(
    a: &Segment,
    b: &Segment,
    a_splits: &mut EdgeSplits,
    b_splits: &mut EdgeSplits,
    eps: f32,
) -> usize {
    if !a.bounds().expanded(eps).intersects(&b.bounds()) {
        return 0;
    }
    if let Some(hit) = segment_intersection(a, b, eps) {
        let point = snap(hit.point, a, b, eps);
        a_splits.push((edge_param(a, point), point));
        b_splits.push((edge_param(b, point), point));
        return 1;
    }
    if !is_collinear(a, b, eps) {
        return 0;
    }
    // Overlapping collinear edges: every endpoint lying on the other edge
    // becomes a split point on both.
    let eps_sq = eps * eps;
    let mut contacts = 0;
    for point in [b.start, b.end] {
        if point_segment_distance_squared(point, a) <= eps_sq {
            a_splits.push((edge_param(a, point), point));
            b_splits.push((edge_param(b, point), point));
            contacts += 1;
        }
    }
    for point in [a.start, a.end] {
        if point_segment_distance_squared(point, b) <= eps_sq {
            a_splits.push((edge_param(a, point), point));
            b_splits.push((edge_param(b, point), point));
            contacts += 1;
        }
    }
    contacts
}

/// Insert every contact point into both polygons' contours
pub(super) fn augment(subject: &Polygon, clip: &Polygon, eps: f32) -> Augmented {
    let mut subject_splits: Vec<Vec<EdgeSplits>> = subject
        .contours()
        .iter()
        .map(|c| vec![Vec::new(); c.len()])
        .collect();
    let mut clip_splits: Vec<Vec<EdgeSplits>> = clip
        .contours()
        .iter()
        .map(|c| vec![Vec::new(); c.len()])
        .collect();

    let mut contacts = 0;
    for (si, s_contour) in subject.contours().iter().enumerate() {
        for (ci, c_contour) in clip.contours().iter().enumerate() {
            if !s_contour.bounds().expanded(eps).intersects(&c_contour.bounds()) {
                continue;
            }
            for (ea, a) in s_contour.segments().enumerate() {
                for (eb, b) in c_contour.segments().enumerate() {
                    contacts += record_contacts(
                        &a,
                        &b,
                        &mut subject_splits[si][ea],
                        &mut clip_splits[ci][eb],
                        eps,
                    );
                }
            }
        }
    }

    Augmented {
        subject: build_rings(subject.contours(), subject_splits, eps),
        clip: build_rings(clip.contours(), clip_splits, eps),
        contacts,
    }
}

fn build_rings(contours: &[Contour], splits: Vec<Vec<EdgeSplits>>, eps: f32) -> Vec<Vec<Vertex>> {
    let eps_sq = eps * eps;
    contours
        .iter()
        .zip(splits)
        .map(|(contour, mut edge_splits)| {
            let n = contour.len();
            let points = contour.points();
            let mut vertex_node = vec![false; n];
            for (i, splits) in edge_splits.iter().enumerate() {
                let next = (i + 1) % n;
                for &(_, p) in splits {
                    if p.distance_squared(points[i]) <= eps_sq {
                        vertex_node[i] = true;
                    } else if p.distance_squared(points[next]) <= eps_sq {
                        vertex_node[next] = true;
                    }
                }
            }

            let mut ring = Vec::with_capacity(n);
            for (i, splits) in edge_splits.iter_mut().enumerate() {
                let start = points[i];
                let end = points[(i + 1) % n];
                ring.push(Vertex {
                    point: start,
                    node: vertex_node[i],
                });
                splits.sort_by(|a, b| a.0.total_cmp(&b.0));
                let mut last = start;
                for &(_, p) in splits.iter() {
                    if p.distance_squared(last) <= eps_sq || p.distance_squared(end) <= eps_sq {
                        continue;
                    }
                    ring.push(Vertex { point: p, node: true });
                    last = p;
                }
            }
            ring
        })
        .collect()
}

impl Augmented {
    /// Cut every ring into arcs and classify them against the other polygon
    pub(super) fn into_arcs(self, subject: &Polygon, clip: &Polygon, eps: f32) -> Vec<Arc> {
        let mut arcs = Vec::new();
        for ring in &self.subject {
            cut_ring(ring, Side::Subject, clip, eps, &mut arcs);
        }
        for ring in &self.clip {
            cut_ring(ring, Side::Clip, subject, eps, &mut arcs);
        }
        arcs
    }
}

fn cut_ring(ring: &[Vertex], side: Side, other: &Polygon, eps: f32, out: &mut Vec<Arc>) {
    let nodes: Vec<usize> = ring
        .iter()
        .enumerate()
        .filter(|(_, v)| v.node)
        .map(|(i, _)| i)
        .collect();

    if nodes.is_empty() {
        let points: Vec<Vec2> = ring.iter().map(|v| v.point).collect();
        let class = if other.contains_point(points[0]) {
            ArcClass::Inside
        } else {
            ArcClass::Outside
        };
        out.push(Arc {
            points,
            closed: true,
            side,
            class,
        });
        return;
    }

    let n = ring.len();
    for (k, &from) in nodes.iter().enumerate() {
        let to = nodes[(k + 1) % nodes.len()];
        let mut points = vec![ring[from].point];
        let mut i = from;
        loop {
            i = (i + 1) % n;
            points.push(ring[i].point);
            if i == to {
                break;
            }
        }
        let class = classify(points[0], points[1], other, eps);
        out.push(Arc {
            points,
            closed: false,
            side,
            class,
        });
    }
}

/// Classify the arc whose first edge runs from `a` to `b`
fn classify(a: Vec2, b: Vec2, other: &Polygon, eps: f32) -> ArcClass {
    let eps_sq = eps * eps;
    let probe = (a + b) * 0.5;
    let direction = b - a;
    for contour in other.contours() {
        if !contour.bounds().expanded(eps).contains(probe) {
            continue;
        }
        for edge in contour.segments() {
            let on_edge = |p: Vec2| point_segment_distance_squared(p, &edge) <= eps_sq;
            if on_edge(a) && on_edge(b) && on_edge(probe) {
                return if direction.dot(edge.direction()) > 0.0 {
                    ArcClass::SharedSame
                } else {
                    ArcClass::SharedOpposite
                };
            }
        }
    }
    if other.contains_point(probe) {
        ArcClass::Inside
    } else {
        ArcClass::Outside
    }
}
