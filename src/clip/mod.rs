//! Polygon boolean operations
//!
//! Computes union, intersection and difference of two polygons. Every point
//! where the boundaries meet is inserted into both polygons' contours, the
//! contours are cut into arcs at those points, each arc is classified as
//! inside, outside or shared with the other polygon, and the arcs selected by
//! the operation are stitched back into closed loops. A contour the other
//! boundary never touches stays whole and is classified on its own.
//!
//! The routine is deterministic for a given input ordering: stitching always
//! starts from the first unused arc, subject arcs before clip arcs.
//!
//! # Example
//!
//! ```
//! use region_atlas::{clip, ClipOperation, Contour, Polygon};
//! use glam::Vec2;
//!
//! let a = Polygon::from(Contour::rectangle(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0)));
//! let b = Polygon::from(Contour::rectangle(Vec2::new(0.5, 0.0), Vec2::new(1.5, 1.0)));
//!
//! let strip = clip(&a, &b, ClipOperation::Intersection);
//! assert_eq!(strip.contours().len(), 1);
//! assert!((strip.area() - 0.5).abs() < 1e-6);
//! ```

mod arcs;

use glam::Vec2;
use log::{trace, warn};

use crate::geometry::{Contour, Polygon, EPSILON};
use arcs::{Arc, ArcClass, Side};

/// Boolean operation applied by [`clip`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipOperation {
    /// Area covered by either polygon
    Union,
    /// Area covered by both polygons
    Intersection,
    /// Area of the subject not covered by the clip polygon
    Difference,
}

/// Which input a diagnostic refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipInput {
    /// The first polygon
    Subject,
    /// The second polygon
    Clip,
}

/// Problems found while clipping; the result is still produced
#[derive(Debug, Clone, PartialEq)]
pub enum ClipDiagnostic {
    /// A contour with fewer than three distinct points was ignored
    DroppedDegenerateContour {
        /// Input the contour belonged to
        input: ClipInput,
        /// Index of the contour within that input
        contour: usize,
    },
    /// A contour crosses itself; the result may be inexact
    SelfIntersection {
        /// Input the contour belonged to
        input: ClipInput,
        /// Index of the contour within that input
        contour: usize,
    },
    /// Stitching could not close a loop; the partial loop was closed directly
    OpenChain {
        /// Point where the chain stopped
        at: Vec2,
    },
}

/// Result polygon plus any diagnostics raised while computing it
#[derive(Debug, Clone, PartialEq)]
pub struct ClipOutcome {
    /// The resulting shape
    pub polygon: Polygon,
    /// Input or stitching problems
    pub diagnostics: Vec<ClipDiagnostic>,
}

/// Compute a boolean combination of two polygons
///
/// Diagnostics are logged at warn level; use [`clip_with_diagnostics`] to
/// inspect them.
pub fn clip(subject: &Polygon, clip: &Polygon, operation: ClipOperation) -> Polygon {
    let outcome = clip_with_diagnostics(subject, clip, operation);
    for diagnostic in &outcome.diagnostics {
        warn!("{:?} clip: {:?}", operation, diagnostic);
    }
    outcome.polygon
}

/// Compute a boolean combination of two polygons, returning diagnostics
pub fn clip_with_diagnostics(
    subject: &Polygon,
    clip: &Polygon,
    operation: ClipOperation,
) -> ClipOutcome {
    let mut diagnostics = Vec::new();
    let subject = sanitize(subject, ClipInput::Subject, &mut diagnostics);
    let clip = sanitize(clip, ClipInput::Clip, &mut diagnostics);

    if subject.is_empty() || clip.is_empty() {
        let polygon = match operation {
            ClipOperation::Union => concat(&subject, &clip),
            ClipOperation::Intersection => Polygon::empty(),
            ClipOperation::Difference => subject,
        };
        return ClipOutcome { polygon, diagnostics };
    }

    if !subject.bounds().expanded(EPSILON).intersects(&clip.bounds()) {
        return ClipOutcome {
            polygon: disjoint_result(subject, clip, operation),
            diagnostics,
        };
    }

    let augmented = arcs::augment(&subject, &clip, EPSILON);
    trace!("{:?} clip: {} boundary contacts", operation, augmented.contacts);
    let selected: Vec<Arc> = augmented
        .into_arcs(&subject, &clip, EPSILON)
        .into_iter()
        .filter_map(|arc| select(arc, operation))
        .collect();

    let polygon = stitch(selected, &mut diagnostics);
    ClipOutcome { polygon, diagnostics }
}

/// Drop unusable contours and normalize winding
fn sanitize(polygon: &Polygon, input: ClipInput, diagnostics: &mut Vec<ClipDiagnostic>) -> Polygon {
    let mut contours = Vec::with_capacity(polygon.contours().len());
    for (index, contour) in polygon.contours().iter().enumerate() {
        let mut contour = contour.clone();
        contour.remove_duplicates(EPSILON);
        if contour.len() < 3 || contour.area() <= EPSILON * EPSILON {
            diagnostics.push(ClipDiagnostic::DroppedDegenerateContour { input, contour: index });
            continue;
        }
        if contour.is_self_intersecting() {
            diagnostics.push(ClipDiagnostic::SelfIntersection { input, contour: index });
        }
        contours.push(contour);
    }
    let mut polygon = Polygon::new(contours);
    polygon.normalize_orientation();
    polygon
}

fn concat(a: &Polygon, b: &Polygon) -> Polygon {
    a.contours()
        .iter()
        .chain(b.contours())
        .cloned()
        .collect::<Vec<_>>()
        .into()
}

fn disjoint_result(subject: Polygon, clip: Polygon, operation: ClipOperation) -> Polygon {
    match operation {
        ClipOperation::Union => concat(&subject, &clip),
        ClipOperation::Intersection => Polygon::empty(),
        ClipOperation::Difference => subject,
    }
}

/// Keep the arcs that bound the requested result, reversing where needed
fn select(mut arc: Arc, operation: ClipOperation) -> Option<Arc> {
    use ArcClass::*;

    let keep = match (operation, arc.side, arc.class) {
        (ClipOperation::Union, Side::Subject, Outside | SharedSame) => true,
        (ClipOperation::Union, Side::Clip, Outside) => true,
        (ClipOperation::Intersection, Side::Subject, Inside | SharedSame) => true,
        (ClipOperation::Intersection, Side::Clip, Inside) => true,
        (ClipOperation::Difference, Side::Subject, Outside | SharedOpposite) => true,
        (ClipOperation::Difference, Side::Clip, Inside) => {
            arc.points.reverse();
            true
        }
        _ => false,
    };
    keep.then_some(arc)
}

/// Join arcs end-to-start into closed contours
fn stitch(arcs: Vec<Arc>, diagnostics: &mut Vec<ClipDiagnostic>) -> Polygon {
    let eps_sq = EPSILON * EPSILON;
    let mut used = vec![false; arcs.len()];
    let mut contours = Vec::new();

    for first in 0..arcs.len() {
        if used[first] {
            continue;
        }
        used[first] = true;
        if arcs[first].closed {
            push_contour(&mut contours, arcs[first].points.clone());
            continue;
        }

        let mut chain = arcs[first].points.clone();
        loop {
            let Some(&end) = chain.last() else {
                break;
            };
            if chain.len() > 1 && end.distance_squared(chain[0]) <= eps_sq {
                chain.pop();
                push_contour(&mut contours, chain);
                break;
            }
            let next = (0..arcs.len()).find(|&j| {
                !used[j] && !arcs[j].closed && arcs[j].points[0].distance_squared(end) <= eps_sq
            });
            match next {
                Some(j) => {
                    used[j] = true;
                    chain.extend_from_slice(&arcs[j].points[1..]);
                }
                None => {
                    diagnostics.push(ClipDiagnostic::OpenChain { at: end });
                    push_contour(&mut contours, chain);
                    break;
                }
            }
        }
    }

    Polygon::new(contours)
}

fn push_contour(contours: &mut Vec<Contour>, points: Vec<Vec2>) {
    let mut contour = Contour::new(points);
    contour.remove_duplicates(EPSILON);
    contour.simplify_collinear(EPSILON);
    if contour.len() >= 3 && contour.area() > EPSILON * EPSILON {
        contours.push(contour);
    }
}
