//! Tolerance-aware geometric predicates.
//!
//! Everything here compares against an explicit `eps` rather than exact
//! zero. The sweep runs on floating-point boundary geometry, and which side
//! of a threshold a near-degenerate input lands on decides whether it gets
//! an extra split point; using one shared tolerance at every decision point
//! keeps those answers consistent with each other.

use crate::point::Point;

/// The default tolerance for approximate comparisons.
///
/// Every predicate takes `eps` as a parameter, and one engine run uses a
/// single value throughout. This is the value to use unless the caller's
/// coordinates are at an unusual scale.
pub const DEFAULT_EPS: f64 = 1e-12;

/// The coordinate axes selected for projecting a face onto a plane.
///
/// The sweep advances along axis `u` with `v` as the cross axis. `w` is the
/// leftover axis when the ambient dimension is 3, so a renderer can
/// re-embed the face; in other dimensions it is `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProjectionAxes {
    /// Index of the sweep axis.
    pub u: usize,
    /// Index of the cross axis.
    pub v: usize,
    /// Index of the remaining axis, in 3d only.
    pub w: Option<usize>,
}

fn dot(a: &Point, b: &Point) -> f64 {
    a.coords()
        .iter()
        .zip(b.coords())
        .map(|(x, y)| x * y)
        .sum()
}

/// Are `a`, `b` and `c` collinear (within `eps`)?
///
/// Degenerate triples where `b` or `c` coincides with `a` count as
/// collinear. Otherwise we test whether the angle at `a` is within `eps` of
/// 0 or π, via its cosine.
pub fn collinear(a: &Point, b: &Point, c: &Point, eps: f64) -> bool {
    if a.approx_eq(b, eps) || a.approx_eq(c, eps) {
        return true;
    }
    let ab = b.sub(a);
    let ac = c.sub(a);
    let cos = dot(&ab, &ac) / (ab.magnitude() * ac.magnitude());
    1.0 - cos.abs() <= eps
}

/// Do two direction vectors have the same slope, mod π?
///
/// Vertical directions (within `eps` of zero horizontal component) are only
/// slope-equal to other vertical directions.
pub fn slopes_equal(r: kurbo::Vec2, s: kurbo::Vec2, eps: f64) -> bool {
    let r_vertical = r.x.abs() <= eps;
    let s_vertical = s.x.abs() <= eps;
    if r_vertical || s_vertical {
        return r_vertical && s_vertical;
    }
    (r.y / r.x - s.y / s.x).abs() <= eps
}

/// The intersection of segments `ab` and `cd`, if they cross properly.
///
/// The segments are projected onto the plane spanned by coordinate axes `u`
/// and `v` and the 2×2 line system is solved there; the returned point is
/// interpolated in the full original dimension. Returns `None` for
/// slope-equal (parallel or anti-parallel) segments, and for intersections
/// within `eps` (in parameter space) of any endpoint: touching at an
/// endpoint is not a crossing.
///
/// # Panics
///
/// Panics if the points' dimensions differ.
pub fn segment_intersection(
    a: &Point,
    b: &Point,
    c: &Point,
    d: &Point,
    u: usize,
    v: usize,
    eps: f64,
) -> Option<Point> {
    let pa = a.project(u, v);
    let r = b.project(u, v) - pa;
    let pc = c.project(u, v);
    let s = d.project(u, v) - pc;

    if slopes_equal(r, s, eps) {
        return None;
    }

    let denom = r.cross(s);
    let q = pc - pa;
    let t = q.cross(s) / denom;
    let t2 = q.cross(r) / denom;
    if t < eps || t > 1.0 - eps || t2 < eps || t2 > 1.0 - eps {
        return None;
    }

    Some(a.add(&b.sub(a).scale(t)))
}

/// Choose the pair of coordinate axes that best represents a face's plane.
///
/// Given a non-degenerate triangle `a`, `b`, `c` on the face, this picks the
/// axis pair maximizing the triangle's unsigned projected area: the
/// highest-area projection is the one least likely to collapse a genuinely
/// non-degenerate face into a near-collinear sliver.
///
/// # Panics
///
/// Panics if the dimension is less than 2.
pub fn best_projection_axes(a: &Point, b: &Point, c: &Point) -> ProjectionAxes {
    let dim = a.dim();
    assert!(dim >= 2);

    let mut best = (0, 1);
    let mut best_area = -1.0;
    for u in 0..dim {
        for v in (u + 1)..dim {
            let area =
                ((b[u] - a[u]) * (c[v] - a[v]) - (b[v] - a[v]) * (c[u] - a[u])).abs();
            if area > best_area {
                best_area = area;
                best = (u, v);
            }
        }
    }

    ProjectionAxes {
        u: best.0,
        v: best.1,
        w: (dim == 3).then(|| 3 - best.0 - best.1),
    }
}
