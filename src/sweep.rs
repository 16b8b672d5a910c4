//! The sweep-line arrangement engine.
//!
//! This takes one face boundary — a closed cycle of points, possibly
//! self-intersecting — and splits every pairwise edge crossing, rewiring
//! the boundary into a union of simple closed loops. It is a
//! Bentley–Ottmann sweep specialized to "divide only": we never build an
//! arrangement graph, we just keep cutting edges at crossings until none
//! are left, which is all a polygon filler downstream needs.
//!
//! The sweep advances along one projection axis. Vertices are events,
//! ordered by projected coordinates with the vertex id as the final
//! tie-break, so the queue order is a strict total order. Active edges sit
//! in an [`OrdTree`] ordered by the height at which they cross the sweep
//! position; that order depends on where the sweep currently is, so the
//! comparator lives in a [`SweepContext`] built fresh at each event rather
//! than in the tree.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::{
    cycle::{Cycle, Dir, VertIdx},
    geom::{self, ProjectionAxes},
    num::CheapOrderedFloat,
    ordtree::OrdTree,
    point::Point,
    Error,
};

/// Branching factor for the sweep-line status tree.
const STATUS_B: usize = 16;

/// A pending vertex event.
///
/// The derived order is lexicographic in `(u, v, vert)`: projected sweep
/// coordinate, projected cross coordinate, then vertex id. Distinct
/// vertices never compare equal, so a plain ordered set works as the
/// queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct SweepEvent {
    u: CheapOrderedFloat,
    v: CheapOrderedFloat,
    vert: VertIdx,
}

fn event(cycle: &Cycle, axes: ProjectionAxes, vert: VertIdx) -> SweepEvent {
    let p = cycle.point(vert);
    SweepEvent {
        u: p[axes.u].into(),
        v: p[axes.v].into(),
        vert,
    }
}

/// One of the two edges incident to a vertex, named from that vertex.
///
/// Naming an edge as `(vertex, direction)` keeps its identity stable while
/// divides move its far endpoint: the status entry resolves through the
/// current links every time it is compared, so a truncated edge is still
/// the same entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct EdgeRef {
    vert: VertIdx,
    dir: Dir,
}

/// Everything the status comparator needs, rebuilt at each event.
///
/// Holding the sweep position and axis choice here (instead of capturing
/// them in a closure stored inside the status) means there is nothing to
/// go stale: every comparison sees the current topology and the current
/// sweep position.
struct SweepContext<'a> {
    cycle: &'a Cycle,
    axes: ProjectionAxes,
    /// The sweep abscissa: the current event's projected `u` coordinate.
    sweep_u: f64,
    eps: f64,
}

fn slope(l: kurbo::Point, r: kurbo::Point) -> f64 {
    (r.y - l.y) / (r.x - l.x)
}

impl SweepContext<'_> {
    fn proj(&self, w: VertIdx) -> kurbo::Point {
        self.cycle.point(w).project(self.axes.u, self.axes.v)
    }

    fn key(&self, w: VertIdx) -> (CheapOrderedFloat, CheapOrderedFloat, VertIdx) {
        let p = self.cycle.point(w);
        (p[self.axes.u].into(), p[self.axes.v].into(), w)
    }

    /// The edge's endpoints in sweep order (left first).
    fn ends(&self, e: EdgeRef) -> (VertIdx, VertIdx) {
        let a = e.vert;
        let b = self.cycle.neighbor(a, e.dir);
        if self.key(a) <= self.key(b) {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Do two edge names currently denote the same edge?
    fn same_edge(&self, a: EdgeRef, b: EdgeRef) -> bool {
        self.ends(a) == self.ends(b)
    }

    /// The height at which the edge crosses the sweep position.
    ///
    /// Edges in the status always have a projected horizontal extent
    /// bigger than eps, so the interpolation is well conditioned.
    fn height(&self, left: VertIdx, right: VertIdx) -> f64 {
        let l = self.proj(left);
        let r = self.proj(right);
        let du = r.x - l.x;
        if du.abs() <= self.eps {
            l.y
        } else {
            let t = ((self.sweep_u - l.x) / du).clamp(0.0, 1.0);
            l.y + t * (r.y - l.y)
        }
    }

    fn near(&self, p: kurbo::Point, q: kurbo::Point) -> bool {
        (p.x - q.x).abs() <= self.eps && (p.y - q.y).abs() <= self.eps
    }

    /// The status order: by height at the sweep position, with a ladder of
    /// tie-breaks for near-coincident heights.
    ///
    /// The ladder, in order: identical edges are equal; a clear height
    /// difference decides; an edge starting where the other ends sorts
    /// after it; edges starting at a common point order by increasing
    /// slope, edges ending at a common point by decreasing slope; then raw
    /// height and finally vertex ids. The shared-endpoint rungs are the
    /// contract for near-degenerate input; the engine validates the
    /// resulting order after every event and aborts the face if it ever
    /// breaks down.
    fn cmp_edges(&self, ea: EdgeRef, eb: EdgeRef) -> Ordering {
        let (a0, a1) = self.ends(ea);
        let (b0, b1) = self.ends(eb);
        if a0 == b0 && a1 == b1 {
            return Ordering::Equal;
        }

        let ha = self.height(a0, a1);
        let hb = self.height(b0, b1);
        if (ha - hb).abs() > self.eps {
            return CheapOrderedFloat::from(ha).cmp(&CheapOrderedFloat::from(hb));
        }

        let (pa0, pa1) = (self.proj(a0), self.proj(a1));
        let (pb0, pb1) = (self.proj(b0), self.proj(b1));

        let a_starts_at_b_end = self.near(pa0, pb1);
        let b_starts_at_a_end = self.near(pb0, pa1);
        if a_starts_at_b_end != b_starts_at_a_end {
            // The ending edge sorts before the starting one.
            return if a_starts_at_b_end {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }

        if self.near(pa0, pb0) {
            let (sa, sb) = (slope(pa0, pa1), slope(pb0, pb1));
            if (sa - sb).abs() > self.eps {
                return CheapOrderedFloat::from(sa).cmp(&CheapOrderedFloat::from(sb));
            }
        } else if self.near(pa1, pb1) {
            let (sa, sb) = (slope(pa0, pa1), slope(pb0, pb1));
            if (sa - sb).abs() > self.eps {
                return CheapOrderedFloat::from(sb).cmp(&CheapOrderedFloat::from(sa));
            }
        }

        CheapOrderedFloat::from(ha)
            .cmp(&CheapOrderedFloat::from(hb))
            .then_with(|| (a0, a1).cmp(&(b0, b1)))
    }

    /// Find the status entry currently denoting `probe`.
    ///
    /// Searches by comparator position, then scans the run of entries the
    /// comparator cannot distinguish from `probe`, matching by edge
    /// identity.
    fn find(&self, status: &OrdTree<EdgeRef, STATUS_B>, probe: EdgeRef) -> Option<usize> {
        let pos = status.partition_point(|e| self.cmp_edges(*e, probe) == Ordering::Less);
        let mut i = pos;
        while i < status.len() && self.cmp_edges(status[i], probe) != Ordering::Greater {
            if self.same_edge(status[i], probe) {
                return Some(i);
            }
            i += 1;
        }
        let mut i = pos;
        while i > 0 && self.cmp_edges(status[i - 1], probe) != Ordering::Less {
            i -= 1;
            if self.same_edge(status[i], probe) {
                return Some(i);
            }
        }
        None
    }
}

/// Split two crossing edges at their intersection and rewire the topology
/// so the crossing disappears.
///
/// No-op when the edges share a vertex node (a shared endpoint is never a
/// crossing; this is an identity check, not a coordinate check, so two
/// coincident-but-distinct nodes still get the full intersection test) or
/// when they don't properly cross. Otherwise two new nodes are created,
/// each owning its own copy of the intersection point, the edges' tails
/// are swapped through them, and both new nodes become future events.
fn divide(
    cycle: &mut Cycle,
    queue: &mut BTreeSet<SweepEvent>,
    axes: ProjectionAxes,
    eps: f64,
    ea: EdgeRef,
    eb: EdgeRef,
) {
    let (a0, a1) = cycle.oriented_edge(ea.vert, ea.dir);
    let (b0, b1) = cycle.oriented_edge(eb.vert, eb.dir);
    if a0 == b0 || a0 == b1 || a1 == b0 || a1 == b1 {
        return;
    }

    let Some(hit) = geom::segment_intersection(
        cycle.point(a0),
        cycle.point(a1),
        cycle.point(b0),
        cycle.point(b1),
        axes.u,
        axes.v,
        eps,
    ) else {
        return;
    };

    let m1 = cycle.push_vertex(hit.clone());
    let m2 = cycle.push_vertex(hit);

    // Swap the tails: a0 -> m1 -> b1 and b0 -> m2 -> a1. The status
    // entries for both edges now resolve to their truncated left pieces.
    cycle.link_to_next(a0, m1);
    cycle.link_to_next(m1, b1);
    cycle.link_to_next(b0, m2);
    cycle.link_to_next(m2, a1);

    queue.insert(event(cycle, axes, m1));
    queue.insert(event(cycle, axes, m2));
}

/// Locate a triple of vertices spanning a plane: vertex 0, the first
/// vertex not coincident with it, and the first vertex not collinear with
/// both. `None` means the face is a point or a line segment.
fn spanning_triple(face: &[Point], eps: f64) -> Option<(usize, usize)> {
    let a = &face[0];
    let p = (1..face.len()).find(|&i| !a.approx_eq(&face[i], eps))?;
    let q = ((p + 1)..face.len()).find(|&i| !geom::collinear(a, &face[p], &face[i], eps))?;
    Some((p, q))
}

/// Decompose one face boundary into simple loops.
///
/// Returns `Ok(None)` for degenerate faces (fewer than three vertices, or
/// all vertices coincident/collinear): they produce nothing to render.
/// Errors mean the sweep's internal order broke down on this face; no
/// loops are emitted in that case.
pub(crate) fn arrange(
    face: &[Point],
    eps: f64,
) -> Result<Option<(Vec<Vec<Point>>, ProjectionAxes)>, Error> {
    if face.len() < 3 {
        log::debug!("skipping degenerate face with {} vertices", face.len());
        return Ok(None);
    }
    let Some((p, q)) = spanning_triple(face, eps) else {
        log::debug!("skipping face that spans no plane");
        return Ok(None);
    };
    let axes = geom::best_projection_axes(&face[0], &face[p], &face[q]);

    let mut cycle = Cycle::from_points(face);
    let mut queue: BTreeSet<SweepEvent> =
        cycle.indices().map(|w| event(&cycle, axes, w)).collect();
    let mut status: OrdTree<EdgeRef, STATUS_B> = OrdTree::new();

    while let Some(ev) = queue.pop_first() {
        let here = ev.vert;
        let sweep_u = ev.u.into_inner();

        // The comparator's near-degenerate rungs are where this algorithm
        // can go wrong, so check the status order at every event instead
        // of discovering the damage two events later.
        {
            let ctx = SweepContext {
                cycle: &cycle,
                axes,
                sweep_u,
                eps,
            };
            if !status.is_sorted_by(|a, b| ctx.cmp_edges(*a, *b)) {
                return Err(Error::Inconsistency);
            }
            #[cfg(feature = "slow-asserts")]
            status.check_invariants();
        }

        for dir in [Dir::Forward, Dir::Backward] {
            let other = cycle.neighbor(here, dir);
            let ord = cycle.point(here)[axes.u] - cycle.point(other)[axes.u];
            let edge = EdgeRef { vert: here, dir };

            if ord < -eps {
                // `here` is the left endpoint: the edge becomes active.
                let (pred, succ) = {
                    let ctx = SweepContext {
                        cycle: &cycle,
                        axes,
                        sweep_u,
                        eps,
                    };
                    let pos = status.insert_sorted(edge, |a, b| ctx.cmp_edges(*a, *b));
                    (
                        pos.checked_sub(1).map(|i| status[i]),
                        status.get(pos + 1).copied(),
                    )
                };
                if let Some(pred) = pred {
                    divide(&mut cycle, &mut queue, axes, eps, edge, pred);
                }
                if let Some(succ) = succ {
                    divide(&mut cycle, &mut queue, axes, eps, edge, succ);
                }
            } else if ord > eps {
                // `here` is the right endpoint: retire the edge, and test
                // the neighbors it was separating against each other.
                let (pos, pred, succ) = {
                    let ctx = SweepContext {
                        cycle: &cycle,
                        axes,
                        sweep_u,
                        eps,
                    };
                    let pos = ctx.find(&status, edge).ok_or(Error::MissingEdge)?;
                    (
                        pos,
                        pos.checked_sub(1).map(|i| status[i]),
                        status.get(pos + 1).copied(),
                    )
                };
                if let (Some(pred), Some(succ)) = (pred, succ) {
                    divide(&mut cycle, &mut queue, axes, eps, pred, succ);
                }
                status.remove(pos);
            } else if cycle.point(here)[axes.v] > cycle.point(other)[axes.v] {
                // A vertical edge (perpendicular to the sweep axis) never
                // enters the status; it crosses the sweep position all at
                // once, so test it against every active edge. Triggered
                // from the upper endpoint only, so it runs once per edge.
                for i in 0..status.len() {
                    let active = status[i];
                    divide(&mut cycle, &mut queue, axes, eps, edge, active);
                }
            }
        }
    }

    let mut loops = Vec::new();
    for w in cycle.indices().collect::<Vec<_>>() {
        if !cycle.is_traversed(w) {
            loops.push(cycle.extract_loop(w));
        }
    }
    Ok(Some((loops, axes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(cycle: &Cycle, sweep_u: f64) -> SweepContext<'_> {
        SweepContext {
            cycle,
            axes: ProjectionAxes {
                u: 0,
                v: 1,
                w: None,
            },
            sweep_u,
            eps: geom::DEFAULT_EPS,
        }
    }

    #[test]
    fn spanning_triple_skips_duplicates() {
        let face = vec![
            Point::from([0.0, 0.0]),
            Point::from([0.0, 0.0]),
            Point::from([1.0, 0.0]),
            Point::from([2.0, 0.0]),
            Point::from([1.0, 1.0]),
        ];
        assert_eq!(spanning_triple(&face, geom::DEFAULT_EPS), Some((2, 4)));

        let segment = vec![
            Point::from([0.0, 0.0]),
            Point::from([1.0, 1.0]),
            Point::from([2.0, 2.0]),
        ];
        assert_eq!(spanning_triple(&segment, geom::DEFAULT_EPS), None);
    }

    #[test]
    fn comparator_orders_by_height() {
        // Two horizontal-ish edges at different heights.
        let cycle = Cycle::from_points(&[
            Point::from([0.0, 0.0]),
            Point::from([2.0, 0.5]),
            Point::from([2.0, 3.0]),
            Point::from([0.0, 2.0]),
        ]);
        let c = ctx(&cycle, 1.0);
        let low = EdgeRef {
            vert: VertIdx(0),
            dir: Dir::Forward,
        };
        let high = EdgeRef {
            vert: VertIdx(3),
            dir: Dir::Backward,
        };
        assert_eq!(c.cmp_edges(low, high), Ordering::Less);
        assert_eq!(c.cmp_edges(high, low), Ordering::Greater);
        assert_eq!(c.cmp_edges(low, low), Ordering::Equal);
    }

    #[test]
    fn comparator_fan_orders_by_slope() {
        // Three edges fanning out of a common left endpoint: at the shared
        // point their heights tie, and the slope rung must order them.
        let cycle = Cycle::from_points(&[
            Point::from([0.0, 0.0]),
            Point::from([2.0, 2.0]),
            Point::from([2.0, 0.0]),
            Point::from([2.0, -2.0]),
        ]);
        let c = ctx(&cycle, 0.0);
        let up = EdgeRef {
            vert: VertIdx(0),
            dir: Dir::Forward,
        }; // towards (2, 2)
        let down = EdgeRef {
            vert: VertIdx(0),
            dir: Dir::Backward,
        }; // towards (2, -2)
        assert_eq!(c.cmp_edges(down, up), Ordering::Less);
        assert_eq!(c.cmp_edges(up, down), Ordering::Greater);
    }

    #[test]
    fn comparator_adjacency_rung() {
        // Edge A ends where edge B starts; at the shared abscissa their
        // heights tie and the adjacency rung puts the ending edge first.
        let cycle = Cycle::from_points(&[
            Point::from([0.0, 0.0]),
            Point::from([1.0, 1.0]),
            Point::from([2.0, 0.0]),
            Point::from([1.0, -2.0]),
        ]);
        let c = ctx(&cycle, 1.0);
        let ending = EdgeRef {
            vert: VertIdx(0),
            dir: Dir::Forward,
        }; // (0,0) -> (1,1)
        let starting = EdgeRef {
            vert: VertIdx(1),
            dir: Dir::Forward,
        }; // (1,1) -> (2,0)
        assert_eq!(c.cmp_edges(ending, starting), Ordering::Less);
        assert_eq!(c.cmp_edges(starting, ending), Ordering::Greater);
    }

    #[test]
    fn divide_swaps_tails() {
        // The bowtie cycle: (0,0) -> (1,1) -> (1,0) -> (0,1). Edges
        // 0->1 and 2->3 cross at (1/2, 1/2).
        let mut cycle = Cycle::from_points(&[
            Point::from([0.0, 0.0]),
            Point::from([1.0, 1.0]),
            Point::from([1.0, 0.0]),
            Point::from([0.0, 1.0]),
        ]);
        let mut queue = BTreeSet::new();
        let axes = ProjectionAxes {
            u: 0,
            v: 1,
            w: None,
        };
        divide(
            &mut cycle,
            &mut queue,
            axes,
            geom::DEFAULT_EPS,
            EdgeRef {
                vert: VertIdx(0),
                dir: Dir::Forward,
            },
            EdgeRef {
                vert: VertIdx(2),
                dir: Dir::Forward,
            },
        );
        assert_eq!(cycle.len(), 6);
        assert_eq!(queue.len(), 2);
        let mid = Point::from([0.5, 0.5]);
        assert_eq!(cycle.point(VertIdx(4)), &mid);
        assert_eq!(cycle.point(VertIdx(5)), &mid);
        // 0 -> m1 -> 3 and 2 -> m2 -> 1.
        assert_eq!(cycle.neighbor(VertIdx(0), Dir::Forward), VertIdx(4));
        assert_eq!(cycle.neighbor(VertIdx(4), Dir::Forward), VertIdx(3));
        assert_eq!(cycle.neighbor(VertIdx(2), Dir::Forward), VertIdx(5));
        assert_eq!(cycle.neighbor(VertIdx(5), Dir::Forward), VertIdx(1));
    }

    #[test]
    fn divide_ignores_shared_vertices() {
        let mut cycle = Cycle::from_points(&[
            Point::from([0.0, 0.0]),
            Point::from([1.0, 1.0]),
            Point::from([2.0, 0.0]),
        ]);
        let mut queue = BTreeSet::new();
        let axes = ProjectionAxes {
            u: 0,
            v: 1,
            w: None,
        };
        divide(
            &mut cycle,
            &mut queue,
            axes,
            geom::DEFAULT_EPS,
            EdgeRef {
                vert: VertIdx(0),
                dir: Dir::Forward,
            },
            EdgeRef {
                vert: VertIdx(1),
                dir: Dir::Forward,
            },
        );
        assert_eq!(cycle.len(), 3);
        assert!(queue.is_empty());
    }
}
