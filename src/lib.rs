#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

mod cycle;
mod geom;
mod num;
mod ordtree;
mod point;
mod sweep;

pub use geom::{best_projection_axes, collinear, segment_intersection, ProjectionAxes, DEFAULT_EPS};
pub use point::Point;

/// The input face was faulty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// A face mixed points of different dimensions.
    DimensionMismatch {
        /// The dimension of the face's first point.
        expected: usize,
        /// The offending point's dimension.
        got: usize,
    },
    /// At least one input coordinate was infinite or NaN.
    NonFinite,
    /// The sweep-line status lost its internal ordering while processing
    /// this face.
    ///
    /// This means the tie-breaking rules were defeated by a near-degenerate
    /// configuration. The face produced no loops; other faces are
    /// unaffected.
    Inconsistency,
    /// An edge that should have been active was missing from the
    /// sweep-line status.
    ///
    /// Same cause and same policy as [`Error::Inconsistency`].
    MissingEdge,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::DimensionMismatch { expected, got } => {
                write!(f, "a point had dimension {got}, expected {expected}")
            }
            Error::NonFinite => write!(f, "one of the input coordinates was infinite or NaN"),
            Error::Inconsistency => write!(f, "the sweep-line status lost its ordering"),
            Error::MissingEdge => write!(f, "an active edge was missing from the sweep-line"),
        }
    }
}

impl std::error::Error for Error {}

/// The decomposition of one face into simple loops.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FaceLoops {
    /// The simple closed loops, each an ordered point cycle in the face's
    /// original dimension. Their union reproduces the visual area of the
    /// face under the renderer's fill rule.
    pub loops: Vec<Vec<Point>>,
    /// The projection axes the sweep ran on, for re-embedding and
    /// triangulation downstream. `None` for degenerate faces, which
    /// produce no loops.
    pub axes: Option<ProjectionAxes>,
}

impl FaceLoops {
    fn empty() -> Self {
        FaceLoops {
            loops: Vec::new(),
            axes: None,
        }
    }

    /// Did this face produce anything to render?
    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }
}

/// Decompose one face boundary into simple closed loops.
///
/// The face is an ordered cycle of points, all of the same dimension. It
/// may be self-intersecting and may contain repeated or collinear
/// vertices. Degenerate faces (fewer than three vertices, or no three
/// vertices spanning a plane) return an empty [`FaceLoops`]: that's not an
/// error, there is just nothing to render.
///
/// `eps` is the tolerance shared by every approximate comparison in this
/// run; [`DEFAULT_EPS`] is right for inputs at ordinary scales.
///
/// Errors are local to this face and leave no shared state behind: every
/// call builds its own queue, status and topology.
pub fn arrange_face(face: &[Point], eps: f64) -> Result<FaceLoops, Error> {
    debug_assert!(eps.is_finite() && eps >= 0.0);

    let Some(first) = face.first() else {
        return Ok(FaceLoops::empty());
    };
    let dim = first.dim();
    for p in face {
        if p.dim() != dim {
            return Err(Error::DimensionMismatch {
                expected: dim,
                got: p.dim(),
            });
        }
        if !p.is_finite() {
            return Err(Error::NonFinite);
        }
    }

    match sweep::arrange(face, eps)? {
        Some((loops, axes)) => Ok(FaceLoops {
            loops,
            axes: Some(axes),
        }),
        None => Ok(FaceLoops::empty()),
    }
}

/// Decompose every face of a polytope, skipping the ones that fail.
///
/// A face that defeats the sweep is logged (with its index) and yields an
/// empty [`FaceLoops`]; it never aborts the rest of the render pass. The
/// output is index-aligned with the input.
pub fn arrange_faces(faces: &[Vec<Point>], eps: f64) -> Vec<FaceLoops> {
    faces
        .iter()
        .enumerate()
        .map(|(i, face)| {
            arrange_face(face, eps).unwrap_or_else(|err| {
                log::warn!("face {i}: {err}; skipping");
                FaceLoops::empty()
            })
        })
        .collect()
}
