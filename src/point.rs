//! Points with an arbitrary number of coordinates.
//!
//! Polytope faces live in whatever dimension the polytope does, so unlike a
//! plain 2d point type we carry the whole coordinate vector around and only
//! project down to a plane when the sweep needs to do plane geometry.

/// A point (or vector; we don't distinguish) in `dim()`-dimensional space.
///
/// Points are value-like: cloning one gives an independent copy, and all the
/// arithmetic here is pure. Binary operations require both operands to have
/// the same dimension; mixing dimensions is a bug in the caller.
#[derive(Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Point {
    coords: Vec<f64>,
}

impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{c:?}")?;
        }
        write!(f, ")")
    }
}

impl Point {
    /// The origin of `dim`-dimensional space.
    pub fn zero(dim: usize) -> Self {
        Point {
            coords: vec![0.0; dim],
        }
    }

    /// Create a point from its coordinates.
    pub fn from_coords(coords: impl IntoIterator<Item = f64>) -> Self {
        Point {
            coords: coords.into_iter().collect(),
        }
    }

    /// The number of coordinates.
    pub fn dim(&self) -> usize {
        self.coords.len()
    }

    /// The coordinates, as a slice.
    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    /// Coordinate-wise sum.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    pub fn add(&self, other: &Point) -> Point {
        assert_eq!(self.dim(), other.dim());
        Point::from_coords(
            self.coords
                .iter()
                .zip(&other.coords)
                .map(|(a, b)| a + b),
        )
    }

    /// Coordinate-wise difference.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    pub fn sub(&self, other: &Point) -> Point {
        assert_eq!(self.dim(), other.dim());
        Point::from_coords(
            self.coords
                .iter()
                .zip(&other.coords)
                .map(|(a, b)| a - b),
        )
    }

    /// Coordinate-wise multiplication by a scalar.
    pub fn scale(&self, r: f64) -> Point {
        Point::from_coords(self.coords.iter().map(|a| a * r))
    }

    /// A point whose coordinates are `self`'s followed by `other`'s.
    ///
    /// This is the Cartesian-product representation: `concat` of a point in
    /// `R^m` and a point in `R^n` lives in `R^(m+n)`.
    pub fn concat(&self, other: &Point) -> Point {
        Point::from_coords(self.coords.iter().chain(&other.coords).copied())
    }

    /// Prepend `n` zero coordinates.
    pub fn pad_left(&self, n: usize) -> Point {
        Point::from_coords(std::iter::repeat(0.0).take(n).chain(self.coords.iter().copied()))
    }

    /// Append `n` zero coordinates.
    pub fn pad_right(&self, n: usize) -> Point {
        Point::from_coords(self.coords.iter().copied().chain(std::iter::repeat(0.0).take(n)))
    }

    /// Approximate coordinate-wise equality.
    ///
    /// Note that this is asymmetric: each coordinate of `self` is used as the
    /// scale for its own comparison, so `a.approx_eq(b, eps)` and
    /// `b.approx_eq(a, eps)` can disagree near the crossover. Callers that
    /// have survived this long depend on exactly this behavior, so don't
    /// "fix" it.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    pub fn approx_eq(&self, other: &Point, eps: f64) -> bool {
        assert_eq!(self.dim(), other.dim());
        self.coords
            .iter()
            .zip(&other.coords)
            .all(|(a, b)| (a - b).abs() <= a.abs() * eps)
    }

    /// The Euclidean norm.
    pub fn magnitude(&self) -> f64 {
        self.coords.iter().map(|c| c * c).sum::<f64>().sqrt()
    }

    /// The squared Euclidean distance to `other`.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    pub fn dist_squared(&self, other: &Point) -> f64 {
        assert_eq!(self.dim(), other.dim());
        self.coords
            .iter()
            .zip(&other.coords)
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }

    /// The Euclidean distance to `other`.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    pub fn dist(&self, other: &Point) -> f64 {
        self.dist_squared(other).sqrt()
    }

    /// Are all coordinates finite (and not NaN)?
    pub fn is_finite(&self) -> bool {
        self.coords.iter().all(|c| c.is_finite())
    }

    /// Project onto the plane spanned by coordinate axes `u` and `v`.
    ///
    /// # Panics
    ///
    /// Panics if `u` or `v` is out of range.
    pub fn project(&self, u: usize, v: usize) -> kurbo::Point {
        kurbo::Point::new(self.coords[u], self.coords[v])
    }

    /// Project onto three coordinate axes, for handing to a 3d renderer.
    ///
    /// A missing third axis (a genuinely 2d face) projects to the plane
    /// `z = 0`.
    pub fn project3(&self, u: usize, v: usize, w: Option<usize>) -> [f64; 3] {
        [
            self.coords[u],
            self.coords[v],
            w.map_or(0.0, |w| self.coords[w]),
        ]
    }
}

impl std::ops::Index<usize> for Point {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.coords[index]
    }
}

impl std::ops::Add<&Point> for &Point {
    type Output = Point;

    fn add(self, rhs: &Point) -> Point {
        Point::add(self, rhs)
    }
}

impl std::ops::Sub<&Point> for &Point {
    type Output = Point;

    fn sub(self, rhs: &Point) -> Point {
        Point::sub(self, rhs)
    }
}

impl std::ops::Mul<f64> for &Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        self.scale(rhs)
    }
}

impl From<Vec<f64>> for Point {
    fn from(coords: Vec<f64>) -> Self {
        Point { coords }
    }
}

impl<const N: usize> From<[f64; N]> for Point {
    fn from(coords: [f64; N]) -> Self {
        Point {
            coords: coords.to_vec(),
        }
    }
}

impl FromIterator<f64> for Point {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Point::from_coords(iter)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    pub fn reasonable_coord() -> impl Strategy<Value = f64> {
        -1e6..1e6
    }

    pub fn reasonable_point(dim: usize) -> BoxedStrategy<Point> {
        proptest::collection::vec(reasonable_coord(), dim)
            .prop_map(Point::from)
            .boxed()
    }

    #[test]
    fn zero_is_origin() {
        let p = Point::zero(4);
        assert_eq!(p.dim(), 4);
        assert_eq!(p.magnitude(), 0.0);
    }

    #[test]
    fn approx_eq_is_asymmetric() {
        // The tolerance scales with the first argument's coordinates, so a
        // zero point only approx-equals another exact zero.
        let zero = Point::from([0.0, 0.0]);
        let tiny = Point::from([1e-16, 0.0]);
        assert!(!zero.approx_eq(&tiny, 1e-12));
        assert!(tiny.approx_eq(&tiny.clone(), 1e-12));

        let big = Point::from([1e6, 0.0]);
        let nudged = Point::from([1e6 + 1e-8, 0.0]);
        assert!(big.approx_eq(&nudged, 1e-12));
    }

    #[test]
    fn concat_and_pad() {
        let p = Point::from([1.0, 2.0]);
        let q = Point::from([3.0]);
        assert_eq!(p.concat(&q), Point::from([1.0, 2.0, 3.0]));
        assert_eq!(p.pad_left(1), Point::from([0.0, 1.0, 2.0]));
        assert_eq!(p.pad_right(2), Point::from([1.0, 2.0, 0.0, 0.0]));
    }

    #[test]
    #[should_panic]
    fn mismatched_dims_panic() {
        let _ = Point::from([1.0]).add(&Point::from([1.0, 2.0]));
    }

    proptest! {
        #[test]
        fn add_sub_round_trip(
            (a, b) in (1usize..6).prop_flat_map(|d| (reasonable_point(d), reasonable_point(d)))
        ) {
            let round = a.add(&b).sub(&b);
            for (x, y) in round.coords().iter().zip(a.coords()) {
                prop_assert!((x - y).abs() <= 1e-6);
            }
        }

        #[test]
        fn scale_composes(
            p in (1usize..6).prop_flat_map(reasonable_point),
            r in -100.0f64..100.0,
            s in -100.0f64..100.0,
        ) {
            let twice = p.scale(r).scale(s);
            let once = p.scale(r * s);
            for (x, y) in twice.coords().iter().zip(once.coords()) {
                prop_assert!((x - y).abs() <= 1e-6 * (1.0 + y.abs()));
            }
        }

        #[test]
        fn concat_dims(
            (p, q) in (1usize..5, 1usize..5)
                .prop_flat_map(|(m, n)| (reasonable_point(m), reasonable_point(n)))
        ) {
            let c = p.concat(&q);
            prop_assert_eq!(c.dim(), p.dim() + q.dim());
            prop_assert_eq!(&c.coords()[..p.dim()], p.coords());
        }

        #[test]
        fn pad_preserves_coords(
            p in (1usize..5).prop_flat_map(reasonable_point),
            n in 0usize..4,
            m in 0usize..4,
        ) {
            let padded = p.pad_left(n).pad_right(m);
            prop_assert_eq!(padded.dim(), p.dim() + n + m);
            prop_assert_eq!(&padded.coords()[n..n + p.dim()], p.coords());
        }
    }
}
