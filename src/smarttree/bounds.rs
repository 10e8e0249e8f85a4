//! Half-open intervals and the axis-aligned regions built from them.

use std::fmt::{self, Display};

use tinyvec::TinyVec;

use crate::error::Result;
use crate::r#type::Coordinate;
use crate::SmartTreeError;

/// The bounding region of a node, or a query box: one interval per dimension.
pub(crate) type Bounds<N> = TinyVec<[Interval<N>; 3]>;

/// A half-open interval `[lo, hi)` along a single dimension.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Interval<N: Coordinate> {
    /// Inclusive lower bound.
    pub lo: N,
    /// Exclusive upper bound.
    pub hi: N,
}

impl<N: Coordinate> Interval<N> {
    /// Create a new interval from its lower and upper bound.
    pub fn new(lo: N, hi: N) -> Self {
        Self { lo, hi }
    }

    /// The span `hi - lo` of this interval.
    #[inline]
    pub fn width(&self) -> N {
        self.hi - self.lo
    }

    /// Returns `true` if `lo <= value < hi`.
    #[inline]
    pub fn contains(&self, value: N) -> bool {
        self.lo <= value && value < self.hi
    }

    /// Returns `true` if the two intervals may share a point.
    ///
    /// Touching endpoints count as overlapping, so pruning on this test never drops a candidate.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        self.lo <= other.hi && self.hi >= other.lo
    }

    /// Split into `[lo, point)` and `[point, hi)`.
    pub(crate) fn split_at(&self, point: N) -> (Self, Self) {
        (Self::new(self.lo, point), Self::new(point, self.hi))
    }
}

impl<N: Coordinate> From<(N, N)> for Interval<N> {
    fn from((lo, hi): (N, N)) -> Self {
        Self::new(lo, hi)
    }
}

impl<N: Coordinate> From<[N; 2]> for Interval<N> {
    fn from([lo, hi]: [N; 2]) -> Self {
        Self::new(lo, hi)
    }
}

impl<N: Coordinate> Display for Interval<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.lo, self.hi)
    }
}

/// Returns `true` if `value` lies inside every interval of `bounds`.
#[inline]
pub(crate) fn contains_point<N: Coordinate>(bounds: &[Interval<N>], value: &[N]) -> bool {
    bounds.len() == value.len()
        && bounds
            .iter()
            .zip(value)
            .all(|(interval, v)| interval.contains(*v))
}

/// Returns `true` if the two regions intersect on every dimension.
#[inline]
pub(crate) fn intersects<N: Coordinate>(a: &[Interval<N>], b: &[Interval<N>]) -> bool {
    a.iter().zip(b).all(|(a, b)| a.intersects(b))
}

/// The box `[p - r, p + r)` around `probe` for each dimension.
pub(crate) fn query_box<N: Coordinate>(probe: &[N], radius: &[N]) -> Bounds<N> {
    probe
        .iter()
        .zip(radius)
        .map(|(p, r)| Interval::new(*p - *r, *p + *r))
        .collect()
}

/// Check that every interval in `ranges` is finite and non-empty.
pub(crate) fn validate_extent<N: Coordinate>(ranges: &[Interval<N>]) -> Result<()> {
    if ranges.is_empty() {
        return Err(SmartTreeError::Validation(
            "ranges must not be empty".to_string(),
        ));
    }

    for (axis, range) in ranges.iter().enumerate() {
        if !(range.lo.is_finite() && range.hi.is_finite() && range.lo < range.hi) {
            return Err(SmartTreeError::Validation(format!(
                "ranges[{}] must be finite with lo < hi, got {}",
                axis, range
            )));
        }
    }

    Ok(())
}

/// Check that a caller-supplied search box matches the tree dimensionality and is well formed.
pub(crate) fn validate_area<N: Coordinate>(area: &[Interval<N>], dims: usize) -> Result<()> {
    if area.len() != dims {
        return Err(SmartTreeError::Validation(format!(
            "dimension mismatch: tree has {} dimensions, search box has {}",
            dims,
            area.len()
        )));
    }

    for (axis, interval) in area.iter().enumerate() {
        if !(interval.lo <= interval.hi) {
            return Err(SmartTreeError::Validation(format!(
                "search box[{}] must satisfy lo <= hi, got {}",
                axis, interval
            )));
        }
    }

    Ok(())
}
