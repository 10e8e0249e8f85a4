use std::fmt::{Debug, Display};

use num_traits::Float;
use tinyvec::TinyVec;

use crate::error::Result;
use crate::SmartTreeError;

/// A coordinate vector. Up to three dimensions are stored inline without a heap allocation.
pub type Coords<N> = TinyVec<[N; 3]>;

/// A trait for types that can be used for indexed coordinates.
///
/// This trait is sealed and cannot be implemented for external types. Splitting a leaf needs the
/// mean and sample variance of its coordinates, so only floating point types are supported.
pub trait Coordinate:
    private::Sealed + Float + Default + Debug + Display + Send + Sync + 'static
{
}

impl Coordinate for f32 {}

impl Coordinate for f64 {}

/// A per-dimension parameter that may be given either as one scalar for every dimension or as
/// one value per dimension.
///
/// Used for the minimum splittable width of a tree and for the per-dimension search distance of
/// neighbor queries.
///
/// ```
/// use smart_index::AxisValues;
///
/// let uniform: AxisValues<f64> = 0.5_f64.into();
/// let per_axis: AxisValues<f64> = [0.5, 2.0].into();
/// assert_eq!(uniform, AxisValues::Scalar(0.5));
/// assert_eq!(per_axis.num_axes(), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum AxisValues<N: Coordinate> {
    /// The same value on every dimension.
    Scalar(N),
    /// One value for each dimension.
    PerAxis(Coords<N>),
}

impl<N: Coordinate> AxisValues<N> {
    /// The number of dimensions this value was given for, or `None` for a scalar.
    pub fn num_axes(&self) -> Option<usize> {
        match self {
            Self::Scalar(_) => None,
            Self::PerAxis(values) => Some(values.len()),
        }
    }

    /// Expand to exactly `dims` values, all of which must be finite and non-negative.
    ///
    /// `name` is used in the error message to identify the offending parameter.
    pub(crate) fn broadcast(&self, dims: usize, name: &str) -> Result<Coords<N>> {
        let values: Coords<N> = match self {
            Self::Scalar(value) => (0..dims).map(|_| *value).collect(),
            Self::PerAxis(values) => {
                if values.len() != dims {
                    return Err(SmartTreeError::Validation(format!(
                        "dimension mismatch: expected {} values for {}, got {}",
                        dims,
                        name,
                        values.len()
                    )));
                }
                values.clone()
            }
        };

        for (axis, value) in values.iter().enumerate() {
            if !(value.is_finite() && *value >= N::zero()) {
                return Err(SmartTreeError::Validation(format!(
                    "{}[{}] must be finite and >= 0, got {}",
                    name, axis, value
                )));
            }
        }

        Ok(values)
    }
}

impl<N: Coordinate> From<N> for AxisValues<N> {
    fn from(value: N) -> Self {
        Self::Scalar(value)
    }
}

impl<N: Coordinate> From<Vec<N>> for AxisValues<N> {
    fn from(values: Vec<N>) -> Self {
        Self::PerAxis(values.into_iter().collect())
    }
}

impl<N: Coordinate> From<&[N]> for AxisValues<N> {
    fn from(values: &[N]) -> Self {
        Self::PerAxis(values.iter().copied().collect())
    }
}

impl<N: Coordinate, const D: usize> From<[N; D]> for AxisValues<N> {
    fn from(values: [N; D]) -> Self {
        Self::PerAxis(values.into_iter().collect())
    }
}

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn broadcasts_scalar() {
        let values = AxisValues::Scalar(0.25f64).broadcast(3, "min_range").unwrap();
        assert_eq!(values.as_slice(), &[0.25, 0.25, 0.25]);
    }

    #[test]
    fn rejects_dimension_mismatch() {
        let err = AxisValues::from(vec![1.0f64, 2.0])
            .broadcast(3, "max_distance")
            .unwrap_err();
        assert!(matches!(err, SmartTreeError::Validation(_)));
        assert!(err.to_string().contains("max_distance"));
    }

    #[test]
    fn rejects_negative_and_non_finite() {
        assert!(AxisValues::from([1.0f64, -1.0]).broadcast(2, "x").is_err());
        assert!(AxisValues::Scalar(f32::NAN).broadcast(2, "x").is_err());
        assert!(AxisValues::Scalar(f64::INFINITY).broadcast(2, "x").is_err());
        assert!(AxisValues::from([1.0f64, f64::NEG_INFINITY]).broadcast(2, "x").is_err());
        assert!(AxisValues::Scalar(0.0f32).broadcast(2, "x").is_ok());
    }
}
