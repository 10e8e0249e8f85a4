use geo_traits::{CoordTrait, Dimensions};

use crate::r#type::{Coordinate, Coords};

/// A point record stored in a [`SmartTree`][crate::smarttree::SmartTree].
///
/// An instance is immutable after creation. The identifier is opaque to the tree and may be
/// absent, which is how transient query probes are built.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance<N: Coordinate, I = u64> {
    id: Option<I>,
    value: Coords<N>,
}

impl<N: Coordinate, I> Instance<N, I> {
    /// Create a new instance with the given identifier and coordinates.
    pub fn new(id: I, value: impl IntoIterator<Item = N>) -> Self {
        Self {
            id: Some(id),
            value: value.into_iter().collect(),
        }
    }

    /// Create an instance without an identifier, e.g. to use as a query probe.
    pub fn probe(value: impl IntoIterator<Item = N>) -> Self {
        Self {
            id: None,
            value: value.into_iter().collect(),
        }
    }

    /// The identifier of this instance, if any.
    pub fn id(&self) -> Option<&I> {
        self.id.as_ref()
    }

    /// The coordinates of this instance.
    pub fn value(&self) -> &[N] {
        &self.value
    }

    /// The number of coordinates of this instance.
    pub fn dimensions(&self) -> usize {
        self.value.len()
    }
}

pub(crate) fn dimensions_for(n: usize) -> Dimensions {
    match n {
        2 => Dimensions::Xy,
        3 => Dimensions::Xyz,
        n => Dimensions::Unknown(n),
    }
}

/// Copy the coordinates out of any [`CoordTrait`] implementation.
pub(crate) fn coords_of<N: Coordinate>(coord: &impl CoordTrait<T = N>) -> Coords<N> {
    (0..coord.dim().size())
        .map(|n| coord.nth_or_panic(n))
        .collect()
}

/// Instances can be used directly as query probes.
///
/// `x` and `y` panic for one-dimensional instances.
impl<N: Coordinate, I> CoordTrait for Instance<N, I> {
    type T = N;

    fn dim(&self) -> Dimensions {
        dimensions_for(self.value.len())
    }

    fn x(&self) -> Self::T {
        self.value[0]
    }

    fn y(&self) -> Self::T {
        self.value[1]
    }

    fn nth_or_panic(&self, n: usize) -> Self::T {
        self.value[n]
    }
}
