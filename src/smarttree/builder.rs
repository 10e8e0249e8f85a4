use crate::error::Result;
use crate::r#type::{AxisValues, Coordinate};
use crate::smarttree::bounds::{validate_extent, Bounds, Interval};
use crate::smarttree::node::{Node, SplitPolicy};
use crate::smarttree::SmartTree;
use crate::SmartTreeError;

/// The default number of instances a leaf may hold before it is considered for splitting.
pub const DEFAULT_SPLIT_K: usize = 10;

/// The smallest allowed value for the split threshold.
pub const MIN_SPLIT_K: usize = 2;

/// A builder to create a [`SmartTree`].
///
/// ```
/// use smart_index::smarttree::{Instance, SmartTree, SmartTreeBuilder};
///
/// let mut tree: SmartTree<f64> = SmartTreeBuilder::new([(-180., 180.), (-90., 90.)])
///     .min_range(0.1)
///     .split_k(5)
///     .finish()
///     .unwrap();
/// tree.add(Instance::new(1, [4.35, 52.0])).unwrap();
/// assert_eq!(tree.num_items(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SmartTreeBuilder<N: Coordinate> {
    ranges: Bounds<N>,
    min_range: AxisValues<N>,
    split_k: usize,
}

impl<N: Coordinate> SmartTreeBuilder<N> {
    /// Create a new builder covering `ranges`, one `(lo, hi)` pair per dimension.
    ///
    /// Starts with a minimum range of zero and a split threshold of [`DEFAULT_SPLIT_K`].
    pub fn new<R: Into<Interval<N>>>(ranges: impl IntoIterator<Item = R>) -> Self {
        Self {
            ranges: ranges.into_iter().map(Into::into).collect(),
            min_range: AxisValues::Scalar(N::zero()),
            split_k: DEFAULT_SPLIT_K,
        }
    }

    /// Set the minimum width, per dimension or for all dimensions, below which a region is not
    /// split further.
    pub fn min_range(mut self, min_range: impl Into<AxisValues<N>>) -> Self {
        self.min_range = min_range.into();
        self
    }

    /// Set the number of instances that makes a leaf eligible for splitting.
    pub fn split_k(mut self, split_k: usize) -> Self {
        self.split_k = split_k;
        self
    }

    /// Validate the parameters and create an empty tree.
    pub fn finish<I>(self) -> Result<SmartTree<N, I>> {
        validate_extent(&self.ranges)?;
        let min_ranges = self.min_range.broadcast(self.ranges.len(), "min_range")?;
        if self.split_k < MIN_SPLIT_K {
            return Err(SmartTreeError::Validation(format!(
                "split_k must be at least {}, got {}",
                MIN_SPLIT_K, self.split_k
            )));
        }

        Ok(SmartTree {
            root: Node::new_leaf(self.ranges),
            policy: SplitPolicy {
                min_ranges,
                split_k: self.split_k,
            },
            num_items: 0,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn err_message(result: Result<SmartTree<f64, u32>>) -> String {
        match result {
            Err(SmartTreeError::Validation(message)) => message,
            other => panic!("expected a validation error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn defaults() {
        let tree: SmartTree<f64, u32> = SmartTreeBuilder::new([(0., 1.)]).finish().unwrap();
        assert_eq!(tree.split_k(), DEFAULT_SPLIT_K);
        assert_eq!(tree.min_ranges(), &[0.0]);
        assert_eq!(tree.dimensions(), 1);
    }

    #[test]
    fn rejects_empty_ranges() {
        let ranges: Vec<(f64, f64)> = vec![];
        let message = err_message(SmartTreeBuilder::new(ranges).finish());
        assert!(message.contains("ranges"));
    }

    #[test]
    fn rejects_small_split_k() {
        let message = err_message(SmartTreeBuilder::new([(0., 1.)]).split_k(1).finish());
        assert!(message.contains("split_k"));
    }

    #[test]
    fn rejects_negative_min_range() {
        let message = err_message(
            SmartTreeBuilder::new([(0., 1.), (0., 1.)])
                .min_range([0.1, -0.1])
                .finish(),
        );
        assert!(message.contains("min_range[1]"));
    }

    #[test]
    fn rejects_non_finite_min_range() {
        let message = err_message(
            SmartTreeBuilder::new([(0., 1.)])
                .min_range(f64::INFINITY)
                .finish(),
        );
        assert!(message.contains("min_range[0]"));
        let message = err_message(
            SmartTreeBuilder::new([(0., 1.), (0., 1.)])
                .min_range([0.1, f64::NAN])
                .finish(),
        );
        assert!(message.contains("min_range[1]"));
    }

    #[test]
    fn rejects_min_range_dimension_mismatch() {
        let message = err_message(
            SmartTreeBuilder::new([(0., 1.), (0., 1.)])
                .min_range(vec![0.1, 0.1, 0.1])
                .finish(),
        );
        assert!(message.contains("dimension mismatch"));
    }

    #[test]
    fn broadcasts_scalar_min_range() {
        let tree: SmartTree<f32, u32> = SmartTreeBuilder::new([(0., 1.), (0., 2.), (0., 3.)])
            .min_range(0.5)
            .finish()
            .unwrap();
        assert_eq!(tree.min_ranges(), &[0.5, 0.5, 0.5]);
    }
}
