//! Tree nodes and the insertion-triggered split algorithm.

use tracing::debug;

use crate::error::Result;
use crate::r#type::{Coordinate, Coords};
use crate::smarttree::bounds::{contains_point, Bounds, Interval};
use crate::smarttree::Instance;
use crate::SmartTreeError;

/// A node of a [`SmartTree`][crate::smarttree::SmartTree].
///
/// Every node owns its bounding region. What else it owns is described by its [`NodeKind`].
#[derive(Debug, Clone)]
pub struct Node<N: Coordinate, I> {
    ranges: Bounds<N>,
    kind: NodeKind<N, I>,
}

/// The state of a [`Node`]: either a leaf holding instances or an internal node holding exactly
/// two children.
#[derive(Debug, Clone)]
pub enum NodeKind<N: Coordinate, I> {
    /// A node holding instances directly.
    Leaf(Vec<Instance<N, I>>),
    /// A node that has been split in two along `axis` at `split`.
    Internal {
        /// The dimension the region was divided on.
        axis: usize,
        /// Values below this go left, values at or above go right.
        split: N,
        /// The child covering `[lo, split)` on `axis`.
        left: Box<Node<N, I>>,
        /// The child covering `[split, hi)` on `axis`.
        right: Box<Node<N, I>>,
    },
}

/// The tree-wide parameters that decide when and where a leaf splits.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SplitPolicy<N: Coordinate> {
    pub(crate) min_ranges: Coords<N>,
    pub(crate) split_k: usize,
}

impl<N: Coordinate> SplitPolicy<N> {
    /// A leaf splits once it holds at least `split_k` instances and some dimension is wider than
    /// twice its minimum range.
    fn should_split<I>(&self, node: &Node<N, I>) -> bool {
        let two = N::one() + N::one();
        node.num_instances() >= self.split_k
            && node
                .ranges
                .iter()
                .zip(&self.min_ranges)
                .any(|(range, min)| range.width() > *min * two)
    }
}

impl<N: Coordinate, I> Node<N, I> {
    pub(crate) fn new_leaf(ranges: Bounds<N>) -> Self {
        Self {
            ranges,
            kind: NodeKind::Leaf(vec![]),
        }
    }

    /// The bounding region of this node, one half-open interval per dimension.
    pub fn ranges(&self) -> &[Interval<N>] {
        &self.ranges
    }

    /// Whether this node is a leaf or an internal node.
    pub fn kind(&self) -> &NodeKind<N, I> {
        &self.kind
    }

    /// Returns `true` if this is a leaf node without children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    /// Returns `true` if this is an internal node with children.
    #[inline]
    pub fn is_parent(&self) -> bool {
        !self.is_leaf()
    }

    /// The `(left, right)` children of an internal node.
    pub fn children(&self) -> Option<(&Node<N, I>, &Node<N, I>)> {
        match &self.kind {
            NodeKind::Leaf(_) => None,
            NodeKind::Internal { left, right, .. } => Some((left.as_ref(), right.as_ref())),
        }
    }

    /// The instances held by this node. Always empty for internal nodes.
    pub fn instances(&self) -> &[Instance<N, I>] {
        match &self.kind {
            NodeKind::Leaf(instances) => instances.as_slice(),
            NodeKind::Internal { .. } => &[],
        }
    }

    /// The number of instances held by this node.
    pub fn num_instances(&self) -> usize {
        self.instances().len()
    }

    /// Returns `true` if `value` lies within the region of this node.
    #[inline]
    pub fn contains(&self, value: &[N]) -> bool {
        contains_point(&self.ranges, value)
    }

    /// Descend to the leaf whose region contains `value`.
    pub(crate) fn leaf(&self, value: &[N]) -> Result<&Self> {
        if !self.contains(value) {
            return Err(not_found(value));
        }

        let mut node = self;
        loop {
            match &node.kind {
                NodeKind::Leaf(_) => return Ok(node),
                NodeKind::Internal { left, right, .. } => {
                    node = if left.contains(value) {
                        left.as_ref()
                    } else if right.contains(value) {
                        right.as_ref()
                    } else {
                        return Err(not_found(value));
                    };
                }
            }
        }
    }

    /// Add an instance to the leaf of this subtree containing it, splitting that leaf if the
    /// policy says so.
    pub(crate) fn insert(
        &mut self,
        instance: Instance<N, I>,
        policy: &SplitPolicy<N>,
    ) -> Result<()> {
        if !self.contains(instance.value()) {
            return Err(not_found(instance.value()));
        }

        match &mut self.kind {
            NodeKind::Leaf(instances) => instances.push(instance),
            NodeKind::Internal { left, right, .. } => {
                let child = if left.contains(instance.value()) {
                    left
                } else {
                    right
                };
                return child.insert(instance, policy);
            }
        }

        if policy.should_split(self) {
            self.split(policy)?;
        }
        Ok(())
    }

    /// Turn this leaf into an internal node and redistribute its instances into the two new
    /// children. Children may split in turn while instances are re-inserted.
    fn split(&mut self, policy: &SplitPolicy<N>) -> Result<()> {
        let Some((axis, split)) = self.choose_split(policy) else {
            return Ok(());
        };

        let (left_range, right_range) = self.ranges[axis].split_at(split);
        let mut left_ranges = self.ranges.clone();
        left_ranges[axis] = left_range;
        let mut right_ranges = self.ranges.clone();
        right_ranges[axis] = right_range;

        let previous = std::mem::replace(
            &mut self.kind,
            NodeKind::Internal {
                axis,
                split,
                left: Box::new(Node::new_leaf(left_ranges)),
                right: Box::new(Node::new_leaf(right_ranges)),
            },
        );

        if let NodeKind::Leaf(mut instances) = previous {
            debug!(
                axis,
                split = ?split,
                num_instances = instances.len(),
                "splitting leaf"
            );
            while let Some(instance) = instances.pop() {
                self.insert(instance, policy)?;
            }
        }

        Ok(())
    }

    /// Pick the split axis and split point for this leaf.
    ///
    /// Among the dimensions at least twice their minimum range wide, the one with the highest
    /// sample variance wins, ties going to the lowest index. The split point is the mean along
    /// that axis, moved so neither side is narrower than the minimum range.
    fn choose_split(&self, policy: &SplitPolicy<N>) -> Option<(usize, N)> {
        let instances = self.instances();
        let two = N::one() + N::one();

        // (axis, variance, mean)
        let mut best: Option<(usize, N, N)> = None;
        for (axis, (range, min)) in self.ranges.iter().zip(&policy.min_ranges).enumerate() {
            if range.width() < *min * two {
                continue;
            }

            let (mean, variance) = mean_and_variance(instances.iter().map(|i| i.value()[axis]));
            if best.map_or(true, |(_, best_variance, _)| variance > best_variance) {
                best = Some((axis, variance, mean));
            }
        }

        let (axis, _, mean) = best?;
        let range = self.ranges[axis];
        let min = policy.min_ranges[axis];

        let mut split = mean;
        if split - range.lo < min {
            split = range.lo + min;
        }
        if range.hi - split < min {
            split = range.hi - min;
        }

        // With a zero minimum range the mean can sit on the lower bound, which would produce a
        // child identical to its parent.
        if !(split > range.lo && split < range.hi) {
            debug!(axis, split = ?split, "refusing degenerate split");
            return None;
        }

        Some((axis, split))
    }
}

/// Mean and sample variance of `values`.
fn mean_and_variance<N: Coordinate>(values: impl Iterator<Item = N> + Clone) -> (N, N) {
    let (count, sum) = values
        .clone()
        .fold((N::zero(), N::zero()), |(count, sum), v| {
            (count + N::one(), sum + v)
        });
    if count < N::one() + N::one() {
        return (sum, N::zero());
    }

    let mean = sum / count;
    let squares = values.fold(N::zero(), |acc, v| acc + (v - mean) * (v - mean));
    (mean, squares / (count - N::one()))
}

fn not_found<N: Coordinate>(value: &[N]) -> SmartTreeError {
    SmartTreeError::NotFound(format!("no node contains the point {:?}", value))
}
