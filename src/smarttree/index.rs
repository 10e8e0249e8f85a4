use std::fmt::{self, Display};

use geo_traits::CoordTrait;
use tracing::trace;

use crate::error::Result;
use crate::r#type::{AxisValues, Coordinate, Coords};
use crate::smarttree::bounds::{contains_point, query_box, validate_area, Bounds, Interval};
use crate::smarttree::instance::coords_of;
use crate::smarttree::node::{Node, SplitPolicy};
use crate::smarttree::traversal::{Leaf, Leaves, LeavesInArea, Nodes};
use crate::smarttree::{Instance, SmartTreeBuilder};
use crate::SmartTreeError;

/// An adaptive spatial partition tree.
///
/// The tree starts as a single leaf covering the full coordinate extent. Leaves split in two
/// along their highest-variance dimension once they hold enough instances, so the partition
/// follows the density of the inserted data.
///
/// Usually this will be created via [`SmartTreeBuilder`] or [`SmartTree::try_new`].
///
/// The tree performs no internal synchronization. Sharing it between a writer and readers
/// requires external locking, since a query must never observe a leaf while it is splitting.
#[derive(Debug, Clone)]
pub struct SmartTree<N: Coordinate, I = u64> {
    pub(crate) root: Node<N, I>,
    pub(crate) policy: SplitPolicy<N>,
    pub(crate) num_items: usize,
}

impl<N: Coordinate, I> SmartTree<N, I> {
    /// Create an empty tree covering `ranges`.
    ///
    /// - ranges: one `(lo, hi)` pair per dimension
    /// - min_range: a scalar for every dimension or one value per dimension, all `>= 0`
    /// - split_k: the instance count that makes a leaf eligible for splitting, at least 2
    pub fn try_new<R: Into<Interval<N>>>(
        ranges: impl IntoIterator<Item = R>,
        min_range: impl Into<AxisValues<N>>,
        split_k: usize,
    ) -> Result<Self> {
        SmartTreeBuilder::new(ranges)
            .min_range(min_range)
            .split_k(split_k)
            .finish()
    }

    /// The number of dimensions of this tree.
    pub fn dimensions(&self) -> usize {
        self.root.ranges().len()
    }

    /// The full extent covered by this tree.
    pub fn ranges(&self) -> &[Interval<N>] {
        self.root.ranges()
    }

    /// The minimum splittable width for each dimension.
    pub fn min_ranges(&self) -> &[N] {
        &self.policy.min_ranges
    }

    /// The instance count that makes a leaf eligible for splitting.
    pub fn split_k(&self) -> usize {
        self.policy.split_k
    }

    /// The number of instances added to this tree.
    pub fn num_items(&self) -> usize {
        self.num_items
    }

    /// The total number of nodes, both leaves and internal nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes().count()
    }

    /// The number of leaves.
    pub fn num_leaves(&self) -> usize {
        self.leaves().count()
    }

    /// The length of the longest path from the root to a leaf. A tree that never split has
    /// depth 0.
    pub fn depth(&self) -> usize {
        self.nodes().map(|(depth, _)| depth).max().unwrap_or(0)
    }

    /// Access the root node for manual traversal.
    pub fn root(&self) -> &Node<N, I> {
        &self.root
    }

    /// Add an instance to the tree.
    ///
    /// The instance goes to the leaf whose region contains it. That leaf may split, and its
    /// children may split in turn while its instances are redistributed.
    ///
    /// Fails with a validation error if the instance has the wrong number of coordinates, and
    /// with a not-found error if it lies outside the extent of the tree. The tree is unchanged
    /// in both cases.
    pub fn add(&mut self, instance: Instance<N, I>) -> Result<()> {
        self.check_dimensions(instance.dimensions(), "instance")?;
        self.root.insert(instance, &self.policy)?;
        self.num_items += 1;
        trace!(num_items = self.num_items, "added instance");
        Ok(())
    }

    /// Find the leaf whose region contains `coord`.
    pub fn find(&self, coord: &impl CoordTrait<T = N>) -> Result<Leaf<'_, N, I>> {
        let value = self.probe_coords(coord)?;
        let node = self.root.leaf(&value)?;
        Leaf::from_node(node).ok_or_else(|| {
            SmartTreeError::NotFound(format!("no leaf contains the point {:?}", value))
        })
    }

    /// Search the tree for instances within a given box.
    ///
    /// - area: one half-open interval `[lo, hi)` per dimension
    ///
    /// Returns the instances found, in no particular order.
    pub fn search(&self, area: &[Interval<N>]) -> Result<Vec<&Instance<N, I>>> {
        validate_area(area, self.dimensions())?;
        let area: Bounds<N> = area.iter().copied().collect();
        let results = self.collect_in_area(area, |_| true);
        trace!(num_results = results.len(), "search");
        Ok(results)
    }

    /// Search the tree for instances near a probe point.
    ///
    /// - probe: the query point; any [`Instance`] can be used as a probe
    /// - max_distance: the largest allowed distance on each dimension
    ///
    /// An instance matches when every coordinate lies within `[p - d, p + d)` of the probe.
    /// Returns the instances found, in no particular order.
    pub fn neighbors(
        &self,
        probe: &impl CoordTrait<T = N>,
        max_distance: impl Into<AxisValues<N>>,
    ) -> Result<Vec<&Instance<N, I>>> {
        self.neighbors_within(probe, max_distance, N::zero(), &[])
    }

    /// Search the tree for instances near a probe point, additionally bounding the Euclidean
    /// distance over a subset of dimensions.
    ///
    /// - probe: the query point
    /// - max_distance: the largest allowed distance on each dimension
    /// - euclidean_distance: the largest allowed Euclidean distance
    /// - euclidean_dims: the dimensions the Euclidean distance is computed over. When empty the
    ///   Euclidean bound always passes.
    ///
    /// The probe coordinates and both distances must be finite.
    ///
    /// Returns the instances found, in no particular order.
    ///
    /// ```
    /// use smart_index::smarttree::{Instance, SmartTree};
    ///
    /// let mut tree = SmartTree::<f64, u32>::try_new([(0., 10.), (0., 10.)], 0.5, 4).unwrap();
    /// tree.add(Instance::new(0, [5.0, 5.0])).unwrap();
    /// tree.add(Instance::new(1, [5.9, 5.9])).unwrap();
    ///
    /// let probe: Instance<f64> = Instance::probe([5.0, 5.0]);
    /// // Both points are within the box, only the first is within the circle
    /// assert_eq!(tree.neighbors(&probe, 1.0).unwrap().len(), 2);
    /// let near = tree.neighbors_within(&probe, 1.0, 1.0, &[0, 1]).unwrap();
    /// assert_eq!(near.len(), 1);
    /// assert_eq!(near[0].id(), Some(&0));
    /// ```
    pub fn neighbors_within(
        &self,
        probe: &impl CoordTrait<T = N>,
        max_distance: impl Into<AxisValues<N>>,
        euclidean_distance: N,
        euclidean_dims: &[usize],
    ) -> Result<Vec<&Instance<N, I>>> {
        let probe = self.probe_coords(probe)?;
        if let Some(axis) = probe.iter().position(|v| !v.is_finite()) {
            return Err(SmartTreeError::Validation(format!(
                "probe[{}] must be finite, got {}",
                axis, probe[axis]
            )));
        }
        let max_distance = max_distance
            .into()
            .broadcast(self.dimensions(), "max_distance")?;
        if !(euclidean_distance.is_finite() && euclidean_distance >= N::zero()) {
            return Err(SmartTreeError::Validation(format!(
                "euclidean_distance must be finite and >= 0, got {}",
                euclidean_distance
            )));
        }
        self.check_euclidean_dims(euclidean_dims)?;

        let area = query_box(&probe, &max_distance);
        let results = self.collect_in_area(area, |instance| {
            distance(instance.value(), &probe, euclidean_dims) <= euclidean_distance
        });
        trace!(num_results = results.len(), "neighbors");
        Ok(results)
    }

    /// Iterate over every node in pre-order, together with its depth.
    pub fn nodes(&self) -> Nodes<'_, N, I> {
        Nodes::new(&self.root)
    }

    /// Iterate over every leaf in pre-order.
    ///
    /// The iterator is lazy and borrows the tree; calling this again without adding in between
    /// yields the same leaves.
    pub fn leaves(&self) -> Leaves<'_, N, I> {
        Leaves::new(&self.root)
    }

    /// Iterate over the leaves whose region intersects `area`.
    pub fn leaves_in_area(&self, area: &[Interval<N>]) -> Result<LeavesInArea<'_, N, I>> {
        validate_area(area, self.dimensions())?;
        Ok(LeavesInArea::new(&self.root, area.iter().copied().collect()))
    }

    /// The instances of all leaves intersecting `area` that lie inside `area` and pass `keep`.
    fn collect_in_area(
        &self,
        area: Bounds<N>,
        keep: impl Fn(&Instance<N, I>) -> bool,
    ) -> Vec<&Instance<N, I>> {
        let leaves = LeavesInArea::new(&self.root, area.clone());
        leaves
            .flat_map(|leaf| leaf.instances())
            .filter(|instance| {
                contains_point(&area, instance.value()) && keep(*instance)
            })
            .collect()
    }

    fn probe_coords(&self, coord: &impl CoordTrait<T = N>) -> Result<Coords<N>> {
        let value = coords_of(coord);
        self.check_dimensions(value.len(), "probe")?;
        Ok(value)
    }

    fn check_dimensions(&self, dims: usize, name: &str) -> Result<()> {
        if dims != self.dimensions() {
            return Err(SmartTreeError::Validation(format!(
                "dimension mismatch: tree has {} dimensions, {} has {}",
                self.dimensions(),
                name,
                dims
            )));
        }
        Ok(())
    }

    fn check_euclidean_dims(&self, euclidean_dims: &[usize]) -> Result<()> {
        for (i, axis) in euclidean_dims.iter().enumerate() {
            if *axis >= self.dimensions() {
                return Err(SmartTreeError::Validation(format!(
                    "euclidean_dims contains {}, but the tree has {} dimensions",
                    axis,
                    self.dimensions()
                )));
            }
            if euclidean_dims[..i].contains(axis) {
                return Err(SmartTreeError::Validation(format!(
                    "euclidean_dims contains {} more than once",
                    axis
                )));
            }
        }
        Ok(())
    }
}

/// Euclidean distance between `a` and `b` over the given dimensions only.
///
/// Accumulated with `hypot`, so tiny differences do not underflow to zero when squared.
#[inline]
pub(crate) fn distance<N: Coordinate>(a: &[N], b: &[N], dims: &[usize]) -> N {
    dims.iter()
        .fold(N::zero(), |acc, axis| acc.hypot(a[*axis] - b[*axis]))
}

/// An indented dump of the node hierarchy, one node per line.
///
/// ```text
/// Node(ranges=[[0, 10)], n=0)
/// --Node(ranges=[[0, 3)], n=1)
/// --Node(ranges=[[3, 10)], n=1)
/// ```
impl<N: Coordinate, I> Display for SmartTree<N, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (depth, node)) in self.nodes().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}Node(ranges=[", "--".repeat(depth))?;
            for (axis, range) in node.ranges().iter().enumerate() {
                if axis > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", range)?;
            }
            write!(f, "], n={})", node.num_instances())?;
        }
        Ok(())
    }
}
