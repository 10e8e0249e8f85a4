//! Helpers shared by the test suites of this crate.

use crate::r#type::Coordinate;
use crate::smarttree::{Instance, Interval, Node, NodeKind, SmartTree};


/// Walk the whole tree and assert the structural invariants:
///
/// - the children of an internal node partition its region on the split axis only
/// - every child is at least `min_range` wide on the axis it was split on
/// - every instance lies inside the region of the leaf holding it
/// - the leaves together hold exactly `num_items` instances
pub(crate) fn check_invariants<N: Coordinate, I>(tree: &SmartTree<N, I>) {
    let mut total = 0;
    for (_, node) in tree.nodes() {
        match node.kind() {
            NodeKind::Leaf(instances) => {
                total += instances.len();
                for instance in instances {
                    assert!(
                        node.contains(instance.value()),
                        "{:?} outside of leaf {:?}",
                        instance.value(),
                        node.ranges()
                    );
                }
            }
            NodeKind::Internal {
                axis,
                split,
                left,
                right,
            } => check_partition(node, *axis, *split, left, right, tree.min_ranges()[*axis]),
        }
    }
    assert_eq!(total, tree.num_items());
}

fn check_partition<N: Coordinate, I>(
    parent: &Node<N, I>,
    axis: usize,
    split: N,
    left: &Node<N, I>,
    right: &Node<N, I>,
    min_range: N,
) {
    let ranges = parent.ranges();
    assert_eq!(left.ranges().len(), ranges.len());
    assert_eq!(right.ranges().len(), ranges.len());
    for (dim, range) in ranges.iter().enumerate() {
        if dim == axis {
            continue;
        }
        assert_eq!(&left.ranges()[dim], range);
        assert_eq!(&right.ranges()[dim], range);
    }

    let (l, r) = (left.ranges()[axis], right.ranges()[axis]);
    assert_eq!(l.lo, ranges[axis].lo);
    assert_eq!(l.hi, split);
    assert_eq!(r.lo, split);
    assert_eq!(r.hi, ranges[axis].hi);
    assert!(ranges[axis].lo < split && split < ranges[axis].hi);

    // clamped split points are only exact up to rounding
    let scale = N::one() + ranges[axis].lo.abs() + ranges[axis].hi.abs();
    let tolerance = N::epsilon() * scale * (N::one() + N::one() + N::one() + N::one());
    assert!(l.width() >= min_range - tolerance);
    assert!(r.width() >= min_range - tolerance);
}

/// Apply the neighbor filter to every instance, without using the tree.
pub(crate) fn brute_force_neighbors<'a, N: Coordinate, I>(
    instances: &'a [Instance<N, I>],
    probe: &[N],
    max_distance: &[N],
    euclidean_distance: N,
    euclidean_dims: &[usize],
) -> Vec<&'a Instance<N, I>> {
    let area: Vec<Interval<N>> = probe
        .iter()
        .zip(max_distance)
        .map(|(p, d)| Interval::new(*p - *d, *p + *d))
        .collect();
    instances
        .iter()
        .filter(|instance| {
            instance
                .value()
                .iter()
                .zip(&area)
                .all(|(v, range)| range.contains(*v))
        })
        .filter(|instance| {
            scaled_distance(instance.value(), probe, euclidean_dims) <= euclidean_distance
        })
        .collect()
}

/// Euclidean distance over `dims`, scaled by the largest difference so squaring cannot underflow.
fn scaled_distance<N: Coordinate>(a: &[N], b: &[N], dims: &[usize]) -> N {
    let diffs: Vec<N> = dims.iter().map(|axis| (a[*axis] - b[*axis]).abs()).collect();
    let scale = diffs.iter().fold(N::zero(), |acc, d| acc.max(*d));
    if scale == N::zero() {
        return N::zero();
    }
    let sum = diffs.iter().fold(N::zero(), |acc, d| {
        let r = *d / scale;
        acc + r * r
    });
    scale * sum.sqrt()
}
