//! Utilities to traverse the SmartTree structure.
//!
//! All iterators here walk the tree in pre-order (parent before children, left before right)
//! using an explicit stack, so deep trees never exhaust the call stack.

use geo_traits::{
    CoordTrait, Dimensions, GeometryTrait, GeometryType, RectTrait, UnimplementedGeometryCollection,
    UnimplementedLine, UnimplementedLineString, UnimplementedMultiLineString,
    UnimplementedMultiPoint, UnimplementedMultiPolygon, UnimplementedPoint, UnimplementedPolygon,
    UnimplementedTriangle,
};

use crate::r#type::{Coordinate, Coords};
use crate::smarttree::bounds::{intersects, Bounds, Interval};
use crate::smarttree::instance::dimensions_for;
use crate::smarttree::{Instance, Node};

/// A read-only view onto a leaf of a [`SmartTree`][crate::smarttree::SmartTree].
#[derive(Debug)]
pub struct Leaf<'a, N: Coordinate, I> {
    node: &'a Node<N, I>,
}

impl<'a, N: Coordinate, I> Leaf<'a, N, I> {
    /// Wrap `node`, returning `None` if it is an internal node.
    pub fn from_node(node: &'a Node<N, I>) -> Option<Self> {
        node.is_leaf().then_some(Self { node })
    }

    /// The bounding region of this leaf.
    pub fn ranges(&self) -> &'a [Interval<N>] {
        self.node.ranges()
    }

    /// The instances held by this leaf.
    pub fn instances(&self) -> &'a [Instance<N, I>] {
        self.node.instances()
    }

    /// The number of instances held by this leaf.
    pub fn num_instances(&self) -> usize {
        self.node.num_instances()
    }

    /// The underlying node.
    pub fn node(&self) -> &'a Node<N, I> {
        self.node
    }
}

impl<N: Coordinate, I> Clone for Leaf<'_, N, I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N: Coordinate, I> Copy for Leaf<'_, N, I> {}

/// A pre-order iterator over every node of the tree, yielding each node with its depth.
///
/// The root has depth 0.
#[derive(Debug)]
pub struct Nodes<'a, N: Coordinate, I> {
    stack: Vec<(usize, &'a Node<N, I>)>,
}

impl<'a, N: Coordinate, I> Nodes<'a, N, I> {
    pub(crate) fn new(root: &'a Node<N, I>) -> Self {
        let mut stack = Vec::with_capacity(16);
        stack.push((0, root));
        Self { stack }
    }
}

impl<N: Coordinate, I> Clone for Nodes<'_, N, I> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
        }
    }
}

impl<'a, N: Coordinate, I> Iterator for Nodes<'a, N, I> {
    type Item = (usize, &'a Node<N, I>);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;

        if let Some((left, right)) = node.children() {
            // right first so left is processed first
            self.stack.push((depth + 1, right));
            self.stack.push((depth + 1, left));
        }

        Some((depth, node))
    }
}

/// A pre-order iterator over every leaf of the tree.
#[derive(Debug)]
pub struct Leaves<'a, N: Coordinate, I> {
    nodes: Nodes<'a, N, I>,
}

impl<'a, N: Coordinate, I> Leaves<'a, N, I> {
    pub(crate) fn new(root: &'a Node<N, I>) -> Self {
        Self {
            nodes: Nodes::new(root),
        }
    }
}

impl<N: Coordinate, I> Clone for Leaves<'_, N, I> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
        }
    }
}

impl<'a, N: Coordinate, I> Iterator for Leaves<'a, N, I> {
    type Item = Leaf<'a, N, I>;

    fn next(&mut self) -> Option<Self::Item> {
        self.nodes.find_map(|(_, node)| Leaf::from_node(node))
    }
}

/// A pre-order iterator over the leaves whose region intersects a search box.
///
/// Subtrees whose region does not intersect the box are never visited.
#[derive(Debug)]
pub struct LeavesInArea<'a, N: Coordinate, I> {
    area: Bounds<N>,
    stack: Vec<&'a Node<N, I>>,
}

impl<'a, N: Coordinate, I> LeavesInArea<'a, N, I> {
    pub(crate) fn new(root: &'a Node<N, I>, area: Bounds<N>) -> Self {
        let mut stack = Vec::with_capacity(16);
        if intersects(root.ranges(), &area) {
            stack.push(root);
        }
        Self { area, stack }
    }
}

impl<N: Coordinate, I> Clone for LeavesInArea<'_, N, I> {
    fn clone(&self) -> Self {
        Self {
            area: self.area.clone(),
            stack: self.stack.clone(),
        }
    }
}

impl<'a, N: Coordinate, I> Iterator for LeavesInArea<'a, N, I> {
    type Item = Leaf<'a, N, I>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node.children() {
                None => return Leaf::from_node(node),
                Some((left, right)) => {
                    if intersects(right.ranges(), &self.area) {
                        self.stack.push(right);
                    }
                    if intersects(left.ranges(), &self.area) {
                        self.stack.push(left);
                    }
                }
            }
        }
        None
    }
}

/// A single coordinate of arbitrary dimension.
///
/// The corners of the rects exposed by [`Node`] and [`Leaf`].
#[derive(Debug, Clone, PartialEq)]
pub struct Coord<N: Coordinate> {
    values: Coords<N>,
}

impl<N: Coordinate> Coord<N> {
    /// The values of this coordinate, one per dimension.
    pub fn values(&self) -> &[N] {
        &self.values
    }
}

impl<N: Coordinate> CoordTrait for Coord<N> {
    type T = N;

    fn dim(&self) -> Dimensions {
        dimensions_for(self.values.len())
    }

    fn x(&self) -> Self::T {
        self.values[0]
    }

    fn y(&self) -> Self::T {
        self.values[1]
    }

    fn nth_or_panic(&self, n: usize) -> Self::T {
        self.values[n]
    }
}

fn lower_corner<N: Coordinate>(ranges: &[Interval<N>]) -> Coord<N> {
    Coord {
        values: ranges.iter().map(|r| r.lo).collect(),
    }
}

fn upper_corner<N: Coordinate>(ranges: &[Interval<N>]) -> Coord<N> {
    Coord {
        values: ranges.iter().map(|r| r.hi).collect(),
    }
}

/// Node regions are exposed to geo-traits consumers as (possibly higher-dimensional) rects.
macro_rules! impl_rect_geometry {
    ([$($generics:tt)*] $ty:ty) => {
        impl<$($generics)*> GeometryTrait for $ty {
            type T = N;
            type PointType<'b>
                = UnimplementedPoint<N>
            where
                Self: 'b;
            type LineStringType<'b>
                = UnimplementedLineString<N>
            where
                Self: 'b;
            type PolygonType<'b>
                = UnimplementedPolygon<N>
            where
                Self: 'b;
            type MultiPointType<'b>
                = UnimplementedMultiPoint<N>
            where
                Self: 'b;
            type MultiLineStringType<'b>
                = UnimplementedMultiLineString<N>
            where
                Self: 'b;
            type MultiPolygonType<'b>
                = UnimplementedMultiPolygon<N>
            where
                Self: 'b;
            type GeometryCollectionType<'b>
                = UnimplementedGeometryCollection<N>
            where
                Self: 'b;
            type RectType<'b>
                = Self
            where
                Self: 'b;
            type TriangleType<'b>
                = UnimplementedTriangle<N>
            where
                Self: 'b;
            type LineType<'b>
                = UnimplementedLine<N>
            where
                Self: 'b;

            fn dim(&self) -> Dimensions {
                dimensions_for(self.ranges().len())
            }

            fn as_type(
                &self,
            ) -> GeometryType<
                '_,
                Self::PointType<'_>,
                Self::LineStringType<'_>,
                Self::PolygonType<'_>,
                Self::MultiPointType<'_>,
                Self::MultiLineStringType<'_>,
                Self::MultiPolygonType<'_>,
                Self::GeometryCollectionType<'_>,
                Self::RectType<'_>,
                Self::TriangleType<'_>,
                Self::LineType<'_>,
            > {
                GeometryType::Rect(self)
            }
        }

        impl<$($generics)*> RectTrait for $ty {
            type CoordType<'b>
                = Coord<N>
            where
                Self: 'b;

            fn min(&self) -> Self::CoordType<'_> {
                lower_corner(self.ranges())
            }

            fn max(&self) -> Self::CoordType<'_> {
                upper_corner(self.ranges())
            }
        }
    };
}

impl_rect_geometry!([N: Coordinate, I] Node<N, I>);
impl_rect_geometry!(['a, N: Coordinate, I] Leaf<'a, N, I>);
