//! An adaptive spatial partition tree, built incrementally from a stream of points.
//!
//! Leaves split along their highest-variance dimension once they hold enough instances, down to
//! a minimum region width per dimension. The tree answers axis-aligned box searches and combined
//! box and Euclidean neighbor searches without scanning every instance.

#![warn(missing_docs)]

mod bounds;
mod builder;
mod index;
mod instance;
mod node;
pub mod traversal;

pub use bounds::Interval;
pub use builder::{SmartTreeBuilder, DEFAULT_SPLIT_K, MIN_SPLIT_K};
pub use index::SmartTree;
pub use instance::Instance;
pub use node::{Node, NodeKind};
pub use traversal::Leaf;
