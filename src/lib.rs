#![doc = include_str!("../README.md")]

mod error;
pub mod smarttree;
mod r#type;

pub use error::SmartTreeError;
pub use r#type::{AxisValues, Coordinate, Coords};

#[cfg(test)]
pub(crate) mod test;
