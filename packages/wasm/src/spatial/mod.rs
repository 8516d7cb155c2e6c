//! Spatial indexing for O(log n) neighborhood queries.
//!
//! This module provides an R-tree based spatial index over simulation
//! bodies, used for collision candidate search and pointer hit testing.

mod rtree;

pub use rtree::{BodyPoint, SpatialIndex};
