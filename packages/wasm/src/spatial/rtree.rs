//! R-tree based spatial index using the rstar crate.
//!
//! Provides O(log n) spatial queries over simulation bodies for:
//! - Nearest neighbor (pointer hit testing)
//! - Point-in-radius (collision candidate search)

use rstar::{AABB, PointDistance, RTree, RTreeObject};

/// A point in the spatial index tagged with its body slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPoint {
    /// Index of the body in the simulation's body slice.
    pub slot: usize,
    pub x: f32,
    pub y: f32,
}

impl RTreeObject for BodyPoint {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for BodyPoint {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }
}

/// Spatial index over a snapshot of body positions.
///
/// Bodies move every tick, so the index is bulk-loaded from the current
/// positions by each caller rather than updated incrementally.
pub struct SpatialIndex {
    tree: RTree<BodyPoint>,
}

impl SpatialIndex {
    /// Bulk-load an index from `(x, y)` positions; slots are the slice indices.
    pub fn from_positions<I>(positions: I) -> Self
    where
        I: IntoIterator<Item = (f32, f32)>,
    {
        let points: Vec<_> = positions
            .into_iter()
            .enumerate()
            .map(|(slot, (x, y))| BodyPoint { slot, x, y })
            .collect();

        Self {
            tree: RTree::bulk_load(points),
        }
    }

    /// The slot nearest `(x, y)`, if it lies within `max_distance`.
    pub fn nearest_within(&self, x: f32, y: f32, max_distance: f32) -> Option<usize> {
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&[x, y])
            .filter(|point| point.distance_2(&[x, y]) <= max_distance_sq)
            .map(|point| point.slot)
    }

    /// All slots within `radius` of `(x, y)`, in no particular order.
    pub fn in_radius(&self, x: f32, y: f32, radius: f32) -> Vec<usize> {
        self.tree
            .locate_within_distance([x, y], radius * radius)
            .map(|point| point.slot)
            .collect()
    }
}
