//! Region quadtree for Barnes-Hut charge approximation.
//!
//! Cells are stored in an arena. Each cell records its square bounds, the
//! number of bodies below it and their mean position. Leaves hold body slots
//! directly; a leaf may hold several slots when bodies coincide or the depth
//! limit is reached.

use crate::layout::body::Body;

/// Depth at which subdivision stops regardless of occupancy.
const MAX_DEPTH: u32 = 24;

#[derive(Debug)]
pub(super) struct Cell {
    pub x0: f32,
    pub y0: f32,
    /// Side length of the square cell.
    pub width: f32,
    /// Mean position of the bodies in the cell.
    pub cx: f32,
    pub cy: f32,
    /// Number of bodies in the cell.
    pub count: u32,
    /// Child cell indices; empty quadrants are `None`.
    pub children: [Option<usize>; 4],
    /// Body slots, populated on leaves only.
    pub slots: Vec<usize>,
}

impl Cell {
    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }
}

#[derive(Debug)]
pub(super) struct QuadTree {
    pub cells: Vec<Cell>,
}

impl QuadTree {
    /// Build a tree covering every body. Returns `None` when there are none.
    pub fn build(bodies: &[Body]) -> Option<Self> {
        let first = bodies.first()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for body in bodies {
            x0 = x0.min(body.x);
            y0 = y0.min(body.y);
            x1 = x1.max(body.x);
            y1 = y1.max(body.y);
        }
        // Square bounds, padded so bodies on the max edge stay inside
        let width = (x1 - x0).max(y1 - y0).max(1.0) * 1.0001;

        let mut tree = Self {
            cells: Vec::with_capacity(bodies.len() * 2),
        };
        let slots: Vec<usize> = (0..bodies.len()).collect();
        tree.insert_cell(bodies, slots, x0, y0, width, 0);
        Some(tree)
    }

    fn insert_cell(
        &mut self,
        bodies: &[Body],
        slots: Vec<usize>,
        x0: f32,
        y0: f32,
        width: f32,
        depth: u32,
    ) -> usize {
        let count = slots.len() as u32;
        let (mut sx, mut sy) = (0.0f32, 0.0f32);
        for &slot in &slots {
            sx += bodies[slot].x;
            sy += bodies[slot].y;
        }

        let index = self.cells.len();
        self.cells.push(Cell {
            x0,
            y0,
            width,
            cx: sx / count as f32,
            cy: sy / count as f32,
            count,
            children: [None; 4],
            slots: Vec::new(),
        });

        if slots.len() == 1 || depth >= MAX_DEPTH || all_coincide(bodies, &slots) {
            self.cells[index].slots = slots;
            return index;
        }

        let half = width / 2.0;
        let (mx, my) = (x0 + half, y0 + half);
        let mut quadrants: [Vec<usize>; 4] = Default::default();
        for slot in slots {
            let body = &bodies[slot];
            let q = usize::from(body.x >= mx) | (usize::from(body.y >= my) << 1);
            quadrants[q].push(slot);
        }

        for (q, members) in quadrants.into_iter().enumerate() {
            if members.is_empty() {
                continue;
            }
            let qx = if q & 1 == 0 { x0 } else { mx };
            let qy = if q & 2 == 0 { y0 } else { my };
            let child = self.insert_cell(bodies, members, qx, qy, half, depth + 1);
            self.cells[index].children[q] = Some(child);
        }

        index
    }
}

fn all_coincide(bodies: &[Body], slots: &[usize]) -> bool {
    let first = &bodies[slots[0]];
    slots[1..]
        .iter()
        .all(|&slot| bodies[slot].x == first.x && bodies[slot].y == first.y)
}
