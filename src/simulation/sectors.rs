//! Boundary reduction and sector assignment
//!
//! The first two phases of every iteration:
//! - reduce the min/max corners of the body set in parallel,
//! - map every body to a cell of the S x S sector grid,
//! - collect the per-sector body index lists the tree builders consume.

use rayon::prelude::*;

use super::states::{Body, Boundary};

/// Bodies per parallel reduction range.
const RANGE_LEN: usize = 4096;

/// Min/max of all body positions. The reduction is seeded from body 0 and
/// combined with commutative merges, so the ranges may run in any order.
///
/// The caller guarantees at least one body.
pub fn reduce_boundary(bodies: &[Body]) -> Boundary {
    let seed = Boundary::around(bodies[0].x);
    bodies
        .par_chunks(RANGE_LEN)
        .map(|range| {
            range
                .iter()
                .fold(Boundary::around(range[0].x), |b, body| b.include(body.x))
        })
        .reduce(|| seed, Boundary::merge)
}

/// Rewrite every body's sector index for the current boundary.
///
/// A body at the boundary maximum lands exactly on the grid edge; its cell
/// coordinate is pulled back to S - 1 so it stays inside the grid.
pub fn assign_sectors(bodies: &mut [Body], boundary: &Boundary, sector_exp: u32) {
    let s = 1i64 << sector_exp;
    let cell = boundary.side() / s as f64;
    let min = boundary.min;
    bodies.par_iter_mut().for_each(|b| {
        let mut sx = ((b.x.x - min.x) / cell).floor() as i64;
        let mut sy = ((b.x.y - min.y) / cell).floor() as i64;
        if sx >= s {
            sx = s - 1;
        }
        if sy >= s {
            sy = s - 1;
        }
        b.sector = (sx + s * sy) as u32;
    });
}

/// Group body indices by sector, reusing the outer and inner allocations
/// across iterations.
pub fn partition_sectors(bodies: &[Body], sectors: &mut Vec<Vec<u32>>, sector_count: usize) {
    sectors.resize_with(sector_count, Vec::new);
    for list in sectors.iter_mut() {
        list.clear();
    }
    for (i, b) in bodies.iter().enumerate() {
        sectors[b.sector as usize].push(i as u32);
    }
}
