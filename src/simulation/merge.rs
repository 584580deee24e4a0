//! Bottom-up merge of the sector trees into one global root
//!
//! The S x S sector roots are paired into synthetic internal nodes, level by
//! level, until a single root covers the whole simulation square. Each
//! synthetic node's centre of mass is the mass-weighted mean of its children,
//! so no subtree is revisited. The merge runs sequentially in the arena's
//! final chunk; with O(S^2) total work there is nothing worth parallelizing.

use super::quadtree::{NodeKind, QuadArena, QuadNode, NE, NIL, NW, SE, SW};
use super::states::{Boundary, NVec2};

/// Combine the sector roots into the global root and return its index, or
/// `-1` if every sector is empty.
///
/// Sector roots sit at `sector * chunk_len`; a root with no bodies enters the
/// grid as `-1` and is never attached. Each level halves the grid: cell
/// `(i, j)` of the next level takes the four current cells
/// `(2i, 2j)`..`(2i+1, 2j+1)` as its sw/nw/se/ne children.
pub fn merge_sectors(arena: &mut QuadArena, boundary: &Boundary, sector_exp: u32) -> i32 {
    let s = 1usize << sector_exp;
    let chunk = arena.chunk_len;
    let side = boundary.side();
    let min = boundary.min;

    let mut grid: Vec<i32> = (0..s * s)
        .map(|sector| {
            let base = (sector * chunk) as i32;
            if arena.nodes[base as usize].total > 0 {
                base
            } else {
                NIL
            }
        })
        .collect();

    // The merge chunk begins after the sector chunks.
    let mut cursor = s * s * chunk;
    let limit = cursor + chunk;

    let mut level = s;
    while level > 1 {
        let next_level = level / 2;
        let cell = side / next_level as f64;
        let mut next_grid = vec![NIL; next_level * next_level];

        for j in 0..next_level {
            for i in 0..next_level {
                assert!(
                    cursor < limit,
                    "merge chunk overflow (capacity {chunk})"
                );
                let mut node = QuadNode::empty();
                node.kind = NodeKind::Internal;
                node.size = cell;
                node.center = NVec2::new(
                    min.x + cell * (i as f64 + 0.5),
                    min.y + cell * (j as f64 + 0.5),
                );

                let sub_cells = [
                    (SW, 2 * i, 2 * j),
                    (NW, 2 * i, 2 * j + 1),
                    (SE, 2 * i + 1, 2 * j),
                    (NE, 2 * i + 1, 2 * j + 1),
                ];
                let mut weighted = NVec2::zeros();
                for (q, ci, cj) in sub_cells {
                    let sub = grid[ci + level * cj];
                    if sub >= 0 {
                        let child = &arena.nodes[sub as usize];
                        node.children[q] = sub;
                        node.mass += child.mass;
                        node.total += child.total;
                        weighted += child.com * child.mass;
                    }
                }
                if node.total > 0 {
                    node.com = weighted / node.mass;
                    next_grid[i + next_level * j] = cursor as i32;
                }
                arena.nodes[cursor] = node;
                cursor += 1;
            }
        }

        grid = next_grid;
        level = next_level;
    }

    grid[0]
}
