//! Force evaluation and energy diagnostics
//!
//! The tree traversal is the hot path: a stack-driven Barnes-Hut descent
//! that treats distant nodes as point masses. The direct pairwise sum is
//! kept alongside it as the exact reference, and the energy helpers feed
//! verbose logging and the orbit tests.

use rayon::prelude::*;

use super::params::Parameters;
use super::quadtree::{NodeKind, QuadArena, STACK_LIMIT};
use super::states::{Body, NVec2};

/// Accumulate the tree's force on one body into `b.f`.
///
/// Starting from the global root, pop a node and decide:
/// - internal node close enough that its angular extent reaches `theta`
///   (or sitting exactly on the body): descend into its children;
/// - internal node farther away: take its aggregate mass at its centre of
///   mass;
/// - leaf bucket: walk the chain and add every occupant pairwise, skipping
///   the body itself (by stable index) and anything within `eps`.
///
/// Each body queries the tree independently; opposite forces are computed
/// twice rather than mirrored.
pub fn tree_force(root: i32, arena: &QuadArena, b: &mut Body, p: &Parameters) {
    if root < 0 {
        return;
    }
    let mut stack: Vec<i32> = Vec::with_capacity(STACK_LIMIT);
    stack.push(root);

    while let Some(ix) = stack.pop() {
        let node = &arena.nodes[ix as usize];
        match node.kind {
            NodeKind::Internal => {
                let r = node.com - b.x;
                let d2 = r.norm_squared();
                let d = d2.sqrt();
                if d == 0.0 || node.size / d >= p.theta {
                    assert!(
                        stack.len() < STACK_LIMIT - 4,
                        "force traversal stack overflow"
                    );
                    for &child in &node.children {
                        if child >= 0 {
                            stack.push(child);
                        }
                    }
                } else {
                    b.f += r * (p.G * b.m * node.mass / (d2 * d));
                }
            }
            NodeKind::Leaf => {
                let mut cur = ix;
                while cur >= 0 {
                    let occ = &arena.nodes[cur as usize];
                    if occ.body != b.index {
                        let r = occ.com - b.x;
                        let d = r.norm();
                        if d > p.eps {
                            b.f += r * (p.G * b.m * occ.mass / (d * d * d));
                        }
                    }
                    cur = occ.next_in_leaf;
                }
            }
            NodeKind::Empty => {}
        }
    }
}

/// Exact pairwise forces for all bodies, bypassing the tree. Shares the
/// `eps` proximity rule with the leaf-bucket walk.
pub fn direct_forces(bodies: &mut [Body], p: &Parameters) {
    let n = bodies.len();
    for i in 0..n {
        let (xi, mi) = (bodies[i].x, bodies[i].m);
        let mut f = NVec2::zeros();
        for j in 0..n {
            if j == i {
                continue;
            }
            let r = bodies[j].x - xi;
            let d = r.norm();
            if d > p.eps {
                f += r * (p.G * mi * bodies[j].m / (d * d * d));
            }
        }
        bodies[i].f = f;
    }
}

/// Total kinetic energy, reduced in parallel.
pub fn kinetic_energy(bodies: &[Body]) -> f64 {
    bodies
        .par_iter()
        .map(|b| 0.5 * b.m * b.v.norm_squared())
        .sum()
}

/// Total pairwise potential energy, reduced in parallel over the upper
/// triangle. Pairs within `eps` are skipped like everywhere else.
pub fn potential_energy(bodies: &[Body], p: &Parameters) -> f64 {
    (0..bodies.len())
        .into_par_iter()
        .map(|i| {
            ((i + 1)..bodies.len())
                .map(|j| {
                    let d = (bodies[j].x - bodies[i].x).norm();
                    if d > p.eps {
                        -p.G * bodies[i].m * bodies[j].m / d
                    } else {
                        0.0
                    }
                })
                .sum::<f64>()
        })
        .sum()
}

pub fn total_energy(bodies: &[Body], p: &Parameters) -> f64 {
    kinetic_energy(bodies) + potential_energy(bodies, p)
}
