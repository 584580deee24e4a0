//! # Sector-local Barnes-Hut quadtree over a flat arena
//!
//! This module implements the quadtree the force phase traverses. Instead of
//! a pointer graph, every node lives in one contiguous pool ([`QuadArena`])
//! and refers to its children by signed index, with `-1` as the null link.
//!
//! ## Core concepts
//!
//! - The arena is split into equal chunks, one per sector of the S x S grid
//!   plus one final chunk for the merge phase. Each sector's tree is built by
//!   exactly one task writing only its own chunk, so the S x S builds run in
//!   parallel without any synchronization.
//! - "Allocation" is a bump of a per-chunk cursor. A chunk that runs out of
//!   slots means the arena was undersized, which is fatal.
//! - Insertion is iterative. A fixed-capacity work stack of
//!   `(parent, body leaf)` pairs replaces recursion, so a pathological body
//!   distribution dies with a diagnostic instead of blowing the native stack.
//! - Up to `leaf_size` bodies share one child slot as a singly-linked leaf
//!   bucket, newest at the head. The bucket that would overflow is replaced
//!   by a half-size internal node and all of its bodies are re-inserted one
//!   level down.
//! - Every internal node carries the running total mass and centre of mass of
//!   the bodies beneath it, updated as each body passes through.

use super::states::{Body, NVec2};

/// Null child / chain link.
pub const NIL: i32 = -1;

/// Work stack capacity for the builder and the force traversal.
pub const STACK_LIMIT: usize = 1024;

/// Child slot order. The low side wins ties on both axes.
pub const SW: usize = 0;
pub const NW: usize = 1;
pub const SE: usize = 2;
pub const NE: usize = 3;

/// Quadrant of point `p` relative to centre `c`. Coordinates equal to the
/// centre bias toward the low side.
pub fn quadrant(c: NVec2, p: NVec2) -> usize {
    if p.x <= c.x {
        if p.y <= c.y {
            SW
        } else {
            NW
        }
    } else if p.y <= c.y {
        SE
    } else {
        NE
    }
}

/// Unit offsets from a parent centre toward each quadrant's centre.
fn quadrant_offset(q: usize) -> NVec2 {
    match q {
        SW => NVec2::new(-1.0, -1.0),
        NW => NVec2::new(-1.0, 1.0),
        SE => NVec2::new(1.0, -1.0),
        _ => NVec2::new(1.0, 1.0),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Unallocated slot.
    Empty,
    /// One body; may head or continue a leaf bucket chain.
    Leaf,
    /// Four-way split region, or a synthetic merge node.
    Internal,
}

/// A single arena slot.
///
/// For a `Leaf`, `com` and `mass` are the body's position and mass and
/// `body` is its stable index. For an `Internal` node they are the running
/// aggregate of everything beneath it. `center` and `size` describe the
/// geometric square of the node, children of a node always being half its
/// size.
#[derive(Debug, Clone, Copy)]
pub struct QuadNode {
    pub com: NVec2, // centre of mass
    pub mass: f64, // aggregate mass
    pub center: NVec2, // geometric centre
    pub size: f64, // geometric side length
    pub children: [i32; 4], // sw, nw, se, ne slots
    pub total: u32, // bodies in this subtree
    pub kind: NodeKind,
    pub body: u32, // stable body index, valid for leaves
    pub leaf_count: u32, // bucket length, valid for the bucket head
    pub next_in_leaf: i32, // next body in the same bucket
}

impl QuadNode {
    pub fn empty() -> Self {
        Self {
            com: NVec2::zeros(),
            mass: 0.0,
            center: NVec2::zeros(),
            size: 0.0,
            children: [NIL; 4],
            total: 0,
            kind: NodeKind::Empty,
            body: 0,
            leaf_count: 0,
            next_in_leaf: NIL,
        }
    }
}

/// Contiguous pool of quad nodes, logically split into equal chunks.
///
/// The arena is owned by the iteration: it is re-zeroed before every build so
/// that the builders find only `Empty` slots and `-1` links in their chunks.
pub struct QuadArena {
    pub nodes: Vec<QuadNode>,
    pub chunk_len: usize, // per-sector capacity P
}

impl QuadArena {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            chunk_len: 0,
        }
    }

    /// Resize to `chunks` chunks of `chunk_len` slots and re-zero every slot.
    pub fn reset(&mut self, chunk_len: usize, chunks: usize) {
        self.chunk_len = chunk_len;
        self.nodes.clear();
        self.nodes.resize(chunk_len * chunks, QuadNode::empty());
    }
}

impl Default for QuadArena {
    fn default() -> Self {
        Self::new()
    }
}

/// Returned when a sector needs more slots than its chunk holds.
#[derive(Debug)]
pub struct ChunkFull;

/// Build one sector's quadtree into `chunk`, whose first slot carries the
/// global arena index `base`.
///
/// The root covers the sector square (`center`, `side`) and is allocated even
/// for an empty sector. `members` lists the sector's bodies in insertion
/// order; child links written into the chunk are global indices, so the
/// finished tree can be traversed through the whole arena.
///
/// For each body a leaf slot is bump-allocated and the pair
/// `(root, leaf)` is pushed on the work stack. Draining the stack dispatches
/// each pair into the parent's quadrant slot:
///
/// - an empty slot takes the leaf as a bucket of one;
/// - a bucket with room takes the leaf at its head, so the last body
///   inserted is always the head (observable and deliberate);
/// - a full bucket is replaced by a quarter-offset internal node of half the
///   parent's size, and its bodies plus the newcomer are re-pushed against
///   that node with their chain state cleared;
/// - an internal slot forwards the pair one level down.
///
/// After every dispatch the parent's mass, centre of mass, and body total
/// are folded forward, so each body contributes once to every node on its
/// path and the aggregates need no second pass.
///
/// Returns the number of slots used, or [`ChunkFull`] if the chunk capacity
/// is insufficient. A work stack deeper than [`STACK_LIMIT`] is fatal.
pub fn build_sector(
    chunk: &mut [QuadNode],
    base: i32,
    center: NVec2,
    side: f64,
    bodies: &[Body],
    members: &[u32],
    leaf_size: u32,
) -> Result<usize, ChunkFull> {
    let mut root = QuadNode::empty();
    root.kind = NodeKind::Internal;
    root.center = center;
    root.size = side;
    chunk[0] = root;
    let mut next: usize = 1;

    let mut stack: Vec<(i32, i32)> = Vec::with_capacity(STACK_LIMIT);

    for &bi in members {
        let b = &bodies[bi as usize];
        if next >= chunk.len() {
            return Err(ChunkFull);
        }
        let mut leaf = QuadNode::empty();
        leaf.kind = NodeKind::Leaf;
        leaf.com = b.x;
        leaf.mass = b.m;
        leaf.total = 1;
        leaf.body = b.index;
        chunk[next] = leaf;
        let leaf_ix = base + next as i32;
        next += 1;

        stack.push((base, leaf_ix));
        while let Some((parent, child)) = stack.pop() {
            let pi = (parent - base) as usize;
            let ci = (child - base) as usize;
            let (child_mass, child_com) = (chunk[ci].mass, chunk[ci].com);

            let q = quadrant(chunk[pi].center, child_com);
            let slot = chunk[pi].children[q];
            if slot < 0 {
                chunk[ci].leaf_count = 1;
                chunk[pi].children[q] = child;
            } else {
                let si = (slot - base) as usize;
                match chunk[si].kind {
                    NodeKind::Leaf => {
                        let occupants = chunk[si].leaf_count;
                        if occupants < leaf_size {
                            // Prepend to the bucket.
                            chunk[ci].leaf_count = occupants + 1;
                            chunk[ci].next_in_leaf = slot;
                            chunk[pi].children[q] = child;
                        } else {
                            // Full bucket: split the slot into a half-size
                            // internal node and re-insert every occupant
                            // plus the newcomer beneath it.
                            if next >= chunk.len() {
                                return Err(ChunkFull);
                            }
                            let mut inner = QuadNode::empty();
                            inner.kind = NodeKind::Internal;
                            inner.size = chunk[pi].size / 2.0;
                            inner.center =
                                chunk[pi].center + quadrant_offset(q) * (chunk[pi].size / 4.0);
                            chunk[next] = inner;
                            let inner_ix = base + next as i32;
                            next += 1;
                            chunk[pi].children[q] = inner_ix;

                            let mut cur = slot;
                            while cur >= 0 {
                                let cu = (cur - base) as usize;
                                let after = chunk[cu].next_in_leaf;
                                chunk[cu].next_in_leaf = NIL;
                                chunk[cu].leaf_count = 0;
                                assert!(
                                    stack.len() < STACK_LIMIT,
                                    "quadtree build work stack overflow"
                                );
                                stack.push((inner_ix, cur));
                                cur = after;
                            }
                            assert!(
                                stack.len() < STACK_LIMIT,
                                "quadtree build work stack overflow"
                            );
                            stack.push((inner_ix, child));
                        }
                    }
                    NodeKind::Internal => {
                        assert!(
                            stack.len() < STACK_LIMIT,
                            "quadtree build work stack overflow"
                        );
                        stack.push((slot, child));
                    }
                    NodeKind::Empty => unreachable!("child link into an unallocated slot"),
                }
            }

            // Fold the body into the node the pair was addressed to. The
            // division is safe: child_mass is a body mass, so mass > 0.
            let p = &mut chunk[pi];
            let mass = p.mass + child_mass;
            p.com = (p.com * p.mass + child_com * child_mass) / mass;
            p.mass = mass;
            p.total += 1;
        }
    }

    Ok(next)
}

/// Upper bound on preflight scratch growth; reaching it means bodies are
/// stacked so densely that no bucket ever stops splitting.
const PREFLIGHT_CAP: usize = 1 << 26;

/// Count the slots one sector build will allocate by running the real
/// builder into a growable scratch arena.
pub fn preflight_count(
    center: NVec2,
    side: f64,
    bodies: &[Body],
    members: &[u32],
    leaf_size: u32,
) -> usize {
    let mut cap = (members.len() + 2).next_power_of_two().max(64);
    loop {
        let mut scratch = vec![QuadNode::empty(); cap];
        match build_sector(&mut scratch, 0, center, side, bodies, members, leaf_size) {
            Ok(used) => return used,
            Err(ChunkFull) => {
                cap *= 2;
                assert!(cap <= PREFLIGHT_CAP, "sector sizing diverged: pathological body distribution");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(index: u32, x: f64, y: f64, m: f64) -> Body {
        Body::new(index, NVec2::new(x, y), NVec2::zeros(), m, 0)
    }

    fn build(
        bodies: &[Body],
        center: NVec2,
        side: f64,
        leaf_size: u32,
    ) -> (Vec<QuadNode>, usize) {
        let members: Vec<u32> = (0..bodies.len() as u32).collect();
        let mut chunk = vec![QuadNode::empty(); 256];
        let used = build_sector(&mut chunk, 0, center, side, bodies, &members, leaf_size)
            .expect("chunk large enough");
        (chunk, used)
    }

    #[test]
    fn empty_sector_keeps_bare_root() {
        let (chunk, used) = build(&[], NVec2::new(0.5, 0.5), 1.0, 8);
        assert_eq!(used, 1);
        assert_eq!(chunk[0].kind, NodeKind::Internal);
        assert_eq!(chunk[0].total, 0);
        assert_eq!(chunk[0].children, [NIL; 4]);
    }

    #[test]
    fn bucket_prepends_newest_body() {
        // Three bodies in the same quadrant with room in the bucket.
        let bodies = [
            body(0, 0.1, 0.1, 1.0),
            body(1, 0.2, 0.2, 1.0),
            body(2, 0.15, 0.05, 1.0),
        ];
        let (chunk, used) = build(&bodies, NVec2::new(0.5, 0.5), 1.0, 8);
        assert_eq!(used, 4);

        let head = chunk[0].children[SW];
        assert!(head >= 0);
        let mut order = Vec::new();
        let mut cur = head;
        while cur >= 0 {
            let n = &chunk[cur as usize];
            assert_eq!(n.kind, NodeKind::Leaf);
            order.push(n.body);
            cur = n.next_in_leaf;
        }
        assert_eq!(order, vec![2, 1, 0], "last inserted body must head the bucket");
        assert_eq!(chunk[head as usize].leaf_count, 3);
    }

    #[test]
    fn full_bucket_splits_into_half_size_node() {
        // Two bodies fill the sw bucket at leaf_size 2; the third forces a
        // split into an internal node at a quarter offset from the root.
        let bodies = [
            body(0, 0.1, 0.1, 1.0),
            body(1, 0.4, 0.4, 1.0),
            body(2, 0.1, 0.4, 1.0),
        ];
        let (chunk, _) = build(&bodies, NVec2::new(0.5, 0.5), 1.0, 2);

        let inner_ix = chunk[0].children[SW];
        assert!(inner_ix >= 0);
        let inner = &chunk[inner_ix as usize];
        assert_eq!(inner.kind, NodeKind::Internal);
        assert_eq!(inner.size, 0.5);
        assert_eq!(inner.center, NVec2::new(0.25, 0.25));
        assert_eq!(inner.total, 3);

        // The occupants spread into the sub-quadrants with chain state cleared.
        let sw = inner.children[SW];
        let ne = inner.children[NE];
        let nw = inner.children[NW];
        assert!(sw >= 0 && ne >= 0 && nw >= 0);
        assert_eq!(chunk[sw as usize].body, 0);
        assert_eq!(chunk[ne as usize].body, 1);
        assert_eq!(chunk[nw as usize].body, 2);
        for ix in [sw, ne, nw] {
            assert_eq!(chunk[ix as usize].next_in_leaf, NIL);
            assert_eq!(chunk[ix as usize].leaf_count, 1);
        }
    }

    #[test]
    fn running_aggregates_track_every_body() {
        let bodies = [
            body(0, 0.25, 0.25, 2.0),
            body(1, 0.75, 0.25, 1.0),
            body(2, 0.75, 0.75, 1.0),
        ];
        let (chunk, _) = build(&bodies, NVec2::new(0.5, 0.5), 1.0, 4);
        let root = &chunk[0];
        assert_eq!(root.total, 3);
        assert!((root.mass - 4.0).abs() < 1e-12);
        let com_x = (2.0 * 0.25 + 0.75 + 0.75) / 4.0;
        let com_y = (2.0 * 0.25 + 0.25 + 0.75) / 4.0;
        assert!((root.com.x - com_x).abs() < 1e-12);
        assert!((root.com.y - com_y).abs() < 1e-12);
    }

    #[test]
    fn undersized_chunk_is_reported() {
        let bodies = [body(0, 0.1, 0.1, 1.0), body(1, 0.9, 0.9, 1.0)];
        let members: Vec<u32> = vec![0, 1];
        let mut chunk = vec![QuadNode::empty(); 2];
        assert!(build_sector(
            &mut chunk,
            0,
            NVec2::new(0.5, 0.5),
            1.0,
            &bodies,
            &members,
            8
        )
        .is_err());
    }

    #[test]
    fn preflight_matches_real_build() {
        let bodies: Vec<Body> = (0..40)
            .map(|i| body(i, (i as f64 * 0.37).sin().abs(), (i as f64 * 0.13).cos().abs(), 1.0))
            .collect();
        let (_, used) = build(&bodies, NVec2::new(0.5, 0.5), 1.0, 4);
        let members: Vec<u32> = (0..40).collect();
        let counted =
            preflight_count(NVec2::new(0.5, 0.5), 1.0, &bodies, &members, 4);
        assert_eq!(counted, used);
    }
}
