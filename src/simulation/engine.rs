//! Simulation orchestrator
//!
//! `Simulation` owns the configuration, the bodies, the reusable boundary
//! record, and the quad arena, and sequences the per-iteration pipeline:
//!
//! 1. zero force accumulators
//! 2. boundary reduction over all bodies
//! 3. sector assignment and the per-sector partition
//! 4. arena sizing and re-zeroing
//! 5. parallel per-sector tree builds into disjoint arena chunks
//! 6. sequential merge into the global root
//! 7. parallel force accumulation and integration per body
//!
//! Every phase completes globally before the next begins. The parallel
//! phases write disjoint data by construction (body ranges, arena chunks),
//! so the hot path takes no locks.

use std::time::Instant;

use log::{debug, log_enabled, warn, Level};
use rayon::prelude::*;

use super::forces::{total_energy, tree_force};
use super::integrator::advance_body;
use super::merge::merge_sectors;
use super::params::Parameters;
use super::quadtree::{build_sector, preflight_count, QuadArena, NIL};
use super::sectors::{assign_sectors, partition_sectors, reduce_boundary};
use super::states::{Body, Boundary, NVec2, System};
use crate::visualization::svg::FrameWriter;

pub struct Simulation {
    pub params: Parameters,
    pub system: System,
    pub boundary: Boundary,
    pub arena: QuadArena,
    pub root: i32, // global root of the last built tree
    sectors: Vec<Vec<u32>>, // per-sector body indices, reused across iterations
}

impl Simulation {
    pub fn new(params: Parameters, bodies: Vec<Body>) -> Self {
        assert!(!bodies.is_empty(), "simulation needs at least one body");
        let boundary = Boundary::around(bodies[0].x);
        Self {
            params,
            system: System { bodies, t: 0.0 },
            boundary,
            arena: QuadArena::new(),
            root: NIL,
            sectors: Vec::new(),
        }
    }

    /// Phases 2-6: recompute the boundary, partition the bodies, rebuild the
    /// sector trees in parallel, and merge them. Returns the global root.
    pub fn build_tree(&mut self) -> i32 {
        let s = self.params.sector_count();
        let sq = s * s;

        self.boundary = reduce_boundary(&self.system.bodies);
        assign_sectors(&mut self.system.bodies, &self.boundary, self.params.sector_exp);
        partition_sectors(&self.system.bodies, &mut self.sectors, sq);

        let chunk = match self.params.arena_chunk {
            Some(p) => p,
            None => self.computed_chunk(),
        };
        self.arena.reset(chunk, sq + 1);

        let side = self.boundary.side();
        let cell = side / s as f64;
        let min = self.boundary.min;
        let leaf_size = self.params.leaf_size;
        {
            let bodies = &self.system.bodies;
            let sectors = &self.sectors;
            let (sector_nodes, _merge_nodes) = self.arena.nodes.split_at_mut(sq * chunk);
            sector_nodes
                .par_chunks_mut(chunk)
                .enumerate()
                .zip(sectors.par_iter())
                .for_each(|((sector, slots), members)| {
                    let sx = sector % s;
                    let sy = sector / s;
                    let center = NVec2::new(
                        min.x + (sx as f64 + 0.5) * cell,
                        min.y + (sy as f64 + 0.5) * cell,
                    );
                    let base = (sector * chunk) as i32;
                    if build_sector(slots, base, center, cell, bodies, members, leaf_size)
                        .is_err()
                    {
                        panic!("sector {sector}: quad arena chunk overflow (capacity {chunk})");
                    }
                });
        }

        self.root = merge_sectors(&mut self.arena, &self.boundary, self.params.sector_exp);
        self.root
    }

    /// Phase 7: Barnes-Hut forces plus integration, folded per body. Each
    /// task reads the whole arena and writes only its own body.
    pub fn apply_forces(&mut self, root: i32) {
        let arena = &self.arena;
        let params = self.params;
        self.system.bodies.par_iter_mut().for_each(|b| {
            tree_force(root, arena, b, &params);
            advance_body(b, params.dt);
        });
        self.system.t += self.params.dt;
    }

    /// One full iteration.
    pub fn step(&mut self) {
        let start = Instant::now();
        self.system
            .bodies
            .par_iter_mut()
            .for_each(|b| b.f = NVec2::zeros());
        let root = self.build_tree();
        let tree_time = start.elapsed();
        self.apply_forces(root);
        debug!(
            "t = {:.2}: tree {:.3?}, forces {:.3?}",
            self.system.t,
            tree_time,
            start.elapsed() - tree_time
        );
    }

    /// Run `iterations` steps, writing one frame per iteration when a writer
    /// is given. A failed frame write is logged and skipped.
    pub fn run(&mut self, iterations: usize, frames: Option<&FrameWriter>) {
        if log_enabled!(Level::Debug) {
            debug!(
                "initial energy {:.6e}",
                total_energy(&self.system.bodies, &self.params)
            );
        }
        for iteration in 0..iterations {
            self.step();
            if let Some(writer) = frames {
                if let Err(e) = writer.write(iteration, &self.system.bodies, &self.boundary) {
                    warn!("iteration {iteration}: frame write failed: {e}");
                }
            }
            if log_enabled!(Level::Debug) {
                debug!(
                    "iteration {iteration}: energy {:.6e}",
                    total_energy(&self.system.bodies, &self.params)
                );
            }
        }
    }

    /// Per-sector arena capacity for the computed sizing mode: the analytic
    /// full-quadtree bound, raised to whatever the preflight says the
    /// densest sector actually needs.
    fn computed_chunk(&self) -> usize {
        let analytic: usize = (0..=self.params.sector_exp).map(|k| 4usize.pow(k)).sum();

        let s = self.params.sector_count();
        let cell = self.boundary.side() / s as f64;
        let min = self.boundary.min;
        let bodies = &self.system.bodies;
        let leaf_size = self.params.leaf_size;
        let preflight = self
            .sectors
            .par_iter()
            .enumerate()
            .map(|(sector, members)| {
                let sx = sector % s;
                let sy = sector / s;
                let center = NVec2::new(
                    min.x + (sx as f64 + 0.5) * cell,
                    min.y + (sy as f64 + 0.5) * cell,
                );
                preflight_count(center, cell, bodies, members, leaf_size)
            })
            .max()
            .unwrap_or(1);

        analytic.max(preflight)
    }
}
