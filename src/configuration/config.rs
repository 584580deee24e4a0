//! Command-line configuration
//!
//! Defines the flag surface of the simulator and the mapping into runtime
//! [`Parameters`]. Physical constants (G, step size, opening angle,
//! softening) are compiled in; the flags select problem size, precision,
//! parallelism, and output.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

use crate::simulation::params::Parameters;

#[derive(Parser, Debug)]
#[command(
    name = "galsim",
    about = "Sector-parallel Barnes-Hut simulation of a pair of colliding galaxies"
)]
pub struct Args {
    /// Number of bodies across both galaxies
    #[arg(short = 'b', default_value_t = 16384)]
    pub bodies: usize,

    /// Random seed for the galaxy generator
    #[arg(short = 's', default_value_t = 213)]
    pub seed: u64,

    /// Number of iterations to run
    #[arg(short = 'i', default_value_t = 10)]
    pub iterations: usize,

    /// Worker thread count
    #[arg(short = 'p', default_value_t = 8)]
    pub parallelism: usize,

    /// Sector precision: the grid is 2^N sectors per axis
    #[arg(short = 'N', default_value_t = 4)]
    pub sector_exp: u32,

    /// Leaf bucket size
    #[arg(short = 'l', default_value_t = 32)]
    pub leaf_size: u32,

    /// Fixed per-sector arena capacity; -1 computes a bound each iteration
    #[arg(short = 'x', default_value_t = -1, allow_hyphen_values = true)]
    pub arena_chunk: i64,

    /// Directory for SVG frames; no frames are written when unset
    #[arg(short = 'o')]
    pub output: Option<PathBuf>,

    /// Verbose logging: per-phase timings and per-iteration energy
    #[arg(short = 'v')]
    pub verbose: bool,
}

impl Args {
    /// Reject invalid values before any work is done.
    pub fn validate(&self) -> Result<()> {
        if self.bodies < 1 {
            bail!("-b: at least one body is required");
        }
        if self.parallelism < 1 {
            bail!("-p: at least one worker is required");
        }
        if self.leaf_size < 1 {
            bail!("-l: leaf buckets hold at least one body");
        }
        if self.arena_chunk == 0 || self.arena_chunk < -1 {
            bail!("-x: capacity must be positive, or -1 to compute it");
        }
        if self.sector_exp > 12 {
            bail!("-N: sector precision above 12 exhausts memory");
        }
        Ok(())
    }

    /// Runtime parameters: compiled-in constants plus the tree knobs.
    pub fn parameters(&self) -> Parameters {
        Parameters {
            sector_exp: self.sector_exp,
            leaf_size: self.leaf_size,
            arena_chunk: (self.arena_chunk > 0).then_some(self.arena_chunk as usize),
            ..Parameters::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse() {
        let args = Args::parse_from(["galsim"]);
        assert_eq!(args.bodies, 16384);
        assert_eq!(args.seed, 213);
        assert_eq!(args.iterations, 10);
        assert_eq!(args.parallelism, 8);
        assert_eq!(args.sector_exp, 4);
        assert_eq!(args.leaf_size, 32);
        assert_eq!(args.arena_chunk, -1);
        assert!(args.output.is_none());
        assert!(!args.verbose);
        assert!(args.validate().is_ok());
        assert!(args.parameters().arena_chunk.is_none());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let args = Args::parse_from(["galsim", "-l", "0"]);
        assert!(args.validate().is_err());
        let args = Args::parse_from(["galsim", "-x", "0"]);
        assert!(args.validate().is_err());
        let args = Args::parse_from(["galsim", "-p", "0"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn fixed_arena_capacity_is_forwarded() {
        let args = Args::parse_from(["galsim", "-x", "512"]);
        assert_eq!(args.parameters().arena_chunk, Some(512));
    }
}
