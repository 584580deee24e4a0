//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - gravitational constant and fixed step size (`G`, `dt`),
//! - opening angle and softening (`theta`, `eps`),
//! - sector grid exponent, leaf bucket size, and arena sizing mode

#[derive(Debug, Clone, Copy)]
#[allow(non_snake_case)]
pub struct Parameters {
    pub G: f64, // gravitational constant
    pub dt: f64, // step size
    pub theta: f64, // opening angle: nodes with size/d below it become point masses
    pub eps: f64, // softening: pairs closer than this are skipped
    pub sector_exp: u32, // the grid is 2^sector_exp sectors per axis
    pub leaf_size: u32, // bodies per leaf bucket before a split
    pub arena_chunk: Option<usize>, // fixed per-sector capacity; None computes a bound
}

impl Parameters {
    /// Sectors per axis.
    pub fn sector_count(&self) -> usize {
        1 << self.sector_exp
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            G: 100.0,
            dt: 0.1,
            theta: 0.5,
            eps: 1e-5,
            sector_exp: 4,
            leaf_size: 32,
            arena_chunk: None,
        }
    }
}
