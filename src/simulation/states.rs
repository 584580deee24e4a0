//! Core state types for the galaxy simulation.
//!
//! Defines the flat body store and the rectangular boundary record:
//! - `Body` / `System` using `NVec2`
//! - `Boundary`, the min/max corners recomputed every iteration
//!
//! The system holds the list of bodies and the current simulation time `t`.

use nalgebra::Vector2;
pub type NVec2 = Vector2<f64>;

#[derive(Debug, Clone)]
pub struct Body {
    pub x: NVec2, // position
    pub v: NVec2, // velocity
    pub f: NVec2, // force accumulated this iteration
    pub m: f64, // mass
    pub sector: u32, // grid cell, rewritten each iteration
    pub color: u8, // colour tag for frame output
    pub index: u32, // stable identity, assigned at init
}

impl Body {
    pub fn new(index: u32, x: NVec2, v: NVec2, m: f64, color: u8) -> Self {
        Self {
            x,
            v,
            f: NVec2::zeros(),
            m,
            sector: 0,
            color,
            index,
        }
    }
}

#[derive(Debug, Clone)]
pub struct System {
    pub bodies: Vec<Body>, // collection of bodies
    pub t: f64, // time
}

/// Axis-aligned bounds of the body set. The simulation domain is the square
/// of side [`Boundary::side`] anchored at `min`.
#[derive(Debug, Clone, Copy)]
pub struct Boundary {
    pub min: NVec2, // bottom-left corner
    pub max: NVec2, // top-right corner
}

impl Boundary {
    /// Degenerate boundary containing a single point.
    pub fn around(p: NVec2) -> Self {
        Self { min: p, max: p }
    }

    /// Grow to include one more point.
    pub fn include(self, p: NVec2) -> Self {
        Self {
            min: NVec2::new(self.min.x.min(p.x), self.min.y.min(p.y)),
            max: NVec2::new(self.max.x.max(p.x), self.max.y.max(p.y)),
        }
    }

    /// Union of two boundaries. Commutative, so partial results from
    /// different body ranges can be combined in any order.
    pub fn merge(self, other: Self) -> Self {
        Self {
            min: NVec2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: NVec2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Side of the square simulation domain: the larger of the two extents.
    pub fn side(&self) -> f64 {
        (self.max.x - self.min.x).max(self.max.y - self.min.y)
    }
}
