//! Fixed-step time integration
//!
//! Semi-implicit Euler, applied per body once its force is known.

use super::states::Body;

/// Advance one body by a fixed step `dt`.
///
/// Drift: x_n+1 = x_n + dt * v_n, using the velocity from the start of the
/// step. Kick: v_n+1 = v_n + dt * f_n+1 / m, using the force accumulated
/// this iteration. The drift-before-kick ordering sets the long-run energy
/// behavior and must not be swapped.
pub fn advance_body(b: &mut Body, dt: f64) {
    b.x += b.v * dt;
    b.v += b.f * (dt / b.m);
}
