//! Initial conditions: a pair of galaxies on a collision course
//!
//! Builds the runtime body set consumed by [`crate::Simulation`]. Every body
//! gets a contiguous stable index; satellites are tagged with their galaxy's
//! colour for the frame output.

use std::f64::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;

use super::states::{Body, NVec2};

const GALAXY_1_CENTER: (f64, f64) = (0.0, 0.0);
const GALAXY_2_CENTER: (f64, f64) = (-1800.0, -1200.0);
const GALAXY_1_RADIUS: f64 = 300.0;
const GALAXY_2_RADIUS: f64 = 350.0;

/// Generate `num` bodies: an eighth in the first galaxy, the rest in the
/// second. Deterministic for a given seed.
#[allow(non_snake_case)]
pub fn two_galaxies(num: usize, seed: u64, G: f64) -> Vec<Body> {
    let mut rng = ChaChaRng::seed_from_u64(seed);
    let num1 = num / 8;
    let num2 = num - num1;

    let mut bodies = Vec::with_capacity(num);
    spawn_galaxy(
        &mut bodies,
        &mut rng,
        NVec2::new(GALAXY_1_CENTER.0, GALAXY_1_CENTER.1),
        num1,
        GALAXY_1_RADIUS,
        1,
        G,
    );
    spawn_galaxy(
        &mut bodies,
        &mut rng,
        NVec2::new(GALAXY_2_CENTER.0, GALAXY_2_CENTER.1),
        num2,
        GALAXY_2_RADIUS,
        2,
        G,
    );
    bodies
}

/// One galaxy: a central body whose mass equals the population, plus
/// satellites on randomized orbits in a disc of radius `disc_radius`.
///
/// A satellite at radius r gets the tangential speed
/// sqrt(G n / r + 1.5 G n r^2 / R^3), balancing the central pull plus the
/// disc's own mass interior to the orbit.
#[allow(non_snake_case)]
fn spawn_galaxy(
    bodies: &mut Vec<Body>,
    rng: &mut ChaChaRng,
    center: NVec2,
    population: usize,
    disc_radius: f64,
    color: u8,
    G: f64,
) {
    if population == 0 {
        return;
    }
    let n = population as f64;

    bodies.push(Body::new(
        bodies.len() as u32,
        center,
        NVec2::zeros(),
        n,
        0,
    ));

    for _ in 1..population {
        let angle = rng.gen_range(0.0..TAU);
        let u: f64 = rng.gen();
        let radius = 25.0 + disc_radius * u;
        let speed =
            (G * n / radius + G * 1.5 * n * radius * radius / disc_radius.powi(3)).sqrt();
        let radial = NVec2::new(angle.cos(), angle.sin());
        let tangent = NVec2::new(-angle.sin(), angle.cos());
        bodies.push(Body::new(
            bodies.len() as u32,
            center + radial * radius,
            tangent * speed,
            1.0 + u,
            color,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_split_and_indices() {
        let bodies = two_galaxies(1000, 7, 100.0);
        assert_eq!(bodies.len(), 1000);
        for (i, b) in bodies.iter().enumerate() {
            assert_eq!(b.index, i as u32);
        }
        // Central bodies carry their galaxy's population as mass.
        assert_eq!(bodies[0].m, 125.0);
        assert_eq!(bodies[125].m, 875.0);
        assert_eq!(bodies[0].color, 0);
        assert_eq!(bodies[125].color, 0);
        assert_eq!(bodies.iter().filter(|b| b.color == 1).count(), 124);
        assert_eq!(bodies.iter().filter(|b| b.color == 2).count(), 874);
    }

    #[test]
    fn same_seed_same_bodies() {
        let a = two_galaxies(64, 213, 100.0);
        let b = two_galaxies(64, 213, 100.0);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.x, y.x);
            assert_eq!(x.v, y.v);
            assert_eq!(x.m, y.m);
        }
    }

    #[test]
    fn satellites_stay_inside_their_disc() {
        let bodies = two_galaxies(256, 3, 100.0);
        for b in bodies.iter().filter(|b| b.color == 1) {
            let r = (b.x - NVec2::new(GALAXY_1_CENTER.0, GALAXY_1_CENTER.1)).norm();
            assert!(r >= 25.0 - 1e-9 && r <= 25.0 + GALAXY_1_RADIUS + 1e-9);
        }
    }
}
