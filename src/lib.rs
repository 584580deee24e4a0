pub mod configuration;
pub mod simulation;
pub mod visualization;

pub use simulation::states::{Body, Boundary, NVec2, System};
pub use simulation::params::Parameters;
pub use simulation::engine::Simulation;
pub use simulation::scenario::two_galaxies;
pub use simulation::quadtree::{quadrant, NodeKind, QuadArena, QuadNode, NE, NIL, NW, SE, SW};
pub use simulation::forces::{direct_forces, kinetic_energy, potential_energy, total_energy, tree_force};
pub use simulation::sectors::{assign_sectors, reduce_boundary};

pub use configuration::config::Args;

pub use visualization::svg::FrameWriter;
