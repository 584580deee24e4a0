//! SVG frame output
//!
//! Renders one still per iteration into the output directory. The viewport
//! is fixed at 850 x 850 with a 25-unit margin; the simulation square is
//! scaled to the inner 800 units, so frames stay centred as the boundary
//! grows.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::simulation::states::{Body, Boundary};

pub struct FrameWriter {
    dir: PathBuf,
}

impl FrameWriter {
    /// Create the output directory (and parents) up front so per-frame
    /// failures are limited to the writes themselves.
    pub fn create(dir: PathBuf) -> io::Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Write the frame for one iteration.
    pub fn write(&self, iteration: usize, bodies: &[Body], boundary: &Boundary) -> io::Result<()> {
        let path = self.dir.join(format!("frame_{iteration:04}.svg"));
        fs::write(path, render(bodies, boundary))
    }
}

/// One SVG document with a circle per body, coloured by its tag.
pub fn render(bodies: &[Body], boundary: &Boundary) -> String {
    let scale = 800.0 / boundary.side();
    let mut svg = String::with_capacity(128 + bodies.len() * 64);
    svg.push_str("<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 850 850\">\n");
    for b in bodies {
        let cx = (b.x.x - boundary.min.x) * scale + 25.0;
        let cy = (b.x.y - boundary.min.y) * scale + 25.0;
        let fill = match b.color {
            1 => "blue",
            2 => "orange",
            _ => "black",
        };
        let _ = writeln!(svg, "<circle cx=\"{cx}\" cy=\"{cy}\" r=\"10\" fill=\"{fill}\"/>");
    }
    svg.push_str("</svg>\n");
    svg
}
