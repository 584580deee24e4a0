use anyhow::Result;
use clap::Parser;
use log::info;

use galsim::{two_galaxies, Args, FrameWriter, Simulation};

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();
    args.validate()?;

    rayon::ThreadPoolBuilder::new()
        .num_threads(args.parallelism)
        .build_global()?;

    let params = args.parameters();
    let bodies = two_galaxies(args.bodies, args.seed, params.G);
    info!(
        "{} bodies, {} sectors per axis, leaf bucket {}, {} workers",
        bodies.len(),
        params.sector_count(),
        params.leaf_size,
        args.parallelism
    );

    let frames = match &args.output {
        Some(dir) => Some(FrameWriter::create(dir.clone())?),
        None => None,
    };

    let mut sim = Simulation::new(params, bodies);
    sim.run(args.iterations, frames.as_ref());
    info!("finished {} iterations at t = {:.2}", args.iterations, sim.system.t);
    Ok(())
}
