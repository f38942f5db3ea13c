use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use gravity_merge::{persistence, Bounds, Config, Result, Simulation};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Scenario {
    /// Static heavy core with satellites on circular orbits.
    Disk,
    /// Bodies scattered over a disc with random headings.
    Field,
}

/// Runs the gravity simulation headless and reports what happened.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Initial layout.
    #[arg(long, value_enum, default_value_t = Scenario::Disk)]
    scenario: Scenario,

    /// Number of bodies to generate (satellites for the disk).
    #[arg(short, long)]
    number: Option<usize>,

    /// Number of ticks to run.
    #[arg(short, long, default_value_t = 100)]
    steps: usize,

    /// Worker threads; overrides the config file.
    #[arg(short, long)]
    workers: Option<usize>,

    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Load bodies from a record file instead of generating a scenario.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Write the final bodies to a record file.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Seed for scenario generation.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Width and height of the region scenarios are laid out in.
    #[arg(long, num_args = 2, default_values_t = [1000.0, 720.0])]
    size: Vec<f64>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(args) {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(workers) = args.workers {
        config.workers = workers;
    }

    let mut sim = match &args.input {
        Some(path) => Simulation::with_bodies(persistence::load(File::open(path)?)?, config)?,
        None => {
            let mut sim = Simulation::new(config)?;
            let bounds = Bounds::from_size(args.size[0], args.size[1]);
            let mut rng = fastrand::Rng::with_seed(args.seed);
            match args.scenario {
                Scenario::Disk => sim.reset_accretion_disk(
                    args.number.unwrap_or(Simulation::DEFAULT_DISK_BODIES),
                    bounds.max.y - bounds.min.y,
                    Simulation::DEFAULT_CENTER_MASS,
                    bounds,
                    &mut rng,
                )?,
                Scenario::Field => sim.add_random_field(
                    args.number.unwrap_or(Simulation::DEFAULT_FIELD_BODIES),
                    Simulation::DEFAULT_FIELD_SPEED,
                    bounds.max.y - bounds.min.y,
                    bounds,
                    &mut rng,
                )?,
            }
            sim
        }
    };

    println!(
        "Running {} bodies for {} steps on {} worker(s)",
        sim.bodies().len(),
        args.steps,
        sim.backend().workers()
    );
    let mass = sim.total_mass();

    let start = Instant::now();
    let mut merges = 0;
    for step in 0..args.steps {
        merges += sim.step().merges;
        if (step + 1) % 100 == 0 {
            log::info!("step {}: {} bodies", step + 1, sim.bodies().len());
        }
    }
    let elapsed = start.elapsed();

    println!(
        "{} bodies remain after {} merges in {:.3}s (mass drift {:e})",
        sim.bodies().len(),
        merges,
        elapsed.as_secs_f64(),
        sim.total_mass() - mass
    );

    if let Some(path) = &args.output {
        persistence::save(File::create(path)?, sim.bodies())?;
        log::info!("wrote {} bodies to {}", sim.bodies().len(), path.display());
    }
    Ok(())
}
