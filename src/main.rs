//! terrain-fluid CLI - headless host loop for the erosion engine.
//!
//! Builds a terrain, steps the simulation at a fixed time step and reports
//! throughput and field statistics.

use clap::{Parser, Subcommand, ValueEnum};
use glam::IVec2;
use std::time::Instant;

use terrain_fluid::erosion::{ErosionConfig, FluidSimulation};
use terrain_fluid::parallel::{Executor, Serial, Threaded};
use terrain_fluid::terrain::{FieldStats, SimulationState};

/// Hydraulic erosion and shallow water simulation over a heightfield.
#[derive(Parser)]
#[command(name = "terrain-fluid")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation for a number of ticks.
    Run {
        /// Grid size in cells (square).
        #[arg(short, long, default_value = "300")]
        dim: usize,

        /// Number of ticks to simulate.
        #[arg(short, long, default_value = "600")]
        ticks: u64,

        /// Time step per tick (the default constants assume 1000/60).
        #[arg(long, default_value = "16.666666")]
        dt: f32,

        /// Seed for terrain noise and rain positions.
        #[arg(short, long)]
        seed: Option<u64>,

        /// Initial terrain.
        #[arg(long, default_value = "procedural")]
        terrain: TerrainKind,

        /// Scatter raindrops every tick.
        #[arg(long)]
        rain: bool,

        /// Pour water at the flood centre every tick.
        #[arg(long)]
        flood: bool,

        /// Flood centre column (defaults to the grid centre).
        #[arg(long)]
        flood_x: Option<i32>,

        /// Flood centre row (defaults to the grid centre).
        #[arg(long)]
        flood_y: Option<i32>,

        /// Run every pass on the calling thread instead of the rayon pool.
        #[arg(long)]
        serial: bool,

        /// Log throughput every N ticks (0 disables).
        #[arg(long, default_value = "100")]
        report_every: u64,
    },

    /// Display information about a grid configuration.
    Info {
        /// Grid size in cells (square).
        #[arg(short, long, default_value = "300")]
        dim: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TerrainKind {
    /// Octave gradient noise hills.
    Procedural,
    /// Pyramid with straight 0.2 slopes.
    Steep,
    /// Flat ground at height 0.
    Flat,
}

struct RunOptions {
    ticks: u64,
    dt: f32,
    rain: bool,
    flood: bool,
    report_every: u64,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            dim,
            ticks,
            dt,
            seed,
            terrain,
            rain,
            flood,
            flood_x,
            flood_y,
            serial,
            report_every,
        } => {
            if !(3..=8192).contains(&dim) {
                eprintln!("Error: Grid size must be between 3 and 8192");
                std::process::exit(1);
            }
            if !dt.is_finite() || dt < 0.0 {
                eprintln!("Error: dt must be a finite, non-negative number");
                std::process::exit(1);
            }

            let seed = seed.unwrap_or_else(|| {
                use std::time::{SystemTime, UNIX_EPOCH};
                SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_nanos() as u64)
                    .unwrap_or(0)
            });

            println!("terrain-fluid - Hydraulic Erosion Simulation");
            println!("============================================");
            println!("Grid: {}x{}", dim, dim);
            println!("Seed: {}", seed);

            let mut state = SimulationState::new(dim, dim);
            match terrain {
                TerrainKind::Procedural => state.create_procedural_terrain(seed as i32),
                TerrainKind::Steep => state.create_steep_terrain(),
                TerrainKind::Flat => {}
            }

            let config = ErosionConfig {
                rain_seed: seed,
                ..Default::default()
            };
            let options = RunOptions {
                ticks,
                dt,
                rain,
                flood,
                report_every,
            };
            let center = IVec2::new(
                flood_x.unwrap_or((dim / 2) as i32),
                flood_y.unwrap_or((dim / 2) as i32),
            );

            let result = if serial {
                FluidSimulation::with_executor(state, config, Serial)
                    .map(|sim| run_simulation(sim, center, &options))
            } else {
                FluidSimulation::with_executor(state, config, Threaded)
                    .map(|sim| run_simulation(sim, center, &options))
            };

            if let Err(e) = result {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Info { dim } => run_info(dim),
    }
}

fn run_simulation<E: Executor>(mut sim: FluidSimulation<E>, flood_center: IVec2, options: &RunOptions) {
    sim.set_flood_center(flood_center);

    print_stats("Initial", &sim.state().stats());
    println!(
        "\nSimulating {} ticks (dt = {}, rain: {}, flood: {} at {:?})...",
        options.ticks, options.dt, options.rain, options.flood, flood_center
    );

    let start = Instant::now();
    let mut window = Instant::now();
    for tick in 1..=options.ticks {
        sim.tick(options.dt, options.rain, options.flood);

        if options.report_every > 0 && tick % options.report_every == 0 {
            let secs = window.elapsed().as_secs_f64();
            if secs > 0.0 {
                log::info!(
                    "tick {}: {:.1} ticks/s, water {:.3}",
                    tick,
                    options.report_every as f64 / secs,
                    sim.water().sum()
                );
            }
            window = Instant::now();
        }
    }

    let elapsed = start.elapsed();
    println!("Done in {:.2}s", elapsed.as_secs_f64());
    if options.ticks > 0 {
        println!(
            "Mean tick: {:.3} ms",
            elapsed.as_secs_f64() * 1000.0 / options.ticks as f64
        );
    }
    print_stats("\nFinal", &sim.state().stats());
}

fn print_stats(label: &str, stats: &FieldStats) {
    println!("{} fields:", label);
    println!("  Terrain range: [{:.3}, {:.3}]", stats.terrain_min, stats.terrain_max);
    println!("  Total water: {:.3}", stats.total_water);
    println!("  Total sediment: {:.5}", stats.total_sediment);
    println!("  Wet cells: {}", stats.wet_cells);
}

fn run_info(dim: usize) {
    let cells = dim * dim;
    // terrain, water, sediment, scratch, velocity (2), outflow (4), normals (3)
    let floats_per_cell = 4 + 2 + 4 + 3;
    let bytes = cells * floats_per_cell * std::mem::size_of::<f32>();
    let config = ErosionConfig::default();

    println!("terrain-fluid Configuration");
    println!("===========================");
    println!("Grid: {}x{} ({} cells)", dim, dim, cells);
    println!("Memory: {:.2} MB", bytes as f64 / (1024.0 * 1024.0));
    println!();
    println!("Default constants:");
    println!("  Cell size: {} x {}", config.cell_size_x, config.cell_size_y);
    println!("  Gravity: {}", config.gravity);
    println!("  Pipe area / length: {} / {}", config.pipe_area, config.pipe_length);
    println!("  Sediment capacity (Kc): {}", config.sediment_capacity);
    println!("  Dissolving rate (Ks): {}", config.dissolving_rate);
    println!("  Deposition rate (Kd): {}", config.deposition_rate);
    println!("  Evaporation rate (Ke): {}", config.evaporation_rate);
    println!("  Raindrops per tick: {}", config.raindrops_per_tick);
    println!("  Flood radius: {}", config.flood_radius);
}
