use anyhow::{Context, Result};
use log::info;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use snake_lattice_core::{
    build_simulation, run_replicates, Arena, BoundaryPolicy, Cell, Direction, SimConfig, SnakeSpec,
};
use std::time::Instant;

const EXTENT: usize = 400;
const SNAKE_LENGTH: usize = 8;
const STEPS: usize = 500;
const REPLICATES: u64 = 8;

/// Scatter snakes on a coarse grid so no two initial bodies overlap.
fn create_snakes(rng: &mut ChaCha12Rng) -> Vec<SnakeSpec> {
    let spacing = SNAKE_LENGTH * 2;
    let mut snakes = Vec::new();
    let mut y = SNAKE_LENGTH;
    while y + SNAKE_LENGTH <= EXTENT {
        let mut x = SNAKE_LENGTH;
        while x + SNAKE_LENGTH <= EXTENT {
            snakes.push(SnakeSpec {
                position: Cell::new(x, y),
                orientation: Direction::ALL[rng.random_range(0..Direction::ALL.len())],
                length: SNAKE_LENGTH,
                ..SnakeSpec::default()
            });
            x += spacing;
        }
        y += spacing;
    }
    snakes
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = ChaCha12Rng::seed_from_u64(42);
    let snakes = create_snakes(&mut rng);
    println!(
        "Benchmarking {} snakes of length {} on a {}x{} lattice",
        snakes.len(),
        SNAKE_LENGTH,
        EXTENT + 1,
        EXTENT + 1
    );

    for boundary in [BoundaryPolicy::Wall, BoundaryPolicy::Periodic] {
        let config = SimConfig {
            xmax: EXTENT,
            ymax: EXTENT,
            boundary,
            step_budget: STEPS,
            sample_every: 50,
            snakes: snakes.clone(),
            ..SimConfig::default()
        };

        // The grid layout always fits, so an invalid config is a bug here.
        let mut arena = Arena::new(config.clone());
        let start = Instant::now();
        let summary = arena.run();
        let elapsed = start.elapsed();
        println!(
            "[{boundary}] {} ticks in {:?} ({:?}/tick), {} trapped, stop: {:?}",
            summary.ticks_run,
            elapsed,
            elapsed / summary.ticks_run.max(1) as u32,
            arena.trapped_count(),
            summary.stop_reason
        );

        let seeds: Vec<u64> = (0..REPLICATES).collect();
        let start = Instant::now();
        let summaries = run_replicates(&config, &seeds).context("running replicates")?;
        info!("replicate summaries: {}", summaries.len());
        println!(
            "[{boundary}] {} replicates in {:?}",
            summaries.len(),
            start.elapsed()
        );
    }

    let last = build_simulation(SimConfig::default())
        .context("building default arena")?
        .run();
    println!(
        "default scenario: {}",
        serde_json::to_string(&last.samples.last()).context("serializing sample")?
    );
    Ok(())
}
