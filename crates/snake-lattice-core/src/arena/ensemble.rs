use super::{build_simulation, ArenaInitError, RunSummary};
use crate::config::SimConfig;
use rayon::prelude::*;

/// Run one independent arena per seed, in parallel across arenas.
///
/// Every arena is still stepped sequentially on a single thread; only whole
/// runs are distributed. Summaries come back in `seeds` order.
pub fn run_replicates(
    config: &SimConfig,
    seeds: &[u64],
) -> Result<Vec<RunSummary>, ArenaInitError> {
    config.validate()?;
    seeds
        .par_iter()
        .map(|&seed| {
            let mut arena = build_simulation(SimConfig {
                seed,
                ..config.clone()
            })?;
            Ok(arena.run())
        })
        .collect()
}
