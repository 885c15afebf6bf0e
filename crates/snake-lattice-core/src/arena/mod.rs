pub mod ensemble;
pub mod metrics;

pub use ensemble::run_replicates;
pub use metrics::*;

use crate::config::{BoundaryPolicy, SimConfig, SimConfigError, SnakeSpec};
use crate::direction::Cell;
use crate::occupancy::OccupancyMap;
use crate::rng::create_rng;
use crate::snake::{MoveOutcome, Snake, SnakeError};
use log::info;
use rand_chacha::ChaCha12Rng;
use std::{error::Error, fmt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArenaInitError {
    Config(SimConfigError),
    Snake { index: usize, source: SnakeError },
    SnakeOutOfBounds { index: usize, cell: Cell },
    SnakeAlreadyMoved { index: usize },
}

impl fmt::Display for ArenaInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArenaInitError::Config(e) => write!(f, "{}", e),
            ArenaInitError::Snake { index, source } => write!(f, "snake {index}: {source}"),
            ArenaInitError::SnakeOutOfBounds { index, cell } => {
                write!(f, "snake {index} covers {cell}, outside the lattice")
            }
            ArenaInitError::SnakeAlreadyMoved { index } => {
                write!(f, "snake {index} has left its initial placement")
            }
        }
    }
}

impl From<SimConfigError> for ArenaInitError {
    fn from(err: SimConfigError) -> Self {
        ArenaInitError::Config(err)
    }
}

impl Error for ArenaInitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ArenaInitError::Config(e) => Some(e),
            ArenaInitError::Snake { source, .. } => Some(source),
            ArenaInitError::SnakeOutOfBounds { .. } => None,
            ArenaInitError::SnakeAlreadyMoved { .. } => None,
        }
    }
}

/// Build an arena from a validated config. No simulation state exists
/// before this call.
pub fn build_simulation(config: SimConfig) -> Result<Arena, ArenaInitError> {
    Arena::try_new(config)
}

/// Bounded lattice, shared occupancy map and the snakes moving on it.
///
/// Snakes are processed in insertion order, one at a time, so each legality
/// check sees exactly the occupancy left by the snakes before it in the
/// same tick.
pub struct Arena {
    pub(crate) snakes: Vec<Snake>,
    pub(crate) occupancy: OccupancyMap,
    pub(crate) config: SimConfig,
    pub(crate) rng: ChaCha12Rng,
    pub(crate) tick_index: usize,
}

impl Arena {
    pub fn new(config: SimConfig) -> Self {
        Self::try_new(config).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_new(config: SimConfig) -> Result<Self, ArenaInitError> {
        config.validate()?;
        let snakes = config
            .snakes
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                Snake::from_spec(index as u32, spec)
                    .map_err(|source| ArenaInitError::Snake { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::assemble(snakes, config)
    }

    /// Build an arena around freshly constructed snakes. `config.snakes` is
    /// replaced with their placements, so every snake must still be where
    /// [`Snake::new`] laid it; moved or trapped snakes are rejected.
    pub fn with_snakes(snakes: Vec<Snake>, mut config: SimConfig) -> Result<Self, ArenaInitError> {
        if let Some(index) = snakes.iter().position(|s| !s.is_at_placement()) {
            return Err(ArenaInitError::SnakeAlreadyMoved { index });
        }
        config.snakes = snakes
            .iter()
            .map(|s| SnakeSpec {
                position: s.head(),
                orientation: s.orientation(),
                length: s.length(),
                symbol: s.symbol.clone(),
                color: s.color.clone(),
            })
            .collect();
        config.validate()?;
        Self::assemble(snakes, config)
    }

    fn assemble(snakes: Vec<Snake>, config: SimConfig) -> Result<Self, ArenaInitError> {
        let mut occupancy = OccupancyMap::new(config.xmax, config.ymax);
        for (index, snake) in snakes.iter().enumerate() {
            if let Some(&cell) = snake.body().iter().find(|&&c| !occupancy.contains(c)) {
                return Err(ArenaInitError::SnakeOutOfBounds { index, cell });
            }
        }
        // Overlapping placements are not validated; occupancy is simply OR'ed.
        for snake in &snakes {
            occupancy.mark_all(snake.body());
        }
        Ok(Self {
            snakes,
            occupancy,
            rng: create_rng(config.seed),
            config,
            tick_index: 0,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn snakes(&self) -> &[Snake] {
        &self.snakes
    }

    pub fn occupancy(&self) -> &OccupancyMap {
        &self.occupancy
    }

    /// Number of ticks executed so far.
    pub fn tick_index(&self) -> usize {
        self.tick_index
    }

    /// True when every snake is trapped (vacuously true with no snakes).
    pub fn all_trapped(&self) -> bool {
        self.snakes.iter().all(|s| s.is_trapped())
    }

    /// Mark the cell on the opposite edge of every edge `head` lies on.
    fn mark_mirrors(occupancy: &mut OccupancyMap, head: Cell) {
        let (xmax, ymax) = (occupancy.xmax(), occupancy.ymax());
        if head.x == xmax {
            occupancy.mark(Cell::new(0, head.y));
        } else if head.x == 0 {
            occupancy.mark(Cell::new(xmax, head.y));
        }
        if head.y == ymax {
            occupancy.mark(Cell::new(head.x, 0));
        } else if head.y == 0 {
            occupancy.mark(Cell::new(head.x, ymax));
        }
    }

    /// Advance every untrapped snake by one move.
    pub fn step(&mut self) -> TickReport {
        self.tick_index += 1;
        let (xmax, ymax, policy) = (self.config.xmax, self.config.ymax, self.config.boundary);
        let mut report = TickReport {
            tick: self.tick_index,
            ..TickReport::default()
        };

        for snake in &mut self.snakes {
            if snake.is_trapped() {
                continue;
            }
            // The snake must not be blocked by the cell its own tail leaves.
            let vacated = snake.tail();
            self.occupancy.clear(vacated);
            match snake.evaluate_and_move(xmax, ymax, policy, &self.occupancy, &mut self.rng) {
                MoveOutcome::Moved { to, .. } => {
                    self.occupancy.mark_all(snake.body());
                    if policy == BoundaryPolicy::Periodic {
                        Self::mark_mirrors(&mut self.occupancy, to);
                    }
                    report.moved += 1;
                }
                MoveOutcome::Trapped => {
                    // Still covered by the trapped body.
                    self.occupancy.mark(vacated);
                    report.newly_trapped += 1;
                }
                MoveOutcome::AlreadyTrapped => {}
            }
        }
        report
    }

    /// Run until every snake is trapped or `step_budget` ticks have run.
    pub fn run(&mut self) -> RunSummary {
        self.run_loop(None)
    }

    /// Like [`Arena::run`], handing `observer` a snapshot of the starting
    /// state and then one after every tick.
    pub fn run_with_observer<F: FnMut(&TickSnapshot)>(&mut self, mut observer: F) -> RunSummary {
        let observer: &mut dyn FnMut(&TickSnapshot) = &mut observer;
        self.run_loop(Some(observer))
    }

    fn run_loop(&mut self, mut observer: Option<&mut dyn FnMut(&TickSnapshot)>) -> RunSummary {
        if let Some(observe) = observer.as_deref_mut() {
            observe(&self.snapshot());
        }
        let budget = self.config.step_budget;
        let sample_every = self.config.sample_every;
        let mut samples = Vec::with_capacity(budget / sample_every + 1);
        let mut ticks_run = 0;

        let stop_reason = loop {
            if self.all_trapped() {
                break StopReason::AllTrapped;
            }
            if ticks_run == budget {
                break StopReason::StepBudgetExhausted;
            }
            let report = self.step();
            ticks_run += 1;
            if let Some(observe) = observer.as_deref_mut() {
                observe(&self.snapshot());
            }
            if ticks_run % sample_every == 0 || ticks_run == budget || self.all_trapped() {
                samples.push(self.collect_tick_metrics(&report));
            }
        };

        info!(
            "run stopped after {} ticks ({:?}), {}/{} snakes trapped",
            ticks_run,
            stop_reason,
            self.trapped_count(),
            self.snakes.len()
        );
        RunSummary {
            schema_version: 1,
            step_budget: budget,
            ticks_run,
            stop_reason,
            samples,
            final_state: self.snapshot(),
        }
    }
}
