pub mod arena;
pub mod config;
pub mod direction;
pub mod occupancy;
pub mod rng;
pub mod snake;

pub use arena::{build_simulation, run_replicates, Arena, ArenaInitError};
pub use arena::{RunSummary, SnakeSnapshot, StopReason, TickMetrics, TickReport, TickSnapshot};
pub use config::{BoundaryPolicy, SimConfig, SimConfigError, SnakeSpec};
pub use direction::{Cell, Direction};
pub use occupancy::OccupancyMap;
pub use snake::{choose_direction, MoveOutcome, Snake, SnakeError};
