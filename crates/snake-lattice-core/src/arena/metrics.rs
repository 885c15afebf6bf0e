use super::Arena;
use crate::direction::{Cell, Direction};
use crate::snake::Snake;
use serde::{Deserialize, Serialize};

/// Counts produced by a single [`Arena::step`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: usize,
    pub moved: usize,
    pub newly_trapped: usize,
}

/// Read-only view of one snake, as handed to renderers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnakeSnapshot {
    pub id: u32,
    pub symbol: String,
    pub color: String,
    pub head: Cell,
    /// Head first, tail last.
    pub body: Vec<Cell>,
    pub facing: Direction,
    pub trapped: bool,
}

impl From<&Snake> for SnakeSnapshot {
    fn from(snake: &Snake) -> Self {
        Self {
            id: snake.id,
            symbol: snake.symbol.clone(),
            color: snake.color.clone(),
            head: snake.head(),
            body: snake.body().iter().copied().collect(),
            facing: snake.facing(),
            trapped: snake.is_trapped(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSnapshot {
    pub tick: usize,
    pub snakes: Vec<SnakeSnapshot>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickMetrics {
    pub tick: usize,
    pub moved: usize,
    pub newly_trapped: usize,
    pub trapped_count: usize,
    pub occupied_cells: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    AllTrapped,
    StepBudgetExhausted,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub step_budget: usize,
    pub ticks_run: usize,
    pub stop_reason: StopReason,
    #[serde(default)]
    pub samples: Vec<TickMetrics>,
    pub final_state: TickSnapshot,
}

impl Arena {
    pub fn snapshot(&self) -> TickSnapshot {
        TickSnapshot {
            tick: self.tick_index,
            snakes: self.snakes.iter().map(SnakeSnapshot::from).collect(),
        }
    }

    pub fn trapped_count(&self) -> usize {
        self.snakes.iter().filter(|s| s.is_trapped()).count()
    }

    pub(crate) fn collect_tick_metrics(&self, report: &TickReport) -> TickMetrics {
        TickMetrics {
            tick: report.tick,
            moved: report.moved,
            newly_trapped: report.newly_trapped,
            trapped_count: self.trapped_count(),
            occupied_cells: self.occupancy.occupied_count(),
        }
    }
}
