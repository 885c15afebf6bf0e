use crate::direction::{Cell, Direction};
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt, str::FromStr};

/// Edge behaviour of the lattice.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Edges are absorbing barriers.
    #[default]
    Wall,
    /// Torus: cells at `0` and `max` on an axis are occupancy-equivalent.
    Periodic,
}

impl BoundaryPolicy {
    /// Coordinate reached by moving `delta` (-1, 0 or +1) along one axis
    /// whose largest coordinate is `max`. `None` means the move would leave
    /// a walled lattice.
    ///
    /// Under `Periodic` the raw result is kept when it equals `max` and is
    /// otherwise reduced modulo `max`, so `max + 1` lands on `1` and `-1`
    /// lands on `max - 1`: the seam cell has the two names `0` and `max`.
    pub fn step_axis(self, coord: usize, delta: i8, max: usize) -> Option<usize> {
        let target = coord as i64 + i64::from(delta);
        let max_i = max as i64;
        match self {
            BoundaryPolicy::Wall => (0..=max_i).contains(&target).then_some(target as usize),
            BoundaryPolicy::Periodic => {
                debug_assert!(max > 0, "periodic axis needs max >= 1");
                if target == max_i {
                    Some(max)
                } else {
                    Some(target.rem_euclid(max_i) as usize)
                }
            }
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            BoundaryPolicy::Wall => "wall",
            BoundaryPolicy::Periodic => "periodic",
        }
    }
}

impl fmt::Display for BoundaryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBoundaryPolicyError {
    pub value: String,
}

impl fmt::Display for ParseBoundaryPolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown boundary policy {:?} (expected wall or periodic)",
            self.value
        )
    }
}

impl Error for ParseBoundaryPolicyError {}

impl FromStr for BoundaryPolicy {
    type Err = ParseBoundaryPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wall" => Ok(BoundaryPolicy::Wall),
            "periodic" => Ok(BoundaryPolicy::Periodic),
            other => Err(ParseBoundaryPolicyError {
                value: other.to_string(),
            }),
        }
    }
}

/// Placement and identity of one snake.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SnakeSpec {
    /// Starting head cell.
    pub position: Cell,
    /// Heading at construction; the body is laid out behind it.
    pub orientation: Direction,
    /// Number of cells, head included. Must be at least 1.
    pub length: usize,
    /// Head marker for renderers.
    pub symbol: String,
    /// Body colour for renderers.
    pub color: String,
}

impl Default for SnakeSpec {
    fn default() -> Self {
        Self {
            position: Cell::new(10, 10),
            orientation: Direction::North,
            length: 5,
            symbol: "bo".to_string(),
            color: "b".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SimConfig {
    /// Deterministic seed for the direction draws.
    pub seed: u64,
    /// Largest x coordinate; the lattice has `xmax + 1` columns.
    pub xmax: usize,
    /// Largest y coordinate; the lattice has `ymax + 1` rows.
    pub ymax: usize,
    pub boundary: BoundaryPolicy,
    /// Maximum number of ticks in a run.
    pub step_budget: usize,
    /// Tick interval between recorded `TickMetrics` samples.
    pub sample_every: usize,
    /// Snakes in processing order.
    pub snakes: Vec<SnakeSpec>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            xmax: 20,
            ymax: 20,
            boundary: BoundaryPolicy::Wall,
            step_budget: 400,
            sample_every: 1,
            snakes: vec![
                SnakeSpec {
                    position: Cell::new(5, 5),
                    orientation: Direction::North,
                    length: 5,
                    symbol: "bo".to_string(),
                    color: "b".to_string(),
                },
                SnakeSpec {
                    position: Cell::new(15, 15),
                    orientation: Direction::South,
                    length: 5,
                    symbol: "ro".to_string(),
                    color: "r".to_string(),
                },
                SnakeSpec {
                    position: Cell::new(5, 15),
                    orientation: Direction::East,
                    length: 5,
                    symbol: "go".to_string(),
                    color: "g".to_string(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimConfigError {
    Parse { message: String },
    InvalidExtent { axis: char, value: usize },
    ExtentTooLarge { axis: char, max: usize, actual: usize },
    InvalidStepBudget { max: usize, actual: usize },
    InvalidSampleEvery,
    InvalidSnakeLength { index: usize },
    SnakeTooLong { index: usize, max: usize, actual: usize },
}

impl fmt::Display for SimConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimConfigError::Parse { message } => write!(f, "invalid config: {message}"),
            SimConfigError::InvalidExtent { axis, value } => {
                write!(f, "{axis}max must be at least 1 (got {value})")
            }
            SimConfigError::ExtentTooLarge { axis, max, actual } => {
                write!(f, "{axis}max ({actual}) exceeds supported maximum ({max})")
            }
            SimConfigError::InvalidStepBudget { max, actual } => {
                write!(f, "step_budget ({actual}) exceeds supported maximum ({max})")
            }
            SimConfigError::InvalidSampleEvery => write!(f, "sample_every must be positive"),
            SimConfigError::InvalidSnakeLength { index } => {
                write!(f, "snake {index} must have length of at least 1")
            }
            SimConfigError::SnakeTooLong { index, max, actual } => {
                write!(f, "snake {index} length ({actual}) cannot fit the lattice (max {max})")
            }
        }
    }
}

impl Error for SimConfigError {}

impl SimConfig {
    pub const MAX_EXTENT: usize = 4096;
    pub const MAX_STEP_BUDGET: usize = 1_000_000;

    /// Parse a JSON config and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, SimConfigError> {
        let config: SimConfig =
            serde_json::from_str(json).map_err(|e| SimConfigError::Parse {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimConfigError> {
        for (axis, value) in [('x', self.xmax), ('y', self.ymax)] {
            if value == 0 {
                return Err(SimConfigError::InvalidExtent { axis, value });
            }
            if value > Self::MAX_EXTENT {
                return Err(SimConfigError::ExtentTooLarge {
                    axis,
                    max: Self::MAX_EXTENT,
                    actual: value,
                });
            }
        }
        if self.step_budget > Self::MAX_STEP_BUDGET {
            return Err(SimConfigError::InvalidStepBudget {
                max: Self::MAX_STEP_BUDGET,
                actual: self.step_budget,
            });
        }
        if self.sample_every == 0 {
            return Err(SimConfigError::InvalidSampleEvery);
        }
        if let Some(index) = self.snakes.iter().position(|s| s.length == 0) {
            return Err(SimConfigError::InvalidSnakeLength { index });
        }
        // A straight body spans at most max(xmax, ymax) + 1 cells.
        let max_length = self.xmax.max(self.ymax) + 1;
        if let Some((index, spec)) = self
            .snakes
            .iter()
            .enumerate()
            .find(|(_, s)| s.length > max_length)
        {
            return Err(SimConfigError::SnakeTooLong {
                index,
                max: max_length,
                actual: spec.length,
            });
        }
        Ok(())
    }
}
