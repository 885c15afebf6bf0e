use crate::config::{BoundaryPolicy, SimConfig, SnakeSpec};
use crate::direction::{Cell, Direction};
use crate::occupancy::OccupancyMap;
use log::{debug, trace};
use rand::Rng;
use std::collections::VecDeque;
use std::{error::Error, fmt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnakeError {
    InvalidLength { length: usize },
    TooLong { length: usize, max: usize },
    /// Body cell `index` (0 = head) would need a negative coordinate.
    BodyOutsideLattice { index: usize },
}

impl fmt::Display for SnakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnakeError::InvalidLength { length } => {
                write!(f, "snake length must be at least 1 (got {length})")
            }
            SnakeError::TooLong { length, max } => {
                write!(f, "snake length {length} exceeds the largest lattice ({max})")
            }
            SnakeError::BodyOutsideLattice { index } => {
                write!(f, "body cell {index} falls below the lattice origin")
            }
        }
    }
}

impl Error for SnakeError {}

/// Result of one call to [`Snake::evaluate_and_move`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved {
        from: Cell,
        to: Cell,
        direction: Direction,
    },
    /// No direction was legal; the snake is now permanently trapped.
    Trapped,
    /// The snake was already trapped and nothing was evaluated.
    AlreadyTrapped,
}

/// Pick one of `allowed` uniformly with a single draw from `rng`.
/// Returns `None` when nothing is allowed.
pub fn choose_direction<R: Rng + ?Sized>(allowed: &[Direction], rng: &mut R) -> Option<Direction> {
    if allowed.is_empty() {
        return None;
    }
    Some(allowed[rng.random_range(0..allowed.len())])
}

/// A fixed-length chain of lattice cells whose head takes one random legal
/// step per tick.
#[derive(Clone, Debug)]
pub struct Snake {
    pub id: u32,
    pub symbol: String,
    pub color: String,
    head: Cell,
    /// Head first, oldest cell last. Length never changes.
    body: VecDeque<Cell>,
    facing: Direction,
    orientation: Direction,
    length: usize,
    moves: usize,
    trapped: bool,
}

impl Snake {
    /// No straight body can be longer than the widest supported lattice.
    pub const MAX_LENGTH: usize = SimConfig::MAX_EXTENT + 1;

    /// Build a snake whose body extends backwards from `position`, opposite
    /// to `orientation`, one cell per unit of `length`.
    pub fn new(
        id: u32,
        position: Cell,
        orientation: Direction,
        length: usize,
    ) -> Result<Self, SnakeError> {
        if length == 0 {
            return Err(SnakeError::InvalidLength { length });
        }
        if length > Self::MAX_LENGTH {
            return Err(SnakeError::TooLong {
                length,
                max: Self::MAX_LENGTH,
            });
        }
        let (dx, dy) = orientation.delta();
        let mut body = VecDeque::with_capacity(length);
        for i in 0..length {
            let offset = i as i64;
            let x = position.x as i64 - offset * i64::from(dx);
            let y = position.y as i64 - offset * i64::from(dy);
            if x < 0 || y < 0 {
                return Err(SnakeError::BodyOutsideLattice { index: i });
            }
            body.push_back(Cell::new(x as usize, y as usize));
        }
        let defaults = SnakeSpec::default();
        Ok(Self {
            id,
            symbol: defaults.symbol,
            color: defaults.color,
            head: position,
            body,
            facing: orientation,
            orientation,
            length,
            moves: 0,
            trapped: false,
        })
    }

    pub fn from_spec(id: u32, spec: &SnakeSpec) -> Result<Self, SnakeError> {
        Ok(Self::new(id, spec.position, spec.orientation, spec.length)?
            .with_identity(&spec.symbol, &spec.color))
    }

    pub fn with_identity(mut self, symbol: &str, color: &str) -> Self {
        self.symbol = symbol.to_string();
        self.color = color.to_string();
        self
    }

    pub fn head(&self) -> Cell {
        self.head
    }

    pub fn body(&self) -> &VecDeque<Cell> {
        &self.body
    }

    /// Oldest body cell: the one vacated by the next move.
    pub fn tail(&self) -> Cell {
        self.body.back().copied().unwrap_or(self.head)
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn orientation(&self) -> Direction {
        self.orientation
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Steps taken since construction.
    pub fn moves(&self) -> usize {
        self.moves
    }

    /// True while the body still lies where [`Snake::new`] laid it.
    pub fn is_at_placement(&self) -> bool {
        self.moves == 0 && !self.trapped
    }

    pub fn is_trapped(&self) -> bool {
        self.trapped
    }

    /// Cell entered by stepping in `direction`, or `None` if a wall forbids it.
    fn destination(
        &self,
        direction: Direction,
        xmax: usize,
        ymax: usize,
        policy: BoundaryPolicy,
    ) -> Option<Cell> {
        let (dx, dy) = direction.delta();
        let x = policy.step_axis(self.head.x, dx, xmax)?;
        let y = policy.step_axis(self.head.y, dy, ymax)?;
        Some(Cell::new(x, y))
    }

    /// Directions whose destination is inside the lattice (after wrapping
    /// for `Periodic`) and not occupied, in [`Direction::ALL`] order.
    pub fn allowed_directions(
        &self,
        xmax: usize,
        ymax: usize,
        policy: BoundaryPolicy,
        occupancy: &OccupancyMap,
    ) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|&d| {
                self.destination(d, xmax, ymax, policy)
                    .is_some_and(|cell| !occupancy.is_occupied(cell))
            })
            .collect()
    }

    /// Evaluate legality against `occupancy` and take one random legal step.
    ///
    /// The occupancy map is only read. The caller clears the vacated tail
    /// before this call and marks the new body after it.
    pub fn evaluate_and_move<R: Rng + ?Sized>(
        &mut self,
        xmax: usize,
        ymax: usize,
        policy: BoundaryPolicy,
        occupancy: &OccupancyMap,
        rng: &mut R,
    ) -> MoveOutcome {
        if self.trapped {
            return MoveOutcome::AlreadyTrapped;
        }
        debug_assert_eq!((occupancy.xmax(), occupancy.ymax()), (xmax, ymax));

        let allowed = self.allowed_directions(xmax, ymax, policy, occupancy);
        let Some(direction) = choose_direction(&allowed, rng) else {
            self.trapped = true;
            debug!("snake {} trapped at {}", self.id, self.head);
            return MoveOutcome::Trapped;
        };

        let from = self.head;
        let (dx, dy) = direction.delta();
        // A walled axis never counts past its edge.
        let to = Cell::new(
            policy.step_axis(from.x, dx, xmax).unwrap_or(from.x),
            policy.step_axis(from.y, dy, ymax).unwrap_or(from.y),
        );
        self.head = to;
        self.facing = direction;
        self.body.push_front(to);
        self.body.pop_back();
        self.moves += 1;
        debug_assert_eq!(self.body.len(), self.length);
        trace!("snake {} moved {} from {} to {}", self.id, direction, from, to);

        MoveOutcome::Moved {
            from,
            to,
            direction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn body_of(snake: &Snake) -> Vec<Cell> {
        snake.body().iter().copied().collect()
    }

    #[test]
    fn body_is_laid_behind_the_orientation() {
        let north = Snake::new(0, Cell::new(5, 5), Direction::North, 3).unwrap();
        assert_eq!(
            body_of(&north),
            vec![Cell::new(5, 5), Cell::new(5, 4), Cell::new(5, 3)]
        );
        let south = Snake::new(1, Cell::new(5, 5), Direction::South, 3).unwrap();
        assert_eq!(
            body_of(&south),
            vec![Cell::new(5, 5), Cell::new(5, 6), Cell::new(5, 7)]
        );
        let east = Snake::new(2, Cell::new(5, 5), Direction::East, 2).unwrap();
        assert_eq!(body_of(&east), vec![Cell::new(5, 5), Cell::new(4, 5)]);
        let west = Snake::new(3, Cell::new(5, 5), Direction::West, 2).unwrap();
        assert_eq!(body_of(&west), vec![Cell::new(5, 5), Cell::new(6, 5)]);
        assert_eq!(north.head(), north.body()[0]);
        assert_eq!(north.facing(), Direction::North);
        assert!(!north.is_trapped());
    }

    #[test]
    fn zero_length_is_rejected() {
        assert_eq!(
            Snake::new(0, Cell::new(1, 1), Direction::North, 0).unwrap_err(),
            SnakeError::InvalidLength { length: 0 }
        );
    }

    #[test]
    fn absurd_length_is_rejected_before_allocating() {
        assert_eq!(
            Snake::new(0, Cell::new(1, 1), Direction::South, usize::MAX).unwrap_err(),
            SnakeError::TooLong {
                length: usize::MAX,
                max: Snake::MAX_LENGTH,
            }
        );
        let longest =
            Snake::new(0, Cell::new(0, 0), Direction::South, Snake::MAX_LENGTH).unwrap();
        assert_eq!(longest.tail(), Cell::new(0, SimConfig::MAX_EXTENT));
    }

    #[test]
    fn body_below_origin_is_rejected() {
        assert_eq!(
            Snake::new(0, Cell::new(1, 1), Direction::North, 3).unwrap_err(),
            SnakeError::BodyOutsideLattice { index: 2 }
        );
        assert!(Snake::new(0, Cell::new(0, 0), Direction::East, 1).is_ok());
    }

    #[test]
    fn from_spec_carries_identity() {
        let spec = SnakeSpec {
            position: Cell::new(3, 3),
            orientation: Direction::West,
            length: 2,
            symbol: "ro".to_string(),
            color: "r".to_string(),
        };
        let snake = Snake::from_spec(7, &spec).unwrap();
        assert_eq!(snake.id, 7);
        assert_eq!(snake.symbol, "ro");
        assert_eq!(snake.color, "r");
        assert_eq!(snake.tail(), Cell::new(4, 3));
    }

    #[test]
    fn choose_direction_handles_empty_and_single() {
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        assert_eq!(choose_direction(&[], &mut rng), None);
        assert_eq!(
            choose_direction(&[Direction::West], &mut rng),
            Some(Direction::West)
        );
    }

    #[test]
    fn choose_direction_is_roughly_uniform() {
        let mut rng = ChaCha12Rng::seed_from_u64(99);
        let mut counts = [0usize; 4];
        for _ in 0..4000 {
            let d = choose_direction(&Direction::ALL, &mut rng).unwrap();
            counts[d as usize] += 1;
        }
        for c in counts {
            assert!((800..1200).contains(&c), "count {c} far from 1000");
        }
    }

    #[test]
    fn choose_direction_is_reproducible_for_a_seed() {
        let draws = |seed| {
            let mut rng = ChaCha12Rng::seed_from_u64(seed);
            (0..32)
                .map(|_| choose_direction(&Direction::ALL, &mut rng))
                .collect::<Vec<_>>()
        };
        assert_eq!(draws(5), draws(5));
    }

    #[test]
    fn open_cell_allows_all_four_moves() {
        let occupancy = OccupancyMap::new(5, 5);
        let mut snake = Snake::new(0, Cell::new(2, 2), Direction::North, 3).unwrap();
        assert_eq!(
            snake.allowed_directions(5, 5, BoundaryPolicy::Wall, &occupancy),
            Direction::ALL.to_vec()
        );
        let mut rng = ChaCha12Rng::seed_from_u64(3);
        let outcome = snake.evaluate_and_move(5, 5, BoundaryPolicy::Wall, &occupancy, &mut rng);
        assert!(matches!(outcome, MoveOutcome::Moved { .. }));
        assert!([
            Cell::new(2, 3),
            Cell::new(3, 2),
            Cell::new(1, 2),
            Cell::new(2, 1)
        ]
        .contains(&snake.head()));
        assert_eq!(snake.body().len(), 3);
        assert_eq!(snake.body()[1], Cell::new(2, 2));
        assert!(!snake.is_trapped());
    }

    #[test]
    fn wall_edges_disallow_outward_moves() {
        let occupancy = OccupancyMap::new(4, 4);
        let corner = Snake::new(0, Cell::new(0, 0), Direction::South, 1).unwrap();
        assert_eq!(
            corner.allowed_directions(4, 4, BoundaryPolicy::Wall, &occupancy),
            vec![Direction::North, Direction::East]
        );
        let far = Snake::new(1, Cell::new(4, 4), Direction::South, 1).unwrap();
        assert_eq!(
            far.allowed_directions(4, 4, BoundaryPolicy::Wall, &occupancy),
            vec![Direction::South, Direction::West]
        );
    }

    #[test]
    fn surrounded_snake_is_trapped_and_stays_put() {
        let mut occupancy = OccupancyMap::new(4, 4);
        for cell in [
            Cell::new(2, 3),
            Cell::new(3, 2),
            Cell::new(2, 1),
            Cell::new(1, 2),
        ] {
            occupancy.mark(cell);
        }
        let mut snake = Snake::new(0, Cell::new(2, 2), Direction::North, 1).unwrap();
        let mut rng = ChaCha12Rng::seed_from_u64(11);
        assert_eq!(
            snake.evaluate_and_move(4, 4, BoundaryPolicy::Wall, &occupancy, &mut rng),
            MoveOutcome::Trapped
        );
        assert!(snake.is_trapped());
        assert_eq!(snake.head(), Cell::new(2, 2));

        // Freeing neighbours does not revive a trapped snake.
        let open = OccupancyMap::new(4, 4);
        assert_eq!(
            snake.evaluate_and_move(4, 4, BoundaryPolicy::Wall, &open, &mut rng),
            MoveOutcome::AlreadyTrapped
        );
        assert!(snake.is_trapped());
        assert_eq!(body_of(&snake), vec![Cell::new(2, 2)]);
    }

    #[test]
    fn cornered_by_walls_and_occupancy_is_trapped() {
        let mut occupancy = OccupancyMap::new(3, 3);
        occupancy.mark(Cell::new(2, 3));
        occupancy.mark(Cell::new(3, 2));
        let mut snake = Snake::new(0, Cell::new(3, 3), Direction::North, 1).unwrap();
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        assert_eq!(
            snake.evaluate_and_move(3, 3, BoundaryPolicy::Wall, &occupancy, &mut rng),
            MoveOutcome::Trapped
        );
    }

    #[test]
    fn periodic_edge_checks_the_wrapped_cell() {
        let mut occupancy = OccupancyMap::new(10, 10);
        let snake = Snake::new(0, Cell::new(10, 5), Direction::East, 1).unwrap();
        assert_eq!(
            snake.allowed_directions(10, 10, BoundaryPolicy::Periodic, &occupancy),
            Direction::ALL.to_vec()
        );
        // East from x = xmax checks x = 1, not the edge itself.
        occupancy.mark(Cell::new(1, 5));
        assert_eq!(
            snake.allowed_directions(10, 10, BoundaryPolicy::Periodic, &occupancy),
            vec![Direction::North, Direction::South, Direction::West]
        );
    }

    #[test]
    fn periodic_move_east_from_xmax_crosses_the_seam() {
        let mut occupancy = OccupancyMap::new(10, 10);
        for cell in [Cell::new(10, 6), Cell::new(10, 4), Cell::new(9, 5)] {
            occupancy.mark(cell);
        }
        // Mirror of the head left by the previous tick.
        occupancy.mark(Cell::new(0, 5));
        let mut snake = Snake::new(0, Cell::new(10, 5), Direction::East, 2).unwrap();
        let mut rng = ChaCha12Rng::seed_from_u64(4);
        let outcome =
            snake.evaluate_and_move(10, 10, BoundaryPolicy::Periodic, &occupancy, &mut rng);
        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                from: Cell::new(10, 5),
                to: Cell::new(1, 5),
                direction: Direction::East,
            }
        );
        assert_eq!(snake.facing(), Direction::East);
        assert_eq!(body_of(&snake), vec![Cell::new(1, 5), Cell::new(10, 5)]);
    }

    #[test]
    fn periodic_move_south_from_zero_wraps_below_max() {
        let mut occupancy = OccupancyMap::new(6, 6);
        for cell in [Cell::new(3, 1), Cell::new(4, 0), Cell::new(2, 0)] {
            occupancy.mark(cell);
        }
        let mut snake = Snake::new(0, Cell::new(3, 0), Direction::South, 1).unwrap();
        let mut rng = ChaCha12Rng::seed_from_u64(8);
        snake.evaluate_and_move(6, 6, BoundaryPolicy::Periodic, &occupancy, &mut rng);
        assert_eq!(snake.head(), Cell::new(3, 5));
    }

    #[test]
    fn placement_is_lost_after_the_first_move() {
        let mut snake = Snake::new(0, Cell::new(4, 4), Direction::North, 3).unwrap();
        assert!(snake.is_at_placement());
        // Only north is open, so the moved body still looks like a fresh
        // placement one cell higher.
        let mut occupancy = OccupancyMap::new(8, 8);
        occupancy.mark(Cell::new(3, 4));
        occupancy.mark(Cell::new(5, 4));
        occupancy.mark(Cell::new(4, 3));
        let mut rng = ChaCha12Rng::seed_from_u64(2);
        snake.evaluate_and_move(8, 8, BoundaryPolicy::Wall, &occupancy, &mut rng);
        assert_eq!(snake.head(), Cell::new(4, 5));
        assert_eq!(snake.moves(), 1);
        assert!(!snake.is_at_placement());
    }

    #[test]
    fn body_length_is_constant_over_many_moves() {
        let occupancy = OccupancyMap::new(8, 8);
        let mut snake = Snake::new(0, Cell::new(4, 4), Direction::North, 4).unwrap();
        let mut rng = ChaCha12Rng::seed_from_u64(21);
        for _ in 0..200 {
            snake.evaluate_and_move(8, 8, BoundaryPolicy::Periodic, &occupancy, &mut rng);
            assert_eq!(snake.body().len(), 4);
            assert_eq!(snake.head(), snake.body()[0]);
            assert!(snake.head().x <= 8 && snake.head().y <= 8);
        }
    }
}
