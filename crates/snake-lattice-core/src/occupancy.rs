use crate::direction::Cell;

/// Boolean occupancy grid over every lattice cell `(0..=xmax, 0..=ymax)`.
/// Owned by the arena; snakes only ever read it.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupancyMap {
    width: usize,
    height: usize,
    data: Vec<bool>,
}

impl OccupancyMap {
    pub fn new(xmax: usize, ymax: usize) -> Self {
        let width = xmax + 1;
        let height = ymax + 1;
        Self {
            width,
            height,
            data: vec![false; width * height],
        }
    }

    pub fn xmax(&self) -> usize {
        self.width - 1
    }

    pub fn ymax(&self) -> usize {
        self.height - 1
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    fn index(&self, cell: Cell) -> usize {
        assert!(
            self.contains(cell),
            "cell {cell} outside lattice (xmax={}, ymax={})",
            self.xmax(),
            self.ymax()
        );
        cell.y * self.width + cell.x
    }

    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.data[self.index(cell)]
    }

    pub fn set(&mut self, cell: Cell, occupied: bool) {
        let idx = self.index(cell);
        self.data[idx] = occupied;
    }

    pub fn mark(&mut self, cell: Cell) {
        self.set(cell, true);
    }

    pub fn clear(&mut self, cell: Cell) {
        self.set(cell, false);
    }

    pub fn mark_all<'a>(&mut self, cells: impl IntoIterator<Item = &'a Cell>) {
        for &cell in cells {
            self.mark(cell);
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.data.iter().filter(|&&o| o).count()
    }

    /// Occupied cells in row-major order (y outer, x inner).
    pub fn occupied_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let width = self.width;
        self.data
            .iter()
            .enumerate()
            .filter(|(_, o)| **o)
            .map(move |(i, _)| Cell::new(i % width, i / width))
    }
}
