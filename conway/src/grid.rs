// grid.rs - Grid type and the Game of Life transition rule

use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::error::GridError;
use crate::patterns::Pattern;

/// Moore neighborhood offsets as (row, col).
#[rustfmt::skip]
const NEIGHBORS: [(isize, isize); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1),           (0, 1),
    (1, -1),  (1, 0),  (1, 1),
];

/// A fixed-size matrix of dead/alive cells with bounded edges.
///
/// Grids are values: [`Grid::step`] and [`Grid::toggled`] return a new grid
/// and leave `self` untouched, so a reader holding the previous generation
/// never observes a partial update.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<bool>, // row-major, rows * cols entries
}

impl Grid {
    /// An all-dead grid.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![false; rows * cols],
        }
    }

    /// Each cell is independently alive with probability one half.
    pub fn random(rows: usize, cols: usize) -> Self {
        Self::random_with(rows, cols, &mut rand::rng())
    }

    pub fn random_with<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Self {
        let cells = (0..rows * cols)
            .map(|_| rng.random::<f64>() > 0.5)
            .collect();
        Self { rows, cols, cells }
    }

    /// An empty grid with `pattern` centered on it. Cells that do not fit are dropped.
    pub fn with_pattern(rows: usize, cols: usize, pattern: &Pattern) -> Self {
        let mut grid = Self::new(rows, cols);
        let (height, width) = pattern.size();
        let top = rows.saturating_sub(height) / 2;
        let left = cols.saturating_sub(width) / 2;

        for &(row, col) in pattern.cells {
            let (row, col) = (top + row, left + col);
            if row < rows && col < cols {
                grid.cells[row * cols + col] = true;
            }
        }
        grid
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `None` when the coordinate lies outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<bool> {
        (row < self.rows && col < self.cols).then(|| self.cells[row * self.cols + col])
    }

    pub fn row(&self, row: usize) -> Option<&[bool]> {
        (row < self.rows).then(|| &self.cells[row * self.cols..(row + 1) * self.cols])
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[bool]> {
        (0..self.rows).filter_map(move |row| self.row(row))
    }

    /// Coordinates of every live cell, in row-major order.
    pub fn live_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &alive)| alive)
            .map(move |(i, _)| (i / self.cols, i % self.cols))
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&alive| alive).count()
    }

    pub fn is_dead(&self) -> bool {
        !self.cells.contains(&true)
    }

    /// A copy of this grid with the cell at (row, col) flipped.
    pub fn toggled(&self, row: usize, col: usize) -> Result<Self, GridError> {
        let index = self.index(row, col)?;
        let mut next = self.clone();
        next.cells[index] = !next.cells[index];
        Ok(next)
    }

    /// The next generation. Every neighbor count is taken from `self`.
    pub fn step(&self) -> Self {
        let cells = (0..self.rows).flat_map(|row| self.next_row(row)).collect();
        Self {
            rows: self.rows,
            cols: self.cols,
            cells,
        }
    }

    fn next_row(&self, row: usize) -> impl Iterator<Item = bool> + '_ {
        (0..self.cols).map(move |col| {
            let alive = self.cells[row * self.cols + col];
            next_state(alive, self.live_neighbors(row, col))
        })
    }

    /// Live cells among the eight neighbors that lie inside the grid.
    pub fn live_neighbors(&self, row: usize, col: usize) -> usize {
        NEIGHBORS
            .iter()
            .filter_map(|&(dr, dc)| {
                let r = row.checked_add_signed(dr)?;
                let c = col.checked_add_signed(dc)?;
                self.get(r, c)
            })
            .filter(|&alive| alive)
            .count()
    }

    fn index(&self, row: usize, col: usize) -> Result<usize, GridError> {
        if row < self.rows && col < self.cols {
            Ok(row * self.cols + col)
        } else {
            Err(GridError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }
}

fn next_state(alive: bool, neighbors: usize) -> bool {
    match (alive, neighbors) {
        (_, n) if !(2..=3).contains(&n) => false, // Under- or overpopulation
        (false, 3) => true,                       // Birth
        (alive, _) => alive,                      // Survival, or stays dead
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.iter_rows().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for &alive in row {
                f.write_str(if alive { "o" } else { "." })?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid {}x{}", self.rows, self.cols)?;
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Grid {
    type Err = GridError;

    /// Parses `o` (alive) and `.` (dead) rows. Blank lines and surrounding
    /// whitespace are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = s.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        let Some(first) = lines.first() else {
            return Err(GridError::EmptyDimensions { rows: 0, cols: 0 });
        };
        let cols = first.chars().count();

        let mut cells = Vec::with_capacity(lines.len() * cols);
        for (line, text) in lines.iter().enumerate() {
            let found = text.chars().count();
            if found != cols {
                return Err(GridError::RaggedRow {
                    line,
                    expected: cols,
                    found,
                });
            }
            for c in text.chars() {
                match c {
                    'o' | 'O' => cells.push(true),
                    '.' => cells.push(false),
                    _ => return Err(GridError::UnexpectedChar(c)),
                }
            }
        }

        Ok(Self {
            rows: lines.len(),
            cols,
            cells,
        })
    }
}
