// Board state engine
// Owns the cell grid, the fixed adjacency relation, mine placement and flood-fill reveal

use rand::Rng;
use thiserror::Error;
use tracing::debug;

use crate::msw_cell::Cell;

/// Uniform integer source used for mine placement
/// Injected so boards can be generated deterministically under a fixed seed
pub trait RandomSource {
    /// Uniform value in [0, bound); bound is always > 0
    fn next_int(&mut self, bound: usize) -> usize;
}

impl<R: Rng> RandomSource for R {
    fn next_int(&mut self, bound: usize) -> usize {
        self.gen_range(0..bound)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("invalid board dimensions {rows}x{cols}: both must be at least 1")]
    InvalidDimensions { rows: usize, cols: usize },
    #[error("invalid mine count {mines}: must be at least 1 and below the {cells} cells of the board")]
    InvalidMineCount { mines: usize, cells: usize },
}

/// Result of a single reveal command on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reveal {
    Ignored,       // Target already revealed or flagged
    Opened(usize), // Number of safe cells revealed, flood fill included
    Detonated,     // Target was a mine
}

#[derive(Debug, Clone)]
pub struct Board {
    rows: usize,
    cols: usize,
    mine_count: usize,
    cells: Vec<Cell>,           // Row-major, allocated once
    neighbors: Vec<Vec<usize>>, // Cell index -> neighbor indices, never rebuilt
}

/// Cell count of a rows x cols grid, rejecting empty or overflowing sizes
fn validate_dimensions(rows: usize, cols: usize) -> Result<usize, BoardError> {
    if rows < 1 || cols < 1 {
        return Err(BoardError::InvalidDimensions { rows, cols });
    }
    rows.checked_mul(cols)
        .ok_or(BoardError::InvalidDimensions { rows, cols })
}

fn validate(rows: usize, cols: usize, mines: usize) -> Result<usize, BoardError> {
    let cells = validate_dimensions(rows, cols)?;
    if mines < 1 || mines >= cells {
        return Err(BoardError::InvalidMineCount { mines, cells });
    }
    Ok(cells)
}

impl Board {
    /// Build a board with `mines` mines placed uniformly at random
    pub fn new<R>(rows: usize, cols: usize, mines: usize, rng: &mut R) -> Result<Self, BoardError>
    where
        R: RandomSource + ?Sized,
    {
        validate(rows, cols, mines)?;
        Ok(Board::generate(rows, cols, mines, rng))
    }

    /// Fresh random board with this board's geometry and mine count
    pub fn regenerate<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Board {
        Board::generate(self.rows, self.cols, self.mine_count, rng)
    }

    fn generate<R: RandomSource + ?Sized>(rows: usize, cols: usize, mines: usize, rng: &mut R) -> Board {
        let mut board = Board::blank(rows, cols, mines);
        board.place_mines(rng);
        board.compute_adjacent_counts();
        debug!(rows, cols, mines, "board generated");
        board
    }

    /// Build a board with mines at exactly the given positions (duplicates collapse)
    pub fn with_mines(rows: usize, cols: usize, positions: &[(usize, usize)]) -> Result<Self, BoardError> {
        validate_dimensions(rows, cols)?;
        let mut board = Board::blank(rows, cols, 0);
        for &(r, c) in positions {
            let idx = board.index(r, c);
            board.cells[idx].set_mine(true);
        }
        let placed = board.cells.iter().filter(|c| c.is_mine()).count();
        validate(rows, cols, placed)?;
        board.mine_count = placed;
        board.compute_adjacent_counts();
        Ok(board)
    }

    /// Allocate default cells and the adjacency relation from grid geometry alone
    fn blank(rows: usize, cols: usize, mine_count: usize) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                cells.push(Cell::new(r, c));
            }
        }
        let mut neighbors = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                let mut adj = Vec::with_capacity(8);
                for nr in r.saturating_sub(1)..=(r + 1).min(rows - 1) {
                    for nc in c.saturating_sub(1)..=(c + 1).min(cols - 1) {
                        if nr == r && nc == c {
                            continue;
                        }
                        adj.push(nr * cols + nc);
                    }
                }
                neighbors.push(adj);
            }
        }
        Board {
            rows,
            cols,
            mine_count,
            cells,
            neighbors,
        }
    }

    /// Rejection sampling: draw (row, col) until `mine_count` distinct cells are mined
    fn place_mines<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        let mut placed = 0;
        let mut draws = 0usize;
        while placed < self.mine_count {
            let r = rng.next_int(self.rows);
            let c = rng.next_int(self.cols);
            draws += 1;
            let idx = self.index(r, c);
            if !self.cells[idx].is_mine() {
                self.cells[idx].set_mine(true);
                placed += 1;
            }
        }
        debug!(placed, draws, "mines placed");
    }

    fn compute_adjacent_counts(&mut self) {
        for i in 0..self.cells.len() {
            if self.cells[i].is_mine() {
                continue;
            }
            let n = self.neighbors[i].iter().filter(|&&j| self.cells[j].is_mine()).count();
            self.cells[i].set_adjacent_mines(n as u8);
        }
    }

    /// Flat index of (row, col); out-of-range coordinates are a caller bug
    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "cell ({}, {}) out of range for {}x{} board",
            row,
            col,
            self.rows,
            self.cols
        );
        row * self.cols + col
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn mine_count(&self) -> usize {
        self.mine_count
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        &self.cells[self.index(row, col)]
    }

    /// All cells in row-major order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Coordinates of the up-to-8 neighbors of (row, col)
    pub fn neighbors(&self, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        let cols = self.cols;
        self.neighbors[self.index(row, col)]
            .iter()
            .map(move |&i| (i / cols, i % cols))
    }

    /// Reveal (row, col), flooding outward through zero-count cells
    /// Flagged cells are never opened by the flood
    pub fn reveal(&mut self, row: usize, col: usize) -> Reveal {
        let start = self.index(row, col);
        let target = self.cells[start];
        if target.is_revealed() || target.is_flagged() {
            return Reveal::Ignored;
        }
        if target.is_mine() {
            self.cells[start].reveal();
            return Reveal::Detonated;
        }

        let mut opened = 0;
        let mut stack = vec![start];
        while let Some(i) = stack.pop() {
            let cell = &mut self.cells[i];
            if cell.is_revealed() || cell.is_flagged() {
                continue;
            }
            cell.reveal();
            opened += 1;
            if cell.adjacent_mines() == 0 {
                for &n in &self.neighbors[i] {
                    let next = &self.cells[n];
                    if !next.is_revealed() && !next.is_flagged() {
                        stack.push(n);
                    }
                }
            }
        }
        Reveal::Opened(opened)
    }

    /// Flip the flag on (row, col); None if the cell is revealed
    pub fn toggle_flag(&mut self, row: usize, col: usize) -> Option<bool> {
        let idx = self.index(row, col);
        self.cells[idx].toggle_flag()
    }

    /// True once every non-mine cell has been revealed
    pub fn all_safe_revealed(&self) -> bool {
        self.cells.iter().all(|c| c.is_mine() || c.is_revealed())
    }

    /// Reveal every mine, flagged or not; returns how many flags that cleared
    pub fn disclose_mines(&mut self) -> usize {
        let mut cleared = 0;
        for cell in self.cells.iter_mut().filter(|c| c.is_mine()) {
            if cell.is_flagged() {
                cleared += 1;
            }
            cell.reveal();
        }
        cleared
    }

    /// Flag every unflagged hidden mine; returns how many flags were added
    pub fn flag_remaining_mines(&mut self) -> usize {
        let mut added = 0;
        for cell in self.cells.iter_mut() {
            if cell.is_mine() && !cell.is_flagged() && !cell.is_revealed() {
                cell.set_flag(true);
                added += 1;
            }
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Replays a fixed list of draws
    struct Scripted(Vec<usize>);

    impl RandomSource for Scripted {
        fn next_int(&mut self, bound: usize) -> usize {
            let v = self.0.remove(0);
            assert!(v < bound);
            v
        }
    }

    fn mine_neighbors(board: &Board, r: usize, c: usize) -> u8 {
        let mut n = 0;
        for nr in r as isize - 1..=r as isize + 1 {
            for nc in c as isize - 1..=c as isize + 1 {
                if (nr, nc) == (r as isize, c as isize) {
                    continue;
                }
                if nr < 0 || nc < 0 || nr >= board.rows() as isize || nc >= board.cols() as isize {
                    continue;
                }
                if board.cell(nr as usize, nc as usize).is_mine() {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn rejects_bad_dimensions_and_mine_counts() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            Board::new(0, 5, 1, &mut rng).unwrap_err(),
            BoardError::InvalidDimensions { rows: 0, cols: 5 }
        );
        assert_eq!(
            Board::new(3, 3, 0, &mut rng).unwrap_err(),
            BoardError::InvalidMineCount { mines: 0, cells: 9 }
        );
        assert_eq!(
            Board::new(3, 3, 9, &mut rng).unwrap_err(),
            BoardError::InvalidMineCount { mines: 9, cells: 9 }
        );
        assert!(Board::new(3, 3, 8, &mut rng).is_ok());
    }

    #[test]
    fn generated_boards_have_exact_mines_and_counts() {
        for seed in 0..20u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let board = Board::new(9, 13, 30, &mut rng).unwrap();
            assert_eq!(board.cells().iter().filter(|c| c.is_mine()).count(), 30);
            for cell in board.cells() {
                assert!(!cell.is_revealed() && !cell.is_flagged());
                if !cell.is_mine() {
                    assert_eq!(cell.adjacent_mines(), mine_neighbors(&board, cell.row(), cell.col()));
                }
            }
        }
    }

    #[test]
    fn same_seed_same_board() {
        let a = Board::new(16, 16, 40, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = Board::new(16, 16, 40, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a.cells(), b.cells());
        let c = a.regenerate(&mut StdRng::seed_from_u64(8));
        assert_eq!((c.rows(), c.cols(), c.mine_count()), (16, 16, 40));
        assert_eq!(c.cells().iter().filter(|c| c.is_mine()).count(), 40);
    }

    #[test]
    fn rejection_sampling_skips_repeated_draws() {
        let mut rng = Scripted(vec![0, 0, 0, 0, 1, 1]);
        let board = Board::new(2, 2, 2, &mut rng).unwrap();
        assert!(rng.0.is_empty());
        assert!(board.cell(0, 0).is_mine());
        assert!(board.cell(1, 1).is_mine());
        assert!(!board.cell(0, 1).is_mine());
    }

    #[test]
    fn neighbor_sets_follow_grid_geometry() {
        let board = Board::with_mines(4, 5, &[(0, 0)]).unwrap();
        assert_eq!(board.neighbors(0, 0).count(), 3);
        assert_eq!(board.neighbors(0, 2).count(), 5);
        assert_eq!(board.neighbors(2, 2).count(), 8);
        let mut n: Vec<_> = board.neighbors(3, 4).collect();
        n.sort();
        assert_eq!(n, vec![(2, 3), (2, 4), (3, 3)]);
    }

    #[test]
    fn numbered_cell_reveals_only_itself() {
        let mut board = Board::with_mines(3, 3, &[(1, 1)]).unwrap();
        for cell in board.cells() {
            if !cell.is_mine() {
                assert_eq!(cell.adjacent_mines(), 1);
            }
        }
        assert_eq!(board.reveal(0, 0), Reveal::Opened(1));
        assert_eq!(board.cells().iter().filter(|c| c.is_revealed()).count(), 1);
    }

    #[test]
    fn zero_cell_floods_up_to_numbered_boundary() {
        let mut board = Board::with_mines(8, 8, &[(7, 0), (7, 3), (7, 6)]).unwrap();
        assert_eq!(board.reveal(0, 0), Reveal::Opened(56));
        for cell in board.cells() {
            assert_eq!(cell.is_revealed(), cell.row() < 7);
            if cell.row() == 6 {
                assert!(cell.adjacent_mines() > 0);
            }
        }
        assert!(!board.all_safe_revealed());
        assert_eq!(board.reveal(0, 0), Reveal::Ignored);
        assert_eq!(board.reveal(3, 5), Reveal::Ignored);
    }

    #[test]
    fn flagged_target_is_not_revealed() {
        let mut board = Board::with_mines(3, 3, &[(1, 1)]).unwrap();
        assert_eq!(board.toggle_flag(0, 0), Some(true));
        assert_eq!(board.reveal(0, 0), Reveal::Ignored);
        assert!(board.cell(0, 0).is_flagged());
        assert!(!board.cell(0, 0).is_revealed());

        let mut board = Board::with_mines(3, 3, &[(1, 1)]).unwrap();
        board.toggle_flag(1, 1);
        assert_eq!(board.reveal(1, 1), Reveal::Ignored);
        assert!(board.cell(1, 1).is_flagged());
    }

    #[test]
    fn oversized_dimensions_are_rejected_before_allocation() {
        assert_eq!(
            Board::with_mines(usize::MAX, 2, &[(0, 0)]).unwrap_err(),
            BoardError::InvalidDimensions { rows: usize::MAX, cols: 2 }
        );
        assert_eq!(
            Board::with_mines(0, 3, &[]).unwrap_err(),
            BoardError::InvalidDimensions { rows: 0, cols: 3 }
        );
    }

    #[test]
    fn flood_stops_at_flags() {
        let mut board = Board::with_mines(8, 8, &[(7, 0), (7, 3), (7, 6)]).unwrap();
        assert_eq!(board.toggle_flag(3, 3), Some(true));
        assert_eq!(board.reveal(0, 0), Reveal::Opened(55));
        assert!(board.cell(3, 3).is_flagged());
        assert!(!board.cell(3, 3).is_revealed());
    }

    #[test]
    fn mine_reveal_and_disclosure() {
        let mut board = Board::with_mines(3, 3, &[(0, 0), (2, 2)]).unwrap();
        board.toggle_flag(2, 2);
        assert_eq!(board.reveal(0, 0), Reveal::Detonated);
        assert_eq!(board.disclose_mines(), 1);
        assert!(board.cell(0, 0).is_revealed());
        assert!(board.cell(2, 2).is_revealed());
        assert!(!board.cell(2, 2).is_flagged());
    }

    #[test]
    fn flag_remaining_mines_counts_new_flags() {
        let mut board = Board::with_mines(2, 3, &[(0, 0), (1, 2)]).unwrap();
        board.toggle_flag(0, 0);
        assert_eq!(board.flag_remaining_mines(), 1);
        assert!(board.cell(1, 2).is_flagged());
    }

    #[test]
    fn toggle_flag_on_revealed_cell_is_refused() {
        let mut board = Board::with_mines(3, 3, &[(1, 1)]).unwrap();
        board.reveal(0, 0);
        assert_eq!(board.toggle_flag(0, 0), None);
        assert_eq!(board.toggle_flag(0, 1), Some(true));
        assert_eq!(board.toggle_flag(0, 1), Some(false));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_reveal_panics() {
        let mut board = Board::with_mines(3, 3, &[(1, 1)]).unwrap();
        board.reveal(3, 0);
    }
}
