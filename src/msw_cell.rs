// Single grid position of the minesweeper board
// Holds mine/reveal/flag state; reveal and flag are mutually exclusive

/// One cell of the board
/// Position is fixed at creation; state is mutated only through the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    row: usize,
    col: usize,
    mine: bool,
    revealed: bool,
    flagged: bool,
    adjacent: u8, // Adjacent mine count (0-8), meaningful for non-mine cells
}

impl Cell {
    /// Create a hidden, unflagged, mine-free cell at (row, col)
    pub fn new(row: usize, col: usize) -> Self {
        Cell {
            row,
            col,
            mine: false,
            revealed: false,
            flagged: false,
            adjacent: 0,
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn is_mine(&self) -> bool {
        self.mine
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn is_flagged(&self) -> bool {
        self.flagged
    }

    pub fn adjacent_mines(&self) -> u8 {
        self.adjacent
    }

    pub(crate) fn set_mine(&mut self, mine: bool) {
        self.mine = mine;
    }

    pub(crate) fn set_adjacent_mines(&mut self, count: u8) {
        self.adjacent = count;
    }

    /// Mark revealed; a revealed cell never keeps its flag
    pub(crate) fn reveal(&mut self) {
        self.revealed = true;
        self.flagged = false;
    }

    /// Flip the flag on a hidden cell
    /// Returns the new flag state, or None if the cell is already revealed
    pub(crate) fn toggle_flag(&mut self) -> Option<bool> {
        if self.revealed {
            return None;
        }
        self.flagged = !self.flagged;
        Some(self.flagged)
    }

    /// Force the flag state of a hidden cell (no-op once revealed)
    pub(crate) fn set_flag(&mut self, value: bool) {
        if !self.revealed {
            self.flagged = value;
        }
    }
}
