use std::fmt;

pub mod agent;
pub mod board;
pub mod config;
pub mod game;
pub mod knowledge;
pub mod oracle;
pub mod sentence;

pub use agent::{Agent, Move};
pub use board::Board;
pub use config::GameConfig;
pub use game::{Game, GameState, Tile, Turn};
pub use knowledge::{Closure, KnowledgeBase};
pub use sentence::Sentence;

/// A 0-indexed `(row, col)` coordinate on the minesweeper board.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Cell { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Cell { row, col }
    }
}

/// Every cell of a `height` x `width` board, row by row.
pub fn cells(height: usize, width: usize) -> impl Iterator<Item = Cell> {
    itertools::iproduct!(0..height, 0..width).map(Cell::from)
}

/// All valid neighbor coordinates of `cell`, handling board edges and corners.
pub fn neighbors(cell: Cell, height: usize, width: usize) -> impl Iterator<Item = Cell> {
    (-1..=1).flat_map(move |dr: isize| {
        (-1..=1).filter_map(move |dc: isize| {
            // Skip the cell itself
            if dr == 0 && dc == 0 {
                return None;
            }

            let row = cell.row.checked_add_signed(dr)?;
            let col = cell.col.checked_add_signed(dc)?;
            if row < height && col < width {
                Some(Cell { row, col })
            } else {
                None
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_neighbors() {
        // Neighbor counts for corner, center and edge cells of a 3x3 board
        assert_eq!(neighbors(Cell::new(0, 0), 3, 3).count(), 3);
        assert_eq!(neighbors(Cell::new(1, 1), 3, 3).count(), 8);
        assert_eq!(neighbors(Cell::new(0, 1), 3, 3).count(), 5);
    }

    #[test]
    fn test_neighbors_exclude_cell_itself() {
        assert!(neighbors(Cell::new(1, 1), 3, 3).all(|n| n != Cell::new(1, 1)));
    }

    #[test]
    fn test_neighbors_on_single_row() {
        let found: Vec<Cell> = neighbors(Cell::new(0, 0), 1, 2).collect();
        assert_eq!(found, vec![Cell::new(0, 1)]);
    }

    #[test]
    fn test_cells_row_major() {
        let all: Vec<Cell> = cells(2, 2).collect();
        assert_eq!(
            all,
            vec![
                Cell::new(0, 0),
                Cell::new(0, 1),
                Cell::new(1, 0),
                Cell::new(1, 1)
            ]
        );
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::new(3, 4).to_string(), "(3, 4)");
    }
}
