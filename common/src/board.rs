use std::collections::HashSet;
use std::fmt;

use rand::Rng;

use crate::Cell;

/// The hidden mine layout. The agent only ever sees it through
/// [`is_mine`](Board::is_mine) and [`nearby_mines`](Board::nearby_mines).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Board {
    height: usize,
    width: usize,
    mines: HashSet<Cell>,
}

impl Board {
    /// Places `mines` mines uniformly at random.
    pub fn new<R: Rng + ?Sized>(
        height: usize,
        width: usize,
        mines: usize,
        rng: &mut R,
    ) -> anyhow::Result<Self> {
        check_dimensions(height, width, mines)?;

        let mut placed = HashSet::with_capacity(mines);
        while placed.len() != mines {
            placed.insert(Cell {
                row: rng.random_range(0..height),
                col: rng.random_range(0..width),
            });
        }
        Ok(Board {
            height,
            width,
            mines: placed,
        })
    }

    /// A board with a fixed layout, mostly useful for tests and replays.
    pub fn with_mines(
        height: usize,
        width: usize,
        mines: impl IntoIterator<Item = Cell>,
    ) -> anyhow::Result<Self> {
        let mines: HashSet<Cell> = mines.into_iter().collect();
        check_dimensions(height, width, mines.len())?;
        if let Some(cell) = mines.iter().find(|c| c.row >= height || c.col >= width) {
            anyhow::bail!("mine {cell} is outside the {height}x{width} board");
        }
        Ok(Board {
            height,
            width,
            mines,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn mine_count(&self) -> usize {
        self.mines.len()
    }

    pub fn mines(&self) -> &HashSet<Cell> {
        &self.mines
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    pub fn is_mine(&self, cell: Cell) -> bool {
        self.mines.contains(&cell)
    }

    /// Number of mines in the 3x3 block around `cell`, not counting the cell itself.
    pub fn nearby_mines(&self, cell: Cell) -> u8 {
        crate::neighbors(cell, self.height, self.width)
            .filter(|neighbor| self.mines.contains(neighbor))
            .count() as u8
    }

    /// All mines have been flagged, and nothing else has.
    pub fn won(&self, flagged: &HashSet<Cell>) -> bool {
        *flagged == self.mines
    }
}

fn check_dimensions(height: usize, width: usize, mines: usize) -> anyhow::Result<()> {
    if height == 0 || width == 0 {
        anyhow::bail!("board dimensions must be non-zero, got {height}x{width}");
    }
    if mines >= height * width {
        anyhow::bail!(
            "Total mines must be less than the number of cells on the board ({mines} >= {})",
            height * width
        );
    }
    Ok(())
}

/// Prints where the mines are.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = format!("{}-", "--".repeat(self.width));
        for row in 0..self.height {
            writeln!(f, "{rule}")?;
            for col in 0..self.width {
                let mark = if self.is_mine(Cell { row, col }) { 'X' } else { ' ' };
                write!(f, "|{mark}")?;
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "{rule}")
    }
}
