use std::collections::HashSet;

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::Cell;
use crate::knowledge::{Closure, KnowledgeBase};
use crate::sentence::Sentence;

/// How the agent arrived at a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// The cell is proven safe.
    Safe(Cell),
    /// Nothing is proven; the cell was picked at random among the candidates.
    Random(Cell),
}

impl Move {
    pub fn cell(&self) -> Cell {
        match *self {
            Move::Safe(cell) | Move::Random(cell) => cell,
        }
    }
}

/// The minesweeper player. Feeds each observation into its knowledge base and
/// picks moves from what has been proven.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Agent {
    height: usize,
    width: usize,
    moves_made: HashSet<Cell>,
    knowledge: KnowledgeBase,
}

impl Agent {
    pub fn new(height: usize, width: usize) -> Self {
        Agent {
            height,
            width,
            moves_made: HashSet::new(),
            knowledge: KnowledgeBase::new(),
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn moves_made(&self) -> &HashSet<Cell> {
        &self.moves_made
    }

    pub fn mines(&self) -> &HashSet<Cell> {
        self.knowledge.mines()
    }

    pub fn safes(&self) -> &HashSet<Cell> {
        self.knowledge.safes()
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Records that `cell` was probed and borders `count` mines, then runs the
    /// knowledge base to a fixpoint.
    pub fn observe(&mut self, cell: Cell, count: u8) -> Closure {
        self.moves_made.insert(cell);
        self.knowledge.mark_safe(cell);

        let mut remaining = count as usize;
        let mut unknown = Vec::new();
        for neighbor in self.neighbors(cell) {
            if self.knowledge.mines().contains(&neighbor) {
                remaining = remaining.saturating_sub(1);
            } else if !self.knowledge.safes().contains(&neighbor) {
                unknown.push(neighbor);
            }
        }

        tracing::debug!(%cell, count, unknown = unknown.len(), "observed");
        if !unknown.is_empty() {
            self.knowledge.add_sentence(Sentence::new(unknown, remaining));
        }

        self.knowledge.saturate()
    }

    /// A proven-safe cell that has not been played yet. Does not mutate state.
    pub fn choose_safe_move(&self) -> Option<Cell> {
        // Lowest coordinate first so games replay identically from a seed.
        self.knowledge
            .safes()
            .difference(&self.moves_made)
            .min()
            .copied()
    }

    /// A uniformly random cell that is neither played nor a known mine.
    pub fn choose_random_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Cell> {
        let candidates: Vec<Cell> = self
            .cells()
            .filter(|cell| !self.moves_made.contains(cell) && !self.mines().contains(cell))
            .collect();
        candidates.choose(rng).copied()
    }

    /// Safe move if one is proven, otherwise a random one.
    pub fn choose_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Move> {
        self.choose_safe_move()
            .map(Move::Safe)
            .or_else(|| self.choose_random_move(rng).map(Move::Random))
    }

    /// Every cell on the board, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + use<> {
        crate::cells(self.height, self.width)
    }

    /// The up-to-eight cells around `cell`, clipped to the board.
    pub fn neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + use<> {
        crate::neighbors(cell, self.height, self.width)
    }
}
