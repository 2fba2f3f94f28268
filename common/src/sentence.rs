use std::collections::HashSet;
use std::fmt;

use itertools::Itertools;

use crate::Cell;

/// A logical statement about the board: exactly `count` of `cells` are mines.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Sentence {
    cells: HashSet<Cell>,
    count: usize,
}

impl Sentence {
    pub fn new(cells: impl IntoIterator<Item = Cell>, count: usize) -> Self {
        Sentence {
            cells: cells.into_iter().collect(),
            count,
        }
    }

    pub fn cells(&self) -> &HashSet<Cell> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Every cell is a mine when the count covers the whole set.
    pub fn known_mines(&self) -> Option<&HashSet<Cell>> {
        if self.count == self.cells.len() && self.count > 0 {
            Some(&self.cells)
        } else {
            None
        }
    }

    /// Every cell is safe when the count is zero.
    pub fn known_safes(&self) -> Option<&HashSet<Cell>> {
        if self.count == 0 && !self.cells.is_empty() {
            Some(&self.cells)
        } else {
            None
        }
    }

    pub fn mark_mine(&mut self, cell: Cell) {
        if self.cells.remove(&cell) {
            // Saturating: a mine outside the count means the input was inconsistent.
            self.count = self.count.saturating_sub(1);
        }
    }

    pub fn mark_safe(&mut self, cell: Cell) {
        self.cells.remove(&cell);
    }

    pub fn is_subset(&self, other: &Sentence) -> bool {
        self.cells.is_subset(&other.cells)
    }

    /// Subset subtraction: if `self ⊆ other`, the cells only `other` covers hold
    /// exactly `other.count - self.count` mines.
    ///
    /// Returns `None` when `self` is not a subset of `other`, or when the count
    /// would go negative (only possible with inconsistent observations).
    pub fn difference(&self, other: &Sentence) -> Option<Sentence> {
        if !self.is_subset(other) {
            return None;
        }
        let count = other.count.checked_sub(self.count)?;
        Some(Sentence {
            cells: other.cells.difference(&self.cells).copied().collect(),
            count,
        })
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}}} = {}",
            self.cells.iter().sorted().join(", "),
            self.count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(row: usize, col: usize) -> Cell {
        Cell { row, col }
    }

    #[test]
    fn test_zero_count_means_all_safe() {
        // A non-empty sentence with count 0 proves every cell safe and no mines
        let s = Sentence::new([c(0, 0), c(0, 1)], 0);
        assert_eq!(s.known_safes(), Some(&HashSet::from([c(0, 0), c(0, 1)])));
        assert_eq!(s.known_mines(), None);
    }

    #[test]
    fn test_full_count_means_all_mines() {
        // When count equals the number of cells every cell is a mine
        let s = Sentence::new([c(1, 1), c(1, 2)], 2);
        assert_eq!(s.known_mines(), Some(&HashSet::from([c(1, 1), c(1, 2)])));
        assert_eq!(s.known_safes(), None);
    }

    #[test]
    fn test_empty_sentence_has_no_conclusion() {
        // An empty sentence carries no information either way
        let s = Sentence::new([], 0);
        assert!(s.is_empty());
        assert_eq!(s.known_mines(), None);
        assert_eq!(s.known_safes(), None);
    }

    #[test]
    fn test_partial_count_has_no_conclusion() {
        let s = Sentence::new([c(0, 0), c(0, 1), c(0, 2)], 1);
        assert_eq!(s.known_mines(), None);
        assert_eq!(s.known_safes(), None);
    }

    #[test]
    fn test_mark_mine_is_idempotent() {
        // Marking the same mine twice only removes it and decrements once
        let mut once = Sentence::new([c(0, 0), c(0, 1), c(0, 2)], 2);
        once.mark_mine(c(0, 1));
        let mut twice = once.clone();
        twice.mark_mine(c(0, 1));

        assert_eq!(once, twice);
        assert_eq!(once.count(), 1);
        assert!(!once.cells().contains(&c(0, 1)));
    }

    #[test]
    fn test_mark_safe_is_idempotent() {
        // Marking a cell safe removes it without touching the count
        let mut once = Sentence::new([c(0, 0), c(0, 1)], 1);
        once.mark_safe(c(0, 0));
        let mut twice = once.clone();
        twice.mark_safe(c(0, 0));

        assert_eq!(once, twice);
        assert_eq!(once.count(), 1);
        assert_eq!(once.known_mines(), Some(&HashSet::from([c(0, 1)])));
    }

    #[test]
    fn test_marking_absent_cell_is_noop() {
        let original = Sentence::new([c(0, 0), c(0, 1)], 1);
        let mut s = original.clone();
        s.mark_mine(c(5, 5));
        s.mark_safe(c(5, 5));
        assert_eq!(s, original);
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        let a = Sentence::new([c(0, 0), c(0, 1)], 1);
        let b = Sentence::new([c(0, 1), c(0, 0)], 1);
        assert_eq!(a, b);
        assert_ne!(a, Sentence::new([c(0, 0), c(0, 1)], 2));
    }

    #[test]
    fn test_difference_of_subset() {
        // {A,B}=1 inside {A,B,C}=1 leaves {C}=0
        let small = Sentence::new([c(0, 0), c(0, 1)], 1);
        let large = Sentence::new([c(0, 0), c(0, 1), c(0, 2)], 1);

        let derived = small.difference(&large).unwrap();
        assert_eq!(derived, Sentence::new([c(0, 2)], 0));
        assert!(large.difference(&small).is_none());
    }

    #[test]
    fn test_difference_refuses_negative_count() {
        // Inconsistent counts must not underflow
        let small = Sentence::new([c(0, 0)], 1);
        let large = Sentence::new([c(0, 0), c(0, 1)], 0);
        assert!(small.difference(&large).is_none());
    }

    #[test]
    fn test_display_is_sorted() {
        let s = Sentence::new([c(1, 0), c(0, 2), c(0, 1)], 1);
        assert_eq!(s.to_string(), "{(0, 1), (0, 2), (1, 0)} = 1");
    }
}
