use std::collections::HashSet;

use crate::Cell;
use crate::sentence::Sentence;

/// Everything the agent knows for certain, plus the sentences it has not yet
/// been able to resolve.
///
/// No stored sentence ever mentions a cell in `mines` or `safes`: confirming a
/// fact immediately strips that cell from every sentence.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct KnowledgeBase {
    sentences: Vec<Sentence>,
    mines: HashSet<Cell>,
    safes: HashSet<Cell>,
}

/// Summary of one run of [`KnowledgeBase::saturate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Closure {
    /// Number of resolve + infer rounds, including the final quiet one.
    pub rounds: usize,
    /// Cells newly confirmed as mine or safe.
    pub facts: usize,
    /// Sentences stored by subset subtraction.
    pub derived: usize,
}

impl Closure {
    pub fn is_quiet(&self) -> bool {
        self.facts == 0 && self.derived == 0
    }
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn mines(&self) -> &HashSet<Cell> {
        &self.mines
    }

    pub fn safes(&self) -> &HashSet<Cell> {
        &self.safes
    }

    /// Stores a new sentence after stripping already-resolved cells from it.
    /// Returns `false` if nothing was stored (empty or duplicate).
    ///
    /// Facts the sentence implies are not extracted here; call
    /// [`saturate`](Self::saturate) afterwards.
    pub fn add_sentence(&mut self, mut sentence: Sentence) -> bool {
        self.prune(&mut sentence);
        if sentence.is_empty() || self.sentences.contains(&sentence) {
            return false;
        }
        tracing::trace!(%sentence, "sentence added");
        self.sentences.push(sentence);
        true
    }

    /// Confirms `cell` as a mine and strips it from every sentence.
    /// Returns `true` if this is new information.
    pub fn mark_mine(&mut self, cell: Cell) -> bool {
        if self.safes.contains(&cell) {
            tracing::warn!(%cell, "refusing to mark a confirmed safe cell as a mine");
            return false;
        }
        if !self.mines.insert(cell) {
            return false;
        }
        for sentence in &mut self.sentences {
            sentence.mark_mine(cell);
        }
        true
    }

    /// Confirms `cell` as safe and strips it from every sentence.
    /// Returns `true` if this is new information.
    pub fn mark_safe(&mut self, cell: Cell) -> bool {
        if self.mines.contains(&cell) {
            tracing::warn!(%cell, "refusing to mark a confirmed mine as safe");
            return false;
        }
        if !self.safes.insert(cell) {
            return false;
        }
        for sentence in &mut self.sentences {
            sentence.mark_safe(cell);
        }
        true
    }

    /// Runs fact extraction and subset subtraction alternately until a full
    /// round of both changes nothing.
    pub fn saturate(&mut self) -> Closure {
        let mut closure = Closure::default();
        loop {
            closure.rounds += 1;
            let resolved = self.resolve(&mut closure);
            let inferred = self.infer(&mut closure);
            if !resolved && !inferred {
                break;
            }
        }
        tracing::debug!(
            rounds = closure.rounds,
            facts = closure.facts,
            derived = closure.derived,
            sentences = self.sentences.len(),
            "knowledge saturated"
        );
        closure
    }

    /// Drops empty (and collapsed duplicate) sentences and confirms every cell
    /// a single sentence proves, repeating until a pass neither drops a
    /// sentence nor confirms a cell.
    fn resolve(&mut self, closure: &mut Closure) -> bool {
        let mut changed = false;
        loop {
            let before = self.sentences.len();
            let mut kept: Vec<Sentence> = Vec::with_capacity(before);
            for sentence in self.sentences.drain(..) {
                if !sentence.is_empty() && !kept.contains(&sentence) {
                    kept.push(sentence);
                }
            }
            self.sentences = kept;
            let dropped = self.sentences.len() != before;

            let mut mines = HashSet::new();
            let mut safes = HashSet::new();
            for sentence in &self.sentences {
                if let Some(cells) = sentence.known_mines() {
                    mines.extend(cells.iter().copied());
                } else if let Some(cells) = sentence.known_safes() {
                    safes.extend(cells.iter().copied());
                }
            }

            let mut confirmed = 0;
            for cell in mines {
                if self.mark_mine(cell) {
                    confirmed += 1;
                }
            }
            for cell in safes {
                if self.mark_safe(cell) {
                    confirmed += 1;
                }
            }
            closure.facts += confirmed;

            if !dropped && confirmed == 0 {
                return changed;
            }
            changed = true;
        }
    }

    /// Subset subtraction over a snapshot of the current sentences: for every
    /// `S1 ⊆ S2`, the cells only `S2` covers hold `S2.count - S1.count` mines.
    ///
    /// Derived sentences that prove facts are folded into the fact sets
    /// instead of being stored.
    fn infer(&mut self, closure: &mut Closure) -> bool {
        let snapshot = self.sentences.clone();
        let mut pending: Vec<Sentence> = Vec::new();

        for (i, subset) in snapshot.iter().enumerate() {
            for (j, superset) in snapshot.iter().enumerate() {
                if i == j || !subset.is_subset(superset) {
                    continue;
                }
                match subset.difference(superset) {
                    Some(derived) => {
                        if !derived.is_empty() && !pending.contains(&derived) {
                            tracing::trace!(%subset, %superset, %derived, "subset subtraction");
                            pending.push(derived);
                        }
                    }
                    None => {
                        tracing::warn!(%subset, %superset, "inconsistent counts, skipping pair");
                    }
                }
            }
        }

        let mut changed = false;
        for mut derived in pending {
            // Earlier folds in this batch may already resolve some cells.
            self.prune(&mut derived);
            if derived.is_empty() || self.sentences.contains(&derived) {
                continue;
            }

            if let Some(cells) = derived.known_mines() {
                for &cell in cells {
                    if self.mark_mine(cell) {
                        closure.facts += 1;
                        changed = true;
                    }
                }
            } else if let Some(cells) = derived.known_safes() {
                for &cell in cells {
                    if self.mark_safe(cell) {
                        closure.facts += 1;
                        changed = true;
                    }
                }
            } else {
                self.sentences.push(derived);
                closure.derived += 1;
                changed = true;
            }
        }
        changed
    }

    fn prune(&self, sentence: &mut Sentence) {
        let resolved: Vec<Cell> = sentence
            .cells()
            .iter()
            .copied()
            .filter(|cell| self.mines.contains(cell) || self.safes.contains(cell))
            .collect();
        for cell in resolved {
            if self.mines.contains(&cell) {
                sentence.mark_mine(cell);
            } else {
                sentence.mark_safe(cell);
            }
        }
    }
}
