//! Independent check of the agent's deductions with a SAT solver.
//!
//! Every revealed count becomes an "exactly k of these neighbors are mines"
//! constraint and every revealed cell is pinned safe. A hidden cell is forced
//! if only one of its two assignments is satisfiable. Anything the agent
//! claims must be forced; cells that are forced but unknown to the agent show
//! where subset subtraction alone falls short.

use std::collections::HashMap;

use itertools::Itertools;
use varisat::{CnfFormula, ExtendFormula, Lit, Solver, Var};

use crate::agent::Agent;
use crate::Cell;

/// The possible outcomes of the solver's analysis for a single hidden cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeducedState {
    ForcedMine,   // All valid solutions require this cell to be a mine.
    ForcedSafe,   // All valid solutions require this cell to be safe.
    Undetermined, // Valid solutions exist for this cell being either a mine or safe.
}

/// Result of [`audit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Audit {
    /// Number of cells the agent claims to know.
    pub checked: usize,
    /// Agent facts the observations do not force. Always empty for a sound agent.
    pub unsound: Vec<Cell>,
    /// Forced cells the agent has not deduced.
    pub missed: Vec<Cell>,
}

impl Audit {
    pub fn is_sound(&self) -> bool {
        self.unsound.is_empty()
    }
}

/// Compares the agent's fact sets against what `revealed` logically forces.
pub fn audit(agent: &Agent, revealed: &HashMap<Cell, u8>) -> anyhow::Result<Audit> {
    let deductions = deduce(agent, revealed)?;

    let mut report = Audit {
        checked: agent.mines().len() + agent.safes().len(),
        ..Audit::default()
    };
    for (&cell, &state) in deductions.iter().sorted_by_key(|(cell, _)| **cell) {
        let known_mine = agent.mines().contains(&cell);
        let known_safe = agent.safes().contains(&cell);
        match state {
            DeducedState::ForcedMine if known_safe => report.unsound.push(cell),
            DeducedState::ForcedSafe if known_mine => report.unsound.push(cell),
            DeducedState::Undetermined if known_mine || known_safe => report.unsound.push(cell),
            DeducedState::ForcedMine | DeducedState::ForcedSafe if !known_mine && !known_safe => {
                report.missed.push(cell)
            }
            _ => {}
        }
    }

    tracing::debug!(
        checked = report.checked,
        unsound = report.unsound.len(),
        missed = report.missed.len(),
        "audit finished"
    );
    Ok(report)
}

/// Deduces the state of every cell that has not been revealed.
pub fn deduce(
    agent: &Agent,
    revealed: &HashMap<Cell, u8>,
) -> anyhow::Result<HashMap<Cell, DeducedState>> {
    let mut solver = Solver::new();
    let mut var_map: HashMap<Cell, Var> = HashMap::new();

    // 1. One SAT variable per cell; true means mine.
    for cell in agent.cells() {
        var_map.insert(cell, solver.new_var());
    }
    let mine = |cell: &Cell| Lit::from_var(var_map[cell], true);

    // 2. Revealed cells are safe and carry an exactly-k constraint.
    let mut formula = CnfFormula::new();
    for (cell, &count) in revealed {
        formula.add_clause(&[!mine(cell)]);
        let lits: Vec<Lit> = agent.neighbors(*cell).map(|n| mine(&n)).collect();
        encode_exactly_k_to_formula(&mut formula, &lits, count as usize);
    }
    solver.add_formula(&formula);

    if !solver.solve()? {
        anyhow::bail!("solve_fail");
    }

    // 3. Test both assignments for every hidden cell.
    let mut deductions = HashMap::new();
    for (&cell, &var) in &var_map {
        if revealed.contains_key(&cell) {
            continue;
        }
        let mine_possible = satisfiable_with(&mut solver, Lit::from_var(var, true))?;
        let safe_possible = satisfiable_with(&mut solver, Lit::from_var(var, false))?;

        let state = match (mine_possible, safe_possible) {
            (true, true) => DeducedState::Undetermined,
            (true, false) => DeducedState::ForcedMine,
            (false, true) => DeducedState::ForcedSafe,
            (false, false) => anyhow::bail!("state_collision"),
        };
        deductions.insert(cell, state);
    }
    Ok(deductions)
}

fn satisfiable_with(solver: &mut Solver, assumption: Lit) -> anyhow::Result<bool> {
    solver.assume(&[assumption]);
    let result = solver.solve();
    // Clear assumptions for the next test.
    solver.assume(&[]);
    Ok(result?)
}

/// Encodes an "exactly k" constraint into the CNF formula.
///
/// Neighborhoods have at most eight cells, so the naive combination encoding
/// stays small.
fn encode_exactly_k_to_formula(formula: &mut CnfFormula, vars: &[Lit], k: usize) {
    encode_at_most_k_to_formula(formula, vars, k);
    encode_at_least_k_to_formula(formula, vars, k);
}

/// Every group of k + 1 literals has at least one false.
fn encode_at_most_k_to_formula(formula: &mut CnfFormula, vars: &[Lit], k: usize) {
    if k >= vars.len() {
        return; // Always satisfiable.
    }
    for combo in vars.iter().copied().combinations(k + 1) {
        let clause: Vec<Lit> = combo.iter().map(|&lit| !lit).collect();
        formula.add_clause(&clause);
    }
}

/// Every group of n - k + 1 literals has at least one true.
fn encode_at_least_k_to_formula(formula: &mut CnfFormula, vars: &[Lit], k: usize) {
    if k == 0 {
        return; // Always satisfied.
    }
    if k > vars.len() {
        // Unsatisfiable - add empty clause.
        formula.add_clause(&[]);
        return;
    }
    for combo in vars.iter().copied().combinations(vars.len() - k + 1) {
        formula.add_clause(&combo);
    }
}
