use std::collections::HashMap;
use std::fmt;

use rand::Rng;

use crate::agent::{Agent, Move};
use crate::board::Board;
use crate::config::GameConfig;
use crate::Cell;

/// Represents the current state of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

/// What the player can see of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Hidden,
    /// Hidden, but the agent has proven it is a mine.
    Flagged,
    Revealed(u8), // The u8 is the number of adjacent mines.
    /// The mine that ended the game.
    Exploded,
}

/// One move played by the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Turn {
    pub choice: Move,
    /// `false` if the move hit a mine.
    pub survived: bool,
}

/// An agent playing against a hidden board.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Game {
    board: Board,
    agent: Agent,
    revealed: HashMap<Cell, u8>,
    exploded: Option<Cell>,
    state: GameState,
}

impl Game {
    pub fn new(board: Board) -> Self {
        let agent = Agent::new(board.height(), board.width());
        Game {
            board,
            agent,
            revealed: HashMap::new(),
            exploded: None,
            state: GameState::Playing,
        }
    }

    /// Builds a random board from `config`.
    pub fn from_config<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> anyhow::Result<Self> {
        config.validate()?;
        let board = Board::new(config.height, config.width, config.mines, rng)?;
        Ok(Game::new(board))
    }

    /// Deserializes a game state from bytes.
    pub fn deserialize(bts: &[u8]) -> anyhow::Result<Self> {
        Ok(bcs::from_bytes(bts)?)
    }

    /// Serializes the game state to bytes.
    pub fn serialize(&self) -> anyhow::Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Every probed cell with the count it revealed.
    pub fn revealed(&self) -> &HashMap<Cell, u8> {
        &self.revealed
    }

    pub fn tile(&self, cell: Cell) -> Tile {
        if self.exploded == Some(cell) {
            Tile::Exploded
        } else if let Some(&count) = self.revealed.get(&cell) {
            Tile::Revealed(count)
        } else if self.agent.mines().contains(&cell) {
            Tile::Flagged
        } else {
            Tile::Hidden
        }
    }

    /// Reveals `cell` and tells the agent what it shows.
    ///
    /// Returns `Ok(false)` if the cell was a mine. Probing a cell that is
    /// already revealed is a no-op.
    pub fn probe(&mut self, cell: Cell) -> anyhow::Result<bool> {
        if !self.board.contains(cell) {
            anyhow::bail!("cell {cell} is outside the board");
        }
        if self.revealed.contains_key(&cell) {
            return Ok(true);
        }
        if self.state != GameState::Playing {
            anyhow::bail!("game_ended");
        }

        if self.board.is_mine(cell) {
            self.exploded = Some(cell);
            self.state = GameState::Lost;
            tracing::info!(%cell, moves = self.revealed.len(), "hit a mine");
            return Ok(false);
        }

        let count = self.board.nearby_mines(cell);
        self.revealed.insert(cell, count);
        let closure = self.agent.observe(cell, count);
        tracing::debug!(
            %cell,
            count,
            facts = closure.facts,
            mines = self.agent.mines().len(),
            safes = self.agent.safes().len(),
            "probed"
        );

        if self.check_win_condition() {
            self.state = GameState::Won;
            tracing::info!(moves = self.revealed.len(), "all mines located");
        }
        Ok(true)
    }

    /// Won once every mine is flagged or every safe cell is revealed.
    pub fn check_win_condition(&self) -> bool {
        let safe_cells = self.board.height() * self.board.width() - self.board.mine_count();
        self.board.won(self.agent.mines()) || self.revealed.len() == safe_cells
    }

    /// Lets the agent pick and play one move. `None` if it has nothing left to try.
    pub fn play_turn<R: Rng + ?Sized>(&mut self, rng: &mut R) -> anyhow::Result<Option<Turn>> {
        if self.state != GameState::Playing {
            anyhow::bail!("game_ended");
        }
        let Some(choice) = self.agent.choose_move(rng) else {
            return Ok(None);
        };
        if let Move::Random(cell) = choice {
            tracing::debug!(%cell, "no safe move known, guessing");
        }
        let survived = self.probe(choice.cell())?;
        Ok(Some(Turn { choice, survived }))
    }

    /// Plays turns until the game is decided or the agent runs out of moves.
    pub fn play_to_end<R: Rng + ?Sized>(&mut self, rng: &mut R) -> anyhow::Result<GameState> {
        while self.state == GameState::Playing {
            if self.play_turn(rng)?.is_none() {
                break;
            }
        }
        Ok(self.state)
    }
}

/// The player's view: `■` hidden, `F` flagged, `*` exploded, digits revealed.
impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for col in 0..self.board.width() {
            write!(f, "{:^3}", col)?;
        }
        writeln!(f, "\n  +{}", "---".repeat(self.board.width()))?;

        for row in 0..self.board.height() {
            write!(f, "{:^2}|", row)?;
            for col in 0..self.board.width() {
                match self.tile(Cell { row, col }) {
                    Tile::Hidden => write!(f, " ■ ")?,
                    Tile::Flagged => write!(f, " F ")?,
                    Tile::Exploded => write!(f, " * ")?,
                    Tile::Revealed(n) => write!(f, " {} ", n)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn c(row: usize, col: usize) -> Cell {
        Cell { row, col }
    }

    #[test]
    fn test_game_initialization() {
        // A fresh game is playing with nothing revealed
        let game = Game::new(Board::with_mines(5, 5, [c(0, 0), c(4, 4)]).unwrap());
        assert_eq!(game.state(), GameState::Playing);
        assert!(game.revealed().is_empty());
        for cell in crate::cells(5, 5) {
            assert_eq!(game.tile(cell), Tile::Hidden);
        }
    }

    #[test]
    fn test_probe_reveals_and_informs_agent() {
        let mut game = Game::new(Board::with_mines(1, 3, [c(0, 2)]).unwrap());
        assert!(game.probe(c(0, 1)).unwrap());

        assert_eq!(game.tile(c(0, 1)), Tile::Revealed(1));
        assert!(game.agent().moves_made().contains(&c(0, 1)));
    }

    #[test]
    fn test_hitting_mine() {
        let mut game = Game::new(Board::with_mines(2, 2, [c(1, 1)]).unwrap());
        assert!(!game.probe(c(1, 1)).unwrap());
        assert_eq!(game.state(), GameState::Lost);
        assert_eq!(game.tile(c(1, 1)), Tile::Exploded);

        // No further moves once the game has ended
        assert!(game.probe(c(0, 0)).is_err());
        assert!(game.play_turn(&mut StdRng::seed_from_u64(0)).is_err());
    }

    #[test]
    fn test_probe_outside_board() {
        let mut game = Game::new(Board::with_mines(2, 2, []).unwrap());
        assert!(game.probe(c(2, 0)).is_err());
    }

    #[test]
    fn test_reprobe_is_noop() {
        let mut game = Game::new(Board::with_mines(2, 3, [c(0, 2)]).unwrap());
        game.probe(c(1, 0)).unwrap();
        let before = game.revealed().clone();
        assert!(game.probe(c(1, 0)).unwrap());
        assert_eq!(game.revealed(), &before);
    }

    #[test]
    fn test_win_by_flagging_every_mine() {
        // 1x2 board: probing the safe cell proves the other one is a mine
        let mut game = Game::new(Board::with_mines(1, 2, [c(0, 1)]).unwrap());
        game.probe(c(0, 0)).unwrap();
        assert_eq!(game.state(), GameState::Won);
        assert_eq!(game.tile(c(0, 1)), Tile::Flagged);
    }

    #[test]
    fn test_agent_solves_opening_without_guessing() {
        // A zero on the left edge opens the board; the rest follows by deduction
        let mut game = Game::new(Board::with_mines(3, 4, [c(0, 3), c(2, 3)]).unwrap());
        game.probe(c(1, 0)).unwrap();
        let mut rng = StdRng::seed_from_u64(5);

        while game.state() == GameState::Playing {
            let turn = game.play_turn(&mut rng).unwrap().unwrap();
            assert!(matches!(turn.choice, Move::Safe(_)), "guessed at {:?}", turn.choice);
            assert!(turn.survived);
        }
        assert_eq!(game.state(), GameState::Won);
    }

    #[test]
    fn test_agent_facts_match_board() {
        // Every fact the agent proves must be true on the hidden board
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let config = GameConfig { height: 8, width: 8, mines: 10, seed: None };
            let mut game = Game::from_config(&config, &mut rng).unwrap();

            while game.state() == GameState::Playing {
                if game.play_turn(&mut rng).unwrap().is_none() {
                    break;
                }
                let agent = game.agent();
                assert!(agent.mines().is_disjoint(agent.safes()));
                for &mine in agent.mines() {
                    assert!(game.board().is_mine(mine), "seed {seed}: {mine} is not a mine");
                }
                for &safe in agent.safes() {
                    assert!(!game.board().is_mine(safe), "seed {seed}: {safe} is a mine");
                }
                for sentence in agent.knowledge().sentences() {
                    assert!(sentence.count() <= sentence.cells().len());
                }
            }
            assert_ne!(game.state(), GameState::Playing);
        }
    }

    #[test]
    fn test_lost_only_on_random_moves() {
        // Safe moves never explode; any loss must come from a guess
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let config = GameConfig { height: 6, width: 6, mines: 6, seed: None };
            let mut game = Game::from_config(&config, &mut rng).unwrap();
            while let Some(turn) = game.play_turn(&mut rng).unwrap() {
                if let Move::Safe(_) = turn.choice {
                    assert!(turn.survived);
                }
                if game.state() != GameState::Playing {
                    break;
                }
            }
        }
    }

    #[test]
    fn test_play_to_end_decides_game() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut game = Game::from_config(&GameConfig::default(), &mut rng).unwrap();
        let state = game.play_to_end(&mut rng).unwrap();

        assert_ne!(state, GameState::Playing);
        assert_eq!(state, game.state());
        if state == GameState::Won {
            assert!(game.check_win_condition());
        }
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut game = Game::new(Board::with_mines(3, 3, [c(2, 2)]).unwrap());
        game.probe(c(0, 0)).unwrap();

        let bytes = game.serialize().unwrap();
        let restored = Game::deserialize(&bytes).unwrap();

        assert_eq!(restored.state(), game.state());
        assert_eq!(restored.revealed(), game.revealed());
        assert_eq!(restored.agent(), game.agent());
        assert_eq!(restored.board(), game.board());
    }

    #[test]
    fn test_display_player_view() {
        let mut game = Game::new(Board::with_mines(1, 2, [c(0, 1)]).unwrap());
        game.probe(c(0, 0)).unwrap();
        let text = game.to_string();
        assert!(text.contains(" 1  F "));
    }
}
