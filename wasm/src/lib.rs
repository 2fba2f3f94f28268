use minesweeper_ai as ms;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn create_game(height: u8, width: u8, mines: u8) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let config = ms::GameConfig {
        height: height as usize,
        width: width as usize,
        mines: mines as usize,
        seed: None,
    };
    let game = ms::Game::from_config(&config, &mut rand::rng()).map_err(|e| e.to_string())?;
    game.serialize().map_err(|e| e.to_string())
}

#[wasm_bindgen]
pub fn validate(bts: Vec<u8>) -> Result<bool, String> {
    console_error_panic_hook::set_once();

    let game = ms::Game::deserialize(&bts).map_err(|e| e.to_string())?;
    Ok(game.check_win_condition())
}

/// The player probes a cell. The last byte is 0 if it was safe, 1 if it was a mine.
#[wasm_bindgen]
pub fn choose_cell(bts: Vec<u8>, row: usize, col: usize) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut game = ms::Game::deserialize(&bts).map_err(|e| e.to_string())?;
    let res = game
        .probe(ms::Cell { row, col })
        .map_err(|e| e.to_string())?;
    let mut xs = game.serialize().map_err(|e| e.to_string())?;
    xs.push(if res { 0 } else { 1 });
    Ok(xs)
}

/// The agent plays one move. Errors with `no_moves` if it has nothing left.
#[wasm_bindgen]
pub fn ai_move(bts: Vec<u8>) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut game = ms::Game::deserialize(&bts).map_err(|e| e.to_string())?;
    if game
        .play_turn(&mut rand::rng())
        .map_err(|e| e.to_string())?
        .is_none()
    {
        return Err("no_moves".to_string());
    }
    game.serialize().map_err(|e| e.to_string())
}

/// 0 playing, 1 won, 2 lost.
#[wasm_bindgen]
pub fn game_state(bts: Vec<u8>) -> Result<u8, String> {
    console_error_panic_hook::set_once();

    let game = ms::Game::deserialize(&bts).map_err(|e| e.to_string())?;
    Ok(match game.state() {
        ms::GameState::Playing => 0,
        ms::GameState::Won => 1,
        ms::GameState::Lost => 2,
    })
}

/// Row-major tiles: -1 hidden, -2 flagged, -3 exploded, otherwise the count.
#[wasm_bindgen]
pub fn get_cells(bts: Vec<u8>) -> Result<Vec<i8>, String> {
    console_error_panic_hook::set_once();

    let game = ms::Game::deserialize(&bts).map_err(|e| e.to_string())?;
    Ok(game
        .agent()
        .cells()
        .map(|cell| match game.tile(cell) {
            ms::Tile::Hidden => -1,
            ms::Tile::Flagged => -2,
            ms::Tile::Exploded => -3,
            ms::Tile::Revealed(n) => n as i8,
        })
        .collect())
}
