// Shared builders for integration tests
#![allow(dead_code)]

use astar_snake::types::{Battlesnake, Board, Coord, Game, GameState};

pub fn coords(cells: &[(i32, i32)]) -> Vec<Coord> {
    cells.iter().map(|&(x, y)| Coord::new(x, y)).collect()
}

pub fn snake(id: &str, cells: &[(i32, i32)]) -> Battlesnake {
    Battlesnake::from_body(id, coords(cells))
}

pub fn board(width: i32, height: i32, snakes: Vec<Battlesnake>, food: &[(i32, i32)]) -> Board {
    Board {
        height,
        width,
        food: coords(food),
        snakes,
        hazards: vec![],
    }
}

pub fn game_state(turn: i32, board: Board, you_id: &str) -> GameState {
    let you = board
        .snakes
        .iter()
        .find(|s| s.id == you_id)
        .cloned()
        .expect("you must be on the board");

    GameState {
        game: Game {
            id: "test-game".to_string(),
            ruleset: Default::default(),
            timeout: 500,
            source: "test".to_string(),
        },
        turn,
        board,
        you,
    }
}
