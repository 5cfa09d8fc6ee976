// Welcome to
// __________         __    __  .__                               __
// \______   \_____ _/  |__/  |_|  |   ____   ______ ____ _____  |  | __ ____
//  |    |  _/\__  \\   __\   __\  | _/ __ \ /  ___//    \\__  \ |  |/ // __ \
//  |    |   \ / __ \|  |  |  | |  |_\  ___/ \___ \|   |  \/ __ \|    <\  ___/
//  |________/(______/__|  |__| |____/\_____>______>___|__(______/__|__\\_____>
//
// Endpoint-facing facade. The decision itself lives in `selector`.

use log::{info, warn};
use serde_json::{json, Value};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::debug_logger::DebugLogger;
use crate::pathfinder::Deadline;
use crate::selector::{Decision, MoveSelector};
use crate::types::{Battlesnake, Board, Direction, GameState};

/// Battlesnake Bot with OOP-style API
/// Takes static configuration dependencies and exposes methods corresponding to API endpoints
pub struct Bot {
    config: Config,
    selector: MoveSelector,
    logger: DebugLogger,
}

impl Bot {
    /// Creates a new Bot instance with the given configuration
    ///
    /// # Arguments
    /// * `config` - Static configuration that does not change during the bot's lifetime
    pub fn new(config: Config) -> Self {
        Self::with_logger(config, DebugLogger::disabled())
    }

    pub fn with_logger(config: Config, logger: DebugLogger) -> Self {
        let selector = MoveSelector::new(&config);
        Bot {
            config,
            selector,
            logger,
        }
    }

    /// Returns bot metadata and appearance
    /// Corresponds to GET / endpoint
    pub fn info(&self) -> Value {
        info!("INFO");

        json!({
            "apiversion": "1",
            "author": "astar-snake",
            "color": "#660066",
            "head": "gamer",
            "tail": "rbc-necktie",
        })
    }

    /// Called when a game starts
    /// Corresponds to POST /start endpoint
    pub fn start(&self, state: &GameState) {
        info!(
            "GAME START {} ({}x{}, {} snakes)",
            state.game.id,
            state.board.width,
            state.board.height,
            state.board.snakes.len()
        );
    }

    /// Called when a game ends
    /// Corresponds to POST /end endpoint
    pub fn end(&self, state: &GameState) {
        info!("GAME OVER {} after {} turns", state.game.id, state.turn);
    }

    /// Computes the move synchronously on the calling thread
    pub fn decide(&self, board: &Board, you: &Battlesnake, deadline: Deadline) -> Decision {
        self.selector.decide(board, you, deadline)
    }

    /// Computes and returns the next move
    /// Corresponds to POST /move endpoint
    ///
    /// The decision runs on tokio's blocking pool under the effective time
    /// budget. The safety-filtered emergency move is prepared up front and
    /// sent instead if the decision does not finish in time.
    pub async fn get_move(&self, state: &GameState) -> Direction {
        let start_time = Instant::now();
        let turn = state.turn;
        let budget = Duration::from_millis(self.config.timing.effective_budget_ms());

        info!("Turn {}: Computing move", turn);

        let fallback = self.selector.fallback(&state.board, &state.you);

        let selector = self.selector.clone();
        let board = state.board.clone();
        let you = state.you.clone();
        // Leave the search a margin inside the budget so it can still fall back
        let deadline = Deadline::at(start_time + budget * 4 / 5);

        let task = tokio::task::spawn_blocking(move || selector.decide(&board, &you, deadline));

        let (direction, outcome) = match tokio::time::timeout(budget, task).await {
            Ok(Ok(decision)) => (decision.direction, decision.outcome),
            Ok(Err(e)) => {
                warn!("Turn {}: decision task failed: {}", turn, e);
                (fallback.direction, fallback.outcome)
            }
            Err(_) => {
                warn!("Turn {}: decision exceeded {}ms budget", turn, budget.as_millis());
                (fallback.direction, fallback.outcome)
            }
        };

        info!(
            "Turn {}: Chose {} ({}, time: {}ms)",
            turn,
            direction.as_str(),
            outcome.as_str(),
            start_time.elapsed().as_millis()
        );

        self.logger
            .log_move(turn, &state.you.id, state.board.clone(), direction, outcome);

        direction
    }
}
