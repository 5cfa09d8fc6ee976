//! Error types for the decision pipeline, configuration, and replay tooling.

use thiserror::Error;

use crate::types::Coord;

/// Internal "no result" conditions of the decision pipeline.
///
/// None of these escape `MoveSelector::decide`; each one routes the selector
/// to its next fallback.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecisionError {
    #[error("no path from {from} to {to}")]
    NoPathFound { from: Coord, to: Coord },

    #[error("no safe moves from {head}")]
    NoSafeMoves { head: Coord },

    #[error("search deadline exceeded after {expanded} expansions")]
    DeadlineExceeded { expanded: usize },
}

/// Errors raised while loading or validating `Snake.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised by the replay engine.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse JSON on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("snake with id '{0}' not found in board state")]
    SnakeNotFound(String),

    #[error("no snakes found in board state")]
    NoSnakes,

    #[error("turn {0} not found in log file")]
    TurnNotFound(i32),

    #[error("turn {turn}: expected one of {expected:?}, but got {actual}")]
    UnexpectedMove {
        turn: i32,
        expected: Vec<String>,
        actual: String,
    },
}
