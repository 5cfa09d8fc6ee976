// Replay module for analyzing historical game states and debugging decision-making
//
// This module provides functionality to:
// 1. Parse JSONL debug logs
// 2. Replay the selector on historical states
// 3. Compare logged vs replayed moves
// 4. Generate analysis reports

use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::config::Config;
use crate::debug_logger::DebugLogEntry;
use crate::error::ReplayError;
use crate::pathfinder::Deadline;
use crate::selector::{MoveSelector, Outcome};
use crate::types::{Board, Direction};

/// Result of replaying a single turn
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub turn: i32,
    pub original_move: Direction,
    pub replayed_move: Direction,
    pub original_outcome: Outcome,
    pub replayed_outcome: Outcome,
    pub matches: bool,
    pub computation_time_us: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default, PartialEq)]
pub struct ReplayStats {
    pub total_turns: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for analyzing debug logs
pub struct ReplayEngine {
    selector: MoveSelector,
    verbose: bool,
}

impl ReplayEngine {
    /// Creates a new replay engine with the given configuration
    pub fn new(config: &Config, verbose: bool) -> Self {
        ReplayEngine {
            selector: MoveSelector::new(config),
            verbose,
        }
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(
        &self,
        log_path: P,
    ) -> Result<Vec<DebugLogEntry>, ReplayError> {
        let file = File::open(log_path.as_ref())?;
        Self::parse_entries(BufReader::new(file))
    }

    /// Parses JSONL entries, skipping blank lines
    pub fn parse_entries<R: BufRead>(reader: R) -> Result<Vec<DebugLogEntry>, ReplayError> {
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let entry: DebugLogEntry =
                serde_json::from_str(&line).map_err(|source| ReplayError::Json {
                    line: line_num + 1,
                    source,
                })?;
            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Replays the selector on a single board state
    /// Returns the chosen move, its outcome, and the computation time in microseconds
    pub fn replay_turn(
        &self,
        board: &Board,
        our_snake_id: &str,
    ) -> Result<(Direction, Outcome, u128), ReplayError> {
        let our_snake = board
            .snakes
            .iter()
            .find(|s| s.id == our_snake_id)
            .ok_or_else(|| ReplayError::SnakeNotFound(our_snake_id.to_string()))?;

        let start_time = Instant::now();
        let decision = self.selector.decide(board, our_snake, Deadline::none());
        let elapsed = start_time.elapsed().as_micros();

        Ok((decision.direction, decision.outcome, elapsed))
    }

    /// Replays a single log entry and compares the result
    pub fn replay_entry(&self, entry: &DebugLogEntry) -> Result<ReplayResult, ReplayError> {
        if self.verbose {
            info!("Replaying turn {}...", entry.turn);
        }

        let snake_id = if entry.you_id.is_empty() {
            entry
                .board
                .snakes
                .first()
                .map(|s| s.id.clone())
                .ok_or(ReplayError::NoSnakes)?
        } else {
            entry.you_id.clone()
        };

        let (replayed_move, replayed_outcome, computation_time_us) =
            self.replay_turn(&entry.board, &snake_id)?;
        let matches = entry.chosen_move == replayed_move;

        let result = ReplayResult {
            turn: entry.turn,
            original_move: entry.chosen_move,
            replayed_move,
            original_outcome: entry.outcome,
            replayed_outcome,
            matches,
            computation_time_us,
        };

        if self.verbose {
            if matches {
                info!(
                    "Turn {}: ✓ MATCH - {} ({}, time: {}µs)",
                    entry.turn,
                    replayed_move.as_str(),
                    replayed_outcome.as_str(),
                    computation_time_us
                );
            } else {
                warn!(
                    "Turn {}: ✗ MISMATCH - Original: {} ({}), Replayed: {} ({})",
                    entry.turn,
                    entry.chosen_move.as_str(),
                    entry.outcome.as_str(),
                    replayed_move.as_str(),
                    replayed_outcome.as_str()
                );
            }
        }

        Ok(result)
    }

    /// Replays all entries in a log file
    pub fn replay_all(&self, entries: &[DebugLogEntry]) -> Vec<ReplayResult> {
        let mut results = Vec::new();

        for entry in entries {
            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay turn {}: {}", entry.turn, e);
                }
            }
        }

        results
    }

    /// Replays specific turns from a log file
    pub fn replay_turns(
        &self,
        entries: &[DebugLogEntry],
        turn_numbers: &[i32],
    ) -> Result<Vec<ReplayResult>, ReplayError> {
        let mut results = Vec::new();

        for turn_num in turn_numbers {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn_num)
                .ok_or(ReplayError::TurnNotFound(*turn_num))?;

            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay turn {}: {}", turn_num, e);
                }
            }
        }

        Ok(results)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_turns = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_turns - matches;
        let match_rate = if total_turns > 0 {
            (matches as f64 / total_turns as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_turns,
            matches,
            mismatches,
            match_rate,
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Turns:    {}", stats.total_turns);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("═══════════════════════════════════════════════════════════\n");

        if !results.is_empty() {
            let avg_time: f64 = results.iter().map(|r| r.computation_time_us as f64).sum::<f64>()
                / results.len() as f64;
            println!("Average Computation Time:   {:.1}µs", avg_time);

            let outcomes = [
                Outcome::FoodPath,
                Outcome::SpaceRanked,
                Outcome::Emergency,
                Outcome::LastResort,
            ];
            for outcome in outcomes {
                let count = results.iter().filter(|r| r.replayed_outcome == outcome).count();
                println!("  {:<14} {}", outcome.as_str(), count);
            }
            println!();
        }

        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                println!(
                    "Turn {}: {} ({}) → {} ({})",
                    result.turn,
                    result.original_move.as_str(),
                    result.original_outcome.as_str(),
                    result.replayed_move.as_str(),
                    result.replayed_outcome.as_str()
                );
            }
            println!();
        }
    }

    /// Validates that specific expected moves were made
    pub fn validate_expected_moves(
        &self,
        entries: &[DebugLogEntry],
        expected_moves: &[(i32, Vec<Direction>)], // (turn, acceptable_moves)
    ) -> Result<(), ReplayError> {
        for (turn, acceptable) in expected_moves {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn)
                .ok_or(ReplayError::TurnNotFound(*turn))?;

            if !acceptable.contains(&entry.chosen_move) {
                return Err(ReplayError::UnexpectedMove {
                    turn: *turn,
                    expected: acceptable.iter().map(|d| d.as_str().to_string()).collect(),
                    actual: entry.chosen_move.as_str().to_string(),
                });
            }
        }

        Ok(())
    }
}
