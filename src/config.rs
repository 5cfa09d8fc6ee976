// Configuration module for reading Snake.toml
// This module provides OOP-style configuration management for the Battlesnake bot

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::types::Direction;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub timing: TimingConfig,
    pub pathfinding: PathfindingConfig,
    pub move_generation: MoveGenerationConfig,
    pub selection: SelectionConfig,
    pub space: SpaceConfig,
    pub debug: DebugConfig,
}

/// Timing and performance constants
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TimingConfig {
    pub response_time_budget_ms: u64,
    pub network_overhead_ms: u64,
}

impl TimingConfig {
    /// Computes the effective computation budget
    pub fn effective_budget_ms(&self) -> u64 {
        self.response_time_budget_ms.saturating_sub(self.network_overhead_ms)
    }
}

/// A* cost model
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PathfindingConfig {
    /// Cost of an ordinary edge
    pub base_edge_cost: f64,
    /// Cost of an edge into a cell next to the head of a strictly shorter opponent
    pub attack_discount: f64,
    /// Node expansions between two deadline checks
    pub deadline_check_interval: usize,
}

/// Move generation constants
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MoveGenerationConfig {
    pub snake_min_body_length_for_neck: usize,
}

/// Fallback ordering used when nothing better is available
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SelectionConfig {
    pub emergency_order: Vec<Direction>,
    pub last_resort: Direction,
}

/// Flood-fill ranking
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SpaceConfig {
    pub parallel_ranking: bool,
    pub parallel_min_cells: usize,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Snake.toml configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads default configuration from Snake.toml in the project root
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::from_file("Snake.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Snake.toml
    pub fn default_hardcoded() -> Self {
        Config {
            timing: TimingConfig {
                response_time_budget_ms: 400,
                network_overhead_ms: 50,
            },
            pathfinding: PathfindingConfig {
                base_edge_cost: 1.0,
                attack_discount: 0.5,
                deadline_check_interval: 64,
            },
            move_generation: MoveGenerationConfig {
                snake_min_body_length_for_neck: 1,
            },
            selection: SelectionConfig {
                emergency_order: vec![
                    Direction::Right,
                    Direction::Left,
                    Direction::Down,
                    Direction::Up,
                ],
                last_resort: Direction::Down,
            },
            space: SpaceConfig {
                parallel_ranking: true,
                parallel_min_cells: 400,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "battlesnake_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!("Could not load Snake.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }

    /// Rejects settings the decision pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pf = &self.pathfinding;
        if pf.base_edge_cost.is_nan() || pf.base_edge_cost <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "pathfinding.base_edge_cost must be positive, got {}",
                pf.base_edge_cost
            )));
        }
        if pf.attack_discount.is_nan()
            || pf.attack_discount <= 0.0
            || pf.attack_discount > pf.base_edge_cost
        {
            return Err(ConfigError::Invalid(format!(
                "pathfinding.attack_discount must lie in (0, {}], got {}",
                pf.base_edge_cost, pf.attack_discount
            )));
        }
        if pf.deadline_check_interval == 0 {
            return Err(ConfigError::Invalid(
                "pathfinding.deadline_check_interval must be at least 1".to_string(),
            ));
        }

        let order = &self.selection.emergency_order;
        let is_permutation = order.len() == 4
            && Direction::all().iter().all(|dir| order.contains(dir));
        if !is_permutation {
            return Err(ConfigError::Invalid(format!(
                "selection.emergency_order must list each direction exactly once, got {:?}",
                order
            )));
        }

        Ok(())
    }
}
