//! Per-turn move selection.
//!
//! Pipeline: safety mask, then a food-directed A* step if one is safe, then
//! flood-fill ranking of the safe moves, then the emergency order. Every call
//! returns a move.

use log::{debug, warn};

use crate::config::Config;
use crate::error::DecisionError;
use crate::flood_fill::{best_by_space, score_moves, FillLimits, SpaceScore};
use crate::grid::Grid;
use crate::pathfinder::{nearest_food, CostModel, Deadline, Pathfinder};
use crate::safety::{compute_safety, SafetyMask, UnsafeReason};
use crate::simple_profiler::{Category, ProfileGuard};
use crate::types::{Battlesnake, Board, Coord, Direction};

/// Which branch of the pipeline produced the move
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    /// First step of an A* path to the nearest food
    FoodPath,
    /// Safe move with the most reachable space
    SpaceRanked,
    /// First safe move in the emergency order
    Emergency,
    /// No safe move at all
    LastResort,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::FoodPath => "food-path",
            Outcome::SpaceRanked => "space-ranked",
            Outcome::Emergency => "emergency",
            Outcome::LastResort => "last-resort",
        }
    }
}

/// The chosen move plus what led to it
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub direction: Direction,
    pub outcome: Outcome,
    pub safety: SafetyMask,
    pub target: Option<Coord>,
    pub path_cost: Option<f64>,
    pub space_scores: Vec<SpaceScore>,
    /// Condition that pushed the selector past the food path, if any
    pub fallback_cause: Option<DecisionError>,
}

impl Decision {
    fn new(direction: Direction, outcome: Outcome, safety: SafetyMask) -> Self {
        Decision {
            direction,
            outcome,
            safety,
            target: None,
            path_cost: None,
            space_scores: Vec::new(),
            fallback_cause: None,
        }
    }
}

/// Stateless move selector. One instance can serve any number of games.
#[derive(Debug, Clone)]
pub struct MoveSelector {
    costs: CostModel,
    deadline_check_interval: usize,
    min_body_length_for_neck: usize,
    emergency_order: Vec<Direction>,
    last_resort: Direction,
    parallel_ranking: bool,
    parallel_min_cells: usize,
}

impl MoveSelector {
    pub fn new(config: &Config) -> Self {
        MoveSelector {
            costs: CostModel::from(&config.pathfinding),
            deadline_check_interval: config.pathfinding.deadline_check_interval,
            min_body_length_for_neck: config.move_generation.snake_min_body_length_for_neck,
            emergency_order: config.selection.emergency_order.clone(),
            last_resort: config.selection.last_resort,
            parallel_ranking: config.space.parallel_ranking,
            parallel_min_cells: config.space.parallel_min_cells,
        }
    }

    /// Safety mask for `you`, or `None` if its body is empty
    pub fn safety(&self, board: &Board, you: &Battlesnake) -> Option<SafetyMask> {
        let grid = Grid::new(board, you);
        let head = grid.head()?;
        Some(compute_safety(&grid, head, grid.neck(self.min_body_length_for_neck)))
    }

    /// Move to send when the full decision cannot finish in time.
    ///
    /// Only runs the safety filter, then the emergency order.
    pub fn fallback(&self, board: &Board, you: &Battlesnake) -> Decision {
        match self.safety(board, you) {
            Some(mask) => self.emergency(mask),
            None => Decision::new(self.last_resort, Outcome::LastResort, SafetyMask::all_safe()),
        }
    }

    /// Chooses a move for `you` on `board`.
    pub fn decide(&self, board: &Board, you: &Battlesnake, deadline: Deadline) -> Decision {
        let _guard = ProfileGuard::new(Category::Decide);
        let grid = Grid::new(board, you);

        let Some(head) = grid.head() else {
            warn!("Snake '{}' has no body, using last resort", you.id);
            return Decision::new(self.last_resort, Outcome::LastResort, SafetyMask::all_safe());
        };

        let neck = grid.neck(self.min_body_length_for_neck);
        let mask = compute_safety(&grid, head, neck);

        if !mask.any_safe() {
            let mut decision = self.emergency(mask);
            decision.fallback_cause = Some(DecisionError::NoSafeMoves { head });
            return decision;
        }

        let mut fallback_cause = None;
        let mut target = None;

        if let Some(food) = nearest_food(grid.food(), &head) {
            target = Some(food);
            let pathfinder = Pathfinder::new(&grid, self.costs)
                .with_deadline(deadline, self.deadline_check_interval);

            match pathfinder.find_path(head, food) {
                Ok(path) => match path.first_step() {
                    Some(dir) if mask.is_safe(dir) => {
                        let mut decision = Decision::new(dir, Outcome::FoodPath, mask);
                        decision.target = Some(food);
                        decision.path_cost = Some(path.cost);
                        return decision;
                    }
                    Some(dir) => debug!("Path step {} toward {} is unsafe", dir, food),
                    None => debug!("Path toward {} has no first step", food),
                },
                Err(e @ DecisionError::DeadlineExceeded { .. }) => {
                    warn!("{}, falling back to emergency move", e);
                    let mut decision = self.emergency(mask);
                    decision.target = Some(food);
                    decision.fallback_cause = Some(e);
                    return decision;
                }
                Err(e) => {
                    debug!("{}", e);
                    fallback_cause = Some(e);
                }
            }
        }

        let safe = mask.safe_moves();
        let limits = FillLimits {
            parallel: self.parallel_ranking && grid.area() >= self.parallel_min_cells,
            deadline,
            check_interval: self.deadline_check_interval,
        };
        let scores = match score_moves(&grid, head, &safe, limits) {
            Ok(scores) => scores,
            Err(e) => {
                warn!("{} while ranking space, falling back to emergency move", e);
                let mut decision = self.emergency(mask);
                decision.target = target;
                decision.fallback_cause = Some(e);
                return decision;
            }
        };
        debug!(
            "Space scores: {}",
            scores
                .iter()
                .map(|s| format!("{}={}", s.direction, s.space))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut decision = match best_by_space(&scores) {
            Some(best) => Decision::new(best.direction, Outcome::SpaceRanked, mask),
            None => self.emergency(mask),
        };
        decision.target = target;
        decision.space_scores = scores;
        decision.fallback_cause = fallback_cause;
        decision
    }

    /// First safe move in the emergency order, else the last-resort direction.
    ///
    /// The last resort is flipped if it would reverse onto the neck, so a
    /// snake with a neck never turns back into itself.
    pub fn emergency(&self, mask: SafetyMask) -> Decision {
        match self.emergency_order.iter().find(|d| mask.is_safe(**d)) {
            Some(dir) => Decision::new(*dir, Outcome::Emergency, mask),
            None => {
                let dir = if mask.reason(self.last_resort) == Some(UnsafeReason::Reversal) {
                    self.last_resort.opposite()
                } else {
                    self.last_resort
                };
                Decision::new(dir, Outcome::LastResort, mask)
            }
        }
    }
}
