//! A* search from the head to a food cell.
//!
//! The search runs over the four-connected grid with a Manhattan heuristic.
//! Cells next to the head of an opponent at least as long as us are never
//! generated. Cells next to the head of a strictly shorter opponent are
//! entered at a discounted cost so the path prefers to crowd weaker snakes.

use log::debug;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use crate::config::PathfindingConfig;
use crate::error::DecisionError;
use crate::grid::Grid;
use crate::simple_profiler::Category;
use crate::types::{Coord, Direction};

/// Wall-clock cutoff for a search. `Deadline::none()` never expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    pub fn none() -> Self {
        Deadline(None)
    }

    pub fn at(instant: Instant) -> Self {
        Deadline(Some(instant))
    }

    pub fn after(budget: Duration) -> Self {
        Deadline(Some(Instant::now() + budget))
    }

    pub fn expired(&self) -> bool {
        self.0.map(|t| Instant::now() >= t).unwrap_or(false)
    }
}

/// Edge costs used by the search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    pub base_edge_cost: f64,
    pub attack_discount: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        CostModel {
            base_edge_cost: 1.0,
            attack_discount: 0.5,
        }
    }
}

impl From<&PathfindingConfig> for CostModel {
    fn from(config: &PathfindingConfig) -> Self {
        CostModel {
            base_edge_cost: config.base_edge_cost,
            attack_discount: config.attack_discount,
        }
    }
}

/// A found path, start first and target last
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub cells: Vec<Coord>,
    pub cost: f64,
}

impl Path {
    /// Direction of the first step out of the start cell, if the path has one
    pub fn first_step(&self) -> Option<Direction> {
        match self.cells.as_slice() {
            [from, to, ..] => Direction::between(from, to),
            _ => None,
        }
    }

    /// Number of moves along the path
    pub fn steps(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }
}

/// Entry in the open set. Ordered so that `BinaryHeap` pops the lowest f,
/// then the earliest insertion.
#[derive(Debug, Clone, Copy)]
struct OpenNode {
    f: f64,
    seq: u64,
    g: f64,
    cell: Coord,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Closest food by Manhattan distance; the first one listed wins ties.
pub fn nearest_food(food: &[Coord], from: &Coord) -> Option<Coord> {
    food.iter().min_by_key(|f| f.manhattan(from)).copied()
}

/// A* searcher bound to one turn's grid
pub struct Pathfinder<'g, 'a> {
    grid: &'g Grid<'a>,
    costs: CostModel,
    deadline: Deadline,
    check_interval: usize,
}

impl<'g, 'a> Pathfinder<'g, 'a> {
    pub fn new(grid: &'g Grid<'a>, costs: CostModel) -> Self {
        Pathfinder {
            grid,
            costs,
            deadline: Deadline::none(),
            check_interval: 64,
        }
    }

    /// Aborts the search once `deadline` passes, checking every `interval` expansions
    pub fn with_deadline(mut self, deadline: Deadline, interval: usize) -> Self {
        self.deadline = deadline;
        self.check_interval = interval.max(1);
        self
    }

    fn index(&self, c: &Coord) -> usize {
        (c.y * self.grid.width() + c.x) as usize
    }

    /// A cell may be entered if it is free of bodies (tail exception relative
    /// to whether the target is food) and not next to a stronger head.
    fn passable(&self, cell: &Coord, target_is_food: bool) -> bool {
        !self.grid.is_blocked(cell, target_is_food) && !self.grid.threatened_by_head(cell)
    }

    fn edge_cost(&self, cell: &Coord) -> f64 {
        if self.grid.next_to_weaker_head(cell) {
            self.costs.attack_discount
        } else {
            self.costs.base_edge_cost
        }
    }

    /// Finds the cheapest path from `start` to `target`.
    ///
    /// # Errors
    /// * `NoPathFound` when the frontier empties before reaching `target`
    /// * `DeadlineExceeded` when the deadline passes mid-search
    pub fn find_path(&self, start: Coord, target: Coord) -> Result<Path, DecisionError> {
        crate::profile!(Category::Astar, { self.search(start, target) })
    }

    fn search(&self, start: Coord, target: Coord) -> Result<Path, DecisionError> {
        let no_path = DecisionError::NoPathFound {
            from: start,
            to: target,
        };
        if !self.grid.in_bounds(&start) || !self.grid.in_bounds(&target) {
            return Err(no_path);
        }

        let target_is_food = self.grid.is_food(&target);
        let area = self.grid.area();
        let mut g_score = vec![f64::INFINITY; area];
        let mut came_from: Vec<Option<Coord>> = vec![None; area];
        let mut open = BinaryHeap::new();
        let mut seq = 0u64;
        let mut expanded = 0usize;

        g_score[self.index(&start)] = 0.0;
        open.push(OpenNode {
            f: start.manhattan(&target) as f64,
            seq,
            g: 0.0,
            cell: start,
        });

        while let Some(node) = open.pop() {
            if node.cell == target {
                let path = self.reconstruct(&came_from, start, target, node.g);
                debug!(
                    "A* reached {} in {} steps (cost {:.1}, {} expansions)",
                    target,
                    path.steps(),
                    path.cost,
                    expanded
                );
                return Ok(path);
            }

            // Stale entry superseded by a cheaper push
            if node.g > g_score[self.index(&node.cell)] {
                continue;
            }

            expanded += 1;
            if expanded % self.check_interval == 0 && self.deadline.expired() {
                return Err(DecisionError::DeadlineExceeded { expanded });
            }

            for next in self.grid.neighbors(&node.cell) {
                if !self.passable(&next, target_is_food) {
                    continue;
                }

                let tentative = node.g + self.edge_cost(&next);
                let idx = self.index(&next);
                if tentative < g_score[idx] {
                    g_score[idx] = tentative;
                    came_from[idx] = Some(node.cell);
                    seq += 1;
                    open.push(OpenNode {
                        f: tentative + next.manhattan(&target) as f64,
                        seq,
                        g: tentative,
                        cell: next,
                    });
                }
            }
        }

        debug!("A* exhausted frontier after {} expansions", expanded);
        Err(no_path)
    }

    fn reconstruct(
        &self,
        came_from: &[Option<Coord>],
        start: Coord,
        target: Coord,
        cost: f64,
    ) -> Path {
        let mut cells = vec![target];
        let mut current = target;
        while current != start {
            match came_from[self.index(&current)] {
                Some(prev) => {
                    cells.push(prev);
                    current = prev;
                }
                None => break,
            }
        }
        cells.reverse();
        Path { cells, cost }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Battlesnake, Board};

    fn empty_board(width: i32, height: i32, food: Vec<Coord>) -> Board {
        Board {
            height,
            width,
            food,
            snakes: vec![],
            hazards: vec![],
        }
    }

    #[test]
    fn test_open_set_pops_lowest_f_then_oldest() {
        let mut heap = BinaryHeap::new();
        let cell = Coord::new(0, 0);
        heap.push(OpenNode { f: 3.0, seq: 0, g: 0.0, cell });
        heap.push(OpenNode { f: 2.5, seq: 1, g: 0.0, cell });
        heap.push(OpenNode { f: 2.5, seq: 2, g: 0.0, cell });

        assert_eq!(heap.pop().map(|n| n.seq), Some(1));
        assert_eq!(heap.pop().map(|n| n.seq), Some(2));
        assert_eq!(heap.pop().map(|n| n.seq), Some(0));
    }

    #[test]
    fn test_nearest_food_first_wins_ties() {
        let food = vec![Coord::new(3, 0), Coord::new(0, 3), Coord::new(1, 1)];
        assert_eq!(nearest_food(&food, &Coord::new(0, 0)), Some(Coord::new(1, 1)));

        let tied = vec![Coord::new(2, 0), Coord::new(0, 2)];
        assert_eq!(nearest_food(&tied, &Coord::new(0, 0)), Some(Coord::new(2, 0)));
        assert_eq!(nearest_food(&[], &Coord::new(0, 0)), None);
    }

    #[test]
    fn test_straight_line_on_empty_board() {
        let target = Coord::new(3, 0);
        let you = Battlesnake::from_body("me", vec![Coord::new(0, 0)]);
        let board = empty_board(11, 11, vec![target]);
        let grid = Grid::new(&board, &you);

        let path = Pathfinder::new(&grid, CostModel::default())
            .find_path(Coord::new(0, 0), target)
            .unwrap();

        assert_eq!(path.first_step(), Some(Direction::Right));
        assert_eq!(path.steps(), 3);
        assert_eq!(path.cost, 3.0);
    }

    #[test]
    fn test_start_equals_target_has_no_step() {
        let you = Battlesnake::from_body("me", vec![Coord::new(2, 2)]);
        let board = empty_board(5, 5, vec![]);
        let grid = Grid::new(&board, &you);

        let path = Pathfinder::new(&grid, CostModel::default())
            .find_path(Coord::new(2, 2), Coord::new(2, 2))
            .unwrap();
        assert_eq!(path.first_step(), None);
        assert_eq!(path.steps(), 0);
    }

    #[test]
    fn test_expired_deadline_aborts() {
        let you = Battlesnake::from_body("me", vec![Coord::new(0, 0)]);
        let board = empty_board(25, 25, vec![Coord::new(24, 24)]);
        let grid = Grid::new(&board, &you);

        let result = Pathfinder::new(&grid, CostModel::default())
            .with_deadline(Deadline::at(Instant::now()), 1)
            .find_path(Coord::new(0, 0), Coord::new(24, 24));

        assert!(matches!(result, Err(DecisionError::DeadlineExceeded { .. })));
    }

    #[test]
    fn test_deadline_none_never_expires() {
        assert!(!Deadline::none().expired());
        assert!(!Deadline::after(Duration::from_secs(60)).expired());
    }
}
