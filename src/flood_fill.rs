//! Reachable-space estimate used to rank moves without a food path.

use rayon::prelude::*;
use std::collections::VecDeque;

use crate::error::DecisionError;
use crate::grid::Grid;
use crate::pathfinder::Deadline;
use crate::simple_profiler::Category;
use crate::types::{Coord, Direction};

/// Counts cells reachable from `start` through open space, `start` included.
///
/// Open means in bounds and not covered by any snake segment. Tails count as
/// occupied here, so the estimate errs on the small side. `start` itself is
/// counted even when occupied, since it is the hypothetical next head.
pub fn reachable_space(grid: &Grid<'_>, start: Coord) -> usize {
    // An unbounded fill cannot hit its deadline
    reachable_space_until(grid, start, Deadline::none(), usize::MAX).unwrap_or(0)
}

/// Same count as [`reachable_space`], checking `deadline` every
/// `check_interval` dequeued cells.
///
/// # Errors
/// * `DeadlineExceeded` when the deadline passes mid-fill
pub fn reachable_space_until(
    grid: &Grid<'_>,
    start: Coord,
    deadline: Deadline,
    check_interval: usize,
) -> Result<usize, DecisionError> {
    crate::profile!(Category::FloodFill, {
        if !grid.in_bounds(&start) {
            return Ok(0);
        }

        let width = grid.width();
        let index = |c: &Coord| (c.y * width + c.x) as usize;
        let check_interval = check_interval.max(1);

        let mut visited = vec![false; grid.area()];
        let mut queue = VecDeque::new();
        visited[index(&start)] = true;
        queue.push_back(start);
        let mut count = 1;
        let mut dequeued = 0usize;

        while let Some(current) = queue.pop_front() {
            dequeued += 1;
            if dequeued % check_interval == 0 && deadline.expired() {
                return Err(DecisionError::DeadlineExceeded { expanded: dequeued });
            }

            for next in grid.neighbors(&current) {
                let idx = index(&next);
                if visited[idx] || grid.is_body(&next) {
                    continue;
                }
                visited[idx] = true;
                count += 1;
                queue.push_back(next);
            }
        }

        Ok(count)
    })
}

/// Flood-fill score of one candidate move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpaceScore {
    pub direction: Direction,
    pub space: usize,
}

/// Limits shared by every fill of one ranking pass
#[derive(Debug, Clone, Copy)]
pub struct FillLimits {
    pub parallel: bool,
    pub deadline: Deadline,
    pub check_interval: usize,
}

impl FillLimits {
    /// Sequential and without a deadline
    pub fn unbounded() -> Self {
        FillLimits {
            parallel: false,
            deadline: Deadline::none(),
            check_interval: usize::MAX,
        }
    }
}

/// Scores each candidate by the space reachable from the cell it leads to.
///
/// Results keep the order of `candidates`. With `limits.parallel` set the
/// fills run on the rayon pool.
///
/// # Errors
/// * `DeadlineExceeded` if any fill runs past `limits.deadline`
pub fn score_moves(
    grid: &Grid<'_>,
    head: Coord,
    candidates: &[Direction],
    limits: FillLimits,
) -> Result<Vec<SpaceScore>, DecisionError> {
    let score = |dir: &Direction| -> Result<SpaceScore, DecisionError> {
        let space =
            reachable_space_until(grid, dir.apply(&head), limits.deadline, limits.check_interval)?;
        Ok(SpaceScore {
            direction: *dir,
            space,
        })
    };

    if limits.parallel {
        candidates
            .par_iter()
            .map(|dir| {
                let s = score(dir);
                crate::simple_profiler::merge_thread_local();
                s
            })
            .collect()
    } else {
        candidates.iter().map(score).collect()
    }
}

/// Highest score; the earliest candidate wins ties.
pub fn best_by_space(scores: &[SpaceScore]) -> Option<SpaceScore> {
    let mut best: Option<SpaceScore> = None;
    for s in scores {
        if best.map(|b| s.space > b.space).unwrap_or(true) {
            best = Some(*s);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Battlesnake, Board};

    fn body(cells: &[(i32, i32)]) -> Vec<Coord> {
        cells.iter().map(|&(x, y)| Coord::new(x, y)).collect()
    }

    #[test]
    fn test_empty_board_is_fully_reachable() {
        let you = Battlesnake::from_body("me", vec![]);
        let board = Board {
            height: 7,
            width: 5,
            food: vec![],
            snakes: vec![],
            hazards: vec![],
        };
        let grid = Grid::new(&board, &you);
        assert_eq!(reachable_space(&grid, Coord::new(2, 3)), 35);
        assert_eq!(reachable_space(&grid, Coord::new(-1, 3)), 0);
    }

    #[test]
    fn test_wall_splits_board() {
        // Vertical wall at x = 2 on a 5x5 board
        let wall = Battlesnake::from_body("wall", body(&[(2, 0), (2, 1), (2, 2), (2, 3), (2, 4)]));
        let you = Battlesnake::from_body("me", body(&[(0, 0), (0, 1)]));
        let board = Board {
            height: 5,
            width: 5,
            food: vec![],
            snakes: vec![you.clone(), wall],
            hazards: vec![],
        };
        let grid = Grid::new(&board, &you);

        // Left side: 10 cells minus our own two segments, plus the start itself
        assert_eq!(reachable_space(&grid, Coord::new(1, 0)), 8);
        assert_eq!(reachable_space(&grid, Coord::new(3, 0)), 10);
    }

    #[test]
    fn test_tail_counts_as_occupied() {
        let you = Battlesnake::from_body("me", body(&[(1, 1), (1, 0), (0, 0)]));
        let board = Board {
            height: 3,
            width: 3,
            food: vec![],
            snakes: vec![you.clone()],
            hazards: vec![],
        };
        let grid = Grid::new(&board, &you);

        // 9 cells, 3 occupied
        assert_eq!(reachable_space(&grid, Coord::new(2, 1)), 6);
    }

    #[test]
    fn test_best_by_space_first_seen_wins_ties() {
        let scores = vec![
            SpaceScore { direction: Direction::Up, space: 4 },
            SpaceScore { direction: Direction::Left, space: 9 },
            SpaceScore { direction: Direction::Right, space: 9 },
        ];
        assert_eq!(best_by_space(&scores).map(|s| s.direction), Some(Direction::Left));
        assert_eq!(best_by_space(&[]), None);
    }

    #[test]
    fn test_parallel_scores_match_sequential() {
        let you = Battlesnake::from_body("me", body(&[(5, 5), (5, 4), (5, 3)]));
        let board = Board {
            height: 11,
            width: 11,
            food: vec![],
            snakes: vec![you.clone()],
            hazards: vec![],
        };
        let grid = Grid::new(&board, &you);
        let candidates = [Direction::Up, Direction::Left, Direction::Right];

        let parallel = FillLimits {
            parallel: true,
            ..FillLimits::unbounded()
        };
        assert_eq!(
            score_moves(&grid, Coord::new(5, 5), &candidates, parallel).unwrap(),
            score_moves(&grid, Coord::new(5, 5), &candidates, FillLimits::unbounded()).unwrap()
        );
    }

    #[test]
    fn test_expired_deadline_stops_the_fill() {
        let you = Battlesnake::from_body("me", body(&[(20, 20), (20, 19), (20, 18)]));
        let board = Board {
            height: 41,
            width: 41,
            food: vec![],
            snakes: vec![you.clone()],
            hazards: vec![],
        };
        let grid = Grid::new(&board, &you);
        let expired = Deadline::after(std::time::Duration::ZERO);

        assert_eq!(
            reachable_space_until(&grid, Coord::new(20, 21), expired, 1),
            Err(DecisionError::DeadlineExceeded { expanded: 1 })
        );
        assert_eq!(
            reachable_space_until(&grid, Coord::new(20, 21), Deadline::none(), 1),
            Ok(41 * 41 - 3)
        );

        let limits = FillLimits {
            parallel: true,
            deadline: expired,
            check_interval: 1,
        };
        let candidates = [Direction::Up, Direction::Left];
        let result = score_moves(&grid, Coord::new(20, 20), &candidates, limits);
        assert!(matches!(result, Err(DecisionError::DeadlineExceeded { .. })));
    }
}
