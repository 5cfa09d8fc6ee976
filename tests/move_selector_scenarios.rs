//! End-to-end move selection on hand-built positions, plus randomized invariants.

mod common;

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use astar_snake::config::Config;
use astar_snake::error::DecisionError;
use astar_snake::grid::Grid;
use astar_snake::pathfinder::Deadline;
use astar_snake::safety::{compute_safety, UnsafeReason};
use astar_snake::selector::{MoveSelector, Outcome};
use astar_snake::types::{Battlesnake, Board, Coord, Direction};
use common::{board, coords, snake};

fn selector() -> MoveSelector {
    MoveSelector::new(&Config::default_hardcoded())
}

#[test]
fn test_paths_straight_to_food() {
    let you = snake("me", &[(5, 5), (5, 4), (5, 3)]);
    let b = board(11, 11, vec![you.clone()], &[(8, 5)]);

    let decision = selector().decide(&b, &you, Deadline::none());
    assert_eq!(decision.direction, Direction::Right);
    assert_eq!(decision.outcome, Outcome::FoodPath);
    assert_eq!(decision.target, Some(Coord::new(8, 5)));
    assert_eq!(decision.path_cost, Some(3.0));
    assert_eq!(decision.fallback_cause, None);
}

/// Head at (5,5) wrapped by its own body so only Down stays open
fn coiled() -> Battlesnake {
    snake(
        "me",
        &[(5, 5), (4, 5), (4, 6), (5, 6), (6, 6), (6, 5), (6, 4), (6, 3)],
    )
}

#[test]
fn test_single_exit_is_taken_whatever_the_food() {
    let you = coiled();

    for food in [vec![(5, 9)], vec![], vec![(5, 0)]] {
        let b = board(11, 11, vec![you.clone()], &food);
        let decision = selector().decide(&b, &you, Deadline::none());

        assert_eq!(decision.safety.safe_moves(), vec![Direction::Down]);
        assert_eq!(decision.direction, Direction::Down, "food {:?}", food);
    }
}

#[test]
fn test_single_exit_without_food_is_space_ranked() {
    let you = coiled();
    let b = board(11, 11, vec![you.clone()], &[]);

    let decision = selector().decide(&b, &you, Deadline::none());
    assert_eq!(decision.outcome, Outcome::SpaceRanked);
    assert_eq!(decision.target, None);
    assert_eq!(decision.space_scores.len(), 1);
}

#[test]
fn test_food_guarded_by_equal_head_falls_back_to_space() {
    let you = snake("me", &[(5, 5), (5, 4), (5, 3)]);
    let rival = snake("rival", &[(6, 6), (7, 6), (8, 6)]);
    let b = board(11, 11, vec![you.clone(), rival], &[(6, 5)]);

    let decision = selector().decide(&b, &you, Deadline::none());
    assert_eq!(decision.safety.reason(Direction::Up), Some(UnsafeReason::HeadThreat));
    assert_eq!(decision.safety.reason(Direction::Right), Some(UnsafeReason::HeadThreat));
    assert_eq!(decision.direction, Direction::Left);
    assert_eq!(decision.outcome, Outcome::SpaceRanked);
    assert_eq!(decision.target, Some(Coord::new(6, 5)));
    assert!(matches!(
        decision.fallback_cause,
        Some(DecisionError::NoPathFound { .. })
    ));
}

#[test]
fn test_space_ranking_avoids_dead_end_pocket() {
    let you = snake("me", &[(0, 5), (0, 4), (0, 3)]);
    let other = snake(
        "other",
        &[(3, 8), (2, 8), (1, 8), (0, 8), (0, 7), (1, 7), (1, 6)],
    );
    let b = board(11, 11, vec![you.clone(), other], &[]);

    let decision = selector().decide(&b, &you, Deadline::none());
    assert_eq!(decision.direction, Direction::Right);
    assert_eq!(decision.outcome, Outcome::SpaceRanked);

    let up = decision
        .space_scores
        .iter()
        .find(|s| s.direction == Direction::Up)
        .map(|s| s.space);
    assert_eq!(up, Some(1));
}

#[test]
fn test_nearest_food_tie_goes_to_first_listed() {
    let you = snake("me", &[(5, 5), (5, 4), (5, 3)]);

    let b = board(11, 11, vec![you.clone()], &[(5, 8), (8, 5)]);
    let decision = selector().decide(&b, &you, Deadline::none());
    assert_eq!(decision.target, Some(Coord::new(5, 8)));
    assert_eq!(decision.direction, Direction::Up);

    let b = board(11, 11, vec![you.clone()], &[(8, 5), (5, 8)]);
    let decision = selector().decide(&b, &you, Deadline::none());
    assert_eq!(decision.target, Some(Coord::new(8, 5)));
    assert_eq!(decision.direction, Direction::Right);
}

#[test]
fn test_expired_deadline_goes_to_emergency_order() {
    let mut config = Config::default_hardcoded();
    config.pathfinding.deadline_check_interval = 1;
    let selector = MoveSelector::new(&config);

    let you = snake("me", &[(5, 5), (5, 4), (5, 3)]);
    let b = board(11, 11, vec![you.clone()], &[(8, 5)]);

    let decision = selector.decide(&b, &you, Deadline::after(Duration::ZERO));
    assert_eq!(decision.direction, Direction::Right);
    assert_eq!(decision.outcome, Outcome::Emergency);
    assert!(matches!(
        decision.fallback_cause,
        Some(DecisionError::DeadlineExceeded { .. })
    ));
}

#[test]
fn test_boxed_in_snake_gets_last_resort() {
    let you = snake("me", &[(0, 0), (0, 1), (0, 2)]);
    let other = snake(
        "other",
        &[(3, 3), (2, 3), (2, 2), (2, 1), (1, 1), (1, 0), (2, 0)],
    );
    let b = board(11, 11, vec![you.clone(), other], &[]);

    let decision = selector().decide(&b, &you, Deadline::none());
    assert_eq!(decision.direction, Direction::Down);
    assert_eq!(decision.outcome, Outcome::LastResort);
    assert_eq!(
        decision.fallback_cause,
        Some(DecisionError::NoSafeMoves { head: Coord::new(0, 0) })
    );
}

#[test]
fn test_last_resort_turns_away_from_neck() {
    // Neck directly below the head, every other side closed
    let you = snake("me", &[(0, 1), (0, 0), (1, 0)]);
    let other = snake("other", &[(3, 1), (2, 1), (1, 1), (1, 2), (0, 2), (0, 3)]);
    let b = board(11, 11, vec![you.clone(), other], &[]);

    let decision = selector().decide(&b, &you, Deadline::none());
    assert_eq!(decision.safety.reason(Direction::Down), Some(UnsafeReason::Reversal));
    assert_eq!(decision.direction, Direction::Up);
    assert_eq!(decision.outcome, Outcome::LastResort);
}

#[test]
fn test_missing_you_still_decides() {
    // Roster omits the controlled snake entirely
    let you = snake("me", &[(5, 5), (5, 4), (5, 3)]);
    let b = board(11, 11, vec![], &[(5, 7)]);

    let decision = selector().decide(&b, &you, Deadline::none());
    assert_eq!(decision.direction, Direction::Up);
    assert_eq!(decision.outcome, Outcome::FoodPath);
}

fn random_walk(rng: &mut StdRng, n: i32, len: usize) -> Vec<(i32, i32)> {
    let mut cells = vec![(rng.random_range(0..n), rng.random_range(0..n))];
    while cells.len() < len {
        let (x, y) = cells[cells.len() - 1];
        let dir = Direction::all()[rng.random_range(0..4)];
        let next = dir.apply(&Coord::new(x, y));
        if next.x >= 0 && next.x < n && next.y >= 0 && next.y < n {
            cells.push((next.x, next.y));
        }
    }
    // Walks grow from the tail end, so reverse to put the head first
    cells.reverse();
    cells
}

fn random_position(rng: &mut StdRng) -> (Board, Battlesnake) {
    let n = rng.random_range(5..12);
    let you_len = rng.random_range(1..8);
    let you = snake("me", &random_walk(rng, n, you_len));

    let mut snakes = vec![you.clone()];
    for i in 0..rng.random_range(0..4) {
        let len = rng.random_range(1..10);
        snakes.push(snake(&format!("opp-{}", i), &random_walk(rng, n, len)));
    }

    let food: Vec<(i32, i32)> = (0..rng.random_range(0..4))
        .map(|_| (rng.random_range(0..n), rng.random_range(0..n)))
        .collect();

    (board(n, n, snakes, &food), you)
}

#[test]
fn test_random_positions_respect_safety_and_never_reverse() {
    let mut rng = StdRng::seed_from_u64(2025);
    let selector = selector();

    for round in 0..300 {
        let (b, you) = random_position(&mut rng);
        let decision = selector.decide(&b, &you, Deadline::none());

        assert!(Direction::all().contains(&decision.direction));

        let grid = Grid::new(&b, &you);
        let head = you.body[0];
        let mask = compute_safety(&grid, head, grid.neck(1));
        assert_eq!(decision.safety, mask, "round {}", round);

        if mask.any_safe() {
            assert!(
                mask.is_safe(decision.direction),
                "round {}: {} chosen but unsafe ({:?})",
                round,
                decision.direction,
                decision.outcome
            );
        }

        if you.body.len() > 1 {
            assert_ne!(
                decision.direction.apply(&head),
                you.body[1],
                "round {}: reversed onto neck",
                round
            );
        }
    }
}

#[test]
fn test_decisions_are_deterministic() {
    let mut rng = StdRng::seed_from_u64(99);
    let selector = selector();

    for _ in 0..50 {
        let (b, you) = random_position(&mut rng);
        let first = selector.decide(&b, &you, Deadline::none());
        let second = selector.decide(&b, &you, Deadline::none());
        assert_eq!(first, second);
    }
}

#[test]
fn test_snapshot_round_trips_through_json() {
    let you = snake("me", &[(5, 5), (5, 4), (5, 3)]);
    let b = board(11, 11, vec![you.clone()], &[(8, 5)]);

    let json = serde_json::to_string(&b).unwrap();
    let parsed: Board = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.food, coords(&[(8, 5)]));

    let decision = selector().decide(&parsed, &you, Deadline::none());
    assert_eq!(decision.direction, Direction::Right);
}
