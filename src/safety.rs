//! Per-move survivability check for the current turn.
//!
//! Every candidate move is tested against four independent rules: no
//! reversal onto the neck, stay on the board, no body collision (with the
//! tail exception), and no cell next to the head of an opponent that would
//! win or tie a head-to-head.

use log::debug;

use crate::grid::Grid;
use crate::simple_profiler::{Category, ProfileGuard};
use crate::types::{Coord, Direction};

/// First rule a move failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsafeReason {
    Reversal,
    OutOfBounds,
    Collision,
    HeadThreat,
}

impl UnsafeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnsafeReason::Reversal => "reversal",
            UnsafeReason::OutOfBounds => "out-of-bounds",
            UnsafeReason::Collision => "collision",
            UnsafeReason::HeadThreat => "head-threat",
        }
    }
}

/// Safety verdict for each of the four moves, indexed by `Direction::index()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SafetyMask {
    verdicts: [Option<UnsafeReason>; 4],
}

impl SafetyMask {
    /// Mask with every move marked safe
    pub fn all_safe() -> Self {
        Self::default()
    }

    pub fn is_safe(&self, dir: Direction) -> bool {
        self.verdicts[dir.index()].is_none()
    }

    pub fn reason(&self, dir: Direction) -> Option<UnsafeReason> {
        self.verdicts[dir.index()]
    }

    /// Keeps the first failing rule for a move
    pub fn mark_unsafe(&mut self, dir: Direction, reason: UnsafeReason) {
        let slot = &mut self.verdicts[dir.index()];
        if slot.is_none() {
            *slot = Some(reason);
        }
    }

    /// Safe moves in `Direction::all()` order
    pub fn safe_moves(&self) -> Vec<Direction> {
        Direction::all()
            .into_iter()
            .filter(|d| self.is_safe(*d))
            .collect()
    }

    pub fn any_safe(&self) -> bool {
        self.verdicts.iter().any(Option::is_none)
    }
}

/// Which way the neck lies from the head, comparing x before y.
fn reversal_direction(head: &Coord, neck: &Coord) -> Option<Direction> {
    if neck.x < head.x {
        Some(Direction::Left)
    } else if neck.x > head.x {
        Some(Direction::Right)
    } else if neck.y < head.y {
        Some(Direction::Down)
    } else if neck.y > head.y {
        Some(Direction::Up)
    } else {
        None
    }
}

/// Computes the safety mask for the controlled snake's head.
///
/// `neck` is `None` when the body is too short to have one, in which case the
/// reversal rule does not apply.
pub fn compute_safety(grid: &Grid<'_>, head: Coord, neck: Option<Coord>) -> SafetyMask {
    let _guard = ProfileGuard::new(Category::Safety);
    let mut mask = SafetyMask::all_safe();

    if let Some(dir) = neck.and_then(|n| reversal_direction(&head, &n)) {
        mask.mark_unsafe(dir, UnsafeReason::Reversal);
    }

    for dir in Direction::all() {
        let next = dir.apply(&head);

        if !grid.in_bounds(&next) {
            mask.mark_unsafe(dir, UnsafeReason::OutOfBounds);
            continue;
        }

        if grid.is_blocked(&next, grid.is_food(&next)) {
            mask.mark_unsafe(dir, UnsafeReason::Collision);
        }

        if grid.threatened_by_head(&next) {
            mask.mark_unsafe(dir, UnsafeReason::HeadThreat);
        }
    }

    for dir in Direction::all() {
        if let Some(reason) = mask.reason(dir) {
            debug!("{} unsafe: {}", dir, reason.as_str());
        }
    }

    mask
}
