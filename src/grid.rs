//! Per-turn read-only view of the board.
//!
//! A `Grid` is built once per decision from the request snapshot and never
//! mutated afterwards. It answers bounds, food, and occupancy questions for
//! the safety filter, the pathfinder, and the flood fill.

use std::collections::HashSet;

use crate::types::{Battlesnake, Board, Coord};

/// Borrowed view of one snake's body, head first.
#[derive(Debug, Clone, Copy)]
pub struct SnakeView<'a> {
    pub id: &'a str,
    pub body: &'a [Coord],
}

impl<'a> SnakeView<'a> {
    pub fn head(&self) -> Option<Coord> {
        self.body.first().copied()
    }

    pub fn length(&self) -> usize {
        self.body.len()
    }
}

/// Tail segment that may move away before anyone can step onto it.
#[derive(Debug, Clone, Copy)]
struct TailCell {
    cell: Coord,
    snake: usize,
}

#[derive(Debug)]
pub struct Grid<'a> {
    width: i32,
    height: i32,
    food: HashSet<Coord>,
    food_order: &'a [Coord],
    snakes: Vec<SnakeView<'a>>,
    you: usize,
    /// Every segment except each snake's last one
    solid: HashSet<Coord>,
    tails: Vec<TailCell>,
    /// Whether an opponent has food next to its head this turn
    may_grow: Vec<bool>,
}

impl<'a> Grid<'a> {
    /// Builds the view for `you` on `board`.
    ///
    /// `you` is matched against the roster by id; if it is missing from the
    /// roster it is added so its body still counts as an obstacle.
    pub fn new(board: &'a Board, you: &'a Battlesnake) -> Self {
        let mut snakes: Vec<SnakeView<'a>> = board
            .snakes
            .iter()
            .filter(|s| !s.body.is_empty() || s.id == you.id)
            .map(|s| SnakeView {
                id: &s.id,
                body: &s.body,
            })
            .collect();

        let you_idx = match snakes.iter().position(|s| s.id == you.id) {
            Some(idx) => idx,
            None => {
                snakes.push(SnakeView {
                    id: &you.id,
                    body: &you.body,
                });
                snakes.len() - 1
            }
        };

        let food: HashSet<Coord> = board.food.iter().copied().collect();

        let mut solid = HashSet::new();
        let mut tails = Vec::with_capacity(snakes.len());
        for (idx, snake) in snakes.iter().enumerate() {
            if let Some((tail, rest)) = snake.body.split_last() {
                solid.extend(rest.iter().copied());
                tails.push(TailCell {
                    cell: *tail,
                    snake: idx,
                });
            }
        }

        let may_grow = snakes
            .iter()
            .map(|s| {
                s.head()
                    .map(|h| h.neighbors().iter().any(|n| food.contains(n)))
                    .unwrap_or(false)
            })
            .collect();

        Grid {
            width: board.width,
            height: board.height,
            food,
            food_order: &board.food,
            snakes,
            you: you_idx,
            solid,
            tails,
            may_grow,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn area(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }

    pub fn in_bounds(&self, c: &Coord) -> bool {
        c.x >= 0 && c.x < self.width && c.y >= 0 && c.y < self.height
    }

    pub fn is_food(&self, c: &Coord) -> bool {
        self.food.contains(c)
    }

    /// Food cells in snapshot order
    pub fn food(&self) -> &'a [Coord] {
        self.food_order
    }

    pub fn you(&self) -> &SnakeView<'a> {
        &self.snakes[self.you]
    }

    pub fn my_length(&self) -> usize {
        self.you().length()
    }

    pub fn head(&self) -> Option<Coord> {
        self.you().head()
    }

    /// Second segment of the controlled snake, if its body is longer than `min_len`
    pub fn neck(&self, min_len: usize) -> Option<Coord> {
        let body = self.you().body;
        if body.len() > min_len {
            body.get(1).copied()
        } else {
            None
        }
    }

    pub fn opponents(&self) -> impl Iterator<Item = &SnakeView<'a>> {
        let you = self.you;
        self.snakes
            .iter()
            .enumerate()
            .filter(move |(idx, _)| *idx != you)
            .map(|(_, s)| s)
    }

    /// True if `c` is covered by any snake segment, tails included.
    pub fn is_body(&self, c: &Coord) -> bool {
        self.solid.contains(c) || self.tails.iter().any(|t| t.cell == *c)
    }

    /// True if stepping onto `c` collides with a body segment.
    ///
    /// Each snake's tail is passable unless that snake grows this turn.
    /// The controlled snake grows when `self_grows` is set; an opponent is
    /// assumed to grow when food lies next to its head. A stacked tail is
    /// covered by the segment before it and so never frees up.
    pub fn is_blocked(&self, c: &Coord, self_grows: bool) -> bool {
        if self.solid.contains(c) {
            return true;
        }
        self.tails.iter().any(|t| {
            t.cell == *c
                && if t.snake == self.you {
                    self_grows
                } else {
                    self.may_grow[t.snake]
                }
        })
    }

    /// An opponent at least as long as us has its head next to `c`.
    pub fn threatened_by_head(&self, c: &Coord) -> bool {
        let mine = self.my_length();
        self.opponents().any(|s| {
            s.length() >= mine && s.head().map(|h| h.is_adjacent(c)).unwrap_or(false)
        })
    }

    /// A strictly shorter opponent has its head next to `c`.
    pub fn next_to_weaker_head(&self, c: &Coord) -> bool {
        let mine = self.my_length();
        self.opponents().any(|s| {
            s.length() < mine && s.head().map(|h| h.is_adjacent(c)).unwrap_or(false)
        })
    }

    /// In-bounds orthogonal neighbours of `c`
    pub fn neighbors(&self, c: &Coord) -> impl Iterator<Item = Coord> + '_ {
        c.neighbors().into_iter().filter(move |n| self.in_bounds(n))
    }
}
