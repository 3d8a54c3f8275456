use std::collections::VecDeque;

use crate::{in_bounds, Cell, GridInt};
use Direction::*;
use MoveResult::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Crash {
    Wall,
    SelfBite
}

#[derive(Debug, PartialEq, Eq)]
pub enum MoveResult {
    Moved { new_head: Cell },
    Crashed(Crash)
}

/// The snake body, head first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snake {
    body: VecDeque<Cell>,
    direction: Direction,
}

impl Direction {
    pub fn delta(self) -> (GridInt, GridInt) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }
}

impl Snake {
    /// Builds a snake from explicit cells, head first.
    ///
    /// Panics on an empty body: a snake always has a head.
    pub fn from_cells<I: IntoIterator<Item = Cell>>(cells: I, direction: Direction) -> Self {
        let body: VecDeque<Cell> = cells.into_iter().collect();
        assert!(!body.is_empty(), "a snake needs at least one cell");
        Snake { body, direction }
    }

    pub fn body(&self) -> &VecDeque<Cell> {
        &self.body
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    pub fn next_head(&self) -> Cell {
        let head = self.head();
        let (dx, dy) = self.direction.delta();
        (head.0 + dx, head.1 + dy)
    }

    /// Moves one cell forward, keeping the tail when `grow` is set.
    ///
    /// The tail still counts as occupied here: moving onto the cell the tail
    /// is about to leave is a bite.
    pub fn move_step(&mut self, grow: bool) -> MoveResult {
        let new_head = self.next_head();

        if !in_bounds(new_head) {
            return Crashed(Crash::Wall);
        }
        if self.contains(new_head) {
            return Crashed(Crash::SelfBite);
        }

        self.body.push_front(new_head);
        if !grow {
            self.body.pop_back();
        }
        Moved { new_head }
    }

    /// Returns false when the turn was refused as a reversal.
    pub fn set_direction(&mut self, new_direction: Direction) -> bool {
        if self.body.len() > 1 && new_direction == self.direction.opposite() {
            return false;
        }
        self.direction = new_direction;
        true
    }

    pub fn get_direction(&self) -> Direction {
        self.direction
    }
}
