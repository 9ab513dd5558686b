use std::fmt;

use crate::board::{Board, Exponent, Reward};

/// A direction to slide/merge tiles.
///
/// The discriminants are the opcodes used throughout the crate: the player
/// scans them in this order and ties go to the later direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Direction {
    /// All directions in scan order.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    #[inline]
    pub fn index(self) -> u8 { self as u8 }

    pub fn from_index(index: u8) -> Option<Direction> {
        Self::ALL.get(index as usize).copied()
    }

    /// The four cells on the edge facing away from this slide.
    ///
    /// Sliding compacts tiles toward one edge, so the free cells of every
    /// touched line end up on the far edge.
    pub fn opposite_edge(self) -> [usize; 4] {
        match self {
            Direction::Up => [12, 13, 14, 15],
            Direction::Right => [0, 4, 8, 12],
            Direction::Down => [0, 1, 2, 3],
            Direction::Left => [3, 7, 11, 15],
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        };
        f.write_str(name)
    }
}

/// Result of a `take_action` call, consumed by the episode driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Pass; the acting side has nothing left to do and the episode ends.
    None,
    Slide(Direction),
    Place { cell: usize, exponent: Exponent },
}

impl Action {
    #[inline]
    pub fn is_none(&self) -> bool { matches!(self, Action::None) }

    /// Apply this action to `board`.
    ///
    /// Returns the reward earned, or `None` when the action cannot be applied
    /// (an invalid slide, a placement on an occupied cell, or a pass). The board
    /// is left untouched in that case.
    pub fn apply(&self, board: &mut Board) -> Option<Reward> {
        match *self {
            Action::None => None,
            Action::Slide(dir) => board.slide(dir),
            Action::Place { cell, exponent } => {
                if cell >= crate::board::CELLS || board.cell(cell) != 0 {
                    return None;
                }
                board.place(cell, exponent);
                Some(0)
            }
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::None => f.write_str("none"),
            Action::Slide(dir) => write!(f, "slide {}", dir),
            Action::Place { cell, exponent } => write!(f, "place {}@{}", 1u32 << exponent, cell),
        }
    }
}
