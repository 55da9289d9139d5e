//! Core domain types for ledger-backed Go.

use derive_new::new;
use serde::{Deserialize, Serialize};

/// Stone color. Black always moves first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Color {
    /// Black stones (moves first).
    Black,
    /// White stones.
    White,
}

impl Color {
    /// Returns the opposing color.
    pub fn opponent(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// The side to move given the ledger's `blackTurn` flag.
    pub fn to_move(black_turn: bool) -> Self {
        if black_turn { Color::Black } else { Color::White }
    }

    /// Decodes the contract's color code (1 = black, 2 = white).
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(Color::Black),
            2 => Some(Color::White),
            _ => None,
        }
    }

    /// The contract's color code.
    pub fn code(self) -> u64 {
        match self {
            Color::Black => 1,
            Color::White => 2,
        }
    }
}

/// Outcome field as stored by the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    /// No winner recorded.
    #[default]
    None,
    /// Black won.
    Black,
    /// White won.
    White,
}

impl Winner {
    /// Decodes the contract's winner code (0 = none, 1 = black, 2 = white).
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Winner::None),
            1 => Some(Winner::Black),
            2 => Some(Winner::White),
            _ => None,
        }
    }

    /// The winning color, if any.
    pub fn color(self) -> Option<Color> {
        match self {
            Winner::None => None,
            Winner::Black => Some(Color::Black),
            Winner::White => Some(Color::White),
        }
    }

    /// Returns true if a winner is recorded.
    pub fn is_some(self) -> bool {
        self != Winner::None
    }
}

impl From<Color> for Winner {
    fn from(color: Color) -> Self {
        match color {
            Color::Black => Winner::Black,
            Color::White => Winner::White,
        }
    }
}

/// A stone of a given color at a board coordinate.
///
/// `x` is the column and `y` the row, both 0-based from the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, new)]
pub struct Placement {
    /// Column.
    pub x: usize,
    /// Row.
    pub y: usize,
    /// Stone color.
    pub color: Color,
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at ({}, {})", self.color, self.x, self.y)
    }
}

/// An accepted move as committed to the ledger's move log.
///
/// Records are immutable: the ledger appends one per authorized move and
/// never alters or removes it afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, new)]
pub struct MoveRecord {
    /// Position in the move log, contiguous from 0.
    pub index: u64,
    /// Where the stone went.
    pub placement: Placement,
}
