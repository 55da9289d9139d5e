//! Alternating color invariant: Black, White, Black, ...

use super::super::{Color, MoveRecord};
use super::Invariant;

/// Invariant: accepted moves alternate colors, starting with Black.
///
/// Record `i` is Black iff `i` is even.
pub struct AlternatingColorInvariant;

impl Invariant<[MoveRecord]> for AlternatingColorInvariant {
    fn holds(history: &[MoveRecord]) -> bool {
        history.iter().enumerate().all(|(i, record)| {
            let black = record.placement.color == Color::Black;
            black == (i % 2 == 0)
        })
    }

    fn description() -> &'static str {
        "Moves must alternate colors starting with Black"
    }
}
