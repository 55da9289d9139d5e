//! Contiguous history invariant: indices run 0, 1, 2, ... with no gaps.

use super::super::MoveRecord;
use super::Invariant;

/// Invariant: move records carry contiguous indices starting at 0, in order.
pub struct ContiguousHistoryInvariant;

impl Invariant<[MoveRecord]> for ContiguousHistoryInvariant {
    fn holds(history: &[MoveRecord]) -> bool {
        history
            .iter()
            .enumerate()
            .all(|(i, record)| record.index == i as u64)
    }

    fn description() -> &'static str {
        "Move indices must be contiguous from 0 and in order"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::baduk::{Color, Placement};

    #[test]
    fn test_gap_violates() {
        let history = [
            MoveRecord::new(0, Placement::new(0, 0, Color::Black)),
            MoveRecord::new(2, Placement::new(1, 0, Color::White)),
        ];
        assert!(!ContiguousHistoryInvariant::holds(&history[..]));
    }

    #[test]
    fn test_out_of_order_violates() {
        let history = [
            MoveRecord::new(1, Placement::new(0, 0, Color::Black)),
            MoveRecord::new(0, Placement::new(1, 0, Color::White)),
        ];
        assert!(!ContiguousHistoryInvariant::holds(&history[..]));
    }
}
