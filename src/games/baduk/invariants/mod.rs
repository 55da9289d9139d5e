//! First-class invariants for ledger-backed Go.
//!
//! Invariants are logical properties the ledger is expected to maintain.
//! They are testable independently and checked wherever ledger data enters
//! the crate.

/// A logical property that must hold for a given state.
pub trait Invariant<S: ?Sized> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
///
/// Implementations are provided for tuples.
pub trait InvariantSet<S: ?Sized> {
    /// Checks all invariants in the set.
    ///
    /// Returns Ok(()) if all invariants hold, or Err with a list of
    /// violations if any invariant fails.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    S: ?Sized,
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();

        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }

        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

pub mod alternating_colors;
pub mod contiguous_history;
pub mod single_claim;
pub mod terminal_exclusive;

pub use alternating_colors::AlternatingColorInvariant;
pub use contiguous_history::ContiguousHistoryInvariant;
pub use single_claim::SingleClaimInvariant;
pub use terminal_exclusive::TerminalExclusiveInvariant;

/// Invariants over interpreted ledger flags.
pub type LedgerInvariants = (SingleClaimInvariant, TerminalExclusiveInvariant);

/// Invariants over the committed move log.
pub type HistoryInvariants = (ContiguousHistoryInvariant, AlternatingColorInvariant);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::baduk::{Color, LedgerFields, MoveRecord, Placement, Proposal, Winner};

    fn record(index: u64, x: usize, y: usize, color: Color) -> MoveRecord {
        MoveRecord::new(index, Placement::new(x, y, color))
    }

    #[test]
    fn test_history_set_holds_for_empty_log() {
        let history: Vec<MoveRecord> = Vec::new();
        assert!(HistoryInvariants::check_all(history.as_slice()).is_ok());
    }

    #[test]
    fn test_history_set_holds_for_alternating_log() {
        let history = vec![
            record(0, 2, 2, Color::Black),
            record(1, 3, 3, Color::White),
            record(2, 4, 4, Color::Black),
        ];
        assert!(HistoryInvariants::check_all(history.as_slice()).is_ok());
    }

    #[test]
    fn test_history_set_reports_every_violation() {
        let history = vec![record(0, 2, 2, Color::White), record(2, 3, 3, Color::Black)];
        let violations = HistoryInvariants::check_all(history.as_slice()).unwrap_err();
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn test_ledger_set_detects_lock_without_claim() {
        let fields = LedgerFields {
            confirmed: true,
            black_turn: true,
            approval_lock: true,
            draw: false,
            winner: Winner::None,
            pending: None,
        };
        let violations = LedgerInvariants::check_all(&fields).unwrap_err();
        assert_eq!(violations, vec![InvariantViolation::new(SingleClaimInvariant::description())]);
    }

    #[test]
    fn test_ledger_set_holds_for_pending_claim() {
        let fields = LedgerFields {
            confirmed: true,
            black_turn: false,
            approval_lock: true,
            draw: false,
            winner: Winner::None,
            pending: Some(Proposal::Draw { by: Color::White }),
        };
        assert!(LedgerInvariants::check_all(&fields).is_ok());
    }
}
