//! Terminal exclusivity: a game ends in a win or a draw, never both.

use super::super::LedgerFields;
use super::Invariant;

/// Invariant: a finalized winner and a finalized draw are mutually exclusive.
pub struct TerminalExclusiveInvariant;

impl Invariant<LedgerFields> for TerminalExclusiveInvariant {
    fn holds(fields: &LedgerFields) -> bool {
        !(fields.winner.is_some() && fields.draw)
    }

    fn description() -> &'static str {
        "A game cannot be both won and drawn"
    }
}
