//! Single claim invariant: the approval lock guards exactly one claim.

use super::super::LedgerFields;
use super::Invariant;

/// Invariant: `approval_lock` is set iff exactly one claim is pending.
///
/// The claim itself is an enum, so "exactly one" reduces to presence.
pub struct SingleClaimInvariant;

impl Invariant<LedgerFields> for SingleClaimInvariant {
    fn holds(fields: &LedgerFields) -> bool {
        fields.approval_lock == fields.pending.is_some()
    }

    fn description() -> &'static str {
        "Approval lock must guard exactly one pending claim"
    }
}
