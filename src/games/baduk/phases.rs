//! Game phase as a projection of ledger fields.
//!
//! Nothing here is stored. The phase is recomputed from a fresh set of
//! ledger reads on every request, so two requests for the same contract may
//! see different phases. The mapping from one consistent field set to a
//! phase is total and deterministic.

use super::action::{Proposal, ProposalKind};
use super::invariants::{InvariantSet, LedgerInvariants};
use super::types::{Color, Placement, Winner};
use crate::error::GameError;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

/// Outcome of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// One side won.
    Winner(Color),
    /// Both sides agreed to a draw.
    Draw,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Winner(color) => write!(f, "{} wins", color),
            Outcome::Draw => write!(f, "draw"),
        }
    }
}

/// Logical game phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum Phase {
    /// The opponent has not escrowed the wager yet.
    #[display("awaiting confirmation")]
    AwaitingConfirmation,
    /// Black may propose.
    #[display("black to move")]
    BlackToMove,
    /// White may propose.
    #[display("white to move")]
    WhiteToMove,
    /// A move awaits authorization.
    #[display("move proposed")]
    MoveProposed,
    /// A draw offer awaits authorization.
    #[display("draw proposed")]
    DrawProposed,
    /// A win claim awaits authorization.
    #[display("win proposed")]
    WinProposed,
    /// No further moves are accepted.
    #[display("finished ({_0})")]
    Finished(Outcome),
}

impl Phase {
    /// The side allowed to propose, if the game is waiting on a proposal.
    pub fn to_move(&self) -> Option<Color> {
        match self {
            Phase::BlackToMove => Some(Color::Black),
            Phase::WhiteToMove => Some(Color::White),
            _ => None,
        }
    }

    /// Returns true once a winner or a draw is final.
    pub fn is_finished(&self) -> bool {
        matches!(self, Phase::Finished(_))
    }

    /// Returns true if a new proposal can be opened.
    pub fn accepts_proposals(&self) -> bool {
        self.to_move().is_some()
    }

    /// The kind of proposal pending authorization, if any.
    pub fn pending_kind(&self) -> Option<ProposalKind> {
        match self {
            Phase::MoveProposed => Some(ProposalKind::Move),
            Phase::DrawProposed => Some(ProposalKind::Draw),
            Phase::WinProposed => Some(ProposalKind::Win),
            _ => None,
        }
    }
}

/// Flag fields exactly as the contract stores them.
///
/// The contract reuses `draw` and `winner` for pending claims, so these
/// values still need interpreting (see [`LedgerFields::from_raw`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawFlags {
    /// `confirmed`
    pub confirmed: bool,
    /// `blackTurn`
    pub black_turn: bool,
    /// `approvalLock`
    pub approval_lock: bool,
    /// `draw`
    pub draw: bool,
    /// `winner`
    pub winner: Winner,
}

impl RawFlags {
    /// Returns true if the pending claim is a move, which means the
    /// `proposed` field has to be read.
    pub fn expects_proposed_move(&self) -> bool {
        self.approval_lock && !self.draw && !self.winner.is_some()
    }
}

/// Interpreted ledger fields: finalized outcome kept apart from the pending
/// claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerFields {
    /// Wager escrowed.
    pub confirmed: bool,
    /// Black is the side to move when nothing is pending.
    pub black_turn: bool,
    /// A proposal awaits the opponent.
    pub approval_lock: bool,
    /// Draw finalized.
    pub draw: bool,
    /// Finalized winner.
    pub winner: Winner,
    /// The outstanding claim, present iff `approval_lock`.
    pub pending: Option<Proposal>,
}

impl LedgerFields {
    /// Interprets raw contract flags.
    ///
    /// `proposed` must be the contract's `proposed` field when
    /// [`RawFlags::expects_proposed_move`] holds, `None` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Decode`] when the flags describe an impossible
    /// state: both a draw and a win claim pending, a missing proposed move,
    /// or a finalized draw alongside a finalized winner.
    #[instrument]
    pub fn from_raw(raw: RawFlags, proposed: Option<Placement>) -> Result<Self, GameError> {
        let to_move = Color::to_move(raw.black_turn);

        let fields = if raw.approval_lock {
            let pending = match (raw.winner.color(), raw.draw) {
                (Some(by), false) => Proposal::Win { by },
                (None, true) => Proposal::Draw { by: to_move },
                (None, false) => Proposal::Move(proposed.ok_or_else(|| {
                    GameError::decode("proposed", "approval lock set but no proposed move supplied")
                })?),
                (Some(_), true) => {
                    warn!(?raw, "Ledger reports both a draw and a win claim");
                    return Err(GameError::decode(
                        "approvalLock",
                        "both a draw and a win claim are pending",
                    ));
                }
            };
            Self {
                confirmed: raw.confirmed,
                black_turn: raw.black_turn,
                approval_lock: true,
                draw: false,
                winner: Winner::None,
                pending: Some(pending),
            }
        } else {
            Self {
                confirmed: raw.confirmed,
                black_turn: raw.black_turn,
                approval_lock: false,
                draw: raw.draw,
                winner: raw.winner,
                pending: None,
            }
        };

        LedgerInvariants::check_all(&fields).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            warn!(%descriptions, "Ledger fields violate invariants");
            GameError::decode("ledger fields", descriptions)
        })?;

        Ok(fields)
    }
}

/// Projects ledger fields onto a phase. First matching rule wins.
pub fn project(fields: &LedgerFields) -> Phase {
    if !fields.confirmed {
        return Phase::AwaitingConfirmation;
    }
    if let Some(color) = fields.winner.color() {
        return Phase::Finished(Outcome::Winner(color));
    }
    if fields.draw && !fields.approval_lock {
        return Phase::Finished(Outcome::Draw);
    }
    // A lock with no claim behind it leaves the turn rules in charge.
    if fields.approval_lock {
        match fields.pending.map(|p| p.kind()) {
            Some(ProposalKind::Move) => return Phase::MoveProposed,
            Some(ProposalKind::Draw) => return Phase::DrawProposed,
            Some(ProposalKind::Win) => return Phase::WinProposed,
            None => warn!(?fields, "Approval lock set without a pending claim"),
        }
    }
    if fields.black_turn {
        Phase::BlackToMove
    } else {
        Phase::WhiteToMove
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confirmed(black_turn: bool) -> RawFlags {
        RawFlags {
            confirmed: true,
            black_turn,
            ..RawFlags::default()
        }
    }

    fn phase_of(raw: RawFlags, proposed: Option<Placement>) -> Phase {
        project(&LedgerFields::from_raw(raw, proposed).unwrap())
    }

    #[test]
    fn test_unconfirmed_wins_over_everything() {
        let raw = RawFlags {
            confirmed: false,
            black_turn: true,
            approval_lock: true,
            draw: true,
            winner: Winner::None,
        };
        assert_eq!(phase_of(raw, None), Phase::AwaitingConfirmation);
    }

    #[test]
    fn test_turn_phases() {
        assert_eq!(phase_of(confirmed(true), None), Phase::BlackToMove);
        assert_eq!(phase_of(confirmed(false), None), Phase::WhiteToMove);
    }

    #[test]
    fn test_finalized_outcomes() {
        let won = RawFlags { winner: Winner::White, ..confirmed(true) };
        assert_eq!(phase_of(won, None), Phase::Finished(Outcome::Winner(Color::White)));

        let drawn = RawFlags { draw: true, ..confirmed(false) };
        assert_eq!(phase_of(drawn, None), Phase::Finished(Outcome::Draw));
    }

    #[test]
    fn test_pending_claims_are_not_outcomes() {
        let win_claim = RawFlags {
            approval_lock: true,
            winner: Winner::Black,
            ..confirmed(true)
        };
        let fields = LedgerFields::from_raw(win_claim, None).unwrap();
        assert_eq!(fields.winner, Winner::None);
        assert_eq!(fields.pending, Some(Proposal::Win { by: Color::Black }));
        assert_eq!(project(&fields), Phase::WinProposed);

        let draw_claim = RawFlags {
            approval_lock: true,
            draw: true,
            ..confirmed(false)
        };
        let fields = LedgerFields::from_raw(draw_claim, None).unwrap();
        assert!(!fields.draw);
        assert_eq!(fields.pending, Some(Proposal::Draw { by: Color::White }));
        assert_eq!(project(&fields), Phase::DrawProposed);
    }

    #[test]
    fn test_pending_move_needs_proposed_field() {
        let raw = RawFlags { approval_lock: true, ..confirmed(true) };
        assert!(raw.expects_proposed_move());
        assert!(matches!(
            LedgerFields::from_raw(raw, None),
            Err(GameError::Decode { .. })
        ));

        let placement = Placement::new(1, 2, Color::Black);
        assert_eq!(phase_of(raw, Some(placement)), Phase::MoveProposed);
    }

    #[test]
    fn test_lock_without_claim_falls_back_to_turn() {
        let fields = LedgerFields {
            confirmed: true,
            black_turn: false,
            approval_lock: true,
            draw: false,
            winner: Winner::None,
            pending: None,
        };
        assert_eq!(project(&fields), Phase::WhiteToMove);
    }

    #[test]
    fn test_inconsistent_flags_rejected() {
        let both_claims = RawFlags {
            approval_lock: true,
            draw: true,
            winner: Winner::Black,
            ..confirmed(true)
        };
        assert!(LedgerFields::from_raw(both_claims, None).is_err());

        let both_outcomes = RawFlags {
            draw: true,
            winner: Winner::Black,
            ..confirmed(true)
        };
        assert!(LedgerFields::from_raw(both_outcomes, None).is_err());
    }

    #[test]
    fn test_phase_helpers() {
        assert_eq!(Phase::WhiteToMove.to_move(), Some(Color::White));
        assert!(Phase::BlackToMove.accepts_proposals());
        assert!(!Phase::DrawProposed.accepts_proposals());
        assert_eq!(Phase::DrawProposed.pending_kind(), Some(ProposalKind::Draw));
        assert!(Phase::Finished(Outcome::Draw).is_finished());
        assert_eq!(
            Phase::Finished(Outcome::Winner(Color::Black)).to_string(),
            "finished (black wins)"
        );
    }
}
