//! Preconditions for the propose/authorize protocol.
//!
//! Every check runs against a freshly loaded [`GameSnapshot`] before the
//! corresponding ledger call is made. A failed check means no call is
//! made at all. There are no postconditions here: the ledger applies calls
//! on its own schedule, so the effect of a call is only visible by loading
//! a new snapshot.

use super::action::{Authorize, Claim, Propose, ProposalKind};
use super::board::{BoardEngine, BoardError};
use super::snapshot::GameSnapshot;
use crate::error::GameError;
use tracing::{instrument, warn};

// ─────────────────────────────────────────────────────────────
//  Contract Trait
// ─────────────────────────────────────────────────────────────

/// Preconditions an action must satisfy against a state.
pub trait Contract<S, A> {
    /// Checks preconditions before the action is submitted.
    fn pre(state: &S, action: &A) -> Result<(), GameError>;
}

// ─────────────────────────────────────────────────────────────
//  Proposal Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: the game must be waiting on a new proposal.
pub struct GameOpen;

impl GameOpen {
    /// Fails with [`GameError::PhaseViolation`] unless someone is to move.
    #[instrument(skip(game), fields(phase = %game.phase()))]
    pub fn check<B>(action: &Propose, game: &GameSnapshot<B>) -> Result<(), GameError> {
        if game.phase().accepts_proposals() {
            return Ok(());
        }
        let kind = action.claim.kind();
        warn!(%kind, "Proposal attempted while the game is not open");
        let action = match kind {
            ProposalKind::Move => "propose a move",
            ProposalKind::Draw => "propose a draw",
            ProposalKind::Win => "propose a win",
        };
        Err(GameError::PhaseViolation {
            action,
            phase: *game.phase(),
        })
    }
}

/// Precondition: it must be the proposer's turn.
pub struct PlayersTurn;

impl PlayersTurn {
    /// Fails with [`GameError::TurnViolation`] if the actor is not to move.
    #[instrument(skip(game))]
    pub fn check<B>(action: &Propose, game: &GameSnapshot<B>) -> Result<(), GameError> {
        let expected = game.to_move();
        if action.actor == expected {
            Ok(())
        } else {
            warn!(%expected, "Proposal out of turn");
            Err(GameError::TurnViolation {
                acting: action.actor,
                expected,
            })
        }
    }
}

/// Precondition: a proposed stone must land on an empty on-board cell.
pub struct CellAvailable;

impl CellAvailable {
    /// Passes trivially for draw and win claims.
    #[instrument(skip(game))]
    pub fn check<B: BoardEngine>(action: &Propose, game: &GameSnapshot<B>) -> Result<(), GameError> {
        let Claim::Move { x, y } = action.claim else {
            return Ok(());
        };
        let board = game.board();
        if !board.contains(x, y) {
            return Err(BoardError::OutOfBounds {
                x,
                y,
                size: board.size(),
            }
            .into());
        }
        if board.stone_at(x, y).is_some() {
            return Err(BoardError::Occupied { x, y }.into());
        }
        Ok(())
    }
}

/// Composite precondition for proposals.
pub struct ProposeContract;

impl<B: BoardEngine> Contract<GameSnapshot<B>, Propose> for ProposeContract {
    fn pre(game: &GameSnapshot<B>, action: &Propose) -> Result<(), GameError> {
        GameOpen::check(action, game)?;
        PlayersTurn::check(action, game)?;
        CellAvailable::check(action, game)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
//  Authorization Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: a proposal of the right kind must be pending.
pub struct AwaitingAuthorization;

impl AwaitingAuthorization {
    /// Fails with [`GameError::PhaseViolation`] unless the matching claim
    /// is pending.
    #[instrument(skip(game), fields(phase = %game.phase()))]
    pub fn check<B>(action: &Authorize, game: &GameSnapshot<B>) -> Result<(), GameError> {
        if game.phase().pending_kind() == Some(action.kind) {
            return Ok(());
        }
        warn!("Nothing of this kind awaits authorization");
        let action = match action.kind {
            ProposalKind::Move => "authorize a move",
            ProposalKind::Draw => "authorize a draw",
            ProposalKind::Win => "authorize a win",
        };
        Err(GameError::PhaseViolation {
            action,
            phase: *game.phase(),
        })
    }
}

/// Precondition: the proposer cannot settle their own claim.
pub struct NotProposer;

impl NotProposer {
    /// Fails with [`GameError::TurnViolation`] if the actor made the claim.
    #[instrument(skip(game))]
    pub fn check<B>(action: &Authorize, game: &GameSnapshot<B>) -> Result<(), GameError> {
        match game.pending() {
            Some(proposal) if proposal.proposer() == action.actor => {
                warn!(%proposal, "Proposer tried to authorize their own claim");
                Err(GameError::TurnViolation {
                    acting: action.actor,
                    expected: action.actor.opponent(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Composite precondition for authorizations.
pub struct AuthorizeContract;

impl<B: BoardEngine> Contract<GameSnapshot<B>, Authorize> for AuthorizeContract {
    fn pre(game: &GameSnapshot<B>, action: &Authorize) -> Result<(), GameError> {
        AwaitingAuthorization::check(action, game)?;
        NotProposer::check(action, game)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::baduk::{
        Color, GoBoard, LedgerFields, MoveRecord, Phase, Placement, Proposal, RawFlags, Winner,
        replay_moves,
    };
    use crate::ledger::ContractAddress;

    fn snapshot(raw: RawFlags, proposed: Option<Placement>, moves: &[Placement]) -> GameSnapshot<GoBoard> {
        let fields = LedgerFields::from_raw(raw, proposed).unwrap();
        let history = moves
            .iter()
            .enumerate()
            .map(|(i, p)| MoveRecord::new(i as u64, *p))
            .collect();
        let replay = replay_moves(9, history).unwrap();
        GameSnapshot::assemble(ContractAddress::from("game"), 9, fields, replay)
    }

    fn in_play(black_turn: bool) -> RawFlags {
        RawFlags {
            confirmed: true,
            black_turn,
            ..RawFlags::default()
        }
    }

    #[test]
    fn test_propose_in_turn_passes() {
        let game = snapshot(in_play(true), None, &[]);
        let action = Propose::new(Color::Black, Claim::Move { x: 3, y: 3 });
        assert!(ProposeContract::pre(&game, &action).is_ok());
    }

    #[test]
    fn test_propose_out_of_turn_is_turn_violation() {
        let game = snapshot(in_play(true), None, &[]);
        let action = Propose::new(Color::White, Claim::Draw);
        assert_eq!(
            ProposeContract::pre(&game, &action),
            Err(GameError::TurnViolation {
                acting: Color::White,
                expected: Color::Black,
            })
        );
    }

    #[test]
    fn test_propose_while_pending_is_phase_violation() {
        let raw = RawFlags {
            approval_lock: true,
            draw: true,
            ..in_play(true)
        };
        let game = snapshot(raw, None, &[]);
        let action = Propose::new(Color::Black, Claim::Win);
        assert!(matches!(
            ProposeContract::pre(&game, &action),
            Err(GameError::PhaseViolation {
                action: "propose a win",
                phase: Phase::DrawProposed,
            })
        ));
    }

    #[test]
    fn test_propose_on_occupied_cell_is_coordinate_error() {
        let game = snapshot(in_play(false), None, &[Placement::new(4, 4, Color::Black)]);
        let occupied = Propose::new(Color::White, Claim::Move { x: 4, y: 4 });
        assert_eq!(
            ProposeContract::pre(&game, &occupied),
            Err(GameError::Coordinate(BoardError::Occupied { x: 4, y: 4 }))
        );

        let off_board = Propose::new(Color::White, Claim::Move { x: 9, y: 0 });
        assert!(matches!(
            ProposeContract::pre(&game, &off_board),
            Err(GameError::Coordinate(BoardError::OutOfBounds { .. }))
        ));
    }

    #[test]
    fn test_authorize_requires_matching_claim() {
        let raw = RawFlags {
            approval_lock: true,
            ..in_play(true)
        };
        let game = snapshot(raw, Some(Placement::new(2, 2, Color::Black)), &[]);

        let wrong_kind = Authorize::new(Color::White, ProposalKind::Draw, true);
        assert!(matches!(
            AuthorizeContract::pre(&game, &wrong_kind),
            Err(GameError::PhaseViolation { action: "authorize a draw", .. })
        ));

        let right_kind = Authorize::new(Color::White, ProposalKind::Move, false);
        assert!(AuthorizeContract::pre(&game, &right_kind).is_ok());
    }

    #[test]
    fn test_proposer_cannot_authorize() {
        let raw = RawFlags {
            approval_lock: true,
            winner: Winner::White,
            ..in_play(false)
        };
        let game = snapshot(raw, None, &[Placement::new(0, 0, Color::Black)]);
        assert_eq!(game.pending(), &Some(Proposal::Win { by: Color::White }));

        let own = Authorize::new(Color::White, ProposalKind::Win, true);
        assert_eq!(
            AuthorizeContract::pre(&game, &own),
            Err(GameError::TurnViolation {
                acting: Color::White,
                expected: Color::Black,
            })
        );
    }
}
