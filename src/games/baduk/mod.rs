//! Go played on a contract ledger.
//!
//! The ledger owns all state. This module rebuilds a view of it
//! ([`GameSnapshot`]) and decides which actions that view allows
//! ([`ProposeContract`], [`AuthorizeContract`]).

mod action;
mod board;
mod contracts;
pub mod invariants;
mod phases;
mod replay;
mod snapshot;
mod types;

pub use action::{Authorize, Claim, Propose, Proposal, ProposalKind};
pub use board::{BoardEngine, BoardError, GoBoard};
pub use contracts::{
    AuthorizeContract, AwaitingAuthorization, CellAvailable, Contract, GameOpen, NotProposer,
    PlayersTurn, ProposeContract,
};
pub use phases::{LedgerFields, Outcome, Phase, RawFlags, project};
pub use replay::{MoveLogReplayer, Replay, replay_moves};
pub use snapshot::GameSnapshot;
pub use types::{Color, MoveRecord, Placement, Winner};
