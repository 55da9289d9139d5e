//! First-class proposal and authorization actions.
//!
//! Every game action goes through the same two-call handshake: one side
//! proposes a claim, the other side authorizes or rejects it. Actions here
//! are intents; they become ledger calls only after their preconditions
//! pass (see `contracts`).

use super::types::{Color, Placement};
use crate::ledger::ContractCall;
use serde::{Deserialize, Serialize};

/// The kind of claim a proposal makes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProposalKind {
    /// Place a stone.
    Move,
    /// End the game as a draw.
    Draw,
    /// Declare the proposer the winner.
    Win,
}

/// A claim awaiting the opponent's authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Proposal {
    /// A stone placement.
    Move(Placement),
    /// A draw offer.
    Draw {
        /// Side that offered the draw.
        by: Color,
    },
    /// A win claim.
    Win {
        /// Side claiming the win.
        by: Color,
    },
}

impl Proposal {
    /// The kind of claim.
    pub fn kind(&self) -> ProposalKind {
        match self {
            Proposal::Move(_) => ProposalKind::Move,
            Proposal::Draw { .. } => ProposalKind::Draw,
            Proposal::Win { .. } => ProposalKind::Win,
        }
    }

    /// The side that made the proposal.
    pub fn proposer(&self) -> Color {
        match self {
            Proposal::Move(placement) => placement.color,
            Proposal::Draw { by } | Proposal::Win { by } => *by,
        }
    }

    /// The proposed stone, for move proposals.
    pub fn placement(&self) -> Option<Placement> {
        match self {
            Proposal::Move(placement) => Some(*placement),
            _ => None,
        }
    }
}

impl std::fmt::Display for Proposal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Proposal::Move(p) => write!(f, "{} wants to move on {}, {}", p.color, p.x, p.y),
            Proposal::Draw { by } => write!(f, "{} offers a draw", by),
            Proposal::Win { by } => write!(f, "{} claims the win", by),
        }
    }
}

/// What a proposer is claiming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Claim {
    /// Place a stone at `(x, y)`.
    Move {
        /// Column.
        x: usize,
        /// Row.
        y: usize,
    },
    /// Offer a draw.
    Draw,
    /// Claim the win.
    Win,
}

impl Claim {
    /// The kind of proposal this claim produces.
    pub fn kind(&self) -> ProposalKind {
        match self {
            Claim::Move { .. } => ProposalKind::Move,
            Claim::Draw => ProposalKind::Draw,
            Claim::Win => ProposalKind::Win,
        }
    }
}

/// Intent to open a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Propose {
    /// Side acting.
    pub actor: Color,
    /// What is being claimed.
    pub claim: Claim,
}

impl Propose {
    /// Creates a proposal intent.
    pub fn new(actor: Color, claim: Claim) -> Self {
        Self { actor, claim }
    }

    /// The ledger call that submits this proposal.
    pub fn call(&self) -> ContractCall {
        match self.claim {
            Claim::Move { x, y } => ContractCall::ProposeMove { x, y },
            Claim::Draw => ContractCall::ProposeDraw,
            Claim::Win => ContractCall::ProposeWinner,
        }
    }
}

/// Intent to settle a pending proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Authorize {
    /// Side acting.
    pub actor: Color,
    /// Which kind of pending proposal is being settled.
    pub kind: ProposalKind,
    /// `true` finalizes the claim, `false` rejects it.
    pub approve: bool,
}

impl Authorize {
    /// Creates an authorization intent.
    pub fn new(actor: Color, kind: ProposalKind, approve: bool) -> Self {
        Self { actor, kind, approve }
    }

    /// The ledger call that submits this decision.
    pub fn call(&self) -> ContractCall {
        let approve = self.approve;
        match self.kind {
            ProposalKind::Move => ContractCall::AuthorizeMove { approve },
            ProposalKind::Draw => ContractCall::AuthorizeDraw { approve },
            ProposalKind::Win => ContractCall::AuthorizeWinner { approve },
        }
    }
}
