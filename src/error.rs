//! Error types for game reconstruction and the proposal protocol.
//!
//! No variant is ever retried or recovered from inside the crate; every
//! error is terminal for the request that produced it.

use crate::games::baduk::{BoardError, Color, Phase};
use derive_more::Display;

/// Error raised while reading, reconstructing or acting on a game.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum GameError {
    /// A ledger read failed.
    #[display("Failed to read {field} from ledger: {message}")]
    Retrieval {
        /// Field or endpoint being read.
        field: String,
        /// Transport or ledger message.
        message: String,
    },

    /// The ledger rejected a mutating call.
    #[display("Ledger rejected {method}: {message}")]
    Submission {
        /// Contract method called.
        method: String,
        /// Rejection reason.
        message: String,
    },

    /// An action was attempted by the wrong side.
    #[display("It's not {acting}'s turn to act, waiting on {expected}")]
    TurnViolation {
        /// Side that attempted the action.
        acting: Color,
        /// Side entitled to act.
        expected: Color,
    },

    /// A move references an occupied or off-board intersection.
    #[display("Invalid move: {_0}")]
    Coordinate(BoardError),

    /// The ledger returned a value of unexpected shape or range.
    #[display("Unexpected ledger value for {field}: {message}")]
    Decode {
        /// Field being decoded.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// The action is not allowed in the current phase.
    #[display("Cannot {action} while the game is {phase}")]
    PhaseViolation {
        /// Action attempted.
        action: &'static str,
        /// Phase observed.
        phase: Phase,
    },

    /// Game creation parameters were rejected before reaching the ledger.
    #[display("Invalid game terms: {_0}")]
    InvalidTerms(String),
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::Coordinate(e) => Some(e),
            _ => None,
        }
    }
}

impl GameError {
    /// Creates a retrieval error.
    pub fn retrieval(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Retrieval {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a submission error.
    pub fn submission(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Submission {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Creates a decode error.
    pub fn decode(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<BoardError> for GameError {
    fn from(err: BoardError) -> Self {
        Self::Coordinate(err)
    }
}
