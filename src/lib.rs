//! Strictly Baduk library - Go games played on a contract ledger
//!
//! All game state lives in a ledger contract. This library rebuilds a
//! point-in-time view of a game from the ledger's move log and flags, and
//! drives the two-call handshake (propose, then authorize or reject) by
//! which every move, draw and win is agreed.
//!
//! # Architecture
//!
//! - **Ledger**: the [`LedgerClient`] trait, with a BlockCypher REST backend
//!   and an in-memory emulation of the game contract
//! - **Games**: board engine, move-log replay, phase projection and the
//!   preconditions of every action
//! - **Session**: [`GameSession`], one contract seen through one client
//!
//! # Example
//!
//! ```no_run
//! use strictly_baduk::{BlockCypherClient, ContractAddress, GameSession, LedgerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = LedgerConfig::default().with_env_overrides();
//! let client = BlockCypherClient::new(&config);
//! let session = GameSession::new(&client, ContractAddress::from("6b0e2a6f"));
//!
//! let game = session.snapshot().await?;
//! println!("{}", game);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod error;
mod games;
mod ledger;
mod session;

// Crate-level exports - Configuration
pub use config::{ConfigError, GasLimits, LedgerConfig, TOKEN_ENV};

// Crate-level exports - Errors
pub use error::GameError;

// Crate-level exports - Ledger access
pub use ledger::{
    AuthKey, BlockCypherClient, ContractAddress, ContractCall, FieldQuery, GameTemplate,
    GameTerms, LedgerClient, LedgerReader, MemoryLedger, Receipt, Wei, decode_bool,
    decode_placement, decode_uint, decode_winner, describe_failure,
};

// Crate-level exports - Session
pub use session::{GameSession, publish_game};

// Crate-level exports - Game types
pub use games::baduk::{
    Authorize, AuthorizeContract, AwaitingAuthorization, BoardEngine, BoardError, CellAvailable,
    Claim, Color, Contract, GameOpen, GameSnapshot, GoBoard, LedgerFields, MoveLogReplayer,
    MoveRecord, NotProposer, Outcome, Phase, Placement, PlayersTurn, Proposal, ProposalKind,
    Propose, ProposeContract, RawFlags, Replay, Winner, invariants, project, replay_moves,
};
