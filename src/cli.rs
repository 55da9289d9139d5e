//! Command-line interface for strictly_baduk.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use strictly_baduk::Color;

/// Environment variable holding the signing key.
pub const KEY_ENV: &str = "STRICTLY_BADUK_KEY";

/// Strictly Baduk - Go on a contract ledger
#[derive(Parser, Debug)]
#[command(name = "strictly_baduk")]
#[command(about = "Play Go through a ledger contract, one proposal at a time", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Ledger configuration file (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Use an in-process ledger persisted to this JSON file instead of the network
    #[arg(long, global = true, value_name = "STATE_FILE")]
    pub memory: Option<PathBuf>,

    /// Private key used to sign calls (falls back to STRICTLY_BADUK_KEY)
    #[arg(long, global = true)]
    pub key: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the current state of a game
    Show {
        /// Game contract address
        contract: String,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Publish a new game; the signer plays Black
    New {
        /// Board size
        #[arg(long, default_value = "19")]
        size: usize,

        /// Address of the White player
        #[arg(long)]
        opponent: String,

        /// Wager in wei
        #[arg(long, default_value = "0")]
        wager: u128,
    },

    /// Match the wager and start the game (White only)
    Confirm {
        /// Game contract address
        contract: String,
    },

    /// Propose a move, a draw or a win
    Propose {
        /// Game contract address
        contract: String,

        /// Color you play
        #[arg(long = "as", value_name = "COLOR")]
        color: Color,

        /// What to propose
        #[command(subcommand)]
        claim: ClaimCommand,
    },

    /// Accept or reject the opponent's pending proposal
    Authorize {
        /// Game contract address
        contract: String,

        /// Color you play
        #[arg(long = "as", value_name = "COLOR")]
        color: Color,

        /// Kind of proposal being settled
        #[command(subcommand)]
        kind: KindCommand,
    },
}

/// Claims that can be proposed
#[derive(Subcommand, Debug)]
pub enum ClaimCommand {
    /// Place a stone
    Move {
        /// Column, from 0
        x: usize,
        /// Row, from 0
        y: usize,
    },
    /// Offer a draw
    Draw,
    /// Claim the win
    Win,
}

/// Proposal kinds that can be authorized
#[derive(Subcommand, Debug)]
pub enum KindCommand {
    /// Settle a proposed move
    Move(Decision),
    /// Settle a draw offer
    Draw(Decision),
    /// Settle a win claim
    Win(Decision),
}

/// Accept or reject
#[derive(Args, Debug, Clone, Copy)]
#[group(required = true, multiple = false)]
pub struct Decision {
    /// Accept the proposal
    #[arg(long)]
    pub approve: bool,

    /// Reject the proposal
    #[arg(long)]
    pub reject: bool,
}
