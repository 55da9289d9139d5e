//! Point-in-time game view assembled from the ledger.

use super::action::Proposal;
use super::board::{BoardEngine, GoBoard};
use super::phases::{LedgerFields, Phase, RawFlags, project};
use super::replay::{MoveLogReplayer, Replay};
use super::types::{Color, MoveRecord, Winner};
use crate::error::GameError;
use crate::ledger::{ContractAddress, LedgerClient, LedgerReader};
use derive_getters::Getters;
use serde::Serialize;
use tracing::{debug, instrument};

/// Fully reconstructed game state at one moment.
///
/// Built fresh for every request and never cached. Two snapshots of the
/// same contract taken moments apart may differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct GameSnapshot<B = GoBoard> {
    /// Contract holding the game.
    contract: ContractAddress,
    /// Board dimension.
    size: usize,
    /// Wager escrowed by both sides.
    confirmed: bool,
    /// Black is the side to move when nothing is pending.
    black_turn: bool,
    /// A proposal awaits the opponent.
    approval_lock: bool,
    /// Draw finalized.
    draw: bool,
    /// Finalized winner.
    winner: Winner,
    /// Outstanding claim, present iff `approval_lock`.
    pending: Option<Proposal>,
    /// Phase projected from the fields above.
    phase: Phase,
    /// Committed moves in order.
    history: Vec<MoveRecord>,
    /// Area score for Black.
    black_score: u32,
    /// Area score for White.
    white_score: u32,
    /// Board after replaying `history`.
    board: B,
}

impl<B> GameSnapshot<B> {
    /// The side to move when nothing is pending.
    pub fn to_move(&self) -> Color {
        Color::to_move(self.black_turn)
    }
}

impl<B: BoardEngine> GameSnapshot<B> {
    /// Reads the game's flags and move log and assembles a snapshot.
    ///
    /// The flag reads and the size read are issued concurrently; the move
    /// log is then fetched in order.
    ///
    /// # Errors
    ///
    /// Any read, decode or replay failure aborts the whole snapshot.
    #[instrument(skip(client, contract), fields(contract = %contract))]
    pub async fn load<L: LedgerClient + ?Sized>(
        client: &L,
        contract: &ContractAddress,
    ) -> Result<Self, GameError> {
        let reader = LedgerReader::new(client, contract);
        let (confirmed, black_turn, approval_lock, draw, winner, size) = tokio::try_join!(
            reader.confirmed(),
            reader.black_turn(),
            reader.approval_lock(),
            reader.draw(),
            reader.winner(),
            reader.size()
        )?;

        let raw = RawFlags {
            confirmed,
            black_turn,
            approval_lock,
            draw,
            winner,
        };
        let proposed = if raw.expects_proposed_move() {
            Some(reader.proposed().await?)
        } else {
            None
        };
        let fields = LedgerFields::from_raw(raw, proposed)?;

        let replay = MoveLogReplayer::new(client, contract).replay::<B>(size).await?;
        let snapshot = Self::assemble(contract.clone(), size, fields, replay);
        debug!(phase = %snapshot.phase, moves = snapshot.history.len(), "Assembled snapshot");
        Ok(snapshot)
    }

    /// Builds a snapshot from already interpreted fields and a replay.
    pub fn assemble(
        contract: ContractAddress,
        size: usize,
        fields: LedgerFields,
        replay: Replay<B>,
    ) -> Self {
        let (black_score, white_score) = replay.board.score();
        Self {
            contract,
            size,
            confirmed: fields.confirmed,
            black_turn: fields.black_turn,
            approval_lock: fields.approval_lock,
            draw: fields.draw,
            winner: fields.winner,
            pending: fields.pending,
            phase: project(&fields),
            history: replay.history,
            black_score,
            white_score,
            board: replay.board,
        }
    }

    /// Text rendering of the board.
    pub fn render(&self) -> String {
        self.board.render()
    }
}

impl<B: BoardEngine> std::fmt::Display for GameSnapshot<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Game {} ({}x{})", self.contract, self.size, self.size)?;
        writeln!(f, "Phase: {}", self.phase)?;
        if let Some(pending) = &self.pending {
            writeln!(f, "Pending: {}", pending)?;
        }
        writeln!(
            f,
            "Score: black {} / white {} after {} moves",
            self.black_score,
            self.white_score,
            self.history.len()
        )?;
        write!(f, "{}", self.board.render())
    }
}
