//! Board reconstruction from the committed move log.

use super::board::BoardEngine;
use super::invariants::{HistoryInvariants, InvariantSet};
use super::types::MoveRecord;
use crate::error::GameError;
use crate::ledger::{ContractAddress, LedgerClient, LedgerReader};
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// A board rebuilt from the move log, with the log it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replay<B> {
    /// Board after every committed move.
    pub board: B,
    /// Committed moves in ledger order.
    pub history: Vec<MoveRecord>,
}

/// Pulls the move log from the ledger and replays it.
pub struct MoveLogReplayer<'a, L: LedgerClient + ?Sized> {
    reader: LedgerReader<'a, L>,
}

impl<'a, L: LedgerClient + ?Sized> MoveLogReplayer<'a, L> {
    /// Creates a replayer for one contract.
    pub fn new(client: &'a L, contract: &'a ContractAddress) -> Self {
        Self {
            reader: LedgerReader::new(client, contract),
        }
    }

    /// Fetches every committed move in index order and replays them onto
    /// an empty `size`x`size` board.
    ///
    /// Moves are fetched one at a time; the first failed read aborts the
    /// whole replay.
    ///
    /// # Errors
    ///
    /// - [`GameError::Retrieval`] if any read fails
    /// - [`GameError::Decode`] if a move carries an unknown color code
    /// - [`GameError::Coordinate`] if a move lands on an occupied or
    ///   off-board intersection
    #[instrument(skip(self))]
    pub async fn replay<B: BoardEngine>(&self, size: usize) -> Result<Replay<B>, GameError> {
        let count = self.reader.num_moves().await?;
        debug!(count, "Fetching move log");

        let mut history = Vec::new();
        for index in 0..count {
            let placement = self.reader.move_at(index).await?;
            history.push(MoveRecord::new(index, placement));
        }

        replay_moves(size, history)
    }
}

/// Replays an already fetched move log onto an empty board.
///
/// Move-log invariants are reported with `warn!` but do not stop the
/// replay; only an illegal placement does.
pub fn replay_moves<B: BoardEngine>(
    size: usize,
    history: Vec<MoveRecord>,
) -> Result<Replay<B>, GameError> {
    if let Err(violations) = HistoryInvariants::check_all(history.as_slice()) {
        for violation in &violations {
            warn!(description = %violation.description, "Move log violates invariant");
        }
    }

    let mut board = B::init(size);
    for record in &history {
        board.place(record.placement).map_err(|e| {
            warn!(index = record.index, error = %e, "Move log contains an illegal placement");
            GameError::from(e)
        })?;
    }

    Ok(Replay { board, history })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::baduk::{BoardError, Color, GoBoard, Placement};

    fn record(index: u64, x: usize, y: usize, color: Color) -> MoveRecord {
        MoveRecord::new(index, Placement::new(x, y, color))
    }

    #[test]
    fn test_replay_places_every_move() {
        let history = vec![record(0, 0, 0, Color::Black), record(1, 4, 4, Color::White)];
        let replay: Replay<GoBoard> = replay_moves(5, history.clone()).unwrap();
        assert_eq!(replay.board.stone_at(0, 0), Some(Color::Black));
        assert_eq!(replay.board.stone_at(4, 4), Some(Color::White));
        assert_eq!(replay.history, history);
    }

    #[test]
    fn test_occupied_cell_aborts() {
        let history = vec![record(0, 1, 1, Color::Black), record(1, 1, 1, Color::White)];
        let result: Result<Replay<GoBoard>, _> = replay_moves(5, history);
        assert_eq!(
            result.unwrap_err(),
            GameError::Coordinate(BoardError::Occupied { x: 1, y: 1 })
        );
    }

    #[test]
    fn test_out_of_range_aborts() {
        let history = vec![record(0, 5, 0, Color::Black)];
        let result: Result<Replay<GoBoard>, _> = replay_moves(5, history);
        assert!(matches!(
            result,
            Err(GameError::Coordinate(BoardError::OutOfBounds { .. }))
        ));
    }

    #[test]
    fn test_invariant_violations_do_not_abort() {
        let history = vec![record(0, 0, 0, Color::White)];
        let replay: Replay<GoBoard> = replay_moves(3, history).unwrap();
        assert_eq!(replay.board.stone_at(0, 0), Some(Color::White));
    }
}
