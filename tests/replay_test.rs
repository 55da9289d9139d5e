//! Tests for move-log replay and snapshot assembly.

use strictly_baduk::{
    AuthKey, BoardEngine, BoardError, Color, ContractAddress, GameError, GameSession,
    GameSnapshot, GameTemplate, GameTerms, GoBoard, LedgerClient, MemoryLedger, MoveLogReplayer,
    Placement, Replay, Wei, publish_game,
};

const BLACK: &str = "black-key";
const WHITE: &str = "white-key";

async fn game_with_moves(ledger: &MemoryLedger, moves: &[(usize, usize)]) -> ContractAddress {
    let template = GameTemplate {
        name: "EthDuck".to_string(),
        solidity: String::new(),
    };
    let terms = GameTerms::new(9, WHITE, Wei(0));
    let (black, white) = (AuthKey::new(BLACK), AuthKey::new(WHITE));
    let contract = publish_game(ledger, &template, &black, &terms).await.unwrap();
    let session = GameSession::new(ledger, contract.clone());
    session.confirm(&white).await.unwrap();

    for (i, &(x, y)) in moves.iter().enumerate() {
        let (color, mover, opponent) = if i % 2 == 0 {
            (Color::Black, &black, &white)
        } else {
            (Color::White, &white, &black)
        };
        session.propose_move(mover, color, x, y).await.unwrap();
        session
            .authorize_move(opponent, color.opponent(), true)
            .await
            .unwrap();
    }
    contract
}

/// Board engine that only counts stones, to show any engine can be plugged in.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StoneCounter {
    size: usize,
    stones: Vec<(usize, usize, Color)>,
}

impl BoardEngine for StoneCounter {
    fn init(size: usize) -> Self {
        Self {
            size,
            stones: Vec::new(),
        }
    }

    fn size(&self) -> usize {
        self.size
    }

    fn stone_at(&self, x: usize, y: usize) -> Option<Color> {
        self.stones
            .iter()
            .find(|&&(sx, sy, _)| (sx, sy) == (x, y))
            .map(|&(_, _, color)| color)
    }

    fn place_black(&mut self, x: usize, y: usize) -> Result<(), BoardError> {
        self.put(x, y, Color::Black)
    }

    fn place_white(&mut self, x: usize, y: usize) -> Result<(), BoardError> {
        self.put(x, y, Color::White)
    }

    fn score(&self) -> (u32, u32) {
        let black = self.stones.iter().filter(|s| s.2 == Color::Black).count() as u32;
        (black, self.stones.len() as u32 - black)
    }

    fn render(&self) -> String {
        format!("{} stones", self.stones.len())
    }
}

impl StoneCounter {
    fn put(&mut self, x: usize, y: usize, color: Color) -> Result<(), BoardError> {
        if !self.contains(x, y) {
            return Err(BoardError::OutOfBounds {
                x,
                y,
                size: self.size,
            });
        }
        if self.stone_at(x, y).is_some() {
            return Err(BoardError::Occupied { x, y });
        }
        self.stones.push((x, y, color));
        Ok(())
    }
}

#[tokio::test]
async fn test_replay_is_deterministic() {
    let ledger = MemoryLedger::new();
    let contract = game_with_moves(&ledger, &[(2, 2), (2, 3), (3, 2), (6, 6)]).await;
    let replayer = MoveLogReplayer::new(&ledger, &contract);

    let first: Replay<GoBoard> = replayer.replay(9).await.unwrap();
    let second: Replay<GoBoard> = replayer.replay(9).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.board.score(), second.board.score());
}

#[tokio::test]
async fn test_colors_alternate_from_black() {
    let ledger = MemoryLedger::new();
    let contract = game_with_moves(&ledger, &[(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)]).await;
    let game = GameSession::new(&ledger, contract).snapshot().await.unwrap();

    assert_eq!(game.history().len(), 5);
    for record in game.history() {
        let is_black = record.placement.color == Color::Black;
        assert_eq!(is_black, record.index % 2 == 0, "record {}", record.index);
    }
}

#[tokio::test]
async fn test_failed_move_read_aborts_snapshot() {
    let ledger = MemoryLedger::new();
    let contract = game_with_moves(&ledger, &[(0, 0), (1, 1)]).await;
    ledger.fail_reads_of("getMove").await;

    let result = GameSession::new(&ledger, contract).snapshot().await;
    assert!(matches!(result, Err(GameError::Retrieval { .. })));
}

#[tokio::test]
async fn test_failed_flag_read_aborts_snapshot() {
    let ledger = MemoryLedger::new();
    let contract = game_with_moves(&ledger, &[]).await;
    ledger.fail_reads_of("approvalLock").await;

    let result = GameSession::new(&ledger, contract).snapshot().await;
    assert!(matches!(result, Err(GameError::Retrieval { .. })));
}

#[tokio::test]
async fn test_occupied_move_in_log_aborts_snapshot() {
    let ledger = MemoryLedger::new();
    let contract = game_with_moves(&ledger, &[(4, 4)]).await;
    ledger
        .append_raw_move(&contract, Placement::new(4, 4, Color::White))
        .await
        .unwrap();

    let result = GameSession::new(&ledger, contract).snapshot().await;
    assert_eq!(
        result.unwrap_err(),
        GameError::Coordinate(BoardError::Occupied { x: 4, y: 4 })
    );
}

#[tokio::test]
async fn test_unknown_contract_is_retrieval_error() {
    let ledger = MemoryLedger::new();
    let result = GameSession::new(&ledger, ContractAddress::from("nowhere"))
        .snapshot()
        .await;
    assert!(matches!(result, Err(GameError::Retrieval { .. })));
}

#[tokio::test]
async fn test_snapshot_accepts_other_engines() {
    let ledger = MemoryLedger::new();
    let contract = game_with_moves(&ledger, &[(0, 0), (8, 8), (4, 4)]).await;
    let game: GameSnapshot<StoneCounter> = GameSession::new(&ledger, contract)
        .snapshot_with()
        .await
        .unwrap();

    assert_eq!((*game.black_score(), *game.white_score()), (2, 1));
    assert_eq!(game.render(), "3 stones");
}

#[tokio::test]
async fn test_captures_show_up_in_snapshot() {
    let ledger = MemoryLedger::new();
    // Black surrounds the white stone at (1, 1).
    let contract = game_with_moves(
        &ledger,
        &[(1, 0), (1, 1), (0, 1), (8, 8), (2, 1), (8, 7), (1, 2)],
    )
    .await;
    let game = GameSession::new(&ledger, contract).snapshot().await.unwrap();

    assert_eq!(game.board().stone_at(1, 1), None);
    assert_eq!(game.history().len(), 7);
}

#[tokio::test]
async fn test_out_of_range_ledger_size_is_decode_error() {
    let ledger = MemoryLedger::new();
    let template = GameTemplate {
        name: "EthDuck".to_string(),
        solidity: String::new(),
    };
    let (black, white) = (AuthKey::new(BLACK), AuthKey::new(WHITE));

    for size in [usize::MAX, 20, 1] {
        // Deploy directly so the terms skip client-side validation.
        let terms = GameTerms::new(size, WHITE, Wei(0));
        let contract = ledger.publish(&black, &template, &terms).await.unwrap();
        let session = GameSession::new(&ledger, contract);

        let result = session.snapshot().await;
        assert!(
            matches!(result, Err(GameError::Decode { .. })),
            "size {}: {:?}",
            size,
            result
        );
        assert!(session.confirm(&white).await.is_err());
    }
}
