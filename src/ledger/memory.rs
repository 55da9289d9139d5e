//! In-process emulation of the game contract.
//!
//! Callers are identified by their key string: the key that published a
//! game plays Black, and the opponent address given in the terms is the key
//! White signs with. Calls the contract would revert are rejected with
//! [`GameError::Submission`] and leave the state untouched.

use super::{
    AuthKey, ContractAddress, ContractCall, FieldQuery, GameTemplate, GameTerms, LedgerClient,
    Receipt, Wei,
};
use crate::error::GameError;
use crate::games::baduk::{Color, Placement};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Storage of one emulated game contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct GameContract {
    black: String,
    white: String,
    size: usize,
    balance: Wei,
    confirmed: bool,
    black_turn: bool,
    approval_lock: bool,
    draw: bool,
    winner: u64,
    proposed: Option<Placement>,
    moves: Vec<Placement>,
}

impl GameContract {
    fn new(black: &str, terms: &GameTerms) -> Self {
        Self {
            black: black.to_string(),
            white: terms.opponent.clone(),
            size: terms.size,
            balance: terms.wager,
            confirmed: false,
            black_turn: true,
            approval_lock: false,
            draw: false,
            winner: 0,
            proposed: None,
            moves: Vec::new(),
        }
    }

    fn color_of(&self, key: &str) -> Option<Color> {
        if key == self.black {
            Some(Color::Black)
        } else if key == self.white {
            Some(Color::White)
        } else {
            None
        }
    }

    fn to_move(&self) -> Color {
        Color::to_move(self.black_turn)
    }

    fn is_over(&self) -> bool {
        !self.approval_lock && (self.winner != 0 || self.draw)
    }

    fn ensure_in_play(&self) -> Result<(), String> {
        if !self.confirmed {
            return Err("game not confirmed".to_string());
        }
        if self.is_over() {
            return Err("game is over".to_string());
        }
        Ok(())
    }

    fn field(&self, query: &FieldQuery) -> Result<Vec<Value>, String> {
        let placement = |p: Option<&Placement>| match p {
            Some(p) => vec![json!(p.x), json!(p.y), json!(p.color.code())],
            None => vec![json!(0), json!(0), json!(0)],
        };
        Ok(match query {
            FieldQuery::Confirmed => vec![json!(self.confirmed)],
            FieldQuery::BlackTurn => vec![json!(self.black_turn)],
            FieldQuery::ApprovalLock => vec![json!(self.approval_lock)],
            FieldQuery::Draw => vec![json!(self.draw)],
            FieldQuery::Winner => vec![json!(self.winner)],
            FieldQuery::Size => vec![json!(self.size)],
            FieldQuery::NumMoves => vec![json!(self.moves.len())],
            FieldQuery::Move { index } => {
                let record = usize::try_from(*index)
                    .ok()
                    .and_then(|i| self.moves.get(i))
                    .ok_or_else(|| format!("move {} does not exist", index))?;
                placement(Some(record))
            }
            FieldQuery::Proposed => placement(self.proposed.as_ref()),
        })
    }

    /// Applies `call` from `caller`, or explains why the contract reverts.
    fn apply(&mut self, call: &ContractCall, caller: &str) -> Result<(), String> {
        let color = self
            .color_of(caller)
            .ok_or_else(|| "caller is not a player in this game".to_string())?;

        match call {
            ContractCall::ConfirmNewGame { wager } => {
                if self.confirmed {
                    return Err("game already confirmed".to_string());
                }
                if color != Color::White {
                    return Err("only the opponent confirms".to_string());
                }
                if *wager != self.balance {
                    return Err(format!("wager {} does not match escrow {}", wager, self.balance));
                }
                self.balance = Wei(self.balance.0 + wager.0);
                self.confirmed = true;
            }
            ContractCall::ProposeMove { x, y } => {
                self.open_claim(color)?;
                if *x >= self.size || *y >= self.size {
                    return Err(format!("({}, {}) is off the board", x, y));
                }
                self.proposed = Some(Placement::new(*x, *y, color));
            }
            ContractCall::ProposeDraw => {
                self.open_claim(color)?;
                self.draw = true;
            }
            ContractCall::ProposeWinner => {
                self.open_claim(color)?;
                self.winner = color.code();
            }
            ContractCall::AuthorizeMove { approve } => {
                let proposed = self.proposed.ok_or_else(|| "no move proposed".to_string())?;
                self.settle(color, proposed.color)?;
                if *approve {
                    self.moves.push(proposed);
                    self.black_turn = !self.black_turn;
                }
                self.proposed = None;
            }
            ContractCall::AuthorizeDraw { approve } => {
                if !(self.approval_lock && self.draw) {
                    return Err("no draw proposed".to_string());
                }
                self.settle(color, self.to_move())?;
                if !*approve {
                    self.draw = false;
                }
            }
            ContractCall::AuthorizeWinner { approve } => {
                let claimant = Color::from_code(self.winner)
                    .filter(|_| self.approval_lock)
                    .ok_or_else(|| "no win claimed".to_string())?;
                self.settle(color, claimant)?;
                if !*approve {
                    self.winner = 0;
                }
            }
        }
        Ok(())
    }

    fn open_claim(&mut self, color: Color) -> Result<(), String> {
        self.ensure_in_play()?;
        if self.approval_lock {
            return Err("a proposal is already pending".to_string());
        }
        if color != self.to_move() {
            return Err(format!("not {}'s turn", color));
        }
        self.approval_lock = true;
        Ok(())
    }

    fn settle(&mut self, color: Color, proposer: Color) -> Result<(), String> {
        self.ensure_in_play()?;
        if !self.approval_lock {
            return Err("nothing to authorize".to_string());
        }
        if color == proposer {
            return Err("proposer cannot authorize their own claim".to_string());
        }
        self.approval_lock = false;
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerState {
    contracts: BTreeMap<ContractAddress, GameContract>,
    published: u64,
    #[serde(skip)]
    submissions: usize,
    #[serde(skip)]
    failing_fields: BTreeSet<String>,
}

/// Game contracts held in memory.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: Mutex<LedgerState>,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a ledger saved with [`MemoryLedger::save`]. A missing file
    /// yields an empty ledger.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let content = match tokio::fs::read_to_string(path.as_ref()).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No saved ledger, starting empty");
                return Ok(Self::new());
            }
            Err(e) => return Err(e),
        };
        let state: LedgerState = serde_json::from_str(&content)?;
        debug!(contracts = state.contracts.len(), "Loaded saved ledger");
        Ok(Self {
            state: Mutex::new(state),
        })
    }

    /// Writes every contract to `path` as JSON.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let content = {
            let state = self.state.lock().await;
            serde_json::to_string_pretty(&*state)?
        };
        tokio::fs::write(path, content).await
    }

    /// Number of mutating calls received, accepted or not.
    pub async fn submissions(&self) -> usize {
        self.state.lock().await.submissions
    }

    /// Makes every subsequent read of `method` fail.
    pub async fn fail_reads_of(&self, method: &str) {
        self.state.lock().await.failing_fields.insert(method.to_string());
    }

    /// Appends a move to the log without any of the contract's checks.
    pub async fn append_raw_move(
        &self,
        contract: &ContractAddress,
        placement: Placement,
    ) -> Result<(), GameError> {
        let mut state = self.state.lock().await;
        let game = state
            .contracts
            .get_mut(contract)
            .ok_or_else(|| GameError::submission("append", format!("no contract at {}", contract)))?;
        game.moves.push(placement);
        Ok(())
    }
}

#[async_trait]
impl LedgerClient for MemoryLedger {
    #[instrument(skip(self), fields(contract = %contract, field = %query))]
    async fn read(
        &self,
        contract: &ContractAddress,
        query: &FieldQuery,
    ) -> Result<Vec<Value>, GameError> {
        let state = self.state.lock().await;
        if state.failing_fields.contains(query.method()) {
            return Err(GameError::retrieval(query.to_string(), "injected read failure"));
        }
        let game = state
            .contracts
            .get(contract)
            .ok_or_else(|| GameError::retrieval(query.to_string(), format!("no contract at {}", contract)))?;
        game.field(query)
            .map_err(|message| GameError::retrieval(query.to_string(), message))
    }

    #[instrument(skip(self, key), fields(contract = %contract, method = call.method()))]
    async fn submit(
        &self,
        contract: &ContractAddress,
        call: &ContractCall,
        key: &AuthKey,
    ) -> Result<Receipt, GameError> {
        let mut state = self.state.lock().await;
        state.submissions += 1;
        let game = state
            .contracts
            .get_mut(contract)
            .ok_or_else(|| GameError::submission(call.method(), format!("no contract at {}", contract)))?;

        // Work on a copy so a revert leaves storage as it was.
        let mut next = game.clone();
        match next.apply(call, key.expose()) {
            Ok(()) => {
                *game = next;
                info!("Call accepted");
                Ok(Receipt {
                    contract: contract.clone(),
                    method: call.method(),
                })
            }
            Err(reason) => {
                warn!(%reason, "Call reverted");
                Err(GameError::submission(call.method(), format!("reverted: {}", reason)))
            }
        }
    }

    #[instrument(skip(self, key, template), fields(size = terms.size, wager = %terms.wager))]
    async fn publish(
        &self,
        key: &AuthKey,
        template: &GameTemplate,
        terms: &GameTerms,
    ) -> Result<ContractAddress, GameError> {
        debug!(contract_name = %template.name, "Emulating contract deployment");
        let mut state = self.state.lock().await;
        state.published += 1;
        let address = ContractAddress::new(format!("{:040x}", state.published));
        state
            .contracts
            .insert(address.clone(), GameContract::new(key.expose(), terms));
        info!(%address, "Published game contract");
        Ok(address)
    }

    async fn balance(&self, contract: &ContractAddress) -> Result<Wei, GameError> {
        let state = self.state.lock().await;
        state
            .contracts
            .get(contract)
            .map(|game| game.balance)
            .ok_or_else(|| GameError::retrieval("balance", format!("no contract at {}", contract)))
    }
}
