//! Ledger access: the trait the game logic talks to, and its backends.
//!
//! The ledger is the only place game state lives. Nothing read through
//! this module is cached; each call goes to the backend.

mod blockcypher;
mod codec;
mod memory;

pub use blockcypher::{BlockCypherClient, describe_failure};
pub use codec::{
    ContractCall, FieldQuery, decode_bool, decode_placement, decode_uint, decode_winner,
};
pub use memory::MemoryLedger;

use crate::error::GameError;
use crate::games::baduk::{Placement, Winner};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Address of one deployed game contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractAddress(String);

impl ContractAddress {
    /// Wraps an address string.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// The address as sent to the ledger.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContractAddress {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl From<String> for ContractAddress {
    fn from(address: String) -> Self {
        Self(address)
    }
}

/// Signing key for mutating calls.
///
/// Never logged; `Debug` prints a placeholder.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AuthKey(String);

impl AuthKey {
    /// Wraps a hex private key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for the request body only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthKey(<redacted>)")
    }
}

/// An amount in wei.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Wei(pub u128);

impl std::fmt::Display for Wei {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} wei", self.0)
    }
}

/// Acknowledgement that the ledger accepted a mutating call.
///
/// Acceptance says nothing about when, or whether, the call takes effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    /// Contract called.
    pub contract: ContractAddress,
    /// Method called.
    pub method: &'static str,
}

/// Parameters of a new game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTerms {
    /// Board dimension.
    pub size: usize,
    /// Address of the White player.
    pub opponent: String,
    /// Wager escrowed by the publisher.
    pub wager: Wei,
}

impl GameTerms {
    /// Smallest playable board.
    pub const MIN_SIZE: usize = 2;
    /// Largest board the contract accepts.
    pub const MAX_SIZE: usize = 19;

    /// Creates game terms.
    pub fn new(size: usize, opponent: impl Into<String>, wager: Wei) -> Self {
        Self {
            size,
            opponent: opponent.into(),
            wager,
        }
    }

    /// Checks the terms before anything reaches the ledger.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidTerms`] for an unsupported size or an
    /// empty opponent address.
    pub fn validate(&self) -> Result<(), GameError> {
        if !(Self::MIN_SIZE..=Self::MAX_SIZE).contains(&self.size) {
            return Err(GameError::InvalidTerms(format!(
                "board size {} is outside {}..={}",
                self.size,
                Self::MIN_SIZE,
                Self::MAX_SIZE
            )));
        }
        if self.opponent.trim().is_empty() {
            return Err(GameError::InvalidTerms("opponent address is empty".to_string()));
        }
        Ok(())
    }
}

/// Contract source and the name of the contract to publish from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameTemplate {
    /// Contract name inside the source.
    pub name: String,
    /// Contract source code.
    pub solidity: String,
}

/// Backend holding game contracts.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Reads a field, returning the raw result list.
    async fn read(
        &self,
        contract: &ContractAddress,
        query: &FieldQuery,
    ) -> Result<Vec<serde_json::Value>, GameError>;

    /// Submits a mutating call signed with `key`.
    async fn submit(
        &self,
        contract: &ContractAddress,
        call: &ContractCall,
        key: &AuthKey,
    ) -> Result<Receipt, GameError>;

    /// Deploys a new game contract and returns its address.
    async fn publish(
        &self,
        key: &AuthKey,
        template: &GameTemplate,
        terms: &GameTerms,
    ) -> Result<ContractAddress, GameError>;

    /// Current balance held by a contract.
    async fn balance(&self, contract: &ContractAddress) -> Result<Wei, GameError>;
}

/// Typed reads against one contract.
pub struct LedgerReader<'a, L: LedgerClient + ?Sized> {
    client: &'a L,
    contract: &'a ContractAddress,
}

impl<'a, L: LedgerClient + ?Sized> LedgerReader<'a, L> {
    /// Creates a reader bound to `contract`.
    pub fn new(client: &'a L, contract: &'a ContractAddress) -> Self {
        Self { client, contract }
    }

    async fn fetch(&self, query: FieldQuery) -> Result<Vec<serde_json::Value>, GameError> {
        let results = self.client.read(self.contract, &query).await?;
        debug!(field = %query, ?results, "Read ledger field");
        Ok(results)
    }

    async fn flag(&self, query: FieldQuery) -> Result<bool, GameError> {
        decode_bool(&query.to_string(), &self.fetch(query).await?)
    }

    async fn uint(&self, query: FieldQuery) -> Result<u64, GameError> {
        decode_uint(&query.to_string(), &self.fetch(query).await?)
    }

    /// `confirmed`
    pub async fn confirmed(&self) -> Result<bool, GameError> {
        self.flag(FieldQuery::Confirmed).await
    }

    /// `blackTurn`
    pub async fn black_turn(&self) -> Result<bool, GameError> {
        self.flag(FieldQuery::BlackTurn).await
    }

    /// `approvalLock`
    pub async fn approval_lock(&self) -> Result<bool, GameError> {
        self.flag(FieldQuery::ApprovalLock).await
    }

    /// `draw`
    pub async fn draw(&self) -> Result<bool, GameError> {
        self.flag(FieldQuery::Draw).await
    }

    /// `winner`
    pub async fn winner(&self) -> Result<Winner, GameError> {
        let query = FieldQuery::Winner;
        decode_winner(&query.to_string(), &self.fetch(query).await?)
    }

    /// Board dimension, within the bounds [`GameTerms`] accepts.
    pub async fn size(&self) -> Result<usize, GameError> {
        let size = self.uint(FieldQuery::Size).await?;
        let size = usize::try_from(size).map_err(|e| GameError::decode("size", e.to_string()))?;
        if !(GameTerms::MIN_SIZE..=GameTerms::MAX_SIZE).contains(&size) {
            return Err(GameError::decode(
                "size",
                format!(
                    "board size {} outside {}..={}",
                    size,
                    GameTerms::MIN_SIZE,
                    GameTerms::MAX_SIZE
                ),
            ));
        }
        Ok(size)
    }

    /// Length of the move log.
    pub async fn num_moves(&self) -> Result<u64, GameError> {
        self.uint(FieldQuery::NumMoves).await
    }

    /// One committed move.
    #[instrument(skip(self), fields(contract = %self.contract))]
    pub async fn move_at(&self, index: u64) -> Result<Placement, GameError> {
        let query = FieldQuery::Move { index };
        decode_placement(&query.to_string(), &self.fetch(query).await?)
    }

    /// The move awaiting authorization.
    pub async fn proposed(&self) -> Result<Placement, GameError> {
        let query = FieldQuery::Proposed;
        decode_placement(&query.to_string(), &self.fetch(query).await?)
    }
}
