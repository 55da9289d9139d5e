//! Request-scoped access to one game.

use crate::error::GameError;
use crate::games::baduk::{
    Authorize, AuthorizeContract, BoardEngine, Claim, Color, Contract, GameSnapshot, GoBoard,
    Propose, ProposalKind, ProposeContract,
};
use crate::ledger::{
    AuthKey, ContractAddress, ContractCall, GameTemplate, GameTerms, LedgerClient, Receipt,
};
use tracing::{info, instrument, warn};

/// One game contract, viewed through a ledger client.
///
/// Holds no game state of its own. Every action loads a fresh snapshot,
/// checks its preconditions against it and, only if they pass, submits a
/// single call. Whether that call took effect is visible only by loading
/// another snapshot later.
pub struct GameSession<'a, L: LedgerClient + ?Sized> {
    client: &'a L,
    contract: ContractAddress,
}

impl<'a, L: LedgerClient + ?Sized> GameSession<'a, L> {
    /// Binds `client` to `contract`.
    pub fn new(client: &'a L, contract: ContractAddress) -> Self {
        Self { client, contract }
    }

    /// Loads the current game state onto the default board.
    pub async fn snapshot(&self) -> Result<GameSnapshot<GoBoard>, GameError> {
        self.snapshot_with::<GoBoard>().await
    }

    /// Loads the current game state onto any board engine.
    pub async fn snapshot_with<B: BoardEngine>(&self) -> Result<GameSnapshot<B>, GameError> {
        GameSnapshot::load(self.client, &self.contract).await
    }

    /// Escrows the opponent's wager, matching what the publisher put in.
    ///
    /// # Errors
    ///
    /// [`GameError::PhaseViolation`] if the game is already confirmed.
    #[instrument(skip(self, key), fields(contract = %self.contract))]
    pub async fn confirm(&self, key: &AuthKey) -> Result<Receipt, GameError> {
        let game = self.snapshot().await?;
        if *game.confirmed() {
            warn!("Game already confirmed");
            return Err(GameError::PhaseViolation {
                action: "confirm",
                phase: *game.phase(),
            });
        }
        let wager = self.client.balance(&self.contract).await?;
        info!(%wager, "Confirming game");
        self.client
            .submit(&self.contract, &ContractCall::ConfirmNewGame { wager }, key)
            .await
    }

    /// Proposes a stone for `color` at `(x, y)`.
    pub async fn propose_move(
        &self,
        key: &AuthKey,
        color: Color,
        x: usize,
        y: usize,
    ) -> Result<Receipt, GameError> {
        self.propose(key, Propose::new(color, Claim::Move { x, y })).await
    }

    /// Offers a draw on behalf of `color`.
    pub async fn propose_draw(&self, key: &AuthKey, color: Color) -> Result<Receipt, GameError> {
        self.propose(key, Propose::new(color, Claim::Draw)).await
    }

    /// Claims the win for `color`.
    pub async fn propose_win(&self, key: &AuthKey, color: Color) -> Result<Receipt, GameError> {
        self.propose(key, Propose::new(color, Claim::Win)).await
    }

    /// Accepts or rejects the pending move.
    pub async fn authorize_move(
        &self,
        key: &AuthKey,
        color: Color,
        approve: bool,
    ) -> Result<Receipt, GameError> {
        self.authorize(key, Authorize::new(color, ProposalKind::Move, approve))
            .await
    }

    /// Accepts or rejects the pending draw offer.
    pub async fn authorize_draw(
        &self,
        key: &AuthKey,
        color: Color,
        approve: bool,
    ) -> Result<Receipt, GameError> {
        self.authorize(key, Authorize::new(color, ProposalKind::Draw, approve))
            .await
    }

    /// Accepts or rejects the pending win claim.
    pub async fn authorize_win(
        &self,
        key: &AuthKey,
        color: Color,
        approve: bool,
    ) -> Result<Receipt, GameError> {
        self.authorize(key, Authorize::new(color, ProposalKind::Win, approve))
            .await
    }

    /// Opens a proposal once its preconditions hold.
    ///
    /// # Errors
    ///
    /// - [`GameError::PhaseViolation`] unless the game is waiting on a proposal
    /// - [`GameError::TurnViolation`] if `action.actor` is not to move
    /// - [`GameError::Coordinate`] for a move onto an occupied or off-board cell
    /// - [`GameError::Submission`] if the ledger rejects the call
    #[instrument(skip(self, key), fields(contract = %self.contract))]
    pub async fn propose(&self, key: &AuthKey, action: Propose) -> Result<Receipt, GameError> {
        let game = self.snapshot().await?;
        ProposeContract::pre(&game, &action)?;
        let call = action.call();
        info!(method = call.method(), "Submitting proposal");
        self.client.submit(&self.contract, &call, key).await
    }

    /// Settles the pending proposal once its preconditions hold.
    ///
    /// # Errors
    ///
    /// - [`GameError::PhaseViolation`] unless a claim of `action.kind` is pending
    /// - [`GameError::TurnViolation`] if `action.actor` made the claim
    /// - [`GameError::Submission`] if the ledger rejects the call
    #[instrument(skip(self, key), fields(contract = %self.contract))]
    pub async fn authorize(&self, key: &AuthKey, action: Authorize) -> Result<Receipt, GameError> {
        let game = self.snapshot().await?;
        AuthorizeContract::pre(&game, &action)?;
        let call = action.call();
        info!(method = call.method(), approve = action.approve, "Submitting authorization");
        self.client.submit(&self.contract, &call, key).await
    }
}

/// Deploys a new game from `template` and returns its address.
///
/// The publisher plays Black; `terms.opponent` plays White.
///
/// # Errors
///
/// [`GameError::InvalidTerms`] before any ledger call if the terms are
/// unusable, otherwise whatever the ledger reports.
#[instrument(skip(client, key, template), fields(size = terms.size, wager = %terms.wager))]
pub async fn publish_game<L: LedgerClient + ?Sized>(
    client: &L,
    template: &GameTemplate,
    key: &AuthKey,
    terms: &GameTerms,
) -> Result<ContractAddress, GameError> {
    terms.validate().inspect_err(|e| warn!(error = %e, "Rejected game terms"))?;
    let address = client.publish(key, template, terms).await?;
    info!(%address, "New game published");
    Ok(address)
}
