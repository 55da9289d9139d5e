//! Strictly Baduk - Unified CLI
//!
//! Reads games from the ledger and submits proposals and authorizations.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{ClaimCommand, Cli, Command, KEY_ENV, KindCommand};
use strictly_baduk::{
    AuthKey, BlockCypherClient, ContractAddress, GameSession, GameTemplate, GameTerms,
    LedgerClient, LedgerConfig, MemoryLedger, Receipt, Wei, publish_game,
};
use tracing::{debug, info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => LedgerConfig::from_file(path)?,
        None => LedgerConfig::default(),
    }
    .with_env_overrides();

    match &cli.memory {
        Some(path) => {
            info!(path = %path.display(), "Using in-process ledger");
            let ledger = MemoryLedger::load(path)
                .await
                .with_context(|| format!("Failed to load ledger state from {}", path.display()))?;
            let result = run(&cli, &config, &ledger).await;
            ledger
                .save(path)
                .await
                .with_context(|| format!("Failed to save ledger state to {}", path.display()))?;
            result
        }
        None => {
            let client = BlockCypherClient::new(&config);
            run(&cli, &config, &client).await
        }
    }
}

/// Runs one command against `client`.
#[instrument(skip_all)]
async fn run<L: LedgerClient + ?Sized>(cli: &Cli, config: &LedgerConfig, client: &L) -> Result<()> {
    match &cli.command {
        Command::Show { contract, json } => {
            let session = GameSession::new(client, ContractAddress::from(contract.as_str()));
            let game = session.snapshot().await?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&game)?);
            } else {
                println!("{}", game);
            }
        }

        Command::New {
            size,
            opponent,
            wager,
        } => {
            let key = signing_key(cli)?;
            let template = if cli.memory.is_some() {
                // The in-process ledger never compiles the source.
                GameTemplate {
                    name: config.contract_name().clone(),
                    solidity: String::new(),
                }
            } else {
                config.load_template()?
            };
            let terms = GameTerms::new(*size, opponent.as_str(), Wei(*wager));
            let address = publish_game(client, &template, &key, &terms).await?;
            println!("{}", address);
        }

        Command::Confirm { contract } => {
            let key = signing_key(cli)?;
            let session = GameSession::new(client, ContractAddress::from(contract.as_str()));
            report(session.confirm(&key).await?);
        }

        Command::Propose {
            contract,
            color,
            claim,
        } => {
            let key = signing_key(cli)?;
            let session = GameSession::new(client, ContractAddress::from(contract.as_str()));
            let receipt = match claim {
                ClaimCommand::Move { x, y } => session.propose_move(&key, *color, *x, *y).await?,
                ClaimCommand::Draw => session.propose_draw(&key, *color).await?,
                ClaimCommand::Win => session.propose_win(&key, *color).await?,
            };
            report(receipt);
        }

        Command::Authorize {
            contract,
            color,
            kind,
        } => {
            let key = signing_key(cli)?;
            let session = GameSession::new(client, ContractAddress::from(contract.as_str()));
            let receipt = match kind {
                KindCommand::Move(d) => session.authorize_move(&key, *color, d.approve).await?,
                KindCommand::Draw(d) => session.authorize_draw(&key, *color, d.approve).await?,
                KindCommand::Win(d) => session.authorize_win(&key, *color, d.approve).await?,
            };
            report(receipt);
        }
    }
    Ok(())
}

/// Signing key from `--key`, then the environment.
fn signing_key(cli: &Cli) -> Result<AuthKey> {
    let key = match &cli.key {
        Some(key) => key.clone(),
        None => std::env::var(KEY_ENV)
            .with_context(|| format!("No signing key: pass --key or set {}", KEY_ENV))?,
    };
    debug!("Signing key loaded");
    Ok(AuthKey::new(key))
}

fn report(receipt: Receipt) {
    println!(
        "{} accepted by {}; run `show {}` to see it take effect",
        receipt.method, receipt.contract, receipt.contract
    );
}
