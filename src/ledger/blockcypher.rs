//! BlockCypher Ethereum contract API backend.

use super::{
    AuthKey, ContractAddress, ContractCall, FieldQuery, GameTemplate, GameTerms, LedgerClient,
    Receipt, Wei,
};
use crate::config::{GasLimits, LedgerConfig};
use crate::error::GameError;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, instrument};

/// Body of a contract request. Empty fields are left out of the JSON.
#[derive(Debug, Default, Serialize)]
struct ContractRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    private: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    params: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gas_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Wei>,
    #[serde(skip_serializing_if = "Option::is_none")]
    solidity: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    publish: Vec<&'a str>,
}

/// The parts of a contract response the game uses.
#[derive(Debug, Default, Deserialize)]
struct ContractResponse {
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    results: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    balance: Wei,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    #[serde(default)]
    error: String,
}

/// Builds the message for a non-success response.
///
/// The status line alone for rate limiting or when the body carries no
/// messages; otherwise the status line followed by every message.
pub fn describe_failure(status: StatusCode, body: &str) -> String {
    let line = format!(
        "HTTP {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    );
    if status == StatusCode::TOO_MANY_REQUESTS {
        return line;
    }
    let parsed: ErrorBody = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => return format!("{}, unreadable error body: {}", line, e),
    };
    let messages = std::iter::once(parsed.error)
        .filter(|m| !m.is_empty())
        .chain(parsed.errors.into_iter().map(|e| e.error))
        .collect::<Vec<_>>()
        .join(", ");
    if messages.is_empty() {
        line
    } else {
        format!("{}, Message(s): {}", line, messages)
    }
}

/// REST client for game contracts hosted through BlockCypher.
#[derive(Debug, Clone)]
pub struct BlockCypherClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    reader_key: String,
    gas: GasLimits,
}

impl BlockCypherClient {
    /// Creates a client from configuration.
    #[instrument(skip(config), fields(api_url = %config.api_url(), coin = %config.coin(), chain = %config.chain()))]
    pub fn new(config: &LedgerConfig) -> Self {
        let base_url = format!(
            "{}/{}/{}",
            config.api_url().trim_end_matches('/'),
            config.coin(),
            config.chain()
        );
        debug!(%base_url, "Creating BlockCypher client");
        Self {
            client: reqwest::Client::new(),
            base_url,
            token: config.token().clone(),
            reader_key: config.reader_key().clone(),
            gas: config.gas().clone(),
        }
    }

    /// Full URL for `path`, with the token attached when configured.
    fn url(&self, path: &str) -> Result<Url, String> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path)).map_err(|e| e.to_string())?;
        if let Some(token) = &self.token {
            url.query_pairs_mut().append_pair("token", token);
        }
        Ok(url)
    }

    async fn post(&self, path: &str, body: &ContractRequest<'_>) -> Result<String, String> {
        let url = self.url(path)?;
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let status = response.status();
        let text = response.text().await.map_err(|e| e.to_string())?;
        if status != StatusCode::OK && status != StatusCode::CREATED {
            return Err(describe_failure(status, &text));
        }
        Ok(text)
    }

    async fn get(&self, path: &str) -> Result<String, String> {
        let url = self.url(path)?;
        let response = self.client.get(url).send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        let text = response.text().await.map_err(|e| e.to_string())?;
        if status != StatusCode::OK {
            return Err(describe_failure(status, &text));
        }
        Ok(text)
    }
}

fn contract_path(contract: &ContractAddress, method: &str) -> String {
    format!("/contracts/{}/{}", contract, method)
}

#[async_trait]
impl LedgerClient for BlockCypherClient {
    #[instrument(skip(self), fields(contract = %contract, field = %query))]
    async fn read(
        &self,
        contract: &ContractAddress,
        query: &FieldQuery,
    ) -> Result<Vec<Value>, GameError> {
        let body = ContractRequest {
            private: Some(&self.reader_key),
            params: query.params(),
            ..ContractRequest::default()
        };
        let text = self
            .post(&contract_path(contract, query.method()), &body)
            .await
            .map_err(|message| {
                error!(%message, "Ledger read failed");
                GameError::retrieval(query.to_string(), message)
            })?;
        let response: ContractResponse = serde_json::from_str(&text)
            .map_err(|e| GameError::decode(query.to_string(), e.to_string()))?;
        Ok(response.results)
    }

    #[instrument(skip(self, key), fields(contract = %contract, method = call.method()))]
    async fn submit(
        &self,
        contract: &ContractAddress,
        call: &ContractCall,
        key: &AuthKey,
    ) -> Result<Receipt, GameError> {
        let body = ContractRequest {
            private: Some(key.expose()),
            params: call.params(),
            gas_limit: Some(call.gas_limit(&self.gas)),
            value: call.value(),
            ..ContractRequest::default()
        };
        self.post(&contract_path(contract, call.method()), &body)
            .await
            .map_err(|message| {
                error!(%message, "Ledger rejected call");
                GameError::submission(call.method(), message)
            })?;
        info!("Ledger accepted call");
        Ok(Receipt {
            contract: contract.clone(),
            method: call.method(),
        })
    }

    #[instrument(skip(self, key, template), fields(size = terms.size, wager = %terms.wager))]
    async fn publish(
        &self,
        key: &AuthKey,
        template: &GameTemplate,
        terms: &GameTerms,
    ) -> Result<ContractAddress, GameError> {
        let body = ContractRequest {
            private: Some(key.expose()),
            params: vec![serde_json::json!(terms.size), serde_json::json!(terms.opponent)],
            gas_limit: Some(*self.gas.publish()),
            value: Some(terms.wager),
            solidity: Some(&template.solidity),
            publish: vec![template.name.as_str()],
        };
        let text = self.post("/contracts", &body).await.map_err(|message| {
            error!(%message, "Contract deployment failed");
            GameError::submission("publish", message)
        })?;
        let published: Vec<ContractResponse> = serde_json::from_str(&text)
            .map_err(|e| GameError::decode("publish", e.to_string()))?;
        let address = published
            .into_iter()
            .find_map(|c| c.address.filter(|a| !a.is_empty()))
            .ok_or_else(|| GameError::decode("publish", "response carries no contract address"))?;
        info!(%address, "Published game contract");
        Ok(ContractAddress::new(address))
    }

    #[instrument(skip(self), fields(contract = %contract))]
    async fn balance(&self, contract: &ContractAddress) -> Result<Wei, GameError> {
        let text = self
            .get(&format!("/addrs/{}/balance", contract))
            .await
            .map_err(|message| {
                error!(%message, "Balance lookup failed");
                GameError::retrieval("balance", message)
            })?;
        let response: BalanceResponse =
            serde_json::from_str(&text).map_err(|e| GameError::decode("balance", e.to_string()))?;
        debug!(balance = %response.balance, "Read contract balance");
        Ok(response.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_reports_status_only() {
        let message = describe_failure(StatusCode::TOO_MANY_REQUESTS, r#"{"error":"slow down"}"#);
        assert_eq!(message, "HTTP 429 Too Many Requests");
    }

    #[test]
    fn test_messages_are_joined() {
        let body = r#"{"error":"bad call","errors":[{"error":"out of gas"},{"error":"reverted"}]}"#;
        assert_eq!(
            describe_failure(StatusCode::BAD_REQUEST, body),
            "HTTP 400 Bad Request, Message(s): bad call, out of gas, reverted"
        );
    }

    #[test]
    fn test_empty_error_body_reports_status_only() {
        assert_eq!(
            describe_failure(StatusCode::NOT_FOUND, "{}"),
            "HTTP 404 Not Found"
        );
    }

    #[test]
    fn test_request_omits_empty_fields() {
        let body = ContractRequest {
            private: Some("c025"),
            ..ContractRequest::default()
        };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"private":"c025"}"#);

        let body = ContractRequest {
            params: vec![serde_json::json!(3), serde_json::json!(4)],
            gas_limit: Some(100_000),
            value: Some(Wei(7)),
            ..ContractRequest::default()
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"params":[3,4],"gas_limit":100000,"value":7}"#
        );
    }

    #[test]
    fn test_urls_carry_coin_chain_and_token() {
        let config = LedgerConfig::default().with_token_from(Some("tok".to_string()));
        let client = BlockCypherClient::new(&config);
        let url = client
            .url(&contract_path(&ContractAddress::from("abc"), "getMove"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.blockcypher.com/v1/eth/main/contracts/abc/getMove?token=tok"
        );
    }

    #[tokio::test]
    #[cfg_attr(not(feature = "api"), ignore)]
    async fn test_live_balance_lookup() {
        let config = LedgerConfig::default().with_env_overrides();
        let client = BlockCypherClient::new(&config);
        let contract = ContractAddress::new(
            std::env::var("STRICTLY_BADUK_CONTRACT")
                .expect("STRICTLY_BADUK_CONTRACT must name a deployed game"),
        );
        let result = client.balance(&contract).await;
        assert!(result.is_ok(), "balance lookup failed: {:?}", result);
    }
}
