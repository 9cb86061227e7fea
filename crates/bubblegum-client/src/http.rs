//! JSON-RPC 2.0 over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::config::{ClientConfig, Commitment};
use crate::error::GatewayError;
use crate::gateway::{AccountInfo, Asset, AssetProof, LedgerGateway, SendConfig};

/// [`LedgerGateway`] backed by a Solana RPC node and a DAS indexer.
///
/// Both may be the same endpoint (most DAS providers serve standard RPC
/// too). No retries are attempted.
#[derive(Debug)]
pub struct HttpGateway {
    client: reqwest::Client,
    rpc_url: String,
    das_url: String,
    next_id: AtomicU64,
}

impl HttpGateway {
    pub fn new(config: &ClientConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            rpc_url: config.rpc_url.clone(),
            das_url: config.das_url().to_string(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    pub fn das_url(&self) -> &str {
        &self.das_url
    }

    async fn call(&self, url: &str, method: &str, params: Value) -> Result<Value, GatewayError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!(method, id, "rpc request");

        let response = self.client.post(url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            // JSON-RPC errors sometimes come back with a non-2xx status; keep
            // the error object when there is one.
            let body: Value = response.json().await.unwrap_or(Value::Null);
            if body.get("error").is_some() {
                return parse_response(body);
            }
            error!(method, %status, "rpc http error");
            return Err(GatewayError::Transport(format!("http status {status}")));
        }

        let body: Value = response.json().await?;
        parse_response(body)
    }
}

/// Split a JSON-RPC response into its `result` or its `error` object.
fn parse_response(body: Value) -> Result<Value, GatewayError> {
    if let Some(err) = body.get("error") {
        let code = err.get("code").and_then(Value::as_i64).unwrap_or_default();
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let data = err.get("data").cloned();
        return Err(GatewayError::Rpc {
            code,
            message,
            data,
        });
    }

    body.get("result")
        .cloned()
        .ok_or_else(|| GatewayError::Decode("response has neither result nor error".into()))
}

#[derive(Deserialize)]
struct RpcAccount {
    lamports: u64,
    owner: String,
    data: (String, String),
    executable: bool,
}

fn parse_account_info(result: Value) -> Result<Option<AccountInfo>, GatewayError> {
    let value = result.get("value").cloned().unwrap_or(Value::Null);
    if value.is_null() {
        return Ok(None);
    }

    let account: RpcAccount = serde_json::from_value(value)?;
    let (encoded, encoding) = account.data;
    if encoding != "base64" {
        return Err(GatewayError::Decode(format!(
            "unexpected account data encoding {encoding}"
        )));
    }
    let data = general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| GatewayError::Decode(format!("account data: {e}")))?;

    Ok(Some(AccountInfo {
        lamports: account.lamports,
        owner: account.owner,
        data,
        executable: account.executable,
    }))
}

#[async_trait]
impl LedgerGateway for HttpGateway {
    async fn get_latest_blockhash(&self, commitment: Commitment) -> Result<String, GatewayError> {
        let result = self
            .call(
                &self.rpc_url,
                "getLatestBlockhash",
                json!([{ "commitment": commitment }]),
            )
            .await?;

        result
            .pointer("/value/blockhash")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| GatewayError::Decode("missing value.blockhash".into()))
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: u64,
    ) -> Result<u64, GatewayError> {
        let result = self
            .call(
                &self.rpc_url,
                "getMinimumBalanceForRentExemption",
                json!([data_len]),
            )
            .await?;

        result
            .as_u64()
            .ok_or_else(|| GatewayError::Decode(format!("expected lamports, got {result}")))
    }

    async fn send_transaction(
        &self,
        transaction_base64: &str,
        config: &SendConfig,
    ) -> Result<String, GatewayError> {
        let result = self
            .call(
                &self.rpc_url,
                "sendTransaction",
                json!([
                    transaction_base64,
                    {
                        "encoding": "base64",
                        "skipPreflight": config.skip_preflight,
                        "preflightCommitment": config.preflight_commitment,
                    }
                ]),
            )
            .await?;

        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| GatewayError::Decode(format!("expected signature, got {result}")))
    }

    async fn get_account_info(&self, address: &str) -> Result<Option<AccountInfo>, GatewayError> {
        let result = self
            .call(
                &self.rpc_url,
                "getAccountInfo",
                json!([address, { "encoding": "base64" }]),
            )
            .await?;
        parse_account_info(result)
    }

    async fn get_asset(&self, asset_id: &str) -> Result<Asset, GatewayError> {
        let result = self
            .call(&self.das_url, "getAsset", json!({ "id": asset_id }))
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn get_asset_proof(&self, asset_id: &str) -> Result<AssetProof, GatewayError> {
        let result = self
            .call(&self.das_url, "getAssetProof", json!({ "id": asset_id }))
            .await?;
        Ok(serde_json::from_value(result)?)
    }
}
