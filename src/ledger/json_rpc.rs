//! Ethereum JSON-RPC ledger client
//!
//! Talks to any node or hosted provider speaking the standard JSON-RPC API:
//! - `eth_getBalance` for the wei balance
//! - `eth_getTransactionCount` for the account nonce
//! - `eth_chainId` as a connectivity probe

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use crate::address::Address;
use crate::error::{Error, Result};
use crate::ledger::{AccountSnapshot, LedgerGateway};

/// JSON-RPC ledger client
pub struct JsonRpcLedger {
    /// HTTP client
    client: Client,
    /// RPC endpoint URL (may carry an API key)
    endpoint: String,
    /// Per-request timeout
    timeout: Duration,
    /// Monotonic request id
    next_id: AtomicU64,
}

impl JsonRpcLedger {
    /// Create a new client for `endpoint`
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
            next_id: AtomicU64::new(1),
        })
    }

    /// Fetch the balance in wei
    pub async fn get_balance(&self, address: &Address) -> Result<u128> {
        let raw: String = self
            .call("eth_getBalance", serde_json::json!([address.as_str(), "latest"]))
            .await?;
        parse_quantity(&raw)
    }

    /// Fetch the transaction count (nonce)
    pub async fn get_transaction_count(&self, address: &Address) -> Result<u64> {
        let raw: String = self
            .call(
                "eth_getTransactionCount",
                serde_json::json!([address.as_str(), "latest"]),
            )
            .await?;
        let count = parse_quantity(&raw)?;
        u64::try_from(count)
            .map_err(|_| Error::Deserialization(format!("Transaction count out of range: {}", raw)))
    }

    /// Fetch the chain id
    pub async fn chain_id(&self) -> Result<u64> {
        let raw: String = self.call("eth_chainId", serde_json::json!([])).await?;
        let id = parse_quantity(&raw)?;
        u64::try_from(id).map_err(|_| Error::Deserialization(format!("Chain id out of range: {}", raw)))
    }

    /// Issue one JSON-RPC call and unwrap the `result` field
    async fn call<T: DeserializeOwned>(&self, method: &str, params: serde_json::Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!(method, id, "Sending ledger RPC request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Rpc(format!("Ledger RPC error {}: {}", status, body)));
        }

        let rpc_response: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| Error::Deserialization(format!("Failed to parse RPC response: {}", e)))?;

        if let Some(error) = rpc_response.error {
            return Err(Error::Rpc(format!(
                "{} failed ({}): {}",
                method, error.code, error.message
            )));
        }

        rpc_response
            .result
            .ok_or_else(|| Error::Rpc(format!("No result in {} response", method)))
    }

    fn map_transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::RpcTimeout(self.timeout.as_millis() as u64)
        } else if e.is_connect() {
            Error::RpcConnection(e.to_string())
        } else {
            Error::Rpc(format!("Ledger request failed: {}", e))
        }
    }
}

#[async_trait]
impl LedgerGateway for JsonRpcLedger {
    async fn account(&self, address: &Address) -> Result<AccountSnapshot> {
        let (balance_wei, tx_count) = tokio::try_join!(
            self.get_balance(address),
            self.get_transaction_count(address)
        )?;

        debug!(
            address = %address.short(),
            balance_wei = %balance_wei,
            tx_count,
            "Fetched account"
        );

        Ok(AccountSnapshot::from_wei(balance_wei, tx_count))
    }

    async fn is_connected(&self) -> bool {
        match self.chain_id().await {
            Ok(id) => {
                debug!(chain_id = id, "Ledger endpoint reachable");
                true
            }
            Err(e) => {
                warn!(error = %e, "Ledger endpoint unreachable");
                false
            }
        }
    }
}

/// Parse a JSON-RPC hex quantity (`"0x1bc16d674ec80000"`)
pub fn parse_quantity(raw: &str) -> Result<u128> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| Error::Deserialization(format!("Quantity missing 0x prefix: {}", raw)))?;

    if digits.is_empty() {
        return Err(Error::Deserialization("Empty quantity".to_string()));
    }

    u128::from_str_radix(digits, 16)
        .map_err(|e| Error::Deserialization(format!("Invalid quantity {}: {}", raw, e)))
}

// ============ JSON-RPC Response Types ============

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    jsonrpc: Option<String>,
    id: Option<serde_json::Value>,
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x0").unwrap(), 0);
        assert_eq!(parse_quantity("0x1bc16d674ec80000").unwrap(), 2_000_000_000_000_000_000);
        assert_eq!(parse_quantity("0xff").unwrap(), 255);
    }

    #[test]
    fn test_parse_quantity_rejects_garbage() {
        assert!(matches!(parse_quantity("ff"), Err(Error::Deserialization(_))));
        assert!(matches!(parse_quantity("0x"), Err(Error::Deserialization(_))));
        assert!(matches!(parse_quantity("0xzz"), Err(Error::Deserialization(_))));
    }

    #[test]
    fn test_rpc_response_parsing() {
        let ok: RpcResponse<String> =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":"0x2a"}"#).unwrap();
        assert_eq!(ok.result.as_deref(), Some("0x2a"));
        assert!(ok.error.is_none());

        let err: RpcResponse<String> = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"invalid argument"}}"#,
        )
        .unwrap();
        assert!(err.result.is_none());
        assert_eq!(err.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_upstream_error() {
        // Grab a free port, then release it so nothing is listening there
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let endpoint = format!("http://127.0.0.1:{}", port);
        let ledger = JsonRpcLedger::new(endpoint, Duration::from_millis(500)).unwrap();
        let addr = Address::parse("0x0000000000000000000000000000000000000001").unwrap();

        let err = ledger.account(&addr).await.unwrap_err();
        assert!(err.is_upstream());
        assert!(!ledger.is_connected().await);
    }
}
