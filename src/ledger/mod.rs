//! Account ledger gateway
//!
//! The persona engine only needs two numbers per account: the balance and the
//! number of transactions sent. Anything that can produce them implements
//! [`LedgerGateway`]; production uses [`JsonRpcLedger`], tests use a stub.

pub mod json_rpc;
#[cfg(test)]
pub mod stub;

use async_trait::async_trait;

use crate::address::Address;
use crate::error::Result;

pub use json_rpc::JsonRpcLedger;

/// Wei per ether
pub const WEI_PER_ETHER: f64 = 1e18;

/// Raw account figures as reported by the ledger
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountSnapshot {
    /// Balance in ether
    pub balance: f64,
    /// Transaction count (account nonce)
    pub tx_count: u64,
}

impl AccountSnapshot {
    /// Build a snapshot from a wei balance
    pub fn from_wei(balance_wei: u128, tx_count: u64) -> Self {
        Self {
            balance: wei_to_ether(balance_wei),
            tx_count,
        }
    }
}

/// Convert a wei amount to ether
pub fn wei_to_ether(wei: u128) -> f64 {
    wei as f64 / WEI_PER_ETHER
}

/// Source of on-chain account data
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Fetch balance and transaction count for one account
    async fn account(&self, address: &Address) -> Result<AccountSnapshot>;

    /// Check the ledger endpoint is reachable
    async fn is_connected(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wei_to_ether() {
        assert_eq!(wei_to_ether(0), 0.0);
        assert_eq!(wei_to_ether(1_000_000_000_000_000_000), 1.0);
        assert_eq!(wei_to_ether(1_500_000_000_000_000_000), 1.5);
    }

    #[test]
    fn test_snapshot_from_wei() {
        let snap = AccountSnapshot::from_wei(250_000_000_000_000_000, 7);
        assert_eq!(snap.balance, 0.25);
        assert_eq!(snap.tx_count, 7);
    }
}
