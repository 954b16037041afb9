//! Account profiles
//!
//! A profile is the numeric summary of one address: balance, transaction
//! count, and the behavioral group assigned by the last clustering pass.

pub mod store;

use serde::Serialize;

use crate::address::Address;

pub use store::ProfileStore;

/// Stored numeric summary of one address
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub address: Address,
    /// Balance in ether
    pub balance: f64,
    #[serde(rename = "transactionCount")]
    pub tx_count: u64,
    /// Group from the last clustering pass that included this profile
    pub cluster: Option<usize>,
}

impl Profile {
    pub fn new(address: Address, balance: f64, tx_count: u64) -> Self {
        Self {
            address,
            balance,
            tx_count,
            cluster: None,
        }
    }

    /// Feature vector used for clustering and similarity
    pub fn vector(&self) -> [f64; 2] {
        [self.balance, self.tx_count as f64]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_json_shape() {
        let address = Address::parse("0x00000000000000000000000000000000000000aa").unwrap();
        let mut profile = Profile::new(address, 1.25, 7);
        profile.cluster = Some(2);

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "address": "0x00000000000000000000000000000000000000aa",
                "balance": 1.25,
                "transactionCount": 7,
                "cluster": 2,
            })
        );
        assert_eq!(profile.vector(), [1.25, 7.0]);
    }
}
