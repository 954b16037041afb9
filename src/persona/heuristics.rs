//! Narrative labels and app recommendations
//!
//! Plain lookup rules over the numeric profile. No state.

/// Balance (ether) above which a wallet counts as a large holder
pub const WHALE_BALANCE: f64 = 10.0;
/// Balance (ether) above which a wallet counts as a solid holder
pub const HOLDER_BALANCE: f64 = 5.0;
/// Transaction count above which a wallet counts as highly active
pub const ACTIVE_TX_COUNT: u64 = 100;
/// Transaction count below which a wallet counts as new or dormant
pub const DORMANT_TX_COUNT: u64 = 5;

/// One-line description of the wallet's behavior
pub fn persona_label(balance: f64, tx_count: u64) -> &'static str {
    if balance > WHALE_BALANCE && tx_count > ACTIVE_TX_COUNT {
        "High-volume whale active across DeFi & NFTs."
    } else if tx_count > ACTIVE_TX_COUNT {
        "DeFi power-user with frequent trades."
    } else if balance > HOLDER_BALANCE {
        "Long-term holder with solid stack."
    } else if tx_count < DORMANT_TX_COUNT {
        "New or dormant wallet."
    } else {
        "Casual user exploring the ecosystem."
    }
}

/// Usage tier conventionally attached to a group index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageTier {
    Light,
    Mid,
    Heavy,
}

impl UsageTier {
    /// Read a group index as a tier (0 light, 1 mid, 2 heavy)
    ///
    /// This is a naming convention only: k-means does not order its groups,
    /// so group 0 is not guaranteed to hold the lightest wallets.
    pub fn from_cluster(cluster: usize) -> Option<Self> {
        match cluster {
            0 => Some(Self::Light),
            1 => Some(Self::Mid),
            2 => Some(Self::Heavy),
            _ => None,
        }
    }

    pub fn apps(self) -> &'static [&'static str] {
        match self {
            Self::Light => &["OpenSea", "Rainbow", "Lens Protocol"],
            Self::Mid => &["Uniswap", "Zapper", "Mirror"],
            Self::Heavy => &["Aave", "Blur", "dYdX"],
        }
    }
}

/// Fallback list when no cluster is known
pub const DEFAULT_APPS: &[&str] = &["Uniswap", "OpenSea"];

/// Recommended apps for a group
pub fn recommendations(cluster: Option<usize>) -> Vec<String> {
    let apps = cluster
        .and_then(UsageTier::from_cluster)
        .map(UsageTier::apps)
        .unwrap_or(DEFAULT_APPS);
    apps.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persona_label_rules() {
        assert_eq!(persona_label(50.0, 500), "High-volume whale active across DeFi & NFTs.");
        assert_eq!(persona_label(1.0, 101), "DeFi power-user with frequent trades.");
        assert_eq!(persona_label(6.0, 50), "Long-term holder with solid stack.");
        assert_eq!(persona_label(0.1, 2), "New or dormant wallet.");
        assert_eq!(persona_label(1.0, 20), "Casual user exploring the ecosystem.");
    }

    #[test]
    fn test_persona_label_boundaries() {
        // Thresholds are strict
        assert_eq!(persona_label(10.0, 101), "DeFi power-user with frequent trades.");
        assert_eq!(persona_label(5.0, 100), "Casual user exploring the ecosystem.");
        assert_eq!(persona_label(0.0, 5), "Casual user exploring the ecosystem.");
        assert_eq!(persona_label(0.0, 4), "New or dormant wallet.");
    }

    #[test]
    fn test_recommendations() {
        assert_eq!(recommendations(Some(0)), vec!["OpenSea", "Rainbow", "Lens Protocol"]);
        assert_eq!(recommendations(Some(1)), vec!["Uniswap", "Zapper", "Mirror"]);
        assert_eq!(recommendations(Some(2)), vec!["Aave", "Blur", "dYdX"]);
        assert_eq!(recommendations(None), vec!["Uniswap", "OpenSea"]);
        assert_eq!(recommendations(Some(7)), vec!["Uniswap", "OpenSea"]);
    }
}
