//! Persona derivation
//!
//! Turns a stored profile into the response view: display balance,
//! narrative label, recommended apps, and the placeholder estimates.

pub mod estimates;
pub mod heuristics;

use chrono::NaiveDate;
use serde::Serialize;

use crate::address::Address;
use crate::profile::Profile;

pub use estimates::{FirstSeenEstimate, PlaceholderEstimator};
pub use heuristics::{persona_label, recommendations, UsageTier};

/// Persona response for one address
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub address: Address,
    /// Balance in ether, 4 decimals
    pub balance: String,
    pub transaction_count: u64,
    /// Random guess, see [`PlaceholderEstimator`]
    pub first_seen_estimate: FirstSeenEstimate,
    /// Random guess, see [`PlaceholderEstimator`]
    pub synthetic_gas_used: u64,
    pub cluster: Option<usize>,
    pub persona_label: String,
    pub recommendations: Vec<String>,
}

impl Persona {
    /// Build the view for `profile`
    pub fn from_profile(profile: &Profile, estimator: &PlaceholderEstimator, today: NaiveDate) -> Self {
        Self {
            address: profile.address.clone(),
            balance: format_balance(profile.balance),
            transaction_count: profile.tx_count,
            first_seen_estimate: estimator.first_seen(profile.tx_count, today),
            synthetic_gas_used: estimator.gas_used(profile.tx_count),
            cluster: profile.cluster,
            persona_label: persona_label(profile.balance, profile.tx_count).to_string(),
            recommendations: recommendations(profile.cluster),
        }
    }
}

/// Display balance with 4 decimals
pub fn format_balance(balance: f64) -> String {
    format!("{:.4}", balance)
}
