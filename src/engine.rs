//! Persona Engine
//!
//! Owns the profile store and the clustering model and serves the two
//! request paths:
//! - persona: validate, query the ledger, upsert, recluster, read back
//! - similarity: validate both, ensure both profiles exist, compare
//!
//! Store and model sit behind one lock. An upsert and the recluster it
//! triggers happen under a single write acquisition, so writers never
//! interleave. The lock is never held across a ledger call.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::address::Address;
use crate::cluster::{ClusterSummary, ClusteringConfig, ClusteringEngine};
use crate::error::{Error, Result};
use crate::ledger::LedgerGateway;
use crate::persona::{Persona, PlaceholderEstimator};
use crate::profile::{Profile, ProfileStore};
use crate::similarity::cosine_similarity;

/// Mutable state guarded by the engine lock
#[derive(Debug, Default)]
struct EngineState {
    store: ProfileStore,
    clustering: ClusteringEngine,
}

/// Main persona engine, shared across request tasks via `Arc`
pub struct PersonaEngine {
    ledger: Arc<dyn LedgerGateway>,
    state: RwLock<EngineState>,
    estimator: PlaceholderEstimator,
}

impl PersonaEngine {
    /// Create an engine with an empty store
    pub fn new(
        ledger: Arc<dyn LedgerGateway>,
        clustering: ClusteringConfig,
        estimator: PlaceholderEstimator,
    ) -> Self {
        Self {
            ledger,
            state: RwLock::new(EngineState {
                store: ProfileStore::new(),
                clustering: ClusteringEngine::new(clustering),
            }),
            estimator,
        }
    }

    /// Derive the persona for a raw, user-supplied address
    ///
    /// Always re-queries the ledger, so the stored profile reflects the
    /// latest figures afterwards.
    pub async fn derive_persona(&self, raw_address: &str) -> Result<Persona> {
        let address = Address::parse(raw_address)?;
        let profile = self.refresh_profile(&address).await?;

        let persona = Persona::from_profile(&profile, &self.estimator, Utc::now().date_naive());

        info!(
            address = %address.short(),
            balance = %persona.balance,
            tx_count = persona.transaction_count,
            cluster = ?persona.cluster,
            "Derived persona"
        );

        Ok(persona)
    }

    /// Similarity between two raw, user-supplied addresses
    ///
    /// Both addresses are validated before anything else happens. Missing
    /// profiles are materialized from the ledger first.
    pub async fn compute_similarity(&self, raw_a: &str, raw_b: &str) -> Result<f64> {
        let a = Address::parse(raw_a)?;
        let b = Address::parse(raw_b)?;

        if a == b {
            return Ok(1.0);
        }

        self.ensure_profile(&a).await?;
        self.ensure_profile(&b).await?;

        let similarity = {
            let state = self.state.read().await;
            cosine_similarity(&state.store.vector(&a), &state.store.vector(&b))
        };

        debug!(a = %a.short(), b = %b.short(), similarity, "Computed similarity");

        Ok(similarity)
    }

    /// Return the stored profile, querying the ledger only if it is missing
    ///
    /// Two concurrent calls for the same missing address may both query; the
    /// second upsert simply replaces the first.
    pub async fn ensure_profile(&self, address: &Address) -> Result<Profile> {
        if let Some(profile) = self.profile(address).await {
            return Ok(profile);
        }
        self.refresh_profile(address).await
    }

    /// Query the ledger, upsert, and recluster
    pub async fn refresh_profile(&self, address: &Address) -> Result<Profile> {
        // Network first; nothing is written unless the lookup succeeds
        let snapshot = self.ledger.account(address).await?;

        let mut guard = self.state.write().await;
        let EngineState { store, clustering } = &mut *guard;

        store.upsert(address.clone(), snapshot.balance, snapshot.tx_count);
        clustering.recluster(store);

        store
            .get(address)
            .cloned()
            .ok_or_else(|| Error::Internal(format!("Profile vanished after upsert: {}", address)))
    }

    /// Stored profile, if any
    pub async fn profile(&self, address: &Address) -> Option<Profile> {
        self.state.read().await.store.get(address).cloned()
    }

    /// Number of stored profiles
    pub async fn store_size(&self) -> usize {
        self.state.read().await.store.size()
    }

    /// Current cluster model summary
    pub async fn cluster_summary(&self) -> Option<ClusterSummary> {
        let state = self.state.read().await;
        state.clustering.summary(&state.store)
    }

    /// Check the ledger is reachable
    pub async fn ledger_healthy(&self) -> bool {
        self.ledger.is_connected().await
    }
}
