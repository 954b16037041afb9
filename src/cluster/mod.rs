//! Behavioral clustering of stored profiles
//!
//! Every store change triggers a full refit over all profiles. There is no
//! incremental update: the previous model is simply replaced. Callers go
//! through [`ClusteringEngine::recluster`] only, so the policy can change
//! without touching them.
//!
//! Group indices carry no identity across refits. The recommendation layer
//! reads 0/1/2 as light/mid/heavy usage, but k-means does not order its
//! groups, so that reading only holds when a refit happens to line up.

pub mod kmeans;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::profile::ProfileStore;

pub use kmeans::{KMeansModel, KMeansParams, Point};

/// Number of behavioral groups
pub const TARGET_GROUPS: usize = 3;

/// Clustering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// Seed for k-means++ initialization
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Restarts per refit; lowest inertia wins
    #[serde(default = "default_n_init")]
    pub n_init: usize,

    /// Iteration cap per restart
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,

    /// Relative convergence tolerance
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_seed() -> u64 {
    42
}
fn default_n_init() -> usize {
    10
}
fn default_max_iter() -> usize {
    300
}
fn default_tolerance() -> f64 {
    1e-4
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            n_init: default_n_init(),
            max_iter: default_max_iter(),
            tolerance: default_tolerance(),
        }
    }
}

impl ClusteringConfig {
    fn params(&self) -> KMeansParams {
        KMeansParams {
            k: TARGET_GROUPS,
            n_init: self.n_init,
            max_iter: self.max_iter,
            tolerance: self.tolerance,
            seed: self.seed,
        }
    }
}

/// One group in a [`ClusterSummary`]
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub cluster: usize,
    pub centroid_balance: f64,
    pub centroid_tx_count: f64,
    pub members: usize,
}

/// Snapshot of the current model
#[derive(Debug, Clone, Serialize)]
pub struct ClusterSummary {
    pub profiles: usize,
    pub inertia: f64,
    pub iterations: usize,
    pub groups: Vec<GroupSummary>,
}

/// Owns the fitted model and the refit policy
#[derive(Debug)]
pub struct ClusteringEngine {
    config: ClusteringConfig,
    model: Option<KMeansModel>,
}

impl ClusteringEngine {
    pub fn new(config: ClusteringConfig) -> Self {
        Self {
            config,
            model: None,
        }
    }

    /// Refit over every profile in `store` and write labels back
    ///
    /// Below [`TARGET_GROUPS`] profiles this does nothing and leaves both the
    /// model and existing labels untouched. Returns whether a refit ran.
    pub fn recluster(&mut self, store: &mut ProfileStore) -> bool {
        if store.size() < TARGET_GROUPS {
            debug!(
                profiles = store.size(),
                need = TARGET_GROUPS,
                "Skipping recluster"
            );
            return false;
        }

        let points = store.vectors();
        let (model, labels) = match kmeans::fit(&points, &self.config.params()) {
            Ok(fit) => fit,
            Err(e) => {
                warn!(error = %e, "Recluster failed");
                return false;
            }
        };

        let assigned = store.assign_clusters(&labels);
        debug_assert!(assigned, "one label per stored profile");

        info!(
            profiles = points.len(),
            inertia = model.inertia,
            iterations = model.iterations,
            "Reclustered profiles"
        );

        self.model = Some(model);
        true
    }

    /// Current model, if any refit has run
    pub fn model(&self) -> Option<&KMeansModel> {
        self.model.as_ref()
    }

    /// Classify an arbitrary vector with the current model
    pub fn predict(&self, point: &Point) -> Option<usize> {
        self.model.as_ref().map(|m| m.predict(point))
    }

    /// Summarize the current model against the store
    pub fn summary(&self, store: &ProfileStore) -> Option<ClusterSummary> {
        let model = self.model.as_ref()?;

        let groups = model
            .centroids
            .iter()
            .enumerate()
            .map(|(cluster, c)| GroupSummary {
                cluster,
                centroid_balance: c[0],
                centroid_tx_count: c[1],
                members: store.iter().filter(|p| p.cluster == Some(cluster)).count(),
            })
            .collect();

        Some(ClusterSummary {
            profiles: model.n_points,
            inertia: model.inertia,
            iterations: model.iterations,
            groups,
        })
    }
}

impl Default for ClusteringEngine {
    fn default() -> Self {
        Self::new(ClusteringConfig::default())
    }
}
