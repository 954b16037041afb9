//! Seeded k-means over 2-d profile vectors
//!
//! Lloyd iterations with k-means++ seeding. Several restarts are run from one
//! seeded RNG and the lowest-inertia fit wins, so the same points in the same
//! order always produce the same labels.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::error::{Error, Result};

/// A point in (balance, tx_count) space
pub type Point = [f64; 2];

/// Parameters for one k-means fit
#[derive(Debug, Clone)]
pub struct KMeansParams {
    /// Number of groups
    pub k: usize,
    /// Independent restarts; best inertia wins
    pub n_init: usize,
    /// Iteration cap per restart
    pub max_iter: usize,
    /// Relative convergence tolerance (scaled by mean feature variance)
    pub tolerance: f64,
    /// RNG seed for centroid seeding
    pub seed: u64,
}

/// A fitted partition
#[derive(Debug, Clone, Serialize)]
pub struct KMeansModel {
    pub centroids: Vec<Point>,
    /// Sum of squared distances to assigned centroids
    pub inertia: f64,
    /// Lloyd iterations used by the winning restart
    pub iterations: usize,
    /// Number of points the model was fitted on
    pub n_points: usize,
}

impl KMeansModel {
    /// Index of the nearest centroid
    pub fn predict(&self, point: &Point) -> usize {
        nearest(&self.centroids, point).0
    }
}

/// Fit `params.k` groups to `points`, returning the model and one label per point
pub fn fit(points: &[Point], params: &KMeansParams) -> Result<(KMeansModel, Vec<usize>)> {
    if params.k == 0 || points.len() < params.k {
        return Err(Error::InsufficientProfiles {
            have: points.len(),
            need: params.k.max(1),
        });
    }

    let tol = params.tolerance * mean_variance(points);
    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut best: Option<(KMeansModel, Vec<usize>)> = None;

    for _ in 0..params.n_init.max(1) {
        let seeds = plus_plus_init(points, params.k, &mut rng);
        let (model, labels) = lloyd(points, seeds, params.max_iter.max(1), tol);

        let better = best
            .as_ref()
            .map_or(true, |(current, _)| model.inertia < current.inertia);
        if better {
            best = Some((model, labels));
        }
    }

    best.ok_or_else(|| Error::Internal("k-means produced no fit".to_string()))
}

/// k-means++ seeding: each new centroid drawn with probability ∝ D²
fn plus_plus_init(points: &[Point], k: usize, rng: &mut StdRng) -> Vec<Point> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())]);

    let mut dist: Vec<f64> = points.iter().map(|p| sq_dist(p, &centroids[0])).collect();

    while centroids.len() < k {
        let total: f64 = dist.iter().sum();

        let pick = if total > 0.0 {
            let target = rng.gen::<f64>() * total;
            let mut cumulative = 0.0;
            let mut chosen = None;
            for (i, &d) in dist.iter().enumerate() {
                cumulative += d;
                if target < cumulative {
                    chosen = Some(i);
                    break;
                }
            }
            // Rounding can leave target == total; fall back to the last weighted point
            chosen.unwrap_or_else(|| dist.iter().rposition(|&d| d > 0.0).unwrap_or(0))
        } else {
            // Every point coincides with a centroid already
            rng.gen_range(0..points.len())
        };

        let centroid = points[pick];
        for (d, p) in dist.iter_mut().zip(points) {
            *d = d.min(sq_dist(p, &centroid));
        }
        centroids.push(centroid);
    }

    centroids
}

/// Lloyd iterations from the given seeds
fn lloyd(points: &[Point], mut centroids: Vec<Point>, max_iter: usize, tol: f64) -> (KMeansModel, Vec<usize>) {
    let k = centroids.len();
    let mut labels = vec![0usize; points.len()];
    let mut iterations = 0;

    for iter in 1..=max_iter {
        iterations = iter;
        assign(points, &centroids, &mut labels);

        let mut sums = vec![[0.0f64; 2]; k];
        let mut counts = vec![0usize; k];
        for (p, &l) in points.iter().zip(&labels) {
            sums[l][0] += p[0];
            sums[l][1] += p[1];
            counts[l] += 1;
        }

        let mut updated = centroids.clone();
        for c in 0..k {
            if counts[c] > 0 {
                updated[c] = [sums[c][0] / counts[c] as f64, sums[c][1] / counts[c] as f64];
            }
        }
        relocate_empty(points, &labels, &counts, &mut updated);

        let shift: f64 = centroids
            .iter()
            .zip(&updated)
            .map(|(a, b)| sq_dist(a, b))
            .sum();
        centroids = updated;

        if shift <= tol {
            break;
        }
    }

    // Labels must match the final centroids
    assign(points, &centroids, &mut labels);
    let inertia = points
        .iter()
        .zip(&labels)
        .map(|(p, &l)| sq_dist(p, &centroids[l]))
        .sum();

    (
        KMeansModel {
            centroids,
            inertia,
            iterations,
            n_points: points.len(),
        },
        labels,
    )
}

/// Move each empty group onto the point farthest from its current centroid
fn relocate_empty(points: &[Point], labels: &[usize], counts: &[usize], centroids: &mut [Point]) {
    let mut taken: Vec<usize> = Vec::new();
    for c in 0..centroids.len() {
        if counts[c] > 0 {
            continue;
        }
        let far = points
            .iter()
            .enumerate()
            .filter(|(i, _)| !taken.contains(i))
            .map(|(i, p)| (i, sq_dist(p, &centroids[labels[i]])))
            .fold(None, |acc: Option<(usize, f64)>, (i, d)| match acc {
                Some((_, best)) if best >= d => acc,
                _ => Some((i, d)),
            });
        if let Some((i, _)) = far {
            centroids[c] = points[i];
            taken.push(i);
        }
    }
}

fn assign(points: &[Point], centroids: &[Point], labels: &mut [usize]) {
    for (label, p) in labels.iter_mut().zip(points) {
        *label = nearest(centroids, p).0;
    }
}

/// Nearest centroid; ties go to the lowest index
fn nearest(centroids: &[Point], point: &Point) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, c) in centroids.iter().enumerate() {
        let d = sq_dist(point, c);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

fn sq_dist(a: &Point, b: &Point) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

/// Mean of the per-feature variances
fn mean_variance(points: &[Point]) -> f64 {
    let n = points.len() as f64;
    let mut total = 0.0;
    for dim in 0..2 {
        let mean = points.iter().map(|p| p[dim]).sum::<f64>() / n;
        total += points.iter().map(|p| (p[dim] - mean).powi(2)).sum::<f64>() / n;
    }
    total / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> KMeansParams {
        KMeansParams {
            k: 3,
            n_init: 10,
            max_iter: 300,
            tolerance: 1e-4,
            seed: 42,
        }
    }

    #[test]
    fn test_three_separated_points_get_distinct_groups() {
        let points = [[0.1, 2.0], [15.0, 300.0], [6.0, 50.0]];
        let (model, labels) = fit(&points, &params()).unwrap();

        let mut sorted = labels.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2]);
        assert_eq!(model.inertia, 0.0);
        assert_eq!(model.n_points, 3);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let points = [
            [0.0, 1.0],
            [0.2, 3.0],
            [1.0, 12.0],
            [5.5, 40.0],
            [6.1, 55.0],
            [12.0, 250.0],
            [20.0, 410.0],
            [0.05, 0.0],
        ];
        let (m1, l1) = fit(&points, &params()).unwrap();
        let (m2, l2) = fit(&points, &params()).unwrap();

        assert_eq!(l1, l2);
        assert_eq!(m1.centroids, m2.centroids);
        assert_eq!(m1.inertia, m2.inertia);
    }

    #[test]
    fn test_obvious_groups() {
        let points = [
            [0.0, 1.0],
            [0.1, 2.0],
            [10.0, 100.0],
            [10.2, 101.0],
            [50.0, 1000.0],
            [50.5, 1002.0],
        ];
        let (_, labels) = fit(&points, &params()).unwrap();

        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[2], labels[3]);
        assert_eq!(labels[4], labels[5]);
        assert_ne!(labels[0], labels[2]);
        assert_ne!(labels[2], labels[4]);
        assert_ne!(labels[0], labels[4]);
    }

    #[test]
    fn test_predict_matches_labels() {
        let points = [[0.0, 0.0], [0.5, 1.0], [30.0, 600.0], [31.0, 590.0], [8.0, 80.0]];
        let (model, labels) = fit(&points, &params()).unwrap();

        for (p, &l) in points.iter().zip(&labels) {
            assert_eq!(model.predict(p), l);
        }
    }

    #[test]
    fn test_duplicate_points_do_not_panic() {
        let points = [[1.0, 1.0]; 4];
        let (model, labels) = fit(&points, &params()).unwrap();

        assert_eq!(labels.len(), 4);
        assert!(labels.iter().all(|&l| l < 3));
        assert_eq!(model.inertia, 0.0);
    }

    #[test]
    fn test_too_few_points() {
        let points = [[1.0, 1.0], [2.0, 2.0]];
        assert!(matches!(
            fit(&points, &params()),
            Err(Error::InsufficientProfiles { have: 2, need: 3 })
        ));
    }
}
