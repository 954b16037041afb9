//! Profile similarity
//!
//! Cosine similarity over (balance, tx_count). Non-negative inputs keep the
//! result in [0, 1].

/// Cosine similarity between two profile vectors
///
/// Two zero vectors are treated as identical (1.0). A zero vector against a
/// non-zero one scores 0.0.
pub fn cosine_similarity(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    let a_zero = a.iter().all(|&x| x == 0.0);
    let b_zero = b.iter().all(|&x| x == 0.0);
    if a_zero && b_zero {
        return 1.0;
    }
    if a_zero || b_zero {
        return 0.0;
    }

    let dot = a[0] * b[0] + a[1] * b[1];
    let norm_a = (a[0] * a[0] + a[1] * a[1]).sqrt();
    let norm_b = (b[0] * b[0] + b[1] * b[1]).sqrt();

    dot / (norm_a * norm_b)
}
