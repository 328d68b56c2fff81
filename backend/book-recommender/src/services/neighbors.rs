// ============================================
// Neighbor Finder
// ============================================
//
// Ranks every other reader by Pearson correlation with the target's rating
// vector. Both vectors span the full title set with 0-fill.
//
//   r = Σ(x - x̄)(y - ȳ) / sqrt(Σ(x - x̄)² · Σ(y - ȳ)²)
//
// A zero-variance vector makes r undefined; such readers are left out of the
// ranking. Order: correlation descending, then user id ascending.

use super::rating_matrix::RatingMatrix;
use crate::error::{RecommendationError, Result};
use crate::models::{Neighbor, NeighborRanking};
use crate::utils::cmp_desc;
use ndarray::ArrayView1;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct NeighborFinder;

impl NeighborFinder {
    pub fn new() -> Self {
        Self
    }

    pub fn rank(&self, matrix: &RatingMatrix, target_user_id: i64) -> Result<NeighborRanking> {
        let target_row = matrix
            .row(target_user_id)
            .ok_or(RecommendationError::UnknownUser(target_user_id))?;

        let mut neighbors: Vec<Neighbor> = matrix
            .user_ids()
            .iter()
            .enumerate()
            .filter(|&(_, &user_id)| user_id != target_user_id)
            .filter_map(|(row, &user_id)| {
                let correlation = pearson(target_row, matrix.row_at(row));
                if correlation.is_none() {
                    debug!(user_id, "Correlation undefined, reader excluded");
                }
                correlation.map(|correlation| Neighbor {
                    user_id,
                    correlation,
                })
            })
            .collect();

        // Stable sort; user ids are already ascending
        neighbors.sort_by(|a, b| cmp_desc(a.correlation, b.correlation));

        info!(
            user_id = target_user_id,
            candidates = matrix.user_ids().len().saturating_sub(1),
            neighbors = neighbors.len(),
            "Neighbor ranking computed"
        );

        Ok(NeighborRanking {
            target: target_user_id,
            neighbors,
        })
    }
}

/// Pearson correlation, `None` when either side has zero variance.
pub fn pearson(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> Option<f64> {
    let n = x.len();
    if n < 2 || n != y.len() {
        return None;
    }

    let mean_x = x.sum() / n as f64;
    let mean_y = y.sum() / n as f64;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&a, &b) in x.iter().zip(y.iter()) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    let r = covariance / (var_x.sqrt() * var_y.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}
