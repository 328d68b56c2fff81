// ============================================
// Collaborative Recommender (user-user)
// ============================================
//
// Algorithm:
// 1. Rank readers by Pearson correlation with the target (NeighborFinder)
// 2. Keep the top-K neighbors, whatever the sign of their correlation
// 3. Average the neighbors' ratings per book column
// 4. Drop books the target already rated and books averaging <= 0
// 5. Sort by the average (descending, ties by title) and resolve authors
//    through the genre index
//
// Averaging policy:
//   ZeroFill  : score[book] = Σ rating[n, book] / K   (unrated counts as 0)
//   RatedOnly : score[book] = mean over neighbors that rated the book

use super::genre_index::GenreIndex;
use super::neighbors::NeighborFinder;
use super::rating_matrix::RatingMatrix;
use crate::error::{RecommendationError, Result};
use crate::models::{NeighborAveraging, Recommendations};
use crate::utils::{cmp_desc, mean};
use tracing::{debug, info, warn};

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_LIMIT: usize = 5;

pub struct CollaborativeRecommender {
    top_k: usize,
    limit: usize,
    averaging: NeighborAveraging,
    finder: NeighborFinder,
}

impl Default for CollaborativeRecommender {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            limit: DEFAULT_LIMIT,
            averaging: NeighborAveraging::ZeroFill,
            finder: NeighborFinder::new(),
        }
    }
}

impl CollaborativeRecommender {
    pub fn new(top_k: usize) -> Self {
        Self {
            top_k,
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_averaging(mut self, averaging: NeighborAveraging) -> Self {
        self.averaging = averaging;
        self
    }

    pub fn recommend(
        &self,
        matrix: &RatingMatrix,
        index: &GenreIndex<'_>,
        user_id: i64,
    ) -> Result<Recommendations> {
        let ranking = self.finder.rank(matrix, user_id)?;
        let neighbor_rows: Vec<usize> = ranking
            .top(self.top_k)
            .iter()
            .filter_map(|n| matrix.row_index(n.user_id))
            .collect();

        let mut recommendations = Recommendations::default();
        if neighbor_rows.is_empty() {
            info!(user_id, "No similar readers found for collaborative filtering");
            return Ok(recommendations);
        }

        let target_row = matrix
            .row_index(user_id)
            .ok_or(RecommendationError::UnknownUser(user_id))?;
        let target_ratings = matrix.row_at(target_row);

        let mut scored: Vec<(usize, f64)> = (0..matrix.titles().len())
            .filter(|&col| !matrix.is_rated(target_row, col) && target_ratings[col] == 0.0)
            .map(|col| (col, self.neighbor_average(matrix, &neighbor_rows, col)))
            .filter(|&(_, score)| score > 0.0)
            .collect();
        // Stable: equal scores keep title order
        scored.sort_by(|a, b| cmp_desc(a.1, b.1));

        for (col, score) in scored {
            if recommendations.len() >= self.limit {
                break;
            }
            let title = &matrix.titles()[col];
            match index.author_of(title) {
                Some(author) => {
                    debug!(user_id, title = %title, score, "Collaborative candidate");
                    recommendations.push(title.as_str(), author);
                }
                None => warn!(
                    user_id,
                    title = %title,
                    "Rated title missing from catalog, skipping"
                ),
            }
        }

        info!(
            user_id,
            neighbors = neighbor_rows.len(),
            recommended = recommendations.len(),
            averaging = ?self.averaging,
            "Collaborative recommendations generated"
        );

        Ok(recommendations)
    }

    fn neighbor_average(&self, matrix: &RatingMatrix, rows: &[usize], col: usize) -> f64 {
        let ratings = matrix.ratings();
        let values: Vec<f64> = match self.averaging {
            NeighborAveraging::ZeroFill => rows.iter().map(|&row| ratings[[row, col]]).collect(),
            NeighborAveraging::RatedOnly => rows
                .iter()
                .filter(|&&row| matrix.is_rated(row, col))
                .map(|&row| ratings[[row, col]])
                .collect(),
        };
        mean(&values).unwrap_or(0.0)
    }
}
