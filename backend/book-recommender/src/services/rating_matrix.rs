// ============================================
// Rating Matrix Builder
// ============================================
//
// Users' histories → dense user × book matrix
//
//   rows    : user ids, ascending
//   columns : book titles, ascending
//   cell    : mean of the user's ratings for that title, 0.0 when unrated
//
// A parallel boolean mask keeps "unrated" distinct from a rating of 0.0.
// Similarity math reads the 0-filled values on purpose.

use crate::models::User;
use ndarray::{Array2, ArrayView1};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct RatingMatrix {
    user_ids: Vec<i64>,
    titles: Vec<String>,
    ratings: Array2<f64>,
    rated: Array2<bool>,
}

impl RatingMatrix {
    pub fn build(users: &[User]) -> Self {
        // (user, title) -> (sum, count); repeated ratings are averaged
        let mut aggregated: BTreeMap<(i64, &str), (f64, u32)> = BTreeMap::new();
        for user in users {
            for event in &user.history {
                let cell = aggregated
                    .entry((user.id, event.book_title.as_str()))
                    .or_insert((0.0, 0));
                cell.0 += event.rating;
                cell.1 += 1;
            }
        }

        let titles: Vec<String> = aggregated
            .keys()
            .map(|(_, title)| *title)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        // Without any book column there is nothing to compare users on
        let user_ids: Vec<i64> = if titles.is_empty() {
            Vec::new()
        } else {
            users
                .iter()
                .map(|u| u.id)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        };

        let mut ratings = Array2::<f64>::zeros((user_ids.len(), titles.len()));
        let mut rated = Array2::<bool>::from_elem((user_ids.len(), titles.len()), false);

        for ((user_id, title), (sum, count)) in &aggregated {
            let (Ok(row), Ok(col)) = (
                user_ids.binary_search(user_id),
                titles.binary_search_by(|t| t.as_str().cmp(title)),
            ) else {
                continue;
            };
            ratings[[row, col]] = sum / f64::from(*count);
            rated[[row, col]] = true;
        }

        info!(
            users = user_ids.len(),
            books = titles.len(),
            ratings = aggregated.len(),
            "Rating matrix built"
        );

        Self {
            user_ids,
            titles,
            ratings,
            rated,
        }
    }

    pub fn user_ids(&self) -> &[i64] {
        &self.user_ids
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn ratings(&self) -> &Array2<f64> {
        &self.ratings
    }

    pub fn is_empty(&self) -> bool {
        self.user_ids.is_empty()
    }

    pub fn contains_user(&self, user_id: i64) -> bool {
        self.row_index(user_id).is_some()
    }

    pub fn row_index(&self, user_id: i64) -> Option<usize> {
        self.user_ids.binary_search(&user_id).ok()
    }

    pub fn column_index(&self, title: &str) -> Option<usize> {
        self.titles
            .binary_search_by(|t| t.as_str().cmp(title))
            .ok()
    }

    /// The user's 0-filled rating vector over every title column.
    pub fn row(&self, user_id: i64) -> Option<ArrayView1<'_, f64>> {
        self.row_index(user_id).map(|idx| self.ratings.row(idx))
    }

    pub fn row_at(&self, row: usize) -> ArrayView1<'_, f64> {
        self.ratings.row(row)
    }

    /// Whether the cell holds an actual rating (as opposed to 0-fill).
    pub fn is_rated(&self, row: usize, col: usize) -> bool {
        self.rated[[row, col]]
    }

    /// The stored rating, `None` when the user never rated `title`.
    pub fn get(&self, user_id: i64, title: &str) -> Option<f64> {
        let row = self.row_index(user_id)?;
        let col = self.column_index(title)?;
        self.rated[[row, col]].then(|| self.ratings[[row, col]])
    }
}
