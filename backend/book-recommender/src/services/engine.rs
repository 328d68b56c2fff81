use super::catalog::{Catalog, CatalogNormalizer};
use super::collaborative::CollaborativeRecommender;
use super::genre_index::GenreIndex;
use super::neighbors::NeighborFinder;
use super::preference_rank::PreferenceRankRecommender;
use super::rating_matrix::RatingMatrix;
use super::surprise;
use super::users::{UserDirectory, UserNormalizer};
use crate::config::Config;
use crate::error::{MalformedRecord, RecommendationError, Result};
use crate::models::{Book, NeighborRanking, RawRow, Recommendations, User};
use rand::Rng;
use tracing::info;

/// Immutable snapshot of the catalog and readers plus both recommenders.
///
/// Built once from raw tables; every query reads the snapshot and nothing
/// is mutated afterwards.
pub struct RecommendationEngine {
    catalog: Catalog,
    users: UserDirectory,
    matrix: RatingMatrix,
    preference: PreferenceRankRecommender,
    collaborative: CollaborativeRecommender,
    surprise_count: usize,
}

impl RecommendationEngine {
    pub fn from_tables(book_rows: &[RawRow], user_rows: &[RawRow], config: &Config) -> Result<Self> {
        let catalog =
            CatalogNormalizer::with_threshold(config.sparse_column_threshold).normalize(book_rows)?;
        let users = UserNormalizer::new().normalize(user_rows);
        let matrix = RatingMatrix::build(&users.users);

        info!(
            books = catalog.books.len(),
            users = users.users.len(),
            matrix_users = matrix.user_ids().len(),
            matrix_books = matrix.titles().len(),
            "Recommendation engine ready"
        );

        Ok(Self {
            catalog,
            users,
            matrix,
            preference: PreferenceRankRecommender::with_limit(config.max_recommendations),
            collaborative: CollaborativeRecommender::new(config.neighbor_count)
                .with_limit(config.max_recommendations)
                .with_averaging(config.neighbor_averaging),
            surprise_count: config.surprise_count,
        })
    }

    pub fn books(&self) -> &[Book] {
        &self.catalog.books
    }

    pub fn users(&self) -> &[User] {
        &self.users.users
    }

    pub fn matrix(&self) -> &RatingMatrix {
        &self.matrix
    }

    pub fn dropped_columns(&self) -> &[String] {
        &self.catalog.dropped_columns
    }

    /// Every record skipped or degraded while loading the tables.
    pub fn warnings(&self) -> impl Iterator<Item = &MalformedRecord> {
        self.catalog.skipped.iter().chain(self.users.warnings.iter())
    }

    pub fn genre_index(&self) -> GenreIndex<'_> {
        GenreIndex::build(&self.catalog.books)
    }

    pub fn user(&self, user_id: i64) -> Result<&User> {
        self.users
            .get(user_id)
            .ok_or(RecommendationError::UnknownUser(user_id))
    }

    pub fn recommend_by_preferences(&self, user_id: i64) -> Result<Recommendations> {
        let user = self.user(user_id)?;
        Ok(self.preference.recommend(&self.genre_index(), user))
    }

    /// Readers known to the directory but absent from the matrix (nobody has
    /// rated anything yet) get an empty result rather than an error.
    pub fn recommend_by_similar_readers(&self, user_id: i64) -> Result<Recommendations> {
        self.user(user_id)?;
        if !self.matrix.contains_user(user_id) {
            return Ok(Recommendations::default());
        }
        self.collaborative
            .recommend(&self.matrix, &self.genre_index(), user_id)
    }

    pub fn similar_readers(&self, user_id: i64) -> Result<NeighborRanking> {
        self.user(user_id)?;
        if !self.matrix.contains_user(user_id) {
            return Ok(NeighborRanking {
                target: user_id,
                neighbors: Vec::new(),
            });
        }
        NeighborFinder::new().rank(&self.matrix, user_id)
    }

    pub fn surprise<R>(&self, rng: &mut R) -> Vec<&Book>
    where
        R: Rng + ?Sized,
    {
        surprise::sample(&self.catalog.books, self.surprise_count, rng)
    }
}
