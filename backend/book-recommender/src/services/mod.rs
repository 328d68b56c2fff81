pub mod catalog;
pub mod collaborative;
pub mod engine;
pub mod genre_index;
pub mod literal;
pub mod neighbors;
pub mod preference_rank;
pub mod rating_matrix;
pub mod surprise;
pub mod users;

pub use catalog::{Catalog, CatalogNormalizer};
pub use collaborative::CollaborativeRecommender;
pub use engine::RecommendationEngine;
pub use genre_index::GenreIndex;
pub use neighbors::NeighborFinder;
pub use preference_rank::PreferenceRankRecommender;
pub use rating_matrix::RatingMatrix;
pub use users::{UserDirectory, UserNormalizer};
