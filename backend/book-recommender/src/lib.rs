pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod sources;
pub mod utils;

pub use config::Config;
pub use error::{RecommendationError, Result};
pub use services::{
    CatalogNormalizer, CollaborativeRecommender, GenreIndex, NeighborFinder,
    PreferenceRankRecommender, RatingMatrix, RecommendationEngine, UserNormalizer,
};
