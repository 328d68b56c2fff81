use crate::error::{RecommendationError, Result};
use crate::models::NeighborAveraging;
use serde::Deserialize;

/// Runtime configuration, read from the environment (and `.env` if present).
///
/// Every field has a default, so an empty environment yields a usable config.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
    #[serde(default = "default_users_path")]
    pub users_path: String,
    /// Neighbors consulted by the collaborative recommender (top_k)
    #[serde(default = "default_neighbor_count")]
    pub neighbor_count: usize,
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,
    /// Minimum fraction of present values a catalog column needs to be kept
    #[serde(default = "default_sparse_column_threshold")]
    pub sparse_column_threshold: f64,
    #[serde(default)]
    pub neighbor_averaging: NeighborAveraging,
    #[serde(default = "default_surprise_count")]
    pub surprise_count: usize,
    #[serde(default)]
    pub random_seed: Option<u64>,
    #[serde(default)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

fn default_catalog_path() -> String {
    "data/books.csv".to_string()
}

fn default_users_path() -> String {
    "data/users.csv".to_string()
}

fn default_neighbor_count() -> usize {
    5
}

fn default_max_recommendations() -> usize {
    5
}

fn default_sparse_column_threshold() -> f64 {
    2.0 / 3.0
}

fn default_surprise_count() -> usize {
    3
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            users_path: default_users_path(),
            neighbor_count: default_neighbor_count(),
            max_recommendations: default_max_recommendations(),
            sparse_column_threshold: default_sparse_column_threshold(),
            neighbor_averaging: NeighborAveraging::default(),
            surprise_count: default_surprise_count(),
            random_seed: None,
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config: Config = envy::from_env()?;
        config.validate()
    }

    /// Build from explicit key/value pairs (keys use the env var spelling).
    pub fn from_iter<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Config = envy::from_iter(vars)?;
        config.validate()
    }

    fn validate(self) -> Result<Self> {
        if self.neighbor_count == 0 {
            return Err(RecommendationError::Config(
                "NEIGHBOR_COUNT must be at least 1".to_string(),
            ));
        }
        if self.max_recommendations == 0 {
            return Err(RecommendationError::Config(
                "MAX_RECOMMENDATIONS must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.sparse_column_threshold) {
            return Err(RecommendationError::Config(format!(
                "SPARSE_COLUMN_THRESHOLD must be within [0, 1], got {}",
                self.sparse_column_threshold
            )));
        }
        Ok(self)
    }
}
