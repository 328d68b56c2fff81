//! Batch recommender - prints recommendations for one reader
//!
//! Usage: book-recommender <user_id> [preferences|readers|surprise|all] [--json]
//!
//! Environment variables:
//! - CATALOG_PATH: catalog CSV (default: data/books.csv)
//! - USERS_PATH: user store CSV (default: data/users.csv)
//! - NEIGHBOR_COUNT: neighbors used for collaborative filtering (default: 5)
//! - MAX_RECOMMENDATIONS: results per list (default: 5)
//! - NEIGHBOR_AVERAGING: zero_fill | rated_only (default: zero_fill)
//! - SURPRISE_COUNT / RANDOM_SEED: surprise sampling
//! - LOG_FORMAT: text | json; RUST_LOG filters log output (stderr)

use anyhow::{bail, Context, Result};
use book_recommender::config::{Config, LogFormat};
use book_recommender::models::{Book, Recommendations};
use book_recommender::{sources, RecommendationEngine};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Preferences,
    Readers,
    Surprise,
    All,
}

impl Mode {
    fn parse(raw: &str) -> Result<Self> {
        match raw {
            "preferences" => Ok(Mode::Preferences),
            "readers" => Ok(Mode::Readers),
            "surprise" => Ok(Mode::Surprise),
            "all" => Ok(Mode::All),
            other => bail!("unknown mode {other:?} (expected preferences|readers|surprise|all)"),
        }
    }

    fn includes(self, other: Mode) -> bool {
        self == Mode::All || self == other
    }
}

#[derive(Serialize)]
struct Report<'a> {
    user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    by_preferences: Option<Recommendations>,
    #[serde(skip_serializing_if = "Option::is_none")]
    by_similar_readers: Option<Recommendations>,
    #[serde(skip_serializing_if = "Option::is_none")]
    surprise: Option<Vec<&'a Book>>,
}

fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.log_format);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let json = args.iter().any(|a| a == "--json");
    let positional: Vec<&str> = args
        .iter()
        .map(String::as_str)
        .filter(|a| !a.starts_with("--"))
        .collect();

    let Some(raw_user_id) = positional.first() else {
        bail!("usage: book-recommender <user_id> [preferences|readers|surprise|all] [--json]");
    };
    let user_id: i64 = raw_user_id
        .parse()
        .with_context(|| format!("invalid user id {raw_user_id:?}"))?;
    let mode = positional
        .get(1)
        .map(|raw| Mode::parse(raw))
        .transpose()?
        .unwrap_or(Mode::All);

    info!(
        "Starting book-recommender v{}",
        env!("CARGO_PKG_VERSION")
    );

    let book_rows = sources::load_rows(&config.catalog_path)
        .with_context(|| format!("Failed to load catalog from {}", config.catalog_path))?;
    let user_rows = sources::load_rows(&config.users_path)
        .with_context(|| format!("Failed to load users from {}", config.users_path))?;

    let engine = RecommendationEngine::from_tables(&book_rows, &user_rows, &config)
        .context("Failed to build recommendation engine")?;

    let mut rng = match config.random_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let report = Report {
        user_id,
        by_preferences: mode
            .includes(Mode::Preferences)
            .then(|| engine.recommend_by_preferences(user_id))
            .transpose()?,
        by_similar_readers: mode
            .includes(Mode::Readers)
            .then(|| engine.recommend_by_similar_readers(user_id))
            .transpose()?,
        surprise: mode
            .includes(Mode::Surprise)
            .then(|| engine.surprise(&mut rng)),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn print_report(report: &Report<'_>) {
    if let Some(recs) = &report.by_preferences {
        print_list("Recommended from your favourite genres", recs);
    }
    if let Some(recs) = &report.by_similar_readers {
        print_list("Readers like you also enjoyed", recs);
    }
    if let Some(books) = &report.surprise {
        println!("\nSurprise Books:\n");
        for book in books {
            println!(" - {} by {} (ID={})", book.title, book.author, book.id);
        }
    }
    println!();
}

fn print_list(heading: &str, recs: &Recommendations) {
    println!("\n{heading}:\n");
    if recs.is_empty() {
        println!(" (nothing to recommend yet)");
    }
    for (title, author) in recs.iter() {
        println!(" - {title} by {author}");
    }
}
