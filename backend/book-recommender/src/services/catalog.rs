// ============================================
// Catalog Normalizer
// ============================================
//
// Raw catalog rows → canonical `Book`s:
//   1. Drop columns whose share of present values is below the threshold
//      (catalog-wide, default 2/3)
//   2. Drop rows without a genre
//   3. Parse the genre cell (list literal or bare string) into a tag set
//
// Rows that fail to parse are skipped and reported; only an empty result is
// an error.

use super::literal;
use crate::error::{MalformedRecord, RecommendationError, RecordKind, Result};
use crate::models::{Book, RawRow};
use crate::utils::parse_integer;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info};

pub const COL_ID: &str = "id";
pub const COL_TITLE: &str = "title";
pub const COL_AUTHOR: &str = "author";
pub const COL_RATING: &str = "rating";
pub const COL_REVIEWS_COUNT: &str = "reviews_count";
pub const COL_GENRE: &str = "genre";

const MAX_BOOK_RATING: f64 = 5.0;

/// Result of one normalization pass.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub books: Vec<Book>,
    /// Columns removed for being too sparse, sorted by name
    pub dropped_columns: Vec<String>,
    /// Rows removed because they had no genre
    pub rows_without_genre: usize,
    pub skipped: Vec<MalformedRecord>,
}

pub struct CatalogNormalizer {
    sparse_column_threshold: f64,
}

impl Default for CatalogNormalizer {
    fn default() -> Self {
        Self {
            sparse_column_threshold: 2.0 / 3.0,
        }
    }
}

impl CatalogNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(sparse_column_threshold: f64) -> Self {
        Self {
            sparse_column_threshold,
        }
    }

    pub fn normalize(&self, rows: &[RawRow]) -> Result<Catalog> {
        let total_rows = rows.len();
        if total_rows == 0 {
            return Err(RecommendationError::CatalogEmpty { total_rows });
        }

        let (kept, dropped_columns) = self.partition_columns(rows);
        if !dropped_columns.is_empty() {
            info!(
                dropped = ?dropped_columns,
                total_rows,
                "Dropped sparse catalog columns"
            );
        }

        let mut catalog = Catalog {
            dropped_columns,
            ..Default::default()
        };

        for (position, row) in rows.iter().enumerate() {
            let Some(raw_genre) = cell(row, &kept, COL_GENRE) else {
                catalog.rows_without_genre += 1;
                continue;
            };

            match parse_book(row, &kept, raw_genre) {
                Ok(book) => catalog.books.push(book),
                Err(reason) => catalog
                    .skipped
                    .push(MalformedRecord::new(RecordKind::Book, position, reason).warn()),
            }
        }

        if catalog.books.is_empty() {
            return Err(RecommendationError::CatalogEmpty { total_rows });
        }

        info!(
            total_rows,
            books = catalog.books.len(),
            without_genre = catalog.rows_without_genre,
            skipped = catalog.skipped.len(),
            "Catalog normalized"
        );

        Ok(catalog)
    }

    /// Split the column set into kept and dropped (sparse) columns.
    fn partition_columns<'a>(&self, rows: &'a [RawRow]) -> (HashSet<&'a str>, Vec<String>) {
        let columns: BTreeSet<&str> = rows
            .iter()
            .flat_map(|row| row.keys().map(String::as_str))
            .collect();

        let min_present = self.sparse_column_threshold * rows.len() as f64;
        let mut kept = HashSet::new();
        let mut dropped = Vec::new();

        for column in columns {
            let present = rows
                .iter()
                .filter(|row| row.get(column).is_some_and(|v| is_present(v)))
                .count();

            debug!(column, present, "Catalog column density");

            if present as f64 + f64::EPSILON >= min_present {
                kept.insert(column);
            } else {
                dropped.push(column.to_string());
            }
        }

        (kept, dropped)
    }
}

fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

fn cell<'r>(row: &'r RawRow, kept: &HashSet<&str>, column: &str) -> Option<&'r str> {
    if !kept.contains(column) {
        return None;
    }
    row.get(column)
        .map(String::as_str)
        .filter(|value| is_present(value))
}

fn parse_book(
    row: &RawRow,
    kept: &HashSet<&str>,
    raw_genre: &str,
) -> std::result::Result<Book, String> {
    let genres = parse_genres(raw_genre)?;

    let id = cell(row, kept, COL_ID)
        .ok_or_else(|| "missing id".to_string())
        .and_then(|raw| parse_integer(raw).ok_or_else(|| format!("invalid id {raw:?}")))?;

    let title = cell(row, kept, COL_TITLE)
        .ok_or_else(|| "missing title".to_string())?
        .to_string();

    let author = cell(row, kept, COL_AUTHOR).unwrap_or_default().to_string();

    let rating = match cell(row, kept, COL_RATING) {
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|r| (0.0..=MAX_BOOK_RATING).contains(r))
            .ok_or_else(|| format!("invalid rating {raw:?}"))?,
        None => 0.0,
    };

    let reviews_count = match cell(row, kept, COL_REVIEWS_COUNT) {
        Some(raw) => parse_integer(&raw.replace(',', ""))
            .and_then(|n| u64::try_from(n).ok())
            .ok_or_else(|| format!("invalid reviews_count {raw:?}"))?,
        None => 0,
    };

    Ok(Book {
        id,
        title,
        author,
        rating,
        reviews_count,
        genres,
    })
}

/// `['A', 'B']` → {A, B}; anything not starting with `[` is a single tag.
fn parse_genres(raw: &str) -> std::result::Result<BTreeSet<String>, String> {
    let trimmed = raw.trim_start();
    let tags: Vec<String> = if trimmed.starts_with('[') {
        literal::parse_string_list(trimmed).map_err(|e| format!("invalid genre list: {e}"))?
    } else {
        vec![raw.to_string()]
    };

    let genres: BTreeSet<String> = tags
        .into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();

    if genres.is_empty() {
        return Err("empty genre list".to_string());
    }
    Ok(genres)
}

impl Book {
    /// Raw row in the catalog source shape; normalizing it yields `self` again.
    pub fn to_raw_row(&self) -> RawRow {
        let mut row = RawRow::new();
        row.insert(COL_ID.to_string(), self.id.to_string());
        row.insert(COL_TITLE.to_string(), self.title.clone());
        row.insert(COL_AUTHOR.to_string(), self.author.clone());
        row.insert(COL_RATING.to_string(), self.rating.to_string());
        row.insert(COL_REVIEWS_COUNT.to_string(), self.reviews_count.to_string());
        row.insert(
            COL_GENRE.to_string(),
            literal::format_string_list(self.genres.iter().map(String::as_str)),
        );
        row
    }
}
