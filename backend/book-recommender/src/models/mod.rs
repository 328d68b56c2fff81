use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

/// A raw table row: column name -> raw cell text. Missing cells are absent.
pub type RawRow = HashMap<String, String>;

/// A cleaned catalog entry. `genres` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub rating: f64,
    pub reviews_count: u64,
    pub genres: BTreeSet<String>,
}

/// One (book, genre) pair of the exploded catalog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenreEntry<'a> {
    pub book: &'a Book,
    pub genre: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingEvent {
    pub book_title: String,
    pub author: String,
    pub genre: String,
    pub rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub age: Option<u32>,
    pub preferences: BTreeSet<String>,
    pub history: Vec<RatingEvent>,
}

impl User {
    /// Titles the user has already rated (exact, case-sensitive).
    pub fn read_titles(&self) -> HashSet<&str> {
        self.history.iter().map(|e| e.book_title.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighbor {
    pub user_id: i64,
    pub correlation: f64,
}

/// Other users ordered by descending correlation with `target`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborRanking {
    pub target: i64,
    pub neighbors: Vec<Neighbor>,
}

impl NeighborRanking {
    pub fn top(&self, k: usize) -> &[Neighbor] {
        &self.neighbors[..k.min(self.neighbors.len())]
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}

/// How the collaborative recommender averages neighbor ratings per book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborAveraging {
    /// Mean over every neighbor row, unrated cells counting as 0.0
    #[default]
    ZeroFill,
    /// Mean over the neighbors that actually rated the book
    RatedOnly,
}

/// Recommender output: parallel title/author lists of equal length.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Recommendations {
    titles: Vec<String>,
    authors: Vec<String>,
}

impl Recommendations {
    pub fn push(&mut self, title: impl Into<String>, author: impl Into<String>) {
        self.titles.push(title.into());
        self.authors.push(author.into());
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn contains_title(&self, title: &str) -> bool {
        self.titles.iter().any(|t| t == title)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.titles
            .iter()
            .zip(self.authors.iter())
            .map(|(t, a)| (t.as_str(), a.as_str()))
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        (self.titles, self.authors)
    }
}
