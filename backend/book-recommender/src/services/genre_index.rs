use crate::models::{Book, GenreEntry};
use std::collections::BTreeSet;

/// Exploded catalog view: one entry per (book, genre) pair.
///
/// Entries borrow the catalog, so the index never outlives the books it
/// was built from. Entry order follows catalog order, then genre order.
#[derive(Debug, Clone)]
pub struct GenreIndex<'a> {
    entries: Vec<GenreEntry<'a>>,
}

impl<'a> GenreIndex<'a> {
    pub fn build(books: &'a [Book]) -> Self {
        let entries = books
            .iter()
            .flat_map(|book| {
                book.genres.iter().map(move |genre| GenreEntry {
                    book,
                    genre: genre.as_str(),
                })
            })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[GenreEntry<'a>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose genre is one of `genres` (exact match).
    pub fn in_genres<'g>(
        &'g self,
        genres: &'g BTreeSet<String>,
    ) -> impl Iterator<Item = &'g GenreEntry<'a>> + 'g {
        self.entries
            .iter()
            .filter(move |entry| genres.contains(entry.genre))
    }

    /// Author of the first entry carrying `title`.
    pub fn author_of(&self, title: &str) -> Option<&'a str> {
        self.entries
            .iter()
            .find(|entry| entry.book.title == title)
            .map(|entry| entry.book.author.as_str())
    }

    /// Distinct genre vocabulary of the catalog.
    pub fn genres(&self) -> BTreeSet<&'a str> {
        self.entries.iter().map(|entry| entry.genre).collect()
    }
}
