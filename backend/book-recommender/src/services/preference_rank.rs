use super::genre_index::GenreIndex;
use crate::models::{Book, Recommendations, User};
use crate::utils::cmp_desc;
use std::collections::HashSet;
use tracing::info;

pub const DEFAULT_LIMIT: usize = 5;

/// Preference-rank filtering: books in the reader's declared genres, best
/// global rating first, minus what the reader already rated.
pub struct PreferenceRankRecommender {
    limit: usize,
}

impl Default for PreferenceRankRecommender {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PreferenceRankRecommender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self { limit }
    }

    pub fn recommend(&self, index: &GenreIndex<'_>, user: &User) -> Recommendations {
        let mut recommendations = Recommendations::default();
        if user.preferences.is_empty() {
            info!(user_id = user.id, "No genre preferences, nothing to rank");
            return recommendations;
        }

        let mut candidates: Vec<&Book> = index
            .in_genres(&user.preferences)
            .map(|entry| entry.book)
            .collect();
        // Stable: equal ratings keep catalog order
        candidates.sort_by(|a, b| cmp_desc(a.rating, b.rating));

        let read = user.read_titles();
        let mut emitted: HashSet<&str> = HashSet::new();

        for book in candidates {
            if recommendations.len() >= self.limit {
                break;
            }
            let title = book.title.as_str();
            if read.contains(title) || !emitted.insert(title) {
                continue;
            }
            let author = index.author_of(title).unwrap_or(book.author.as_str());
            recommendations.push(title, author);
        }

        info!(
            user_id = user.id,
            preferences = user.preferences.len(),
            recommended = recommendations.len(),
            "Preference-rank recommendations generated"
        );

        recommendations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RatingEvent;

    fn book(id: i64, title: &str, author: &str, rating: f64, genres: &[&str]) -> Book {
        Book {
            id,
            title: title.to_string(),
            author: author.to_string(),
            rating,
            reviews_count: 100,
            genres: genres.iter().map(|g| g.to_string()).collect(),
        }
    }

    fn reader(preferences: &[&str], read: &[(&str, f64)]) -> User {
        User {
            id: 7,
            name: "Reader".to_string(),
            age: Some(30),
            preferences: preferences.iter().map(|p| p.to_string()).collect(),
            history: read
                .iter()
                .map(|(title, rating)| RatingEvent {
                    book_title: title.to_string(),
                    author: String::new(),
                    genre: "Fantasy".to_string(),
                    rating: *rating,
                })
                .collect(),
        }
    }

    fn catalog() -> Vec<Book> {
        vec![
            book(1, "The Hobbit", "J.R.R. Tolkien", 4.8, &["Fantasy", "Classic"]),
            book(2, "The Lord of the Rings", "J.R.R. Tolkien", 4.9, &["Fantasy", "Classic"]),
            book(3, "Harry Potter and the Sorcerer's Stone", "J.K. Rowling", 4.7, &["Fantasy", "Fiction"]),
            book(4, "Pride and Prejudice", "Jane Austen", 4.6, &["Classic", "Fiction"]),
            book(5, "1984", "George Orwell", 4.7, &["Classic", "Fiction"]),
            book(6, "The Great Gatsby", "F. Scott Fitzgerald", 4.4, &["Classic", "Fiction"]),
            book(7, "The Name of the Wind", "Patrick Rothfuss", 4.5, &["Fantasy"]),
            book(8, "Eragon", "Christopher Paolini", 4.2, &["Fantasy"]),
            book(9, "The Alchemist", "Paulo Coelho", 4.3, &["Fiction"]),
            book(10, "Jane Eyre", "Charlotte Bronte", 4.5, &["Classic"]),
        ]
    }

    #[test]
    fn test_fantasy_reader_who_read_the_hobbit() {
        let books = catalog();
        let index = GenreIndex::build(&books);
        let user = reader(&["Fantasy"], &[("The Hobbit", 4.8)]);

        let recs = PreferenceRankRecommender::new().recommend(&index, &user);

        assert_eq!(
            recs.titles(),
            &[
                "The Lord of the Rings".to_string(),
                "Harry Potter and the Sorcerer's Stone".to_string(),
                "The Name of the Wind".to_string(),
                "Eragon".to_string(),
            ]
        );
        assert_eq!(recs.authors()[0], "J.R.R. Tolkien");
        assert!(!recs.contains_title("The Hobbit"));
    }

    #[test]
    fn test_multi_genre_books_appear_once_and_limit_applies() {
        let books = catalog();
        let index = GenreIndex::build(&books);
        let user = reader(&["Fantasy", "Classic", "Fiction"], &[]);

        let recs = PreferenceRankRecommender::new().recommend(&index, &user);

        assert_eq!(recs.len(), 5);
        assert_eq!(recs.titles().len(), recs.authors().len());
        let unique: HashSet<_> = recs.titles().iter().collect();
        assert_eq!(unique.len(), 5);
        // 4.7 tie: Harry Potter precedes 1984 in catalog order
        assert_eq!(recs.titles()[2], "Harry Potter and the Sorcerer's Stone");
        assert_eq!(recs.titles()[3], "1984");
    }

    #[test]
    fn test_no_preferences_means_no_recommendations() {
        let books = catalog();
        let index = GenreIndex::build(&books);

        let recs = PreferenceRankRecommender::new().recommend(&index, &reader(&[], &[]));

        assert!(recs.is_empty());
    }

    #[test]
    fn test_unknown_genre_matches_nothing() {
        let books = catalog();
        let index = GenreIndex::build(&books);

        let recs = PreferenceRankRecommender::new().recommend(&index, &reader(&["Poetry"], &[]));

        assert!(recs.is_empty());
    }

    #[test]
    fn test_title_match_is_case_sensitive() {
        let books = catalog();
        let index = GenreIndex::build(&books);
        let user = reader(&["Fantasy"], &[("the lord of the rings", 5.0)]);

        let recs = PreferenceRankRecommender::new().recommend(&index, &user);

        assert!(recs.contains_title("The Lord of the Rings"));
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let books = catalog();
        let index = GenreIndex::build(&books);
        let user = reader(&["Classic"], &[("1984", 4.0)]);
        let recommender = PreferenceRankRecommender::with_limit(3);

        let first = recommender.recommend(&index, &user);
        let second = recommender.recommend(&index, &user);

        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }
}
