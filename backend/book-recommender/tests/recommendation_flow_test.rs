use book_recommender::models::RawRow;
use book_recommender::services::genre_index::GenreIndex;
use book_recommender::{
    sources, CatalogNormalizer, Config, NeighborFinder, RatingMatrix, RecommendationEngine,
    RecommendationError, UserNormalizer,
};
use std::collections::HashSet;
use std::io::Write;

fn row(pairs: &[(&str, &str)]) -> RawRow {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn book(id: &str, title: &str, author: &str, rating: &str, genre: &str) -> RawRow {
    row(&[
        ("id", id),
        ("title", title),
        ("author", author),
        ("rating", rating),
        ("reviews_count", "1000"),
        ("genre", genre),
    ])
}

/// Ten books across Fiction, Fantasy and Classic.
fn catalog_rows() -> Vec<RawRow> {
    vec![
        book("1", "The Hobbit", "J.R.R. Tolkien", "4.8", "['Fantasy', 'Classic']"),
        book("2", "The Lord of the Rings", "J.R.R. Tolkien", "4.9", "['Fantasy', 'Classic']"),
        book("3", "Harry Potter and the Sorcerer's Stone", "J.K. Rowling", "4.7", "[\"Fantasy\", \"Fiction\"]"),
        book("4", "Pride and Prejudice", "Jane Austen", "4.6", "['Classic', 'Fiction']"),
        book("5", "1984", "George Orwell", "4.7", "['Classic', 'Fiction']"),
        book("6", "The Great Gatsby", "F. Scott Fitzgerald", "4.4", "Classic"),
        book("7", "The Name of the Wind", "Patrick Rothfuss", "4.5", "['Fantasy']"),
        book("8", "Eragon", "Christopher Paolini", "4.2", "Fantasy"),
        book("9", "The Alchemist", "Paulo Coelho", "4.3", "['Fiction']"),
        book("10", "Jane Eyre", "Charlotte Bronte", "4.5", "['Classic', 'Fiction']"),
    ]
}

fn user_rows() -> Vec<RawRow> {
    vec![
        row(&[
            ("ID", "0"),
            ("name", "Frodo"),
            ("age", "50"),
            ("preferences", "['Fantasy']"),
            (
                "book_history",
                "[{'book': 'The Hobbit', 'author': 'J.R.R. Tolkien', 'genre': 'Fantasy', 'rating': 4.8}, \
                 {'book': '1984', 'author': 'George Orwell', 'genre': 'Classic', 'rating': 2.0}, \
                 {'book': 'Emma', 'author': 'Jane Austen', 'genre': 'Classic', 'rating': 1.0}]",
            ),
        ]),
        row(&[
            ("ID", "1"),
            ("name", "Sam"),
            ("age", "38"),
            ("preferences", "['Fantasy', 'Fiction']"),
            (
                "book_history",
                "[{'book': 'The Hobbit', 'rating': 5.0}, {'book': '1984', 'rating': 2.0}, \
                 {'book': 'Emma', 'rating': 1.0}, {'book': 'The Lord of the Rings', 'rating': 5.0}, \
                 {'book': 'Eragon', 'rating': 3.0}]",
            ),
        ]),
        row(&[
            ("ID", "2"),
            ("name", "Pippin"),
            ("age", "29"),
            ("preferences", "['Classic']"),
            (
                "book_history",
                "[{'book': 'The Hobbit', 'rating': 4.0}, {'book': '1984', 'rating': 3.0}, \
                 {'book': 'The Alchemist', 'rating': 4.0}, {'book': 'Eragon', 'rating': 1.0}]",
            ),
        ]),
        row(&[
            ("ID", "3"),
            ("name", "Gollum"),
            ("age", "589"),
            ("preferences", "['Fiction']"),
            (
                "book_history",
                "[{'book': 'The Hobbit', 'rating': 1.0}, {'book': '1984', 'rating': 5.0}, \
                 {'book': 'Emma', 'rating': 5.0}, {'book': 'Jane Eyre', 'rating': 5.0}]",
            ),
        ]),
        row(&[("ID", "4"), ("name", "Newcomer"), ("preferences", "[]"), ("book_history", "[]")]),
        row(&[
            ("ID", "5"),
            ("name", "Broken"),
            ("preferences", "['Fantasy'"),
            ("book_history", "[{'book': 'Eragon'}, {'book': 'The Hobbit', 'rating': 3.5}]"),
        ]),
    ]
}

fn engine() -> RecommendationEngine {
    RecommendationEngine::from_tables(&catalog_rows(), &user_rows(), &Config::default()).unwrap()
}

#[test]
fn test_genre_index_row_count() {
    let catalog = CatalogNormalizer::new().normalize(&catalog_rows()).unwrap();
    let index = GenreIndex::build(&catalog.books);

    let expected: usize = catalog.books.iter().map(|b| b.genres.len()).sum();
    assert_eq!(index.len(), expected);
    assert_eq!(index.len(), 16);
}

#[test]
fn test_preference_rank_excludes_read_books() {
    let engine = engine();

    let recs = engine.recommend_by_preferences(0).unwrap();

    assert!(!recs.contains_title("The Hobbit"));
    assert_eq!(recs.titles()[0], "The Lord of the Rings");
    assert_eq!(recs.titles()[1], "Harry Potter and the Sorcerer's Stone");
    assert_eq!(recs.authors()[1], "J.K. Rowling");
    assert!(recs.len() <= 5);
}

#[test]
fn test_preference_rank_is_idempotent() {
    let engine = engine();

    assert_eq!(
        engine.recommend_by_preferences(1).unwrap(),
        engine.recommend_by_preferences(1).unwrap()
    );
}

#[test]
fn test_collaborative_excludes_read_books() {
    let engine = engine();
    let user = engine.user(0).unwrap();
    let read: HashSet<&str> = user.read_titles();

    let recs = engine.recommend_by_similar_readers(0).unwrap();

    assert!(!recs.is_empty());
    assert!(recs.len() <= 5);
    assert_eq!(recs.titles().len(), recs.authors().len());
    assert!(recs.titles().iter().all(|t| !read.contains(t.as_str())));
    // Four defined neighbors, unrated cells averaged in as 0.0:
    // Jane Eyre 5/4, LOTR 5/4, Eragon (1 + 3)/4, The Alchemist 4/4
    assert_eq!(
        recs.titles(),
        &[
            "Jane Eyre".to_string(),
            "The Lord of the Rings".to_string(),
            "Eragon".to_string(),
            "The Alchemist".to_string(),
        ]
    );
}

#[test]
fn test_neighbor_ranking_properties() {
    let engine = engine();

    for &user_id in engine.matrix().user_ids() {
        let ranking = engine.similar_readers(user_id).unwrap();
        assert!(ranking.neighbors.iter().all(|n| n.user_id != user_id));
        assert!(ranking
            .neighbors
            .iter()
            .all(|n| (-1.0..=1.0).contains(&n.correlation)));
        for pair in ranking.neighbors.windows(2) {
            assert!(pair[0].correlation >= pair[1].correlation);
        }
    }
}

#[test]
fn test_newcomer_gets_empty_results() {
    let engine = engine();

    assert!(engine.recommend_by_preferences(4).unwrap().is_empty());
    assert!(engine.recommend_by_similar_readers(4).unwrap().is_empty());
}

#[test]
fn test_malformed_user_fields_degrade_gracefully() {
    let engine = engine();

    let user = engine.user(5).unwrap();
    assert!(user.preferences.is_empty());
    assert_eq!(user.history.len(), 1);
    assert!(engine.recommend_by_preferences(5).unwrap().is_empty());
    assert!(engine.warnings().count() >= 2);
}

#[test]
fn test_unknown_user() {
    let engine = engine();

    assert!(matches!(
        engine.recommend_by_similar_readers(99),
        Err(RecommendationError::UnknownUser(99))
    ));
}

#[test]
fn test_identical_single_book_readers_have_no_defined_similarity() {
    let users = UserNormalizer::new().normalize(&[
        row(&[("id", "1"), ("history", "[{'book': '1984', 'rating': 4.0}]")]),
        row(&[("id", "2"), ("history", "[{'book': '1984', 'rating': 4.0}]")]),
    ]);
    let matrix = RatingMatrix::build(&users.users);

    let ranking = NeighborFinder::new().rank(&matrix, 1).unwrap();

    assert!(ranking.is_empty());
}

#[test]
fn test_full_flow_from_csv_files() {
    let mut books = tempfile::NamedTempFile::new().unwrap();
    writeln!(books, "id,title,author,rating,reviews_count,genre,edition").unwrap();
    writeln!(books, "1,Dune,Frank Herbert,4.6,120,\"['Science Fiction']\",").unwrap();
    writeln!(books, "2,Neuromancer,William Gibson,4.2,80,\"['Science Fiction', 'Cyberpunk']\",").unwrap();
    writeln!(books, "3,Emma,Jane Austen,4.1,95,['Classic'],2nd").unwrap();
    writeln!(books, "4,Untagged,Nobody,3.0,1,,").unwrap();

    let mut users = tempfile::NamedTempFile::new().unwrap();
    writeln!(users, ",name,age,preferences,book_history,ID").unwrap();
    writeln!(
        users,
        "0,Ada,34,\"['Science Fiction']\",\"[{{'book': 'Dune', 'rating': 5.0}}]\",0"
    )
    .unwrap();

    let config = Config {
        catalog_path: books.path().display().to_string(),
        users_path: users.path().display().to_string(),
        ..Config::default()
    };

    let book_rows = sources::load_rows(&config.catalog_path).unwrap();
    let user_rows = sources::load_rows(&config.users_path).unwrap();
    let engine = RecommendationEngine::from_tables(&book_rows, &user_rows, &config).unwrap();

    assert_eq!(engine.books().len(), 3);
    assert_eq!(engine.dropped_columns(), &["edition".to_string()]);

    let recs = engine.recommend_by_preferences(0).unwrap();
    let (titles, authors) = recs.into_parts();
    assert_eq!(titles, vec!["Neuromancer".to_string()]);
    assert_eq!(authors, vec!["William Gibson".to_string()]);
}
