// ============================================
// User Normalizer
// ============================================
//
// Raw user rows → `User`s with structured preferences and rating history.
// This is the only place the textual preference/history literals are parsed.
//
// Accepted column spellings (first present wins):
//   id          id | ID | UserID | user_id
//   name        name | Name
//   age         age | Age
//   preferences preferences | PreferredGenres
//   history     history | book_history | RatedBooks

use super::literal::{self, Literal};
use crate::error::{MalformedRecord, RecordKind};
use crate::models::{RawRow, RatingEvent, User};
use crate::utils::parse_integer;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info};

const ID_COLUMNS: &[&str] = &["id", "ID", "UserID", "user_id"];
const NAME_COLUMNS: &[&str] = &["name", "Name"];
const AGE_COLUMNS: &[&str] = &["age", "Age"];
const PREFERENCE_COLUMNS: &[&str] = &["preferences", "PreferredGenres"];
const HISTORY_COLUMNS: &[&str] = &["history", "book_history", "RatedBooks"];

const MIN_USER_RATING: f64 = 0.0;
const MAX_USER_RATING: f64 = 5.0;

#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    pub users: Vec<User>,
    /// Skipped rows and history entries, plus fields that fell back to empty
    pub warnings: Vec<MalformedRecord>,
}

impl UserDirectory {
    pub fn get(&self, user_id: i64) -> Option<&User> {
        self.users.iter().find(|u| u.id == user_id)
    }
}

#[derive(Debug, Default)]
pub struct UserNormalizer;

impl UserNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, rows: &[RawRow]) -> UserDirectory {
        let mut directory = UserDirectory::default();
        let mut seen_ids = HashSet::new();

        for (position, row) in rows.iter().enumerate() {
            let id = match field(row, ID_COLUMNS).map(parse_integer) {
                Some(Some(id)) => id,
                Some(None) => {
                    directory.warnings.push(
                        MalformedRecord::new(RecordKind::User, position, "invalid user id").warn(),
                    );
                    continue;
                }
                None => {
                    directory.warnings.push(
                        MalformedRecord::new(RecordKind::User, position, "missing user id").warn(),
                    );
                    continue;
                }
            };

            if !seen_ids.insert(id) {
                directory.warnings.push(
                    MalformedRecord::new(
                        RecordKind::User,
                        position,
                        format!("duplicate user id {id}"),
                    )
                    .warn(),
                );
                continue;
            }

            let preferences = match field(row, PREFERENCE_COLUMNS) {
                Some(raw) => parse_preferences(raw).unwrap_or_else(|| {
                    directory.warnings.push(
                        MalformedRecord::new(
                            RecordKind::User,
                            position,
                            format!("unparsable preferences for user {id}"),
                        )
                        .warn(),
                    );
                    BTreeSet::new()
                }),
                None => BTreeSet::new(),
            };

            let history = match field(row, HISTORY_COLUMNS) {
                Some(raw) => parse_history(id, raw, &mut directory.warnings).unwrap_or_else(|| {
                    directory.warnings.push(
                        MalformedRecord::new(
                            RecordKind::User,
                            position,
                            format!("unparsable history for user {id}"),
                        )
                        .warn(),
                    );
                    Vec::new()
                }),
                None => Vec::new(),
            };

            debug!(
                user_id = id,
                preferences = preferences.len(),
                history = history.len(),
                "User normalized"
            );

            directory.users.push(User {
                id,
                name: field(row, NAME_COLUMNS).unwrap_or_default().to_string(),
                age: field(row, AGE_COLUMNS).and_then(parse_age),
                preferences,
                history,
            });
        }

        info!(
            total_rows = rows.len(),
            users = directory.users.len(),
            warnings = directory.warnings.len(),
            "Users normalized"
        );

        directory
    }
}

fn field<'r>(row: &'r RawRow, aliases: &[&str]) -> Option<&'r str> {
    aliases
        .iter()
        .filter_map(|column| row.get(*column))
        .map(String::as_str)
        .find(|value| !value.trim().is_empty())
}

fn parse_age(raw: &str) -> Option<u32> {
    parse_integer(raw).and_then(|age| u32::try_from(age).ok())
}

fn parse_preferences(raw: &str) -> Option<BTreeSet<String>> {
    let tags = literal::parse_string_list(raw.trim()).ok()?;
    Some(
        tags.into_iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect(),
    )
}

/// `None` when the cell is not a list at all; bad entries are skipped.
fn parse_history(
    user_id: i64,
    raw: &str,
    warnings: &mut Vec<MalformedRecord>,
) -> Option<Vec<RatingEvent>> {
    let parsed = literal::parse(raw.trim()).ok()?;
    let entries = parsed.as_list()?;

    let mut history = Vec::with_capacity(entries.len());
    for (position, entry) in entries.iter().enumerate() {
        match parse_rating_event(entry) {
            Ok(event) => history.push(event),
            Err(reason) => warnings.push(
                MalformedRecord::new(
                    RecordKind::HistoryEntry,
                    position,
                    format!("user {user_id}: {reason}"),
                )
                .warn(),
            ),
        }
    }
    Some(history)
}

fn parse_rating_event(entry: &Literal) -> Result<RatingEvent, String> {
    if !matches!(entry, Literal::Dict(_)) {
        return Err("history entry is not an object".to_string());
    }

    let book_title = entry
        .get("book")
        .and_then(Literal::as_str)
        .filter(|title| !title.trim().is_empty())
        .ok_or_else(|| "missing book".to_string())?;

    let rating = entry
        .get("rating")
        .and_then(Literal::as_f64)
        .ok_or_else(|| "missing rating".to_string())?;
    if !rating.is_finite() || !(MIN_USER_RATING..=MAX_USER_RATING).contains(&rating) {
        return Err(format!("rating {rating} out of range"));
    }

    let text = |key: &str| {
        entry
            .get(key)
            .and_then(Literal::as_str)
            .unwrap_or_default()
            .to_string()
    };

    Ok(RatingEvent {
        book_title: book_title.to_string(),
        author: text("author"),
        genre: text("genre"),
        rating,
    })
}
