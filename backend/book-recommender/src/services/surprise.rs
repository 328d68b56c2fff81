use crate::models::Book;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

pub const DEFAULT_SURPRISE_COUNT: usize = 3;

/// Up to `count` distinct books drawn uniformly from the catalog.
///
/// The random source is injected so runs can be reproduced with a seeded rng.
pub fn sample<'a, R>(books: &'a [Book], count: usize, rng: &mut R) -> Vec<&'a Book>
where
    R: Rng + ?Sized,
{
    let picks: Vec<&Book> = books.choose_multiple(rng, count).collect();
    debug!(
        requested = count,
        picked = picks.len(),
        catalog = books.len(),
        "Surprise sample drawn"
    );
    picks
}
