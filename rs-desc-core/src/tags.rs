use rand::Rng;
use rand::seq::{IndexedRandom, IteratorRandom};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::resources::GenreTable;

/// Tags attached to a generated game.
///
/// - `genre`: the primary genre
/// - `context`: 1-2 genre-dependent tags, also usable as generation context
/// - `extra`: 0-2 display-only tags
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagSet {
	pub genre: String,
	pub context: Vec<String>,
	pub extra: Vec<String>,
}

/// Randomly selects a genre and its tags.
///
/// # Errors
/// `EmptyResource` if the genre table has no primary genre.
pub fn select_tags<R: Rng + ?Sized>(genres: &GenreTable, rng: &mut R) -> Result<TagSet> {
	let (genre, genre_tags) = genres.primary.iter().choose(rng).ok_or(Error::EmptyResource("genres"))?;

	let mut tags = TagSet {
		genre: genre.clone(),
		context: genre_tags.choose(rng).cloned().into_iter().collect(),
		extra: Vec::new(),
	};

	if rng.random::<f64>() <= 0.5 {
		tags.context.extend(genres.common.choose(rng).cloned());
	}

	let extras = match rng.random::<f64>() {
		r if r < 0.2 => 0,
		r if r < 0.72 => 1,
		_ => 2,
	};
	for _ in 0..extras {
		// with replacement
		tags.extra.extend(genres.other.choose(rng).cloned());
	}

	Ok(tags)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn table() -> GenreTable {
		let mut genres = GenreTable::default();
		genres.primary.insert("RPG".to_owned(), vec!["fantasy".to_owned(), "dungeon".to_owned()]);
		genres.primary.insert("Racing".to_owned(), vec!["cars".to_owned()]);
		genres.common = vec!["pixel art".to_owned()];
		genres.other = vec!["Indie".to_owned(), "Co-op".to_owned()];
		genres
	}

	#[test]
	fn tags_come_from_the_table() {
		let genres = table();
		let mut rng = StdRng::seed_from_u64(17);
		for _ in 0..100 {
			let tags = select_tags(&genres, &mut rng).unwrap();
			let primary = &genres.primary[&tags.genre];

			assert!((1..=2).contains(&tags.context.len()));
			assert!(primary.contains(&tags.context[0]));
			assert!(tags.context[1..].iter().all(|t| genres.common.contains(t)));
			assert!(tags.extra.len() <= 2);
			assert!(tags.extra.iter().all(|t| genres.other.contains(t)));
		}
	}

	#[test]
	fn empty_table_is_an_error() {
		let mut rng = StdRng::seed_from_u64(1);
		assert!(matches!(
			select_tags(&GenreTable::default(), &mut rng),
			Err(Error::EmptyResource("genres"))
		));
	}
}
