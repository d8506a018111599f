use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::IteratorRandom;

use serde::{Deserialize, Serialize};

use super::similarity::WordSimilarity;

/// Similarity given to successors too short to be worth scoring.
const SHORT_WORD_SCORE: f32 = -5.0;

/// Successors shorter than this (in characters) skip the similarity oracle.
const MIN_SCORED_WORD_LEN: usize = 4;

/// Represents a state in a word n-gram model.
///
/// A `State` is the set of every word observed right after one
/// (n-1)-word key. Conceptually, this is a node in a Markov chain whose
/// outgoing edges are all equally likely: duplicates collapse on insertion.
///
/// ## Invariants
/// - A state stored in a model always holds at least one successor
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct State {
	successors: BTreeSet<String>,
}

impl State {
	/// Records `word` as a successor. Returns `false` if it was already known.
	pub fn add_successor(&mut self, word: &str) -> bool {
		self.successors.insert(word.to_owned())
	}

	/// Number of distinct successors.
	pub fn len(&self) -> usize {
		self.successors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.successors.is_empty()
	}

	pub fn contains(&self, word: &str) -> bool {
		self.successors.contains(word)
	}

	/// Iterates successors in lexical order.
	pub fn successors(&self) -> impl Iterator<Item = &str> {
		self.successors.iter().map(String::as_str)
	}

	/// Picks the next word.
	///
	/// - A single successor is returned without touching the RNG.
	/// - With a `context` and a similarity oracle, the successor closest to the
	///   context wins; among equal scores the last one in iteration order is kept.
	/// - Otherwise the successor is drawn uniformly.
	///
	/// Returns `None` only for an empty state.
	pub fn predict<R: Rng + ?Sized>(
		&self,
		rng: &mut R,
		context: Option<&str>,
		similarity: Option<&dyn WordSimilarity>,
	) -> Option<&str> {
		if self.successors.len() == 1 {
			return self.successors().next();
		}

		match (context, similarity) {
			(Some(context), Some(similarity)) => self.closest(context, similarity),
			_ => self.successors().choose(rng),
		}
	}

	/// Returns the successor maximizing `similarity(context, word)`.
	fn closest(&self, context: &str, similarity: &dyn WordSimilarity) -> Option<&str> {
		self.successors()
			.map(|word| {
				let score = if word.chars().count() < MIN_SCORED_WORD_LEN {
					SHORT_WORD_SCORE
				} else {
					similarity.similarity(context, word)
				};
				(word, score)
			})
			.max_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(word, _)| word)
	}
}

impl<S: Into<String>> FromIterator<S> for State {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		Self { successors: iter.into_iter().map(Into::into).collect() }
	}
}
