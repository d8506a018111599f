use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::state::State;
use crate::error::{Error, Result};

/// An (n-1)-word key, order-significant.
pub type Key = Vec<String>;

/// Represents a word n-gram model.
///
/// The `NGramModel` maps every (n-1)-word sequence seen in a corpus to the
/// set of words observed right after it.
///
/// # Responsibilities
/// - Build the table from a corpus in one linear pass
/// - Answer successor lookups for a key
/// - Provide uniformly random keys to (re)start a walk
/// - Round-trip through a compact binary encoding
///
/// # Invariants
/// - `n` is always >= 2
/// - Every key has exactly `n - 1` words
/// - Every state holds at least one successor
/// - The model is never empty
///
/// Ordered collections are used so that a walk driven by a seeded RNG is
/// reproducible across runs and processes.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(try_from = "RawModel")]
pub struct NGramModel {
	/// The order of the model (number of words in the n-gram)
	n: usize,

	/// Mapping from a key (length n-1) to its successors
	states: BTreeMap<Key, State>,

	/// Keys in table order, for O(1) random picks
	#[serde(skip)]
	keys: Vec<Key>,
}

/// Wire shape of a model, validated before it becomes an `NGramModel`.
#[derive(Deserialize)]
struct RawModel {
	n: usize,
	states: BTreeMap<Key, State>,
}

impl TryFrom<RawModel> for NGramModel {
	type Error = Error;

	fn try_from(raw: RawModel) -> Result<Self> {
		if raw.n < 2 {
			return Err(Error::InvalidOrder(raw.n));
		}
		if raw.states.is_empty() {
			return Err(Error::InvalidModel("model has no keys".to_owned()));
		}
		for (key, state) in &raw.states {
			if key.len() != raw.n - 1 {
				return Err(Error::InvalidModel(format!(
					"key {:?} has {} words, expected {}",
					key,
					key.len(),
					raw.n - 1
				)));
			}
			if state.is_empty() {
				return Err(Error::InvalidModel(format!("key {:?} has no successor", key)));
			}
		}
		Ok(Self::with_states(raw.n, raw.states))
	}
}

impl NGramModel {
	fn with_states(n: usize, states: BTreeMap<Key, State>) -> Self {
		let keys = states.keys().cloned().collect();
		Self { n, states, keys }
	}

	/// Builds a model of order `n` from a whitespace-separated corpus.
	///
	/// Every window of `n` consecutive tokens contributes its last token as a
	/// successor of the first `n - 1` tokens.
	///
	/// # Errors
	/// - `InvalidOrder` if `n < 2`
	/// - `MalformedCorpus` if the corpus has fewer than `n` tokens
	pub fn from_corpus(corpus: &str, n: usize) -> Result<Self> {
		if n < 2 {
			return Err(Error::InvalidOrder(n));
		}

		let tokens: Vec<&str> = corpus.split_whitespace().collect();
		if tokens.len() < n {
			return Err(Error::MalformedCorpus { received: tokens.len(), needed: n });
		}

		let mut states: BTreeMap<Key, State> = BTreeMap::new();
		for window in tokens.windows(n) {
			let (key, successor) = window.split_at(n - 1);
			let key: Key = key.iter().map(|word| (*word).to_owned()).collect();
			states.entry(key).or_default().add_successor(successor[0]);
		}

		Ok(Self::with_states(n, states))
	}

	/// Restores a model serialized with [`NGramModel::to_bytes`].
	///
	/// # Errors
	/// Returns an error if the bytes are not a valid model encoding or if the
	/// decoded table breaks the model invariants.
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		Ok(postcard::from_bytes(bytes)?)
	}

	/// Serializes the model with `postcard`.
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		Ok(postcard::to_stdvec(self)?)
	}

	/// Order of the model.
	pub fn n(&self) -> usize {
		self.n
	}

	/// Number of words in every key (`n - 1`).
	pub fn key_len(&self) -> usize {
		self.n - 1
	}

	/// Number of distinct keys.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	pub fn contains_key(&self, key: &[String]) -> bool {
		self.states.contains_key(key)
	}

	/// Successors of `key`, or `None` if the key was never observed.
	pub fn successors(&self, key: &[String]) -> Option<&State> {
		self.states.get(key)
	}

	/// Returns a uniformly random key.
	///
	/// Only `None` for an empty model, which construction rules out.
	pub fn random_key<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Key> {
		self.keys.choose(rng)
	}

	/// Iterates `(key, successors)` pairs in key order.
	pub fn iter(&self) -> impl Iterator<Item = (&[String], &State)> {
		self.states.iter().map(|(key, state)| (key.as_slice(), state))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::{BTreeMap, BTreeSet};

	fn as_table(model: &NGramModel) -> BTreeMap<Vec<String>, BTreeSet<String>> {
		model
			.iter()
			.map(|(key, state)| (key.to_vec(), state.successors().map(str::to_owned).collect()))
			.collect()
	}

	fn entry(key: &[&str], successors: &[&str]) -> (Vec<String>, BTreeSet<String>) {
		(
			key.iter().map(|w| (*w).to_owned()).collect(),
			successors.iter().map(|w| (*w).to_owned()).collect(),
		)
	}

	#[test]
	fn trains_one_key_per_window() {
		let model = NGramModel::from_corpus("I am not a Russian spy, cross my heart and hope to die", 3).unwrap();

		let expected: BTreeMap<_, _> = [
			entry(&["I", "am"], &["not"]),
			entry(&["am", "not"], &["a"]),
			entry(&["not", "a"], &["Russian"]),
			entry(&["a", "Russian"], &["spy,"]),
			entry(&["Russian", "spy,"], &["cross"]),
			entry(&["spy,", "cross"], &["my"]),
			entry(&["cross", "my"], &["heart"]),
			entry(&["my", "heart"], &["and"]),
			entry(&["heart", "and"], &["hope"]),
			entry(&["and", "hope"], &["to"]),
			entry(&["hope", "to"], &["die"]),
		]
		.into_iter()
		.collect();

		assert_eq!(model.len(), 11);
		assert_eq!(as_table(&model), expected);
	}

	#[test]
	fn duplicate_successors_are_merged() {
		let model = NGramModel::from_corpus("almost too hot, almost too cold. almost too hot,", 3).unwrap();

		let expected: BTreeMap<_, _> = [
			entry(&["almost", "too"], &["hot,", "cold."]),
			entry(&["too", "hot,"], &["almost"]),
			entry(&["hot,", "almost"], &["too"]),
			entry(&["too", "cold."], &["almost"]),
			entry(&["cold.", "almost"], &["too"]),
		]
		.into_iter()
		.collect();

		assert_eq!(as_table(&model), expected);
	}

	#[test]
	fn too_few_tokens_is_malformed() {
		match NGramModel::from_corpus("just two", 3) {
			Err(Error::MalformedCorpus { received, needed }) => {
				assert_eq!(received, 2);
				assert_eq!(needed, 3);
			}
			other => panic!("unexpected result: {:?}", other),
		}
	}

	#[test]
	fn exactly_n_tokens_gives_one_key() {
		let model = NGramModel::from_corpus("one two three", 3).unwrap();
		assert_eq!(model.len(), 1);
		assert!(model.contains_key(&["one".to_owned(), "two".to_owned()]));
	}

	#[test]
	fn order_below_two_is_rejected() {
		assert!(matches!(NGramModel::from_corpus("a b c", 1), Err(Error::InvalidOrder(1))));
	}

	#[test]
	fn bytes_round_trip() {
		let model = NGramModel::from_corpus("almost too hot, almost too cold. almost too hot,", 3).unwrap();
		let restored = NGramModel::from_bytes(&model.to_bytes().unwrap()).unwrap();
		assert_eq!(restored, model);
		assert_eq!(restored.key_len(), 2);
	}

	#[test]
	fn decoding_rejects_wrong_key_arity() {
		#[derive(Serialize)]
		struct Forged {
			n: usize,
			states: BTreeMap<Key, State>,
		}
		let mut states = BTreeMap::new();
		states.insert(vec!["lonely".to_owned()], ["word"].into_iter().collect::<State>());
		let bytes = postcard::to_stdvec(&Forged { n: 3, states }).unwrap();

		assert!(NGramModel::from_bytes(&bytes).is_err());
	}
}
