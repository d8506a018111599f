use std::fmt;

use log::{info, warn};
use serde::Serialize;

use super::ngram_model::NGramModel;
use crate::error::{Error, Result};
use crate::store::ModelStore;

/// Corpora shorter than this (in characters) are refused.
pub const MIN_CORPUS_LENGTH: usize = 100;

/// Default n-gram order for prose fields.
pub const DEFAULT_ORDER: usize = 3;

/// Trains a word n-gram model from a corpus and hands it to a model store.
///
/// A trainer is a one-shot batch job: build the table, log its statistics,
/// serialize it and save it under `name`. A storage failure is returned to the
/// caller; the model was still trained.
#[derive(Debug, Clone)]
pub struct Trainer {
	corpus: String,
	name: String,
	n: usize,
}

impl Trainer {
	pub fn new(corpus: impl Into<String>, name: &str, n: usize) -> Self {
		Self { corpus: corpus.into(), name: name.to_owned(), n }
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn n(&self) -> usize {
		self.n
	}

	/// Builds the model.
	///
	/// # Errors
	/// - `InsufficientData` if the corpus has fewer than `MIN_CORPUS_LENGTH`
	///   characters; checked before the corpus is tokenized
	/// - `MalformedCorpus` / `InvalidOrder` from [`NGramModel::from_corpus`]
	pub fn train(&self) -> Result<NGramModel> {
		let length = self.corpus.chars().count();
		if length < MIN_CORPUS_LENGTH {
			return Err(Error::InsufficientData { length, minimum: MIN_CORPUS_LENGTH });
		}
		NGramModel::from_corpus(&self.corpus, self.n)
	}

	/// Serializes `model`, logs its statistics and saves it in `store`.
	pub fn persist(&self, model: &NGramModel, store: &dyn ModelStore) -> Result<ModelStatistics> {
		let bytes = model.to_bytes()?;
		let statistics = ModelStatistics::compute(model, bytes.len());
		statistics.log(&self.name);

		store.save(&bytes, &self.name)?;
		Ok(statistics)
	}

	/// Trains the model and saves it; see [`Trainer::train`] and [`Trainer::persist`].
	pub fn run(&self, store: &dyn ModelStore) -> Result<ModelStatistics> {
		let model = self.train()?;
		self.persist(&model, store)
	}
}

/// Diagnostic figures about a trained model.
///
/// A high unit rate (share of keys with a single successor) means generated
/// text mostly replays the source verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelStatistics {
	pub keys: usize,
	pub median_degree: f64,
	pub unit_rate: f64,
	pub empty_keys: usize,
	pub size_bytes: usize,
}

impl ModelStatistics {
	pub fn compute(model: &NGramModel, size_bytes: usize) -> Self {
		let mut degrees: Vec<usize> = model.iter().map(|(_, state)| state.len()).collect();
		degrees.sort_unstable();

		let keys = degrees.len();
		let median_degree = match keys {
			0 => 0.0,
			k if k % 2 == 1 => degrees[k / 2] as f64,
			k => (degrees[k / 2 - 1] + degrees[k / 2]) as f64 / 2.0,
		};
		let units = degrees.iter().filter(|d| **d == 1).count();
		let unit_rate = if keys == 0 { 0.0 } else { units as f64 / keys as f64 };
		let empty_keys = degrees.iter().filter(|d| **d == 0).count();

		Self { keys, median_degree, unit_rate, empty_keys, size_bytes }
	}

	pub fn log(&self, name: &str) {
		info!("Model statistics for {}: {}", name, self);
		if self.empty_keys > 0 {
			warn!("Detected {} keys without successors in {}", self.empty_keys, name);
		}
	}
}

impl fmt::Display for ModelStatistics {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"total keys: {}, median degree: {}, unit ngram rate: {:.2}, size: {:.2}MB",
			self.keys,
			self.median_degree,
			self.unit_rate,
			self.size_bytes as f64 / 1e6
		)
	}
}
