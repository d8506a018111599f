use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use log::{error, info};
use serde::Serialize;

use crate::corpus::{self, SourceDocument};
use crate::error::{Error, Result};
use crate::io;
use crate::model::ngram_model::NGramModel;
use crate::model::trainer::{DEFAULT_ORDER, ModelStatistics, Trainer};
use crate::store::ModelStore;

/// Folder of JSON source documents inside the data folder.
pub const SOURCES_DIR: &str = "sources";
pub const TITLES_FILE: &str = "titles.txt";
pub const FEATURES_FILE: &str = "features.txt";
pub const TAGLINES_FILE: &str = "taglines.txt";

/// Titles are short: a bigram model keeps them varied.
pub const TITLE_ORDER: usize = 2;

pub const DESCRIPTION_MODEL: &str = "description";
pub const TITLE_MODEL: &str = "title";
pub const FEATURE_MODEL: &str = "feature";
pub const TAGLINE_MODEL: &str = "tagline";

/// Store name of the model trained on a requirement category.
///
/// `"Sound Card"` → `"requirements_Sound_Card"`
pub fn requirement_model_name(category: &str) -> String {
	format!("requirements_{}", category.replace(' ', "_"))
}

/// What happened to one model of a training run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TrainingOutcome {
	Stored(ModelStatistics),
	/// The corpus was unusable; the previously stored model (if any) is kept.
	Skipped(String),
}

/// Per-model outcome of a training run, by model name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrainingReport {
	pub outcomes: BTreeMap<String, TrainingOutcome>,
}

impl TrainingReport {
	pub fn stored(&self) -> impl Iterator<Item = &str> {
		self.outcomes
			.iter()
			.filter(|(_, outcome)| matches!(outcome, TrainingOutcome::Stored(_)))
			.map(|(name, _)| name.as_str())
	}

	pub fn skipped(&self) -> impl Iterator<Item = (&str, &str)> {
		self.outcomes.iter().filter_map(|(name, outcome)| match outcome {
			TrainingOutcome::Skipped(reason) => Some((name.as_str(), reason.as_str())),
			TrainingOutcome::Stored(_) => None,
		})
	}
}

impl fmt::Display for TrainingReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (name, outcome) in &self.outcomes {
			match outcome {
				TrainingOutcome::Stored(statistics) => writeln!(f, "{}: {}", name, statistics)?,
				TrainingOutcome::Skipped(reason) => writeln!(f, "{}: skipped ({})", name, reason)?,
			}
		}
		Ok(())
	}
}

/// Builds one trainer per generated field from a data folder.
///
/// # Layout
/// - `sources/*.json`: source documents (descriptions and requirements)
/// - `titles.txt`, `features.txt`, `taglines.txt`: plain-text corpora
pub fn collect_trainers<P: AsRef<Path>>(data_folder: P) -> Result<Vec<Trainer>> {
	let data_folder = io::normalize_folder(data_folder);
	let documents = corpus::load_source_documents(data_folder.join(SOURCES_DIR))?;

	let mut trainers = vec![
		Trainer::new(corpus::description_corpus(&documents), DESCRIPTION_MODEL, DEFAULT_ORDER),
		Trainer::new(io::read_text(data_folder.join(TITLES_FILE))?, TITLE_MODEL, TITLE_ORDER),
		Trainer::new(io::read_text(data_folder.join(FEATURES_FILE))?, FEATURE_MODEL, DEFAULT_ORDER),
		Trainer::new(io::read_text(data_folder.join(TAGLINES_FILE))?, TAGLINE_MODEL, DEFAULT_ORDER),
	];
	trainers.extend(requirement_trainers(&documents));

	Ok(trainers)
}

/// One trainer per merged requirement category.
pub fn requirement_trainers(documents: &[SourceDocument]) -> Vec<Trainer> {
	corpus::merge_requirements(documents)
		.into_iter()
		.map(|(category, lines)| Trainer::new(lines.join(" "), &requirement_model_name(&category), DEFAULT_ORDER))
		.collect()
}

/// Trains every model in parallel and saves the results.
///
/// # Behavior
/// - Trainers are split into one batch per CPU, each batch trained by its
///   own thread; results are collected through a channel
/// - Models are saved sequentially, in name order
/// - A corpus that is too short or malformed only skips its own model
///
/// # Errors
/// Any other error (serialization, storage) aborts the run.
pub fn train_all(trainers: Vec<Trainer>, store: &dyn ModelStore) -> Result<TrainingReport> {
	if trainers.is_empty() {
		return Ok(TrainingReport::default());
	}

	let chunk_size = trainers.len().div_ceil(num_cpus::get().max(1));

	let (tx, rx) = mpsc::channel::<(Trainer, Result<NGramModel>)>();
	for chunk in trainers.chunks(chunk_size) {
		let tx = tx.clone();
		let chunk: Vec<Trainer> = chunk.to_vec();

		thread::spawn(move || {
			for trainer in chunk {
				let model = trainer.train();
				tx.send((trainer, model)).expect("Failed to send from thread");
			}
		});
	}
	drop(tx);

	let mut results: Vec<(Trainer, Result<NGramModel>)> = rx.iter().collect();
	results.sort_by(|a, b| a.0.name().cmp(b.0.name()));

	let mut report = TrainingReport::default();
	for (trainer, model) in results {
		let outcome = match model {
			Ok(model) => TrainingOutcome::Stored(trainer.persist(&model, store)?),
			Err(e @ (Error::InsufficientData { .. } | Error::MalformedCorpus { .. } | Error::InvalidOrder(_))) => {
				error!("Skipping model {}: {}", trainer.name(), e);
				TrainingOutcome::Skipped(e.to_string())
			}
			Err(e) => return Err(e),
		};
		report.outcomes.insert(trainer.name().to_owned(), outcome);
	}

	Ok(report)
}

/// Trains every model of a data folder into `store`.
///
/// Existing models with the same names are overwritten.
pub fn run<P: AsRef<Path>>(data_folder: P, store: &dyn ModelStore) -> Result<TrainingReport> {
	info!("Collecting training corpora from {}", data_folder.as_ref().display());
	let trainers = collect_trainers(data_folder)?;

	info!("Training {} models", trainers.len());
	let report = train_all(trainers, store)?;
	info!("Stored {} models, skipped {}", report.stored().count(), report.skipped().count());

	Ok(report)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::store::MemoryStore;

	const PROSE: &str = "Explore a vast world full of danger. Fight the dragons of the north and build \
		your castle. Explore the caves and fight the goblins. Build a fleet and explore the sea.";

	#[test]
	fn model_names_follow_categories() {
		assert_eq!(requirement_model_name("Sound Card"), "requirements_Sound_Card");
		assert_eq!(requirement_model_name("OS"), "requirements_OS");
	}

	#[test]
	fn short_corpora_are_skipped_not_fatal() {
		let store = MemoryStore::default();
		let trainers = vec![
			Trainer::new(PROSE, DESCRIPTION_MODEL, 3),
			Trainer::new("too short", TAGLINE_MODEL, 3),
			Trainer::new(PROSE, TITLE_MODEL, 2),
		];

		let report = train_all(trainers, &store).unwrap();

		assert_eq!(report.stored().collect::<Vec<_>>(), vec![DESCRIPTION_MODEL, TITLE_MODEL]);
		assert_eq!(report.skipped().map(|(name, _)| name).collect::<Vec<_>>(), vec![TAGLINE_MODEL]);
		assert_eq!(store.list().unwrap(), vec![DESCRIPTION_MODEL, TITLE_MODEL]);
	}

	#[test]
	fn stored_models_match_their_order() {
		let store = MemoryStore::default();
		train_all(vec![Trainer::new(PROSE, TITLE_MODEL, TITLE_ORDER)], &store).unwrap();

		let model = NGramModel::from_bytes(&store.load(TITLE_MODEL).unwrap()).unwrap();
		assert_eq!(model.n(), TITLE_ORDER);
	}
}
