use std::sync::Arc;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::generation_input::GenerationInput;
use crate::model::generator::Generator;
use crate::model::ngram_model::NGramModel;
use crate::model::similarity::{TrigramSimilarity, WordSimilarity};
use crate::pipeline::{DESCRIPTION_MODEL, FEATURE_MODEL, TAGLINE_MODEL, TITLE_MODEL, requirement_model_name};
use crate::resources::Resources;
use crate::sampling::{abs_gauss, ceil_size, floor_size};
use crate::store::ModelStore;
use crate::tags::{TagSet, select_tags};
use crate::template::render_name;
use crate::text::title_case;

/// Upper bound on the length of a feature bullet, in words.
const MAX_FEATURE_SIZE: usize = 22;

/// Which optional system requirement lines to include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SystemRequirementsConfig {
	pub sound_card: bool,
	pub additional_notes: bool,
}

/// Shape of one generated description.
///
/// A description has main paragraphs plus either a list of features or
/// headed subsections, never both and never neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DescriptionConfig {
	pub num_paragraphs: usize,
	pub num_features: usize,
	pub num_subsections: usize,
	pub tagline: bool,
	pub system_requirements: SystemRequirementsConfig,
}

impl DescriptionConfig {
	/// Draws a random configuration.
	///
	/// - 1-2 paragraphs
	/// - half of the time 2-5 features, otherwise 1-2 subsections
	/// - a tagline half of the time
	/// - sound card and additional notes lines a quarter of the time each
	pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
		let num_features = if rng.random_bool(0.5) { rng.random_range(2..=5) } else { 0 };
		let num_subsections = if num_features == 0 { rng.random_range(1..=2) } else { 0 };

		Self {
			num_paragraphs: rng.random_range(1..=2),
			num_features,
			num_subsections,
			tagline: rng.random_bool(0.5),
			system_requirements: SystemRequirementsConfig {
				sound_card: rng.random::<f64>() > 0.75,
				additional_notes: rng.random::<f64>() > 0.75,
			},
		}
	}
}

/// A titled block of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
	pub title: String,
	pub content: String,
}

/// One line of the system requirements table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
	pub name: String,
	pub value: String,
}

/// A generated store page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameDescription {
	/// Main section first (titled with the game title), then subsections
	pub description: Vec<Section>,
	pub features: Vec<String>,
	/// Empty when the configuration has no tagline
	pub tagline: String,
	pub tags: TagSet,
	pub developer: String,
	pub system_requirements: Vec<Requirement>,
	pub screenshot: Option<String>,
}

/// Library-level options of the composer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComposerConfig {
	/// Bias description words toward the genre / section header.
	pub semantic_context: bool,
	/// Seed every RNG for reproducible output.
	pub seed: Option<u64>,
}

/// Size of a field: `|N(mean, std_dev)|`, optionally capped.
#[derive(Debug, Clone, Copy)]
struct SizeDistribution {
	mean: f64,
	std_dev: f64,
	cap: Option<f64>,
}

impl SizeDistribution {
	const fn new(mean: f64, std_dev: f64) -> Self {
		Self { mean, std_dev, cap: None }
	}

	const fn capped(mean: f64, std_dev: f64, cap: f64) -> Self {
		Self { mean, std_dev, cap: Some(cap) }
	}

	fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
		let size = abs_gauss(rng, self.mean, self.std_dev);
		match self.cap {
			Some(cap) => size.min(cap),
			None => size,
		}
	}
}

const PARAGRAPH_SIZE: SizeDistribution = SizeDistribution::new(15.0, 3.0);
const FEATURE_SIZE: SizeDistribution = SizeDistribution::new(12.0, 4.0);

/// Requirement rows: display name, size, whether to avoid a dangling word.
const OS_ROW: (&str, SizeDistribution, bool) = ("OS", SizeDistribution::new(4.0, 2.0), false);
const PROCESSOR_ROW: (&str, SizeDistribution, bool) = ("Processor", SizeDistribution::new(9.0, 4.0), false);
const MEMORY_ROW: (&str, SizeDistribution, bool) = ("Memory", SizeDistribution::capped(5.0, 4.0, 10.0), false);
const GRAPHICS_ROW: (&str, SizeDistribution, bool) = ("Graphics", SizeDistribution::capped(9.0, 4.0, 20.0), false);
const STORAGE_ROW: (&str, SizeDistribution, bool) = ("Storage", SizeDistribution::new(4.0, 2.0), false);
const SOUND_CARD_ROW: (&str, SizeDistribution, bool) = ("Sound Card", SizeDistribution::new(4.0, 2.0), false);
const ADDITIONAL_NOTES_ROW: (&str, SizeDistribution, bool) = ("Additional Notes", SizeDistribution::new(9.0, 4.0), true);

/// One generator per requirement category.
struct RequirementGenerators {
	os: Generator,
	processor: Generator,
	memory: Generator,
	graphics: Generator,
	storage: Generator,
	sound_card: Generator,
	additional_notes: Generator,
}

/// One generator per generated field.
struct FieldGenerators {
	description: Generator,
	title: Generator,
	feature: Generator,
	tagline: Generator,
	requirements: RequirementGenerators,
}

/// Assembles complete `GameDescription`s from per-field generators, the
/// developer-name templates and the tag table.
///
/// The composer owns mutable generator cursors: one caller at a time.
pub struct DescriptionComposer {
	generators: FieldGenerators,
	resources: Resources,
	semantic_context: bool,
	rng: StdRng,
}

impl DescriptionComposer {
	/// Loads every field model from `store`.
	///
	/// # Errors
	/// `ModelNotFound` (or a decoding error) if any field model is missing or
	/// invalid; the composer is all-or-nothing.
	pub fn load(store: &dyn ModelStore, resources: Resources, config: ComposerConfig) -> Result<Self> {
		let mut rng = match config.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_rng(&mut rand::rng()),
		};

		let mut load = |name: &str| -> Result<Generator> {
			let model = Arc::new(NGramModel::from_bytes(&store.load(name)?)?);
			info!("Loaded model {} ({} keys, n = {})", name, model.len(), model.n());
			Ok(Generator::seeded(model, Some(name), rng.random()))
		};

		let mut description = load(DESCRIPTION_MODEL)?;
		if config.semantic_context {
			info!("Semantic context enabled for description generation.");
			let similarity: Arc<dyn WordSimilarity> = Arc::new(TrigramSimilarity);
			description = description.with_similarity(similarity);
		}

		let generators = FieldGenerators {
			description,
			title: load(TITLE_MODEL)?,
			feature: load(FEATURE_MODEL)?,
			tagline: load(TAGLINE_MODEL)?,
			requirements: RequirementGenerators {
				os: load(&requirement_model_name(OS_ROW.0))?,
				processor: load(&requirement_model_name(PROCESSOR_ROW.0))?,
				memory: load(&requirement_model_name(MEMORY_ROW.0))?,
				graphics: load(&requirement_model_name(GRAPHICS_ROW.0))?,
				storage: load(&requirement_model_name(STORAGE_ROW.0))?,
				sound_card: load(&requirement_model_name(SOUND_CARD_ROW.0))?,
				additional_notes: load(&requirement_model_name(ADDITIONAL_NOTES_ROW.0))?,
			},
		};

		Ok(Self { generators, resources, semantic_context: config.semantic_context, rng })
	}

	/// Generates a description with a fresh random configuration.
	pub fn compose(&mut self) -> Result<GameDescription> {
		let config = DescriptionConfig::random(&mut self.rng);
		self.compose_with(&config)
	}

	/// Generates a description following `config`.
	///
	/// # Errors
	/// `EmptyResource` when a seed pool, the genre table or the developer
	/// templates are empty; `UnknownTag` from developer-name rendering.
	pub fn compose_with(&mut self, config: &DescriptionConfig) -> Result<GameDescription> {
		debug!("Description config: {:?}", config);
		let tags = select_tags(&self.resources.genres, &mut self.rng)?;

		let title = self.title();

		let mut paragraphs = Vec::with_capacity(config.num_paragraphs);
		for _ in 0..config.num_paragraphs {
			let size = floor_size(PARAGRAPH_SIZE.sample(&mut self.rng));
			let seed = self.resources.seeds.text.choose(&mut self.rng).ok_or(Error::EmptyResource("seeds.text"))?;
			let context = self.semantic_context.then_some(tags.genre.as_str());
			paragraphs.push(
				self.generators
					.description
					.generate(GenerationInput::sized(size).with_seed(seed).complete_sentence().with_context(context)),
			);
		}

		let mut description = vec![Section { title, content: paragraphs.join("\n\n") }];
		for _ in 0..config.num_subsections {
			description.push(self.subsection()?);
		}

		let mut features = Vec::with_capacity(config.num_features);
		for _ in 0..config.num_features {
			let size = floor_size(FEATURE_SIZE.sample(&mut self.rng)).min(MAX_FEATURE_SIZE);
			features.push(self.generators.feature.generate(GenerationInput::sized(size).complete_sentence()));
		}

		let tagline = if config.tagline {
			self.generators.tagline.generate(GenerationInput::sized(4).complete_sentence())
		} else {
			String::new()
		};

		let system_requirements = self.system_requirements(&config.system_requirements);

		let template = self
			.resources
			.developer_templates
			.choose(&mut self.rng)
			.ok_or(Error::EmptyResource("developers"))?;
		let developer = render_name(template, &self.resources.pos, &mut self.rng)?;

		let screenshot = self.resources.screenshots.choose(&mut self.rng).cloned();

		Ok(GameDescription {
			description,
			features,
			tagline,
			tags,
			developer,
			system_requirements,
			screenshot,
		})
	}

	/// 1-4 words, never ending on a function word, in "Title: Subtitle" style.
	fn title(&mut self) -> String {
		let size = self.rng.random_range(1..=4);
		let title = self.generators.title.generate(GenerationInput::sized(size).continue_until_valid());
		title_case(title.trim_end_matches('.')).replace('.', ":")
	}

	/// A header drawn from the header seeds, then a paragraph starting on a
	/// fresh sentence.
	fn subsection(&mut self) -> Result<Section> {
		let seed = self
			.resources
			.seeds
			.headers
			.choose(&mut self.rng)
			.ok_or(Error::EmptyResource("seeds.headers"))?;
		let header = self
			.generators
			.description
			.generate(GenerationInput::sized(3).with_seed(seed).continue_until_valid());
		let header = title_case(header.trim_end_matches('.'));

		self.generators.description.fast_forward_to_sentence_boundary();

		let size = floor_size(PARAGRAPH_SIZE.sample(&mut self.rng));
		let context = self.semantic_context.then_some(header.as_str());
		let content = self
			.generators
			.description
			.generate(GenerationInput::sized(size).complete_sentence().with_context(context));

		Ok(Section { title: header, content })
	}

	fn system_requirements(&mut self, config: &SystemRequirementsConfig) -> Vec<Requirement> {
		let rng = &mut self.rng;
		let generators = &mut self.generators.requirements;

		let mut rows = vec![
			requirement(&mut generators.os, OS_ROW, rng),
			requirement(&mut generators.processor, PROCESSOR_ROW, rng),
			requirement(&mut generators.memory, MEMORY_ROW, rng),
			requirement(&mut generators.graphics, GRAPHICS_ROW, rng),
			requirement(&mut generators.storage, STORAGE_ROW, rng),
		];
		if config.sound_card {
			rows.push(requirement(&mut generators.sound_card, SOUND_CARD_ROW, rng));
		}
		if config.additional_notes {
			rows.push(requirement(&mut generators.additional_notes, ADDITIONAL_NOTES_ROW, rng));
		}
		rows
	}
}

fn requirement<R: Rng + ?Sized>(
	generator: &mut Generator,
	(name, size, continue_until_valid): (&str, SizeDistribution, bool),
	rng: &mut R,
) -> Requirement {
	let mut input = GenerationInput::sized(ceil_size(size.sample(rng)));
	input.continue_until_valid = continue_until_valid;
	Requirement { name: name.to_owned(), value: generator.generate(input) }
}
