use std::path::PathBuf;

use rs_desc_core::description::{DescriptionConfig, SystemRequirementsConfig};
use rs_desc_core::model::ngram_model::NGramModel;
use rs_desc_core::pipeline::{self, TrainingOutcome};
use rs_desc_core::resources::Resources;
use rs_desc_core::{ComposerConfig, DescriptionComposer, DirectoryStore, Error, MemoryStore, ModelStore};

fn data_dir() -> PathBuf {
	PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../data")
}

fn trained_store() -> MemoryStore {
	let store = MemoryStore::default();
	pipeline::run(data_dir(), &store).unwrap();
	store
}

#[test]
fn pipeline_trains_every_field_model() {
	let dir = tempfile::tempdir().unwrap();
	let store = DirectoryStore::new(dir.path().join("models"));

	let report = pipeline::run(data_dir(), &store).unwrap();

	let expected = [
		"description",
		"feature",
		"requirements_Additional_Notes",
		"requirements_Graphics",
		"requirements_Memory",
		"requirements_OS",
		"requirements_Processor",
		"requirements_Sound_Card",
		"requirements_Storage",
		"tagline",
		"title",
	];
	let stored = store.list().unwrap();
	for name in expected {
		assert!(stored.iter().any(|s| s == name), "missing model {name}");
	}
	// a single short DirectX line cannot train a model
	assert!(matches!(report.outcomes["requirements_DirectX"], TrainingOutcome::Skipped(_)));
	assert!(!stored.iter().any(|s| s == "requirements_DirectX"));
}

#[test]
fn every_seed_starts_from_a_known_key() {
	let store = trained_store();
	let model = NGramModel::from_bytes(&store.load(pipeline::DESCRIPTION_MODEL).unwrap()).unwrap();
	let seeds = Resources::load(data_dir()).unwrap().seeds;

	for seed in seeds.text.iter().chain(&seeds.headers) {
		let tokens: Vec<String> = seed.split_whitespace().map(str::to_owned).collect();
		assert!(tokens.len() >= model.key_len(), "seed {seed:?} is shorter than a key");
		assert!(
			model.contains_key(&tokens[tokens.len() - model.key_len()..]),
			"seed {seed:?} does not end on a key of the description model"
		);
	}
}

#[test]
fn composed_page_has_every_part() {
	let store = trained_store();
	let resources = Resources::load(data_dir()).unwrap();
	let mut composer = DescriptionComposer::load(&store, resources, ComposerConfig::default()).unwrap();

	for _ in 0..20 {
		let page = composer.compose().unwrap();

		assert!(!page.description.is_empty());
		assert!(!page.description[0].title.is_empty());
		assert!(!page.description[0].content.is_empty());
		assert!(!page.developer.is_empty());
		assert!(page.screenshot.is_some());

		let names: Vec<&str> = page.system_requirements.iter().map(|r| r.name.as_str()).collect();
		assert_eq!(names[..5], ["OS", "Processor", "Memory", "Graphics", "Storage"]);
		assert!(names.len() <= 7);

		serde_json::to_string(&page).unwrap();
	}
}

#[test]
fn configuration_is_followed() {
	let store = trained_store();
	let resources = Resources::load(data_dir()).unwrap();
	let config = ComposerConfig { semantic_context: true, seed: Some(7) };
	let mut composer = DescriptionComposer::load(&store, resources, config).unwrap();

	let page = composer
		.compose_with(&DescriptionConfig {
			num_paragraphs: 2,
			num_features: 0,
			num_subsections: 2,
			tagline: false,
			system_requirements: SystemRequirementsConfig { sound_card: true, additional_notes: true },
		})
		.unwrap();

	assert_eq!(page.description.len(), 3);
	assert_eq!(page.description[0].content.split("\n\n").count(), 2);
	assert!(page.features.is_empty());
	assert!(page.tagline.is_empty());
	let names: Vec<&str> = page.system_requirements.iter().map(|r| r.name.as_str()).collect();
	assert_eq!(names, ["OS", "Processor", "Memory", "Graphics", "Storage", "Sound Card", "Additional Notes"]);

	let page = composer
		.compose_with(&DescriptionConfig {
			num_paragraphs: 1,
			num_features: 4,
			num_subsections: 0,
			tagline: true,
			system_requirements: SystemRequirementsConfig { sound_card: false, additional_notes: false },
		})
		.unwrap();

	assert_eq!(page.description.len(), 1);
	assert_eq!(page.features.len(), 4);
	assert!(!page.tagline.is_empty());
	assert_eq!(page.system_requirements.len(), 5);
}

#[test]
fn seeded_composers_agree() {
	let store = trained_store();
	let config = ComposerConfig { semantic_context: false, seed: Some(42) };

	let mut first = DescriptionComposer::load(&store, Resources::load(data_dir()).unwrap(), config).unwrap();
	let mut second = DescriptionComposer::load(&store, Resources::load(data_dir()).unwrap(), config).unwrap();

	assert_eq!(first.compose().unwrap(), second.compose().unwrap());
}

#[test]
fn missing_model_prevents_loading() {
	let store = MemoryStore::default();
	let resources = Resources::load(data_dir()).unwrap();
	assert!(matches!(
		DescriptionComposer::load(&store, resources, ComposerConfig::default()),
		Err(Error::ModelNotFound(_))
	));
}
