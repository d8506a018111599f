use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by training, name rendering, resource loading and model storage.
///
/// A key missing from a model during generation is not an error: the
/// generator logs it and reseeds (see `Generator::draw_next_word`).
#[derive(Debug, Error)]
pub enum Error {
	/// The raw corpus is too short (in characters) to be worth training on.
	#[error("Cannot train a model with source data of length {length} < {minimum}")]
	InsufficientData { length: usize, minimum: usize },

	/// The corpus does not contain enough tokens to form a single n-gram.
	#[error("Not enough words to split; received {received}, need {needed}")]
	MalformedCorpus { received: usize, needed: usize },

	/// The n-gram order must be at least 2.
	#[error("n must be >= 2, got {0}")]
	InvalidOrder(usize),

	/// A deserialized model breaks the model invariants.
	#[error("Invalid model: {0}")]
	InvalidModel(String),

	/// A `{{TAG}}` template refers to a tag absent from the POS dictionary.
	#[error("Unknown part-of-speech tag: {0}")]
	UnknownTag(String),

	/// A resource pool required for composition is empty.
	#[error("Resource '{0}' is empty")]
	EmptyResource(&'static str),

	/// The store has no model with this name.
	#[error("Model '{0}' not found")]
	ModelNotFound(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Serialization(#[from] postcard::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}
