use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::generation_input::{DEFAULT_TEXT_LENGTH, GenerationInput};
use super::ngram_model::{Key, NGramModel};
use super::similarity::WordSimilarity;
use crate::text::capitalize_first;

/// Word endings that close a sentence.
const TERMINAL_PUNCTUATION: [&str; 5] = [".", "!", "?", "...", "…"];

/// Words that end a completed sentence early; the word itself is dropped.
const CONJUNCTIONS: [&str; 3] = ["and", "for", "but"];

/// Words a text should not end on.
const STOP_WORDS: [&str; 11] = ["as", "a", "is", "of", "or", "the", "and", "under", "over", "your", "with"];

/// Literal replacements applied, in order, to the joined text.
const REPLACEMENTS: [(&str, &str); 16] = [
	(",.", "."),
	(" .", "."),
	("(", ""),
	(")", ""),
	("\"", ""),
	("“", ""),
	("”", ""),
	("•", ""),
	("●", ""),
	("▼", ""),
	("■", ""),
	("⭐", ""),
	("★", ""),
	("*", ""),
	("®", ""),
	("—", ""),
];

/// Characters stripped from both ends of a cleaned text.
const TRIM_CHARS: [char; 6] = [',', ';', ':', '-', '*', ' '];

/// Upper bound on draws while looking for a sentence boundary or a word
/// that is not a stop word.
const MAX_EXTRA_DRAWS: usize = 10_000;

/// Walks a trained `NGramModel` to produce text.
///
/// A generator owns a cursor (the current key) and its own RNG; the model is
/// shared read-only, so any number of generators can run on the same model
/// in parallel. A single generator is driven through `&mut self`.
///
/// # Responsibilities
/// - Draw successor words and advance the cursor
/// - Recover from keys the model does not know by reseeding
/// - Assemble texts of a minimum size, optionally completing the sentence
/// - Normalize the resulting text
pub struct Generator {
	model: Arc<NGramModel>,
	name: Option<String>,
	key: Key,
	rng: StdRng,
	similarity: Option<Arc<dyn WordSimilarity>>,
	reseeds: usize,
}

impl fmt::Debug for Generator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Generator")
			.field("name", &self.name)
			.field("key", &self.key)
			.field("model_keys", &self.model.len())
			.field("similarity", &self.similarity.is_some())
			.field("reseeds", &self.reseeds)
			.finish()
	}
}

impl Generator {
	/// Creates a generator positioned on a random key of `model`.
	pub fn new(model: Arc<NGramModel>, name: Option<&str>) -> Self {
		Self::from_rng(model, name, StdRng::from_rng(&mut rand::rng()))
	}

	/// Same as [`Generator::new`] with a deterministic RNG.
	pub fn seeded(model: Arc<NGramModel>, name: Option<&str>, seed: u64) -> Self {
		Self::from_rng(model, name, StdRng::seed_from_u64(seed))
	}

	fn from_rng(model: Arc<NGramModel>, name: Option<&str>, mut rng: StdRng) -> Self {
		let key = model.random_key(&mut rng).cloned().unwrap_or_default();
		Self {
			model,
			name: name.map(str::to_owned),
			key,
			rng,
			similarity: None,
			reseeds: 0,
		}
	}

	/// Enables context-biased successor selection.
	pub fn with_similarity(mut self, similarity: Arc<dyn WordSimilarity>) -> Self {
		self.similarity = Some(similarity);
		self
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub fn model(&self) -> &NGramModel {
		&self.model
	}

	/// The key the next draw will look up.
	pub fn current_key(&self) -> &[String] {
		&self.key
	}

	/// How many times the cursor fell off the model and was reseeded.
	///
	/// A steadily growing count on a healthy model hints at a training bug.
	pub fn reseed_count(&self) -> usize {
		self.reseeds
	}

	fn label(&self) -> &str {
		self.name.as_deref().unwrap_or("<unnamed>")
	}

	fn reseed(&mut self) {
		if let Some(key) = self.model.random_key(&mut self.rng) {
			self.key = key.clone();
		}
		self.reseeds += 1;
	}

	/// Draws the successor of the current key and advances the cursor.
	///
	/// # Behavior
	/// - A key unknown to the model is logged and replaced by a random key
	///   before the lookup is retried; this never fails.
	/// - With a `context`, ties between several successors are broken by the
	///   similarity oracle (if any).
	/// - The cursor becomes `key[1..] + [word]`; if the model does not know that
	///   key, the cursor is reseeded right away so the next draw starts from a
	///   valid state.
	pub fn draw_next_word(&mut self, context: Option<&str>) -> String {
		let model = Arc::clone(&self.model);

		let state = loop {
			if let Some(state) = model.successors(&self.key) {
				break state;
			}
			warn!("No successor for {:?}. Model: {}. Choosing a new seed.", self.key, self.label());
			self.reseed();
		};

		let word = state
			.predict(&mut self.rng, context, self.similarity.as_deref())
			.unwrap_or_default()
			.to_owned();

		if !self.key.is_empty() {
			self.key.remove(0);
		}
		self.key.push(word.clone());

		if !model.contains_key(&self.key) {
			warn!("Key {:?} not found in model {}. Choosing a new seed.", self.key, self.label());
			self.reseed();
		}

		word
	}

	/// Generates a text from the model.
	///
	/// See [`GenerationInput`] for the meaning of each option. The raw words
	/// are passed through [`Generator::cleanup`] before being returned.
	pub fn generate(&mut self, input: GenerationInput<'_>) -> String {
		let mut size = input.size;
		if size == 0 {
			warn!("Cannot create text with length {}, defaulting to {}", size, DEFAULT_TEXT_LENGTH);
			size = DEFAULT_TEXT_LENGTH;
		}

		let mut words: Vec<String> = Vec::with_capacity(size + 8);

		if let Some(seed) = input.seed {
			self.adopt_seed(seed, &mut words);
		}

		while words.len() < size {
			let word = self.draw_next_word(input.context);
			words.push(word);
		}

		if input.complete_sentence {
			self.complete_sentence(&mut words);
		}

		if input.continue_until_valid {
			self.continue_until_valid(&mut words);
		}

		Self::cleanup(&words)
	}

	/// Moves the cursor to the seed's trailing key and copies the seed to
	/// `words`, if the model knows that key. Unknown seeds are ignored.
	fn adopt_seed(&mut self, seed: &str, words: &mut Vec<String>) {
		let tokens: Vec<&str> = seed.split_whitespace().collect();
		let key_len = self.model.key_len();
		if tokens.len() < key_len {
			debug!("Seed {:?} shorter than the key length of model {}", seed, self.label());
			return;
		}

		let key: Key = tokens[tokens.len() - key_len..].iter().map(|t| (*t).to_owned()).collect();
		if self.model.contains_key(&key) {
			self.key = key;
			words.extend(tokens.iter().map(|t| (*t).to_owned()));
		} else {
			debug!("Seed {:?} not in model {}, ignored", seed, self.label());
		}
	}

	/// Keeps drawing until a word closes the sentence.
	///
	/// A conjunction is not kept: the previous word gets a period instead.
	/// Without a boundary after `MAX_EXTRA_DRAWS` draws, the extra words are
	/// dropped and the text is closed with a period.
	fn complete_sentence(&mut self, words: &mut Vec<String>) {
		let kept = words.len();
		for _ in 0..MAX_EXTRA_DRAWS {
			let word = self.draw_next_word(None);

			if is_terminal(&word) {
				words.push(word);
				return;
			}

			if CONJUNCTIONS.contains(&word.to_lowercase().as_str()) {
				if let Some(last) = words.last_mut() {
					last.push('.');
				}
				return;
			}

			words.push(word);
		}

		warn!("No sentence boundary found in model {} after {} draws", self.label(), MAX_EXTRA_DRAWS);
		close_text(words, kept);
	}

	/// Keeps drawing while the text ends on a stop word.
	///
	/// Gives up like [`Generator::complete_sentence`].
	fn continue_until_valid(&mut self, words: &mut Vec<String>) {
		let kept = words.len();
		for _ in 0..MAX_EXTRA_DRAWS {
			if !words.last().is_some_and(|word| is_stop_word(word)) {
				return;
			}
			let word = self.draw_next_word(None);
			words.push(word);
		}

		if words.last().is_some_and(|word| is_stop_word(word)) {
			warn!("Text still ends on a stop word in model {} after {} draws", self.label(), MAX_EXTRA_DRAWS);
			close_text(words, kept);
		}
	}

	/// Discards draws until the cursor ends on a sentence boundary, so the next
	/// word starts a sentence in the training data.
	///
	/// Returns `false` if no boundary was reached within the draw limit.
	pub fn fast_forward_to_sentence_boundary(&mut self) -> bool {
		for _ in 0..MAX_EXTRA_DRAWS {
			if self.key.last().is_some_and(|word| is_terminal(word)) {
				return true;
			}
			self.draw_next_word(None);
		}

		let aligned = self.key.last().is_some_and(|word| is_terminal(word));
		if !aligned {
			warn!("No sentence boundary found in model {} after {} draws", self.label(), MAX_EXTRA_DRAWS);
		}
		aligned
	}

	/// Normalizes generated words into a displayable text.
	///
	/// - Capitalizes the first word unless it is already fully upper-case
	/// - Joins words with single spaces
	/// - Fixes punctuation artifacts and strips characters that are hard to
	///   balance in random text (parentheses, quotes, decorative glyphs)
	/// - Strips `,;:-*` and spaces from both ends
	pub fn cleanup<S: AsRef<str>>(tokens: &[S]) -> String {
		let Some((first, rest)) = tokens.split_first() else {
			return String::new();
		};

		let first = first.as_ref();
		let first = if first != first.to_uppercase() {
			capitalize_first(first.trim())
		} else {
			first.to_owned()
		};

		let mut text = std::iter::once(first.as_str())
			.chain(rest.iter().map(AsRef::as_ref))
			.collect::<Vec<_>>()
			.join(" ");

		for (old, new) in REPLACEMENTS {
			text = text.replace(old, new);
		}

		text.trim_matches(&TRIM_CHARS[..]).to_owned()
	}
}

/// Drops the words drawn after `kept` and ends the text with a period.
fn close_text(words: &mut Vec<String>, kept: usize) {
	words.truncate(kept);
	if let Some(last) = words.last_mut() {
		last.push('.');
	}
}

fn is_terminal(word: &str) -> bool {
	TERMINAL_PUNCTUATION.iter().any(|mark| word.ends_with(mark))
}

fn is_stop_word(word: &str) -> bool {
	STOP_WORDS.contains(&word.to_lowercase().as_str())
}
