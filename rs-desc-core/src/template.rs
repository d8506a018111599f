//! Developer-name templates.
//!
//! A template is plain text with bracket tokens:
//! - `{{}}`: one or two words of any of the open categories
//! - `{{?}}`: zero or one word of any of the open categories
//! - `{{TAG}}`: one or two distinct words of the part-of-speech tag `TAG`
//!
//! For instance `{{}} Software`, `{{NOUN}}ware` or `{{?}} {{NOUN}} Games`.

use std::collections::HashMap;
use std::sync::LazyLock;

use rand::Rng;
use rand::seq::IndexedRandom;
use regex::Regex;

use crate::error::{Error, Result};
use crate::text::title_case;

/// Part-of-speech tag → candidate words.
pub type PosDictionary = HashMap<String, Vec<String>>;

/// Token replaced by 1-2 words of random open categories.
pub const OPEN_TOKEN: &str = "{{}}";

/// Token replaced by 0-1 word of a random open category.
pub const OPTIONAL_TOKEN: &str = "{{?}}";

/// Categories used by the open and optional tokens.
pub const OPEN_TAGS: [&str; 4] = ["NOUN", "ADJ", "VERB", "ADV"];

static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{[A-Z]+\}\}").expect("valid tag pattern"));

/// Source of the random decisions taken while filling a template.
///
/// Every `rand::Rng` is a `WordPicker`; tests can script the decisions instead.
pub trait WordPicker {
	/// Uniform integer in `low..=high`.
	fn count(&mut self, low: usize, high: usize) -> usize;

	/// `k` tags drawn with replacement.
	fn tags(&mut self, tags: &[&'static str], k: usize) -> Vec<&'static str>;

	/// One word, or `None` if `words` is empty.
	fn word(&mut self, words: &[String]) -> Option<String>;

	/// `k` distinct words (all of them if there are fewer than `k`).
	fn distinct_words(&mut self, words: &[String], k: usize) -> Vec<String>;
}

impl<R: Rng + ?Sized> WordPicker for R {
	fn count(&mut self, low: usize, high: usize) -> usize {
		self.random_range(low..=high)
	}

	fn tags(&mut self, tags: &[&'static str], k: usize) -> Vec<&'static str> {
		let mut picked = Vec::with_capacity(k);
		for _ in 0..k {
			if let Some(tag) = tags.choose(self) {
				picked.push(*tag);
			}
		}
		picked
	}

	fn word(&mut self, words: &[String]) -> Option<String> {
		words.choose(self).cloned()
	}

	fn distinct_words(&mut self, words: &[String], k: usize) -> Vec<String> {
		words.choose_multiple(self, k).cloned().collect()
	}
}

fn pick_word<P: WordPicker + ?Sized>(pos: &PosDictionary, tag: &str, picker: &mut P) -> Result<String> {
	let words = pos.get(tag).ok_or_else(|| Error::UnknownTag(tag.to_owned()))?;
	picker.word(words).ok_or(Error::EmptyResource("pos_tags"))
}

/// Fills a name template from the part-of-speech dictionary.
///
/// Tokens are resolved in a fixed order: `{{}}`, then `{{?}}`, then
/// `{{TAG}}`. Every occurrence is filled with its own draw, left to right.
/// The result is stripped of surrounding hyphens and spaces and title-cased.
///
/// # Errors
/// `UnknownTag` if a token names a tag missing from `pos`.
pub fn render_name<P: WordPicker + ?Sized>(template: &str, pos: &PosDictionary, picker: &mut P) -> Result<String> {
	let mut name = template.to_owned();

	for _ in 0..name.matches(OPEN_TOKEN).count() {
		let k = picker.count(1, 2);
		let mut words = Vec::with_capacity(k);
		for tag in picker.tags(&OPEN_TAGS, k) {
			words.push(pick_word(pos, tag, picker)?);
		}
		name = name.replacen(OPEN_TOKEN, &words.join(" "), 1);
	}

	for _ in 0..name.matches(OPTIONAL_TOKEN).count() {
		let k = picker.count(0, 1);
		let word = match picker.tags(&OPEN_TAGS, k).first() {
			Some(tag) => pick_word(pos, tag, picker)?,
			None => String::new(),
		};
		name = name.replacen(OPTIONAL_TOKEN, &word, 1);
	}

	let determined: Vec<String> = TAG_PATTERN.find_iter(&name).map(|m| m.as_str().to_owned()).collect();
	for token in determined {
		let tag = &token[2..token.len() - 2];
		let candidates = pos.get(tag).ok_or_else(|| Error::UnknownTag(tag.to_owned()))?;
		let k = picker.count(1, 2);
		let words = picker.distinct_words(candidates, k);
		name = name.replacen(&token, &words.join(" "), 1);
	}

	Ok(title_case(name.trim_matches(&['-', ' '][..])))
}
