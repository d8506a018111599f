use std::collections::HashSet;

/// Word relatedness oracle used to bias successor selection.
///
/// Higher values mean more related. Implementations must be cheap enough to
/// be called once per candidate successor.
pub trait WordSimilarity: Send + Sync {
	fn similarity(&self, a: &str, b: &str) -> f32;
}

/// Dice coefficient over padded, lower-cased character trigrams.
///
/// Not semantic in the embedding sense, but related word forms
/// ("dragon", "dragons", "dragonslayer") score high while unrelated words
/// score close to zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrigramSimilarity;

impl TrigramSimilarity {
	fn trigrams(word: &str) -> HashSet<[char; 3]> {
		let padded: Vec<char> = std::iter::once(' ')
			.chain(word.chars().filter(|c| c.is_alphanumeric()).flat_map(char::to_lowercase))
			.chain(std::iter::once(' '))
			.collect();

		padded.windows(3).map(|w| [w[0], w[1], w[2]]).collect()
	}
}

impl WordSimilarity for TrigramSimilarity {
	fn similarity(&self, a: &str, b: &str) -> f32 {
		let left = Self::trigrams(a);
		let right = Self::trigrams(b);
		let total = left.len() + right.len();
		if total == 0 {
			return 0.0;
		}
		let shared = left.intersection(&right).count();
		(2 * shared) as f32 / total as f32
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn identical_words_score_one() {
		assert_eq!(TrigramSimilarity.similarity("Castle", "castle"), 1.0);
	}

	#[test]
	fn related_forms_beat_unrelated_words() {
		let s = TrigramSimilarity;
		assert!(s.similarity("dragon", "dragons") > s.similarity("dragon", "spaceship"));
		assert_eq!(s.similarity("abc", "xyz"), 0.0);
	}

	#[test]
	fn punctuation_is_ignored() {
		assert_eq!(TrigramSimilarity.similarity("puzzle,", "puzzle"), 1.0);
	}
}
