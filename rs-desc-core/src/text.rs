//! Small casing helpers shared by the generator, the template filler and the
//! description composer.

/// Upper-cases the first character and keeps the rest untouched.
pub fn capitalize_first(word: &str) -> String {
	let mut chars = word.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

/// Upper-cases the first character and lower-cases the rest.
pub fn capitalize(word: &str) -> String {
	let mut chars = word.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
		None => String::new(),
	}
}

/// Capitalizes every whitespace-separated word and joins them with single spaces.
pub fn title_case(text: &str) -> String {
	text.split_whitespace().map(capitalize).collect::<Vec<_>>().join(" ")
}
