/// Number of words generated when the requested size is unusable.
pub const DEFAULT_TEXT_LENGTH: usize = 25;

/// Input parameters for one call to `Generator::generate`.
///
/// # Fields
/// - `seed`: text to start from. Adopted only if its last n-1 words form a key
///   of the model; the whole seed is then copied to the output.
/// - `size`: minimum number of words. `0` is replaced by `DEFAULT_TEXT_LENGTH`.
/// - `complete_sentence`: keep drawing past `size` until a natural sentence
///   break.
/// - `continue_until_valid`: keep drawing while the output ends on a function
///   word.
/// - `context`: word used to bias successor choice toward related words
///   (requires a similarity oracle on the generator).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationInput<'a> {
	pub seed: Option<&'a str>,
	pub size: usize,
	pub complete_sentence: bool,
	pub continue_until_valid: bool,
	pub context: Option<&'a str>,
}

impl Default for GenerationInput<'_> {
	fn default() -> Self {
		Self {
			seed: None,
			size: DEFAULT_TEXT_LENGTH,
			complete_sentence: false,
			continue_until_valid: false,
			context: None,
		}
	}
}

impl<'a> GenerationInput<'a> {
	/// Input with the given size and every option disabled.
	pub fn sized(size: usize) -> Self {
		Self { size, ..Self::default() }
	}

	pub fn with_seed(mut self, seed: &'a str) -> Self {
		self.seed = Some(seed);
		self
	}

	pub fn with_context(mut self, context: Option<&'a str>) -> Self {
		self.context = context;
		self
	}

	pub fn complete_sentence(mut self) -> Self {
		self.complete_sentence = true;
		self
	}

	pub fn continue_until_valid(mut self) -> Self {
		self.continue_until_valid = true;
		self
	}
}
