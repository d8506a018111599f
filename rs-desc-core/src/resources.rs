use std::collections::BTreeMap;
use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::error::Result;
use crate::io;
use crate::template::PosDictionary;

pub const DEVELOPERS_FILE: &str = "developers.txt";
pub const POS_TAGS_FILE: &str = "pos_tags.json";
pub const GENRES_FILE: &str = "genres.json";
pub const SEEDS_FILE: &str = "seeds.json";
pub const SCREENSHOTS_FILE: &str = "screenshots.txt";

/// Genre tags: each primary genre with its own tags, plus shared pools.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenreTable {
	#[serde(rename = "Primary")]
	pub primary: BTreeMap<String, Vec<String>>,
	#[serde(rename = "Common", default)]
	pub common: Vec<String>,
	#[serde(rename = "Other", default)]
	pub other: Vec<String>,
}

/// Seed texts used to start paragraphs and subsection headers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedPools {
	#[serde(default)]
	pub text: Vec<String>,
	#[serde(default)]
	pub headers: Vec<String>,
}

/// Static inputs of the description composer, loaded once per process.
#[derive(Debug, Clone, Default)]
pub struct Resources {
	pub developer_templates: Vec<String>,
	pub pos: PosDictionary,
	pub genres: GenreTable,
	pub seeds: SeedPools,
	/// Optional; empty when the folder has no screenshot list
	pub screenshots: Vec<String>,
}

impl Resources {
	/// Loads every resource file from `folder`.
	///
	/// # Errors
	/// I/O or JSON errors for any mandatory file.
	pub fn load<P: AsRef<Path>>(folder: P) -> Result<Self> {
		let folder = io::normalize_folder(folder);

		let developer_templates = io::read_lines(folder.join(DEVELOPERS_FILE))?;
		let pos: PosDictionary = serde_json::from_str(&io::read_text(folder.join(POS_TAGS_FILE))?)?;
		let genres: GenreTable = serde_json::from_str(&io::read_text(folder.join(GENRES_FILE))?)?;
		let seeds: SeedPools = serde_json::from_str(&io::read_text(folder.join(SEEDS_FILE))?)?;

		let screenshots_path = folder.join(SCREENSHOTS_FILE);
		let screenshots = if screenshots_path.is_file() {
			io::read_lines(screenshots_path)?
		} else {
			Vec::new()
		};

		info!(
			"Loaded resources from {}: {} developer templates, {} POS tags, {} genres, {} seeds",
			folder.display(),
			developer_templates.len(),
			pos.len(),
			genres.primary.len(),
			seeds.text.len() + seeds.headers.len()
		);

		Ok(Self { developer_templates, pos, genres, seeds, screenshots })
	}
}
