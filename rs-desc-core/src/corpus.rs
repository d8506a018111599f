use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::error::Result;
use crate::io;

/// Requirement categories kept when building requirement corpora.
pub const REQUIREMENT_CATEGORIES: [&str; 11] = [
	"OS",
	"Processor",
	"Memory",
	"Graphics",
	"DirectX",
	"Storage",
	"Hard Drive",
	"Hard Disk Space",
	"Sound Card",
	"Additional",
	"Additional Notes",
];

/// Categories merged into another one: `(alias, canonical)`.
const CATEGORY_ALIASES: [(&str, &str); 3] = [
	("Hard Drive", "Storage"),
	("Hard Disk Space", "Storage"),
	("Additional", "Additional Notes"),
];

/// One scraped store page, already reduced to plain text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceDocument {
	#[serde(default)]
	pub detailed_description: String,
	/// Requirement category → lines
	#[serde(default)]
	pub requirements: HashMap<String, Vec<String>>,
}

/// Loads every `*.json` source document of `folder`, in file name order.
pub fn load_source_documents<P: AsRef<Path>>(folder: P) -> Result<Vec<SourceDocument>> {
	let folder = io::normalize_folder(folder);
	let mut documents = Vec::new();
	for path in io::list_files(&folder, "json")? {
		let document: SourceDocument = serde_json::from_str(&io::read_text(&path)?)?;
		documents.push(document);
	}
	info!("Loaded {} source documents from {}", documents.len(), folder.display());
	Ok(documents)
}

/// Joins every description into a single corpus.
pub fn description_corpus(documents: &[SourceDocument]) -> String {
	documents
		.iter()
		.map(|document| document.detailed_description.trim())
		.filter(|text| !text.is_empty())
		.collect::<Vec<_>>()
		.join(" ")
}

/// Merges the requirements of all documents into one list per category.
///
/// - Only `REQUIREMENT_CATEGORIES` are kept
/// - Lines keep document order
/// - Aliases are folded into their canonical category (`Hard Drive` and
///   `Hard Disk Space` into `Storage`, `Additional` into `Additional Notes`);
///   both canonical categories are always present, possibly empty
pub fn merge_requirements(documents: &[SourceDocument]) -> BTreeMap<String, Vec<String>> {
	let mut merged: BTreeMap<String, Vec<String>> = BTreeMap::new();
	for document in documents {
		for category in REQUIREMENT_CATEGORIES {
			if let Some(lines) = document.requirements.get(category) {
				merged.entry(category.to_owned()).or_default().extend(lines.iter().cloned());
			}
		}
	}

	for (alias, canonical) in CATEGORY_ALIASES {
		let lines = merged.remove(alias).unwrap_or_default();
		merged.entry(canonical.to_owned()).or_default().extend(lines);
	}

	merged
}

#[cfg(test)]
mod tests {
	use super::*;

	fn document(requirements: &[(&str, &[&str])]) -> SourceDocument {
		SourceDocument {
			detailed_description: String::new(),
			requirements: requirements
				.iter()
				.map(|(k, v)| ((*k).to_owned(), v.iter().map(|s| (*s).to_owned()).collect()))
				.collect(),
		}
	}

	fn lines(values: &[&str]) -> Vec<String> {
		values.iter().map(|s| (*s).to_owned()).collect()
	}

	#[test]
	fn merges_lists_across_documents() {
		let documents = [
			document(&[
				("OS", &["Windows 7 / 8 / 10"]),
				("Memory", &["256 MB RAM"]),
				("Sound Card", &["DirectX compatible Soundcard"]),
			]),
			document(&[
				("OS", &["Ubuntu 18.04 (64-bit)", "Windows 10 or higher (64-bit)"]),
				("Memory", &["8 GB RAM"]),
				("Network", &["Broadband Internet connection"]),
			]),
		];

		let merged = merge_requirements(&documents);

		assert_eq!(
			merged["OS"],
			lines(&["Windows 7 / 8 / 10", "Ubuntu 18.04 (64-bit)", "Windows 10 or higher (64-bit)"])
		);
		assert_eq!(merged["Memory"], lines(&["256 MB RAM", "8 GB RAM"]));
		assert_eq!(merged["Sound Card"], lines(&["DirectX compatible Soundcard"]));
		assert!(!merged.contains_key("Network"));
	}

	#[test]
	fn canonical_categories_always_exist() {
		let merged = merge_requirements(&[document(&[("OS", &["Windows 7"]), ("Extra Category", &["80 Flerps"])])]);

		assert_eq!(merged.len(), 3);
		assert!(merged["Storage"].is_empty());
		assert!(merged["Additional Notes"].is_empty());
	}

	#[test]
	fn aliases_are_folded() {
		let documents = [
			document(&[("Storage", &["250 MB available space"])]),
			document(&[("Hard Disk Space", &["15 GB available space"])]),
			document(&[("Hard Drive", &["2 GB"]), ("Additional", &["A powered computer recommended"])]),
		];

		let merged = merge_requirements(&documents);

		assert_eq!(merged["Storage"], lines(&["250 MB available space", "2 GB", "15 GB available space"]));
		assert_eq!(merged["Additional Notes"], lines(&["A powered computer recommended"]));
		assert!(!merged.contains_key("Hard Drive"));
		assert!(!merged.contains_key("Additional"));
	}

	#[test]
	fn description_corpus_skips_blank_documents() {
		let documents = [
			SourceDocument { detailed_description: " Fight dragons. ".to_owned(), ..Default::default() },
			SourceDocument::default(),
			SourceDocument { detailed_description: "Build a castle.".to_owned(), ..Default::default() },
		];
		assert_eq!(description_corpus(&documents), "Fight dragons. Build a castle.");
	}
}
