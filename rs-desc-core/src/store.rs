use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::io;

/// Extension of model files in a [`DirectoryStore`].
pub const MODEL_EXTENSION: &str = "bin";

/// Byte-blob persistence for trained models.
///
/// The store knows nothing about the encoding; it saves and returns the
/// exact bytes it was given under a name.
pub trait ModelStore: Send + Sync {
	/// Saves `bytes` under `name`, overwriting any previous model.
	fn save(&self, bytes: &[u8], name: &str) -> Result<()>;

	/// Returns the bytes saved under `name`.
	///
	/// # Errors
	/// `ModelNotFound` if nothing was saved under that name.
	fn load(&self, name: &str) -> Result<Vec<u8>>;

	/// Names of all stored models, sorted.
	fn list(&self) -> Result<Vec<String>>;
}

/// Stores each model as `<folder>/<name>.bin`.
///
/// The folder is created on the first save.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
	folder: PathBuf,
}

impl DirectoryStore {
	pub fn new<P: AsRef<Path>>(folder: P) -> Self {
		Self { folder: io::normalize_folder(folder) }
	}

	pub fn folder(&self) -> &Path {
		&self.folder
	}
}

impl ModelStore for DirectoryStore {
	fn save(&self, bytes: &[u8], name: &str) -> Result<()> {
		fs::create_dir_all(&self.folder)?;
		let path = io::build_entry_path(&self.folder, name, MODEL_EXTENSION);
		fs::write(&path, bytes)?;
		info!("Saved model {} ({} bytes) to {}", name, bytes.len(), path.display());
		Ok(())
	}

	fn load(&self, name: &str) -> Result<Vec<u8>> {
		let path = io::build_entry_path(&self.folder, name, MODEL_EXTENSION);
		if !path.is_file() {
			return Err(Error::ModelNotFound(name.to_owned()));
		}
		debug!("Loading model {} from {}", name, path.display());
		Ok(fs::read(path)?)
	}

	fn list(&self) -> Result<Vec<String>> {
		if !self.folder.is_dir() {
			return Ok(Vec::new());
		}
		io::list_files(&self.folder, MODEL_EXTENSION)?
			.iter()
			.map(|path| io::get_filename(path).map_err(Error::from))
			.collect()
	}
}

/// Keeps models in memory. Useful for tests and for warm caches.
#[derive(Debug, Default)]
pub struct MemoryStore {
	models: RwLock<HashMap<String, Vec<u8>>>,
}

impl ModelStore for MemoryStore {
	fn save(&self, bytes: &[u8], name: &str) -> Result<()> {
		let mut models = self.models.write().unwrap_or_else(|poisoned| poisoned.into_inner());
		models.insert(name.to_owned(), bytes.to_vec());
		Ok(())
	}

	fn load(&self, name: &str) -> Result<Vec<u8>> {
		let models = self.models.read().unwrap_or_else(|poisoned| poisoned.into_inner());
		models.get(name).cloned().ok_or_else(|| Error::ModelNotFound(name.to_owned()))
	}

	fn list(&self) -> Result<Vec<String>> {
		let models = self.models.read().unwrap_or_else(|poisoned| poisoned.into_inner());
		let mut names: Vec<String> = models.keys().cloned().collect();
		names.sort();
		Ok(names)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn memory_store_round_trip() {
		let store = MemoryStore::default();
		store.save(b"abc", "title").unwrap();
		store.save(b"xyz", "feature").unwrap();

		assert_eq!(store.load("title").unwrap(), b"abc");
		assert_eq!(store.list().unwrap(), vec!["feature", "title"]);
		assert!(matches!(store.load("tagline"), Err(Error::ModelNotFound(_))));
	}

	#[test]
	fn directory_store_round_trip() {
		let dir = tempfile::tempdir().unwrap();
		let store = DirectoryStore::new(dir.path().join("models"));

		assert!(store.list().unwrap().is_empty());
		store.save(b"model bytes", "requirements_OS").unwrap();

		assert_eq!(store.load("requirements_OS").unwrap(), b"model bytes");
		assert_eq!(store.list().unwrap(), vec!["requirements_OS"]);
		assert!(matches!(store.load("missing"), Err(Error::ModelNotFound(_))));
	}
}
