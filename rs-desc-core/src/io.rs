use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

/// Reads a text file and returns all its non-empty lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
/// - Trailing whitespace of each line is dropped
pub(crate) fn read_lines<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let contents = read_text(filename)?;
	Ok(contents
		.lines()
		.map(str::trim_end)
		.filter(|line| !line.is_empty())
		.map(str::to_owned)
		.collect())
}

/// Reads a whole text file, trimmed.
pub(crate) fn read_text<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents.trim().to_owned())
}

/// Builds the path of a named entry inside a folder.
///
/// Example:
/// `models/` + `"description"` + `"bin"` → `models/description.bin`
pub(crate) fn build_entry_path<P: AsRef<Path>>(folder: P, name: &str, extension: &str) -> PathBuf {
	let mut output = folder.as_ref().join(name);
	output.set_extension(extension);
	output
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./models/title.bin"` → `"title"`
/// - `"title.bin"` → `"title"`
pub(crate) fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;

	Ok(stem.to_string_lossy().to_string())
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub(crate) fn normalize_folder<P: AsRef<Path>>(input: P) -> PathBuf {
	let input = input.as_ref();
	if input == Path::new(".") || input == Path::new("./") {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		input.to_path_buf()
	}
}

/// Lists all files with a given extension in a directory.
///
/// Returns full paths, sorted so callers see a stable order.
pub(crate) fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<PathBuf>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			files.push(path);
		}
	}

	files.sort();
	Ok(files)
}
