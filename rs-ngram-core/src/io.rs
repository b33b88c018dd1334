use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{LmError, LmResult};

/// Reads a corpus file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub fn read_lines<P: AsRef<Path>>(filename: P) -> LmResult<Vec<String>> {
	let path = filename.as_ref();
	let contents = fs::read_to_string(path).map_err(|source| LmError::CorpusRead {
		path: path.to_path_buf(),
		source,
	})?;
	Ok(contents.lines().map(str::to_owned).collect())
}

/// Reads a whole model file.
pub(crate) fn read_bytes<P: AsRef<Path>>(filename: P) -> LmResult<Vec<u8>> {
	let path = filename.as_ref();
	fs::read(path).map_err(|source| LmError::ModelRead {
		path: path.to_path_buf(),
		source,
	})
}

/// Writes a whole model file, replacing any previous content.
pub(crate) fn write_bytes<P: AsRef<Path>>(filename: P, bytes: &[u8]) -> LmResult<()> {
	let path = filename.as_ref();
	fs::write(path, bytes).map_err(|source| LmError::ModelWrite {
		path: path.to_path_buf(),
		source,
	})
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `data/input.txt` + `"bin"` → `data/input.bin`
pub fn build_output_path<P: AsRef<Path>>(
	input_path: P,
	output_extension: &str,
) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}
