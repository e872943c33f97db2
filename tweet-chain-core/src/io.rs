use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Reads a text file and returns its non-blank lines, trimmed.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub(crate) fn read_lines<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents
		.lines()
		.map(str::trim)
		.filter(|line| !line.is_empty())
		.map(str::to_owned)
		.collect())
}

/// Swaps the extension of a training file for the one of its chain file,
/// keeping the directory.
///
/// Example:
/// `data/posts.txt` + `"json"` → `data/posts.json`
pub(crate) fn build_output_path<P: AsRef<Path>>(input_path: P, output_extension: &str) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();
	match input_path.file_stem() {
		Some(_) => Ok(input_path.with_extension(output_extension)),
		None => Err(io::Error::new(
			io::ErrorKind::InvalidInput,
			format!("{} does not name a file", input_path.display()),
		)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn output_path_keeps_directory() {
		assert_eq!(build_output_path("data/posts.txt", "bin").unwrap(), PathBuf::from("data/posts.bin"));
		assert_eq!(build_output_path("posts", "json").unwrap(), PathBuf::from("posts.json"));
	}

	#[test]
	fn output_path_needs_a_file_name() {
		assert_eq!(build_output_path("..", "json").unwrap_err().kind(), io::ErrorKind::InvalidInput);
	}
}
