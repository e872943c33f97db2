use std::path::{Path, PathBuf};

use crate::error::ChainError;
use crate::io::read_lines;

/// Anything that can supply raw posts to train on.
///
/// The chain only needs an ordered batch of texts; where they come from
/// (a file, an API client, a test fixture) is up to the implementor.
pub trait TextSource {
	/// Returns the texts currently available from the source.
	fn fetch(&mut self) -> Result<Vec<String>, ChainError>;
}

/// Reads one post per line from a text file. Blank lines are skipped.
#[derive(Clone, Debug)]
pub struct LineFileSource {
	path: PathBuf,
}

impl LineFileSource {
	pub fn new<P: AsRef<Path>>(path: P) -> Self {
		Self { path: path.as_ref().to_path_buf() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl TextSource for LineFileSource {
	fn fetch(&mut self) -> Result<Vec<String>, ChainError> {
		Ok(read_lines(&self.path)?)
	}
}

/// In-memory source, drained on the first fetch.
impl TextSource for Vec<String> {
	fn fetch(&mut self) -> Result<Vec<String>, ChainError> {
		Ok(std::mem::take(self))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn in_memory_source_drains() {
		let mut source = vec!["first post".to_owned(), "second".to_owned()];
		assert_eq!(source.fetch().unwrap().len(), 2);
		assert!(source.fetch().unwrap().is_empty());
	}

	#[test]
	fn line_file_source_skips_blank_lines() {
		let path = std::env::temp_dir().join(format!("tweet-chain-source-{}.txt", std::process::id()));
		std::fs::write(&path, "hello world\n\n   \r\nsecond post\r\n").unwrap();

		let texts = LineFileSource::new(&path).fetch();
		std::fs::remove_file(&path).unwrap();

		assert_eq!(texts.unwrap(), vec!["hello world".to_owned(), "second post".to_owned()]);
	}

	#[test]
	fn missing_file_is_an_io_error() {
		let mut source = LineFileSource::new("/definitely/not/here.txt");
		assert!(matches!(source.fetch(), Err(ChainError::Io(_))));
	}
}
