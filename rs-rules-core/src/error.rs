use thiserror::Error;

/// Result type alias for rule generation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building rules, generating strings or loading songs.
#[derive(Debug, Error)]
pub enum Error {
	/// A rule, vocabulary or rule set was built from out-of-domain values.
	#[error("Invalid parameter: {0}")]
	InvalidParameter(String),

	/// The requested string cannot hold one block of every rule.
	#[error("Length {length} is too short, the active rules need at least {minimum}")]
	LengthTooShort { length: usize, minimum: usize },

	/// Not enough symbols left once every rule has reserved its trigger.
	#[error("Vocabulary of {size} symbols is too small, {required} are required")]
	VocabularyTooSmall { size: usize, required: usize },

	/// The question provider failed even after correcting its parameters.
	#[error("Question generation exhausted: {0}")]
	Exhausted(String),

	/// The song manifest is not valid JSON or has the wrong shape.
	#[error("Manifest error: {0}")]
	Manifest(#[from] serde_json::Error),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_length_too_short_display() {
		let err = Error::LengthTooShort { length: 4, minimum: 5 };
		assert_eq!(err.to_string(), "Length 4 is too short, the active rules need at least 5");
	}

	#[test]
	fn test_vocabulary_too_small_display() {
		let err = Error::VocabularyTooSmall { size: 2, required: 3 };
		assert_eq!(err.to_string(), "Vocabulary of 2 symbols is too small, 3 are required");
	}

	#[test]
	fn test_error_from_serde_json() {
		let json_err = serde_json::from_str::<Vec<u8>>("not json").unwrap_err();
		let err: Error = json_err.into();
		assert!(matches!(err, Error::Manifest(_)));
		assert!(err.to_string().starts_with("Manifest error"));
	}

	#[test]
	fn test_error_from_io() {
		let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
		let err: Error = io_err.into();
		assert!(matches!(err, Error::Io(_)));
	}
}
