use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

/// A song the participant listens to while answering.
///
/// Generation only uses its `id`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Song {
	/// Position in the manifest
	#[serde(default)]
	pub id: usize,
	pub title: String,
	/// Audio resource name
	pub file: String,
}

/// The list of songs, loaded once at startup and read-only afterwards.
#[derive(Serialize, Clone, Debug, Default)]
pub struct SongManifest {
	songs: Vec<Song>,
}

impl SongManifest {
	/// Parses a JSON array of `{ "title": ..., "file": ... }` objects.
	///
	/// Ids are reassigned from the array order.
	pub fn from_json(json: &str) -> Result<Self> {
		let mut songs: Vec<Song> = serde_json::from_str(json)?;
		if songs.is_empty() {
			return Err(Error::InvalidParameter("song manifest is empty".to_owned()));
		}
		for (id, song) in songs.iter_mut().enumerate() {
			song.id = id;
		}
		Ok(Self { songs })
	}

	/// Reads and parses a manifest file.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let manifest = Self::from_json(&fs::read_to_string(&path)?)?;
		info!(songs = manifest.len(), path = %path.as_ref().display(), "song manifest loaded");
		Ok(manifest)
	}

	pub fn songs(&self) -> &[Song] {
		&self.songs
	}

	pub fn get(&self, id: usize) -> Option<&Song> {
		self.songs.get(id)
	}

	pub fn len(&self) -> usize {
		self.songs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.songs.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_from_json_assigns_ids() {
		let json = r#"[
			{ "title": "First", "file": "first.mp3" },
			{ "title": "Second", "file": "second.mp3", "id": 40 }
		]"#;
		let manifest = SongManifest::from_json(json).unwrap();
		assert_eq!(manifest.len(), 2);
		assert_eq!(manifest.get(1).unwrap().title, "Second");
		assert_eq!(manifest.get(1).unwrap().id, 1);
		assert!(manifest.get(2).is_none());
	}

	#[test]
	fn test_empty_manifest_rejected() {
		assert!(matches!(SongManifest::from_json("[]"), Err(Error::InvalidParameter(_))));
	}

	#[test]
	fn test_malformed_manifest() {
		assert!(matches!(SongManifest::from_json(r#"[{ "title": 3 }]"#), Err(Error::Manifest(_))));
	}

	#[test]
	fn test_missing_file() {
		assert!(matches!(SongManifest::load("./does/not/exist.json"), Err(Error::Io(_))));
	}
}
