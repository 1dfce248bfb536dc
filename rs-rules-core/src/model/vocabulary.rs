use std::collections::HashSet;

use serde::Serialize;

use crate::error::{Error, Result};

/// Largest vocabulary `Vocabulary::alphabet` can build.
pub const MAX_ALPHABET_SIZE: usize = 26;

/// Ordered, duplicate-free set of symbols a string is drawn from.
///
/// # Invariants
/// - At least one symbol
/// - No symbol appears twice
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Vocabulary {
	symbols: Vec<char>,
}

impl Vocabulary {
	/// Creates a vocabulary from an explicit list of symbols.
	///
	/// # Errors
	/// Returns `InvalidParameter` if the list is empty or holds duplicates.
	pub fn new(symbols: Vec<char>) -> Result<Self> {
		if symbols.is_empty() {
			return Err(Error::InvalidParameter("vocabulary must not be empty".to_owned()));
		}
		let mut seen = HashSet::new();
		for symbol in &symbols {
			if !seen.insert(*symbol) {
				return Err(Error::InvalidParameter(format!("duplicate symbol '{symbol}' in vocabulary")));
			}
		}
		Ok(Self { symbols })
	}

	/// The first `size` upper-case latin letters.
	///
	/// # Errors
	/// Returns `InvalidParameter` unless `1 <= size <= 26`.
	pub fn alphabet(size: usize) -> Result<Self> {
		if size == 0 || size > MAX_ALPHABET_SIZE {
			return Err(Error::InvalidParameter(format!(
				"alphabet size must be between 1 and {MAX_ALPHABET_SIZE}, got {size}"
			)));
		}
		Self::new(('A'..='Z').take(size).collect())
	}

	/// Returns a vocabulary holding at least `size` symbols.
	///
	/// Keeps the current symbols and appends unused letters, then digits.
	/// Used to correct a misconfigured rule set before retrying.
	pub fn widened_to(&self, size: usize) -> Self {
		let mut symbols = self.symbols.clone();
		let mut extra = ('A'..='Z').chain('a'..='z').chain('0'..='9');
		while symbols.len() < size {
			match extra.next() {
				Some(c) if !symbols.contains(&c) => symbols.push(c),
				Some(_) => continue,
				None => break,
			}
		}
		Self { symbols }
	}

	pub fn symbols(&self) -> &[char] {
		&self.symbols
	}

	pub fn len(&self) -> usize {
		self.symbols.len()
	}

	/// Never true for a vocabulary built through `new` or `alphabet`.
	pub fn is_empty(&self) -> bool {
		self.symbols.is_empty()
	}

	pub fn contains(&self, symbol: char) -> bool {
		self.symbols.contains(&symbol)
	}
}
