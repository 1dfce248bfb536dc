use serde::Serialize;

use super::difficulty::Difficulty;
use super::rule_set::RuleSet;

/// A generated string together with its ground truth.
///
/// Created fresh for every request and never mutated afterwards.
#[derive(Serialize, Clone, Debug)]
pub struct Question {
	/// The string shown to the participant
	pub text: String,

	/// Number of symbols in `text`
	pub length: usize,

	/// Whether `text` satisfies every rule of `rule_set`
	pub is_valid: bool,

	/// Hint text derived from the rules
	pub description: String,

	pub song_id: usize,
	pub difficulty: Difficulty,

	/// Snapshot of the rule set, including the trace of this generation
	#[serde(skip)]
	rule_set: RuleSet,
}

impl Question {
	pub(crate) fn new(text: String, is_valid: bool, song_id: usize, difficulty: Difficulty, rule_set: RuleSet) -> Self {
		Self {
			length: text.chars().count(),
			description: rule_set.user_facing_description(),
			text,
			is_valid,
			song_id,
			difficulty,
			rule_set,
		}
	}

	pub fn rule_set(&self) -> &RuleSet {
		&self.rule_set
	}

	/// Trace of the generation that produced `text`.
	pub fn debug_full_history(&self) -> String {
		self.rule_set.debug_full_history()
	}
}
