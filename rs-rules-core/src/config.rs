//! Question provider configuration
//!
//! Defaults match the original experiment setup; every field can be
//! overridden from the environment.

use std::env;

use serde::Deserialize;

/// Settings of a `QuestionProvider`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
	/// Number of letters in the symbol alphabet
	pub vocabulary_size: usize,
	/// Questions asked before a round moves on to a similar rule set (0 = never)
	pub questions_per_round: usize,
	/// Seed for reproducible sessions, random when absent
	pub seed: Option<u64>,
}

impl Default for ProviderConfig {
	fn default() -> Self {
		Self {
			vocabulary_size: 8,
			questions_per_round: 3,
			seed: None,
		}
	}
}

impl ProviderConfig {
	/// Reads `RS_RULES_VOCABULARY`, `RS_RULES_QUESTIONS_PER_ROUND` and
	/// `RS_RULES_SEED`, keeping defaults for missing or unparsable values.
	pub fn from_env() -> Self {
		let mut config = Self::default();

		if let Some(size) = env::var("RS_RULES_VOCABULARY").ok().and_then(|v| v.parse().ok()) {
			config.vocabulary_size = size;
		}

		if let Some(count) = env::var("RS_RULES_QUESTIONS_PER_ROUND").ok().and_then(|v| v.parse().ok()) {
			config.questions_per_round = count;
		}

		if let Ok(seed) = env::var("RS_RULES_SEED") {
			match seed.parse() {
				Ok(value) => config.seed = Some(value),
				Err(_) => tracing::warn!("ignoring RS_RULES_SEED={seed}, not an integer"),
			}
		}

		config
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = ProviderConfig::default();
		assert_eq!(config.vocabulary_size, 8);
		assert_eq!(config.questions_per_round, 3);
		assert_eq!(config.seed, None);
	}

	#[test]
	fn test_partial_json_keeps_defaults() {
		let config: ProviderConfig = serde_json::from_str(r#"{ "seed": 9 }"#).unwrap();
		assert_eq!(config.seed, Some(9));
		assert_eq!(config.vocabulary_size, 8);
	}
}
