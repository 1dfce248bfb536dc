use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::song::Song;
use super::difficulty::{Difficulty, MAX_STRING_LENGTH};
use super::question::Question;
use super::rule_set::RuleSet;
use super::vocabulary::Vocabulary;

/// The rule set and string length currently used for one difficulty.
#[derive(Debug)]
struct Round {
	rule_set: RuleSet,
	length: usize,
	/// Questions generated with `rule_set` so far
	asked: usize,
}

/// High-level question source.
///
/// # Responsibilities
/// - Keep one round (rule set + length) per difficulty
/// - Move to a similar rule set every `questions_per_round` questions
/// - Flip a fair coin for validity and delegate generation to the rule set
/// - Recover from misconfigured rule sets by correcting them once
///
/// Memory use is bounded: one round per difficulty, and each rule set only
/// keeps the trace of its last generation.
#[derive(Debug)]
pub struct QuestionProvider {
	config: ProviderConfig,
	vocabulary: Vocabulary,
	rounds: HashMap<Difficulty, Round>,
	rng: StdRng,
}

impl QuestionProvider {
	/// Creates a provider from its configuration.
	///
	/// Uses a seeded generator when `config.seed` is set, OS entropy otherwise.
	///
	/// # Errors
	/// Returns `InvalidParameter` if the vocabulary size is outside `1..=26`.
	pub fn new(config: ProviderConfig) -> Result<Self> {
		let vocabulary = Vocabulary::alphabet(config.vocabulary_size)?;
		let rng = match config.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_os_rng(),
		};
		Ok(Self { config, vocabulary, rounds: HashMap::new(), rng })
	}

	pub fn config(&self) -> &ProviderConfig {
		&self.config
	}

	/// The rule set currently used for `difficulty`, if a round has started.
	pub fn current_rule_set(&self, difficulty: Difficulty) -> Option<&RuleSet> {
		self.rounds.get(&difficulty).map(|round| &round.rule_set)
	}

	/// Replaces the round of `difficulty` with a hand-configured rule set.
	///
	/// The rule set is not checked against the length here: a configuration
	/// that cannot generate is corrected on the next question.
	///
	/// # Errors
	/// Returns `InvalidParameter` if `length > MAX_STRING_LENGTH`.
	pub fn install_rule_set(&mut self, difficulty: Difficulty, rule_set: RuleSet, length: usize) -> Result<()> {
		if length > MAX_STRING_LENGTH {
			return Err(Error::InvalidParameter(format!(
				"string length must be at most {MAX_STRING_LENGTH}, got {length}"
			)));
		}
		debug!(%difficulty, length, "rule set installed: {}", rule_set.user_facing_description());
		self.rounds.insert(difficulty, Round { rule_set, length, asked: 0 });
		Ok(())
	}

	/// Starts the next round of `difficulty` with a similar rule set.
	///
	/// Does nothing if no round has started yet.
	pub fn advance_round(&mut self, difficulty: Difficulty) {
		if let Some(round) = self.rounds.get_mut(&difficulty) {
			round.rule_set = round.rule_set.similar_copy(&mut self.rng);
			round.asked = 0;
			debug!(%difficulty, "next round: {}", round.rule_set.user_facing_description());
		}
	}

	/// Generates the next question for a song at a difficulty.
	///
	/// # Behavior
	/// - Starts a round with a fresh rule set the first time a difficulty is used.
	/// - Moves to a similar rule set once the round's questions are used up.
	/// - On a generation failure, corrects the rule set (and length if needed)
	///   and retries once.
	///
	/// # Errors
	/// Returns `Exhausted` only if the corrected retry fails too.
	pub fn next_question(&mut self, song: &Song, difficulty: Difficulty) -> Result<Question> {
		self.prepare_round(difficulty)?;
		let should_be_valid = self.rng.random_bool(0.5);

		let text = match self.generate(difficulty, should_be_valid) {
			Ok(text) => text,
			Err(err) => {
				warn!(%difficulty, error = %err, "generation failed, retrying with corrected parameters");
				self.correct_round(difficulty);
				self.generate(difficulty, should_be_valid)
					.map_err(|err| Error::Exhausted(format!("{difficulty} question after correction: {err}")))?
			}
		};

		let round = self
			.rounds
			.get_mut(&difficulty)
			.ok_or_else(|| Error::Exhausted(format!("no round for {difficulty}")))?;
		round.asked += 1;

		Ok(Question::new(text, should_be_valid, song.id, difficulty, round.rule_set.clone()))
	}

	/// Makes sure `difficulty` has a round with questions left.
	fn prepare_round(&mut self, difficulty: Difficulty) -> Result<()> {
		let per_round = self.config.questions_per_round;
		match self.rounds.get_mut(&difficulty) {
			Some(round) if per_round > 0 && round.asked >= per_round => {
				round.rule_set = round.rule_set.similar_copy(&mut self.rng);
				round.asked = 0;
				debug!(%difficulty, "next round: {}", round.rule_set.user_facing_description());
			}
			Some(_) => {}
			None => {
				let rule_set = self.fresh_rule_set(difficulty)?;
				debug!(%difficulty, "first round: {}", rule_set.user_facing_description());
				self.rounds.insert(difficulty, Round { rule_set, length: difficulty.string_length(), asked: 0 });
			}
		}
		Ok(())
	}

	/// Builds a rule set inside the difficulty envelope.
	///
	/// Falls back to a widened vocabulary if the configured one is too small.
	fn fresh_rule_set(&mut self, difficulty: Difficulty) -> Result<RuleSet> {
		let envelope = difficulty.envelope();
		let rules: Vec<_> = (0..envelope.rule_count).map(|_| envelope.random_rule(&mut self.rng)).collect();

		match RuleSet::new(rules.clone(), self.vocabulary.clone(), envelope.clone(), &mut self.rng) {
			Ok(rule_set) => Ok(rule_set),
			Err(err) => {
				warn!(%difficulty, error = %err, "widening vocabulary for a fresh rule set");
				let vocabulary = self.vocabulary.widened_to(rules.len() + 2);
				RuleSet::new(rules, vocabulary, envelope, &mut self.rng)
					.map_err(|err| Error::Exhausted(format!("fresh {difficulty} rule set: {err}")))
			}
		}
	}

	fn generate(&mut self, difficulty: Difficulty, should_be_valid: bool) -> Result<String> {
		let round = self
			.rounds
			.get_mut(&difficulty)
			.ok_or_else(|| Error::Exhausted(format!("no round for {difficulty}")))?;
		round.rule_set.generate(round.length, should_be_valid, &mut self.rng)
	}

	/// Replaces the round's rule set with a corrected one that fits its length.
	fn correct_round(&mut self, difficulty: Difficulty) {
		if let Some(round) = self.rounds.get_mut(&difficulty) {
			let corrected = round.rule_set.corrected(round.length, &mut self.rng);
			let minimum = corrected.minimum_length().min(MAX_STRING_LENGTH);
			if round.length < minimum {
				warn!(%difficulty, length = round.length, minimum, "string length raised to fit the rules");
				round.length = minimum;
			}
			round.rule_set = corrected;
		}
	}
}
