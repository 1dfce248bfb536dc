use std::collections::HashSet;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use super::difficulty::{ParameterEnvelope, MAX_STRING_LENGTH};
use super::history::{Action, Decision};
use super::rule::Rule;
use super::vocabulary::Vocabulary;

/// Largest step `similar_copy` applies to a density.
const DENSITY_NUDGE: f32 = 0.05;

/// A rule bound to concrete antecedent and consequent patterns.
///
/// # Invariants
/// - `antecedent.len() == rule.preceding_count()`
/// - `consequent.len() == rule.following_count()`
/// - The first antecedent symbol (the trigger) appears nowhere else in the
///   owning rule set, and never as filler.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct BoundRule {
	rule: Rule,
	antecedent: Vec<char>,
	consequent: Vec<char>,
}

impl BoundRule {
	/// Binds explicit patterns to a rule.
	///
	/// # Errors
	/// Returns `InvalidParameter` if a pattern length disagrees with the rule.
	pub fn new(rule: Rule, antecedent: Vec<char>, consequent: Vec<char>) -> Result<Self> {
		if antecedent.len() != rule.preceding_count() || consequent.len() != rule.following_count() {
			return Err(Error::InvalidParameter(format!(
				"patterns of length {}/{} do not match rule shape {}/{}",
				antecedent.len(),
				consequent.len(),
				rule.preceding_count(),
				rule.following_count()
			)));
		}
		Ok(Self { rule, antecedent, consequent })
	}

	pub fn rule(&self) -> &Rule {
		&self.rule
	}

	pub fn antecedent(&self) -> &[char] {
		&self.antecedent
	}

	pub fn consequent(&self) -> &[char] {
		&self.consequent
	}

	fn trigger(&self) -> char {
		self.antecedent[0]
	}
}

/// Result of judging a string against a rule set.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Verdict {
	/// Judged antecedent occurrences, across all rules
	pub occurrences: usize,
	/// `(rule index, position)` of every occurrence not followed by its consequent
	pub violations: Vec<(usize, usize)>,
}

impl Verdict {
	pub fn is_valid(&self) -> bool {
		self.violations.is_empty()
	}
}

/// One planned step of the left-to-right walk.
enum Step {
	Filler { position: usize, len: usize },
	Apply { position: usize, rule: usize, forced: bool },
}

/// Ordered collection of bound rules that generates and judges strings.
///
/// A string is valid when every antecedent occurrence with room for a
/// consequent is immediately followed by that consequent, for every rule.
///
/// # Responsibilities
/// - Generate strings of an exact length that satisfy or violate the rules
/// - Judge arbitrary strings (`evaluate`, `is_valid`)
/// - Render a description of the rules for the participant
/// - Keep a trace of the last generation
/// - Derive a perturbed copy for the next round
#[derive(Serialize, Clone, Debug)]
pub struct RuleSet {
	rules: Vec<BoundRule>,
	vocabulary: Vocabulary,
	envelope: ParameterEnvelope,
	/// Vocabulary minus every trigger, in vocabulary order
	free_symbols: Vec<char>,
	/// Decisions of the most recent `generate` call
	history: Vec<Decision>,
}

impl RuleSet {
	/// Creates a rule set, drawing fresh patterns for every rule.
	///
	/// Each rule gets its own trigger symbol; the remaining antecedent and
	/// consequent symbols are drawn from the free symbols.
	///
	/// # Errors
	/// - `InvalidParameter` if `rules` is empty
	/// - `VocabularyTooSmall` if there are fewer than `rules.len() + 1` symbols
	pub fn new<R: Rng + ?Sized>(
		rules: Vec<Rule>,
		vocabulary: Vocabulary,
		envelope: ParameterEnvelope,
		rng: &mut R,
	) -> Result<Self> {
		if rules.is_empty() {
			return Err(Error::InvalidParameter("a rule set needs at least one rule".to_owned()));
		}
		let required = rules.len() + 1;
		if vocabulary.len() < required {
			return Err(Error::VocabularyTooSmall { size: vocabulary.len(), required });
		}
		Ok(Self::bind(rules, vocabulary, envelope, rng))
	}

	/// Creates a rule set from already bound rules.
	///
	/// # Errors
	/// - `InvalidParameter` if `rules` is empty, a symbol is outside the
	///   vocabulary, or a trigger appears anywhere but at its own position
	/// - `VocabularyTooSmall` if no free symbol is left for filler
	pub fn from_bound(rules: Vec<BoundRule>, vocabulary: Vocabulary, envelope: ParameterEnvelope) -> Result<Self> {
		if rules.is_empty() {
			return Err(Error::InvalidParameter("a rule set needs at least one rule".to_owned()));
		}
		let triggers: HashSet<char> = rules.iter().map(BoundRule::trigger).collect();
		if triggers.len() != rules.len() {
			return Err(Error::InvalidParameter("two rules share a trigger symbol".to_owned()));
		}
		for bound in &rules {
			let symbols = bound.antecedent.iter().skip(1).chain(bound.consequent.iter());
			for symbol in bound.antecedent.iter().take(1).chain(symbols.clone()) {
				if !vocabulary.contains(*symbol) {
					return Err(Error::InvalidParameter(format!("symbol '{symbol}' is not in the vocabulary")));
				}
			}
			if let Some(symbol) = symbols.into_iter().find(|s| triggers.contains(s)) {
				return Err(Error::InvalidParameter(format!("trigger '{symbol}' reused inside a pattern")));
			}
		}
		let free_symbols: Vec<char> = vocabulary.symbols().iter().copied().filter(|s| !triggers.contains(s)).collect();
		if free_symbols.is_empty() {
			return Err(Error::VocabularyTooSmall { size: vocabulary.len(), required: rules.len() + 1 });
		}
		Ok(Self { rules, vocabulary, envelope, free_symbols, history: Vec::new() })
	}

	/// Binds patterns, assuming the vocabulary holds at least `rules.len() + 1` symbols.
	fn bind<R: Rng + ?Sized>(rules: Vec<Rule>, vocabulary: Vocabulary, envelope: ParameterEnvelope, rng: &mut R) -> Self {
		let triggers: Vec<char> = vocabulary.symbols().choose_multiple(rng, rules.len()).copied().collect();
		let free_symbols: Vec<char> = vocabulary.symbols().iter().copied().filter(|s| !triggers.contains(s)).collect();

		let rules = rules
			.into_iter()
			.zip(triggers)
			.map(|(rule, trigger)| {
				let mut antecedent = Vec::with_capacity(rule.preceding_count());
				antecedent.push(trigger);
				antecedent.extend((1..rule.preceding_count()).map(|_| Self::pick(&free_symbols, rng)));
				let consequent = (0..rule.following_count()).map(|_| Self::pick(&free_symbols, rng)).collect();
				BoundRule { rule, antecedent, consequent }
			})
			.collect();

		Self { rules, vocabulary, envelope, free_symbols, history: Vec::new() }
	}

	/// Uniform pick from a non-empty symbol list.
	fn pick<R: Rng + ?Sized>(symbols: &[char], rng: &mut R) -> char {
		symbols[rng.random_range(0..symbols.len())]
	}

	pub fn rules(&self) -> &[BoundRule] {
		&self.rules
	}

	pub fn vocabulary(&self) -> &Vocabulary {
		&self.vocabulary
	}

	pub fn envelope(&self) -> &ParameterEnvelope {
		&self.envelope
	}

	/// Shortest string that can hold one application of every rule.
	pub fn minimum_length(&self) -> usize {
		total_block_len(self.rules.iter().map(|b| &b.rule))
	}

	/// Generates a string of exactly `length` symbols.
	///
	/// # Parameters
	/// - `length`: Number of symbols to produce.
	/// - `should_be_valid`: Whether the string must satisfy every rule.
	/// - `rng`: Source of randomness.
	///
	/// # Behavior
	/// - Walks the string left to right. At each position a rule whose block
	///   fits and whose previous application is at least `stride` away is
	///   applied with probability `density`.
	/// - Room is reserved so that every rule is applied at least once; a rule
	///   is forced when its reserved room is reached.
	/// - Otherwise a window of filler is drawn from the free symbols.
	/// - For an invalid string, exactly one application, chosen uniformly,
	///   gets one consequent symbol replaced.
	/// - The trace of the previous call is discarded and every step is recorded.
	///
	/// # Errors
	/// - `InvalidParameter` if `length > MAX_STRING_LENGTH`
	/// - `LengthTooShort` if `length < minimum_length()`
	/// - `VocabularyTooSmall` if an invalid string is requested and fewer than
	///   two free symbols exist
	pub fn generate<R: Rng + ?Sized>(&mut self, length: usize, should_be_valid: bool, rng: &mut R) -> Result<String> {
		if length > MAX_STRING_LENGTH {
			return Err(Error::InvalidParameter(format!(
				"string length must be at most {MAX_STRING_LENGTH}, got {length}"
			)));
		}
		let minimum = self.minimum_length();
		if length < minimum {
			return Err(Error::LengthTooShort { length, minimum });
		}
		if !should_be_valid && self.free_symbols.len() < 2 {
			return Err(Error::VocabularyTooSmall { size: self.vocabulary.len(), required: self.rules.len() + 2 });
		}

		self.history.clear();
		let plan = self.plan(length, rng);

		let violated = if should_be_valid {
			None
		} else {
			let applications: Vec<usize> = plan
				.iter()
				.enumerate()
				.filter_map(|(index, step)| matches!(step, Step::Apply { .. }).then_some(index))
				.collect();
			// Every rule is applied at least once, so this is never empty
			Some(*applications.choose(rng).ok_or_else(|| {
				Error::InvalidParameter("no antecedent could be placed".to_owned())
			})?)
		};

		let mut text = String::with_capacity(length);
		for (index, step) in plan.into_iter().enumerate() {
			let decision = match step {
				Step::Filler { position, len } => Decision {
					position,
					action: Action::Filler,
					symbols: (0..len).map(|_| Self::pick(&self.free_symbols, rng)).collect(),
				},
				Step::Apply { position, rule, forced } => {
					let bound = &self.rules[rule];
					let honored = violated != Some(index);
					let mut consequent = bound.consequent.clone();
					if !honored {
						self.break_consequent(&mut consequent, rng);
					}
					Decision {
						position,
						action: Action::Applied { rule, forced, honored },
						symbols: bound.antecedent.iter().chain(consequent.iter()).collect(),
					}
				}
			};
			text.push_str(&decision.symbols);
			self.history.push(decision);
		}

		debug!(length, should_be_valid, steps = self.history.len(), "generated {}", text);
		Ok(text)
	}

	/// Chooses where rules are applied, without drawing any symbol.
	///
	/// Assumes `length >= minimum_length()`.
	fn plan<R: Rng + ?Sized>(&self, length: usize, rng: &mut R) -> Vec<Step> {
		let window = self.rules.iter().map(|b| b.rule.preceding_count()).min().unwrap_or(1);
		let mut last_start: Vec<Option<usize>> = vec![None; self.rules.len()];
		// Room still owed to rules that were never applied
		let mut reserved = self.minimum_length();
		let mut cursor = 0;
		let mut steps = Vec::new();

		while cursor < length {
			let slack = length - cursor - reserved;

			let mut chosen = None;
			for (index, bound) in self.rules.iter().enumerate() {
				let rule = bound.rule;
				match last_start[index] {
					None if slack == 0 => {
						chosen = Some((index, true));
						break;
					}
					None => {
						if rng.random_bool(f64::from(rule.density())) {
							chosen = Some((index, false));
							break;
						}
					}
					Some(start) => {
						let spaced = cursor - start >= rule.stride();
						if spaced && rule.block_len() <= slack && rng.random_bool(f64::from(rule.density())) {
							chosen = Some((index, false));
							break;
						}
					}
				}
			}

			match chosen {
				Some((index, forced)) => {
					let block = self.rules[index].rule.block_len();
					if last_start[index].is_none() {
						reserved -= block;
					}
					last_start[index] = Some(cursor);
					steps.push(Step::Apply { position: cursor, rule: index, forced });
					cursor += block;
				}
				None => {
					// slack > 0 here, otherwise an unapplied rule would have been forced
					let len = window.min(slack);
					steps.push(Step::Filler { position: cursor, len });
					cursor += len;
				}
			}
		}

		steps
	}

	/// Replaces one symbol of `consequent` by a different free symbol.
	///
	/// Requires at least two free symbols.
	fn break_consequent<R: Rng + ?Sized>(&self, consequent: &mut [char], rng: &mut R) {
		let count = self.free_symbols.len();
		let index = rng.random_range(0..consequent.len());
		let current = self.free_symbols.iter().position(|s| *s == consequent[index]).unwrap_or(0);
		let offset = rng.random_range(1..count);
		consequent[index] = self.free_symbols[(current + offset) % count];
	}

	/// Judges a string against every rule.
	pub fn evaluate(&self, text: &str) -> Verdict {
		let symbols: Vec<char> = text.chars().collect();
		let mut verdict = Verdict::default();

		for (index, bound) in self.rules.iter().enumerate() {
			let preceding = bound.antecedent.len();
			let block = bound.rule.block_len();
			if symbols.len() < block {
				continue;
			}
			for position in 0..=symbols.len() - block {
				if symbols[position..position + preceding] != bound.antecedent[..] {
					continue;
				}
				verdict.occurrences += 1;
				if symbols[position + preceding..position + block] != bound.consequent[..] {
					verdict.violations.push((index, position));
				}
			}
		}

		verdict
	}

	/// Whether `text` satisfies every rule.
	pub fn is_valid(&self, text: &str) -> bool {
		self.evaluate(text).is_valid()
	}

	/// Human-readable summary of the rules.
	///
	/// Depends only on the rule parameters, never on generated strings.
	pub fn user_facing_description(&self) -> String {
		let describe = |rule: &Rule| {
			format!(
				"a {}-symbol pattern is always followed by the same {}-symbol pattern; it shows up about {:.0}% of the time, at least {} {} apart.",
				rule.preceding_count(),
				rule.following_count(),
				rule.density() * 100.0,
				rule.stride(),
				if rule.stride() == 1 { "symbol" } else { "symbols" }
			)
		};

		match self.rules.as_slice() {
			[single] => Self::capitalize(&describe(&single.rule)),
			rules => rules
				.iter()
				.enumerate()
				.map(|(index, bound)| format!("Rule {}: {}", index + 1, describe(&bound.rule)))
				.collect::<Vec<_>>()
				.join(" "),
		}
	}

	fn capitalize(sentence: &str) -> String {
		let mut chars = sentence.chars();
		match chars.next() {
			Some(first) => first.to_uppercase().chain(chars).collect(),
			None => String::new(),
		}
	}

	/// Decisions of the most recent `generate` call.
	pub fn history(&self) -> &[Decision] {
		&self.history
	}

	/// The trace of the most recent `generate` call, one decision per line.
	pub fn debug_full_history(&self) -> String {
		self.history.iter().map(Decision::to_string).collect::<Vec<_>>().join("\n")
	}

	/// Derives the rule set for the next round.
	///
	/// Keeps every rule's shape, nudges density and stride by a small random
	/// step, clamps them into the envelope and binds fresh patterns.
	/// The trace starts empty.
	pub fn similar_copy<R: Rng + ?Sized>(&self, rng: &mut R) -> RuleSet {
		let rules = self
			.rules
			.iter()
			.map(|bound| {
				let rule = bound.rule;
				let density = rule.density() + rng.random_range(-DENSITY_NUDGE..=DENSITY_NUDGE);
				let stride = match rng.random_range(0..3u8) {
					0 => rule.stride().saturating_sub(1),
					1 => rule.stride(),
					_ => rule.stride().saturating_add(1),
				};
				self.envelope.clamp_tuning(&rule, density, stride)
			})
			.collect();
		Self::bind(rules, self.vocabulary.clone(), self.envelope.clone(), rng)
	}

	/// Builds the closest rule set that can generate `length` symbols in
	/// both validity modes.
	///
	/// Rules are clamped into the envelope, the longest patterns are
	/// shortened until every block fits, trailing rules are dropped if even
	/// single-symbol patterns do not fit, and the vocabulary is widened to
	/// leave two free symbols. When widening cannot supply enough symbols,
	/// trailing rules are dropped as well.
	pub fn corrected<R: Rng + ?Sized>(&self, length: usize, rng: &mut R) -> RuleSet {
		let mut rules: Vec<Rule> = self.rules.iter().map(|b| self.envelope.clamp_rule(&b.rule)).collect();

		while total_block_len(rules.iter()) > length.max(2) {
			let longest = rules
				.iter()
				.enumerate()
				.filter(|(_, rule)| rule.block_len() > 2)
				.max_by_key(|(_, rule)| rule.block_len())
				.map(|(index, _)| index);
			match longest {
				Some(index) => {
					let rule = rules[index];
					let (preceding, following) = if rule.preceding_count() >= rule.following_count() {
						(rule.preceding_count() - 1, rule.following_count())
					} else {
						(rule.preceding_count(), rule.following_count() - 1)
					};
					rules[index] = Rule::clamped(preceding, following, rule.density(), rule.stride());
				}
				None if rules.len() > 1 => {
					rules.pop();
				}
				None => break,
			}
		}

		let vocabulary = self.vocabulary.widened_to(rules.len() + 2);
		// Two symbols stay free, one for filler and one to break a consequent
		rules.truncate(vocabulary.len().saturating_sub(2).max(1));
		Self::bind(rules, vocabulary, self.envelope.clone(), rng)
	}
}

/// Sum of block lengths, saturating instead of overflowing.
fn total_block_len<'a>(rules: impl Iterator<Item = &'a Rule>) -> usize {
	rules.fold(0, |total, rule| total.saturating_add(rule.block_len()))
}
