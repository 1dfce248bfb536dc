use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use super::rule::{Rule, MAX_DENSITY, MIN_DENSITY};

/// Longest string a rule set will generate.
pub const MAX_STRING_LENGTH: usize = 1024;

/// Difficulty tier of a question.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
	Easy,
	Medium,
	Hard,
}

/// Range of rule parameters a difficulty tier (or a configured rule set) allows.
///
/// `similar_copy` keeps perturbed rules inside this envelope, and the
/// question provider uses it to build fresh rule sets.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ParameterEnvelope {
	/// Number of rules in a fresh rule set
	pub rule_count: usize,
	pub preceding: RangeInclusive<usize>,
	pub following: RangeInclusive<usize>,
	pub density: RangeInclusive<f32>,
	pub stride: RangeInclusive<usize>,
}

impl Difficulty {
	pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

	/// Length of the strings shown at this tier.
	pub fn string_length(&self) -> usize {
		match self {
			Difficulty::Easy => 10,
			Difficulty::Medium => 15,
			Difficulty::Hard => 20,
		}
	}

	/// Rule parameters allowed at this tier.
	///
	/// Easier tiers use short patterns that occur often; harder tiers use
	/// longer, sparser patterns and two rules at once.
	pub fn envelope(&self) -> ParameterEnvelope {
		match self {
			Difficulty::Easy => ParameterEnvelope {
				rule_count: 1,
				preceding: 1..=1,
				following: 1..=1,
				density: 0.30..=0.45,
				stride: 2..=3,
			},
			Difficulty::Medium => ParameterEnvelope {
				rule_count: 1,
				preceding: 1..=2,
				following: 1..=2,
				density: 0.20..=0.40,
				stride: 3..=5,
			},
			Difficulty::Hard => ParameterEnvelope {
				rule_count: 2,
				preceding: 1..=3,
				following: 1..=2,
				density: 0.10..=0.30,
				stride: 4..=6,
			},
		}
	}
}

impl fmt::Display for Difficulty {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Difficulty::Easy => "easy",
			Difficulty::Medium => "medium",
			Difficulty::Hard => "hard",
		};
		f.write_str(name)
	}
}

impl FromStr for Difficulty {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		match s.trim().to_lowercase().as_str() {
			"easy" => Ok(Difficulty::Easy),
			"medium" => Ok(Difficulty::Medium),
			"hard" => Ok(Difficulty::Hard),
			other => Err(Error::InvalidParameter(format!("unknown difficulty '{other}'"))),
		}
	}
}

impl ParameterEnvelope {
	/// Envelope covering the whole valid domain, for rule sets configured by hand.
	///
	/// Shapes are pinned to the given rules' bounds so that `clamp_rule`
	/// never changes a shape.
	pub fn covering(rules: &[Rule]) -> Self {
		let bounds = |f: fn(&Rule) -> usize| {
			let min = rules.iter().map(f).min().unwrap_or(1);
			let max = rules.iter().map(f).max().unwrap_or(1);
			min..=max
		};
		let stride = bounds(Rule::stride);
		Self {
			rule_count: rules.len().max(1),
			preceding: bounds(Rule::preceding_count),
			following: bounds(Rule::following_count),
			density: MIN_DENSITY..=MAX_DENSITY,
			stride: 1..=(*stride.end()).max(1).saturating_mul(2),
		}
	}

	/// Draws a rule uniformly inside the envelope.
	pub fn random_rule<R: Rng + ?Sized>(&self, rng: &mut R) -> Rule {
		let preceding = rng.random_range(self.preceding.clone());
		let following = rng.random_range(self.following.clone());
		let (low, high) = self.density_bounds();
		let density = if low < high { rng.random_range(low..=high) } else { low };
		let stride = rng.random_range(self.stride.clone());
		Rule::clamped(preceding, following, density, stride)
	}

	/// Moves every parameter of `rule` into the envelope.
	pub fn clamp_rule(&self, rule: &Rule) -> Rule {
		let (low, high) = self.density_bounds();
		Rule::clamped(
			rule.preceding_count().clamp(*self.preceding.start(), *self.preceding.end()),
			rule.following_count().clamp(*self.following.start(), *self.following.end()),
			rule.density().clamp(low, high),
			rule.stride().clamp(*self.stride.start(), *self.stride.end()),
		)
	}

	/// Clamps density and stride only, keeping the shape of `rule`.
	pub(crate) fn clamp_tuning(&self, rule: &Rule, density: f32, stride: usize) -> Rule {
		let (low, high) = self.density_bounds();
		let density = if density.is_nan() { low } else { density.clamp(low, high) };
		rule.with_tuning(density, stride.clamp(*self.stride.start(), *self.stride.end()))
	}

	/// Density range intersected with the valid domain.
	fn density_bounds(&self) -> (f32, f32) {
		let low = self.density.start().clamp(MIN_DENSITY, MAX_DENSITY);
		let high = self.density.end().clamp(low, MAX_DENSITY);
		(low, high)
	}
}
