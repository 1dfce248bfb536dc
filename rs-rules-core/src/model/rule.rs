use serde::Serialize;

use crate::error::{Error, Result};

/// Lowest density `Rule::clamped` will produce.
pub const MIN_DENSITY: f32 = 0.01;

/// Highest density `Rule::clamped` will produce.
///
/// Densities must stay strictly below 0.5.
pub const MAX_DENSITY: f32 = 0.49;

/// Longest antecedent or consequent a rule may have.
pub const MAX_PATTERN_LEN: usize = 16;

/// A single statistical dependency between two fixed-length patterns.
///
/// A `Rule` only describes the shape of the dependency. The concrete
/// antecedent and consequent symbols are chosen when the rule is bound
/// inside a `RuleSet`.
///
/// # Invariants
/// - `1 <= preceding_count <= MAX_PATTERN_LEN`
/// - `1 <= following_count <= MAX_PATTERN_LEN`
/// - `0 < density < 0.5`
/// - `stride >= 1`
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct Rule {
	/// Length of the antecedent pattern
	preceding_count: usize,

	/// Length of the consequent pattern
	following_count: usize,

	/// Probability that an eligible position becomes an antecedent occurrence
	density: f32,

	/// Minimum distance between two applications of this rule (start to start)
	stride: usize,
}

impl Rule {
	/// Creates a rule after checking every parameter.
	///
	/// # Errors
	/// Returns `InvalidParameter` when any invariant is violated.
	pub fn new(preceding_count: usize, following_count: usize, density: f32, stride: usize) -> Result<Self> {
		if !(1..=MAX_PATTERN_LEN).contains(&preceding_count) {
			return Err(Error::InvalidParameter(format!(
				"preceding count must be between 1 and {MAX_PATTERN_LEN}, got {preceding_count}"
			)));
		}
		if !(1..=MAX_PATTERN_LEN).contains(&following_count) {
			return Err(Error::InvalidParameter(format!(
				"following count must be between 1 and {MAX_PATTERN_LEN}, got {following_count}"
			)));
		}
		if !(density > 0.0 && density < 0.5) {
			return Err(Error::InvalidParameter(format!("density must be in (0, 0.5), got {density}")));
		}
		if stride == 0 {
			return Err(Error::InvalidParameter("stride must be > 0".to_owned()));
		}
		Ok(Self { preceding_count, following_count, density, stride })
	}

	/// Builds the closest valid rule to the given parameters.
	///
	/// Counts are clamped into `1..=MAX_PATTERN_LEN`, stride is raised to at
	/// least 1, density is clamped into
	/// `[MIN_DENSITY, MAX_DENSITY]` (a NaN density becomes `MIN_DENSITY`).
	pub fn clamped(preceding_count: usize, following_count: usize, density: f32, stride: usize) -> Self {
		let density = if density.is_nan() { MIN_DENSITY } else { density.clamp(MIN_DENSITY, MAX_DENSITY) };
		Self {
			preceding_count: preceding_count.clamp(1, MAX_PATTERN_LEN),
			following_count: following_count.clamp(1, MAX_PATTERN_LEN),
			density,
			stride: stride.max(1),
		}
	}

	pub fn preceding_count(&self) -> usize {
		self.preceding_count
	}

	pub fn following_count(&self) -> usize {
		self.following_count
	}

	pub fn density(&self) -> f32 {
		self.density
	}

	pub fn stride(&self) -> usize {
		self.stride
	}

	/// Number of symbols one application of the rule occupies.
	pub fn block_len(&self) -> usize {
		self.preceding_count.saturating_add(self.following_count)
	}

	/// Same shape with new density and stride, clamped into the valid domain.
	pub(crate) fn with_tuning(&self, density: f32, stride: usize) -> Self {
		Self::clamped(self.preceding_count, self.following_count, density, stride)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_valid_rule() {
		let rule = Rule::new(3, 2, 0.25, 4).unwrap();
		assert_eq!(rule.preceding_count(), 3);
		assert_eq!(rule.following_count(), 2);
		assert_eq!(rule.stride(), 4);
		assert_eq!(rule.block_len(), 5);
	}

	#[test]
	fn test_zero_counts_rejected() {
		assert!(matches!(Rule::new(0, 1, 0.2, 1), Err(Error::InvalidParameter(_))));
		assert!(matches!(Rule::new(1, 0, 0.2, 1), Err(Error::InvalidParameter(_))));
	}

	#[test]
	fn test_density_bounds_rejected() {
		for density in [0.0, 0.5, 0.75, -0.1, f32::NAN] {
			assert!(Rule::new(1, 1, density, 1).is_err(), "density {density} accepted");
		}
	}

	#[test]
	fn test_oversized_patterns_rejected() {
		assert!(matches!(Rule::new(usize::MAX, 1, 0.3, 1), Err(Error::InvalidParameter(_))));
		assert!(matches!(Rule::new(1, MAX_PATTERN_LEN + 1, 0.3, 1), Err(Error::InvalidParameter(_))));
		let longest = Rule::new(MAX_PATTERN_LEN, MAX_PATTERN_LEN, 0.3, 1).unwrap();
		assert_eq!(longest.block_len(), 2 * MAX_PATTERN_LEN);
	}

	#[test]
	fn test_clamped_caps_pattern_length() {
		let rule = Rule::clamped(usize::MAX, usize::MAX, 0.3, usize::MAX);
		assert_eq!(rule.preceding_count(), MAX_PATTERN_LEN);
		assert_eq!(rule.following_count(), MAX_PATTERN_LEN);
		assert_eq!(rule.stride(), usize::MAX);
	}

	#[test]
	fn test_zero_stride_rejected() {
		assert!(matches!(Rule::new(1, 1, 0.2, 0), Err(Error::InvalidParameter(_))));
	}

	#[test]
	fn test_clamped_fixes_everything() {
		let rule = Rule::clamped(0, 0, 0.9, 0);
		assert_eq!(rule.preceding_count(), 1);
		assert_eq!(rule.following_count(), 1);
		assert_eq!(rule.density(), MAX_DENSITY);
		assert_eq!(rule.stride(), 1);
		assert!(Rule::new(1, 1, rule.density(), 1).is_ok());

		assert_eq!(Rule::clamped(1, 1, f32::NAN, 1).density(), MIN_DENSITY);
		assert_eq!(Rule::clamped(1, 1, -3.0, 1).density(), MIN_DENSITY);
	}
}
