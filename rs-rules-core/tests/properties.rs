use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rs_rules_core::{Error, ParameterEnvelope, Rule, RuleSet, Vocabulary};

/// Strategy for rules inside the valid domain
fn rule_strategy() -> impl Strategy<Value = Rule> {
	(1usize..=4, 1usize..=3, 0.01f32..0.49, 1usize..=6)
		.prop_map(|(preceding, following, density, stride)| Rule::new(preceding, following, density, stride).unwrap())
}

/// Strategy for a rule set, the string length to ask for and a seed
fn scenario_strategy() -> impl Strategy<Value = (Vec<Rule>, usize, usize, u64)> {
	(prop::collection::vec(rule_strategy(), 1..=3), 0usize..=12, 0usize..=24, any::<u64>())
		.prop_map(|(rules, extra_symbols, extra_length, seed)| {
			let vocabulary_size = rules.len() + 2 + extra_symbols;
			let length = rules.iter().map(Rule::block_len).sum::<usize>() + extra_length;
			(rules, vocabulary_size, length, seed)
		})
}

fn build(rules: Vec<Rule>, vocabulary_size: usize, seed: u64) -> (RuleSet, StdRng) {
	let mut rng = StdRng::seed_from_u64(seed);
	let envelope = ParameterEnvelope::covering(&rules);
	let rule_set = RuleSet::new(rules, Vocabulary::alphabet(vocabulary_size).unwrap(), envelope, &mut rng).unwrap();
	(rule_set, rng)
}

proptest! {
	#[test]
	fn generated_validity_matches_request((rules, vocabulary_size, length, seed) in scenario_strategy(), should_be_valid in any::<bool>()) {
		let (mut rule_set, mut rng) = build(rules, vocabulary_size, seed);
		let text = rule_set.generate(length, should_be_valid, &mut rng).unwrap();
		prop_assert_eq!(rule_set.is_valid(&text), should_be_valid);
	}

	#[test]
	fn generated_length_is_exact((rules, vocabulary_size, length, seed) in scenario_strategy(), should_be_valid in any::<bool>()) {
		let (mut rule_set, mut rng) = build(rules, vocabulary_size, seed);
		let text = rule_set.generate(length, should_be_valid, &mut rng).unwrap();
		prop_assert_eq!(text.chars().count(), length);
		prop_assert!(text.chars().all(|c| rule_set.vocabulary().contains(c)));
	}

	#[test]
	fn short_lengths_are_rejected((rules, vocabulary_size, _length, seed) in scenario_strategy(), shortfall in 1usize..=3) {
		let (mut rule_set, mut rng) = build(rules, vocabulary_size, seed);
		let minimum = rule_set.minimum_length();
		let length = minimum.saturating_sub(shortfall);
		let err = rule_set.generate(length, true, &mut rng).unwrap_err();
		prop_assert!(matches!(err, Error::LengthTooShort { .. }), "unexpected error {:?}", err);
	}

	#[test]
	fn description_depends_only_on_rules((rules, vocabulary_size, length, seed) in scenario_strategy()) {
		let (mut first, mut rng) = build(rules.clone(), vocabulary_size, seed);
		let (second, _) = build(rules, vocabulary_size, seed.wrapping_add(1));
		let before = first.user_facing_description();
		first.generate(length, false, &mut rng).unwrap();
		prop_assert_eq!(&before, &first.user_facing_description());
		prop_assert_eq!(before, second.user_facing_description());
	}

	#[test]
	fn similar_copy_stays_in_domain((rules, vocabulary_size, length, seed) in scenario_strategy(), generations in 1usize..=20) {
		let (rule_set, mut rng) = build(rules, vocabulary_size, seed);
		let mut current = rule_set;
		for _ in 0..generations {
			let next = current.similar_copy(&mut rng);
			prop_assert_eq!(next.rules().len(), current.rules().len());
			for (old, new) in current.rules().iter().zip(next.rules()) {
				prop_assert_eq!(old.rule().preceding_count(), new.rule().preceding_count());
				prop_assert_eq!(old.rule().following_count(), new.rule().following_count());
				prop_assert!(new.rule().density() > 0.0 && new.rule().density() < 0.5);
				prop_assert!(new.rule().stride() >= 1);
			}
			current = next;
		}
		let text = current.generate(length, false, &mut rng).unwrap();
		prop_assert!(!current.is_valid(&text));
	}
}
