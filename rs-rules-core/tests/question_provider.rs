use rs_rules_core::{Difficulty, Error, ProviderConfig, QuestionProvider, Rule, RuleSet, SongManifest, Vocabulary};
use rs_rules_core::ParameterEnvelope;
use rand::SeedableRng;
use rand::rngs::StdRng;

const MANIFEST: &str = include_str!("../../data/songs.json");

fn provider(seed: u64) -> QuestionProvider {
	let config = ProviderConfig { seed: Some(seed), ..ProviderConfig::default() };
	QuestionProvider::new(config).unwrap()
}

#[test]
fn next_question_never_fails() {
	let manifest = SongManifest::from_json(MANIFEST).unwrap();
	let mut provider = provider(2017);

	for difficulty in Difficulty::ALL {
		for song in manifest.songs() {
			let mut valid = 0;
			for _ in 0..1000 {
				let question = provider.next_question(song, difficulty).unwrap();
				assert_eq!(question.text.chars().count(), difficulty.string_length());
				assert_eq!(question.length, difficulty.string_length());
				assert_eq!(
					question.rule_set().is_valid(&question.text),
					question.is_valid,
					"{} / {}",
					question.text,
					question.debug_full_history()
				);
				assert_eq!(question.song_id, song.id);
				if question.is_valid {
					valid += 1;
				}
			}
			// Fair coin: both answers must show up
			assert!(valid > 350 && valid < 650, "{valid} valid questions out of 1000");
		}
	}
}

#[test]
fn valid_and_invalid_strings_share_surface_structure() {
	let manifest = SongManifest::from_json(MANIFEST).unwrap();
	let mut provider = provider(9);
	let song = &manifest.songs()[0];

	for _ in 0..500 {
		let question = provider.next_question(song, Difficulty::Hard).unwrap();
		let verdict = question.rule_set().evaluate(&question.text);
		// Every rule is applied at least once in both cases
		assert!(verdict.occurrences >= question.rule_set().rules().len());
		assert_eq!(verdict.violations.len(), usize::from(!question.is_valid));
	}
}

#[test]
fn boundary_rejection() {
	let mut rng = StdRng::seed_from_u64(1);
	let rules = vec![Rule::new(3, 2, 0.25, 2).unwrap()];
	let envelope = ParameterEnvelope::covering(&rules);
	let mut rule_set = RuleSet::new(rules, Vocabulary::alphabet(8).unwrap(), envelope, &mut rng).unwrap();

	for should_be_valid in [true, false] {
		let err = rule_set.generate(4, should_be_valid, &mut rng).unwrap_err();
		assert!(matches!(err, Error::LengthTooShort { length: 4, minimum: 5 }));
	}
	assert!(rule_set.history().is_empty());
}

#[test]
fn invalid_rule_parameters_rejected() {
	for (preceding, following, density, stride) in [
		(0, 1, 0.2, 1),
		(1, 0, 0.2, 1),
		(1, 1, 0.5, 1),
		(1, 1, 0.0, 1),
		(1, 1, 0.2, 0),
		(usize::MAX, 1, 0.2, 1),
		(1, usize::MAX, 0.2, 1),
	] {
		let err = Rule::new(preceding, following, density, stride).unwrap_err();
		assert!(matches!(err, Error::InvalidParameter(_)));
	}
}

#[test]
fn identical_rules_give_identical_descriptions() {
	let rules = vec![Rule::new(2, 1, 0.3, 3).unwrap(), Rule::new(1, 2, 0.15, 5).unwrap()];
	let envelope = ParameterEnvelope::covering(&rules);
	let mut a = RuleSet::new(rules.clone(), Vocabulary::alphabet(8).unwrap(), envelope.clone(), &mut StdRng::seed_from_u64(1)).unwrap();
	let b = RuleSet::new(rules, Vocabulary::alphabet(6).unwrap(), envelope, &mut StdRng::seed_from_u64(2)).unwrap();

	assert_eq!(a.user_facing_description(), b.user_facing_description());
	a.generate(12, false, &mut StdRng::seed_from_u64(3)).unwrap();
	assert_eq!(a.user_facing_description(), b.user_facing_description());
}

#[test]
fn rounds_stay_inside_the_difficulty_envelope() {
	let manifest = SongManifest::from_json(MANIFEST).unwrap();
	let mut provider = provider(77);
	let song = &manifest.songs()[1];

	for difficulty in Difficulty::ALL {
		let envelope = difficulty.envelope();
		for _ in 0..300 {
			provider.next_question(song, difficulty).unwrap();
			let rule_set = provider.current_rule_set(difficulty).unwrap();
			assert_eq!(rule_set.rules().len(), envelope.rule_count);
			for bound in rule_set.rules() {
				let rule = bound.rule();
				assert!(envelope.preceding.contains(&rule.preceding_count()));
				assert!(envelope.following.contains(&rule.following_count()));
				assert!(envelope.density.contains(&rule.density()));
				assert!(envelope.stride.contains(&rule.stride()));
			}
		}
	}
}
