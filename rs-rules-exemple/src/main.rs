use rand::SeedableRng;
use rand::rngs::StdRng;
use rs_rules_core::{Difficulty, ParameterEnvelope, ProviderConfig, QuestionProvider, Rule, RuleSet, SongManifest, Vocabulary};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG=debug to see every generation and round change
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    // Load the song list once; it is passed around explicitly afterwards
    let manifest = SongManifest::load("./data/songs.json")?;

    // Fixed seed so the walk-through prints the same questions every run
    let config = ProviderConfig { seed: Some(2017), ..ProviderConfig::default() };
    let mut provider = QuestionProvider::new(config)?;

    // Three questions per difficulty, then the round moves to a similar rule set
    let song = &manifest.songs()[0];
    for difficulty in Difficulty::ALL {
        println!("== {} ({} symbols)", difficulty, difficulty.string_length());
        for i in 0..4 {
            let question = provider.next_question(song, difficulty)?;
            println!(
                "Question {}: {} -> {}",
                i + 1,
                question.text,
                if question.is_valid { "valid" } else { "invalid" }
            );
            println!("  hint: {}", question.description);
        }
    }

    // A rule built by hand, as the setup screen does
    let rule = Rule::new(3, 2, 0.3, 4)?;
    let rules = vec![rule];
    let envelope = ParameterEnvelope::covering(&rules);
    let mut rng = StdRng::seed_from_u64(7);
    let mut rule_set = RuleSet::new(rules, Vocabulary::alphabet(6)?, envelope, &mut rng)?;

    // Too short for a 3-symbol antecedent and a 2-symbol consequent
    match rule_set.generate(4, true, &mut rng) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("Length 4 rejected: {e}"),
    }

    // Invalid density is rejected before a rule exists
    match Rule::new(1, 1, 0.5, 1) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("Density 0.5 rejected: {e}"),
    }

    let text = rule_set.generate(16, false, &mut rng)?;
    println!("Invalid string: {} (oracle says valid: {})", text, rule_set.is_valid(&text));
    println!("Trace:\n{}", rule_set.debug_full_history());

    // The setup screen can hand the rule set to the provider for a tier
    provider.install_rule_set(Difficulty::Easy, rule_set.similar_copy(&mut rng), 12)?;
    let question = provider.next_question(song, Difficulty::Easy)?;
    println!("Installed rule set: {} -> {}", question.text, question.is_valid);

    Ok(())
}
