//! Rule-based symbol string generation for a perceptual-learning experiment.
//!
//! A participant sees a string of symbols and judges whether it follows a
//! hidden rule ("pattern X is always followed by pattern Y"). This crate
//! provides:
//! - Rules, rule sets and the string generator
//! - An independent validity oracle
//! - Difficulty tiers and a question provider with round rotation
//! - The song manifest questions are attached to
//!
//! Generation takes its randomness as an explicit `Rng`, so seeded runs are
//! reproducible.

/// Provider configuration (defaults and environment overrides).
pub mod config;

/// Error type and `Result` alias.
pub mod error;

/// Rules, rule sets, difficulties and questions.
pub mod model;

/// Song manifest loading.
pub mod song;

pub use config::ProviderConfig;
pub use error::{Error, Result};
pub use model::difficulty::{Difficulty, ParameterEnvelope};
pub use model::provider::QuestionProvider;
pub use model::question::Question;
pub use model::rule::Rule;
pub use model::rule_set::{BoundRule, RuleSet, Verdict};
pub use model::vocabulary::Vocabulary;
pub use song::{Song, SongManifest};
