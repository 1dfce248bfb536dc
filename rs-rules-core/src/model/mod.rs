//! Rule-based string generation and judging.
//!
//! This module provides:
//! - Rule shapes (`Rule`) and the symbols they are drawn from (`Vocabulary`)
//! - Rule sets binding rules to patterns, generating and judging strings (`RuleSet`)
//! - Difficulty tiers and their parameter envelopes (`Difficulty`)
//! - Questions and the provider that produces them (`Question`, `QuestionProvider`)

/// Difficulty tiers, string lengths and rule parameter envelopes.
pub mod difficulty;

/// Trace entries recorded while generating a string.
pub mod history;

/// Question provider keeping one round per difficulty.
///
/// Handles round rotation, the validity coin flip and recovery from
/// misconfigured rule sets.
pub mod provider;

/// Generated question with its ground truth.
pub mod question;

/// Single rule shape (pattern lengths, density, stride).
pub mod rule;

/// Rule set: pattern binding, generation, validity oracle, description
/// and round-to-round derivation.
pub mod rule_set;

/// Symbol alphabet.
pub mod vocabulary;
