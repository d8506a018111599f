//! Markov word-chain engine.
//!
//! This module provides:
//! - The trained n-gram table (`NGramModel`) and its successor sets (`State`)
//! - The training entry point with diagnostics (`Trainer`)
//! - The text generation state machine (`Generator`)
//! - Per-call generation options (`GenerationInput`)
//! - The pluggable word similarity used for context-biased generation

/// Stateful walker producing text from a shared model.
///
/// Handles seeding, sentence completion, reseeding on unknown keys and
/// output cleanup.
pub mod generator;

/// Options of a single generation call.
pub mod generation_input;

/// Word n-gram table (`n >= 2`).
///
/// Built from a corpus in one pass, immutable afterwards, serialized with
/// `postcard`.
pub mod ngram_model;

/// Word relatedness oracle and its character-trigram implementation.
pub mod similarity;

/// Successor set of a single key.
pub mod state;

/// Corpus-to-store training job and model statistics.
pub mod trainer;
