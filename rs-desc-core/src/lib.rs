//! Markov text generation for fictional video-game store pages.
//!
//! This crate provides:
//! - Word-level n-gram models, their training and their storage
//! - Probabilistic generation with optional seeds, context and sentence rules
//! - A composer assembling titles, descriptions, features, taglines,
//!   developer names, tags and system requirements into one store page
//! - A training pipeline building every field model from a data folder

/// Error type shared by the whole crate.
pub mod error;

/// N-gram models, training and generation.
pub mod model;

/// Persistence of serialized models.
pub mod store;

/// Static inputs of the composer (templates, tags, seeds).
pub mod resources;

/// Source documents and corpus preparation.
pub mod corpus;

/// Parallel training of every field model.
pub mod pipeline;

/// Store page assembly.
pub mod description;

/// Genre and tag selection.
pub mod tags;

/// Developer-name templates.
pub mod template;

/// Casing helpers.
pub mod text;

/// Gaussian sizes.
pub mod sampling;

/// I/O utilities (file loading, path helpers).
///
/// Not exposed
pub(crate) mod io;

pub use description::{ComposerConfig, DescriptionComposer, DescriptionConfig, GameDescription};
pub use error::{Error, Result};
pub use store::{DirectoryStore, MemoryStore, ModelStore};
