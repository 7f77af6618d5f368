//! # Hearth Core
//!
//! Domain types, collaborator traits, and error definitions for the Hearth
//! companion assistant. This crate does no storage or network I/O of its own:
//! it defines the shapes every other crate agrees on.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (memory store, transcript store, timeline
//! source, similarity provider) is a trait here. Implementations live in
//! their respective crates and are handed to the context engine at
//! construction time. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod memory;
pub mod dialogue;
pub mod timeline;
pub mod similarity;
pub mod persona;
pub mod text;

// Re-export key types at crate root for ergonomics
pub use error::{Error, MemoryError, Result, SimilarityError};
pub use memory::{MediaRef, MemoryKind, MemoryLog, MemoryRecord};
pub use dialogue::{DialogueLog, DialogueTurn, TurnRole};
pub use timeline::{TimelineEvent, TimelineProvider};
pub use similarity::SimilarityProvider;
pub use persona::{Persona, PersonaPaths};
