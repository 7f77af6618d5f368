//! Context assembly for Hearth.
//!
//! For every incoming message the engine decides which fragments of the
//! owner's history to include, in what order, and how much of each:
//!
//! 1. **Dialogue window** ([`window`]) trims the transcript and digests recent user turns
//! 2. **Relevance scoring** ([`scoring`]) rates each memory under a configured strategy
//! 3. **Top-k selection** ([`select`]) ranks, de-duplicates, and cuts each lane
//! 4. **Timeline selection** ([`timeline`]) picks dated events for the query
//! 5. **Assembly** ([`assembler`]) packs it all under a character budget
//!
//! [`engine::ContextEngine`] runs the whole pipeline with injected stores.

pub mod assembler;
pub mod engine;
pub mod scoring;
pub mod select;
pub mod timeline;
pub mod window;

pub use assembler::{
    AssembledContext, AssemblyError, AssemblyInput, AssemblyMetadata, BlockKind, BlockStats,
    ContextAssembler, ContextBlock, DropInfo,
};
pub use engine::{ContextEngine, ContextRequest, EngineSettings};
pub use scoring::{BlendedScorer, HeuristicScorer, RelevanceScorer, ScoringContext, build_scorer};
pub use select::{ArchivalBoost, ScoredCandidate, select_top_k, select_top_k_with_boost};
